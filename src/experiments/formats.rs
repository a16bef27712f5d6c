//! Presentation format effects: the same rules as a numbered list, bullets, JSON, or prose

use serde_json::json;

use super::prompt::{include_word, REQUIREMENTS_HEADER, VOLATILE};
use super::{Condition, Experiment, ExperimentKind, Score};
use crate::analysis::check_lexical_adherence;

pub const RULE_COUNT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Numbered,
    Bullet,
    Json,
    Paragraph,
}

impl RuleFormat {
    pub const ALL: [RuleFormat; 4] = [
        RuleFormat::Numbered,
        RuleFormat::Bullet,
        RuleFormat::Json,
        RuleFormat::Paragraph,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuleFormat::Numbered => "numbered",
            RuleFormat::Bullet => "bullet",
            RuleFormat::Json => "json",
            RuleFormat::Paragraph => "paragraph",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RuleFormat::Numbered => "Standard numbered list",
            RuleFormat::Bullet => "Bullet point format",
            RuleFormat::Json => "JSON structured rules",
            RuleFormat::Paragraph => "Paragraph prose format",
        }
    }

    pub fn render(&self, rules: &[String]) -> String {
        match self {
            RuleFormat::Numbered => rules
                .iter()
                .enumerate()
                .map(|(i, w)| format!("{}. {}", i + 1, include_word(w)))
                .collect::<Vec<_>>()
                .join("\n"),
            RuleFormat::Bullet => rules
                .iter()
                .map(|w| format!("- {}", include_word(w)))
                .collect::<Vec<_>>()
                .join("\n"),
            RuleFormat::Json => {
                let object = json!({ "task": "write a story", "required_words": rules });
                format!(
                    "Please adhere to the constraints provided in the following JSON object:\n{}",
                    serde_json::to_string_pretty(&object).unwrap_or_default()
                )
            }
            RuleFormat::Paragraph => format!(
                "Your story must include all of the following words: {}. \
                 Please ensure every single word from this list appears naturally in your narrative.",
                rules.join(", ")
            ),
        }
    }
}

pub struct Formats;

impl Experiment for Formats {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Formats
    }

    fn conditions(&self) -> Vec<Condition> {
        RuleFormat::ALL
            .iter()
            .enumerate()
            .map(|(index, f)| Condition {
                name: format!("format_{}_R{}", f.name(), RULE_COUNT),
                rule_count: RULE_COUNT,
                index,
            })
            .collect()
    }

    fn build_prompt(&self, condition: &Condition, rules: &[String]) -> String {
        format!(
            "{}{}{}",
            REQUIREMENTS_HEADER,
            VOLATILE,
            RuleFormat::ALL[condition.index].render(rules)
        )
    }

    fn score(&self, condition: &Condition, story: &str, rules: &[String]) -> Score {
        Score::lexical(
            check_lexical_adherence(story, rules),
            RULE_COUNT,
            format!("Format: {}", RuleFormat::ALL[condition.index].description()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<String> {
        vec!["owl".to_string(), "moon".to_string()]
    }

    #[test]
    fn test_numbered() {
        assert_eq!(
            RuleFormat::Numbered.render(&rules()),
            "1. Include the word 'owl'\n2. Include the word 'moon'"
        );
    }

    #[test]
    fn test_json_is_pretty_and_parseable() {
        let rendered = RuleFormat::Json.render(&rules());
        let (intro, body) = rendered.split_once('\n').unwrap();
        assert!(intro.starts_with("Please adhere"));
        assert!(body.starts_with("{\n  \"task\": \"write a story\",\n  \"required_words\": ["));
        assert!(body.contains("\n  \"required_words\": [\n    \"owl\","));
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["task"], "write a story");
    }

    #[test]
    fn test_paragraph() {
        let rendered = RuleFormat::Paragraph.render(&rules());
        assert!(rendered.starts_with("Your story must include all of the following words: owl, moon. Please"));
    }

    #[test]
    fn test_prompt_uses_requirements_header() {
        let conditions = Formats.conditions();
        assert_eq!(conditions[2].name, "format_json_R50");
        let prompt = Formats.build_prompt(&conditions[1], &rules());
        assert!(prompt.starts_with("Create a short story with the following requirements:\n"));
        assert!(prompt.ends_with("- Include the word 'moon'"));
    }

    #[test]
    fn test_details() {
        let conditions = Formats.conditions();
        let score = Formats.score(&conditions[3], "owl", &rules());
        assert_eq!(score.details, "Format: Paragraph prose format");
    }
}
