//! Constraint type taxonomy: lexical rules alone versus lexical plus structural rules

use super::prompt::{bullet_rules, lexical_rules, RULES_HEADER, VOLATILE};
use super::{Condition, Experiment, ExperimentKind, Score};
use crate::analysis::{check_lexical_adherence, verify_structural_rules};

pub const RULE_COUNT: usize = 20;
pub const CONSTRAINT_TYPES: [&str; 2] = ["lexical", "structural"];
pub const STRUCTURAL_RULES: [&str; 2] = [
    "Write exactly 3 paragraphs.",
    "Every sentence must have 15 words or fewer.",
];

pub struct Taxonomy;

impl Taxonomy {
    fn is_structural(condition: &Condition) -> bool {
        CONSTRAINT_TYPES[condition.index] == "structural"
    }
}

impl Experiment for Taxonomy {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Taxonomy
    }

    fn conditions(&self) -> Vec<Condition> {
        CONSTRAINT_TYPES
            .iter()
            .enumerate()
            .map(|(index, t)| Condition {
                name: format!("taxonomy_{}_R{}", t, RULE_COUNT),
                rule_count: RULE_COUNT,
                index,
            })
            .collect()
    }

    fn build_prompt(&self, condition: &Condition, rules: &[String]) -> String {
        let mut prompt = format!("{}{}{}", RULES_HEADER, VOLATILE, lexical_rules(rules));
        if Self::is_structural(condition) {
            prompt.push('\n');
            prompt.push_str(&bullet_rules(&STRUCTURAL_RULES));
        }
        prompt
    }

    fn score(&self, condition: &Condition, story: &str, rules: &[String]) -> Score {
        let lexical = check_lexical_adherence(story, rules);
        let constraint_type = CONSTRAINT_TYPES[condition.index];

        if !Self::is_structural(condition) {
            return Score::lexical(lexical, RULE_COUNT, format!("Type: {}.", constraint_type));
        }

        let structural = verify_structural_rules(story);
        let combined = lexical.adherence * 0.5 + structural.structural_adherence * 0.5;
        let details = format!(
            "Type: {}. Paragraphs: {}/3, Long sentences: {}",
            constraint_type, structural.paragraph_count, structural.long_sentences
        );
        Score {
            lexical,
            adherence: combined,
            reported_rules: RULE_COUNT,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<String> {
        vec!["lantern".to_string(), "harbor".to_string()]
    }

    #[test]
    fn test_structural_prompt_lists_extra_rules() {
        let conditions = Taxonomy.conditions();
        let prompt = Taxonomy.build_prompt(&conditions[1], &rules());
        assert!(prompt.ends_with(
            "- Include the word 'harbor'\n- Write exactly 3 paragraphs.\n- Every sentence must have 15 words or fewer."
        ));
        let lexical = Taxonomy.build_prompt(&conditions[0], &rules());
        assert!(lexical.ends_with("- Include the word 'harbor'"));
    }

    #[test]
    fn test_lexical_score_details() {
        let conditions = Taxonomy.conditions();
        let score = Taxonomy.score(&conditions[0], "a lantern", &rules());
        assert_eq!(score.details, "Type: lexical.");
        assert_eq!(score.adherence, 0.5);
    }

    #[test]
    fn test_structural_score_combines() {
        let conditions = Taxonomy.conditions();
        let story = "The lantern glowed.\n\nThe harbor slept.\n\nMorning came.";
        let score = Taxonomy.score(&conditions[1], story, &rules());
        assert_eq!(score.lexical.adherence, 1.0);
        assert_eq!(score.adherence, 1.0);
        assert_eq!(score.details, "Type: structural. Paragraphs: 3/3, Long sentences: 0");

        let score = Taxonomy.score(&conditions[1], "The lantern glowed.", &rules());
        // lexical 0.5, structural 0.5
        assert_eq!(score.adherence, 0.5);
    }
}
