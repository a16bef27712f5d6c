//! Progressive complexity ladder: lexical rules plus increasingly layered constraints

use super::prompt::{bullet_rules, lexical_rules, RULES_HEADER, VOLATILE};
use super::{Condition, Experiment, ExperimentKind, Score};
use crate::analysis::check_lexical_adherence;

pub const RULE_COUNT: usize = 20;
/// Word the hierarchy level anchors to the first paragraph
pub const ANCHOR_WORD: &str = "apple";

pub struct Level {
    pub name: &'static str,
    pub rules: &'static [&'static str],
}

pub const LEVELS: [Level; 4] = [
    Level {
        name: "L1_Lexical",
        rules: &[],
    },
    Level {
        name: "L2_Tense",
        rules: &["Write in the past tense."],
    },
    Level {
        name: "L3_Structure",
        rules: &[
            "Write in the past tense.",
            "The story must have exactly 3 paragraphs.",
        ],
    },
    Level {
        name: "L4_Hierarchy",
        rules: &[
            "Write in the past tense.",
            "The story must have exactly 3 paragraphs.",
            "The word 'apple' must appear in the first paragraph.",
        ],
    },
];

pub struct Complexity;

impl Complexity {
    fn level(condition: &Condition) -> &'static Level {
        &LEVELS[condition.index]
    }
}

impl Experiment for Complexity {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Complexity
    }

    fn conditions(&self) -> Vec<Condition> {
        LEVELS
            .iter()
            .enumerate()
            .map(|(index, level)| Condition {
                name: format!("complexity_{}_R{}", level.name, RULE_COUNT),
                rule_count: RULE_COUNT,
                index,
            })
            .collect()
    }

    /// The hierarchy rule is only satisfiable if the anchor word is required
    fn prepare_rules(&self, condition: &Condition, rules: &mut [String]) {
        if Self::level(condition).name.contains("Hierarchy")
            && !rules.iter().any(|w| w == ANCHOR_WORD)
        {
            if let Some(first) = rules.first_mut() {
                *first = ANCHOR_WORD.to_string();
            }
        }
    }

    fn build_prompt(&self, condition: &Condition, rules: &[String]) -> String {
        format!(
            "{}{}{}\n{}",
            RULES_HEADER,
            VOLATILE,
            lexical_rules(rules),
            bullet_rules(Self::level(condition).rules)
        )
    }

    fn score(&self, condition: &Condition, story: &str, rules: &[String]) -> Score {
        Score::lexical(
            check_lexical_adherence(story, rules),
            RULE_COUNT,
            format!("Complexity: {}", Self::level(condition).name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_injects_anchor() {
        let conditions = Complexity.conditions();
        let mut rules = vec!["pear".to_string(), "plum".to_string()];
        Complexity.prepare_rules(&conditions[3], &mut rules);
        assert_eq!(rules, vec!["apple", "plum"]);

        let mut rules = vec!["pear".to_string(), "apple".to_string()];
        Complexity.prepare_rules(&conditions[3], &mut rules);
        assert_eq!(rules, vec!["pear", "apple"]);
    }

    #[test]
    fn test_lower_levels_untouched() {
        let conditions = Complexity.conditions();
        let mut rules = vec!["pear".to_string()];
        Complexity.prepare_rules(&conditions[2], &mut rules);
        assert_eq!(rules, vec!["pear"]);
    }

    #[test]
    fn test_level_one_prompt_has_trailing_newline() {
        let conditions = Complexity.conditions();
        let prompt = Complexity.build_prompt(&conditions[0], &["pear".to_string()]);
        assert!(prompt.ends_with("- Include the word 'pear'\n"));
        assert_eq!(conditions[0].name, "complexity_L1_Lexical_R20");
    }

    #[test]
    fn test_details() {
        let conditions = Complexity.conditions();
        let score = Complexity.score(&conditions[2], "", &["pear".to_string()]);
        assert_eq!(score.details, "Complexity: L3_Structure");
        assert_eq!(score.adherence, 0.0);
    }
}
