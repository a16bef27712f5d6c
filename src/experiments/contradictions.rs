//! Contradiction resolution: which of two mutually exclusive tense rules wins?

use super::prompt::{bullet_rules, lexical_rules, RULES_HEADER, VOLATILE};
use super::{Condition, Experiment, ExperimentKind, Score};
use crate::analysis::{analyze_tense_resolution, check_lexical_adherence};

pub const RULE_COUNT: usize = 20;
pub const CONTRADICTION: [&str; 2] = [
    "Write the story only in the past tense.",
    "Write the story only in the future tense.",
];

pub struct Contradictions;

impl Experiment for Contradictions {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Contradictions
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![Condition {
            name: format!("contradiction_tense_R{}", RULE_COUNT),
            rule_count: RULE_COUNT,
            index: 0,
        }]
    }

    fn build_prompt(&self, _condition: &Condition, rules: &[String]) -> String {
        format!(
            "{}{}{}\n{}",
            RULES_HEADER,
            VOLATILE,
            lexical_rules(rules),
            bullet_rules(&CONTRADICTION)
        )
    }

    fn score(&self, _condition: &Condition, story: &str, rules: &[String]) -> Score {
        let tense = analyze_tense_resolution(story);
        let details = format!(
            "Tense resolution: {}; Past: {}, Future: {}",
            tense.resolution, tense.past_count, tense.future_count
        );
        // The two tense rules count towards R
        Score::lexical(
            check_lexical_adherence(story, rules),
            RULE_COUNT + CONTRADICTION.len(),
            details,
        )
    }
}
