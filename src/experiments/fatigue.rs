//! Scaled rule fatigue: does adherence drop as the rule count grows?

use super::prompt::{lexical_rules, RULES_HEADER, VOLATILE};
use super::{Condition, Experiment, ExperimentKind, Score};
use crate::analysis::check_lexical_adherence;

pub const RULE_COUNTS: [usize; 4] = [5, 20, 50, 100];

pub struct Fatigue;

impl Experiment for Fatigue {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Fatigue
    }

    fn conditions(&self) -> Vec<Condition> {
        RULE_COUNTS
            .iter()
            .enumerate()
            .map(|(index, &r)| Condition {
                name: format!("fatigue_R{}", r),
                rule_count: r,
                index,
            })
            .collect()
    }

    fn build_prompt(&self, _condition: &Condition, rules: &[String]) -> String {
        format!("{}{}{}\n", RULES_HEADER, VOLATILE, lexical_rules(rules))
    }

    fn score(&self, condition: &Condition, story: &str, rules: &[String]) -> Score {
        Score::lexical(
            check_lexical_adherence(story, rules),
            condition.rule_count,
            "Volatile components active".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions() {
        let names: Vec<String> = Fatigue.conditions().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["fatigue_R5", "fatigue_R20", "fatigue_R50", "fatigue_R100"]);
    }

    #[test]
    fn test_prompt_ends_with_newline() {
        let conditions = Fatigue.conditions();
        let condition = &conditions[0];
        let prompt = Fatigue.build_prompt(condition, &["moss".to_string()]);
        assert_eq!(
            prompt,
            "Create a short story subject to the following rules:\n\
             Memorize these rules. Review requirements before writing. Keep in mind throughout.\n\n\
             - Include the word 'moss'\n"
        );
    }

    #[test]
    fn test_score() {
        let conditions = Fatigue.conditions();
        let condition = &conditions[0];
        let rules = vec!["moss".to_string(), "fern".to_string()];
        let score = Fatigue.score(condition, "Moss everywhere", &rules);
        assert_eq!(score.adherence, 0.5);
        assert_eq!(score.reported_rules, 5);
        assert_eq!(score.details, "Volatile components active");
    }
}
