//! Prompt fragments shared by the experiments

pub const RULES_HEADER: &str = "Create a short story subject to the following rules:\n";
pub const REQUIREMENTS_HEADER: &str = "Create a short story with the following requirements:\n";
/// Instruction that asks the model to keep the rules in working memory
pub const VOLATILE: &str =
    "Memorize these rules. Review requirements before writing. Keep in mind throughout.\n\n";

pub fn include_word(word: &str) -> String {
    format!("Include the word '{}'", word)
}

/// One `- Include the word '<w>'` line per rule
pub fn lexical_rules(rules: &[String]) -> String {
    rules
        .iter()
        .map(|w| format!("- {}", include_word(w)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Free-form rules as a bullet list
pub fn bullet_rules(rules: &[&str]) -> String {
    rules
        .iter()
        .map(|r| format!("- {}", r))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_rules() {
        let rules = vec!["river".to_string(), "shadow".to_string()];
        assert_eq!(
            lexical_rules(&rules),
            "- Include the word 'river'\n- Include the word 'shadow'"
        );
    }

    #[test]
    fn test_bullet_rules() {
        assert_eq!(bullet_rules(&["a.", "b."]), "- a.\n- b.");
        assert_eq!(bullet_rules(&[]), "");
    }
}
