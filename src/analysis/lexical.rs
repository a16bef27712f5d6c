use serde::Serialize;

/// How many of the required words a story contains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdherenceReport {
    pub passed_words: Vec<String>,
    pub failed_words: Vec<String>,
    pub adherence: f64,
}

impl AdherenceReport {
    pub fn passed_count(&self) -> usize {
        self.passed_words.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed_words.len()
    }
}

/// Case-insensitive substring check of every rule word against the story.
///
/// An empty rule list is trivially satisfied.
pub fn check_lexical_adherence(story: &str, rules: &[String]) -> AdherenceReport {
    let lower_story = story.to_lowercase();
    let (passed_words, failed_words): (Vec<String>, Vec<String>) = rules
        .iter()
        .cloned()
        .partition(|word| lower_story.contains(&word.to_lowercase()));

    let adherence = if rules.is_empty() {
        1.0
    } else {
        passed_words.len() as f64 / rules.len() as f64
    };

    AdherenceReport {
        passed_words,
        failed_words,
        adherence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_all_present() {
        let report = check_lexical_adherence("The River met the Mountain.", &words(&["river", "mountain"]));
        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.adherence, 1.0);
    }

    #[test]
    fn test_partial_keeps_rule_order() {
        let rules = words(&["shadow", "apple", "whisper", "horizon"]);
        let report = check_lexical_adherence("a whisper near the shadows", &rules);
        assert_eq!(report.passed_words, words(&["shadow", "whisper"]));
        assert_eq!(report.failed_words, words(&["apple", "horizon"]));
        assert_eq!(report.adherence, 0.5);
    }

    #[test]
    fn test_empty_rules() {
        let report = check_lexical_adherence("anything", &[]);
        assert_eq!(report.adherence, 1.0);
        assert_eq!(report.passed_count(), 0);
    }

    #[test]
    fn test_empty_story() {
        let report = check_lexical_adherence("", &words(&["memory"]));
        assert_eq!(report.adherence, 0.0);
    }
}
