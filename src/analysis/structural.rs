use serde::Serialize;

pub const REQUIRED_PARAGRAPHS: usize = 3;
pub const MAX_SENTENCE_WORDS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralReport {
    pub paragraph_count: usize,
    pub long_sentences: usize,
    /// Mean of the paragraph check and the sentence-length check
    pub structural_adherence: f64,
}

/// Check "exactly 3 paragraphs" and "at most 15 words per sentence"
pub fn verify_structural_rules(story: &str) -> StructuralReport {
    let paragraphs: Vec<&str> = story
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let long_sentences = paragraphs
        .iter()
        .flat_map(|p| p.split('.'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| s.split_whitespace().count() > MAX_SENTENCE_WORDS)
        .count();

    let paragraph_ok = if paragraphs.len() == REQUIRED_PARAGRAPHS { 1.0 } else { 0.0 };
    let sentence_ok = if long_sentences == 0 { 1.0 } else { 0.0 };

    StructuralReport {
        paragraph_count: paragraphs.len(),
        long_sentences,
        structural_adherence: (paragraph_ok + sentence_ok) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_structure() {
        let story = "One short line. Another.\n\nSecond part here.\n\nThe end.";
        let report = verify_structural_rules(story);
        assert_eq!(report.paragraph_count, 3);
        assert_eq!(report.long_sentences, 0);
        assert_eq!(report.structural_adherence, 1.0);
    }

    #[test]
    fn test_long_sentence() {
        let long = "word ".repeat(16);
        let story = format!("{}.\n\nok.\n\nok.", long.trim());
        let report = verify_structural_rules(&story);
        assert_eq!(report.long_sentences, 1);
        assert_eq!(report.structural_adherence, 0.5);
    }

    #[test]
    fn test_fifteen_words_is_fine() {
        let sentence = "word ".repeat(15);
        let report = verify_structural_rules(&format!("{}.", sentence.trim()));
        assert_eq!(report.long_sentences, 0);
        assert_eq!(report.paragraph_count, 1);
        assert_eq!(report.structural_adherence, 0.5);
    }

    #[test]
    fn test_blank_paragraphs_ignored() {
        let report = verify_structural_rules("a.\n\n   \n\nb.\n\n\n\nc.");
        assert_eq!(report.paragraph_count, 3);
    }

    #[test]
    fn test_empty_story() {
        let report = verify_structural_rules("");
        assert_eq!(report.paragraph_count, 0);
        assert_eq!(report.structural_adherence, 0.5);
    }
}
