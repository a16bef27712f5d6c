//! Word list loading for rule sampling

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::error::{BenchError, Result};

/// Used when the dictionary is missing from the image
pub const FALLBACK_WORDS: [&str; 10] = [
    "apple",
    "river",
    "mountain",
    "journey",
    "discovery",
    "whisper",
    "shadow",
    "sunlight",
    "memory",
    "horizon",
];

/// Load up to `limit` lowercase alphabetic words from `path`.
///
/// A missing file is not an error: the fallback words are repeated to fill
/// exactly `limit` entries.
pub fn load_lexicon(path: &Path, limit: usize) -> Result<Vec<String>> {
    if !path.exists() {
        warn!("Lexicon path {} not found. Using default words.", path.display());
        return Ok(FALLBACK_WORDS
            .iter()
            .cycle()
            .take(limit)
            .map(|w| w.to_string())
            .collect());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut words = Vec::with_capacity(limit);
    for line in reader.lines() {
        if words.len() >= limit {
            break;
        }
        let word = line?.trim().to_lowercase();
        if !word.is_empty() && word.chars().all(char::is_alphabetic) {
            words.push(word);
        }
    }

    info!("Loaded {} words from lexicon", words.len());
    Ok(words)
}

/// Draw `count` distinct entries from the lexicon
pub fn sample_rules<R: Rng + ?Sized>(
    lexicon: &[String],
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    if count > lexicon.len() {
        return Err(BenchError::ConfigError(format!(
            "cannot sample {} rules from a lexicon of {} words",
            count,
            lexicon.len()
        )));
    }
    Ok(lexicon.choose_multiple(rng, count).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn test_fallback_fills_limit() {
        let words = load_lexicon(Path::new("/no/such/dictionary"), 25).unwrap();
        assert_eq!(words.len(), 25);
        assert_eq!(words[0], "apple");
        assert_eq!(words[10], "apple");
        assert_eq!(words[9], "horizon");
        assert_eq!(words[24], "discovery");
    }

    #[test]
    fn test_filters_and_lowercases() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Apple\nit's\n  Banana  \n\nc3po\nCherry").unwrap();
        let words = load_lexicon(file.path(), 100).unwrap();
        assert_eq!(words, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_stops_at_limit() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "one\ntwo\nthree\nfour").unwrap();
        let words = load_lexicon(file.path(), 2).unwrap();
        assert_eq!(words, vec!["one", "two"]);
    }

    #[test]
    fn test_sample_rules_distinct() {
        let lexicon: Vec<String> = (0..50).map(|i| format!("word{}", i)).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let rules = sample_rules(&lexicon, 20, &mut rng).unwrap();
        assert_eq!(rules.len(), 20);
        let unique: HashSet<&String> = rules.iter().collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_sample_rules_seeded_is_reproducible() {
        let lexicon: Vec<String> = FALLBACK_WORDS.iter().map(|w| w.to_string()).collect();
        let a = sample_rules(&lexicon, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sample_rules(&lexicon, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_too_many() {
        let lexicon = vec!["a".to_string(), "b".to_string()];
        let err = sample_rules(&lexicon, 3, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));
    }
}
