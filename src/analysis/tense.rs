use std::fmt;

use serde::Serialize;

const PAST_INDICATORS: [&str; 8] = ["was", "were", "had", "did", "went", "saw", "thought", "said"];
const FUTURE_INDICATORS: [&str; 4] = ["will", "shall", "going to", "would be"];

/// Which of two contradictory tense rules a story ended up following
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenseResolution {
    NoClearTense,
    FollowedPastTense,
    FollowedFutureTense,
    MixedOrIgnored,
}

impl fmt::Display for TenseResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TenseResolution::NoClearTense => "no_clear_tense",
            TenseResolution::FollowedPastTense => "followed_past_tense",
            TenseResolution::FollowedFutureTense => "followed_future_tense",
            TenseResolution::MixedOrIgnored => "mixed_or_ignored",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenseReport {
    pub resolution: TenseResolution,
    pub past_count: usize,
    pub future_count: usize,
}

/// Count tense indicators (plain substring matches) and classify the story
pub fn analyze_tense_resolution(story: &str) -> TenseReport {
    let lower = story.to_lowercase();
    let count = |indicators: &[&str]| -> usize {
        indicators.iter().map(|w| lower.matches(w).count()).sum()
    };
    let past_count = count(&PAST_INDICATORS);
    let future_count = count(&FUTURE_INDICATORS);

    let total = past_count + future_count;
    if total == 0 {
        return TenseReport {
            resolution: TenseResolution::NoClearTense,
            past_count: 0,
            future_count: 0,
        };
    }

    let past_ratio = past_count as f64 / total as f64;
    let resolution = if past_ratio > 0.8 {
        TenseResolution::FollowedPastTense
    } else if past_ratio < 0.2 {
        TenseResolution::FollowedFutureTense
    } else {
        TenseResolution::MixedOrIgnored
    };

    TenseReport {
        resolution,
        past_count,
        future_count,
    }
}
