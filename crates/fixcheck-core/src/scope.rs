use crate::ids::BranchName;
use crate::model::{CvssScore, Tier};

/// Classify a branch into its maintenance tier. Name-pattern driven; this
/// is the only place tier patterns are known.
pub fn classify(name: &BranchName) -> Tier {
    let lower = name.as_str().to_ascii_lowercase();
    if lower.contains("-eb") {
        Tier::Extended
    } else if lower.contains("-ltss") {
        Tier::LongTerm
    } else if lower.contains("-ga") {
        Tier::GeneralAvailability
    } else {
        Tier::Default
    }
}

/// Severity scoping: does a fix of this score require action on a branch
/// of this tier?
pub fn affects(tier: Tier, score: CvssScore) -> bool {
    match tier {
        Tier::Extended => score.value() >= 9,
        Tier::GeneralAvailability | Tier::LongTerm => score.value() >= 7,
        Tier::Default => true,
    }
}

/// Option-aware wrapper: an unknown score never suppresses anything.
pub fn in_scope(tier: Tier, score: Option<CvssScore>) -> bool {
    match score {
        Some(s) => affects(tier, s),
        None => true,
    }
}
