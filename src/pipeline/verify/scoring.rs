use serde::Serialize;

use crate::models::Judgement;

/// Novelty score (percent) and publication priority for a verified level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoveltyVerdict {
    pub score: u8,
    pub judgement: Judgement,
}

/// Fixed mapping from the verified max level to the verdict.
pub fn verdict_for_level(level: u8) -> NoveltyVerdict {
    let (score, judgement) = match level {
        4.. => (15, Judgement::Low),
        3 => (40, Judgement::Low),
        2 => (70, Judgement::Moderate),
        _ => (90, Judgement::High),
    };
    NoveltyVerdict { score, judgement }
}
