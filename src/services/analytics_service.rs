use serde::Serialize;
use uuid::Uuid;

use crate::services::scoring_service::round2;

/// Minimal shape analytics needs from a stored outcome.
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry {
    pub id: Uuid,
    pub score: f64,
}

/// Cross-candidate standing of one outcome within a test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub rank: u32,
    pub total_candidates: u32,
    pub percentile: f64,
    pub topper_score: f64,
    pub performance_band: &'static str,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// Ranks `target` among all outcomes of a test.
    ///
    /// Entries arrive in submission order and the sort is stable, so ties
    /// resolve by submission time. A target missing from the set gets the
    /// worst possible rank rather than an error.
    pub fn analyze(entries: &[ScoredEntry], target: Uuid) -> Analytics {
        let mut ordered: Vec<&ScoredEntry> = entries.iter().collect();
        ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

        let total = ordered.len() as u32;
        let rank = ordered
            .iter()
            .position(|e| e.id == target)
            .map(|p| p as u32 + 1)
            .unwrap_or(total);
        let percentile = if total > 0 {
            round2((total - rank) as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        let topper_score = ordered.first().map(|e| e.score).unwrap_or(0.0);

        Analytics {
            rank,
            total_candidates: total,
            percentile,
            topper_score,
            performance_band: performance_band(percentile),
        }
    }
}

/// Four-bucket step function of percentile, inclusive on the lower side.
pub fn performance_band(percentile: f64) -> &'static str {
    if percentile >= 90.0 {
        "Top 10%"
    } else if percentile >= 75.0 {
        "Top 25%"
    } else if percentile >= 50.0 {
        "Top 50%"
    } else {
        "Needs Improvement"
    }
}
