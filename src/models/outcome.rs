use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    InProgress,
    Completed,
    AutoSubmitted,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::InProgress => "in_progress",
            OutcomeStatus::Completed => "completed",
            OutcomeStatus::AutoSubmitted => "auto_submitted",
        }
    }
}

impl std::str::FromStr for OutcomeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(OutcomeStatus::InProgress),
            "completed" => Ok(OutcomeStatus::Completed),
            "auto_submitted" => Ok(OutcomeStatus::AutoSubmitted),
            other => Err(format!("unknown outcome status: {}", other)),
        }
    }
}

/// Per-question outcome snapshot. Immutable once written by the scoring
/// engine; the reconciler only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDetail {
    pub question_id: String,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
    pub section: String,
    pub explanation: String,
    pub explanation_image: String,
    pub question_image: String,
}

/// Counts and marks for one section. Always recomputed from a detail
/// sequence, never incrementally updated or hand-edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionStat {
    pub attempted: u32,
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
    pub marks: f64,
}

impl SectionStat {
    pub fn total(&self) -> u32 {
        self.attempted + self.unattempted
    }
}

/// The scored result of one submitted attempt. Created exactly once per
/// submit call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub score: f64,
    pub total_questions: u32,
    pub percentage: f64,
    pub status: OutcomeStatus,
    pub details: Vec<OutcomeDetail>,
    /// Keyed by section name; BTreeMap keeps serialization byte-stable.
    pub sections: BTreeMap<String, SectionStat>,
    pub submitted_at: DateTime<Utc>,
}

/// A stored outcome row: one candidate, one test, one scored submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mocktest_id: Uuid,
    #[serde(flatten)]
    pub outcome: Outcome,
}
