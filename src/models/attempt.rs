use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transient per-candidate exam progress. Overwritten on every autosave and
/// deleted once an outcome exists for the same candidate/test pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptCache {
    pub user_id: Uuid,
    pub mocktest_id: Uuid,
    pub current_question: i32,
    /// Partial answer map, question id → selected letter.
    pub answers: HashMap<String, String>,
    pub time_left_seconds: i32,
    pub last_saved_at: DateTime<Utc>,
}
