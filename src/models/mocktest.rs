use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Registry row for one question-bank spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MockTest {
    pub id: Uuid,
    pub name: String,
    pub exam_type: Option<String>,
    /// "full" or "subject".
    pub test_type: String,
    pub subject: Option<String>,
    pub file_path: String,
    pub total_questions: i32,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
