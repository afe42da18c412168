use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::outcome::{OutcomeRecord, OutcomeStatus, SectionStat};
use crate::models::question::{Question, ReviewQuestion};
use crate::services::analytics_service::Analytics;

#[derive(Debug, Clone, Serialize)]
pub struct MockTestSummary {
    pub id: Uuid,
    pub name: String,
    pub exam_type: Option<String>,
    pub test_type: String,
    pub subject: Option<String>,
    pub duration_minutes: i32,
    pub total_questions: i32,
}

impl From<crate::models::mocktest::MockTest> for MockTestSummary {
    fn from(t: crate::models::mocktest::MockTest) -> Self {
        Self {
            id: t.id,
            name: t.name,
            exam_type: t.exam_type,
            test_type: t.test_type,
            subject: t.subject,
            duration_minutes: t.duration_minutes,
            total_questions: t.total_questions,
        }
    }
}

/// Question as shown to a candidate mid-exam: no answer key, no explanation.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeQuestion {
    pub question_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub section: String,
    pub passage_id: String,
    pub passage_text: String,
    pub question_image: String,
    pub passage_image: String,
}

impl From<&Question> for ResumeQuestion {
    fn from(q: &Question) -> Self {
        Self {
            question_id: q.question_id.clone(),
            text: q.text.clone(),
            options: q.options.clone(),
            section: q.section.clone(),
            passage_id: q.passage_id.clone(),
            passage_text: q.passage_text.clone(),
            question_image: q.question_image.clone(),
            passage_image: q.passage_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeResponse {
    pub test_name: String,
    pub duration_minutes: i32,
    pub questions: Vec<ResumeQuestion>,
    pub answers_snapshot: HashMap<String, String>,
    pub remaining_seconds: i32,
    pub current_question: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SavePayload {
    pub answers: HashMap<String, String>,
    #[validate(range(min = 0))]
    pub time_left: i32,
    #[validate(range(min = 0))]
    pub current_question: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub last_saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitPayload {
    pub answers: HashMap<String, String>,
    /// Set by the host when the exam clock, not the candidate, submitted.
    #[serde(default)]
    pub auto_submitted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub result_id: Uuid,
    pub score: f64,
    pub total_questions: u32,
    pub percentage: f64,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub id: Uuid,
    pub mocktest_id: Uuid,
    pub score: f64,
    pub total_questions: u32,
    pub percentage: f64,
    pub status: OutcomeStatus,
    pub submitted_at: DateTime<Utc>,
}

impl From<&OutcomeRecord> for OutcomeSummary {
    fn from(r: &OutcomeRecord) -> Self {
        Self {
            id: r.id,
            mocktest_id: r.mocktest_id,
            score: r.outcome.score,
            total_questions: r.outcome.total_questions,
            percentage: r.outcome.percentage,
            status: r.outcome.status,
            submitted_at: r.outcome.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub section_name: String,
    #[serde(flatten)]
    pub stat: SectionStat,
    /// Share of the section answered correctly, for display only.
    pub percentage: f64,
}

/// The full review payload: reconciled questions, recomputed section
/// summary and cross-candidate analytics. The renderer must not re-derive
/// any of these numbers.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    pub id: Uuid,
    pub mocktest_id: Uuid,
    pub score: f64,
    pub total_questions: u32,
    pub percentage: f64,
    pub status: OutcomeStatus,
    pub submitted_at: DateTime<Utc>,
    pub questions: Vec<ReviewQuestion>,
    pub sections_summary: Vec<SectionSummary>,
    pub analytics: Analytics,
}
