use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::attempt::AttemptCache;
use crate::models::mocktest::MockTest;
use crate::models::outcome::{Outcome, OutcomeRecord};
use crate::storage::{AttemptCacheStore, MockTestStore, OutcomeStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct OutcomeRow {
    id: Uuid,
    user_id: Uuid,
    mocktest_id: Uuid,
    score: f64,
    total_questions: i32,
    percentage: f64,
    status: String,
    details: JsonValue,
    sections: JsonValue,
    submitted_at: DateTime<Utc>,
}

impl OutcomeRow {
    fn into_record(self) -> Result<OutcomeRecord> {
        Ok(OutcomeRecord {
            id: self.id,
            user_id: self.user_id,
            mocktest_id: self.mocktest_id,
            outcome: Outcome {
                score: self.score,
                total_questions: self.total_questions.max(0) as u32,
                percentage: self.percentage,
                status: self.status.parse().map_err(Error::Internal)?,
                details: serde_json::from_value(self.details)?,
                sections: serde_json::from_value(self.sections)?,
                submitted_at: self.submitted_at,
            },
        })
    }
}

const OUTCOME_COLUMNS: &str = "id, user_id, mocktest_id, score, total_questions, percentage, \
                               status, details, sections, submitted_at";

#[async_trait]
impl MockTestStore for PgStore {
    async fn list_by_type(&self, test_type: &str) -> Result<Vec<MockTest>> {
        let rows = sqlx::query_as::<_, MockTest>(
            r#"SELECT * FROM mock_test_files
               WHERE test_type = $1 AND is_active = TRUE
               ORDER BY subject ASC NULLS LAST, name ASC"#,
        )
        .bind(test_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<MockTest> {
        let row = sqlx::query_as::<_, MockTest>(r#"SELECT * FROM mock_test_files WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| Error::NotFound(format!("Test not found: {}", id)))
    }
}

#[async_trait]
impl OutcomeStore for PgStore {
    async fn save(&self, record: &OutcomeRecord) -> Result<Uuid> {
        let details = serde_json::to_value(&record.outcome.details)?;
        let sections = serde_json::to_value(&record.outcome.sections)?;

        sqlx::query(
            r#"INSERT INTO user_results
               (id, user_id, mocktest_id, score, total_questions, percentage,
                status, details, sections, submitted_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.mocktest_id)
        .bind(record.outcome.score)
        .bind(record.outcome.total_questions as i32)
        .bind(record.outcome.percentage)
        .bind(record.outcome.status.as_str())
        .bind(details)
        .bind(sections)
        .bind(record.outcome.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::persistence(
                format!("candidate {} test {}", record.user_id, record.mocktest_id),
                e,
            )
        })?;

        Ok(record.id)
    }

    async fn get(&self, id: Uuid) -> Result<OutcomeRecord> {
        let row = sqlx::query_as::<_, OutcomeRow>(&format!(
            "SELECT {} FROM user_results WHERE id = $1",
            OUTCOME_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| Error::NotFound(format!("Result not found: {}", id)))?
            .into_record()
    }

    async fn list_by_test(&self, mocktest_id: Uuid) -> Result<Vec<OutcomeRecord>> {
        let rows = sqlx::query_as::<_, OutcomeRow>(&format!(
            "SELECT {} FROM user_results WHERE mocktest_id = $1 ORDER BY submitted_at ASC, id ASC",
            OUTCOME_COLUMNS
        ))
        .bind(mocktest_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OutcomeRow::into_record).collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OutcomeRecord>> {
        let rows = sqlx::query_as::<_, OutcomeRow>(&format!(
            "SELECT {} FROM user_results WHERE user_id = $1 ORDER BY submitted_at DESC, id DESC",
            OUTCOME_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OutcomeRow::into_record).collect()
    }
}

#[derive(FromRow)]
struct CacheRow {
    user_id: Uuid,
    mocktest_id: Uuid,
    current_question: i32,
    answers_json: JsonValue,
    time_left: i32,
    last_saved_at: DateTime<Utc>,
}

#[async_trait]
impl AttemptCacheStore for PgStore {
    async fn upsert(&self, cache: &AttemptCache) -> Result<()> {
        let answers = serde_json::to_value(&cache.answers)?;
        sqlx::query(
            r#"INSERT INTO exam_cache
               (user_id, mocktest_id, current_question, answers_json, time_left, last_saved_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (user_id, mocktest_id) DO UPDATE SET
                   current_question = EXCLUDED.current_question,
                   answers_json = EXCLUDED.answers_json,
                   time_left = EXCLUDED.time_left,
                   last_saved_at = EXCLUDED.last_saved_at"#,
        )
        .bind(cache.user_id)
        .bind(cache.mocktest_id)
        .bind(cache.current_question)
        .bind(answers)
        .bind(cache.time_left_seconds)
        .bind(cache.last_saved_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, user_id: Uuid, mocktest_id: Uuid) -> Result<Option<AttemptCache>> {
        let row = sqlx::query_as::<_, CacheRow>(
            r#"SELECT user_id, mocktest_id, current_question, answers_json, time_left, last_saved_at
               FROM exam_cache WHERE user_id = $1 AND mocktest_id = $2"#,
        )
        .bind(user_id)
        .bind(mocktest_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(AttemptCache {
                user_id: row.user_id,
                mocktest_id: row.mocktest_id,
                current_question: row.current_question,
                answers: serde_json::from_value(row.answers_json)?,
                time_left_seconds: row.time_left,
                last_saved_at: row.last_saved_at,
            })),
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: Uuid, mocktest_id: Uuid) -> Result<()> {
        sqlx::query(r#"DELETE FROM exam_cache WHERE user_id = $1 AND mocktest_id = $2"#)
            .bind(user_id)
            .bind(mocktest_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
