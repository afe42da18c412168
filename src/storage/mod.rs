pub mod memory;
pub mod pg;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::attempt::AttemptCache;
use crate::models::mocktest::MockTest;
use crate::models::outcome::OutcomeRecord;

/// Registry of question-bank spreadsheets.
#[async_trait]
pub trait MockTestStore: Send + Sync {
    async fn list_by_type(&self, test_type: &str) -> Result<Vec<MockTest>>;
    async fn get(&self, id: Uuid) -> Result<MockTest>;
}

/// Persisted scored outcomes. The engine never issues raw queries; it hands
/// a finished record to `save` and reads records back for review and
/// analytics.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    async fn save(&self, record: &OutcomeRecord) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<OutcomeRecord>;
    /// All outcomes of one test in submission order, which is the
    /// tie-break order the analytics engine relies on.
    async fn list_by_test(&self, mocktest_id: Uuid) -> Result<Vec<OutcomeRecord>>;
    /// One candidate's outcomes, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OutcomeRecord>>;
}

/// Transient autosave state, last write wins per candidate/test pair.
#[async_trait]
pub trait AttemptCacheStore: Send + Sync {
    async fn upsert(&self, cache: &AttemptCache) -> Result<()>;
    async fn get(&self, user_id: Uuid, mocktest_id: Uuid) -> Result<Option<AttemptCache>>;
    async fn delete(&self, user_id: Uuid, mocktest_id: Uuid) -> Result<()>;
}
