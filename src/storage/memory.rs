use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::attempt::AttemptCache;
use crate::models::mocktest::MockTest;
use crate::models::outcome::OutcomeRecord;
use crate::storage::{AttemptCacheStore, MockTestStore, OutcomeStore};

/// In-process store with the same contracts as the Postgres one. Backs the
/// integration tests and makes the engine runnable without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    mocktests: Vec<MockTest>,
    outcomes: Vec<OutcomeRecord>,
    caches: HashMap<(Uuid, Uuid), AttemptCache>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mocktest(&self, test: MockTest) {
        self.lock().mocktests.push(test);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MockTestStore for MemoryStore {
    async fn list_by_type(&self, test_type: &str) -> Result<Vec<MockTest>> {
        Ok(self
            .lock()
            .mocktests
            .iter()
            .filter(|t| t.test_type == test_type && t.is_active)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<MockTest> {
        self.lock()
            .mocktests
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Test not found: {}", id)))
    }
}

#[async_trait]
impl OutcomeStore for MemoryStore {
    async fn save(&self, record: &OutcomeRecord) -> Result<Uuid> {
        self.lock().outcomes.push(record.clone());
        Ok(record.id)
    }

    async fn get(&self, id: Uuid) -> Result<OutcomeRecord> {
        self.lock()
            .outcomes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Result not found: {}", id)))
    }

    async fn list_by_test(&self, mocktest_id: Uuid) -> Result<Vec<OutcomeRecord>> {
        // Insertion order is submission order here.
        Ok(self
            .lock()
            .outcomes
            .iter()
            .filter(|r| r.mocktest_id == mocktest_id)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OutcomeRecord>> {
        let mut rows: Vec<OutcomeRecord> = self
            .lock()
            .outcomes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.outcome.submitted_at.cmp(&a.outcome.submitted_at));
        Ok(rows)
    }
}

#[async_trait]
impl AttemptCacheStore for MemoryStore {
    async fn upsert(&self, cache: &AttemptCache) -> Result<()> {
        self.lock()
            .caches
            .insert((cache.user_id, cache.mocktest_id), cache.clone());
        Ok(())
    }

    async fn get(&self, user_id: Uuid, mocktest_id: Uuid) -> Result<Option<AttemptCache>> {
        Ok(self.lock().caches.get(&(user_id, mocktest_id)).cloned())
    }

    async fn delete(&self, user_id: Uuid, mocktest_id: Uuid) -> Result<()> {
        self.lock().caches.remove(&(user_id, mocktest_id));
        Ok(())
    }
}
