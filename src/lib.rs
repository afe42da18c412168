pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::bank_service::BankService;
use crate::services::media::MediaResolver;
use crate::storage::pg::PgStore;
use crate::storage::{AttemptCacheStore, MockTestStore, OutcomeStore};

#[derive(Clone)]
pub struct AppState {
    pub mocktests: Arc<dyn MockTestStore>,
    pub outcomes: Arc<dyn OutcomeStore>,
    pub attempt_cache: Arc<dyn AttemptCacheStore>,
    pub bank_service: BankService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let resolver = MediaResolver::new(
            &config.public_base_url,
            &config.static_prefix,
            &config.media_dir,
        );
        let store = Arc::new(PgStore::new(pool));

        Self {
            mocktests: store.clone(),
            outcomes: store.clone(),
            attempt_cache: store,
            bank_service: BankService::new(resolver),
        }
    }
}
