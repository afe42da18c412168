pub mod health;
pub mod mocktest;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/mocktests/full", get(mocktest::list_full_tests))
        .route("/api/mocktests/subject", get(mocktest::list_subject_tests))
        .route(
            "/api/mocktests/:test_id/resume/:user_id",
            get(mocktest::resume_test),
        )
        .route(
            "/api/mocktests/:test_id/save/:user_id",
            post(mocktest::save_progress),
        )
        .route(
            "/api/mocktests/:test_id/submit/:user_id",
            post(mocktest::submit_test),
        )
        .route(
            "/api/mocktests/results/summary/:user_id",
            get(mocktest::results_summary),
        )
        .route(
            "/api/mocktests/result/:result_id/preview",
            get(mocktest::preview_result),
        )
        .with_state(state)
}
