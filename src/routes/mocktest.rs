use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::mocktest_dto::{
    MockTestSummary, OutcomeSummary, PreviewResponse, ResumeQuestion, ResumeResponse, SavePayload,
    SaveResponse, SectionSummary, SubmitPayload, SubmitResponse,
};
use crate::error::{Error, Result};
use crate::models::attempt::AttemptCache;
use crate::models::outcome::{OutcomeRecord, OutcomeStatus};
use crate::models::question::BankRow;
use crate::services::analytics_service::{AnalyticsService, ScoredEntry};
use crate::services::review_service::ReviewService;
use crate::services::scoring_service::{round2, ScoringService};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_full_tests(State(state): State<AppState>) -> Result<Json<Vec<MockTestSummary>>> {
    let tests = state.mocktests.list_by_type("full").await?;
    Ok(Json(tests.into_iter().map(MockTestSummary::from).collect()))
}

#[axum::debug_handler]
pub async fn list_subject_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<MockTestSummary>>> {
    let tests = state.mocktests.list_by_type("subject").await?;
    Ok(Json(tests.into_iter().map(MockTestSummary::from).collect()))
}

/// Returns the exam view for a candidate, merged with any autosaved
/// progress. Answer-key fields never leave the server here.
#[axum::debug_handler]
pub async fn resume_test(
    State(state): State<AppState>,
    Path((test_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ResumeResponse>> {
    let test = state.mocktests.get(test_id).await?;
    let rows = parse_bank(&state, &test.file_path).await?;
    let cache = state.attempt_cache.get(user_id, test_id).await?;

    let questions: Vec<ResumeQuestion> =
        rows.iter().map(|r| ResumeQuestion::from(&r.question)).collect();

    let (answers_snapshot, remaining_seconds, current_question) = match cache {
        Some(c) => (c.answers, c.time_left_seconds, c.current_question),
        None => (Default::default(), test.duration_minutes * 60, 0),
    };

    Ok(Json(ResumeResponse {
        test_name: test.name,
        duration_minutes: test.duration_minutes,
        questions,
        answers_snapshot,
        remaining_seconds,
        current_question,
    }))
}

/// Autosave. Last write per candidate/test pair wins; the store is the
/// serialization point.
#[axum::debug_handler]
pub async fn save_progress(
    State(state): State<AppState>,
    Path((test_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SavePayload>,
) -> Result<Json<SaveResponse>> {
    payload.validate()?;
    state.mocktests.get(test_id).await?;

    let cache = AttemptCache {
        user_id,
        mocktest_id: test_id,
        current_question: payload.current_question,
        answers: payload.answers,
        time_left_seconds: payload.time_left,
        last_saved_at: Utc::now(),
    };
    state.attempt_cache.upsert(&cache).await?;

    Ok(Json(SaveResponse {
        saved: true,
        last_saved_at: cache.last_saved_at,
    }))
}

#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Path((test_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmitPayload>,
) -> Result<Json<SubmitResponse>> {
    let test = state.mocktests.get(test_id).await?;
    let rows = parse_bank(&state, &test.file_path).await?;
    if rows.is_empty() {
        return Err(Error::BadRequest(format!(
            "Test {} has no questions to score",
            test_id
        )));
    }

    let status = if payload.auto_submitted {
        OutcomeStatus::AutoSubmitted
    } else {
        OutcomeStatus::Completed
    };
    let outcome = ScoringService::score(&rows, &payload.answers, status);

    let record = OutcomeRecord {
        id: Uuid::new_v4(),
        user_id,
        mocktest_id: test_id,
        outcome,
    };
    let result_id = state.outcomes.save(&record).await?;
    tracing::info!(
        %result_id, %user_id, %test_id,
        score = record.outcome.score,
        "stored exam outcome"
    );

    // The cache is superseded by the outcome; a failed cleanup must not
    // unwind an already-persisted result.
    if let Err(e) = state.attempt_cache.delete(user_id, test_id).await {
        tracing::warn!(%user_id, %test_id, error = %e, "failed to drop attempt cache");
    }

    Ok(Json(SubmitResponse {
        result_id,
        score: record.outcome.score,
        total_questions: record.outcome.total_questions,
        percentage: record.outcome.percentage,
        status: record.outcome.status,
    }))
}

#[axum::debug_handler]
pub async fn results_summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<OutcomeSummary>>> {
    let records = state.outcomes.list_by_user(user_id).await?;
    Ok(Json(records.iter().map(OutcomeSummary::from).collect()))
}

/// The full review: persisted snapshot reconciled against the current bank,
/// section totals recomputed, plus cross-candidate analytics.
#[axum::debug_handler]
pub async fn preview_result(
    State(state): State<AppState>,
    Path(result_id): Path<Uuid>,
) -> Result<Json<PreviewResponse>> {
    let record = state.outcomes.get(result_id).await?;
    let test = state.mocktests.get(record.mocktest_id).await?;
    let rows = parse_bank(&state, &test.file_path).await?;

    let (questions, sections) = ReviewService::reconcile(&record.outcome.details, &rows);
    let sections_summary = sections
        .into_iter()
        .map(|(section_name, stat)| {
            let total = stat.total();
            let percentage = if total > 0 {
                round2(stat.correct as f64 / total as f64 * 100.0)
            } else {
                0.0
            };
            SectionSummary {
                section_name,
                stat,
                percentage,
            }
        })
        .collect();

    let entries: Vec<ScoredEntry> = state
        .outcomes
        .list_by_test(record.mocktest_id)
        .await?
        .iter()
        .map(|r| ScoredEntry {
            id: r.id,
            score: r.outcome.score,
        })
        .collect();
    let analytics = AnalyticsService::analyze(&entries, record.id);

    Ok(Json(PreviewResponse {
        id: record.id,
        mocktest_id: record.mocktest_id,
        score: record.outcome.score,
        total_questions: record.outcome.total_questions,
        percentage: record.outcome.percentage,
        status: record.outcome.status,
        submitted_at: record.outcome.submitted_at,
        questions,
        sections_summary,
        analytics,
    }))
}

/// The workbook read is the engine's one blocking suspend point; it runs
/// off the async scheduler.
async fn parse_bank(state: &AppState, path: &str) -> Result<Vec<BankRow>> {
    let svc = state.bank_service.clone();
    let path = path.to_string();
    tokio::task::spawn_blocking(move || svc.parse(&path))
        .await
        .map_err(|e| Error::Internal(format!("bank parse task failed: {}", e)))?
}
