use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use mocktest_backend::error::{Error, Result};
use mocktest_backend::models::mocktest::MockTest;
use mocktest_backend::models::outcome::OutcomeRecord;
use mocktest_backend::routes;
use mocktest_backend::services::bank_service::BankService;
use mocktest_backend::services::media::MediaResolver;
use mocktest_backend::storage::memory::MemoryStore;
use mocktest_backend::storage::OutcomeStore;
use mocktest_backend::AppState;
use rust_xlsxwriter::Workbook;

fn bank_service() -> BankService {
    BankService::new(MediaResolver::new(
        "http://localhost:8000",
        "static/",
        "static/mocktest_images",
    ))
}

fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState {
        mocktests: store.clone(),
        outcomes: store.clone(),
        attempt_cache: store,
        bank_service: bank_service(),
    }
}

/// Three questions across two sections, answer key A / B / A.
fn write_fixture(rows: &[Vec<&str>]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mocktest-api-{}.xlsx", Uuid::new_v4()));
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet.write_string(r as u32, c as u16, *cell).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();
    path
}

fn standard_fixture() -> PathBuf {
    write_fixture(&[
        vec!["question_id", "question", "option_a", "option_b", "option_c", "correct_option", "section"],
        vec!["q1", "2 + 2?", "4", "5", "6", "A", "Maths"],
        vec!["q2", "3 * 3?", "6", "9", "12", "B", "Maths"],
        vec!["q3", "Pick the noun", "cat", "run", "blue", "A", "English"],
    ])
}

fn mocktest(file_path: &str) -> MockTest {
    MockTest {
        id: Uuid::new_v4(),
        name: "Sample Mock".to_string(),
        exam_type: Some("CUET".to_string()),
        test_type: "full".to_string(),
        subject: None,
        file_path: file_path.to_string(),
        total_questions: 3,
        duration_minutes: 60,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

/// Router plus the seeded test id.
fn app() -> (Router, Uuid) {
    let path = standard_fixture();
    let store = Arc::new(MemoryStore::new());
    let test = mocktest(path.to_str().unwrap());
    let test_id = test.id;
    store.add_mocktest(test);
    (routes::router(test_state(store)), test_id)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn full_listing_returns_seeded_tests() {
    let (app, test_id) = app();
    let response = app.oneshot(get("/api/mocktests/full")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], test_id.to_string());
    assert_eq!(body[0]["name"], "Sample Mock");
    assert_eq!(body[0]["duration_minutes"], 60);
}

#[tokio::test]
async fn resume_never_exposes_the_answer_key() {
    let (app, test_id) = app();
    let user_id = Uuid::new_v4();

    let response = app
        .oneshot(get(&format!("/api/mocktests/{}/resume/{}", test_id, user_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);
    assert_eq!(body["remaining_seconds"], 3600);
    assert_eq!(body["current_question"], 0);
    let q = &body["questions"][0];
    assert_eq!(q["question_id"], "q1");
    assert!(q.get("correct_answer").is_none());
    assert!(q.get("explanation").is_none());
}

#[tokio::test]
async fn save_then_resume_restores_progress() {
    let (app, test_id) = app();
    let user_id = Uuid::new_v4();

    let save = app
        .clone()
        .oneshot(post_json(
            &format!("/api/mocktests/{}/save/{}", test_id, user_id),
            json!({
                "answers": {"q1": "A", "q2": "C"},
                "time_left": 1200,
                "current_question": 2
            }),
        ))
        .await
        .unwrap();
    assert_eq!(save.status(), StatusCode::OK);
    assert_eq!(body_json(save).await["saved"], true);

    let resume = app
        .oneshot(get(&format!("/api/mocktests/{}/resume/{}", test_id, user_id)))
        .await
        .unwrap();
    let body = body_json(resume).await;
    assert_eq!(body["answers_snapshot"]["q1"], "A");
    assert_eq!(body["answers_snapshot"]["q2"], "C");
    assert_eq!(body["remaining_seconds"], 1200);
    assert_eq!(body["current_question"], 2);
}

#[tokio::test]
async fn negative_time_left_is_rejected() {
    let (app, test_id) = app();
    let user_id = Uuid::new_v4();

    let response = app
        .oneshot(post_json(
            &format!("/api/mocktests/{}/save/{}", test_id, user_id),
            json!({"answers": {}, "time_left": -5, "current_question": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_scores_with_negative_marking_and_drops_the_cache() {
    let (app, test_id) = app();
    let user_id = Uuid::new_v4();

    // Autosave first so the cleanup after submit is observable.
    app.clone()
        .oneshot(post_json(
            &format!("/api/mocktests/{}/save/{}", test_id, user_id),
            json!({"answers": {"q1": "A"}, "time_left": 900, "current_question": 1}),
        ))
        .await
        .unwrap();

    // q1 correct, q2 wrong, q3 unattempted: 1 - 0.25 = 0.75.
    let submit = app
        .clone()
        .oneshot(post_json(
            &format!("/api/mocktests/{}/submit/{}", test_id, user_id),
            json!({"answers": {"q1": "A", "q2": "C", "q3": ""}}),
        ))
        .await
        .unwrap();
    assert_eq!(submit.status(), StatusCode::OK);

    let body = body_json(submit).await;
    assert_eq!(body["score"], 0.75);
    assert_eq!(body["total_questions"], 3);
    assert_eq!(body["percentage"], 25.0);
    assert_eq!(body["status"], "completed");
    assert!(body["result_id"].as_str().is_some());

    // The attempt cache is gone, so resume starts fresh.
    let resume = app
        .oneshot(get(&format!("/api/mocktests/{}/resume/{}", test_id, user_id)))
        .await
        .unwrap();
    let resumed = body_json(resume).await;
    assert_eq!(resumed["answers_snapshot"], json!({}));
    assert_eq!(resumed["remaining_seconds"], 3600);
}

#[tokio::test]
async fn clock_driven_submission_is_marked_auto_submitted() {
    let (app, test_id) = app();
    let user_id = Uuid::new_v4();

    let submit = app
        .oneshot(post_json(
            &format!("/api/mocktests/{}/submit/{}", test_id, user_id),
            json!({"answers": {}, "auto_submitted": true}),
        ))
        .await
        .unwrap();
    assert_eq!(submit.status(), StatusCode::OK);
    assert_eq!(body_json(submit).await["status"], "auto_submitted");
}

#[tokio::test]
async fn every_submission_creates_its_own_outcome() {
    let (app, test_id) = app();
    let user_id = Uuid::new_v4();

    for _ in 0..2 {
        let submit = app
            .clone()
            .oneshot(post_json(
                &format!("/api/mocktests/{}/submit/{}", test_id, user_id),
                json!({"answers": {"q1": "A"}}),
            ))
            .await
            .unwrap();
        assert_eq!(submit.status(), StatusCode::OK);
    }

    let summary = app
        .oneshot(get(&format!("/api/mocktests/results/summary/{}", user_id)))
        .await
        .unwrap();
    assert_eq!(body_json(summary).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn preview_reconciles_sections_and_ranks_candidates() {
    let (app, test_id) = app();

    // Two candidates; the second outscores the first.
    let low = body_json(
        app.clone()
            .oneshot(post_json(
                &format!("/api/mocktests/{}/submit/{}", test_id, Uuid::new_v4()),
                json!({"answers": {"q1": "B"}}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let high = body_json(
        app.clone()
            .oneshot(post_json(
                &format!("/api/mocktests/{}/submit/{}", test_id, Uuid::new_v4()),
                json!({"answers": {"q1": "A", "q2": "B", "q3": "A"}}),
            ))
            .await
            .unwrap(),
    )
    .await;

    let preview = app
        .oneshot(get(&format!(
            "/api/mocktests/result/{}/preview",
            high["result_id"].as_str().unwrap()
        )))
        .await
        .unwrap();
    assert_eq!(preview.status(), StatusCode::OK);

    let body = body_json(preview).await;
    assert_eq!(body["score"], 3.0);
    assert_eq!(body["percentage"], 100.0);
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);

    let sections = body["sections_summary"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["section_name"], "English");
    assert_eq!(sections[0]["correct"], 1);
    assert_eq!(sections[0]["percentage"], 100.0);
    assert_eq!(sections[1]["section_name"], "Maths");
    assert_eq!(sections[1]["marks"], 2.0);

    assert_eq!(body["analytics"]["rank"], 1);
    assert_eq!(body["analytics"]["total_candidates"], 2);
    assert_eq!(body["analytics"]["percentile"], 50.0);
    assert_eq!(body["analytics"]["topper_score"], 3.0);
    assert_eq!(body["analytics"]["performance_band"], "Top 50%");
    assert_eq!(low["score"], -0.25);
}

#[tokio::test]
async fn unknown_test_is_not_found() {
    let (app, _) = app();
    let response = app
        .oneshot(get(&format!(
            "/api/mocktests/{}/resume/{}",
            Uuid::new_v4(),
            Uuid::new_v4()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn header_only_bank_cannot_be_submitted() {
    let path = write_fixture(&[vec!["question_id", "question", "option_a", "correct_option"]]);
    let store = Arc::new(MemoryStore::new());
    let test = mocktest(path.to_str().unwrap());
    let test_id = test.id;
    store.add_mocktest(test);
    let app = routes::router(test_state(store));

    let response = app
        .oneshot(post_json(
            &format!("/api/mocktests/{}/submit/{}", test_id, Uuid::new_v4()),
            json!({"answers": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("no questions to score"));
}

mockall::mock! {
    Outcomes {}

    #[async_trait::async_trait]
    impl OutcomeStore for Outcomes {
        async fn save(&self, record: &OutcomeRecord) -> Result<Uuid>;
        async fn get(&self, id: Uuid) -> Result<OutcomeRecord>;
        async fn list_by_test(&self, mocktest_id: Uuid) -> Result<Vec<OutcomeRecord>>;
        async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OutcomeRecord>>;
    }
}

#[tokio::test]
async fn storage_failure_surfaces_as_server_error() {
    let path = standard_fixture();
    let store = Arc::new(MemoryStore::new());
    let test = mocktest(path.to_str().unwrap());
    let test_id = test.id;
    store.add_mocktest(test);

    let mut outcomes = MockOutcomes::new();
    outcomes
        .expect_save()
        .returning(|_| Err(Error::persistence("test write", sqlx::Error::PoolTimedOut)));

    let state = AppState {
        mocktests: store.clone(),
        outcomes: Arc::new(outcomes),
        attempt_cache: store,
        bank_service: bank_service(),
    };
    let app = routes::router(state);

    let response = app
        .oneshot(post_json(
            &format!("/api/mocktests/{}/submit/{}", test_id, Uuid::new_v4()),
            json!({"answers": {"q1": "A"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Persistence failure"));
}
