//! Integration tests for the publish job endpoints.
//!
//! Drives the background publisher through the HTTP surface with a
//! scripted generator, polling the status endpoint like a client would.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{fixtures, TestFixture, TestResponse};

/// Poll the status endpoint until the job reaches a terminal state.
async fn wait_for_terminal(fixture: &TestFixture, job_id: &str) -> Value {
    for _ in 0..200 {
        let response = fixture
            .get(&format!("/api/v1/courses/publishJob/{}/status", job_id))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let status = response.body["status"].as_str().unwrap().to_string();
        if status == "completed" || status == "failed" {
            return response.body;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("publish job {} did not finish in time", job_id);
}

async fn start_job(fixture: &TestFixture, body: Value) -> TestResponse {
    fixture.post("/api/v1/courses/publishJob", body).await
}

#[tokio::test]
async fn test_manual_plan_publishes_course() {
    let fixture = TestFixture::new().await;

    // Four content calls, no planning calls
    for title in ["A1", "A2", "B1", "B2"] {
        fixture.generator.push_text(fixtures::html_page(title));
    }

    let response = start_job(
        &fixture,
        json!({
            "topic": "physics",
            "level": "intermediate",
            "course_title": "Classical Mechanics",
            "course_description": "From kinematics to Lagrangians",
            "modules": [
                {
                    "title": "Kinematics",
                    "description": "Motion in one dimension",
                    "concepts": [
                        {"title": "A1", "learning_objectives": ["Plot position over time"]},
                        {"title": "A2"}
                    ]
                },
                {
                    "title": "Dynamics",
                    "concepts": [{"title": "B1"}, {"title": "B2"}]
                }
            ]
        }),
    )
    .await;

    assert_status!(response, StatusCode::ACCEPTED);
    let job_id = response.body["job_id"].as_str().unwrap().to_string();
    assert!(response.body["message"].is_string());

    let job = wait_for_terminal(&fixture, &job_id).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["progress_percentage"], 100.0);
    // 3 fixed steps + 2 modules + 4 concepts
    assert_eq!(job["total_steps"], 9);
    assert_eq!(job["completed_steps"], 9);
    assert!(job["error_message"].is_null());

    // Manual plans never hit the planner
    assert_eq!(fixture.generator.call_count(), 4);

    let course_id = job["course_id"].as_str().unwrap();
    let full = fixture
        .get(&format!("/api/v1/courses/{}/full", course_id))
        .await;
    assert_status!(full, StatusCode::OK);
    assert_eq!(full.body["title"], "Classical Mechanics");
    let modules = full.body["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0]["concepts"].as_array().unwrap().len(), 2);
    assert!(modules[0]["concepts"][0]["content"]
        .as_str()
        .unwrap()
        .contains("A1"));
}

#[tokio::test]
async fn test_llm_plan_publishes_course() {
    let fixture = TestFixture::new().await;

    // Calls arrive in a fixed order: course plan, then per module a concept
    // plan followed by that module's content generations.
    fixture
        .generator
        .push_text(fixtures::course_plan_json("Signals", &["Time Domain", "Frequency Domain"]));
    fixture
        .generator
        .push_text(fixtures::concept_plans_json(&["Sampling", "Aliasing"]));
    fixture.generator.push_text(fixtures::html_page("Sampling"));
    fixture.generator.push_text(fixtures::html_page("Aliasing"));
    fixture
        .generator
        .push_text(fixtures::concept_plans_json(&["Fourier Series", "FFT"]));
    fixture
        .generator
        .push_text(fixtures::html_page("Fourier Series"));
    fixture.generator.push_text(fixtures::html_page("FFT"));

    let response = start_job(
        &fixture,
        json!({
            "topic": "data-science",
            "num_modules": 2,
            "concepts_per_module": 2
        }),
    )
    .await;
    assert_status!(response, StatusCode::ACCEPTED);
    let job_id = response.body["job_id"].as_str().unwrap().to_string();

    let job = wait_for_terminal(&fixture, &job_id).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(fixture.generator.call_count(), 7);

    let course_id = job["course_id"].as_str().unwrap();
    let full = fixture
        .get(&format!("/api/v1/courses/{}/full", course_id))
        .await;
    assert_eq!(full.body["title"], "Signals");
    let modules = full.body["modules"].as_array().unwrap();
    assert_eq!(modules[1]["title"], "Frequency Domain");
    assert_eq!(modules[1]["concepts"][1]["title"], "FFT");
}

#[tokio::test]
async fn test_planning_failure_fails_the_job() {
    let fixture = TestFixture::new().await;
    fixture.generator.push_failure("model unavailable");

    let response = start_job(&fixture, json!({"topic": "chemistry"})).await;
    assert_status!(response, StatusCode::ACCEPTED);
    let job_id = response.body["job_id"].as_str().unwrap().to_string();

    let job = wait_for_terminal(&fixture, &job_id).await;
    assert_eq!(job["status"], "failed");
    assert!(job["error_message"]
        .as_str()
        .unwrap()
        .contains("planning"));
    assert!(job["course_id"].is_null());
}

#[tokio::test]
async fn test_failed_concept_does_not_fail_the_job() {
    let fixture = TestFixture::new().await;

    fixture.generator.push_text(fixtures::html_page("First"));
    fixture.generator.push_failure("content generation hiccup");
    fixture.generator.push_text(fixtures::html_page("Third"));

    let response = start_job(
        &fixture,
        json!({
            "topic": "mathematics",
            "course_title": "Resilience",
            "modules": [
                {
                    "title": "Only Module",
                    "concepts": [
                        {"title": "First"},
                        {"title": "Second"},
                        {"title": "Third"}
                    ]
                }
            ]
        }),
    )
    .await;
    let job_id = response.body["job_id"].as_str().unwrap().to_string();

    let job = wait_for_terminal(&fixture, &job_id).await;
    assert_eq!(job["status"], "completed");

    let course_id = job["course_id"].as_str().unwrap();
    let full = fixture
        .get(&format!("/api/v1/courses/{}/full", course_id))
        .await;
    // The failed unit leaves its skeleton row behind with empty content
    let concepts = full.body["modules"][0]["concepts"].as_array().unwrap();
    assert_eq!(concepts.len(), 3);
    assert!(concepts[0]["content"].as_str().unwrap().contains("First"));
    assert_eq!(concepts[1]["content"], "");
    assert!(concepts[2]["content"].as_str().unwrap().contains("Third"));
}

#[tokio::test]
async fn test_invalid_publish_request_rejected() {
    let fixture = TestFixture::new().await;

    let response = start_job(
        &fixture,
        json!({"topic": "physics", "num_modules": 0}),
    )
    .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("num_modules"));
}

#[tokio::test]
async fn test_unknown_job_status_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .get("/api/v1/courses/publishJob/no-such-job/status")
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}
