//! End-to-end tests with a mocked content generator.
//!
//! These tests run the full server stack in-process with a scripted
//! generator standing in for the LLM backend.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};

// =============================================================================
// Platform Endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["name"], "learncrafter");
}

#[tokio::test]
async fn test_root_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["name"], "learncrafter");
    assert!(response.body["version"].is_string());
}

#[tokio::test]
async fn test_topics_and_levels_endpoints() {
    let fixture = TestFixture::new().await;

    let topics = fixture.get("/topics").await;
    assert_status!(topics, StatusCode::OK);
    let topic_list = topics.body.as_array().unwrap();
    assert!(topic_list.iter().any(|t| t == "physics"));
    assert!(topic_list.iter().any(|t| t == "machine-learning"));

    let levels = fixture.get("/levels").await;
    assert_status!(levels, StatusCode::OK);
    assert_eq!(levels.body, json!(["beginner", "intermediate", "advanced"]));
}

#[tokio::test]
async fn test_config_endpoint_redacts_secrets() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["llm"]["provider"], "ollama");
    assert_eq!(response.body["llm"]["api_key_configured"], false);
    assert!(response.body["llm"].get("api_key").is_none());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/health").await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("learncrafter_http_requests_total"));
    assert!(body.contains("learncrafter_publish_jobs_tracked"));
}

// =============================================================================
// Course CRUD
// =============================================================================

#[tokio::test]
async fn test_create_and_get_course() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/courses",
            json!({
                "title": "Thermodynamics Basics",
                "description": "Heat, work and entropy",
                "topic": "physics",
                "level": "intermediate"
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["title"], "Thermodynamics Basics");
    assert_eq!(response.body["status"], "draft");
    let id = response.body["id"].as_str().unwrap();

    let get_response = fixture.get(&format!("/api/v1/courses/{}", id)).await;
    assert_status!(get_response, StatusCode::OK);
    assert_eq!(get_response.body["topic"], "physics");
    assert_eq!(get_response.body["level"], "intermediate");
}

#[tokio::test]
async fn test_create_course_rejects_empty_title() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/courses", json!({"title": "  ", "topic": "physics"}))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_create_course_rejects_unknown_topic() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/courses", json!({"title": "T", "topic": "alchemy"}))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_course_rejects_malformed_json() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/courses", "{not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_course_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/courses/nope").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_update_course() {
    let fixture = TestFixture::new().await;
    let id = fixture.seed_course("Before");

    let response = fixture
        .put(
            &format!("/api/v1/courses/{}", id),
            json!({"title": "After", "status": "active"}),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["title"], "After");
    assert_eq!(response.body["status"], "active");
}

#[tokio::test]
async fn test_update_course_rejects_empty_body() {
    let fixture = TestFixture::new().await;
    let id = fixture.seed_course("Unchanged");

    let response = fixture
        .put(&format!("/api/v1/courses/{}", id), json!({}))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_course_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .put("/api/v1/courses/ghost", json!({"title": "New"}))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_course_cascades() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Doomed");
    let module_id = fixture.seed_module(&course_id, "Doomed Module", 1);
    let concept_id = fixture.seed_concept(&module_id, "Doomed Concept", 1);

    let response = fixture
        .delete(&format!("/api/v1/courses/{}", course_id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert!(response.body["message"].as_str().unwrap().contains("Doomed"));

    let module = fixture.get(&format!("/api/v1/modules/{}", module_id)).await;
    assert_status!(module, StatusCode::NOT_FOUND);
    let concept = fixture
        .get(&format!("/api/v1/concepts/{}", concept_id))
        .await;
    assert_status!(concept, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_courses_pagination() {
    let fixture = TestFixture::new().await;
    for i in 0..25 {
        fixture.seed_course(&format!("Course {:02}", i));
    }

    let response = fixture.get("/api/v1/courses?size=10&page=2").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 10);
    assert_eq!(response.body["page"], 2);
    assert_eq!(response.body["size"], 10);
    assert_eq!(response.body["pages"], 3);

    let last = fixture.get("/api/v1/courses?size=10&page=3").await;
    assert_eq!(last.body["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_list_courses_rejects_bad_pagination() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/courses?page=0").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.get("/api/v1/courses?size=101").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_courses_filters() {
    let fixture = TestFixture::new().await;
    fixture
        .post(
            "/api/v1/courses",
            json!({"title": "Orbital Mechanics", "topic": "physics"}),
        )
        .await;
    fixture
        .post(
            "/api/v1/courses",
            json!({"title": "Sorting Algorithms", "topic": "computer-science"}),
        )
        .await;

    let by_topic = fixture.get("/api/v1/courses?topic=physics").await;
    assert_status!(by_topic, StatusCode::OK);
    let data = by_topic.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Orbital Mechanics");

    let by_search = fixture.get("/api/v1/courses?search=sorting").await;
    let data = by_search.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Sorting Algorithms");
}

#[tokio::test]
async fn test_get_course_full_nests_modules_and_concepts() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Full View");
    let m1 = fixture.seed_module(&course_id, "First", 1);
    let m2 = fixture.seed_module(&course_id, "Second", 2);
    fixture.seed_concept(&m1, "Alpha", 1);
    fixture.seed_concept(&m1, "Beta", 2);
    fixture.seed_concept(&m2, "Gamma", 1);

    let response = fixture
        .get(&format!("/api/v1/courses/{}/full", course_id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["title"], "Full View");

    let modules = response.body["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0]["title"], "First");
    assert_eq!(modules[0]["concepts"].as_array().unwrap().len(), 2);
    assert_eq!(modules[1]["concepts"].as_array().unwrap().len(), 1);
    assert_eq!(modules[0]["concepts"][1]["title"], "Beta");
}

// =============================================================================
// Module CRUD
// =============================================================================

#[tokio::test]
async fn test_create_module_requires_existing_course() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/modules",
            json!({"course_id": "missing", "title": "Orphan", "order_index": 1}),
        )
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_module_crud() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");

    let created = fixture
        .post(
            "/api/v1/modules",
            json!({"course_id": course_id, "title": "Kinematics", "order_index": 1}),
        )
        .await;
    assert_status!(created, StatusCode::CREATED);
    let module_id = created.body["id"].as_str().unwrap().to_string();
    assert_eq!(created.body["order_index"], 1);

    let listed = fixture
        .get(&format!("/api/v1/modules?course_id={}", course_id))
        .await;
    assert_status!(listed, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let updated = fixture
        .put(
            &format!("/api/v1/modules/{}", module_id),
            json!({"description": "Motion without forces"}),
        )
        .await;
    assert_status!(updated, StatusCode::OK);
    assert_eq!(updated.body["description"], "Motion without forces");

    let deleted = fixture
        .delete(&format!("/api/v1/modules/{}", module_id))
        .await;
    assert_status!(deleted, StatusCode::OK);

    let gone = fixture.get(&format!("/api/v1/modules/{}", module_id)).await;
    assert_status!(gone, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_module_concepts_endpoint() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Waves", 1);
    fixture.seed_concept(&module_id, "Interference", 1);

    let response = fixture
        .get(&format!("/api/v1/modules/{}/concepts", module_id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["title"], "Waves");
    let concepts = response.body["concepts"].as_array().unwrap();
    assert_eq!(concepts.len(), 1);
    assert_eq!(concepts[0]["title"], "Interference");
}

// =============================================================================
// Concept CRUD and Generation
// =============================================================================

#[tokio::test]
async fn test_create_concept_generates_content() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Energy", 1);

    let html = fixtures::html_page("Potential Energy");
    fixture.generator.push_text(&html);

    let response = fixture
        .post(
            "/api/v1/concepts",
            json!({
                "module_id": module_id,
                "title": "Potential Energy",
                "order_index": 1,
                "learning_objectives": ["Relate height to stored energy"]
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["content"], html);
    assert_eq!(
        response.body["learning_objectives"][0],
        "Relate height to stored energy"
    );

    // The prompt carries the concept title and the owning module's context
    let prompts = fixture.generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Potential Energy"));
    assert!(prompts[0].contains("Energy - Seeded module"));
}

#[tokio::test]
async fn test_create_concept_missing_module_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/concepts",
            json!({"module_id": "void", "title": "Lost", "order_index": 1}),
        )
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_concept_without_template_returns_400() {
    let fixture = TestFixture::bare().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Empty", 1);

    let response = fixture
        .post(
            "/api/v1/concepts",
            json!({"module_id": module_id, "title": "No Template", "order_index": 1}),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("prompt template"));
}

#[tokio::test]
async fn test_update_concept_preserves_content() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Fields", 1);
    let concept_id = fixture.seed_concept(&module_id, "Flux", 1);

    let before = fixture
        .get(&format!("/api/v1/concepts/{}", concept_id))
        .await;
    let original_content = before.body["content"].as_str().unwrap().to_string();

    // `content` is not part of the update shape; a sneaky key is dropped
    let response = fixture
        .put(
            &format!("/api/v1/concepts/{}", concept_id),
            json!({"title": "Magnetic Flux", "content": "<p>overwritten</p>"}),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["title"], "Magnetic Flux");
    assert_eq!(response.body["content"], original_content);
}

#[tokio::test]
async fn test_regenerate_concept_with_feedback() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Optics", 1);
    let concept_id = fixture.seed_concept(&module_id, "Refraction", 1);

    let improved = fixtures::html_page("Refraction, Improved");
    fixture.generator.push_text(&improved);

    let response = fixture
        .post_empty(&format!(
            "/api/v1/concepts/{}/regenerate?feedback=Add%20worked%20examples",
            concept_id
        ))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["content"], improved);

    let prompts = fixture.generator.prompts();
    assert!(prompts[0].contains("Add worked examples"));
    assert!(prompts[0].contains("Refraction"));
}

#[tokio::test]
async fn test_regenerate_missing_concept_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post_empty("/api/v1/concepts/ghost/regenerate")
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_concept_clean_content() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Sound", 1);
    let concept_id = fixture.seed_concept(&module_id, "Resonance", 1);

    fixture.generator.push_text("Clear and well structured.");

    let response = fixture
        .post_empty(&format!("/api/v1/concepts/{}/validate", concept_id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["is_valid"], true);
    assert_eq!(response.body["llm_feedback"], "Clear and well structured.");
}

#[tokio::test]
async fn test_validate_concept_flags_dangerous_tags() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Risky", 1);

    let concept = fixture
        .store
        .create_concept(learncrafter_core::CreateConceptRequest {
            module_id: module_id.clone(),
            title: "Embedded Frame".to_string(),
            description: None,
            order_index: 1,
            content: "<html><body><iframe src=\"https://evil.example\"></iframe></body></html>"
                .to_string(),
            learning_objectives: vec![],
            prerequisites: vec![],
        })
        .unwrap();

    fixture.generator.push_text("Remove the embedded frame.");

    let response = fixture
        .post_empty(&format!("/api/v1/concepts/{}/validate", concept.id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["is_valid"], false);
    assert!(!response.body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_validate_survives_review_failure() {
    let fixture = TestFixture::new().await;
    let course_id = fixture.seed_course("Host");
    let module_id = fixture.seed_module(&course_id, "Sturdy", 1);
    let concept_id = fixture.seed_concept(&module_id, "Fallback", 1);

    fixture.generator.push_failure("review backend down");

    let response = fixture
        .post_empty(&format!("/api/v1/concepts/{}/validate", concept_id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["is_valid"], true);
    assert!(response.body["llm_feedback"].is_null());
}

#[tokio::test]
async fn test_generate_without_storing() {
    let fixture = TestFixture::new().await;
    let html = fixtures::html_page("Preview Only");
    fixture.generator.push_text(&html);

    let response = fixture
        .post(
            "/api/v1/concepts/generate",
            json!({
                "title": "Preview Only",
                "level": "advanced",
                "module_context": "Standalone preview"
            }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["concept_id"], "");
    assert_eq!(response.body["content"], html);
    assert_eq!(response.body["validation"]["is_valid"], true);

    let prompts = fixture.generator.prompts();
    assert!(prompts[0].contains("Standalone preview"));
    assert!(prompts[0].contains("advanced"));
}

#[tokio::test]
async fn test_unknown_workflow_step_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/concepts/generate?workflow_step=mystery",
            json!({"title": "T"}),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workflow_step_listing_endpoints() {
    let fixture = TestFixture::new().await;

    let steps = fixture.get("/api/v1/concepts/prompts/workflow-steps").await;
    assert_status!(steps, StatusCode::OK);
    assert_eq!(steps.body["concept_generation"], "concept_generation");
    assert_eq!(steps.body["content_validation"], "content_validation");

    let ids = fixture.get("/api/v1/concepts/prompts/valid-ids").await;
    assert_status!(ids, StatusCode::OK);
    let id_list = ids.body.as_array().unwrap();
    assert_eq!(id_list.len(), 3);
    assert!(id_list.iter().any(|v| v == "concept_regeneration"));
}

// =============================================================================
// Prompt Template CRUD
// =============================================================================

#[tokio::test]
async fn test_prompt_crud() {
    let fixture = TestFixture::bare().await;

    let created = fixture
        .post(
            "/api/v1/prompts",
            json!({
                "prompt_id": "quiz_generation",
                "name": "Quiz generator",
                "template": "Write a quiz about {title}"
            }),
        )
        .await;
    assert_status!(created, StatusCode::CREATED);
    assert_eq!(created.body["prompt_id"], "quiz_generation");

    let duplicate = fixture
        .post(
            "/api/v1/prompts",
            json!({
                "prompt_id": "quiz_generation",
                "name": "Second copy",
                "template": "{title}"
            }),
        )
        .await;
    assert_status!(duplicate, StatusCode::CONFLICT);

    let listed = fixture.get("/api/v1/prompts").await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let updated = fixture
        .put(
            "/api/v1/prompts/quiz_generation",
            json!({"template": "Write a short quiz about {title}"}),
        )
        .await;
    assert_status!(updated, StatusCode::OK);
    assert_eq!(updated.body["template"], "Write a short quiz about {title}");

    let deleted = fixture.delete("/api/v1/prompts/quiz_generation").await;
    assert_status!(deleted, StatusCode::NO_CONTENT);

    let gone = fixture.get("/api/v1/prompts/quiz_generation").await;
    assert_status!(gone, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prompt_validation() {
    let fixture = TestFixture::bare().await;

    let blank_template = fixture
        .post(
            "/api/v1/prompts",
            json!({"prompt_id": "p1", "name": "N", "template": "  "}),
        )
        .await;
    assert_status!(blank_template, StatusCode::BAD_REQUEST);

    let empty_update = fixture.put("/api/v1/prompts/p1", json!({})).await;
    assert_status!(empty_update, StatusCode::BAD_REQUEST);
}
