//! Common test utilities for E2E testing with mocks.
//!
//! Provides an in-process server with a scripted content generator injected,
//! enabling comprehensive E2E testing without an LLM backend.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use learncrafter_core::{
    testing::MockContentGenerator, Config, ContentConfig, ContentGenerator, ContentValidator,
    CoursePublisher, CourseStore, DatabaseConfig, JobTracker, LlmConfig, LlmProvider,
    PromptFormatter, PromptStore, ServerConfig, SqliteCourseStore, SqlitePromptStore, StepPacer,
};

/// Re-export fixtures for test convenience
pub use learncrafter_core::testing::fixtures;

/// Test fixture for E2E testing with a scripted generator.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_course_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/courses", json!({
///         "title": "Test",
///         "topic": "physics"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Scripted content generator, stands in for the LLM
    pub generator: Arc<MockContentGenerator>,
    /// Course/module/concept store, shared with the server
    pub store: Arc<dyn CourseStore>,
    /// Prompt template store, shared with the server
    pub prompt_store: Arc<dyn PromptStore>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the three workflow prompts seeded.
    pub async fn new() -> Self {
        let fixture = Self::bare().await;
        fixture.seed_workflow_prompts();
        fixture
    }

    /// Create a test fixture without any stored prompt templates.
    pub async fn bare() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                model: None,
                api_key: None,
                base_url: None,
                max_tokens: 1024,
                temperature: 0.0,
                request_delay_secs: 0.0,
            },
            server: ServerConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            content: ContentConfig::default(),
        };

        let store: Arc<dyn CourseStore> = Arc::new(
            SqliteCourseStore::new(&db_path).expect("Failed to create course store"),
        );
        let prompt_store: Arc<dyn PromptStore> = Arc::new(
            SqlitePromptStore::new(&db_path).expect("Failed to create prompt store"),
        );

        let generator = Arc::new(MockContentGenerator::new());
        let formatter = Arc::new(PromptFormatter::new(Arc::clone(&prompt_store)));
        let validator = ContentValidator::new(config.content.max_content_length);
        let tracker = Arc::new(JobTracker::new());

        let publisher = Arc::new(CoursePublisher::new(
            Arc::clone(&store),
            Arc::clone(&formatter),
            Arc::clone(&generator) as Arc<dyn ContentGenerator>,
            Arc::clone(&tracker),
            StepPacer::disabled(),
        ));

        let state = Arc::new(learncrafter_server::state::AppState::new(
            config,
            Arc::clone(&store),
            Arc::clone(&prompt_store),
            formatter,
            Arc::clone(&generator) as Arc<dyn ContentGenerator>,
            validator,
            tracker,
            publisher,
        ));

        let router = learncrafter_server::api::create_router(state);

        Self {
            router,
            generator,
            store,
            prompt_store,
            temp_dir,
        }
    }

    /// Store the three workflow templates the generation endpoints resolve.
    pub fn seed_workflow_prompts(&self) {
        let prompts = [
            (
                "concept_generation",
                "Write HTML for '{title}' ({module_context}, {level}).\nDescription: {description}\nObjectives:\n{objectives}\nPrerequisites:\n{prerequisites}",
            ),
            (
                "concept_regeneration",
                "Revise the HTML for '{title}'.\nFeedback: {feedback}\nCurrent content:\n{current_content}",
            ),
            (
                "content_validation",
                "Review this HTML for quality issues:\n{content}",
            ),
        ];
        for (id, template) in prompts {
            self.prompt_store
                .create_prompt(&learncrafter_core::CreatePromptRequest {
                    prompt_id: id.to_string(),
                    name: format!("{} template", id),
                    description: None,
                    template: template.to_string(),
                })
                .expect("Failed to seed prompt");
        }
    }

    /// Create a course directly in the store, returning its id.
    pub fn seed_course(&self, title: &str) -> String {
        let course = self
            .store
            .create_course(learncrafter_core::CreateCourseRequest {
                title: title.to_string(),
                description: Some("Seeded for testing".to_string()),
                topic: learncrafter_core::CourseTopic::Programming,
                level: learncrafter_core::CourseLevel::Beginner,
            })
            .expect("Failed to seed course");
        course.id
    }

    /// Create a module under a course directly in the store.
    pub fn seed_module(&self, course_id: &str, title: &str, order_index: u32) -> String {
        let module = self
            .store
            .create_module(learncrafter_core::CreateModuleRequest {
                course_id: course_id.to_string(),
                title: title.to_string(),
                description: Some("Seeded module".to_string()),
                order_index,
            })
            .expect("Failed to seed module");
        module.id
    }

    /// Create a concept with content directly in the store.
    pub fn seed_concept(&self, module_id: &str, title: &str, order_index: u32) -> String {
        let concept = self
            .store
            .create_concept(learncrafter_core::CreateConceptRequest {
                module_id: module_id.to_string(),
                title: title.to_string(),
                description: None,
                order_index,
                content: fixtures::html_page(title),
                learning_objectives: vec![format!("Understand {}", title)],
                prerequisites: vec![],
            })
            .expect("Failed to seed concept");
        concept.id
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.post(path, json!({})).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a plain-text endpoint (e.g. /metrics).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let request = match body {
            Some(json_body) => {
                request_builder = request_builder.header("Content-Type", "application/json");
                request_builder
                    .body(Body::from(json_body.to_string()))
                    .unwrap()
            }
            None => request_builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Assert that a response has the expected status, with the body in the
/// failure message.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $expected:expr) => {
        assert_eq!(
            $response.status, $expected,
            "unexpected status, body: {}",
            $response.body
        );
    };
}
