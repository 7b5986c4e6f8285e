use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{concepts, courses, handlers, modules, prompts};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Sanitized runtime configuration
        .route("/config", get(handlers::get_config))
        // Publish jobs
        .route("/courses/publishJob", post(courses::start_publish_job))
        .route(
            "/courses/publishJob/{job_id}/status",
            get(courses::get_publish_job_status),
        )
        // Courses
        .route("/courses", post(courses::create_course))
        .route("/courses", get(courses::list_courses))
        .route("/courses/{id}", get(courses::get_course))
        .route("/courses/{id}/full", get(courses::get_course_full))
        .route("/courses/{id}", put(courses::update_course))
        .route("/courses/{id}", delete(courses::delete_course))
        // Modules
        .route("/modules", post(modules::create_module))
        .route("/modules", get(modules::list_modules))
        .route("/modules/{id}", get(modules::get_module))
        .route("/modules/{id}/concepts", get(modules::list_module_concepts))
        .route("/modules/{id}", put(modules::update_module))
        .route("/modules/{id}", delete(modules::delete_module))
        // Concepts
        .route("/concepts", post(concepts::create_concept))
        .route("/concepts", get(concepts::list_concepts))
        .route("/concepts/generate", post(concepts::generate_concept))
        .route(
            "/concepts/prompts/valid-ids",
            get(concepts::list_valid_prompt_ids),
        )
        .route(
            "/concepts/prompts/workflow-steps",
            get(concepts::list_workflow_steps),
        )
        .route("/concepts/{id}", get(concepts::get_concept))
        .route("/concepts/{id}", put(concepts::update_concept))
        .route("/concepts/{id}", delete(concepts::delete_concept))
        .route(
            "/concepts/{id}/regenerate",
            post(concepts::regenerate_concept),
        )
        .route("/concepts/{id}/validate", post(concepts::validate_concept))
        // Prompt templates
        .route("/prompts", post(prompts::create_prompt))
        .route("/prompts", get(prompts::list_prompts))
        .route("/prompts/{id}", get(prompts::get_prompt))
        .route("/prompts/{id}", put(prompts::update_prompt))
        .route("/prompts/{id}", delete(prompts::delete_prompt));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/topics", get(handlers::list_topics))
        .route("/levels", get(handlers::list_levels))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
