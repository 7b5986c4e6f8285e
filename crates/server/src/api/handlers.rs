use axum::{extract::State, Json};
use learncrafter_core::{CourseLevel, CourseTopic, SanitizedConfig};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub message: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "learncrafter".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Course generation API. See /api/v1 for resources.".to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub name: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        name: "learncrafter".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_topics() -> Json<Vec<&'static str>> {
    Json(CourseTopic::ALL.iter().map(|t| t.as_str()).collect())
}

pub async fn list_levels() -> Json<Vec<&'static str>> {
    Json(CourseLevel::ALL.iter().map(|l| l.as_str()).collect())
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    collect_dynamic_metrics(&state);
    encode_metrics()
}
