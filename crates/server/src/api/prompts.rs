//! Prompt template CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use learncrafter_core::{CreatePromptRequest, Prompt, UpdatePromptRequest};

use super::{bad_request, not_found, prompt_error, ApiError};
use crate::state::AppState;

pub async fn create_prompt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePromptRequest>,
) -> Result<(StatusCode, Json<Prompt>), ApiError> {
    request.validate().map_err(bad_request)?;
    let prompt = state
        .prompt_store()
        .create_prompt(&request)
        .map_err(prompt_error)?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

pub async fn list_prompts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Prompt>>, ApiError> {
    let prompts = state.prompt_store().list_prompts().map_err(prompt_error)?;
    Ok(Json(prompts))
}

pub async fn get_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Prompt>, ApiError> {
    match state.prompt_store().get_prompt(&id).map_err(prompt_error)? {
        Some(prompt) => Ok(Json(prompt)),
        None => Err(not_found(format!("Prompt {} not found", id))),
    }
}

pub async fn update_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UpdatePromptRequest>,
) -> Result<Json<Prompt>, ApiError> {
    if update.is_empty() {
        return Err(bad_request("update must set at least one field"));
    }
    update.validate().map_err(bad_request)?;
    let prompt = state
        .prompt_store()
        .update_prompt(&id, &update)
        .map_err(prompt_error)?;
    Ok(Json(prompt))
}

pub async fn delete_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .prompt_store()
        .delete_prompt(&id)
        .map_err(prompt_error)?;
    Ok(StatusCode::NO_CONTENT)
}
