//! Module CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use learncrafter_core::{CreateModuleRequest, Module, UpdateModuleRequest};

use super::courses::{DeletedResponse, ModuleWithConcepts};
use super::{bad_request, course_error, not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListModulesQuery {
    pub course_id: String,
}

pub async fn create_module(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateModuleRequest>,
) -> Result<(StatusCode, Json<Module>), ApiError> {
    request.validate().map_err(bad_request)?;
    if state
        .store()
        .get_course(&request.course_id)
        .map_err(course_error)?
        .is_none()
    {
        return Err(not_found(format!(
            "Course {} not found",
            request.course_id
        )));
    }
    let module = state.store().create_module(request).map_err(course_error)?;
    Ok((StatusCode::CREATED, Json(module)))
}

pub async fn list_modules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListModulesQuery>,
) -> Result<Json<Vec<Module>>, ApiError> {
    let modules = state
        .store()
        .list_modules(&query.course_id)
        .map_err(course_error)?;
    Ok(Json(modules))
}

pub async fn get_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Module>, ApiError> {
    match state.store().get_module(&id).map_err(course_error)? {
        Some(module) => Ok(Json(module)),
        None => Err(not_found(format!("Module {} not found", id))),
    }
}

pub async fn list_module_concepts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ModuleWithConcepts>, ApiError> {
    let module = state
        .store()
        .get_module(&id)
        .map_err(course_error)?
        .ok_or_else(|| not_found(format!("Module {} not found", id)))?;
    let concepts = state.store().list_concepts(&id).map_err(course_error)?;
    Ok(Json(ModuleWithConcepts { module, concepts }))
}

pub async fn update_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UpdateModuleRequest>,
) -> Result<Json<Module>, ApiError> {
    if update.is_empty() {
        return Err(bad_request("update must set at least one field"));
    }
    update.validate().map_err(bad_request)?;
    let module = state
        .store()
        .update_module(&id, update)
        .map_err(course_error)?;
    Ok(Json(module))
}

pub async fn delete_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let module = state.store().delete_module(&id).map_err(course_error)?;
    Ok(Json(DeletedResponse {
        message: format!("Module '{}' deleted", module.title),
    }))
}
