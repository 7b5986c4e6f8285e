//! Concept CRUD and content generation endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use learncrafter_core::{
    Concept, CourseLevel, CreateConceptRequest, PromptError, PromptFormatter,
    UpdateConceptRequest, ValidationReport, WorkflowStep,
};

use super::courses::DeletedResponse;
use super::{bad_request, course_error, internal, not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkflowStepQuery {
    pub workflow_step: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListConceptsQuery {
    pub module_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateQuery {
    pub feedback: Option<String>,
    pub workflow_step: Option<String>,
}

/// Request for the store-less generation endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerateConceptRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub module_context: Option<String>,
    #[serde(default)]
    pub level: CourseLevel,
}

#[derive(Debug, Serialize)]
pub struct GeneratedContent {
    pub concept_id: String,
    pub content: String,
    pub validation: ValidationReport,
}

fn parse_workflow_step(raw: Option<&str>, default: WorkflowStep) -> Result<WorkflowStep, ApiError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| bad_request(format!("Unknown workflow step: {}", value))),
        None => Ok(default),
    }
}

fn template_error(err: PromptError) -> ApiError {
    match err {
        PromptError::NotFound(id) => bad_request(format!("No prompt template stored for {}", id)),
        other => internal(other.to_string()),
    }
}

pub async fn create_concept(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkflowStepQuery>,
    Json(mut request): Json<CreateConceptRequest>,
) -> Result<(StatusCode, Json<Concept>), ApiError> {
    let step = parse_workflow_step(query.workflow_step.as_deref(), WorkflowStep::ConceptGeneration)?;
    request.validate().map_err(bad_request)?;

    let module = state
        .store()
        .get_module(&request.module_id)
        .map_err(course_error)?
        .ok_or_else(|| not_found(format!("Module {} not found", request.module_id)))?;

    let level = state
        .store()
        .get_course(&module.course_id)
        .map_err(course_error)?
        .map(|course| course.level)
        .unwrap_or_default();

    let module_context = PromptFormatter::module_context(&module);
    let prompt = state
        .formatter()
        .concept_prompt(
            step,
            &request.title,
            request.description.as_deref(),
            &request.learning_objectives,
            &request.prerequisites,
            Some(&module_context),
            level,
        )
        .map_err(template_error)?;

    let content = state
        .generator()
        .generate(&prompt)
        .await
        .map_err(|e| internal(format!("Content generation failed: {}", e)))?;

    let report = state.validator().validate(&content);
    if !report.is_valid {
        warn!(
            concept_title = %request.title,
            errors = ?report.errors,
            "generated content failed validation, storing anyway"
        );
    }

    request.content = content;
    let concept = state
        .store()
        .create_concept(request)
        .map_err(course_error)?;
    Ok((StatusCode::CREATED, Json(concept)))
}

pub async fn list_concepts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListConceptsQuery>,
) -> Result<Json<Vec<Concept>>, ApiError> {
    let concepts = state
        .store()
        .list_concepts(&query.module_id)
        .map_err(course_error)?;
    Ok(Json(concepts))
}

pub async fn get_concept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Concept>, ApiError> {
    match state.store().get_concept(&id).map_err(course_error)? {
        Some(concept) => Ok(Json(concept)),
        None => Err(not_found(format!("Concept {} not found", id))),
    }
}

/// Metadata-only update. `content` is not part of the update type, so
/// generated content survives edits to titles and objectives.
pub async fn update_concept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UpdateConceptRequest>,
) -> Result<Json<Concept>, ApiError> {
    if update.is_empty() {
        return Err(bad_request("update must set at least one field"));
    }
    update.validate().map_err(bad_request)?;
    let concept = state
        .store()
        .update_concept(&id, update)
        .map_err(course_error)?;
    Ok(Json(concept))
}

pub async fn delete_concept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let concept = state.store().delete_concept(&id).map_err(course_error)?;
    Ok(Json(DeletedResponse {
        message: format!("Concept '{}' deleted", concept.title),
    }))
}

/// Generate content for the submitted concept fields without storing it.
pub async fn generate_concept(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkflowStepQuery>,
    Json(request): Json<GenerateConceptRequest>,
) -> Result<Json<GeneratedContent>, ApiError> {
    let step = parse_workflow_step(query.workflow_step.as_deref(), WorkflowStep::ConceptGeneration)?;

    let prompt = state
        .formatter()
        .concept_prompt(
            step,
            &request.title,
            request.description.as_deref(),
            &request.learning_objectives,
            &request.prerequisites,
            request.module_context.as_deref(),
            request.level,
        )
        .map_err(template_error)?;

    let content = state
        .generator()
        .generate(&prompt)
        .await
        .map_err(|e| internal(format!("Content generation failed: {}", e)))?;

    let validation = state.validator().validate(&content);
    Ok(Json(GeneratedContent {
        concept_id: String::new(),
        content,
        validation,
    }))
}

/// Regenerate a stored concept's content, optionally steered by feedback.
pub async fn regenerate_concept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<RegenerateQuery>,
) -> Result<Json<Concept>, ApiError> {
    parse_workflow_step(
        query.workflow_step.as_deref(),
        WorkflowStep::ConceptRegeneration,
    )?;

    let concept = state
        .store()
        .get_concept(&id)
        .map_err(course_error)?
        .ok_or_else(|| not_found(format!("Concept {} not found", id)))?;

    let prompt = state
        .formatter()
        .regeneration_prompt(&concept.title, &concept.content, query.feedback.as_deref())
        .map_err(template_error)?;

    let content = state
        .generator()
        .generate(&prompt)
        .await
        .map_err(|e| internal(format!("Content generation failed: {}", e)))?;

    let report = state.validator().validate(&content);
    if !report.is_valid {
        warn!(
            concept_id = %id,
            errors = ?report.errors,
            "regenerated content failed validation, storing anyway"
        );
    }

    let updated = state
        .store()
        .set_concept_content(&id, &content)
        .map_err(course_error)?;
    Ok(Json(updated))
}

/// Run structural validation plus an advisory LLM review of a concept's
/// stored content. The LLM feedback is best effort; structural findings are
/// returned even if the review call fails.
pub async fn validate_concept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<WorkflowStepQuery>,
) -> Result<Json<ValidationReport>, ApiError> {
    parse_workflow_step(
        query.workflow_step.as_deref(),
        WorkflowStep::ContentValidation,
    )?;

    let concept = state
        .store()
        .get_concept(&id)
        .map_err(course_error)?
        .ok_or_else(|| not_found(format!("Concept {} not found", id)))?;

    let report = state.validator().validate(&concept.content);

    let report = match state.formatter().validation_prompt(&concept.content) {
        Ok(prompt) => match state.generator().generate(&prompt).await {
            Ok(feedback) => report.with_llm_feedback(feedback),
            Err(err) => {
                warn!(concept_id = %id, error = %err, "validation review call failed");
                report
            }
        },
        Err(err) => {
            warn!(concept_id = %id, error = %err, "no validation prompt available");
            report
        }
    };

    Ok(Json(report))
}

pub async fn list_valid_prompt_ids(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let prompts = state
        .prompt_store()
        .list_prompts()
        .map_err(super::prompt_error)?;
    Ok(Json(prompts.into_iter().map(|p| p.prompt_id).collect()))
}

pub async fn list_workflow_steps() -> Json<BTreeMap<&'static str, &'static str>> {
    let map = WorkflowStep::ALL
        .iter()
        .map(|step| (step.as_str(), step.prompt_id()))
        .collect();
    Json(map)
}
