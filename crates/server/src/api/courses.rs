//! Course CRUD and publish job endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use learncrafter_core::{
    Concept, Course, CourseFilter, CourseLevel, CourseTopic, CreateCourseRequest, Module,
    PublishJob, PublishJobRequest, PublisherError, UpdateCourseRequest,
};

use super::{bad_request, course_error, internal, not_found, ApiError};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Publish jobs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PublishJobAccepted {
    pub job_id: String,
    pub message: String,
}

pub async fn start_publish_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishJobRequest>,
) -> Result<(StatusCode, Json<PublishJobAccepted>), ApiError> {
    match state.publisher().start_job(request) {
        Ok(job_id) => Ok((
            StatusCode::ACCEPTED,
            Json(PublishJobAccepted {
                job_id,
                message: "Course publishing started. Poll the status endpoint for progress."
                    .to_string(),
            }),
        )),
        Err(PublisherError::InvalidRequest(msg)) => Err(bad_request(msg)),
        Err(err) => Err(internal(err.to_string())),
    }
}

pub async fn get_publish_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<PublishJob>, ApiError> {
    match state.tracker().get(&job_id) {
        Some(job) => Ok(Json(job)),
        None => Err(not_found(format!("Publish job {} not found", job_id))),
    }
}

// ============================================================================
// Course CRUD
// ============================================================================

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct ListCoursesQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    pub topic: Option<CourseTopic>,
    pub level: Option<CourseLevel>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedCourses {
    pub data: Vec<Course>,
    pub page: i64,
    pub size: i64,
    pub pages: i64,
}

/// A course with its modules and their concepts, for the `/full` view.
#[derive(Debug, Serialize)]
pub struct CourseWithModules {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithConcepts>,
}

#[derive(Debug, Serialize)]
pub struct ModuleWithConcepts {
    #[serde(flatten)]
    pub module: Module,
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    request.validate().map_err(bad_request)?;
    let course = state.store().create_course(request).map_err(course_error)?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<PaginatedCourses>, ApiError> {
    if query.page < 1 {
        return Err(bad_request("page must be at least 1"));
    }
    if query.size < 1 || query.size > MAX_PAGE_SIZE {
        return Err(bad_request(format!(
            "size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let mut filter = CourseFilter::new()
        .with_limit(query.size)
        .with_offset((query.page - 1) * query.size);
    if let Some(topic) = query.topic {
        filter = filter.with_topic(topic);
    }
    if let Some(level) = query.level {
        filter = filter.with_level(level);
    }
    if let Some(search) = query.search {
        filter = filter.with_search(search);
    }

    let data = state.store().list_courses(&filter).map_err(course_error)?;
    let total = state.store().count_courses(&filter).map_err(course_error)?;
    let pages = (total + query.size - 1) / query.size;

    Ok(Json(PaginatedCourses {
        data,
        page: query.page,
        size: query.size,
        pages,
    }))
}

pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    match state.store().get_course(&id).map_err(course_error)? {
        Some(course) => Ok(Json(course)),
        None => Err(not_found(format!("Course {} not found", id))),
    }
}

pub async fn get_course_full(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CourseWithModules>, ApiError> {
    let course = state
        .store()
        .get_course(&id)
        .map_err(course_error)?
        .ok_or_else(|| not_found(format!("Course {} not found", id)))?;

    let mut modules = Vec::new();
    for module in state.store().list_modules(&id).map_err(course_error)? {
        let concepts = state
            .store()
            .list_concepts(&module.id)
            .map_err(course_error)?;
        modules.push(ModuleWithConcepts { module, concepts });
    }

    Ok(Json(CourseWithModules { course, modules }))
}

pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, ApiError> {
    if update.is_empty() {
        return Err(bad_request("update must set at least one field"));
    }
    update.validate().map_err(bad_request)?;
    let course = state
        .store()
        .update_course(&id, update)
        .map_err(course_error)?;
    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let course = state.store().delete_course(&id).map_err(course_error)?;
    Ok(Json(DeletedResponse {
        message: format!("Course '{}' deleted", course.title),
    }))
}
