//! Course catalog storage trait.

use thiserror::Error;

use crate::course::{
    Concept, Course, CourseFilter, CreateConceptRequest, CreateCourseRequest, CreateModuleRequest,
    Module, UpdateConceptRequest, UpdateCourseRequest, UpdateModuleRequest,
};

/// Error type for catalog operations.
#[derive(Debug, Error)]
pub enum CourseError {
    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for course catalog storage backends.
///
/// Covers the three owned entity types. Deleting a course cascades to its
/// modules and their concepts; deleting a module cascades to its concepts.
pub trait CourseStore: Send + Sync {
    // -- courses --

    /// Create a new course (status starts as draft).
    fn create_course(&self, request: CreateCourseRequest) -> Result<Course, CourseError>;

    /// Get a course by ID.
    fn get_course(&self, id: &str) -> Result<Option<Course>, CourseError>;

    /// List courses matching the filter.
    fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseError>;

    /// Count courses matching the filter (ignores limit/offset).
    fn count_courses(&self, filter: &CourseFilter) -> Result<i64, CourseError>;

    /// Apply a partial update. Returns the updated course.
    fn update_course(&self, id: &str, update: UpdateCourseRequest) -> Result<Course, CourseError>;

    /// Delete a course and everything under it. Returns the deleted course.
    fn delete_course(&self, id: &str) -> Result<Course, CourseError>;

    // -- modules --

    /// Create a module under an existing course.
    fn create_module(&self, request: CreateModuleRequest) -> Result<Module, CourseError>;

    /// Get a module by ID.
    fn get_module(&self, id: &str) -> Result<Option<Module>, CourseError>;

    /// List a course's modules ordered by `order_index`.
    fn list_modules(&self, course_id: &str) -> Result<Vec<Module>, CourseError>;

    /// Apply a partial update. Returns the updated module.
    fn update_module(&self, id: &str, update: UpdateModuleRequest) -> Result<Module, CourseError>;

    /// Delete a module and its concepts. Returns the deleted module.
    fn delete_module(&self, id: &str) -> Result<Module, CourseError>;

    // -- concepts --

    /// Create a concept under an existing module.
    fn create_concept(&self, request: CreateConceptRequest) -> Result<Concept, CourseError>;

    /// Get a concept by ID.
    fn get_concept(&self, id: &str) -> Result<Option<Concept>, CourseError>;

    /// List a module's concepts ordered by `order_index`.
    fn list_concepts(&self, module_id: &str) -> Result<Vec<Concept>, CourseError>;

    /// Replace a concept's generated content. The metadata-update path never
    /// touches content; generation cycles call this instead.
    fn set_concept_content(&self, id: &str, content: &str) -> Result<Concept, CourseError>;

    /// Apply a partial metadata update. Returns the updated concept.
    fn update_concept(
        &self,
        id: &str,
        update: UpdateConceptRequest,
    ) -> Result<Concept, CourseError>;

    /// Delete a concept. Returns the deleted concept.
    fn delete_concept(&self, id: &str) -> Result<Concept, CourseError>;
}
