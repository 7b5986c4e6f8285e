//! Course catalog: entities, storage trait and the SQLite implementation.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteCourseStore;
pub use store::{CourseError, CourseStore};
pub use types::{
    validate_description, validate_list_entries, validate_order_index, validate_title, Concept,
    Course, CourseFilter, CourseLevel, CourseTopic, CreateConceptRequest, CreateCourseRequest,
    CreateModuleRequest, EntityStatus, Module, UpdateConceptRequest, UpdateCourseRequest,
    UpdateModuleRequest, MAX_DESCRIPTION_LEN, MAX_LIST_ENTRY_LEN, MAX_LIST_ITEMS, MAX_TITLE_LEN,
};
