//! Course store wrapper with injectable failures for failure-isolation tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::course::{
    Concept, Course, CourseError, CourseFilter, CourseStore, CreateConceptRequest,
    CreateCourseRequest, CreateModuleRequest, Module, UpdateConceptRequest, UpdateCourseRequest,
    UpdateModuleRequest,
};

/// Delegates everything to an inner store, except where a failure has been
/// injected.
pub struct FlakyCourseStore {
    inner: Arc<dyn CourseStore>,
    fail_course_creates: AtomicBool,
    fail_module_orders: Mutex<HashSet<u32>>,
    fail_concept_orders: Mutex<HashSet<u32>>,
}

impl FlakyCourseStore {
    pub fn wrapping(inner: Arc<dyn CourseStore>) -> Self {
        Self {
            inner,
            fail_course_creates: AtomicBool::new(false),
            fail_module_orders: Mutex::new(HashSet::new()),
            fail_concept_orders: Mutex::new(HashSet::new()),
        }
    }

    /// Make every `create_course` call fail.
    pub fn fail_course_creates(&self) {
        self.fail_course_creates.store(true, Ordering::SeqCst);
    }

    /// Make `create_module` fail for this order index.
    pub fn fail_module_at(&self, order_index: u32) {
        self.fail_module_orders.lock().unwrap().insert(order_index);
    }

    /// Make `create_concept` fail for this order index (in every module).
    pub fn fail_concept_at(&self, order_index: u32) {
        self.fail_concept_orders.lock().unwrap().insert(order_index);
    }
}

impl CourseStore for FlakyCourseStore {
    fn create_course(&self, request: CreateCourseRequest) -> Result<Course, CourseError> {
        if self.fail_course_creates.load(Ordering::SeqCst) {
            return Err(CourseError::Database("injected course failure".to_string()));
        }
        self.inner.create_course(request)
    }

    fn get_course(&self, id: &str) -> Result<Option<Course>, CourseError> {
        self.inner.get_course(id)
    }

    fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseError> {
        self.inner.list_courses(filter)
    }

    fn count_courses(&self, filter: &CourseFilter) -> Result<i64, CourseError> {
        self.inner.count_courses(filter)
    }

    fn update_course(&self, id: &str, update: UpdateCourseRequest) -> Result<Course, CourseError> {
        self.inner.update_course(id, update)
    }

    fn delete_course(&self, id: &str) -> Result<Course, CourseError> {
        self.inner.delete_course(id)
    }

    fn create_module(&self, request: CreateModuleRequest) -> Result<Module, CourseError> {
        if self
            .fail_module_orders
            .lock()
            .unwrap()
            .contains(&request.order_index)
        {
            return Err(CourseError::Database(format!(
                "injected module failure at order {}",
                request.order_index
            )));
        }
        self.inner.create_module(request)
    }

    fn get_module(&self, id: &str) -> Result<Option<Module>, CourseError> {
        self.inner.get_module(id)
    }

    fn list_modules(&self, course_id: &str) -> Result<Vec<Module>, CourseError> {
        self.inner.list_modules(course_id)
    }

    fn update_module(&self, id: &str, update: UpdateModuleRequest) -> Result<Module, CourseError> {
        self.inner.update_module(id, update)
    }

    fn delete_module(&self, id: &str) -> Result<Module, CourseError> {
        self.inner.delete_module(id)
    }

    fn create_concept(&self, request: CreateConceptRequest) -> Result<Concept, CourseError> {
        if self
            .fail_concept_orders
            .lock()
            .unwrap()
            .contains(&request.order_index)
        {
            return Err(CourseError::Database(format!(
                "injected concept failure at order {}",
                request.order_index
            )));
        }
        self.inner.create_concept(request)
    }

    fn get_concept(&self, id: &str) -> Result<Option<Concept>, CourseError> {
        self.inner.get_concept(id)
    }

    fn list_concepts(&self, module_id: &str) -> Result<Vec<Concept>, CourseError> {
        self.inner.list_concepts(module_id)
    }

    fn set_concept_content(&self, id: &str, content: &str) -> Result<Concept, CourseError> {
        self.inner.set_concept_content(id, content)
    }

    fn update_concept(
        &self,
        id: &str,
        update: UpdateConceptRequest,
    ) -> Result<Concept, CourseError> {
        self.inner.update_concept(id, update)
    }

    fn delete_concept(&self, id: &str) -> Result<Concept, CourseError> {
        self.inner.delete_concept(id)
    }
}
