//! Background course publishing: plans, progress tracking and the
//! orchestration runner.

mod pacing;
mod plan;
mod runner;
mod tracker;

pub use pacing::StepPacer;
pub use plan::{
    extract_json, normalize_concept_plans, normalize_course_plan, ConceptPlan, CoursePlan,
    ModulePlan, PlanError, PlanSource, PublishJobRequest, MAX_PLAN_COUNT, MIN_PLAN_COUNT,
};
pub use runner::{
    ConceptOutcome, CoursePublisher, JobSummary, ModuleOutcome, PublisherError,
};
pub use tracker::{JobStatus, JobTracker, PublishJob};
