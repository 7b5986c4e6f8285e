//! The course publishing orchestrator.
//!
//! One job = one spawned task. Planning and course creation are fatal on
//! failure; everything after that degrades per unit, so a single bad module
//! or concept never sinks the rest of the course.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, warn};

use super::pacing::StepPacer;
use super::plan::{
    normalize_concept_plans, normalize_course_plan, ConceptPlan, CoursePlan, PlanSource,
    PublishJobRequest,
};
use super::tracker::{JobStatus, JobTracker};
use crate::course::{
    CourseStore, CreateConceptRequest, CreateCourseRequest, CreateModuleRequest,
};
use crate::generator::ContentGenerator;
use crate::metrics;
use crate::prompt::{PromptFormatter, WorkflowStep};

fn course_planner_prompt(request: &PublishJobRequest) -> String {
    format!(
        r#"As an expert instructional designer, create a comprehensive course plan
for the topic "{topic}" at a {level} level.
The plan should include a course title, a brief course description,
and a list of {num_modules} module titles and their descriptions.
Respond in JSON format with the keys: "course_title", "course_description",
"module_plans" (a list of objects with "module_title"
and "module_description")."#,
        topic = request.topic,
        level = request.level,
        num_modules = request.num_modules,
    )
}

fn concept_detail_prompt(request: &PublishJobRequest, module_title: &str) -> String {
    format!(
        r#"For the module "{module_title}" in a course about "{topic}",
generate a list of {num_concepts} key concepts.
For each concept, provide a title, a brief description, a list of 2-3
learning objectives, and a list of 1-2 prerequisites.
Respond in JSON format with a single key "concepts" which is a list of
objects. Each object should have keys: "concept_title",
"concept_description", "learning_objectives", "prerequisites"."#,
        module_title = module_title,
        topic = request.topic,
        num_concepts = request.concepts_per_module,
    )
}

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Invalid publish request: {0}")]
    InvalidRequest(String),

    #[error("Course planning failed: {0}")]
    Planning(String),

    #[error("Course creation failed: {0}")]
    CourseCreate(String),
}

/// Outcome of one concept unit.
#[derive(Debug, Clone)]
pub struct ConceptOutcome {
    pub title: String,
    pub concept_id: Option<String>,
    pub error: Option<String>,
}

/// Outcome of one module, with its concept outcomes.
#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    pub title: String,
    pub module_id: Option<String>,
    pub error: Option<String>,
    pub concepts: Vec<ConceptOutcome>,
}

/// Aggregated result of a completed job.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub course_id: String,
    pub course_title: String,
    pub modules: Vec<ModuleOutcome>,
}

impl JobSummary {
    pub fn modules_created(&self) -> usize {
        self.modules.iter().filter(|m| m.module_id.is_some()).count()
    }

    pub fn modules_failed(&self) -> usize {
        self.modules.len() - self.modules_created()
    }

    pub fn concepts_created(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| &m.concepts)
            .filter(|c| c.concept_id.is_some())
            .count()
    }

    pub fn concepts_failed(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| &m.concepts)
            .filter(|c| c.concept_id.is_none())
            .count()
    }
}

/// Orchestrates publish jobs end to end.
#[derive(Clone)]
pub struct CoursePublisher {
    store: Arc<dyn CourseStore>,
    formatter: Arc<PromptFormatter>,
    generator: Arc<dyn ContentGenerator>,
    tracker: Arc<JobTracker>,
    pacer: StepPacer,
}

impl CoursePublisher {
    pub fn new(
        store: Arc<dyn CourseStore>,
        formatter: Arc<PromptFormatter>,
        generator: Arc<dyn ContentGenerator>,
        tracker: Arc<JobTracker>,
        pacer: StepPacer,
    ) -> Self {
        Self {
            store,
            formatter,
            generator,
            tracker,
            pacer,
        }
    }

    pub fn tracker(&self) -> &Arc<JobTracker> {
        &self.tracker
    }

    /// Validate the request, register a pending job and spawn the worker
    /// task. Returns the job id immediately.
    pub fn start_job(&self, request: PublishJobRequest) -> Result<String, PublisherError> {
        request.validate().map_err(PublisherError::InvalidRequest)?;

        let job_id = self.tracker.create();
        metrics::PUBLISH_JOBS_STARTED.inc();
        info!(job_id, topic = %request.topic, "publish job accepted");

        let publisher = self.clone();
        let spawned_id = job_id.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            match publisher.run_job(&spawned_id, request).await {
                Ok(summary) => {
                    publisher.tracker.update(&spawned_id, |job| {
                        job.status = JobStatus::Completed;
                        job.progress_percentage = 100.0;
                        job.current_step = "Completed".to_string();
                    });
                    metrics::PUBLISH_JOBS_COMPLETED.inc();
                    info!(
                        job_id = spawned_id,
                        course_id = summary.course_id,
                        modules_created = summary.modules_created(),
                        modules_failed = summary.modules_failed(),
                        concepts_created = summary.concepts_created(),
                        concepts_failed = summary.concepts_failed(),
                        elapsed_secs = started.elapsed().as_secs_f64(),
                        "publish job completed"
                    );
                }
                Err(e) => {
                    publisher.tracker.update(&spawned_id, |job| {
                        job.status = JobStatus::Failed;
                        job.error_message = Some(e.to_string());
                    });
                    metrics::PUBLISH_JOBS_FAILED.inc();
                    error!(
                        job_id = spawned_id,
                        elapsed_secs = started.elapsed().as_secs_f64(),
                        "publish job failed: {}",
                        e
                    );
                }
            }
        });

        Ok(job_id)
    }

    /// Run the whole pipeline for one job. Fatal errors bubble up; the
    /// spawned wrapper owns the terminal tracker transition.
    pub async fn run_job(
        &self,
        job_id: &str,
        request: PublishJobRequest,
    ) -> Result<JobSummary, PublisherError> {
        let num_modules = request.expected_modules();
        let total_steps = 3 + num_modules + num_modules * request.concepts_per_module;

        self.tracker.update(job_id, |job| {
            job.status = JobStatus::Running;
            job.total_steps = total_steps;
            job.current_step = "Planning course".to_string();
        });

        let plan = self.build_course_plan(&request).await?;
        info!(
            job_id,
            course_title = plan.title,
            modules = plan.modules.len(),
            "course plan ready"
        );
        self.step_done(job_id, "Course plan ready");

        let course = self
            .store
            .create_course(CreateCourseRequest {
                title: plan.title.clone(),
                description: plan.description.clone(),
                topic: request.topic,
                level: request.level,
            })
            .map_err(|e| PublisherError::CourseCreate(e.to_string()))?;
        metrics::ENTITIES_CREATED.with_label_values(&["course"]).inc();
        self.tracker.update(job_id, |job| {
            job.course_id = Some(course.id.clone());
        });
        info!(job_id, course_id = course.id, "course created");
        self.step_done(job_id, "Course created");

        let mut outcomes = Vec::with_capacity(plan.modules.len());
        for (i, module_plan) in plan.modules.iter().enumerate() {
            let order_index = (i + 1) as u32;
            let outcome = self
                .publish_module(job_id, &request, &course.id, module_plan.clone(), order_index)
                .await;
            outcomes.push(outcome);
        }

        self.step_done(job_id, "Finalizing course");

        Ok(JobSummary {
            course_id: course.id,
            course_title: plan.title,
            modules: outcomes,
        })
    }

    async fn build_course_plan(
        &self,
        request: &PublishJobRequest,
    ) -> Result<CoursePlan, PublisherError> {
        if let (Some(title), Some(modules)) = (&request.course_title, &request.modules) {
            info!("using manual course plan with {} modules", modules.len());
            return normalize_course_plan(PlanSource::Manual {
                title: title.clone(),
                description: request.course_description.clone(),
                modules: modules.clone(),
            })
            .map_err(|e| PublisherError::Planning(e.to_string()));
        }

        self.pacer.pause().await;
        let prompt = course_planner_prompt(request);
        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| PublisherError::Planning(e.to_string()))?;
        normalize_course_plan(PlanSource::Generated { raw })
            .map_err(|e| PublisherError::Planning(e.to_string()))
    }

    /// One module unit: create the row, resolve its concept plans, then run
    /// each concept unit. Every failure inside is recoverable.
    async fn publish_module(
        &self,
        job_id: &str,
        request: &PublishJobRequest,
        course_id: &str,
        module_plan: super::plan::ModulePlan,
        order_index: u32,
    ) -> ModuleOutcome {
        let module = match self.store.create_module(CreateModuleRequest {
            course_id: course_id.to_string(),
            title: module_plan.title.clone(),
            description: module_plan.description.clone(),
            order_index,
        }) {
            Ok(module) => module,
            Err(e) => {
                warn!(
                    job_id,
                    module_title = module_plan.title,
                    "module creation failed, skipping its concepts: {}",
                    e
                );
                metrics::UNITS_SKIPPED.with_label_values(&["module"]).inc();
                self.step_done(job_id, &format!("Module '{}' failed", module_plan.title));
                return ModuleOutcome {
                    title: module_plan.title,
                    module_id: None,
                    error: Some(e.to_string()),
                    concepts: Vec::new(),
                };
            }
        };
        metrics::ENTITIES_CREATED.with_label_values(&["module"]).inc();
        self.step_done(job_id, &format!("Module '{}' created", module.title));

        let concept_plans = match self.concept_plans_for(request, &module_plan).await {
            Ok(plans) => plans,
            Err(e) => {
                warn!(
                    job_id,
                    module_id = module.id,
                    module_title = module.title,
                    "concept planning failed, module left empty: {}",
                    e
                );
                metrics::UNITS_SKIPPED
                    .with_label_values(&["concept_planning"])
                    .inc();
                return ModuleOutcome {
                    title: module.title,
                    module_id: Some(module.id),
                    error: Some(format!("concept planning failed: {}", e)),
                    concepts: Vec::new(),
                };
            }
        };

        let mut concepts = Vec::with_capacity(concept_plans.len());
        for (j, concept_plan) in concept_plans.into_iter().enumerate() {
            let order_index = (j + 1) as u32;
            let title = concept_plan.title.clone();
            let unit_start = Instant::now();

            let outcome = match self
                .publish_concept(request, &module.id, concept_plan, order_index)
                .await
            {
                Ok(concept_id) => {
                    metrics::ENTITIES_CREATED
                        .with_label_values(&["concept"])
                        .inc();
                    info!(
                        job_id,
                        concept_title = title,
                        elapsed_secs = unit_start.elapsed().as_secs_f64(),
                        "concept published"
                    );
                    ConceptOutcome {
                        title: title.clone(),
                        concept_id: Some(concept_id),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(
                        job_id,
                        concept_title = title,
                        elapsed_secs = unit_start.elapsed().as_secs_f64(),
                        "concept unit failed: {}",
                        e
                    );
                    metrics::UNITS_SKIPPED.with_label_values(&["concept"]).inc();
                    ConceptOutcome {
                        title: title.clone(),
                        concept_id: None,
                        error: Some(e),
                    }
                }
            };
            self.step_done(job_id, &format!("Concept '{}' processed", title));
            concepts.push(outcome);
        }

        ModuleOutcome {
            title: module.title,
            module_id: Some(module.id),
            error: None,
            concepts,
        }
    }

    /// Manual concept plans win; otherwise one planning call per module.
    async fn concept_plans_for(
        &self,
        request: &PublishJobRequest,
        module_plan: &super::plan::ModulePlan,
    ) -> Result<Vec<ConceptPlan>, String> {
        if let Some(manual) = module_plan
            .concepts
            .clone()
            .or_else(|| request.manual_concepts_for(&module_plan.title))
        {
            return Ok(manual);
        }

        self.pacer.pause().await;
        let prompt = concept_detail_prompt(request, &module_plan.title);
        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| e.to_string())?;
        normalize_concept_plans(&raw).map_err(|e| e.to_string())
    }

    /// One concept unit: skeleton row, prompt assembly, generation, content
    /// update. Atomic from the job's point of view.
    async fn publish_concept(
        &self,
        request: &PublishJobRequest,
        module_id: &str,
        plan: ConceptPlan,
        order_index: u32,
    ) -> Result<String, String> {
        let concept = self
            .store
            .create_concept(CreateConceptRequest {
                module_id: module_id.to_string(),
                title: plan.title.clone(),
                description: plan.description.clone(),
                order_index,
                content: String::new(),
                learning_objectives: plan.learning_objectives.clone(),
                prerequisites: plan.prerequisites.clone(),
            })
            .map_err(|e| e.to_string())?;

        let module = self
            .store
            .get_module(module_id)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("module {} disappeared", module_id))?;
        let module_context = PromptFormatter::module_context(&module);

        let prompt = self
            .formatter
            .concept_prompt(
                WorkflowStep::ConceptGeneration,
                &plan.title,
                plan.description.as_deref(),
                &plan.learning_objectives,
                &plan.prerequisites,
                Some(&module_context),
                request.level,
            )
            .map_err(|e| e.to_string())?;

        let content = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| e.to_string())?;

        self.store
            .set_concept_content(&concept.id, &content)
            .map_err(|e| e.to_string())?;

        Ok(concept.id)
    }

    fn step_done(&self, job_id: &str, label: &str) {
        self.tracker.update(job_id, |job| {
            job.completed_steps += 1;
            if job.total_steps > 0 {
                job.progress_percentage =
                    (job.completed_steps as f32 / job.total_steps as f32) * 100.0;
            }
            job.current_step = label.to_string();
        });
    }
}
