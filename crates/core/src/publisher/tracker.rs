//! In-memory progress tracking for publish jobs.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a publish job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed or failed jobs never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress record for one publish job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishJob {
    pub job_id: String,
    pub status: JobStatus,
    pub progress_percentage: f32,
    pub current_step: String,
    pub total_steps: u32,
    pub completed_steps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Carried for API compatibility; no estimator populates it today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
}

/// Shared map of job id to progress record.
///
/// Reads may lag a concurrent update; per-job progress is monotonic so a
/// stale read is never misleading.
#[derive(Default)]
pub struct JobTracker {
    jobs: RwLock<HashMap<String, PublishJob>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending job and return its id.
    pub fn create(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        let job = PublishJob {
            job_id: job_id.clone(),
            status: JobStatus::Pending,
            progress_percentage: 0.0,
            current_step: "Queued".to_string(),
            total_steps: 0,
            completed_steps: 0,
            course_id: None,
            error_message: None,
            start_time: Utc::now(),
            estimated_completion: None,
        };
        self.jobs.write().unwrap().insert(job_id.clone(), job);
        job_id
    }

    pub fn get(&self, job_id: &str) -> Option<PublishJob> {
        self.jobs.read().unwrap().get(job_id).cloned()
    }

    /// Apply a mutation to a job record if it exists.
    pub fn update(&self, job_id: &str, f: impl FnOnce(&mut PublishJob)) {
        if let Some(job) = self.jobs.write().unwrap().get_mut(job_id) {
            f(job);
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }
}
