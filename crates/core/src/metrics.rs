//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Publish jobs (started, completed, failed, entities created)
//! - LLM calls (requests, durations, token usage)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Publish Job Metrics
// =============================================================================

/// Publish jobs started total.
pub static PUBLISH_JOBS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "learncrafter_publish_jobs_started_total",
        "Total publish jobs started",
    )
    .unwrap()
});

/// Publish jobs completed total.
pub static PUBLISH_JOBS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "learncrafter_publish_jobs_completed_total",
        "Total publish jobs completed successfully",
    )
    .unwrap()
});

/// Publish jobs failed total.
pub static PUBLISH_JOBS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "learncrafter_publish_jobs_failed_total",
        "Total publish jobs that failed",
    )
    .unwrap()
});

/// Entities created by publish jobs.
pub static ENTITIES_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "learncrafter_entities_created_total",
            "Total entities created by publish jobs",
        ),
        &["entity"], // "course", "module", "concept"
    )
    .unwrap()
});

/// Units skipped by publish jobs after a recoverable failure.
pub static UNITS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "learncrafter_units_skipped_total",
            "Total publish units skipped after a recoverable failure",
        ),
        &["unit"], // "module", "concept_planning", "concept"
    )
    .unwrap()
});

// =============================================================================
// LLM Metrics
// =============================================================================

/// LLM requests total.
pub static LLM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("learncrafter_llm_requests_total", "Total LLM requests"),
        &["provider", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// LLM request duration in seconds.
pub static LLM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "learncrafter_llm_request_duration_seconds",
            "Duration of LLM requests",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider"],
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("learncrafter_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Publish jobs
        Box::new(PUBLISH_JOBS_STARTED.clone()),
        Box::new(PUBLISH_JOBS_COMPLETED.clone()),
        Box::new(PUBLISH_JOBS_FAILED.clone()),
        Box::new(ENTITIES_CREATED.clone()),
        Box::new(UNITS_SKIPPED.clone()),
        // LLM
        Box::new(LLM_REQUESTS.clone()),
        Box::new(LLM_REQUEST_DURATION.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
