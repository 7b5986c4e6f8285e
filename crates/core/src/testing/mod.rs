//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides scripted stand-ins for the external seams (the LLM
//! generator and, for failure injection, the course store), allowing
//! comprehensive E2E testing without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use learncrafter_core::testing::MockContentGenerator;
//!
//! let generator = MockContentGenerator::new();
//! generator.push_text(r#"{"course_title": "...", "module_plans": [...]}"#);
//! generator.set_default_response("<html>...</html>");
//!
//! // Use in AppState...
//! ```

mod flaky_store;
mod mock_generator;

pub use flaky_store::FlakyCourseStore;
pub use mock_generator::MockContentGenerator;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::publisher::{ConceptPlan, ModulePlan};

    /// A minimal valid HTML page for content fields.
    pub fn html_page(heading: &str) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>{heading}</title></head><body><h1>{heading}</h1></body></html>"
        )
    }

    /// Planner-shaped JSON for a course with the given module titles.
    pub fn course_plan_json(title: &str, module_titles: &[&str]) -> String {
        let modules: Vec<serde_json::Value> = module_titles
            .iter()
            .map(|t| {
                serde_json::json!({
                    "module_title": t,
                    "module_description": format!("About {}", t),
                })
            })
            .collect();
        serde_json::json!({
            "course_title": title,
            "course_description": format!("A course on {}", title),
            "module_plans": modules,
        })
        .to_string()
    }

    /// Concept-planner-shaped JSON with the given concept titles.
    pub fn concept_plans_json(titles: &[&str]) -> String {
        let concepts: Vec<serde_json::Value> = titles
            .iter()
            .map(|t| {
                serde_json::json!({
                    "concept_title": t,
                    "concept_description": format!("About {}", t),
                    "learning_objectives": [format!("Understand {}", t)],
                    "prerequisites": [],
                })
            })
            .collect();
        serde_json::json!({ "concepts": concepts }).to_string()
    }

    /// A manual module plan carrying its own concept plans.
    pub fn manual_module(title: &str, concept_titles: &[&str]) -> ModulePlan {
        ModulePlan {
            title: title.to_string(),
            description: Some(format!("About {}", title)),
            concepts: Some(
                concept_titles
                    .iter()
                    .map(|t| ConceptPlan {
                        title: t.to_string(),
                        description: None,
                        learning_objectives: vec![format!("Understand {}", t)],
                        prerequisites: vec![],
                    })
                    .collect(),
            ),
        }
    }
}
