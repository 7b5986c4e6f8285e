//! Course and concept plans, plus normalization of LLM planning output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::course::{
    validate_list_entries, validate_title, CourseLevel, CourseTopic, MAX_LIST_ENTRY_LEN,
    MAX_LIST_ITEMS,
};

/// Bounds on requested module/concept counts for a publish job.
pub const MIN_PLAN_COUNT: u32 = 1;
pub const MAX_PLAN_COUNT: u32 = 10;

fn default_num_modules() -> u32 {
    3
}

fn default_concepts_per_module() -> u32 {
    5
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to parse plan: {0}")]
    Parse(String),

    #[error("Plan contains no modules")]
    NoModules,

    #[error("Plan contains no concepts")]
    NoConcepts,
}

/// Request to publish a complete course.
///
/// When `course_title` and `modules` are both supplied the plan stage is
/// skipped entirely; otherwise the planner LLM fills in the structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishJobRequest {
    pub topic: CourseTopic,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub course_description: Option<String>,
    /// Manual module plans, optionally carrying manual concept plans.
    #[serde(default)]
    pub modules: Option<Vec<ModulePlan>>,
    /// Module count for LLM planning. Ignored when `modules` is supplied.
    #[serde(default = "default_num_modules")]
    pub num_modules: u32,
    #[serde(default = "default_concepts_per_module")]
    pub concepts_per_module: u32,
}

impl PublishJobRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_PLAN_COUNT..=MAX_PLAN_COUNT).contains(&self.num_modules) {
            return Err(format!(
                "num_modules must be between {} and {}",
                MIN_PLAN_COUNT, MAX_PLAN_COUNT
            ));
        }
        if !(MIN_PLAN_COUNT..=MAX_PLAN_COUNT).contains(&self.concepts_per_module) {
            return Err(format!(
                "concepts_per_module must be between {} and {}",
                MIN_PLAN_COUNT, MAX_PLAN_COUNT
            ));
        }
        if let Some(title) = &self.course_title {
            validate_title(title)?;
        }
        if let Some(modules) = &self.modules {
            if modules.is_empty() {
                return Err("modules cannot be empty when supplied".to_string());
            }
            if modules.len() > MAX_PLAN_COUNT as usize {
                return Err(format!("at most {} modules per course", MAX_PLAN_COUNT));
            }
            for module in modules {
                module.validate()?;
            }
        }
        Ok(())
    }

    /// Module count the job will attempt.
    pub fn expected_modules(&self) -> u32 {
        match &self.modules {
            Some(modules) => modules.len() as u32,
            None => self.num_modules,
        }
    }

    /// Manual concept plans for a module, matched by title.
    pub fn manual_concepts_for(&self, module_title: &str) -> Option<Vec<ConceptPlan>> {
        self.modules
            .as_ref()?
            .iter()
            .find(|m| m.title == module_title)
            .and_then(|m| m.concepts.clone())
    }
}

/// A planned course before any rows exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePlan {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub modules: Vec<ModulePlan>,
}

/// A planned module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePlan {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Manual concept plans. `None` means a planning call fills them in.
    #[serde(default)]
    pub concepts: Option<Vec<ConceptPlan>>,
}

impl ModulePlan {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        if let Some(concepts) = &self.concepts {
            if concepts.len() > MAX_PLAN_COUNT as usize {
                return Err(format!("at most {} concepts per module", MAX_PLAN_COUNT));
            }
            for concept in concepts {
                concept.validate()?;
            }
        }
        Ok(())
    }
}

/// A planned concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptPlan {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl ConceptPlan {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_list_entries("learning_objectives", &self.learning_objectives)?;
        validate_list_entries("prerequisites", &self.prerequisites)
    }
}

/// Where a course plan comes from.
#[derive(Debug, Clone)]
pub enum PlanSource {
    Manual {
        title: String,
        description: Option<String>,
        modules: Vec<ModulePlan>,
    },
    /// Raw LLM text, possibly wrapped in markdown fences.
    Generated { raw: String },
}

// Wire shapes the planner LLM is asked to produce. Field names differ from
// ours, so they live in private structs and are mapped during normalization.

#[derive(Debug, Deserialize)]
struct LlmCoursePlan {
    course_title: String,
    #[serde(default)]
    course_description: Option<String>,
    module_plans: Vec<LlmModulePlan>,
}

#[derive(Debug, Deserialize)]
struct LlmModulePlan {
    module_title: String,
    #[serde(default)]
    module_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlmConceptList {
    concepts: Vec<LlmConceptPlan>,
}

#[derive(Debug, Deserialize)]
struct LlmConceptPlan {
    concept_title: String,
    #[serde(default)]
    concept_description: Option<String>,
    #[serde(default)]
    learning_objectives: Vec<String>,
    #[serde(default)]
    prerequisites: Vec<String>,
}

/// Slice from the first `{` to the last `}` so responses wrapped in markdown
/// fences or prose still parse.
pub fn extract_json(text: &str) -> Result<&str, PlanError> {
    let start = text
        .find('{')
        .ok_or_else(|| PlanError::Parse(format!("no JSON object in response: {}", text)))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| PlanError::Parse(format!("no JSON object in response: {}", text)))?;
    if end < start {
        return Err(PlanError::Parse(format!(
            "no JSON object in response: {}",
            text
        )));
    }
    Ok(&text[start..=end])
}

/// Build a `CoursePlan` from either source. Manual input passes through
/// untouched; LLM output is renamed to our field names.
pub fn normalize_course_plan(source: PlanSource) -> Result<CoursePlan, PlanError> {
    let plan = match source {
        PlanSource::Manual {
            title,
            description,
            modules,
        } => CoursePlan {
            title,
            description,
            modules,
        },
        PlanSource::Generated { raw } => {
            let json = extract_json(&raw)?;
            let llm_plan: LlmCoursePlan = serde_json::from_str(json)
                .map_err(|e| PlanError::Parse(format!("{}: {}", e, json)))?;
            CoursePlan {
                title: llm_plan.course_title,
                description: llm_plan.course_description,
                modules: llm_plan
                    .module_plans
                    .into_iter()
                    .map(|m| ModulePlan {
                        title: m.module_title,
                        description: m.module_description,
                        concepts: None,
                    })
                    .collect(),
            }
        }
    };

    if plan.modules.is_empty() {
        return Err(PlanError::NoModules);
    }
    Ok(plan)
}

/// Parse and clamp the `{"concepts": [...]}` payload from a concept
/// planning call.
pub fn normalize_concept_plans(raw: &str) -> Result<Vec<ConceptPlan>, PlanError> {
    let json = extract_json(raw)?;
    let list: LlmConceptList =
        serde_json::from_str(json).map_err(|e| PlanError::Parse(format!("{}: {}", e, json)))?;

    if list.concepts.is_empty() {
        return Err(PlanError::NoConcepts);
    }

    Ok(list
        .concepts
        .into_iter()
        .map(|c| ConceptPlan {
            title: c.concept_title,
            description: c.concept_description,
            learning_objectives: clamp_entries(c.learning_objectives),
            prerequisites: clamp_entries(c.prerequisites),
        })
        .collect())
}

/// Trim entries, drop blanks, truncate each to the stored entry limit and
/// cap the list length. Entries are never dropped for being too long.
fn clamp_entries(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if entry.chars().count() > MAX_LIST_ENTRY_LEN {
                entry.chars().take(MAX_LIST_ENTRY_LEN).collect()
            } else {
                entry
            }
        })
        .take(MAX_LIST_ITEMS)
        .collect()
}
