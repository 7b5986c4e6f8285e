//! Prompt templates and the workflow steps that select them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::course::{validate_title, MAX_DESCRIPTION_LEN};

/// A stored prompt template. Placeholders use `{key}` syntax and are
/// substituted at render time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prompt {
    /// Caller-chosen identifier, e.g. `concept_generation`.
    pub prompt_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a new prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromptRequest {
    pub prompt_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub template: String,
}

impl CreatePromptRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt_id.trim().is_empty() {
            return Err("prompt_id cannot be empty".to_string());
        }
        validate_title(&self.name)?;
        if let Some(desc) = &self.description {
            if desc.len() > MAX_DESCRIPTION_LEN {
                return Err(format!(
                    "description cannot exceed {} characters",
                    MAX_DESCRIPTION_LEN
                ));
            }
        }
        if self.template.trim().is_empty() {
            return Err("template cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Partial prompt update. At least one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePromptRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

impl UpdatePromptRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.template.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_title(name)?;
        }
        if let Some(template) = &self.template {
            if template.trim().is_empty() {
                return Err("template cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Content workflow steps. Each step maps to the prompt id used to drive it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    ConceptGeneration,
    ConceptRegeneration,
    ContentValidation,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 3] = [
        WorkflowStep::ConceptGeneration,
        WorkflowStep::ConceptRegeneration,
        WorkflowStep::ContentValidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::ConceptGeneration => "concept_generation",
            WorkflowStep::ConceptRegeneration => "concept_regeneration",
            WorkflowStep::ContentValidation => "content_validation",
        }
    }

    /// The prompt id this step resolves to.
    pub fn prompt_id(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for WorkflowStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowStep::ALL
            .iter()
            .find(|w| w.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown workflow step: {}", s))
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
