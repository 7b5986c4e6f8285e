//! Renders stored prompt templates with `{key}` placeholder substitution.

use std::sync::Arc;

use tracing::warn;

use super::store::{PromptError, PromptStore};
use super::types::WorkflowStep;
use crate::course::{CourseLevel, Module};

/// How many characters of existing content a regeneration prompt carries.
const REGENERATION_CONTENT_LIMIT: usize = 1000;
/// How many characters of content a validation prompt carries.
const VALIDATION_CONTENT_LIMIT: usize = 2000;

/// A value bound to a template placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<String>),
    NotSet,
}

impl TemplateValue {
    pub fn text(value: impl Into<String>) -> Self {
        TemplateValue::Text(value.into())
    }

    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(v) => TemplateValue::Text(v),
            None => TemplateValue::NotSet,
        }
    }

    fn render(&self) -> String {
        match self {
            TemplateValue::Text(s) => s.clone(),
            TemplateValue::List(items) if items.is_empty() => "None specified".to_string(),
            TemplateValue::List(items) => items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
            TemplateValue::NotSet => "Not specified".to_string(),
        }
    }
}

/// Builds the prompts sent to the LLM from templates in the prompt store.
pub struct PromptFormatter {
    store: Arc<dyn PromptStore>,
}

impl PromptFormatter {
    pub fn new(store: Arc<dyn PromptStore>) -> Self {
        Self { store }
    }

    /// Substitute `{key}` placeholders. Unknown placeholders stay untouched.
    pub fn render(template: &str, vars: &[(&str, TemplateValue)]) -> String {
        let mut output = template.to_string();
        for (key, value) in vars {
            let placeholder = format!("{{{}}}", key);
            if output.contains(&placeholder) {
                output = output.replace(&placeholder, &value.render());
            }
        }
        output
    }

    /// Resolve the prompt id driving a workflow step.
    ///
    /// Falls back to the step's canonical id with a warning when the store
    /// has no entry for it; loading the template later reports the miss.
    pub fn resolve_workflow_prompt(&self, step: WorkflowStep) -> Result<String, PromptError> {
        let prompt_id = step.prompt_id();
        match self.store.get_prompt(prompt_id)? {
            Some(prompt) => Ok(prompt.prompt_id),
            None => {
                warn!(
                    workflow_step = step.as_str(),
                    prompt_id, "no stored prompt for workflow step, using canonical id"
                );
                Ok(prompt_id.to_string())
            }
        }
    }

    fn load_template(&self, step: WorkflowStep) -> Result<String, PromptError> {
        let prompt_id = self.resolve_workflow_prompt(step)?;
        let prompt = self
            .store
            .get_prompt(&prompt_id)?
            .ok_or_else(|| PromptError::NotFound(format!("prompt {}", prompt_id)))?;
        Ok(prompt.template)
    }

    /// `"{title} - {description}"` rendering of a module for prompt context.
    pub fn module_context(module: &Module) -> String {
        match &module.description {
            Some(description) => format!("{} - {}", module.title, description),
            None => module.title.clone(),
        }
    }

    /// Prompt for generating a concept's HTML content.
    #[allow(clippy::too_many_arguments)]
    pub fn concept_prompt(
        &self,
        step: WorkflowStep,
        title: &str,
        description: Option<&str>,
        objectives: &[String],
        prerequisites: &[String],
        module_context: Option<&str>,
        level: CourseLevel,
    ) -> Result<String, PromptError> {
        let template = self.load_template(step)?;
        Ok(Self::render(
            &template,
            &[
                ("title", TemplateValue::text(title)),
                (
                    "description",
                    TemplateValue::from_option(description.map(String::from)),
                ),
                ("objectives", TemplateValue::List(objectives.to_vec())),
                ("prerequisites", TemplateValue::List(prerequisites.to_vec())),
                (
                    "module_context",
                    TemplateValue::text(module_context.unwrap_or("No module context")),
                ),
                ("level", TemplateValue::text(level.as_str())),
            ],
        ))
    }

    /// Prompt for regenerating existing content with reviewer feedback.
    pub fn regeneration_prompt(
        &self,
        title: &str,
        current_content: &str,
        feedback: Option<&str>,
    ) -> Result<String, PromptError> {
        let template = self.load_template(WorkflowStep::ConceptRegeneration)?;
        Ok(Self::render(
            &template,
            &[
                ("title", TemplateValue::text(title)),
                (
                    "current_content",
                    TemplateValue::text(clip(current_content, REGENERATION_CONTENT_LIMIT)),
                ),
                (
                    "feedback",
                    TemplateValue::text(feedback.unwrap_or("No specific feedback provided")),
                ),
            ],
        ))
    }

    /// Prompt asking the LLM to review generated content.
    pub fn validation_prompt(&self, content: &str) -> Result<String, PromptError> {
        let template = self.load_template(WorkflowStep::ContentValidation)?;
        Ok(Self::render(
            &template,
            &[(
                "content",
                TemplateValue::text(clip(content, VALIDATION_CONTENT_LIMIT)),
            )],
        ))
    }
}

fn clip(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }
    let mut clipped: String = content.chars().take(limit).collect();
    clipped.push_str("...");
    clipped
}
