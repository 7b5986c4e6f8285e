use thiserror::Error;

use super::types::{CreatePromptRequest, Prompt, UpdatePromptRequest};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Prompt already exists: {0}")]
    AlreadyExists(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// Storage for prompt templates.
pub trait PromptStore: Send + Sync {
    fn create_prompt(&self, request: &CreatePromptRequest) -> Result<Prompt, PromptError>;

    fn get_prompt(&self, prompt_id: &str) -> Result<Option<Prompt>, PromptError>;

    /// All prompts ordered by id.
    fn list_prompts(&self) -> Result<Vec<Prompt>, PromptError>;

    fn update_prompt(
        &self,
        prompt_id: &str,
        request: &UpdatePromptRequest,
    ) -> Result<Prompt, PromptError>;

    /// Returns the deleted prompt, or `NotFound`.
    fn delete_prompt(&self, prompt_id: &str) -> Result<Prompt, PromptError>;
}
