//! Prompt templates: storage, workflow step mapping and rendering.

mod formatter;
mod sqlite_store;
mod store;
mod types;

pub use formatter::{PromptFormatter, TemplateValue};
pub use sqlite_store::SqlitePromptStore;
pub use store::{PromptError, PromptStore};
pub use types::{CreatePromptRequest, Prompt, UpdatePromptRequest, WorkflowStep};
