pub mod config;
pub mod course;
pub mod generator;
pub mod llm;
pub mod metrics;
pub mod prompt;
pub mod publisher;
pub mod testing;
pub mod validator;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ContentConfig,
    DatabaseConfig, LlmConfig, LlmProvider, SanitizedConfig, ServerConfig,
};
pub use course::{
    Concept, Course, CourseError, CourseFilter, CourseLevel, CourseStore, CourseTopic,
    CreateConceptRequest, CreateCourseRequest, CreateModuleRequest, EntityStatus, Module,
    SqliteCourseStore, UpdateConceptRequest, UpdateCourseRequest, UpdateModuleRequest,
};
pub use generator::{ContentGenerator, GeneratorError, LlmContentGenerator};
pub use llm::{create_llm_client, CompletionRequest, CompletionResponse, LlmClient, LlmError};
pub use prompt::{
    CreatePromptRequest, Prompt, PromptError, PromptFormatter, PromptStore, SqlitePromptStore,
    UpdatePromptRequest, WorkflowStep,
};
pub use publisher::{
    CoursePublisher, JobStatus, JobTracker, PublishJob, PublishJobRequest, PublisherError,
    StepPacer,
};
pub use validator::{ContentValidator, ValidationReport};
