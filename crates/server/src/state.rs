use std::sync::Arc;

use learncrafter_core::{
    ContentGenerator, ContentValidator, Config, CoursePublisher, CourseStore, JobTracker,
    PromptFormatter, PromptStore, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn CourseStore>,
    prompt_store: Arc<dyn PromptStore>,
    formatter: Arc<PromptFormatter>,
    generator: Arc<dyn ContentGenerator>,
    validator: ContentValidator,
    tracker: Arc<JobTracker>,
    publisher: Arc<CoursePublisher>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        store: Arc<dyn CourseStore>,
        prompt_store: Arc<dyn PromptStore>,
        formatter: Arc<PromptFormatter>,
        generator: Arc<dyn ContentGenerator>,
        validator: ContentValidator,
        tracker: Arc<JobTracker>,
        publisher: Arc<CoursePublisher>,
    ) -> Self {
        Self {
            config,
            store,
            prompt_store,
            formatter,
            generator,
            validator,
            tracker,
            publisher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn CourseStore {
        self.store.as_ref()
    }

    pub fn prompt_store(&self) -> &dyn PromptStore {
        self.prompt_store.as_ref()
    }

    pub fn formatter(&self) -> &PromptFormatter {
        &self.formatter
    }

    pub fn generator(&self) -> &dyn ContentGenerator {
        self.generator.as_ref()
    }

    pub fn validator(&self) -> &ContentValidator {
        &self.validator
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn publisher(&self) -> &Arc<CoursePublisher> {
        &self.publisher
    }
}
