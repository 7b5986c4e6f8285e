//! Scripted content generator for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::generator::{ContentGenerator, GeneratorError};
use crate::llm::LlmError;

enum Scripted {
    Text(String),
    Failure(String),
}

/// Returns scripted responses in order and records every prompt it sees.
///
/// When the script runs out, `default_response` (if set) answers all further
/// calls; otherwise the call fails.
#[derive(Default)]
pub struct MockContentGenerator {
    script: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<String>>,
    default_response: Mutex<Option<String>>,
}

impl MockContentGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_text(&self, text: impl Into<String>) {
        self.script.lock().unwrap().push_back(Scripted::Text(text.into()));
    }

    /// Queue a failing response.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
    }

    /// Answer with this once the script is exhausted.
    pub fn set_default_response(&self, text: impl Into<String>) {
        *self.default_response.lock().unwrap() = Some(text.into());
    }

    /// All prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentGenerator for MockContentGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(GeneratorError::Llm(LlmError::Api {
                status: 500,
                message,
            })),
            None => match self.default_response.lock().unwrap().clone() {
                Some(text) => Ok(text),
                None => Err(GeneratorError::Llm(LlmError::Api {
                    status: 500,
                    message: "mock generator script exhausted".to_string(),
                })),
            },
        }
    }
}
