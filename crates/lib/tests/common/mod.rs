#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared helpers for the integration tests: tracing setup, an on-disk
//! prompt set fixture builder, and canned AI providers so orchestration
//! logic can be tested without HTTP.

use async_trait::async_trait;
use nlqeval::providers::ai::AiProvider;
use nlqeval::providers::factory::ProviderFactory;
use nlqeval::types::LlmConfig;
use nlqeval::PromptError;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

/// Writes a prompt set directory under `base_dir` with the given main
/// document and include files (paths relative to the prompt set directory).
pub fn write_prompt_set(base_dir: &Path, name: &str, main: &str, includes: &[(&str, &str)]) {
    let safe = nlqeval::sanitize_name(name);
    let dir = base_dir.join(&safe);
    fs::create_dir_all(&dir).expect("prompt set dir");
    fs::write(dir.join(format!("{safe}.txt")), main).expect("main document");
    for (filename, content) in includes {
        let path = dir.join(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("include dir");
        }
        fs::write(path, content).expect("include file");
    }
}

// --- Mock AI Provider for Logic Testing ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<String>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    /// The prompts this provider has been called with, in order.
    pub fn calls(&self) -> Vec<String> {
        self.call_history.read().expect("call history lock").clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, PromptError> {
        self.call_history
            .write()
            .expect("call history lock")
            .push(prompt.to_string());
        let response = self
            .responses
            .write()
            .expect("responses lock")
            .pop()
            .unwrap_or_else(|| "SELECT 1;".to_string());
        Ok(response)
    }
}

/// A factory handing out clones of a single canned provider, so the test
/// can inspect the shared call history afterwards.
#[derive(Clone, Debug)]
pub struct MockProviderFactory {
    pub provider: MockAiProvider,
}

impl ProviderFactory for MockProviderFactory {
    fn create(&self, _config: &LlmConfig) -> Result<Box<dyn AiProvider>, PromptError> {
        Ok(Box::new(self.provider.clone()))
    }
}

/// A factory that always fails, for exercising provider-error paths.
#[derive(Clone, Copy, Debug)]
pub struct FailingProviderFactory;

impl ProviderFactory for FailingProviderFactory {
    fn create(&self, config: &LlmConfig) -> Result<Box<dyn AiProvider>, PromptError> {
        Err(PromptError::MissingAiProvider(format!(
            "no provider available for '{}'",
            config.name
        )))
    }
}
