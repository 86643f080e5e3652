//! # Core Types
//!
//! The entities that flow through an evaluation run, plus the
//! [`EvaluationRunner`] and its builder. The batch orchestration logic
//! itself lives in the crate root.

use crate::constants::DEFAULT_PROMPT_SETS_DIR;
use crate::providers::factory::{DefaultProviderFactory, ProviderFactory};
use crate::store::{DocumentStore, FileStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// A natural-language question submitted for SQL generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nlq {
    pub id: i64,
    pub text: String,
    /// Reference SQL the generated query is labeled against.
    #[serde(default)]
    pub baseline_sql: Option<String>,
}

/// A named, file-backed prompt template (plus optional includes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Connection settings for one LLM the harness can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub id: i64,
    pub name: String,
    /// Provider tag, e.g. `gemini` or `openai`.
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Extra request parameters merged into every call payload.
    #[serde(default)]
    pub default_parameters: Option<Value>,
}

/// The cartesian batch to evaluate: every NLQ against every prompt set
/// against every LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub nlqs: Vec<Nlq>,
    pub prompt_sets: Vec<PromptSet>,
    pub llm_configs: Vec<LlmConfig>,
}

/// One generated SQL answer for a single (NLQ, prompt set, LLM) item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub result_id: i64,
    pub nlq_id: i64,
    pub prompt_set_id: i64,
    pub llm_config_id: i64,
    pub generated_sql: String,
    pub full_prompt: String,
    pub llm_response_time_ms: u64,
}

/// A completed evaluation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRun {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<GeneratedResult>,
}

/// Drives evaluation batches: resolves each prompt, calls the configured
/// LLM, and tags the generated SQL.
pub struct EvaluationRunner {
    pub(crate) store: Box<dyn DocumentStore>,
    pub(crate) prompt_sets_dir: PathBuf,
    pub(crate) provider_factory: Box<dyn ProviderFactory>,
}

impl fmt::Debug for EvaluationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationRunner")
            .field("prompt_sets_dir", &self.prompt_sets_dir)
            .finish_non_exhaustive()
    }
}

/// A builder for [`EvaluationRunner`] instances.
///
/// Every field has a working default: the filesystem store, the
/// `prompt_sets` directory, and the standard provider factory.
#[derive(Default)]
pub struct EvaluationRunnerBuilder {
    store: Option<Box<dyn DocumentStore>>,
    prompt_sets_dir: Option<PathBuf>,
    provider_factory: Option<Box<dyn ProviderFactory>>,
}

impl EvaluationRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document store prompt sets are read from.
    pub fn store(mut self, store: Box<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the directory prompt sets live under.
    pub fn prompt_sets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_sets_dir = Some(dir.into());
        self
    }

    /// Overrides how AI providers are constructed per LLM config.
    pub fn provider_factory(mut self, factory: Box<dyn ProviderFactory>) -> Self {
        self.provider_factory = Some(factory);
        self
    }

    /// Builds the `EvaluationRunner`.
    pub fn build(self) -> EvaluationRunner {
        EvaluationRunner {
            store: self.store.unwrap_or_else(|| Box::new(FileStore)),
            prompt_sets_dir: self
                .prompt_sets_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_SETS_DIR)),
            provider_factory: self
                .provider_factory
                .unwrap_or_else(|| Box::new(DefaultProviderFactory)),
        }
    }
}
