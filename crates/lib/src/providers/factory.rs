//! # AI Provider Factory
//!
//! Centralizes construction of [`AiProvider`] instances from an
//! [`LlmConfig`], so the orchestrator and the CLI build providers the same
//! way. Dispatch follows the stored provider tag, falling back to the
//! model-name prefix for configs that predate the tag.

use crate::constants::GEMINI_API_BASE_URL;
use crate::errors::PromptError;
use crate::providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider};
use crate::types::LlmConfig;
use std::fmt::Debug;
use tracing::info;

/// Builds a provider for an LLM configuration.
///
/// Injectable so batch tests can substitute canned providers without HTTP.
pub trait ProviderFactory: Send + Sync + Debug {
    fn create(&self, config: &LlmConfig) -> Result<Box<dyn AiProvider>, PromptError>;
}

/// The standard factory used outside of tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn create(&self, config: &LlmConfig) -> Result<Box<dyn AiProvider>, PromptError> {
        create_provider(config)
    }
}

/// Creates an AI provider instance for `config`.
///
/// Gemini configs need an API key; everything else is treated as an
/// OpenAI-compatible endpoint and needs a base URL.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = if config.provider.eq_ignore_ascii_case("gemini")
        || config.model.starts_with("gemini")
    {
        let api_key = config.api_key.clone().ok_or(PromptError::MissingApiKey)?;
        let base_url = config.base_url.as_deref().unwrap_or(GEMINI_API_BASE_URL);
        let api_url = format!(
            "{base_url}/models/{model}:generateContent",
            model = config.model
        );
        info!(
            "configuring Gemini provider '{}' with URL: {api_url}",
            config.name
        );
        Box::new(GeminiProvider::new(
            api_url,
            api_key,
            config.default_parameters.clone(),
        )?)
    } else {
        let api_url = config.base_url.clone().ok_or_else(|| {
            PromptError::MissingAiProvider(format!(
                "base_url is required for non-Gemini LLM config '{}'",
                config.name
            ))
        })?;
        info!(
            "configuring OpenAI-compatible provider '{}' with URL: {api_url}",
            config.name
        );
        Box::new(LocalAiProvider::new(
            api_url,
            config.api_key.clone(),
            Some(config.model.clone()),
            config.default_parameters.clone(),
        )?)
    };

    Ok(provider)
}
