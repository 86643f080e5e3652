pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This trait defines the common interface for turning a fully resolved
/// prompt into generated SQL text, whatever the backing model (Gemini, an
/// OpenAI-compatible endpoint, a test double).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response for a fully resolved prompt.
    async fn generate(&self, prompt: &str) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
