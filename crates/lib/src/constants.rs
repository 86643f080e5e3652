//! # Shared Constants
//!
//! This module provides a centralized location for constants shared by the
//! resolver, the provider factory, and the CLI, to avoid magic strings.

/// Base URL for the Google Gemini `generateContent` API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// File extension of a prompt set's main document.
pub const PROMPT_FILE_EXT: &str = "txt";

/// Default directory prompt sets are stored under.
pub const DEFAULT_PROMPT_SETS_DIR: &str = "prompt_sets";

/// Upper bound on include expansion passes for one resolution call.
///
/// Generous enough for any legitimate document; an include chain that keeps
/// reintroducing its own directive exhausts the budget and fails with
/// `TemplateError::IncludeCycle` instead of looping forever.
pub const MAX_INCLUDE_PASSES: usize = 1000;

/// Macro bound to the natural-language question for every evaluation item.
pub const MACRO_NLQ: &str = "NLQ";

/// Macro bound to the NLQ's baseline SQL (empty when it has none).
pub const MACRO_BASELINE_SQL: &str = "BASELINE_SQL";
