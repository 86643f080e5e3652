//! # Default Prompt Templates
//!
//! Templates used by operations that construct their own prompts rather
//! than loading a prompt set from disk. Placeholders follow the same
//! `{{NAME}}` syntax the resolver uses and are rendered through the
//! crate's own inline engine.

use crate::errors::PromptError;
use crate::templating::inline::apply_template;
use serde_json::json;

/// Template for explaining a generated query and comparing it with the
/// baseline, aimed at business stakeholders.
///
/// Placeholders: `{{GENERATED_SQL}}`, `{{BASELINE_SQL}}`
pub const EXPLAIN_COMPARE_TEMPLATE: &str = "Can you provide a concise yet precise explanation of the following query for business stakeholders? Explain any filters and calculations.\n\n\
    SQL Query (Generated):\n{{GENERATED_SQL}}\n\n\
    ------------------------------------------------------------\n\n\
    Now, compare the semantics of the following two queries. Are they equivalent? If not, what are the key differences and what would be the business impact?\n\n\
    Baseline SQL:\n{{BASELINE_SQL}}\n\nGenerated SQL:\n{{GENERATED_SQL}}";

/// Renders [`EXPLAIN_COMPARE_TEMPLATE`] for one baseline/generated pair.
pub fn build_explain_prompt(
    baseline_sql: &str,
    generated_sql: &str,
) -> Result<String, PromptError> {
    let macros = json!({
        "BASELINE_SQL": baseline_sql,
        "GENERATED_SQL": generated_sql,
    });
    Ok(apply_template(EXPLAIN_COMPARE_TEMPLATE, &macros)?)
}
