//! # Natural Language to SQL Evaluation
//!
//! This crate is the core of an NLQ-to-SQL evaluation harness: prompt sets
//! (file-backed templates with `{{include:...}}` directives and `{{MACRO}}`
//! placeholders) are resolved into full LLM prompts, sent to a configurable
//! AI provider for each (NLQ, prompt set, LLM config) combination, and the
//! generated SQL is collected for labeling against a baseline.

pub mod constants;
pub mod errors;
pub mod prompts;
pub mod providers;
pub mod store;
pub mod templating;
pub mod types;

pub use errors::PromptError;
pub use templating::{sanitize_name, MacroBindings, MacroValue, PromptResolver, TemplateError};
pub use types::{
    EvaluationRequest, EvaluationRun, EvaluationRunner, EvaluationRunnerBuilder, GeneratedResult,
    LlmConfig, Nlq, PromptSet,
};

use crate::constants::{MACRO_BASELINE_SQL, MACRO_NLQ};
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

impl EvaluationRunner {
    /// Runs the full cartesian batch.
    ///
    /// Never fails as a whole: a prompt construction error is recorded
    /// inline in place of the generated SQL for the affected items (no LLM
    /// call is made for them), and a provider error becomes a `-- ERROR:`
    /// marker, so one bad item cannot abort the batch.
    pub async fn run(&self, request: &EvaluationRequest) -> EvaluationRun {
        info!(
            "starting evaluation run: {} NLQs x {} prompt sets x {} LLM configs",
            request.nlqs.len(),
            request.prompt_sets.len(),
            request.llm_configs.len()
        );

        let mut results = Vec::new();
        let mut next_result_id: i64 = 1;

        for nlq in &request.nlqs {
            for prompt_set in &request.prompt_sets {
                let bindings = MacroBindings::from([
                    (MACRO_NLQ.to_string(), MacroValue::from(nlq.text.as_str())),
                    (
                        MACRO_BASELINE_SQL.to_string(),
                        MacroValue::from(nlq.baseline_sql.as_deref().unwrap_or("")),
                    ),
                ]);

                let resolver = PromptResolver::new(self.store.as_ref());
                let resolved =
                    resolver.resolve_by_name(&prompt_set.name, &self.prompt_sets_dir, &bindings);

                for llm in &request.llm_configs {
                    let result_id = next_result_id;
                    next_result_id += 1;

                    let (generated_sql, full_prompt, elapsed_ms) = match &resolved {
                        Err(e) => {
                            error!(
                                "error constructing prompt for prompt set '{}': {e}",
                                prompt_set.name
                            );
                            let marker = format!("[Prompt construction error: {e}]");
                            (marker.clone(), marker, 0)
                        }
                        Ok(full_prompt) => {
                            info!(
                                "calling LLM '{}' (model: {}) for NLQ {} and prompt set {}",
                                llm.name, llm.model, nlq.id, prompt_set.id
                            );
                            let (sql, elapsed_ms) = self.generate_sql(llm, full_prompt).await;
                            (sql, full_prompt.clone(), elapsed_ms)
                        }
                    };

                    let tagged = tag_generated_sql(
                        &generated_sql,
                        &nlq.text,
                        &prompt_set.name,
                        &llm.name,
                        result_id,
                    );

                    results.push(GeneratedResult {
                        result_id,
                        nlq_id: nlq.id,
                        prompt_set_id: prompt_set.id,
                        llm_config_id: llm.id,
                        generated_sql: tagged,
                        full_prompt,
                        llm_response_time_ms: elapsed_ms,
                    });
                }
            }
        }

        let run = EvaluationRun {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            results,
        };
        info!(
            "evaluation run {} completed with {} results",
            run.run_id,
            run.results.len()
        );
        run
    }

    /// Explains `generated_sql` and compares it with `baseline_sql` using
    /// the given LLM configuration.
    pub async fn explain(
        &self,
        baseline_sql: &str,
        generated_sql: &str,
        llm: &LlmConfig,
    ) -> Result<String, PromptError> {
        let prompt = prompts::build_explain_prompt(baseline_sql, generated_sql)?;
        let provider = self.provider_factory.create(llm)?;
        provider.generate(&prompt).await
    }

    /// Calls the configured LLM, converting any failure into an inline
    /// `-- ERROR:` marker with zero duration.
    async fn generate_sql(&self, llm: &LlmConfig, prompt: &str) -> (String, u64) {
        let provider = match self.provider_factory.create(llm) {
            Ok(provider) => provider,
            Err(e) => {
                error!("error building provider for LLM config '{}': {e}", llm.name);
                return (format!("-- ERROR: {e}"), 0);
            }
        };

        let start = Instant::now();
        match provider.generate(prompt).await {
            Ok(sql) => (sql, start.elapsed().as_millis() as u64),
            Err(e) => {
                error!("error calling LLM '{}': {e}", llm.name);
                (format!("-- ERROR: {e}"), 0)
            }
        }
    }
}

/// Prepends the identifying comment header to generated SQL, replacing any
/// header left over from a previous tagging pass.
fn tag_generated_sql(
    sql: &str,
    nlq_text: &str,
    prompt_set_name: &str,
    llm_name: &str,
    result_id: i64,
) -> String {
    let unique_id: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(5)
        .collect::<String>()
        .to_uppercase();

    let header = format!(
        "-- NLQ: {nlq_text}\n-- Prompt/Model: {prompt_set_name} / {llm_name}\n-- Unique ID: {unique_id}\n-- Result ID: {result_id}\n\n"
    );

    let mut skipping = true;
    let body: Vec<&str> = sql
        .lines()
        .filter(|line| {
            if skipping
                && (line.starts_with("-- NLQ:")
                    || line.starts_with("-- Prompt/Model:")
                    || line.starts_with("-- Unique ID:")
                    || line.starts_with("-- Result ID:"))
            {
                return false;
            }
            skipping = false;
            true
        })
        .collect();

    format!("{header}{}", body.join("\n").trim_start_matches('\n'))
}
