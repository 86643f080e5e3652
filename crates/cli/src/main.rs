//! # nlqeval CLI
//!
//! Command-line driver for the `nlqeval` library: resolve prompt sets,
//! render inline templates, and run evaluation batches from a JSON spec.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nlqeval::constants::DEFAULT_PROMPT_SETS_DIR;
use nlqeval::store::FileStore;
use nlqeval::templating::inline::apply_template;
use nlqeval::{
    EvaluationRequest, EvaluationRunnerBuilder, MacroBindings, MacroValue, PromptResolver,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a prompt set into a full prompt and print it
    Resolve(ResolveArgs),
    /// Render an inline template against JSON macros
    Template(TemplateArgs),
    /// Run an evaluation batch from a JSON spec file
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// The prompt set name, e.g. "Default Prompt Set"
    prompt_set: String,
    /// Directory prompt sets are stored under
    #[arg(long, env = "PROMPT_SETS_DIR", default_value = DEFAULT_PROMPT_SETS_DIR)]
    base_dir: PathBuf,
    /// Macro bindings as NAME=value, repeatable
    #[arg(short = 'm', long = "macro", value_parser = parse_macro_arg)]
    macros: Vec<(String, String)>,
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// The template text, or a path to it with --file
    template: String,
    /// Treat TEMPLATE as a file path
    #[arg(long)]
    file: bool,
    /// Macros as a JSON object, supporting nested values
    #[arg(long, default_value = "{}")]
    macros: String,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to a JSON evaluation request spec
    spec: PathBuf,
    /// Directory prompt sets are stored under
    #[arg(long, env = "PROMPT_SETS_DIR", default_value = DEFAULT_PROMPT_SETS_DIR)]
    base_dir: PathBuf,
}

/// Parses a `NAME=value` macro binding.
fn parse_macro_arg(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=value, got '{arg}'")),
    }
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Resolve(args) => resolve(args),
        Commands::Template(args) => template(args),
        Commands::Run(args) => run(args).await,
    }
}

fn resolve(args: ResolveArgs) -> Result<()> {
    let store = FileStore;
    let bindings: MacroBindings = args
        .macros
        .into_iter()
        .map(|(name, value)| (name, MacroValue::from(value)))
        .collect();
    let resolver = PromptResolver::new(&store);
    let prompt = resolver.resolve_by_name(&args.prompt_set, &args.base_dir, &bindings)?;
    println!("{prompt}");
    Ok(())
}

fn template(args: TemplateArgs) -> Result<()> {
    let template = if args.file {
        fs::read_to_string(&args.template)
            .with_context(|| format!("failed to read template file '{}'", args.template))?
    } else {
        args.template
    };
    let macros: serde_json::Value =
        serde_json::from_str(&args.macros).context("macros must be valid JSON")?;
    if !macros.is_object() {
        bail!("macros must be a JSON object");
    }
    println!("{}", apply_template(&template, &macros)?);
    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let spec = fs::read_to_string(&args.spec)
        .with_context(|| format!("failed to read run spec '{}'", args.spec.display()))?;
    let request: EvaluationRequest =
        serde_json::from_str(&spec).context("run spec is not a valid evaluation request")?;
    info!(
        "loaded run spec: {} NLQs, {} prompt sets, {} LLM configs",
        request.nlqs.len(),
        request.prompt_sets.len(),
        request.llm_configs.len()
    );

    let runner = EvaluationRunnerBuilder::new()
        .prompt_sets_dir(args.base_dir)
        .build();
    let run = runner.run(&request).await;
    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}
