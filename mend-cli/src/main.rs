//! Mend CLI - cited answers from a local model
//!
//! Asks an Ollama model a question about a context document and prints a
//! schema-validated JSON answer with citations.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use mend::prelude::*;
use mend::qa;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{MendConfig, Overrides, load_config};
use crate::error::{CliError, Result};

/// Ask a local model a question and get a citation-backed JSON answer
#[derive(Parser)]
#[command(name = "mend")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Context document text
    #[arg(long, conflicts_with = "context_file")]
    context: Option<String>,

    /// Read the context document from a file
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Question to answer
    #[arg(short, long)]
    question: Option<String>,

    /// Model identifier (overrides config)
    #[arg(short, long, env = "OLLAMA_MODEL")]
    model: Option<String>,

    /// Run with built-in sample context and question
    #[arg(long)]
    demo: bool,

    /// Maximum number of model calls
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_BASE_URL")]
    base_url: Option<String>,

    /// Per-call time limit in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Send the answer schema to Ollama as a structured output format
    #[arg(long)]
    schema_format: bool,

    /// Configuration file path
    #[arg(short, long, env = "MEND_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Demo mode is explicit, or implied when no input was given at all.
    const fn is_demo(&self) -> bool {
        self.demo
            || (self.context.is_none() && self.context_file.is_none() && self.question.is_none())
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_attempts: self.max_attempts,
            temperature: self.temperature,
            timeout_secs: self.timeout,
        }
    }

    /// Context and question for this run.
    async fn inputs(&self) -> Result<(String, String)> {
        if self.is_demo() {
            return Ok((qa::DEMO_CONTEXT.to_owned(), qa::DEMO_QUESTION.to_owned()));
        }

        let context = match (&self.context, &self.context_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CliError::ContextFile {
                        path: path.clone(),
                        source,
                    })?
            }
            (None, None) => String::new(),
        };

        Ok((context, self.question.clone().unwrap_or_default()))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.is_demo() && cli.question.is_none() {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "--question is required unless --demo is given",
            )
            .exit();
    }

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind_label(), "{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
///
/// Logs go to stderr so stdout carries only the JSON answer.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mend={level},{}",
            if verbosity >= 3 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())
        .await?
        .with_env(|key| std::env::var(key).ok())
        .with_overrides(cli.overrides());
    let (context, question) = cli.inputs().await?;

    let validated = answer(&config, &context, &question, cli.schema_format).await?;
    println!("{}", validated.to_pretty_json()?);

    Ok(())
}

/// Run the repair loop against Ollama, cancelling on Ctrl+C.
async fn answer(
    config: &MendConfig,
    context: &str,
    question: &str,
    schema_format: bool,
) -> Result<Validated> {
    let client = Ollama::new(config.ollama.clone())?;
    let schema = qa::schema();
    let format = schema.json_schema();

    tracing::info!(
        model = client.model(),
        base_url = client.base_url(),
        max_attempts = config.repair.max_attempts,
        "asking model"
    );

    let mut repair = RepairLoop::new(&client, &schema).config(&config.repair);
    if schema_format {
        repair = repair.format(&format);
    }

    let cancel = CancelSignal::new();
    let watcher = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel_with_reason("interrupted by user");
        }
    });

    let result = repair
        .resolve_with_cancel(qa::build_prompt(context, question), &cancel)
        .await;
    ctrl_c.abort();

    result.map_err(CliError::from)
}
