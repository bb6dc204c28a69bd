//! Survey planner demo: exports the survey tools, verifies planner-written
//! workflows and invokes functions from the command line.

mod survey;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use toolflow::config::load;
use toolflow::registry::registry::FunctionRegistry;
use toolflow::telemetry::tracing_support;
use toolflow::verifier::VerifyWorkflow;
use tracing::info;

use crate::survey::SurveyStore;

#[derive(Parser)]
#[command(name = "survey-planner")]
#[command(about = "Plan and check survey workflows against a typed function registry", long_about = None)]
struct Cli {
    /// JSON configuration file; `TOOLFLOW_*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool schemas handed to the planner
    Tools {
        /// Character budget per chunk, overriding the configuration
        #[arg(long)]
        chunk_budget: Option<usize>,
    },
    /// Verify a workflow document and print the verdict
    Verify {
        /// Path to the workflow JSON
        workflow: PathBuf,
    },
    /// Invoke a function with positional JSON arguments
    Call {
        /// Function name
        name: String,
        /// Arguments; values that are not valid JSON are passed as strings
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing_support::init(&config.log_filter);

    let registry = toolflow::bootstrap(&config)?;
    survey::register(&registry, &SurveyStore::default())?;
    info!(functions = registry.len(), "survey registry ready");

    match cli.command {
        Commands::Tools { chunk_budget } => {
            if chunk_budget.is_some() {
                config.export.chunk_budget = chunk_budget;
            }
            print_tools(&registry, &config.export)
        }
        Commands::Verify { workflow } => verify(&registry, &workflow),
        Commands::Call { name, args } => call(&registry, &name, args).await,
    }
}

fn print_tools(
    registry: &FunctionRegistry,
    settings: &toolflow::config::ExportSettings,
) -> Result<ExitCode> {
    let chunks = toolflow::export_tools(registry, settings);
    info!(chunks = chunks.len(), "exported tool schemas");
    println!("{}", serde_json::to_string_pretty(&chunks)?);
    Ok(ExitCode::SUCCESS)
}

fn verify(registry: &FunctionRegistry, path: &Path) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workflow {}", path.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("workflow {} is not valid JSON", path.display()))?;

    let report = registry.verify_workflow(&document);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn call(registry: &FunctionRegistry, name: &str, args: Vec<String>) -> Result<ExitCode> {
    let args = args
        .into_iter()
        .map(|arg| serde_json::from_str(&arg).unwrap_or(Value::String(arg)))
        .collect();
    let result = registry.invoke(name, args).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}
