//! toolsmith command-line binary.
//!
//! Loads the built-in capabilities and exposes the registry, dispatcher,
//! and pipeline interpreter.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: key for `GptTool` and `CodeTool`
//! - `OPENAI_BASE_URL`: alternate OpenAI-compatible endpoint
//! - `TOOLSMITH_MODEL`, `TOOLSMITH_EXEC_INTERPRETER`, `TOOLSMITH_WORKDIR`
//! - `RUST_LOG`: log filter (default: "info")

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use toolsmith::capabilities::{function_tools, project_all, CapabilityRegistry, Services};
use toolsmith::config::Settings;
use toolsmith::dispatch::{render_result, Dispatcher, ToolCall};
use toolsmith::pipeline::{parse_pipeline_str, PipelineInterpreter};
use toolsmith::tools::Builtins;

#[derive(Parser)]
#[command(name = "toolsmith")]
#[command(about = "Tool registry, dispatcher, and pipeline runner", long_about = None)]
struct Cli {
    /// YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of every loaded tool
    Schema,
    /// Print chat-completions function tool definitions
    Tools,
    /// Show which tools loaded and which were skipped
    List,
    /// Run a pipeline file
    Run {
        /// Path to a JSON pipeline
        file: PathBuf,
    },
    /// Invoke a single tool
    Call {
        /// Tool name
        name: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let services = Services::from_settings(settings).context("building chat client")?;
    let (registry, report) = CapabilityRegistry::load(Builtins, &services);
    let dispatcher = Dispatcher::new(&registry);

    match cli.command {
        Commands::Schema => print_json(&serde_json::to_value(project_all(&registry))?),
        Commands::Tools => print_json(&Value::Array(function_tools(&registry))),
        Commands::List => {
            print!("{}", report);
            Ok(())
        }
        Commands::Run { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let steps = parse_pipeline_str(&text)?;
            let context = PipelineInterpreter::new(dispatcher).run(&steps)?;
            print_json(&context.to_json())
        }
        Commands::Call { name, args } => {
            if !registry.contains(&name) {
                bail!("no tool named '{}' (available: {})", name, registry.names().join(", "));
            }
            let call = ToolCall::from_function_call(name, &args);
            println!("{}", render_result(&dispatcher.invoke_call(&call)));
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
