// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pipeline_resolver::config::{load_settings, parse_payload, RuntimeBuilder, Settings};
use pipeline_resolver::service::PipelineService;
use pipeline_resolver::store::RunStatus;

#[derive(Debug, Parser)]
#[command(name = "pipeline-resolver", version, about = "Resolve and execute nested operation pipelines")]
struct Cli {
    /// Settings file (.yaml, .yml or .toml).
    #[arg(long, global = true, env = "PIPELINE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Override the model service base URL from the settings file.
    #[arg(long, global = true, env = "MODEL_SERVICE_ENDPOINT")]
    model_service_endpoint: Option<String>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a configuration and print the final run snapshot.
    Run {
        config: PathBuf,
        /// Per-operation timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print the execution order and levels of a configuration.
    Plan { config: PathBuf },
    /// List the registered operations.
    Operations,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();

    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(endpoint) = cli.model_service_endpoint {
        settings.model_service.endpoint = endpoint;
    }

    let mut runtime = RuntimeBuilder::from_settings(&settings).await?;
    if let Command::Run {
        timeout: Some(secs), ..
    } = &cli.command
    {
        runtime.options.timeout = Some(Duration::from_secs(*secs));
    }
    let service = PipelineService::new(runtime);

    match cli.command {
        Command::Run { config, .. } => {
            let payload = read_payload(&config)?;
            let snapshot = service.run(&payload).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            if snapshot.status == RunStatus::Succeeded {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Plan { config } => {
            let payload = read_payload(&config)?;
            let planned = service.plan(&payload)?;
            let nodes: Vec<Value> = planned
                .plan
                .order
                .iter()
                .filter_map(|id| planned.graph.get(id))
                .map(|node| {
                    json!({
                        "id": node.id,
                        "operation": node.operation,
                        "level": planned.plan.level_of(&node.id),
                        "dependencies": node.dependencies,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "roots": planned.graph.roots(),
                    "nodes": nodes,
                    "levels": planned.plan.levels,
                }))?
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Operations => {
            for (name, signature) in service.registry().signatures() {
                let optional = signature
                    .optional
                    .iter()
                    .map(|p| format!("{}?", p));
                let params: Vec<String> = signature
                    .required
                    .iter()
                    .map(|p| p.to_string())
                    .chain(optional)
                    .collect();
                println!("{}({}) -> {}", name, params.join(", "), signature.returns);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    parse_payload(&text)
        .with_context(|| format!("configuration {} is not valid JSON", path.display()))
}
