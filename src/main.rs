//! Synthook CLI
//!
//! # Commands
//!
//! - `synthook run` - Generate and deliver scenarios, printing outcomes as JSON lines
//! - `synthook check` - Validate configuration and dispatcher wiring offline

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use synthook::config::{self, HarnessConfig};
use synthook::dispatcher::{Dispatcher, ScenarioRequest};
use synthook::generator::mock::ExampleEchoGenerator;
use synthook::sinks::{MemoryPublisher, SinkId};
use synthook::{HarnessBuilder, HarnessError, ScenarioCatalog};
use tracing::{error, info, warn};

/// Synthetic payment-webhook harness
#[derive(Parser)]
#[command(name = "synthook")]
#[command(version)]
#[command(about = "Generate schema-checked payment webhooks from scenario text and deliver them")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and deliver one scenario, or a batch from the built-in catalog
    #[command(alias = "r")]
    Run(RunArgs),

    /// Load configuration and wire the dispatcher without calling any service
    #[command(alias = "c")]
    Check(ConfigArg),
}

#[derive(Args)]
struct ConfigArg {
    /// Harness configuration file (TOML or JSON)
    #[arg(short, long, env = "SYNTHOOK_CONFIG", default_value = "synthook.toml")]
    config: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// Scenario text; the built-in catalog is used when absent
    #[arg(short, long)]
    scenario: Option<String>,

    /// Event type to use instead of inferring it from the scenario
    #[arg(short, long)]
    event_type: Option<String>,

    /// Sink to deliver to (defaults to the first configured sink)
    #[arg(long)]
    sink: Option<String>,

    /// Number of scenarios to run
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Replay stored examples instead of calling the generative service
    #[arg(long)]
    echo: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    synthook::log::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Check(args) => check(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("synthook: {e}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: RunArgs) -> Result<ExitCode, HarnessError> {
    let config = config::load(&args.config.config)?;
    let sink_id = resolve_sink(&config, args.sink.as_deref())?;

    let mut builder = HarnessBuilder::new(&config);
    if args.echo {
        builder = builder.generator(Arc::new(ExampleEchoGenerator));
    } else {
        builder = builder.api_key(Some(config.require_api_key()?));
    }
    let dispatcher = builder.build().await?;

    let scenarios: Vec<String> = match &args.scenario {
        Some(scenario) => vec![scenario.clone(); args.count],
        None => ScenarioCatalog::builtin()
            .take(args.count)
            .map(str::to_string)
            .collect(),
    };

    let requests = scenarios.into_iter().map(|scenario| {
        let request = ScenarioRequest::new(scenario, sink_id.clone());
        match &args.event_type {
            Some(event_type) => request.with_event_type(event_type.as_str()),
            None => request,
        }
    });

    let outcomes = dispatcher.simulate_all(requests).await;
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();

    let mut stdout = io::stdout().lock();
    for outcome in &outcomes {
        serde_json::to_writer(&mut stdout, outcome)?;
        writeln!(stdout).map_err(serde_json::Error::io)?;
    }

    info!(total = outcomes.len(), failed, sink_id = %sink_id, "Run finished");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn check(args: ConfigArg) -> Result<ExitCode, HarnessError> {
    let config = config::load(&args.config)?;

    let api_key = config.api_key();
    let has_api_key = api_key.is_some();
    if !has_api_key {
        warn!(
            var = %config.generator.api_key_env,
            "API key is not set; `synthook run` will need it"
        );
    }

    let dispatcher = HarnessBuilder::new(&config)
        .api_key(api_key)
        .publisher(Arc::new(MemoryPublisher::new()))
        .build()
        .await?;

    println!("{}", summary(&config, &dispatcher, has_api_key));
    Ok(ExitCode::SUCCESS)
}

fn resolve_sink(config: &HarnessConfig, requested: Option<&str>) -> Result<SinkId, HarnessError> {
    match requested {
        Some(id) if config.sinks.iter().any(|s| s.id == id) => Ok(SinkId::new(id)),
        Some(id) => Err(HarnessError::UnknownSink(id.to_string())),
        None => config
            .sinks
            .first()
            .map(|s| SinkId::new(s.id.as_str()))
            .ok_or(HarnessError::NoSinks),
    }
}

fn summary(
    config: &HarnessConfig,
    dispatcher: &Dispatcher,
    has_api_key: bool,
) -> serde_json::Value {
    let event_types: Vec<_> = dispatcher
        .registry()
        .event_types()
        .map(|event_type| {
            json!({
                "name": event_type.as_str(),
                "examples": dispatcher.examples().count(event_type),
            })
        })
        .collect();

    let sinks: Vec<_> = config
        .sinks
        .iter()
        .map(|sink| json!({"id": sink.id, "kind": sink.kind, "address": sink.address}))
        .collect();

    json!({
        "model": config.generator.model,
        "apiKey": has_api_key,
        "eventTypes": event_types,
        "sinks": sinks,
    })
}
