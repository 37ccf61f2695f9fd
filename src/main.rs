//! VisionFlow - Command Line Entry Point
//!
//! Inspect the node catalog, check pipeline files, submit media to a
//! processing service, and manage the stored theme.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use visionflow::{
    config::{self, AppConfig},
    pipeline::{fields_for, NodeKind, PipelineDocument},
    session::{FileThemeStore, Session, ThemeController},
    submission::HttpProcessingClient,
    types::Asset,
};

/// Build computer-vision pipelines and run them on a processing service.
#[derive(Parser)]
#[command(name = "visionflow", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Processing service base URL, overriding config and environment
    #[arg(long, global = true)]
    endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the available processing nodes and their parameters
    Catalog,

    /// Load a pipeline file and check it would be accepted for submission
    Validate {
        pipeline: PathBuf,

        /// Print the submission payload
        #[arg(long)]
        payload: bool,
    },

    /// Submit an image or video through a pipeline
    Submit {
        pipeline: PathBuf,
        asset: PathBuf,

        /// Where to write an inline result (defaults to the configured output directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show or toggle the stored theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },

    /// Check the processing service is reachable
    Status,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum ThemeAction {
    Show,
    Toggle,
}

fn init_logging(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "visionflow.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,visionflow=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_or_default(),
    };
    Ok(config
        .with_env_overrides()
        .with_endpoint_override(args.endpoint.clone()))
}

/// Directory holding the theme file: next to the config file, else the app data dir
fn preferences_dir(args: &Args) -> Result<PathBuf> {
    if let Some(dir) = args.config.as_deref().and_then(Path::parent) {
        return Ok(dir.to_path_buf());
    }
    config::app_data_dir().context("Could not determine app data directory")
}

fn run_catalog() {
    for kind in NodeKind::all() {
        println!("{} ({}) [{}]", kind.label(), kind.as_str(), kind.category());
        println!("    {}", kind.description());
        for field in fields_for(*kind) {
            let default = field
                .default_value()
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!("    - {} `{}` = {}", field.label, field.name, default);
        }
    }
}

fn run_validate(pipeline: &Path, show_payload: bool) -> Result<()> {
    let graph = PipelineDocument::load(pipeline)?.build_graph()?;
    let validated = graph
        .validate_for_submission()
        .with_context(|| format!("{} is not ready for submission", pipeline.display()))?;

    println!(
        "{}: {} processing nodes, {} connections",
        pipeline.display(),
        validated.node_count(),
        validated.connections().len()
    );
    for step in validated.steps() {
        println!("  {} ({})", step.id, step.label);
    }
    if !graph.has_complete_path() {
        println!("warning: no connected path from input to output");
    }
    if show_payload {
        println!("{}", validated.to_payload_json()?);
    }
    Ok(())
}

async fn run_submit(config: AppConfig, pipeline: &Path, asset: &Path, out: Option<PathBuf>) -> Result<()> {
    let graph = PipelineDocument::load(pipeline)?.build_graph()?;
    let asset = Asset::from_path(asset)?;
    let output_dir = out.unwrap_or_else(|| config.output_dir());

    let client = HttpProcessingClient::new(&config.endpoint)?;
    let mut session = Session::new(client, config.settings.clone()).with_output_dir(&output_dir);
    session.upload(asset);

    let output = session.submit(&graph).await?;
    let remote = output.remote_url().map(|url| (output.media, url.to_string()));
    match remote {
        Some((media, url)) => println!("Output ({}): {}", media, url),
        None if !config.settings.auto_save_results => {
            let path = session.export_output(&output_dir)?;
            println!("Output written to {}", path.display());
        }
        None => {}
    }

    if let Some(entry) = session.history().latest() {
        println!("{}", entry);
    }
    Ok(())
}

fn run_theme(args: &Args, action: ThemeAction) -> Result<()> {
    let store = FileThemeStore::new(preferences_dir(args)?);
    let mut controller = ThemeController::load_or_init(store)?;
    if action == ThemeAction::Toggle {
        controller.toggle()?;
    }
    println!("{}", controller.theme());
    Ok(())
}

async fn run_status(config: AppConfig) -> Result<()> {
    let client = HttpProcessingClient::new(&config.endpoint)?;
    let url = &config.endpoint.base_url;

    if !client.health().await.with_context(|| format!("{} is unreachable", url))? {
        bail!("{} reported unhealthy", url);
    }
    let version = client.server_version().await?;
    println!("{} is healthy (version {})", url, version);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_deref());

    match &args.command {
        Command::Catalog => {
            run_catalog();
            Ok(())
        }
        Command::Validate { pipeline, payload } => run_validate(pipeline, *payload),
        Command::Submit {
            pipeline,
            asset,
            out,
        } => run_submit(load_config(&args)?, pipeline, asset, out.clone()).await,
        Command::Theme { action } => run_theme(&args, *action),
        Command::Status => run_status(load_config(&args)?).await,
    }
}
