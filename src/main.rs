mod app;
mod config;
mod graph;
mod layout;
mod schema;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ExplorerConfig;
use schema::SchemaSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Schema JSON to explore; the bundled sample is used when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// JSON file overriding layout and interaction tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter directive, used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn init_logging(filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter)
            .with_context(|| format!("invalid log filter `{filter}`"))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to install log subscriber")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_filter)?;

    let config = match &args.config {
        Some(path) => ExplorerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ExplorerConfig::default(),
    };
    let source = args
        .schema
        .map(SchemaSource::File)
        .unwrap_or(SchemaSource::Embedded);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "schemascope",
        options,
        Box::new(move |cc| Ok(Box::new(app::SchemaExplorerApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow!("failed to start the explorer window: {error}"))
}
