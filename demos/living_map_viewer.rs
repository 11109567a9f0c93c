//! Watch a living map service in an egui window (requires `--features egui`).
//!
//! Usage:
//!   cargo run --features egui --example living_map_viewer -- http://localhost:8080/api/living-map -l space

#[cfg(feature = "egui")]
use anyhow::{Context, Result};
#[cfg(feature = "egui")]
use clap::Parser;
#[cfg(feature = "egui")]
use {
    livemap::config::ClientConfig,
    livemap::egui_app::LivingMapApp,
    livemap::model::LayerKind,
    livemap::selection::SelectionHandle,
    livemap::stream::StreamClient,
    std::sync::Arc,
};

#[cfg(feature = "egui")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Watch a living map service using egui", long_about = None)]
struct Args {
    /// Base URL of the service (serves `snapshot` and `stream`)
    #[arg(value_name = "SERVICE_URL", default_value = "http://localhost:8080/api/living-map")]
    service: String,

    /// Layer shown first
    #[arg(short = 'l', long = "layer", default_value = "city")]
    layer: LayerKind,

    /// Entity selected on start
    #[arg(short = 's', long = "select")]
    select: Option<String>,
}

#[cfg(feature = "egui")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("livemap=debug"))
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_service_url(&args.service)
        .with_context(|| format!("Invalid service URL {}", args.service))?;

    // The stream client spawns onto the ambient runtime; eframe owns the main thread.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let _guard = runtime.enter();
    let client = Arc::new(StreamClient::connect(config)?);

    let selection = SelectionHandle::new(args.layer);
    selection.select(args.select);

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        &format!("Living Map - {}", args.service),
        options,
        Box::new(move |cc| Ok(Box::new(LivingMapApp::new(&cc.egui_ctx, client, selection)?))),
    )
    .map_err(|e| anyhow::anyhow!("Viewer failed: {e}"))
}

#[cfg(not(feature = "egui"))]
fn main() {
    eprintln!("This example requires the 'egui' feature. Try: cargo run --features egui --example living_map_viewer -- <service-url>");
}
