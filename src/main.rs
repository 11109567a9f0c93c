use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use livemap::config::ClientConfig;
use livemap::layout::{LayoutConfig, compute_layout};
use livemap::model::{LayerKind, Snapshot};
use livemap::stream::{HttpTransport, SnapshotSource, StreamClient};

const DEFAULT_SERVICE: &str = "http://localhost:8080/api/living-map";

#[derive(Parser, Debug)]
#[command(author, version, about = "Live map of a distributed system's entities", long_about = None)]
struct Cli {
    /// Base URL of the living map service (serves `snapshot` and `stream`)
    #[arg(long, global = true, env = "LIVEMAP_SERVICE_URL", default_value = DEFAULT_SERVICE)]
    service: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one snapshot and print it as JSON
    Snapshot,
    /// Fetch one snapshot and print the layout of a layer as JSON
    Layout {
        #[arg(long, default_value = "city")]
        layer: LayerKind,
        #[arg(long, default_value_t = 900.0)]
        width: f32,
        #[arg(long, default_value_t = 900.0)]
        height: f32,
    },
    /// Follow the stream and print a line per published snapshot
    Watch,
    /// Open the interactive viewer
    #[cfg(feature = "egui")]
    View {
        #[arg(long, default_value = "city")]
        layer: LayerKind,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("livemap=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_service_url(&cli.service)
        .with_context(|| format!("Invalid service URL {}", cli.service))?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;

    match cli.command {
        Command::Snapshot => {
            let snapshot = runtime.block_on(fetch(config))?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Layout {
            layer,
            width,
            height,
        } => {
            let snapshot = runtime.block_on(fetch(config))?;
            let layout = compute_layout(
                snapshot.layer(layer),
                width,
                height,
                &LayoutConfig::default(),
            );
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Command::Watch => runtime.block_on(watch(config))?,
        #[cfg(feature = "egui")]
        Command::View { layer } => {
            let _guard = runtime.enter();
            view(config, layer)?;
        }
    }
    Ok(())
}

async fn fetch(config: ClientConfig) -> Result<Snapshot> {
    let transport = HttpTransport::new(config)?;
    transport
        .fetch_snapshot()
        .await
        .with_context(|| format!("Failed to fetch {}", transport.config().snapshot_url))
}

fn summary(snapshot: &Snapshot) -> String {
    LayerKind::ALL
        .iter()
        .map(|kind| format!("{}={}", kind, snapshot.layer(*kind).len()))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn watch(config: ClientConfig) -> Result<()> {
    let client = StreamClient::connect(config)?;
    let mut snapshots = client.subscribe_snapshot();
    let mut status = client.subscribe_status();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(snapshot) = snapshots.borrow_and_update().clone() {
                    let at = snapshot
                        .generated_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{at} {}", summary(&snapshot));
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                println!("# stream {current}");
            }
        }
    }
    client.shutdown();
    Ok(())
}

#[cfg(feature = "egui")]
fn view(config: ClientConfig, layer: LayerKind) -> Result<()> {
    use std::sync::Arc;

    use livemap::egui_app::LivingMapApp;
    use livemap::selection::SelectionHandle;

    let client = Arc::new(StreamClient::connect(config)?);
    let selection = SelectionHandle::new(layer);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Living Map",
        options,
        Box::new(move |cc| {
            let app = LivingMapApp::new(&cc.egui_ctx, client, selection)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Viewer failed: {e}"))
}
