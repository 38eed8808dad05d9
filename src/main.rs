mod app;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use orbit_graph::{Filter, LayoutConfig};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterArg {
    All,
    Gave,
    Received,
}

impl From<FilterArg> for Filter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Filter::All,
            FilterArg::Gave => Filter::Gave,
            FilterArg::Received => Filter::Received,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph payload JSON (`{"nodes": [...], "links": [...]}`).
    #[arg(long)]
    payload: PathBuf,
    /// Layout tuning overrides as JSON.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    #[arg(long, default_value_t = 820.0)]
    height: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("orbit_graph=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("invalid layout config {}", path.display()))?,
        None => LayoutConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    let payload_path = args.payload;
    let filter = Filter::from(args.filter);
    eframe::run_native(
        "orbit-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::OrbitApp::new(
                cc,
                payload_path.clone(),
                config,
                filter,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
