use std::{path::PathBuf, sync::Arc};

mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, BlockingFrameSource, RpcFrameSource};
use eframe::egui;
use tracing_subscriber::EnvFilter;

use controller::FrameEntryController;
use ui::GotoFrameApp;

#[derive(Parser, Debug)]
#[command(about = "Set the renderer's current frame from a small entry window")]
struct Args {
    /// Renderer RPC address, overriding config and environment
    #[arg(long)]
    rpc_addr: Option<String>,
    /// Config file to read instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?.with_rpc_addr(args.rpc_addr)?;
    tracing::info!(rpc_addr = %settings.rpc_addr, "starting frame entry");

    let source = BlockingFrameSource::new(Arc::new(RpcFrameSource::new(settings)))?;
    let mut controller = FrameEntryController::new(source);
    // Failure is shown inside the window; Escape retries.
    if let Err(err) = controller.initialize() {
        tracing::warn!(%err, "starting without an initial frame");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Go to frame")
            .with_inner_size([320.0, 80.0])
            .with_min_inner_size([280.0, 60.0]),
        ..Default::default()
    };
    eframe::run_native(
        "goto_frame",
        options,
        Box::new(|_cc| Ok(Box::new(GotoFrameApp::new(controller)))),
    )
    .map_err(|err| anyhow::anyhow!("frame entry window failed: {err}"))
}
