use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use renderer_stub::{serve, RendererState};
use shared::domain::{Frame, FrameRange};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Serve an in-memory renderer timeline over the frame RPC protocol")]
struct Args {
    /// Address to listen on [env: STUB_BIND]
    #[arg(long)]
    bind: Option<String>,
    /// First frame of the project [env: STUB_START_FRAME]
    #[arg(long, allow_hyphen_values = true)]
    start: Option<i64>,
    /// Last frame of the project [env: STUB_END_FRAME]
    #[arg(long, allow_hyphen_values = true)]
    end: Option<i64>,
    /// Frame the timeline starts on [env: STUB_CURRENT_FRAME]
    #[arg(long, allow_hyphen_values = true)]
    current: Option<i64>,
}

fn env_i64(name: &str) -> anyhow::Result<Option<i64>> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<i64>()
            .map(Some)
            .with_context(|| format!("{name} must be an integer, got '{v}'")),
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let bind = args
        .bind
        .or_else(|| std::env::var("STUB_BIND").ok())
        .unwrap_or_else(|| "127.0.0.1:4242".to_string());
    let start = args.start.map_or_else(|| env_i64("STUB_START_FRAME"), |v| Ok(Some(v)))?.unwrap_or(1);
    let end = args.end.map_or_else(|| env_i64("STUB_END_FRAME"), |v| Ok(Some(v)))?.unwrap_or(300);
    let current = args
        .current
        .map_or_else(|| env_i64("STUB_CURRENT_FRAME"), |v| Ok(Some(v)))?
        .unwrap_or(start);

    let range = FrameRange::new(Frame(start), Frame(end));
    anyhow::ensure!(start <= end, "start frame {start} is after end frame {end}");
    anyhow::ensure!(
        range.contains(Frame(current)),
        "current frame {current} is outside {range}"
    );

    let addr: SocketAddr = bind.parse().with_context(|| format!("invalid bind address '{bind}'"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, %range, current, "renderer stub listening");
    serve(listener, Arc::new(RendererState::new(range, Frame(current)))).await?;
    Ok(())
}
