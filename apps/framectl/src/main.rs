use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, FrameSource, RpcFrameSource};
use shared::domain::Frame;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Read or move the renderer's current frame from the terminal")]
struct Args {
    /// Renderer RPC address, overriding config and environment
    #[arg(long, global = true)]
    rpc_addr: Option<String>,
    /// Config file to read instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the current frame
    Get,
    /// Go to a frame
    Set {
        #[arg(allow_hyphen_values = true)]
        frame: i64,
    },
    /// Move the current frame by a signed delta
    Step {
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Print the project's start and end frame
    Range,
}

async fn run(source: &dyn FrameSource, command: &Command) -> Result<String> {
    match command {
        Command::Get => Ok(source.current_frame().await?.to_string()),
        Command::Set { frame } => {
            source.set_current_frame(Frame(*frame)).await?;
            Ok(frame.to_string())
        }
        Command::Step { delta } => {
            let current = source.current_frame().await?;
            let next = current
                .checked_step(*delta)
                .with_context(|| format!("stepping {current} by {delta} overflows"))?;
            source.set_current_frame(next).await?;
            Ok(next.to_string())
        }
        Command::Range => {
            let range = source.frame_range().await?;
            Ok(format!("{} {}", range.start, range.end))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?.with_rpc_addr(args.rpc_addr)?;
    tracing::debug!(command = ?args.command, rpc_addr = %settings.rpc_addr, "running");
    let source = RpcFrameSource::new(settings);
    let output = run(&source, &args.command)
        .await
        .with_context(|| format!("{:?} against {} failed", args.command, source.addr()))?;
    println!("{output}");
    Ok(())
}
