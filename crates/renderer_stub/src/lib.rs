//! A small RPC server that answers frame requests the way the renderer does.
//!
//! Used by the client tests and for running the desktop app without the renderer.

use std::{net::SocketAddr, sync::Arc};

use shared::{
    error::{ErrorCode, RpcError},
    protocol::{decode_line, encode_line, RpcMethod, RpcReply, RpcRequest},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod app_state;

pub use app_state::{RendererState, Timeline};

pub async fn serve(listener: TcpListener, state: Arc<RendererState>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, state).await {
                warn!(%peer, %err, "rpc connection ended with error");
            }
        });
    }
}

/// Binds an ephemeral port on localhost and serves in the background.
pub async fn spawn_local(state: Arc<RendererState>) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(err) = serve(listener, state).await {
            warn!(%err, "stub server stopped");
        }
    });
    Ok((addr, handle))
}

async fn handle_connection(stream: TcpStream, state: Arc<RendererState>) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    info!(%peer, "rpc client connected");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(&state, &line).await;
        let encoded = encode_line(&reply)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        write_half.write_all(encoded.as_bytes()).await?;
        write_half.flush().await?;
    }

    info!(%peer, "rpc client disconnected");
    Ok(())
}

pub async fn handle_line(state: &RendererState, line: &str) -> RpcReply {
    let request: RpcRequest = match decode_line(line) {
        Ok(request) => request,
        Err(err) => {
            return RpcReply::err(
                0,
                RpcError::new(ErrorCode::Internal, format!("malformed request: {err}")),
            )
        }
    };
    debug!(id = request.id, method = ?request.method, name = %request.params.name, "rpc request");

    let params = &request.params;
    let outcome = match request.method {
        RpcMethod::GetParam => state.get_param(&params.node, &params.name).await,
        RpcMethod::SetParam => {
            state
                .set_param(&params.node, &params.name, params.value.as_deref())
                .await
        }
    };

    match outcome {
        Ok(value) => RpcReply::ok(request.id, value),
        Err(err) => RpcReply::err(request.id, err.into()),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
