use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use shared::{
    domain::{
        Frame, FrameRange, CURRENT_FRAME_PARAM, END_FRAME_PARAM, PROJECT_NODE, START_FRAME_PARAM,
    },
    error::ErrorCode,
    protocol::{value_as_i64, RpcReply, RpcRequest},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub mod config;
pub mod error;
mod transport;

pub use config::{load_settings, ClientSettings};
pub use error::FrameSourceError;

use transport::RpcConnection;

/// The renderer's authoritative current-frame value, reachable only through remote calls.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn current_frame(&self) -> Result<Frame, FrameSourceError>;
    async fn set_current_frame(&self, frame: Frame) -> Result<(), FrameSourceError>;
    async fn frame_range(&self) -> Result<FrameRange, FrameSourceError>;
}

/// Frame source backed by the renderer's line-delimited JSON RPC port.
///
/// The connection is opened on first use and kept for later calls. Any transport
/// failure drops it, so the next call reconnects; nothing is retried automatically.
pub struct RpcFrameSource {
    settings: ClientSettings,
    next_id: AtomicU64,
    connection: Mutex<Option<RpcConnection>>,
}

impl RpcFrameSource {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            next_id: AtomicU64::new(1),
            connection: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.settings.rpc_addr
    }

    async fn call(&self, request: RpcRequest) -> Result<RpcReply, FrameSourceError> {
        let addr = self.settings.rpc_addr.as_str();
        let mut connection = self.connection.lock().await;
        if connection.is_none() {
            *connection =
                Some(RpcConnection::connect(addr, self.settings.connect_timeout()).await?);
        }
        let Some(open) = connection.as_mut() else {
            return Err(FrameSourceError::connection(addr, "no open connection"));
        };

        debug!(id = request.id, method = ?request.method, name = %request.params.name, "rpc request");
        let result = match open
            .round_trip(&request, self.settings.request_timeout())
            .await
        {
            Ok(reply) if reply.id != request.id => Err(FrameSourceError::Reply(format!(
                "reply id {} does not match request id {}",
                reply.id, request.id
            ))),
            other => other,
        };

        if let Err(err) = &result {
            if err.poisons_connection() {
                warn!(%addr, %err, "dropping frame source connection");
                *connection = None;
            }
        }
        result
    }

    async fn get_int_param(&self, name: &str) -> Result<i64, FrameSourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let reply = self
            .call(RpcRequest::get_param(id, PROJECT_NODE, name))
            .await?;
        let value = reply.into_outcome().map_err(|err| FrameSourceError::Remote {
            code: err.code,
            message: err.message,
        })?;
        value_as_i64(&value).ok_or_else(|| {
            FrameSourceError::Reply(format!("parameter '{name}' is not an integer: {value}"))
        })
    }
}

#[async_trait]
impl FrameSource for RpcFrameSource {
    async fn current_frame(&self) -> Result<Frame, FrameSourceError> {
        self.get_int_param(CURRENT_FRAME_PARAM).await.map(Frame)
    }

    async fn set_current_frame(&self, frame: Frame) -> Result<(), FrameSourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let reply = self
            .call(RpcRequest::set_param(
                id,
                PROJECT_NODE,
                CURRENT_FRAME_PARAM,
                frame.to_string(),
            ))
            .await?;
        reply.into_outcome().map(|_| ()).map_err(|err| match err.code {
            ErrorCode::InvalidValue => FrameSourceError::InvalidFrame {
                frame,
                message: err.message,
            },
            code => FrameSourceError::Remote {
                code,
                message: err.message,
            },
        })
    }

    async fn frame_range(&self) -> Result<FrameRange, FrameSourceError> {
        let start = self.get_int_param(START_FRAME_PARAM).await?;
        let end = self.get_int_param(END_FRAME_PARAM).await?;
        Ok(FrameRange::new(Frame(start), Frame(end)))
    }
}

/// Drives a [`FrameSource`] to completion on the calling thread.
///
/// Used by the desktop controller, whose event handlers run on the UI thread and block
/// for the duration of each remote call.
pub struct BlockingFrameSource {
    runtime: tokio::runtime::Runtime,
    source: Arc<dyn FrameSource>,
}

impl BlockingFrameSource {
    pub fn new(source: Arc<dyn FrameSource>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime, source })
    }

    pub fn current_frame(&self) -> Result<Frame, FrameSourceError> {
        self.runtime.block_on(self.source.current_frame())
    }

    pub fn set_current_frame(&self, frame: Frame) -> Result<(), FrameSourceError> {
        self.runtime.block_on(self.source.set_current_frame(frame))
    }

    pub fn frame_range(&self) -> Result<FrameRange, FrameSourceError> {
        self.runtime.block_on(self.source.frame_range())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
