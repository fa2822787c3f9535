use shared::{domain::Frame, error::ErrorCode};
use thiserror::Error;

/// Failures of a get/set call against the frame source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameSourceError {
    #[error("frame source at {addr} is unreachable: {reason}")]
    Connection { addr: String, reason: String },
    #[error("frame source at {addr} did not reply within {timeout_ms} ms")]
    Timeout { addr: String, timeout_ms: u64 },
    #[error("frame {frame} was rejected by the frame source: {message}")]
    InvalidFrame { frame: Frame, message: String },
    #[error("malformed reply from frame source: {0}")]
    Reply(String),
    #[error("frame source error ({code:?}): {message}")]
    Remote { code: ErrorCode, message: String },
}

impl FrameSourceError {
    pub fn connection(addr: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connection {
            addr: addr.into(),
            reason: reason.to_string(),
        }
    }

    /// Transport-level failures leave the connection in an unknown state.
    pub fn poisons_connection(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::Reply(_)
        )
    }
}
