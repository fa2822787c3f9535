//! One TCP connection to the renderer's RPC port, used for strictly sequential round trips.

use std::time::Duration;

use shared::protocol::{decode_line, encode_line, RpcReply, RpcRequest};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

use crate::error::FrameSourceError;

pub(crate) struct RpcConnection {
    addr: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RpcConnection {
    pub(crate) async fn connect(addr: &str, timeout: Duration) -> Result<Self, FrameSourceError> {
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(FrameSourceError::connection(addr, err)),
            Err(_) => {
                return Err(FrameSourceError::connection(
                    addr,
                    format!("connect timed out after {} ms", timeout.as_millis()),
                ))
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            tracing::debug!(%addr, %err, "could not disable nagle on rpc socket");
        }

        let (read_half, write_half) = stream.into_split();
        tracing::info!(%addr, "connected to frame source");
        Ok(Self {
            addr: addr.to_string(),
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    pub(crate) async fn round_trip(
        &mut self,
        request: &RpcRequest,
        timeout: Duration,
    ) -> Result<RpcReply, FrameSourceError> {
        let line = encode_line(request)
            .map_err(|err| FrameSourceError::Reply(format!("could not encode request: {err}")))?;

        match tokio::time::timeout(timeout, self.exchange(&line)).await {
            Ok(reply) => reply,
            Err(_) => Err(FrameSourceError::Timeout {
                addr: self.addr.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn exchange(&mut self, line: &str) -> Result<RpcReply, FrameSourceError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|err| FrameSourceError::connection(&self.addr, err))?;
        self.writer
            .flush()
            .await
            .map_err(|err| FrameSourceError::connection(&self.addr, err))?;

        let mut reply = String::new();
        let read = self
            .reader
            .read_line(&mut reply)
            .await
            .map_err(|err| FrameSourceError::connection(&self.addr, err))?;
        if read == 0 {
            return Err(FrameSourceError::connection(
                &self.addr,
                "connection closed by frame source",
            ));
        }

        decode_line(&reply).map_err(|err| FrameSourceError::Reply(err.to_string()))
    }
}
