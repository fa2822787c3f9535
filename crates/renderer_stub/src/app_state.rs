use serde_json::Value;
use shared::{
    domain::{
        Frame, FrameRange, CURRENT_FRAME_PARAM, END_FRAME_PARAM, PROJECT_NODE, START_FRAME_PARAM,
    },
    error::{ErrorCode, RpcException},
};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub current: Frame,
    pub range: FrameRange,
}

/// In-memory stand-in for the renderer's project parameters.
pub struct RendererState {
    timeline: Mutex<Timeline>,
}

impl RendererState {
    pub fn new(range: FrameRange, current: Frame) -> Self {
        Self {
            timeline: Mutex::new(Timeline { current, range }),
        }
    }

    pub async fn snapshot(&self) -> Timeline {
        *self.timeline.lock().await
    }

    pub async fn get_param(&self, node: &str, name: &str) -> Result<Value, RpcException> {
        ensure_project_node(node)?;
        let timeline = self.timeline.lock().await;
        let frame = match name {
            CURRENT_FRAME_PARAM => timeline.current,
            START_FRAME_PARAM => timeline.range.start,
            END_FRAME_PARAM => timeline.range.end,
            other => return Err(unknown_param(other)),
        };
        // The renderer reports parameter values as strings.
        Ok(Value::String(frame.to_string()))
    }

    pub async fn set_param(
        &self,
        node: &str,
        name: &str,
        value: Option<&str>,
    ) -> Result<Value, RpcException> {
        ensure_project_node(node)?;
        if name != CURRENT_FRAME_PARAM {
            return Err(match name {
                START_FRAME_PARAM | END_FRAME_PARAM => RpcException::new(
                    ErrorCode::InvalidValue,
                    format!("parameter '{name}' is read-only here"),
                ),
                other => unknown_param(other),
            });
        }

        let raw = value.ok_or_else(|| {
            RpcException::new(ErrorCode::InvalidValue, "set_param requires a value")
        })?;
        let frame = raw.trim().parse::<i64>().map(Frame).map_err(|_| {
            RpcException::new(
                ErrorCode::InvalidValue,
                format!("'{raw}' is not an integer frame"),
            )
        })?;

        let mut timeline = self.timeline.lock().await;
        if !timeline.range.contains(frame) {
            return Err(RpcException::new(
                ErrorCode::InvalidValue,
                format!("frame {frame} is outside {}", timeline.range),
            ));
        }
        timeline.current = frame;
        Ok(Value::String(frame.to_string()))
    }
}

fn ensure_project_node(node: &str) -> Result<(), RpcException> {
    if node == PROJECT_NODE {
        Ok(())
    } else {
        Err(RpcException::new(
            ErrorCode::UnknownNode,
            format!("no node at '{node}'"),
        ))
    }
}

fn unknown_param(name: &str) -> RpcException {
    RpcException::new(ErrorCode::UnknownParam, format!("unknown parameter '{name}'"))
}
