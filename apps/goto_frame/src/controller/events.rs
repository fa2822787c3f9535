//! Input events recognised by the frame entry and the notices shown beside it.

use client_core::FrameSourceError;

use super::field::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    TextChanged(String),
    Increment,
    Decrement,
    Scroll(ScrollDirection),
    Confirm,
    Revert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn from_wheel_delta(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Self::Up)
        } else if delta_y < 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }

    pub fn step(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Startup,
    Commit,
    Step,
    Revert,
}

pub fn classify_source_failure(context: UiErrorContext, err: &FrameSourceError) -> String {
    match err {
        FrameSourceError::Connection { .. } | FrameSourceError::Timeout { .. }
            if context == UiErrorContext::Startup =>
        {
            format!("Renderer unreachable; start it with RPC enabled, then press Esc. ({err})")
        }
        FrameSourceError::Connection { .. } | FrameSourceError::Timeout { .. } => {
            format!("Renderer unreachable; retry when it is back. ({err})")
        }
        FrameSourceError::InvalidFrame { frame, message } => {
            format!("Frame {frame} was rejected: {message}")
        }
        FrameSourceError::Reply(_) | FrameSourceError::Remote { .. } => {
            format!("Renderer RPC error: {err}")
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_source(context: UiErrorContext, err: &FrameSourceError) -> Self {
        let category = match err {
            FrameSourceError::Connection { .. }
            | FrameSourceError::Timeout { .. }
            | FrameSourceError::Reply(_) => UiErrorCategory::Transport,
            FrameSourceError::InvalidFrame { .. } => UiErrorCategory::Validation,
            FrameSourceError::Remote { .. } => UiErrorCategory::Remote,
        };

        Self {
            category,
            context,
            message: classify_source_failure(context, err),
        }
    }

    pub fn from_parse(context: UiErrorContext, err: &ParseError) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: format!("Please enter a valid integer: {err}"),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn label(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Transport => "Connection",
            UiErrorCategory::Validation => "Invalid frame",
            UiErrorCategory::Remote => "Renderer",
        }
    }
}
