//! The entry field's text and where it came from.

use std::num::IntErrorKind;

use shared::domain::Frame;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    /// Fetched from, or committed to, the frame source.
    Remote,
    /// Edited by keystrokes and not yet committed.
    Typed,
    /// Staged by the mouse wheel and not yet committed.
    Scrolled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("the frame field is empty")]
    Empty,
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
    #[error("'{0}' is too large for a frame number")]
    OutOfRange(String),
}

/// Text that is, or can still become, an integer: empty, a lone sign, or a signed digit run.
pub fn is_partial_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn parse_frame(text: &str) -> Result<Frame, ParseError> {
    text.parse::<i64>().map(Frame).map_err(|err| match err.kind() {
        IntErrorKind::Empty => ParseError::Empty,
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ParseError::OutOfRange(text.to_string())
        }
        _ => ParseError::NotANumber(text.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameField {
    text: String,
    origin: FieldOrigin,
}

impl Default for FrameField {
    fn default() -> Self {
        Self {
            text: String::new(),
            origin: FieldOrigin::Remote,
        }
    }
}

impl FrameField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> FieldOrigin {
        self.origin
    }

    pub fn parse(&self) -> Result<Frame, ParseError> {
        parse_frame(&self.text)
    }

    pub fn show_remote(&mut self, frame: Frame) {
        self.text = frame.to_string();
        self.origin = FieldOrigin::Remote;
    }

    /// Keeps the text as typed; only its origin changes.
    pub fn mark_committed(&mut self) {
        self.origin = FieldOrigin::Remote;
    }

    pub fn set_typed(&mut self, text: &str) {
        self.text = text.to_string();
        self.origin = FieldOrigin::Typed;
    }

    pub fn stage_scrolled(&mut self, frame: Frame) {
        self.text = frame.to_string();
        self.origin = FieldOrigin::Scrolled;
    }
}
