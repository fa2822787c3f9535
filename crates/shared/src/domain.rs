use std::fmt;

use serde::{Deserialize, Serialize};

/// Path of the project root node in the renderer's node graph.
pub const PROJECT_NODE: &str = "/";

pub const CURRENT_FRAME_PARAM: &str = "current_frame";
pub const START_FRAME_PARAM: &str = "start_frame";
pub const END_FRAME_PARAM: &str = "end_frame";

/// An index into the renderer's animation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Frame(pub i64);

impl Frame {
    pub fn checked_step(self, delta: i64) -> Option<Self> {
        self.0.checked_add(delta).map(Self)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Start and end frame of the project, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: Frame,
    pub end: Frame,
}

impl FrameRange {
    pub fn new(start: Frame, end: Frame) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, frame: Frame) -> bool {
        self.start <= frame && frame <= self.end
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
