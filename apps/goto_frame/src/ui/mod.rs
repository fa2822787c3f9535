//! UI layer: the single-window shell around the frame entry.

pub mod app;

pub use app::GotoFrameApp;
