//! Controller layer: reconciles entry-field input with the renderer's current frame.
//!
//! Every handler runs on the UI thread and blocks for the duration of its remote call, so
//! at most one set call is ever in flight and the latest user intent is the one committed.

pub mod events;
pub mod field;

use client_core::{BlockingFrameSource, FrameSourceError};
use shared::domain::{Frame, FrameRange};
use tracing::{debug, info, warn};

use events::{FrameEvent, ScrollDirection, UiError, UiErrorContext};
use field::{is_partial_integer, FieldOrigin, FrameField, ParseError};

pub struct FrameEntryController {
    source: BlockingFrameSource,
    field: FrameField,
    committed: Option<Frame>,
    range: Option<FrameRange>,
    notice: Option<UiError>,
    parse_warning_armed: bool,
}

impl FrameEntryController {
    pub fn new(source: BlockingFrameSource) -> Self {
        Self {
            source,
            field: FrameField::default(),
            committed: None,
            range: None,
            notice: None,
            parse_warning_armed: true,
        }
    }

    pub fn field_text(&self) -> &str {
        self.field.text()
    }

    pub fn field_origin(&self) -> FieldOrigin {
        self.field.origin()
    }

    pub fn committed(&self) -> Option<Frame> {
        self.committed
    }

    pub fn range(&self) -> Option<FrameRange> {
        self.range
    }

    pub fn notice(&self) -> Option<&UiError> {
        self.notice.as_ref()
    }

    pub fn handle(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::TextChanged(candidate) => {
                self.on_text_changed(&candidate);
            }
            FrameEvent::Increment => self.on_increment(),
            FrameEvent::Decrement => self.on_decrement(),
            FrameEvent::Scroll(direction) => self.on_scroll_delta(direction),
            FrameEvent::Confirm => self.on_confirm(),
            FrameEvent::Revert => self.on_revert(),
        }
    }

    /// Single best-effort read of the current frame; the field stays empty on failure.
    pub fn initialize(&mut self) -> Result<Frame, FrameSourceError> {
        self.field = FrameField::default();
        match self.source.current_frame() {
            Ok(frame) => {
                info!(%frame, "initial frame fetched");
                self.accept_remote(frame);
                self.refresh_range();
                Ok(frame)
            }
            Err(err) => {
                self.report(UiErrorContext::Startup, &err);
                Err(err)
            }
        }
    }

    /// Returns whether the candidate was accepted into the field. An accepted edit clears
    /// any earlier notice.
    pub fn on_text_changed(&mut self, candidate: &str) -> bool {
        if !is_partial_integer(candidate) {
            debug!(%candidate, "rejected non-integer input");
            return false;
        }
        self.field.set_typed(candidate);
        self.notice = None;
        true
    }

    pub fn on_increment(&mut self) {
        self.step(1);
    }

    pub fn on_decrement(&mut self) {
        self.step(-1);
    }

    /// Stages a ±1 change locally; nothing is sent until confirm.
    pub fn on_scroll_delta(&mut self, direction: ScrollDirection) {
        let base = match self.field_or_committed() {
            Ok(base) => base,
            Err(err) => return self.warn_parse(UiErrorContext::Step, err),
        };
        let Some(staged) = base.checked_step(direction.step()) else {
            return self.warn_parse(UiErrorContext::Step, overflow(base, direction.step()));
        };
        self.parse_warning_armed = true;
        self.field.stage_scrolled(staged);
        self.notice = None;
    }

    pub fn on_confirm(&mut self) {
        let frame = match self.field.parse() {
            Ok(frame) => frame,
            Err(err) => return self.warn_parse(UiErrorContext::Commit, err),
        };
        self.parse_warning_armed = true;
        if self.commit(frame, UiErrorContext::Commit).is_ok() {
            self.field.mark_committed();
        }
    }

    /// Discards staged edits by re-reading the frame source.
    pub fn on_revert(&mut self) {
        match self.source.current_frame() {
            Ok(frame) => {
                debug!(%frame, "reverted to remote frame");
                self.accept_remote(frame);
                if self.range.is_none() {
                    self.refresh_range();
                }
            }
            Err(err) => self.report(UiErrorContext::Revert, &err),
        }
    }

    /// Arrow steps commit at once. A wheel-staged value is never the base: the step starts
    /// from the last committed frame so the remote moves by exactly one.
    fn step(&mut self, delta: i64) {
        let base = match (self.field.origin(), self.committed) {
            (FieldOrigin::Scrolled, Some(committed)) => Ok(committed),
            _ => self.field_or_committed(),
        };
        let base = match base {
            Ok(base) => base,
            Err(err) => return self.warn_parse(UiErrorContext::Step, err),
        };
        let Some(next) = base.checked_step(delta) else {
            return self.warn_parse(UiErrorContext::Step, overflow(base, delta));
        };

        self.parse_warning_armed = true;
        if self.commit(next, UiErrorContext::Step).is_ok() {
            self.field.show_remote(next);
        }
    }

    fn field_or_committed(&self) -> Result<Frame, ParseError> {
        self.field
            .parse()
            .or_else(|err| self.committed.ok_or(err))
    }

    fn commit(&mut self, frame: Frame, context: UiErrorContext) -> Result<(), FrameSourceError> {
        info!(%frame, ?context, "committing frame");
        match self.source.set_current_frame(frame) {
            Ok(()) => {
                self.committed = Some(frame);
                self.notice = None;
                Ok(())
            }
            Err(err) => {
                self.report(context, &err);
                Err(err)
            }
        }
    }

    fn accept_remote(&mut self, frame: Frame) {
        self.field.show_remote(frame);
        self.committed = Some(frame);
        self.notice = None;
    }

    fn refresh_range(&mut self) {
        match self.source.frame_range() {
            Ok(range) => {
                debug!(%range, "frame range fetched");
                self.range = Some(range);
            }
            Err(err) => warn!(%err, "could not fetch frame range"),
        }
    }

    fn report(&mut self, context: UiErrorContext, err: &FrameSourceError) {
        warn!(?context, %err, "frame source call failed");
        self.notice = Some(UiError::from_source(context, err));
    }

    /// Raised once per run of parse failures; re-armed by the next successful parse.
    fn warn_parse(&mut self, context: UiErrorContext, err: ParseError) {
        if !self.parse_warning_armed {
            debug!(%err, "parse failure (already reported)");
            return;
        }
        warn!(?context, %err, "skipping commit of unparsable frame");
        self.notice = Some(UiError::from_parse(context, &err));
        self.parse_warning_armed = false;
    }
}

fn overflow(base: Frame, delta: i64) -> ParseError {
    ParseError::OutOfRange(format!("{base}{delta:+}"))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
