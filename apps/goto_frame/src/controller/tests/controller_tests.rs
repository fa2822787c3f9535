use super::*;
use async_trait::async_trait;
use client_core::FrameSource;
use super::events::UiErrorCategory;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct FakeTimeline {
    current: Frame,
    range: FrameRange,
    reachable: bool,
    set_calls: Vec<Frame>,
    get_calls: usize,
}

#[derive(Clone)]
struct FakeSource {
    timeline: Arc<Mutex<FakeTimeline>>,
}

impl FakeSource {
    fn at(current: i64) -> Self {
        Self {
            timeline: Arc::new(Mutex::new(FakeTimeline {
                current: Frame(current),
                range: FrameRange::new(Frame(1), Frame(300)),
                reachable: true,
                set_calls: Vec::new(),
                get_calls: 0,
            })),
        }
    }

    fn unreachable() -> Self {
        let source = Self::at(1);
        source.set_reachable(false);
        source
    }

    fn set_reachable(&self, reachable: bool) {
        self.timeline.lock().expect("timeline").reachable = reachable;
    }

    fn move_remote(&self, frame: i64) {
        self.timeline.lock().expect("timeline").current = Frame(frame);
    }

    fn current(&self) -> Frame {
        self.timeline.lock().expect("timeline").current
    }

    fn set_calls(&self) -> Vec<Frame> {
        self.timeline.lock().expect("timeline").set_calls.clone()
    }

    fn get_calls(&self) -> usize {
        self.timeline.lock().expect("timeline").get_calls
    }

    fn offline() -> FrameSourceError {
        FrameSourceError::connection("fake:0", "connection refused")
    }
}

#[async_trait]
impl FrameSource for FakeSource {
    async fn current_frame(&self) -> Result<Frame, FrameSourceError> {
        let mut timeline = self.timeline.lock().expect("timeline");
        timeline.get_calls += 1;
        if !timeline.reachable {
            return Err(Self::offline());
        }
        Ok(timeline.current)
    }

    async fn set_current_frame(&self, frame: Frame) -> Result<(), FrameSourceError> {
        let mut timeline = self.timeline.lock().expect("timeline");
        if !timeline.reachable {
            return Err(Self::offline());
        }
        timeline.set_calls.push(frame);
        if !timeline.range.contains(frame) {
            return Err(FrameSourceError::InvalidFrame {
                frame,
                message: format!("frame {frame} is outside {}", timeline.range),
            });
        }
        timeline.current = frame;
        Ok(())
    }

    async fn frame_range(&self) -> Result<FrameRange, FrameSourceError> {
        let timeline = self.timeline.lock().expect("timeline");
        if !timeline.reachable {
            return Err(Self::offline());
        }
        Ok(timeline.range)
    }
}

fn controller_for(source: &FakeSource) -> FrameEntryController {
    let blocking = BlockingFrameSource::new(Arc::new(source.clone())).expect("runtime");
    FrameEntryController::new(blocking)
}

fn started_at(current: i64) -> (FrameEntryController, FakeSource) {
    let source = FakeSource::at(current);
    let mut controller = controller_for(&source);
    controller.initialize().expect("initialize");
    (controller, source)
}

fn type_text(controller: &mut FrameEntryController, text: &str) {
    controller.handle(FrameEvent::TextChanged(String::new()));
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        if !controller.on_text_changed(&typed) {
            typed.pop();
        }
    }
}

#[test]
fn initialize_populates_field_and_range() {
    let (controller, _source) = started_at(24);
    assert_eq!(controller.field_text(), "24");
    assert_eq!(controller.committed(), Some(Frame(24)));
    assert_eq!(controller.range(), Some(FrameRange::new(Frame(1), Frame(300))));
    assert!(controller.notice().is_none());
}

#[test]
fn unreachable_at_startup_leaves_field_empty_with_connection_notice() {
    let source = FakeSource::unreachable();
    let mut controller = controller_for(&source);

    let err = controller.initialize().expect_err("offline");
    assert!(matches!(err, FrameSourceError::Connection { .. }));
    assert_eq!(controller.field_text(), "");
    assert_eq!(controller.committed(), None);
    let notice = controller.notice().expect("notice");
    assert_eq!(notice.category(), UiErrorCategory::Transport);
    assert_eq!(notice.context(), UiErrorContext::Startup);
    assert_eq!(source.get_calls(), 1);
}

#[test]
fn confirm_commits_exact_typed_text() {
    let (mut controller, source) = started_at(24);
    type_text(&mut controller, "120");

    controller.handle(FrameEvent::Confirm);

    assert_eq!(controller.field_text(), "120");
    assert_eq!(source.current(), Frame(120));
    assert_eq!(controller.committed(), Some(Frame(120)));
    assert_eq!(controller.field_origin(), FieldOrigin::Remote);
}

#[test]
fn confirm_keeps_leading_zeros_as_typed() {
    let (mut controller, source) = started_at(24);
    type_text(&mut controller, "007");
    controller.on_confirm();
    assert_eq!(controller.field_text(), "007");
    assert_eq!(source.current(), Frame(7));
}

#[test]
fn typing_letters_is_rejected_and_confirm_makes_no_call() {
    let (mut controller, source) = started_at(24);
    for candidate in ["a", "ab", "abc"] {
        assert!(!controller.on_text_changed(candidate));
    }
    assert_eq!(controller.field_text(), "24");

    type_text(&mut controller, "abc");
    assert_eq!(controller.field_text(), "");
    controller.on_confirm();

    assert!(source.set_calls().is_empty());
    assert_eq!(source.current(), Frame(24));
    assert_eq!(controller.field_text(), "");
    let notice = controller.notice().expect("parse notice");
    assert_eq!(notice.category(), UiErrorCategory::Validation);
}

#[test]
fn lone_sign_or_empty_field_skips_commit() {
    let (mut controller, source) = started_at(24);
    for text in ["", "-", "+"] {
        assert!(controller.on_text_changed(text));
        controller.on_confirm();
        assert_eq!(controller.field_text(), text);
    }
    assert!(source.set_calls().is_empty());
}

#[test]
fn overflowing_text_is_a_parse_error_not_a_remote_call() {
    let (mut controller, source) = started_at(24);
    assert!(controller.on_text_changed("99999999999999999999"));
    controller.on_confirm();
    assert!(source.set_calls().is_empty());
    assert!(controller.notice().expect("notice").message().contains("too large"));
}

#[test]
fn parse_notice_is_raised_once_until_a_valid_parse() {
    let (mut controller, _source) = started_at(24);
    controller.on_text_changed("-");
    controller.on_confirm();
    assert!(controller.notice().is_some());

    // A later success clears the notice; the repeated failure stays quiet until re-armed.
    controller.on_revert();
    assert!(controller.notice().is_none());
    controller.on_text_changed("-");
    controller.on_confirm();
    assert!(controller.notice().is_none());

    controller.on_text_changed("30");
    controller.on_confirm();
    controller.on_text_changed("-");
    controller.on_confirm();
    assert!(controller.notice().is_some());
}

#[test]
fn down_arrow_commits_immediately() {
    let (mut controller, source) = started_at(10);
    controller.handle(FrameEvent::Decrement);
    assert_eq!(controller.field_text(), "9");
    assert_eq!(source.current(), Frame(9));
    assert_eq!(source.set_calls(), vec![Frame(9)]);
}

#[test]
fn up_arrow_steps_from_typed_value() {
    let (mut controller, source) = started_at(10);
    type_text(&mut controller, "50");
    controller.on_increment();
    assert_eq!(controller.field_text(), "51");
    assert_eq!(source.current(), Frame(51));
}

#[test]
fn arrow_falls_back_to_committed_when_field_is_unparsable() {
    let (mut controller, source) = started_at(10);
    controller.on_text_changed("");
    controller.on_increment();
    assert_eq!(controller.field_text(), "11");
    assert_eq!(source.current(), Frame(11));
}

#[test]
fn scroll_stages_without_commit_then_enter_commits() {
    let (mut controller, source) = started_at(24);
    for _ in 0..3 {
        controller.handle(FrameEvent::Scroll(ScrollDirection::Up));
    }
    assert_eq!(controller.field_text(), "27");
    assert_eq!(controller.field_origin(), FieldOrigin::Scrolled);
    assert_eq!(source.current(), Frame(24));
    assert!(source.set_calls().is_empty());

    controller.handle(FrameEvent::Confirm);
    assert_eq!(source.current(), Frame(27));
    assert_eq!(controller.field_text(), "27");
}

#[test]
fn arrow_after_scroll_steps_from_committed_value() {
    let (mut controller, source) = started_at(24);
    controller.on_scroll_delta(ScrollDirection::Up);
    controller.on_scroll_delta(ScrollDirection::Up);
    assert_eq!(controller.field_text(), "26");

    controller.on_increment();
    assert_eq!(source.current(), Frame(25));
    assert_eq!(controller.field_text(), "25");

    controller.on_scroll_delta(ScrollDirection::Down);
    controller.on_scroll_delta(ScrollDirection::Down);
    controller.on_decrement();
    assert_eq!(source.current(), Frame(24));
    assert_eq!(source.set_calls(), vec![Frame(25), Frame(24)]);
}

#[test]
fn escape_discards_staged_edits() {
    let (mut controller, source) = started_at(24);
    controller.on_scroll_delta(ScrollDirection::Down);
    type_text(&mut controller, "-15");
    source.move_remote(40);

    controller.handle(FrameEvent::Revert);

    assert_eq!(controller.field_text(), "40");
    assert_eq!(controller.committed(), Some(Frame(40)));
    assert!(source.set_calls().is_empty());
}

#[test]
fn escape_retries_after_failed_startup() {
    let source = FakeSource::unreachable();
    let mut controller = controller_for(&source);
    assert!(controller.initialize().is_err());

    source.set_reachable(true);
    source.move_remote(12);
    controller.on_revert();

    assert_eq!(controller.field_text(), "12");
    assert!(controller.notice().is_none());
    assert_eq!(controller.range(), Some(FrameRange::new(Frame(1), Frame(300))));
}

#[test]
fn rejected_frame_keeps_field_and_reports_validation() {
    let (mut controller, source) = started_at(24);
    type_text(&mut controller, "900");
    controller.on_confirm();

    assert_eq!(controller.field_text(), "900");
    assert_eq!(controller.committed(), Some(Frame(24)));
    assert_eq!(source.current(), Frame(24));
    let notice = controller.notice().expect("notice");
    assert_eq!(notice.category(), UiErrorCategory::Validation);
    assert_eq!(notice.context(), UiErrorContext::Commit);
}

#[test]
fn failed_step_restores_pre_step_text() {
    let (mut controller, source) = started_at(300);
    controller.on_increment();
    assert_eq!(controller.field_text(), "300");
    assert_eq!(controller.committed(), Some(Frame(300)));
    assert_eq!(source.set_calls(), vec![Frame(301)]);
    assert_eq!(
        controller.notice().expect("notice").context(),
        UiErrorContext::Step
    );
}

#[test]
fn connection_loss_during_commit_is_reported_without_panicking() {
    let (mut controller, source) = started_at(24);
    type_text(&mut controller, "30");
    source.set_reachable(false);

    controller.on_confirm();
    assert_eq!(controller.field_text(), "30");
    assert_eq!(
        controller.notice().expect("notice").category(),
        UiErrorCategory::Transport
    );

    source.set_reachable(true);
    controller.on_confirm();
    assert_eq!(source.current(), Frame(30));
    assert!(controller.notice().is_none());
}

#[test]
fn revert_failure_keeps_staged_text() {
    let (mut controller, source) = started_at(24);
    controller.on_scroll_delta(ScrollDirection::Up);
    source.set_reachable(false);
    controller.on_revert();
    assert_eq!(controller.field_text(), "25");
    assert_eq!(
        controller.notice().expect("notice").context(),
        UiErrorContext::Revert
    );
}

#[test]
fn step_overflow_never_reaches_the_source() {
    let (mut controller, source) = started_at(24);
    assert!(controller.on_text_changed(&i64::MAX.to_string()));
    controller.on_increment();
    assert!(source.set_calls().is_empty());
    assert_eq!(controller.field_text(), i64::MAX.to_string());
}

#[test]
fn accepted_edits_clear_a_stale_notice() {
    let (mut controller, _source) = started_at(24);
    type_text(&mut controller, "900");
    controller.on_confirm();
    assert!(controller.notice().is_some());

    controller.on_scroll_delta(ScrollDirection::Down);
    assert!(controller.notice().is_none());
    assert_eq!(controller.field_origin(), FieldOrigin::Scrolled);

    type_text(&mut controller, "900");
    controller.on_confirm();
    assert!(controller.notice().is_some());
    assert!(!controller.on_text_changed("90x"));
    assert!(controller.notice().is_some());
    assert!(controller.on_text_changed("90"));
    assert!(controller.notice().is_none());
}
