use eframe::egui;

use crate::controller::{
    events::{FrameEvent, ScrollDirection},
    field::FieldOrigin,
    FrameEntryController,
};

const ENTRY_ID: &str = "frame_entry";

pub struct GotoFrameApp {
    controller: FrameEntryController,
    entry_rect: Option<egui::Rect>,
    entry_focused: bool,
    initial_focus_done: bool,
}

impl GotoFrameApp {
    pub fn new(controller: FrameEntryController) -> Self {
        Self {
            controller,
            entry_rect: None,
            entry_focused: false,
            initial_focus_done: false,
        }
    }

    fn show_entry_row(&mut self, ui: &mut egui::Ui) {
        let entry_id = egui::Id::new(ENTRY_ID);

        // egui drops focus on Escape before the frame runs, so last frame's focus counts too.
        let focused = self.entry_focused || ui.memory(|memory| memory.has_focus(entry_id));
        let events = collect_frame_events(ui, focused, self.entry_rect);
        if focused && !events.is_empty() {
            ui.memory_mut(|memory| memory.request_focus(entry_id));
        }
        for event in events {
            self.controller.handle(event);
        }

        ui.horizontal(|ui| {
            ui.label("Go to frame:");

            let previous_state = egui::TextEdit::load_state(ui.ctx(), entry_id);
            let mut draft = self.controller.field_text().to_owned();
            let mut output = egui::TextEdit::singleline(&mut draft)
                .id(entry_id)
                .desired_width(90.0)
                .show(ui);
            self.entry_rect = Some(output.response.rect);
            self.entry_focused = output.response.has_focus();

            if output.response.changed() {
                self.controller.handle(FrameEvent::TextChanged(draft.clone()));
                // A rejected keystroke keeps the old text, so the caret stays put as well.
                if self.controller.field_text() != draft {
                    if let Some(previous) = previous_state {
                        previous.store(ui.ctx(), entry_id);
                    }
                }
            }

            if !self.initial_focus_done {
                self.initial_focus_done = true;
                output.response.request_focus();
                let end = egui::text::CCursor::new(draft.chars().count());
                output
                    .state
                    .cursor
                    .set_char_range(Some(egui::text::CCursorRange::two(
                        egui::text::CCursor::new(0),
                        end,
                    )));
                output.state.store(ui.ctx(), output.response.id);
            }
        });
    }

    fn show(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_entry_row(ui);
            self.show_status(ui);
        });
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        if let Some(notice) = self.controller.notice() {
            ui.colored_label(
                ui.visuals().error_fg_color,
                format!("{}: {}", notice.label(), notice.message()),
            )
            .on_hover_text(format!("while handling {:?}", notice.context()));
            return;
        }

        if self.controller.field_origin() == FieldOrigin::Scrolled {
            ui.weak("Press Enter to go to this frame, Esc to discard");
            return;
        }

        match (self.controller.committed(), self.controller.range()) {
            (Some(frame), Some(range)) => {
                ui.weak(format!("At frame {frame}, project frames {range}"));
            }
            (Some(frame), None) => {
                ui.weak(format!("At frame {frame}"));
            }
            _ => {}
        }
    }
}

/// Pulls the entry's keyboard and wheel input out of this frame's events, in arrival order.
///
/// Arrow, Enter and Escape keys are removed so the text edit neither moves its cursor nor
/// gives up focus on them.
fn collect_frame_events(
    ui: &mut egui::Ui,
    focused: bool,
    entry_rect: Option<egui::Rect>,
) -> Vec<FrameEvent> {
    let hovered = entry_rect
        .zip(ui.ctx().pointer_hover_pos())
        .is_some_and(|(rect, pos)| rect.contains(pos));
    if !focused && !hovered {
        return Vec::new();
    }

    ui.input_mut(|input| {
        let mut collected = Vec::new();
        input.events.retain(|event| match event {
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } if focused && modifiers.is_none() => {
                let frame_event = match key {
                    egui::Key::ArrowUp => FrameEvent::Increment,
                    egui::Key::ArrowDown => FrameEvent::Decrement,
                    egui::Key::Enter => FrameEvent::Confirm,
                    egui::Key::Escape => FrameEvent::Revert,
                    _ => return true,
                };
                collected.push(frame_event);
                false
            }
            egui::Event::MouseWheel { delta, .. } if hovered => {
                if let Some(direction) = ScrollDirection::from_wheel_delta(delta.y) {
                    collected.push(FrameEvent::Scroll(direction));
                }
                false
            }
            _ => true,
        });
        collected
    })
}

impl eframe::App for GotoFrameApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
