//! Board view interaction: coordinate transforms, scrolling, driving the
//! ragdoll in play mode and anchor editing in editor mode.

use super::state::{AppMode, RagdollApp};
use crate::board::clamp_point;
use crate::constants;
use crate::types::*;
use crate::ui::UndoAction;
use eframe::egui;

impl From<egui::Pos2> for Point {
    fn from(p: egui::Pos2) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for egui::Pos2 {
    fn from(p: Point) -> Self {
        egui::pos2(p.x, p.y)
    }
}

impl RagdollApp {
    /// Converts screen coordinates to board coordinates.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> Point {
        (screen_pos - self.canvas.offset).into()
    }

    /// Converts board coordinates to screen coordinates.
    pub fn world_to_screen(&self, world_pos: Point) -> egui::Pos2 {
        egui::Pos2::from(world_pos) + self.canvas.offset
    }

    /// Centres the board horizontally in `canvas_rect` and applies the vertical scroll.
    pub fn update_view_offset(&mut self, canvas_rect: egui::Rect) {
        self.canvas.view_height = canvas_rect.height();
        self.clamp_scroll();
        self.canvas.offset = egui::vec2(
            canvas_rect.center().x - constants::BOARD_WIDTH / 2.0,
            canvas_rect.min.y - self.canvas.scroll_y,
        );
    }

    /// Keeps the scroll position within the board plus a margin at either end.
    pub fn clamp_scroll(&mut self) {
        let min = -constants::SCROLL_MARGIN;
        let max = (constants::BOARD_HEIGHT + constants::SCROLL_MARGIN - self.canvas.view_height).max(min);
        self.canvas.scroll_y = self.canvas.scroll_y.clamp(min, max);
    }

    /// Handles mouse-wheel scrolling and middle-button panning of the board view.
    pub fn handle_canvas_scrolling(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let (scroll_delta, hover) = ui.input(|i| (i.smooth_scroll_delta.y, i.pointer.hover_pos()));
        if scroll_delta != 0.0 && hover.is_some_and(|p| response.rect.contains(p)) {
            self.canvas.scroll_y -= scroll_delta * constants::SCROLL_SPEED;
            self.clamp_scroll();
        }

        let (middle_down, pos) = ui.input(|i| (i.pointer.middle_down(), i.pointer.latest_pos()));
        if middle_down {
            if let Some(current_pos) = pos {
                if !self.interaction.is_panning {
                    if response.rect.contains(current_pos) {
                        self.interaction.is_panning = true;
                        self.interaction.last_pan_pos = Some(current_pos);
                    }
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.scroll_y -= current_pos.y - last_pos.y;
                    self.clamp_scroll();
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Samples this frame's pointer state in board coordinates.
    ///
    /// Presses only count over the board view. While something is grabbed the
    /// position keeps tracking the pointer even outside the view.
    pub fn sample_pointer_input(&self, ui: &egui::Ui, response: &egui::Response) -> PointerInput {
        let (pos, primary_down, primary_pressed, secondary_pressed) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_down(),
                i.pointer.primary_pressed(),
                i.pointer.secondary_pressed(),
            )
        });
        let over_canvas = pos.is_some_and(|p| response.rect.contains(p));
        let tracking = over_canvas || (primary_down && self.ragdoll.grabbed().is_some());
        PointerInput {
            position: pos.filter(|_| tracking).map(|p| self.screen_to_world(p)),
            primary_down: primary_down && !self.interaction.is_panning,
            primary_pressed: primary_pressed && over_canvas,
            secondary_pressed: secondary_pressed && over_canvas,
        }
    }

    /// Advances the ragdoll by one frame from the pointer state.
    pub fn handle_play_input(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let input = self.sample_pointer_input(ui, response);
        let dt = ui.input(|i| i.stable_dt).min(0.1);
        self.ragdoll.tick(&input, &self.anchors, dt);
    }

    /// Handles anchor selection, dragging and the add-anchor menu in editor mode.
    pub fn handle_editor_input(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if self.context_menu.show || self.interaction.is_panning {
            return;
        }
        let (pos, primary_down, primary_pressed, secondary_pressed) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_down(),
                i.pointer.primary_pressed(),
                i.pointer.secondary_pressed(),
            )
        });
        let Some(screen_pos) = pos else {
            return;
        };
        let world_pos = self.screen_to_world(screen_pos);
        let over_canvas = response.rect.contains(screen_pos);

        if primary_pressed && over_canvas {
            self.start_anchor_drag(world_pos);
        } else if primary_down {
            if let Some(anchor) = self.interaction.dragging_anchor {
                let target = clamp_point(
                    world_pos + self.interaction.anchor_drag_offset,
                    constants::BOARD_WIDTH,
                    constants::BOARD_HEIGHT,
                );
                self.board.set_anchor_position(anchor, target);
            }
        } else {
            self.finish_anchor_drag();
        }

        if secondary_pressed && over_canvas {
            self.context_menu.screen_pos = screen_pos;
            self.context_menu.world_pos = clamp_point(world_pos, constants::BOARD_WIDTH, constants::BOARD_HEIGHT);
            self.context_menu.show = true;
            self.context_menu.just_opened = true;
        }
    }

    /// Selects the anchor under the pointer and starts dragging it; clears the
    /// selection on empty space.
    fn start_anchor_drag(&mut self, world_pos: Point) {
        match self.board.find_anchor_at(world_pos) {
            Some(anchor) => {
                let Some(original) = self.board.anchor_position(anchor) else {
                    return;
                };
                self.interaction.selected_anchor = Some(anchor);
                self.interaction.dragging_anchor = Some(anchor);
                self.interaction.drag_original_position = Some(original);
                self.interaction.anchor_drag_offset = original - world_pos;
            }
            None => {
                self.interaction.selected_anchor = None;
                self.interaction.dragging_anchor = None;
            }
        }
    }

    /// Ends an anchor drag, recording it for undo if the anchor moved.
    fn finish_anchor_drag(&mut self) {
        let Some(anchor) = self.interaction.dragging_anchor.take() else {
            return;
        };
        let Some(old_position) = self.interaction.drag_original_position.take() else {
            return;
        };
        let Some(new_position) = self.board.anchor_position(anchor) else {
            return;
        };
        if new_position != old_position {
            self.undo_history.push_action(UndoAction::AnchorMoved {
                anchor,
                old_position,
                new_position,
            });
            self.file.has_unsaved_changes = true;
        }
    }

    /// Routes this frame's pointer input to the active mode.
    pub fn handle_canvas_input(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        match self.mode {
            AppMode::Play => self.handle_play_input(ui, response),
            AppMode::Editor => self.handle_editor_input(ui, response),
        }
    }
}
