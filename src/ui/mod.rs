//! User interface for the ragdoll climber.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main RagdollApp
//! - `file_ops` - Board save/load through native dialogs
//! - `export` - SVG and PNG export of the board
//! - `canvas` - Coordinate transforms, scrolling and pointer handling
//! - `rendering` - Drawing the board and the ragdoll
//! - `undo` - Undo/redo of board edits

mod canvas;
mod export;
mod file_ops;
mod rendering;
mod state;
mod undo;

pub use state::RagdollApp;
pub use undo::{UndoAction, UndoableBoard};

use self::state::{AppMode, PendingConfirmAction};
use crate::config::{RagdollConfig, SnapPolicy};
use crate::constants;
use crate::types::*;
use eframe::egui;

impl eframe::App for RagdollApp {
    /// Persist preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                log::error!("Failed to serialize app state: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_undo_redo_keys(ctx);
        self.handle_delete_key(ctx);
        self.handle_file_shortcuts(ctx);

        // Intercept native window close requests (titlebar X)
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.file.has_unsaved_changes && !self.file.allow_close_on_next_request {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                if !self.file.show_unsaved_dialog {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::Quit);
                }
            } else {
                self.file.allow_close_on_next_request = false;
            }
        }

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::SidePanel::right("side_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                self.draw_side_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        if self.file.show_unsaved_dialog {
            self.draw_unsaved_dialog(ctx);
        }

        // The ragdoll drifts under gravity even when the pointer is still
        if self.mode == AppMode::Play {
            ctx.request_repaint();
        }
    }
}

impl RagdollApp {
    /// Asks for confirmation before `action` when the board has unsaved edits.
    fn confirm_or_run(&mut self, ctx: &egui::Context, action: PendingConfirmAction) {
        if self.file.has_unsaved_changes {
            self.file.show_unsaved_dialog = true;
            self.file.pending_confirm_action = Some(action);
        } else {
            self.run_confirmed(ctx, action);
        }
    }

    fn run_confirmed(&mut self, ctx: &egui::Context, action: PendingConfirmAction) {
        match action {
            PendingConfirmAction::New => self.new_board(),
            PendingConfirmAction::Open => self.load_board(),
            PendingConfirmAction::Quit => {
                // Allow one close request to pass without interception
                self.file.allow_close_on_next_request = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn draw_unsaved_dialog(&mut self, ctx: &egui::Context) {
        let (title, confirm_label) = match self.file.pending_confirm_action {
            Some(PendingConfirmAction::Quit) => ("Unsaved changes: quit?", "Discard and Quit"),
            Some(PendingConfirmAction::New) => ("Unsaved changes: new board?", "Discard and Create New"),
            Some(PendingConfirmAction::Open) => ("Unsaved changes: open board?", "Discard and Open"),
            None => ("Unsaved changes", "Discard"),
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("The board has unsaved changes. Are you sure you want to continue?");
                ui.horizontal(|ui| {
                    if ui.button(confirm_label).clicked() {
                        if let Some(action) = self.file.pending_confirm_action {
                            self.run_confirmed(ctx, action);
                        }
                        self.file.show_unsaved_dialog = false;
                        self.file.pending_confirm_action = None;
                    }
                    if ui.button("Cancel").clicked() {
                        self.file.show_unsaved_dialog = false;
                        self.file.pending_confirm_action = None;
                    }
                });
            });
    }

    /// Handles file-related keyboard shortcuts: New, Open, Save, Save As and Quit.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (cmd, shift, s, o, n, q) = ctx.input(|i| {
            (
                i.modifiers.command,
                i.modifiers.shift,
                i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::O),
                i.key_pressed(egui::Key::N),
                i.key_pressed(egui::Key::Q),
            )
        });
        if !cmd {
            return;
        }
        if s && shift {
            self.save_as_board();
        } else if s {
            self.save_board();
        }
        if o {
            self.confirm_or_run(ctx, PendingConfirmAction::Open);
        }
        if n {
            self.confirm_or_run(ctx, PendingConfirmAction::New);
        }
        if q {
            self.confirm_or_run(ctx, PendingConfirmAction::Quit);
        }
    }

    /// Handles undo/redo keyboard shortcuts in editor mode.
    pub fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.mode != AppMode::Editor {
            return;
        }
        // Ctrl+Z for undo
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift) {
            self.perform_undo();
        }
        // Ctrl+Shift+Z or Ctrl+Y for redo
        else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Deletes the selected anchor when Delete is pressed in editor mode.
    pub fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.mode != AppMode::Editor {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.delete_selected_anchor();
        }
    }

    /// Removes the selected anchor, recording it for undo.
    pub fn delete_selected_anchor(&mut self) {
        let Some(anchor) = self.interaction.selected_anchor.take() else {
            return;
        };
        self.interaction.dragging_anchor = None;
        if let Some(position) = self.board.remove_anchor(anchor) {
            self.undo_history
                .push_action(UndoAction::AnchorDeleted { anchor, position });
            self.file.has_unsaved_changes = true;
        }
    }

    /// Adds an anchor of `kind` where the context menu was opened.
    pub fn add_anchor_at_menu_pos(&mut self, kind: ShapeKind) {
        let position = self.context_menu.world_pos;
        let anchor = self.board.add_anchor(kind, position);
        self.undo_history
            .push_action(UndoAction::AnchorAdded { anchor, position });
        self.interaction.selected_anchor = Some(anchor);
        self.file.has_unsaved_changes = true;
    }

    /// Changes the row count, recording it for undo.
    pub fn set_num_rows(&mut self, rows: u32) {
        let rows = rows.clamp(1, constants::MAX_NUM_ROWS);
        let old_rows = self.board.num_rows;
        if rows == old_rows {
            return;
        }
        self.board.num_rows = rows;
        self.undo_history.push_action(UndoAction::RowsChanged {
            old_rows,
            new_rows: rows,
        });
        self.file.has_unsaved_changes = true;
    }

    /// Renders the toolbar with mode switch, file operations and view options.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut mode = self.mode;
            ui.selectable_value(&mut mode, AppMode::Play, "Play");
            ui.selectable_value(&mut mode, AppMode::Editor, "Board Editor");
            if mode != self.mode {
                self.set_mode(mode);
            }

            ui.separator();

            if ui.button("New").clicked() {
                self.confirm_or_run(ui.ctx(), PendingConfirmAction::New);
            }
            if ui.button("Open").clicked() {
                self.confirm_or_run(ui.ctx(), PendingConfirmAction::Open);
            }
            if ui.button("Save").clicked() {
                self.save_board();
            }
            if ui.button("Save As").clicked() {
                self.save_as_board();
            }

            ui.separator();

            match self.mode {
                AppMode::Play => {
                    if ui.button("Reset pose").clicked() {
                        self.ragdoll.reset_pose();
                    }
                }
                AppMode::Editor => {
                    ui.add_enabled_ui(self.undo_history.can_undo(), |ui| {
                        if ui.button("⟲ Undo").clicked() {
                            self.perform_undo();
                        }
                    });
                    ui.add_enabled_ui(self.undo_history.can_redo(), |ui| {
                        if ui.button("⟳ Redo").clicked() {
                            self.perform_redo();
                        }
                    });
                    ui.separator();
                    if ui.button("Export PNG").clicked() {
                        self.export_png();
                    }
                    if ui.button("Export SVG").clicked() {
                        self.export_svg();
                    }
                }
            }

            ui.separator();
            ui.checkbox(&mut self.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let name = self.file.current_path.as_deref().unwrap_or("Untitled");
                let status = if self.file.has_unsaved_changes { "*" } else { "" };
                ui.label(format!("{}{}", name, status));
            });
        });
    }

    /// Renders the side panel for the active mode.
    fn draw_side_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| match self.mode {
            AppMode::Play => self.draw_play_panel(ui),
            AppMode::Editor => self.draw_editor_panel(ui),
        });
    }

    fn draw_play_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Ragdoll");
        ui.label("Drag hands, feet or torso. Right-click a limb to toggle gravity.");
        ui.separator();

        ui.label("Gravity");
        for id in LimbId::ALL {
            let mut on = self.ragdoll.limb(id).gravity_on;
            if ui.checkbox(&mut on, id.label()).changed() {
                self.ragdoll.toggle_gravity(id);
            }
        }
        ui.separator();

        ui.label("Snapped");
        for limb in &self.ragdoll.limbs {
            let state = if limb.is_snapped() { "on anchor" } else { "free" };
            ui.label(format!("{}: {}", limb.id.label(), state));
        }
        ui.separator();

        ui.collapsing("Tuning", |ui| {
            let mut changed = false;
            let c = &mut self.config;
            changed |= ui
                .add(egui::Slider::new(&mut c.body_distance, 20.0..=200.0).text("Torso length"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut c.arm_max_distance, 40.0..=400.0).text("Arm reach"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut c.leg_max_distance, 40.0..=400.0).text("Leg reach"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut c.arm_snap_radius, 0.0..=50.0).text("Hand snap"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut c.leg_snap_radius, 0.0..=50.0).text("Foot snap"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut c.gravity_rate, 0.0..=1200.0).text("Gravity"))
                .changed();
            let mut nearest = c.snap_policy == SnapPolicy::NearestMatchingAnchor;
            if ui.checkbox(&mut nearest, "Snap to any nearby anchor").changed() {
                c.snap_policy = if nearest {
                    SnapPolicy::NearestMatchingAnchor
                } else {
                    SnapPolicy::RememberedOnly
                };
                changed = true;
            }
            if ui.button("Defaults").clicked() {
                *c = RagdollConfig::new()
                    .with_snap_policy(SnapPolicy::NearestMatchingAnchor);
                changed = true;
            }
            if changed {
                self.apply_config();
            }
        });
    }

    fn draw_editor_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Board");
        ui.label("Drag anchors to move them. Right-click to add, Delete to remove.");
        ui.separator();

        let mut rows = self.board.num_rows;
        ui.horizontal(|ui| {
            ui.label("Rows");
            ui.add(egui::DragValue::new(&mut rows).range(1..=constants::MAX_NUM_ROWS));
        });
        self.set_num_rows(rows);

        ui.label(format!("Circles: {}", self.board.circles.len()));
        ui.label(format!("Squares: {}", self.board.squares.len()));
        ui.separator();

        let selected = self
            .interaction
            .selected_anchor
            .and_then(|a| self.board.anchor_position(a).map(|p| (a, p)));
        match selected {
            Some((anchor, position)) => {
                let kind = match anchor.kind {
                    ShapeKind::Circle => "Circle",
                    ShapeKind::Square => "Square",
                };
                ui.label(format!("{} #{}", kind, anchor.index));
                ui.label(format!("Position: ({:.0}, {:.0})", position.x, position.y));
                if ui.button("Delete").clicked() {
                    self.delete_selected_anchor();
                }
            }
            None => {
                ui.label("No anchor selected");
            }
        }
    }

    /// Renders the right-click menu for adding anchors.
    fn draw_context_menu(&mut self, ui: &mut egui::Ui) {
        let area_response = egui::Area::new(egui::Id::new("context_menu"))
            .fixed_pos(self.context_menu.screen_pos)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label("Add anchor:");
                        ui.separator();
                        if ui.button("Circle (hands)").clicked() {
                            self.add_anchor_at_menu_pos(ShapeKind::Circle);
                            self.context_menu.show = false;
                        }
                        if ui.button("Square (feet)").clicked() {
                            self.add_anchor_at_menu_pos(ShapeKind::Square);
                            self.context_menu.show = false;
                        }
                        ui.separator();
                        if ui.button("Cancel").clicked() {
                            self.context_menu.show = false;
                        }
                    });
                })
            });

        // Handle click-outside-to-close after the first frame
        if !self.context_menu.just_opened && ui.input(|i| i.pointer.primary_clicked()) {
            if let Some(click_pos) = ui.input(|i| i.pointer.interact_pos()) {
                if !area_response.response.rect.contains(click_pos) {
                    self.context_menu.show = false;
                }
            }
        }

        self.context_menu.just_opened = false;
    }

    /// Renders the board view and handles its pointer input.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        self.update_view_offset(response.rect);
        self.handle_canvas_scrolling(ui, &response);
        self.update_view_offset(response.rect);

        if !self.file.show_unsaved_dialog {
            self.handle_canvas_input(ui, &response);
        }

        self.render_board_elements(&painter.with_clip_rect(response.rect));

        if self.context_menu.show && self.mode == AppMode::Editor {
            self.draw_context_menu(ui);
        }
    }

    /// Performs an undo operation.
    pub fn perform_undo(&mut self) {
        if let Some(action) = self.undo_history.pop_undo() {
            if let Some(redo_action) = self.board.apply_undo(&action) {
                self.undo_history.push_redo(redo_action);
                self.file.has_unsaved_changes = true;
                self.interaction.selected_anchor = None;
            }
        }
    }

    /// Performs a redo operation.
    pub fn perform_redo(&mut self) {
        if let Some(action) = self.undo_history.pop_redo() {
            if let Some(undo_action) = self.board.apply_redo(&action) {
                // push_action would clear the redo stack
                self.undo_history.push_undo(undo_action);
                self.file.has_unsaved_changes = true;
                self.interaction.selected_anchor = None;
            }
        }
    }
}

#[cfg(test)]
mod tests;
