//! Painting the board and the ragdoll.
//!
//! Layers, back to front: board background and row lines, anchors, then the
//! ragdoll (strings, torso link, torso, hands, feet, head).

use super::state::{AppMode, RagdollApp};
use crate::constants;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Colours that change with the theme.
struct Palette {
    board: egui::Color32,
    row_line: egui::Color32,
    circle_anchor: egui::Color32,
    square_anchor: egui::Color32,
    body: egui::Color32,
    string: egui::Color32,
}

impl Palette {
    fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                board: egui::Color32::from_gray(32),
                row_line: egui::Color32::from_gray(70),
                circle_anchor: egui::Color32::from_rgb(90, 200, 120),
                square_anchor: egui::Color32::from_rgb(110, 150, 230),
                body: egui::Color32::from_gray(230),
                string: egui::Color32::from_gray(150),
            }
        } else {
            Self {
                board: egui::Color32::from_gray(245),
                row_line: egui::Color32::from_gray(200),
                circle_anchor: egui::Color32::from_rgb(40, 150, 70),
                square_anchor: egui::Color32::from_rgb(50, 90, 190),
                body: egui::Color32::from_gray(30),
                string: egui::Color32::from_gray(110),
            }
        }
    }
}

const SNAPPED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 190, 60);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);
const HAND_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 120, 90);
const FOOT_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 110, 220);

impl RagdollApp {
    /// Renders the board, its anchors and, in play mode, the ragdoll.
    pub fn render_board_elements(&self, painter: &egui::Painter) {
        let palette = Palette::new(self.dark_mode);
        self.draw_board_background(painter, &palette);
        self.draw_anchors(painter, &palette);
        if self.mode == AppMode::Play {
            self.draw_ragdoll(painter, &palette);
        }
    }

    fn draw_board_background(&self, painter: &egui::Painter, palette: &Palette) {
        let board_rect = egui::Rect::from_min_max(
            self.world_to_screen(Point::new(0.0, 0.0)),
            self.world_to_screen(Point::new(constants::BOARD_WIDTH, constants::BOARD_HEIGHT)),
        );
        painter.rect_filled(board_rect, 0.0, palette.board);

        let row_height = self.board.row_height(constants::BOARD_HEIGHT);
        let stroke = egui::Stroke::new(1.0, palette.row_line);
        for row in 1..self.board.num_rows {
            let y = row as f32 * row_height;
            painter.line_segment(
                [
                    self.world_to_screen(Point::new(0.0, y)),
                    self.world_to_screen(Point::new(constants::BOARD_WIDTH, y)),
                ],
                stroke,
            );
        }
        painter.rect_stroke(board_rect, 0.0, egui::Stroke::new(1.5, palette.row_line), StrokeKind::Inside);
    }

    fn draw_anchors(&self, painter: &egui::Painter, palette: &Palette) {
        let selected = match self.mode {
            AppMode::Editor => self
                .interaction
                .selected_anchor
                .and_then(|a| self.board.anchor_position(a)),
            AppMode::Play => None,
        };
        let selected_stroke = egui::Stroke::new(2.5, SELECTED_COLOR);

        for &center in &self.board.circles {
            let screen = self.world_to_screen(center);
            painter.circle_filled(screen, constants::CIRCLE_RADIUS, palette.circle_anchor);
            if selected == Some(center) {
                painter.circle_stroke(screen, constants::CIRCLE_RADIUS + 2.0, selected_stroke);
            }
        }
        for &center in &self.board.squares {
            let rect = egui::Rect::from_center_size(
                self.world_to_screen(center),
                egui::Vec2::splat(constants::SQUARE_SIZE),
            );
            painter.rect_filled(rect, 0.0, palette.square_anchor);
            if selected == Some(center) {
                painter.rect_stroke(rect.expand(2.0), 0.0, selected_stroke, StrokeKind::Outside);
            }
        }
    }

    fn draw_ragdoll(&self, painter: &egui::Painter, palette: &Palette) {
        let ragdoll = &self.ragdoll;
        let upper = self.world_to_screen(ragdoll.upper.position);
        let lower = self.world_to_screen(ragdoll.lower.position);

        // Strings from each limb to its body circle
        let string = egui::Stroke::new(2.0, palette.string);
        for limb in &ragdoll.limbs {
            let parent = self.world_to_screen(ragdoll.segment(limb.parent()).position);
            painter.line_segment([self.world_to_screen(limb.position), parent], string);
        }

        painter.line_segment([upper, lower], egui::Stroke::new(4.0, palette.body));
        painter.circle_filled(upper, ragdoll.upper.radius, palette.body);
        painter.circle_filled(lower, ragdoll.lower.radius, palette.body);

        for limb in &ragdoll.limbs {
            let center = self.world_to_screen(limb.position);
            let outline = if limb.is_snapped() {
                egui::Stroke::new(3.0, SNAPPED_COLOR)
            } else if limb.gravity_on {
                egui::Stroke::new(1.5, palette.string)
            } else {
                egui::Stroke::NONE
            };
            match limb.shape_kind() {
                ShapeKind::Circle => {
                    painter.circle_filled(center, ragdoll.config.hand_radius, HAND_COLOR);
                    painter.circle_stroke(center, ragdoll.config.hand_radius, outline);
                }
                ShapeKind::Square => {
                    let rect = egui::Rect::from_center_size(center, egui::Vec2::splat(constants::FEET_SIZE));
                    painter.rect_filled(rect, 0.0, FOOT_COLOR);
                    painter.rect_stroke(rect, 0.0, outline, StrokeKind::Outside);
                }
            }
        }

        let head = self.world_to_screen(ragdoll.head_position());
        painter.circle_stroke(head, constants::HEAD_RADIUS, egui::Stroke::new(3.0, palette.body));
    }
}
