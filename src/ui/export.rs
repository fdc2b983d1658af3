//! Export utilities: render the board to SVG and PNG.

use super::state::{FileOperationResult, RagdollApp};
use crate::board::BoardState;
use crate::constants;
use std::fmt::Write as _;

const BACKGROUND: &str = "#f5f5f5";
const ROW_LINE: &str = "#c8c8c8";
const CIRCLE_FILL: &str = "#289646";
const SQUARE_FILL: &str = "#325abe";

/// Builds an SVG image of the board at one pixel per world unit.
pub fn board_to_svg(board: &BoardState) -> String {
    let width = constants::BOARD_WIDTH;
    let height = constants::BOARD_HEIGHT;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );
    let _ = writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
        width, height, BACKGROUND
    );

    let row_height = board.row_height(height);
    let _ = writeln!(out, "<g stroke=\"{}\" stroke-width=\"1\">", ROW_LINE);
    for row in 1..board.num_rows {
        let y = row as f32 * row_height;
        let _ = writeln!(out, "  <line x1=\"0\" y1=\"{y:.1}\" x2=\"{w}\" y2=\"{y:.1}\" />", y = y, w = width);
    }
    let _ = writeln!(out, "</g>");

    for c in &board.circles {
        let _ = writeln!(
            out,
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" fill=\"{}\" />",
            c.x,
            c.y,
            constants::CIRCLE_RADIUS,
            CIRCLE_FILL
        );
    }
    let half = constants::SQUARE_SIZE / 2.0;
    for s in &board.squares {
        let _ = writeln!(
            out,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
            s.x - half,
            s.y - half,
            constants::SQUARE_SIZE,
            constants::SQUARE_SIZE,
            SQUARE_FILL
        );
    }

    let _ = writeln!(out, "</svg>");
    out
}

/// Rasterizes the board SVG at `scale` pixels per world unit.
pub fn board_to_pixmap(board: &BoardState, scale: f32) -> Result<tiny_skia::Pixmap, String> {
    let svg = board_to_svg(board);
    let tree = usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default())
        .map_err(|e| format!("Failed to parse SVG for PNG export: {}", e))?;

    let scale = scale.clamp(0.25, 8.0);
    let out_w = (constants::BOARD_WIDTH * scale).round().max(1.0) as u32;
    let out_h = (constants::BOARD_HEIGHT * scale).round().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| format!("Failed to create pixmap {}x{}", out_w, out_h))?;

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

impl RagdollApp {
    /// Asks for a destination and writes the board as SVG.
    pub fn export_svg(&self) {
        let svg = board_to_svg(&self.board);
        let sender = self.file.file_operation_sender.clone();
        tokio::spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("SVG", &["svg"])
                .set_file_name("board.svg")
                .save_file()
                .await
            {
                let path = handle.path();
                let result = match std::fs::write(path, svg.as_bytes()) {
                    Ok(()) => FileOperationResult::ExportCompleted(path.display().to_string()),
                    Err(e) => FileOperationResult::OperationFailed(format!("Failed to save SVG: {}", e)),
                };
                if let Some(tx) = sender {
                    let _ = tx.send(result);
                }
            }
        });
    }

    /// Renders the board to PNG and asks for a destination.
    pub fn export_png(&self) {
        let pixmap = match board_to_pixmap(&self.board, 1.0) {
            Ok(p) => p,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };
        let sender = self.file.file_operation_sender.clone();
        tokio::spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("PNG", &["png"])
                .set_file_name("board.png")
                .save_file()
                .await
            {
                let path = handle.path();
                let result = match pixmap.save_png(path) {
                    Ok(()) => FileOperationResult::ExportCompleted(path.display().to_string()),
                    Err(e) => FileOperationResult::OperationFailed(format!("Failed to save PNG: {}", e)),
                };
                if let Some(tx) = sender {
                    let _ = tx.send(result);
                }
            }
        });
    }
}
