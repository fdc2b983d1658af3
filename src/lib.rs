//! # Ragdoll Climber
//!
//! A 2D climbing puppet on a vertical board. A ragdoll made of two torso
//! circles, two hands and two feet is dragged around with the mouse; hands lock
//! onto circle anchors and feet onto square anchors, and the body hangs off
//! whatever is locked.
//!
//! ## Features
//! - Soft reach constraints between limbs and torso, rigid torso link
//! - Snapping with remembered anchors and per-limb idle drift
//! - Board editor with undo/redo, JSON save/load and PNG/SVG export
//! - Scrollable board view

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
mod types;
mod solver;
mod config;
mod board;
mod simulation;
mod ui;

// Re-export public types and functions
pub use types::*;
pub use solver::*;
pub use config::{RagdollConfig, SnapPolicy};
pub use board::*;
pub use simulation::*;
use std::path::PathBuf;
use ui::RagdollApp;

/// Runs the ragdoll application.
///
/// The board is read from `board_path`, else from the board opened in the last
/// session, else from [`constants::DEFAULT_BOARD_PATH`]; a missing or malformed
/// file falls back to the built-in layout. Preferences saved by a previous
/// session are restored from eframe storage.
///
/// # Example
///
/// ```no_run
/// use ragdoll_climber::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app(None)
/// }
/// ```
pub fn run_app(board_path: Option<PathBuf>) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([900.0, 960.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Ragdoll Climber",
        options,
        Box::new(move |cc| {
            let mut app = cc
                .storage
                .and_then(|storage| storage.get_string("app_state"))
                .and_then(|json| match RagdollApp::from_json(&json) {
                    Ok(app) => Some(app),
                    Err(e) => {
                        log::warn!("Ignoring saved app state: {}", e);
                        None
                    }
                })
                .unwrap_or_default();
            let path = board_path
                .or_else(|| app.last_board_path.clone().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_BOARD_PATH));
            app.open_board_at(path);
            Ok(Box::new(app))
        }),
    )
}
