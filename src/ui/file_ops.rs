//! File operations for saving and loading boards.
//!
//! Dialogs and disk writes run as tokio tasks; their results come back over the
//! channel in [`FileState`](super::state::FileState) and are applied at the start
//! of the next frame.

use super::state::{FileOperationResult, PendingLoadOperation, PendingSaveOperation, RagdollApp};
use crate::board::BoardState;
use crate::constants;
use eframe::egui;

impl RagdollApp {
    /// Applies finished file operations and starts newly requested ones.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        // First, process any completed file operations from the channel
        let mut results = Vec::new();
        if let Some(receiver) = &self.file.file_operation_receiver {
            while let Ok(result) = receiver.try_recv() {
                results.push(result);
            }
        }
        for result in results {
            self.apply_file_result(result);
        }

        if let Some(save_op) = self.file.pending_save_operation.take() {
            self.start_save(ctx, save_op);
        }

        if let Some(PendingLoadOperation::Load) = self.file.pending_load_operation.take() {
            let ctx = ctx.clone();
            let sender = self.file.file_operation_sender.clone();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                    .await
                {
                    let path = handle.path();
                    let result = match std::fs::read_to_string(path) {
                        Ok(json) => FileOperationResult::LoadCompleted(path.display().to_string(), json),
                        Err(e) => FileOperationResult::OperationFailed(format!("Failed to read file: {}", e)),
                    };
                    if let Some(tx) = sender {
                        let _ = tx.send(result);
                    }
                }
                ctx.request_repaint();
            });
        }
    }

    /// Applies the outcome of an async file operation.
    pub fn apply_file_result(&mut self, result: FileOperationResult) {
        match result {
            FileOperationResult::SaveCompleted(path) => {
                log::info!("Board saved to {}", path);
                self.last_board_path = Some(path.clone());
                self.file.current_path = Some(path);
                self.file.has_unsaved_changes = false;
            }
            FileOperationResult::LoadCompleted(path, content) => match BoardState::from_json(&content) {
                Ok(board) => {
                    log::info!("Board loaded from {}", path);
                    self.replace_board(board, Some(path));
                }
                Err(e) => {
                    log::error!("Failed to parse board {}: {}", path, e);
                }
            },
            FileOperationResult::ExportCompleted(path) => {
                log::info!("Board exported to {}", path);
            }
            FileOperationResult::OperationFailed(error) => {
                log::error!("File operation failed: {}", error);
            }
        }
    }

    /// Clamps every anchor into the board and returns the board to be written.
    pub fn prepare_board_for_save(&mut self) -> BoardState {
        self.board
            .clamp_to_bounds(constants::BOARD_WIDTH, constants::BOARD_HEIGHT);
        self.anchors = self.board.anchors();
        self.ragdoll.drop_stale_snaps(&self.anchors);
        self.board.clone()
    }

    fn start_save(&mut self, ctx: &egui::Context, save_op: PendingSaveOperation) {
        let board = self.prepare_board_for_save();
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();

        let path = match (save_op, self.file.current_path.clone()) {
            (PendingSaveOperation::Save, Some(path)) => path,
            _ => {
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .set_file_name(constants::DEFAULT_BOARD_PATH)
                        .save_file()
                        .await
                    {
                        let path = handle.path().display().to_string();
                        let result = write_board(path, &board);
                        if let Some(tx) = sender {
                            let _ = tx.send(result);
                        }
                    }
                    ctx.request_repaint();
                });
                return;
            }
        };

        tokio::spawn(async move {
            let result = write_board(path, &board);
            if let Some(tx) = sender {
                let _ = tx.send(result);
            }
            ctx.request_repaint();
        });
    }

    /// Opens a file dialog to save the board under a new name.
    pub fn save_as_board(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
    }

    /// Saves the board to the current file path, or triggers "Save As" if no path is set.
    pub fn save_board(&mut self) {
        if self.file.current_path.is_some() {
            self.file.pending_save_operation = Some(PendingSaveOperation::Save);
        } else {
            self.save_as_board();
        }
    }

    /// Opens a file dialog to load a board from disk.
    pub fn load_board(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::Load);
    }

    /// Starts an empty, untitled board.
    pub fn new_board(&mut self) {
        self.replace_board(BoardState::empty(), None);
        self.canvas.scroll_y = 0.0;
    }
}

fn write_board(path: String, board: &BoardState) -> FileOperationResult {
    match board.save(&path) {
        Ok(()) => FileOperationResult::SaveCompleted(path),
        Err(e) => FileOperationResult::OperationFailed(format!("Failed to save {}: {}", path, e)),
    }
}
