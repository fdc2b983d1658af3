//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: board view scrolling, editor interactions, the context menu
//! and file operations.

use super::undo::UndoHistory;
use crate::board::{AnchorRef, BoardState};
use crate::config::{RagdollConfig, SnapPolicy};
use crate::simulation::Ragdoll;
use crate::types::*;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Which half of the application is active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Drag the ragdoll around the board
    #[default]
    Play,
    /// Move, add and delete anchors
    Editor,
}

/// State related to the board view.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Screen position of the board origin, recomputed every frame
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// How far the view is scrolled down the board, in world units
    pub scroll_y: f32,
    /// Height of the visible canvas area during the last frame
    #[serde(skip)]
    pub view_height: f32,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            scroll_y: 0.0,
            view_height: 0.0,
        }
    }
}

/// State related to user interactions with anchors and the view.
#[derive(Default)]
pub struct InteractionState {
    /// Anchor selected in the editor
    pub selected_anchor: Option<AnchorRef>,
    /// Anchor currently being dragged
    pub dragging_anchor: Option<AnchorRef>,
    /// Anchor position before the drag started (for undo)
    pub drag_original_position: Option<Point>,
    /// Offset from pointer to anchor centre during dragging
    pub anchor_drag_offset: Point,
    /// Whether the user is currently panning with the middle button
    pub is_panning: bool,
    /// Last pointer position during panning
    pub last_pan_pos: Option<egui::Pos2>,
}

/// State of the editor's right-click menu for adding anchors.
#[derive(Default)]
pub struct ContextMenuState {
    /// Whether the context menu is currently visible
    pub show: bool,
    /// Screen position where the menu appears
    pub screen_pos: egui::Pos2,
    /// World position where a new anchor is placed
    pub world_pos: Point,
    /// Flag to prevent the menu from closing immediately after opening
    pub just_opened: bool,
}

/// State related to file operations and persistence.
///
/// Manages the board path, unsaved changes tracking, and async file operations.
pub struct FileState {
    /// Current board file path for save/load operations
    pub current_path: Option<String>,
    /// Flag indicating the board has unsaved changes
    pub has_unsaved_changes: bool,
    /// Save requested this frame
    pub pending_save_operation: Option<PendingSaveOperation>,
    /// Load requested this frame
    pub pending_load_operation: Option<PendingLoadOperation>,
    /// Channel for receiving file operation results from async tasks
    pub file_operation_sender: Option<Sender<FileOperationResult>>,
    /// Receiving end drained at the start of every frame
    pub file_operation_receiver: Option<Receiver<FileOperationResult>>,
    /// Whether to show an unsaved-changes confirmation dialog
    pub show_unsaved_dialog: bool,
    /// The action the user attempted that requires confirmation
    pub pending_confirm_action: Option<PendingConfirmAction>,
    /// One-shot flag to allow the next close request to proceed after user confirmation
    pub allow_close_on_next_request: bool,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            has_unsaved_changes: false,
            pending_save_operation: None,
            pending_load_operation: None,
            file_operation_sender: Some(sender),
            file_operation_receiver: Some(receiver),
            show_unsaved_dialog: false,
            pending_confirm_action: None,
            allow_close_on_next_request: false,
        }
    }
}

/// Represents a pending save operation type.
#[derive(Debug)]
pub enum PendingSaveOperation {
    /// Save with a new file path (show file picker)
    SaveAs,
    /// Save to the existing file path
    Save,
}

/// Represents a pending load operation type.
#[derive(Debug)]
pub enum PendingLoadOperation {
    /// Load from a file (show file picker)
    Load,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save operation completed successfully with the given path
    SaveCompleted(String),
    /// Load operation completed successfully with path and content
    LoadCompleted(String, String),
    /// Export finished writing the given path
    ExportCompleted(String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// Pending confirmation actions that may require user approval due to unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// User is attempting to start a new board
    New,
    /// User is attempting to open a board file
    Open,
    /// User is attempting to quit the application
    Quit,
}

/// The main application structure: the board, the ragdoll playing on it and
/// the UI state around them.
///
/// Only preferences are persisted between sessions; the board itself lives in
/// its own JSON file.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct RagdollApp {
    /// Active mode
    pub mode: AppMode,
    /// Board being played on or edited
    #[serde(skip)]
    pub board: BoardState,
    /// Anchors the ragdoll sees; refreshed when play mode is entered
    #[serde(skip)]
    pub anchors: Vec<Anchor>,
    /// The puppet
    #[serde(skip)]
    pub ragdoll: Ragdoll,
    /// Ragdoll tuning, applied live from the side panel
    pub config: RagdollConfig,
    /// Board file opened last, reopened at startup when no path is given
    pub last_board_path: Option<String>,
    /// Board view state
    pub canvas: CanvasState,
    /// Editor interaction state
    #[serde(skip)]
    pub interaction: InteractionState,
    /// Context menu state
    #[serde(skip)]
    pub context_menu: ContextMenuState,
    /// File operations state
    #[serde(skip)]
    pub file: FileState,
    /// Undo/redo history for board edits
    #[serde(skip)]
    pub undo_history: UndoHistory,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
}

impl Default for RagdollApp {
    fn default() -> Self {
        let config = RagdollConfig::new().with_snap_policy(SnapPolicy::NearestMatchingAnchor);
        let board = BoardState::default();
        Self {
            mode: AppMode::Play,
            anchors: board.anchors(),
            board,
            ragdoll: Ragdoll::new(config.clone()),
            config,
            last_board_path: None,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            context_menu: ContextMenuState::default(),
            file: FileState::default(),
            undo_history: UndoHistory::new(),
            dark_mode: true,
        }
    }
}

impl RagdollApp {
    /// Serializes the persisted preferences to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes persisted preferences from JSON.
    ///
    /// The ragdoll is rebuilt from the restored configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut app: Self = serde_json::from_str(json)?;
        app.ragdoll = Ragdoll::new(app.config.clone());
        Ok(app)
    }

    /// Loads the board at `path`, falling back to the built-in layout.
    pub fn open_board_at(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let board = BoardState::load_or_default(path);
        self.replace_board(board, Some(path.display().to_string()));
    }

    /// Swaps in a new board, resetting everything that referred to the old one.
    pub fn replace_board(&mut self, board: BoardState, path: Option<String>) {
        self.board = board;
        self.board.num_rows = self.board.num_rows.clamp(1, crate::constants::MAX_NUM_ROWS);
        self.last_board_path = path.clone().or(self.last_board_path.take());
        self.file.current_path = path;
        self.file.has_unsaved_changes = false;
        self.undo_history.clear();
        self.interaction = InteractionState::default();
        self.context_menu.show = false;
        self.anchors = self.board.anchors();
        self.ragdoll.reset_pose();
    }

    /// Switches between play and editor mode.
    ///
    /// Entering play mode picks up the anchors as edited and frees limbs whose
    /// anchor is gone.
    pub fn set_mode(&mut self, mode: AppMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.interaction.dragging_anchor = None;
        self.interaction.drag_original_position = None;
        self.context_menu.show = false;
        self.ragdoll.release();
        if mode == AppMode::Play {
            self.anchors = self.board.anchors();
            self.ragdoll.drop_stale_snaps(&self.anchors);
        }
        log::info!("Switched to {:?} mode", mode);
    }

    /// Pushes edited configuration into the ragdoll.
    pub fn apply_config(&mut self) {
        self.ragdoll.apply_config(self.config.clone());
    }
}
