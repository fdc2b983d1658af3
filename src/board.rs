//! Board layout and its on-disk format.
//!
//! A board is a number of horizontal rows plus two flat lists of anchor positions,
//! one for circles and one for squares. It is stored as pretty-printed JSON:
//!
//! ```json
//! { "num_rows": 6, "circles": [[50.0, 100.0]], "squares": [[300.0, 150.0]] }
//! ```

use crate::constants;
use crate::types::{Anchor, Point, ShapeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Errors that can occur while reading or writing a board file.
#[derive(Debug)]
pub enum BoardError {
    /// The file could not be read or written.
    Io(std::io::Error),
    /// The file contents are not a valid board.
    Parse(serde_json::Error),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Io(e) => write!(f, "board file I/O failed: {}", e),
            BoardError::Parse(e) => write!(f, "board file is malformed: {}", e),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Io(e) => Some(e),
            BoardError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for BoardError {
    fn from(e: std::io::Error) -> Self {
        BoardError::Io(e)
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(e: serde_json::Error) -> Self {
        BoardError::Parse(e)
    }
}

/// Addresses one anchor inside a [`BoardState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorRef {
    /// Which list the anchor lives in
    pub kind: ShapeKind,
    /// Index within that list
    pub index: usize,
}

/// Persisted board: row count plus circle and square anchor positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    /// Number of horizontal rows the board is divided into
    pub num_rows: u32,
    /// Centres of circle anchors (hands)
    pub circles: Vec<Point>,
    /// Centres of square anchors (feet)
    pub squares: Vec<Point>,
}

impl Default for BoardState {
    /// The built-in layout: two diagonal runs of ten anchors each.
    fn default() -> Self {
        Self {
            num_rows: constants::DEFAULT_NUM_ROWS,
            circles: (0..10)
                .map(|i| Point::new(50.0 + i as f32 * 50.0, 100.0 + i as f32 * 50.0))
                .collect(),
            squares: (0..10)
                .map(|i| Point::new(300.0 + i as f32 * 50.0, 150.0 + i as f32 * 50.0))
                .collect(),
        }
    }
}

impl BoardState {
    /// Creates an empty board with the default row count.
    pub fn empty() -> Self {
        Self {
            num_rows: constants::DEFAULT_NUM_ROWS,
            circles: Vec::new(),
            squares: Vec::new(),
        }
    }

    /// Serialize the board to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a board file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Reads a board file, falling back to the default layout when it is missing
    /// or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(board) => {
                log::info!(
                    "Loaded board from {} ({} circles, {} squares)",
                    path.display(),
                    board.circles.len(),
                    board.squares.len()
                );
                board
            }
            Err(BoardError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No board at {}, using the default layout", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{} ({}); using the default layout", e, path.display());
                Self::default()
            }
        }
    }

    /// Writes the board as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BoardError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Height of one row for a board of the given height.
    pub fn row_height(&self, board_height: f32) -> f32 {
        board_height / self.num_rows.max(1) as f32
    }

    /// All anchors, circles first.
    pub fn anchors(&self) -> Vec<Anchor> {
        self.circles
            .iter()
            .map(|p| Anchor::new(*p, ShapeKind::Circle))
            .chain(self.squares.iter().map(|p| Anchor::new(*p, ShapeKind::Square)))
            .collect()
    }

    fn list(&self, kind: ShapeKind) -> &Vec<Point> {
        match kind {
            ShapeKind::Circle => &self.circles,
            ShapeKind::Square => &self.squares,
        }
    }

    fn list_mut(&mut self, kind: ShapeKind) -> &mut Vec<Point> {
        match kind {
            ShapeKind::Circle => &mut self.circles,
            ShapeKind::Square => &mut self.squares,
        }
    }

    /// Position of the referenced anchor, if it exists.
    pub fn anchor_position(&self, anchor: AnchorRef) -> Option<Point> {
        self.list(anchor.kind).get(anchor.index).copied()
    }

    /// Moves the referenced anchor. Returns false if it does not exist.
    pub fn set_anchor_position(&mut self, anchor: AnchorRef, position: Point) -> bool {
        match self.list_mut(anchor.kind).get_mut(anchor.index) {
            Some(p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    /// Appends an anchor and returns a reference to it.
    pub fn add_anchor(&mut self, kind: ShapeKind, position: Point) -> AnchorRef {
        let list = self.list_mut(kind);
        list.push(position);
        AnchorRef {
            kind,
            index: list.len() - 1,
        }
    }

    /// Inserts an anchor at a specific index (clamped to the list length).
    pub fn insert_anchor(&mut self, anchor: AnchorRef, position: Point) {
        let list = self.list_mut(anchor.kind);
        let index = anchor.index.min(list.len());
        list.insert(index, position);
    }

    /// Removes the referenced anchor, returning its position.
    pub fn remove_anchor(&mut self, anchor: AnchorRef) -> Option<Point> {
        let list = self.list_mut(anchor.kind);
        if anchor.index < list.len() {
            Some(list.remove(anchor.index))
        } else {
            None
        }
    }

    /// Finds the anchor under the pointer.
    ///
    /// Circles are tested by radius, squares by their box. Circles take
    /// priority; within a list the first match wins.
    pub fn find_anchor_at(&self, pointer: Point) -> Option<AnchorRef> {
        let half = constants::SQUARE_SIZE / 2.0;
        self.circles
            .iter()
            .position(|c| c.distance_to(pointer) < constants::CIRCLE_RADIUS)
            .map(|index| AnchorRef {
                kind: ShapeKind::Circle,
                index,
            })
            .or_else(|| {
                self.squares
                    .iter()
                    .position(|s| (s.x - pointer.x).abs() <= half && (s.y - pointer.y).abs() <= half)
                    .map(|index| AnchorRef {
                        kind: ShapeKind::Square,
                        index,
                    })
            })
    }

    /// Clamps every anchor into a `width` x `height` board.
    pub fn clamp_to_bounds(&mut self, width: f32, height: f32) {
        for p in self.circles.iter_mut().chain(self.squares.iter_mut()) {
            *p = clamp_point(*p, width, height);
        }
    }
}

/// Clamps a point into a `width` x `height` rectangle anchored at the origin.
pub fn clamp_point(p: Point, width: f32, height: f32) -> Point {
    Point::new(p.x.clamp(0.0, width), p.y.clamp(0.0, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ragdoll_climber_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_default_layout() {
        let board = BoardState::default();
        assert_eq!(board.num_rows, 6);
        assert_eq!(board.circles.len(), 10);
        assert_eq!(board.squares.len(), 10);
        assert_eq!(board.circles[0], Point::new(50.0, 100.0));
        assert_eq!(board.squares[9], Point::new(750.0, 600.0));
    }

    #[test]
    fn test_json_format() {
        let board = BoardState {
            num_rows: 3,
            circles: vec![Point::new(1.0, 2.0)],
            squares: vec![],
        };
        let value: serde_json::Value = serde_json::from_str(&board.to_json().unwrap()).unwrap();
        assert_eq!(value["num_rows"], 3);
        assert_eq!(value["circles"][0][0], 1.0);
        assert_eq!(value["circles"][0][1], 2.0);
        assert!(value["squares"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = temp_path("save_load");
        let mut board = BoardState::empty();
        board.add_anchor(ShapeKind::Square, Point::new(120.0, 340.0));
        board.num_rows = 9;
        board.save(&path).unwrap();

        let loaded = BoardState::load(&path).unwrap();
        assert_eq!(loaded, board);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let board = BoardState::load_or_default(temp_path("does_not_exist"));
        assert_eq!(board, BoardState::default());
    }

    #[test]
    fn test_malformed_file_falls_back_to_default() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ \"num_rows\": \"six\" }").unwrap();

        assert!(matches!(BoardState::load(&path), Err(BoardError::Parse(_))));
        assert_eq!(BoardState::load_or_default(&path), BoardState::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_anchors_lists_circles_then_squares() {
        let board = BoardState {
            num_rows: 1,
            circles: vec![Point::new(1.0, 1.0)],
            squares: vec![Point::new(2.0, 2.0), Point::new(3.0, 3.0)],
        };
        let anchors = board.anchors();
        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors[0].kind, ShapeKind::Circle);
        assert_eq!(anchors[2], Anchor::new(Point::new(3.0, 3.0), ShapeKind::Square));
    }

    #[test]
    fn test_find_anchor_at() {
        let board = BoardState {
            num_rows: 1,
            circles: vec![Point::new(100.0, 100.0)],
            squares: vec![Point::new(200.0, 200.0)],
        };
        assert_eq!(
            board.find_anchor_at(Point::new(105.0, 100.0)),
            Some(AnchorRef { kind: ShapeKind::Circle, index: 0 })
        );
        // Square hit test uses the box, so the corner counts
        assert_eq!(
            board.find_anchor_at(Point::new(209.0, 209.0)),
            Some(AnchorRef { kind: ShapeKind::Square, index: 0 })
        );
        assert_eq!(board.find_anchor_at(Point::new(150.0, 150.0)), None);
    }

    #[test]
    fn test_add_remove_insert() {
        let mut board = BoardState::empty();
        let a = board.add_anchor(ShapeKind::Circle, Point::new(1.0, 1.0));
        let b = board.add_anchor(ShapeKind::Circle, Point::new(2.0, 2.0));
        assert_eq!(b.index, 1);

        assert_eq!(board.remove_anchor(a), Some(Point::new(1.0, 1.0)));
        assert_eq!(board.circles, vec![Point::new(2.0, 2.0)]);

        board.insert_anchor(a, Point::new(1.0, 1.0));
        assert_eq!(board.circles, vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        assert_eq!(board.remove_anchor(AnchorRef { kind: ShapeKind::Square, index: 0 }), None);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let mut board = BoardState::default();
        board.clamp_to_bounds(600.0, 900.0);
        assert!(board
            .circles
            .iter()
            .chain(board.squares.iter())
            .all(|p| (0.0..=600.0).contains(&p.x) && (0.0..=900.0).contains(&p.y)));
        assert_eq!(board.squares[9], Point::new(600.0, 600.0));
    }

    #[test]
    fn test_row_height() {
        let mut board = BoardState::default();
        assert_eq!(board.row_height(900.0), 150.0);
        board.num_rows = 0;
        assert_eq!(board.row_height(900.0), 900.0);
    }
}
