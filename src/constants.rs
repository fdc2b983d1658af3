//! Shared application-wide constants.
//! Centralizes tweakable values used by the ragdoll core, the board editor and rendering.

// Board
/// Board width in world units.
pub const BOARD_WIDTH: f32 = 600.0;
/// Board height in world units.
pub const BOARD_HEIGHT: f32 = 900.0;
/// Default number of horizontal rows the board is divided into.
pub const DEFAULT_NUM_ROWS: u32 = 6;
/// Upper bound for the row count editor.
pub const MAX_NUM_ROWS: u32 = 40;
/// Radius of a circle anchor in world units.
pub const CIRCLE_RADIUS: f32 = 10.0;
/// Side length of a square anchor in world units.
pub const SQUARE_SIZE: f32 = 20.0;
/// File the play mode looks for at startup when no path is given.
pub const DEFAULT_BOARD_PATH: &str = "board_state.json";

// Torso
/// Fixed distance between the upper and lower body circles.
pub const BODY_DISTANCE: f32 = 80.0;
/// Radius of each body circle.
pub const BODY_RADIUS: f32 = 10.0;
/// Radius of the head drawn above the upper body.
pub const HEAD_RADIUS: f32 = 18.0;

// Limbs
/// Radius of a hand; also its pick-up radius.
pub const HAND_RADIUS: f32 = 13.0;
/// Maximum reach from a hand to the upper body.
pub const HAND_BODY_MAX_DISTANCE: f32 = 200.0;
/// Side length of a foot square.
pub const FEET_SIZE: f32 = 18.0;
/// Maximum reach from a foot to the lower body.
pub const FEET_BODY_MAX_DISTANCE: f32 = 200.0;
/// Distance under which a hand locks onto its anchor.
pub const ARM_SNAP_RADIUS: f32 = 15.0;
/// Distance under which a foot locks onto its anchor.
pub const LEG_SNAP_RADIUS: f32 = 15.0;
/// Offset of each limb from its body circle in the initial pose.
pub const LIMB_SPREAD: f32 = 50.0;

// Idle drift
/// Units per second a free limb falls toward its resting offset (5 per frame at 60 Hz).
pub const GRAVITY_RATE: f32 = 300.0;

// Canvas interactions
/// Scroll distance per wheel notch multiplier.
pub const SCROLL_SPEED: f32 = 1.0;
/// Extra room the view may scroll past either end of the board.
pub const SCROLL_MARGIN: f32 = 200.0;

// Undo/redo
/// Maximum number of undo history entries to retain.
pub const MAX_UNDO_HISTORY: usize = 100;
