//! Core data types for the ragdoll and its board.
//!
//! This module defines the plain value types shared by the solver, the simulation
//! and the user interface: points, body segments, limbs, anchors and the per-frame
//! pointer input.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 2D coordinate in world units.
///
/// Serialized as a two-element array `[x, y]` so saved boards stay a flat list of
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate (grows downward, like screen space)
    pub y: f32,
}

impl Point {
    /// Creates a point from its coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f32 {
        crate::solver::distance(self, other)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, k: f32) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

/// Shape used for hit-testing limbs and anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Round shape: hands and circle anchors
    Circle,
    /// Axis-aligned square: feet and square anchors
    Square,
}

/// Identifies one of the two torso circles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentId {
    /// Upper torso; arms hang from it
    Upper,
    /// Lower torso; legs hang from it
    Lower,
}

/// Identifies one of the four limbs.
///
/// The declaration order is the pick-up evaluation order: arms before legs, left
/// before right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimbId {
    /// Left hand
    LeftArm,
    /// Right hand
    RightArm,
    /// Left foot
    LeftLeg,
    /// Right foot
    RightLeg,
}

impl LimbId {
    /// All limbs in evaluation order.
    pub const ALL: [LimbId; 4] = [
        LimbId::LeftArm,
        LimbId::RightArm,
        LimbId::LeftLeg,
        LimbId::RightLeg,
    ];

    /// Body segment the limb's distance constraint is relative to.
    pub fn parent(self) -> SegmentId {
        match self {
            LimbId::LeftArm | LimbId::RightArm => SegmentId::Upper,
            LimbId::LeftLeg | LimbId::RightLeg => SegmentId::Lower,
        }
    }

    /// Hit-test shape: circles for hands, squares for feet.
    pub fn shape_kind(self) -> ShapeKind {
        match self {
            LimbId::LeftArm | LimbId::RightArm => ShapeKind::Circle,
            LimbId::LeftLeg | LimbId::RightLeg => ShapeKind::Square,
        }
    }

    /// Index into [`LimbId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label for panels and logs.
    pub fn label(self) -> &'static str {
        match self {
            LimbId::LeftArm => "Left arm",
            LimbId::RightArm => "Right arm",
            LimbId::LeftLeg => "Left leg",
            LimbId::RightLeg => "Right leg",
        }
    }
}

/// Snap state of a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapState {
    /// Follows the pointer and the soft constraint
    #[default]
    Free,
    /// Locked exactly onto its anchor
    Snapped,
}

/// One torso circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySegment {
    /// Which torso circle this is
    pub id: SegmentId,
    /// Current centre
    pub position: Point,
    /// Drawing and pick-up radius
    pub radius: f32,
}

impl BodySegment {
    /// Creates a body segment at the given position.
    pub fn new(id: SegmentId, position: Point, radius: f32) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }

    /// Returns true if the pointer is inside the segment's circle.
    pub fn contains(&self, pointer: Point) -> bool {
        self.position.distance_to(pointer) < self.radius
    }
}

/// One hand or foot of the ragdoll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limb {
    /// Which limb this is; determines parent segment and shape
    pub id: LimbId,
    /// Current position
    pub position: Point,
    /// Reach of the soft constraint; the limb settles within half of it
    pub max_distance: f32,
    /// Lock-on distance for anchors
    pub snap_radius: f32,
    /// Pick-up radius (half-extent for square limbs)
    pub hit_radius: f32,
    /// Whether the limb is currently locked onto an anchor
    pub state: SnapState,
    /// Last anchor the limb locked onto, kept for re-snapping
    pub snapped_shape: Option<Point>,
    /// Whether idle drift toward the resting offset is active
    pub gravity_on: bool,
    /// Anchor the current drag pulled the limb off; it cannot re-snap there
    /// until the drag ends
    #[serde(skip)]
    pub(crate) released_from: Option<Point>,
}

impl Limb {
    /// Creates a free limb with no remembered anchor and gravity off.
    pub fn new(id: LimbId, position: Point, max_distance: f32, snap_radius: f32, hit_radius: f32) -> Self {
        Self {
            id,
            position,
            max_distance,
            snap_radius,
            hit_radius,
            state: SnapState::Free,
            snapped_shape: None,
            gravity_on: false,
            released_from: None,
        }
    }

    /// Body segment this limb hangs from.
    pub fn parent(&self) -> SegmentId {
        self.id.parent()
    }

    /// Hit-test shape of this limb.
    pub fn shape_kind(&self) -> ShapeKind {
        self.id.shape_kind()
    }

    /// Returns true while the limb is locked onto an anchor.
    pub fn is_snapped(&self) -> bool {
        self.state == SnapState::Snapped
    }

    /// Returns true if the pointer is over the limb.
    ///
    /// Hands use a circular test, feet an axis-aligned square of half-extent
    /// `hit_radius`.
    pub fn contains(&self, pointer: Point) -> bool {
        match self.shape_kind() {
            ShapeKind::Circle => self.position.distance_to(pointer) < self.hit_radius,
            ShapeKind::Square => {
                (self.position.x - pointer.x).abs() < self.hit_radius
                    && (self.position.y - pointer.y).abs() < self.hit_radius
            }
        }
    }
}

/// A fixed point on the board that limbs can lock onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Anchor centre
    pub position: Point,
    /// Circle anchors take hands, square anchors take feet
    pub kind: ShapeKind,
}

impl Anchor {
    /// Creates an anchor.
    pub fn new(position: Point, kind: ShapeKind) -> Self {
        Self { position, kind }
    }
}

/// What a held pointer is currently dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragTarget {
    /// A hand or foot
    Limb(LimbId),
    /// A torso circle
    Segment(SegmentId),
}

/// Pointer state sampled once per frame by the window layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerInput {
    /// Pointer position in world units, if the pointer is over the board
    pub position: Option<Point>,
    /// Primary button is held this frame
    pub primary_down: bool,
    /// Primary button went down this frame
    pub primary_pressed: bool,
    /// Secondary button went down this frame
    pub secondary_pressed: bool,
}

impl PointerInput {
    /// Input for a frame where the primary button is held at `pos`.
    pub fn held(pos: Point) -> Self {
        Self {
            position: Some(pos),
            primary_down: true,
            primary_pressed: false,
            secondary_pressed: false,
        }
    }

    /// Input for the frame the primary button goes down at `pos`.
    pub fn press(pos: Point) -> Self {
        Self {
            primary_pressed: true,
            ..Self::held(pos)
        }
    }

    /// Input for the frame the secondary button goes down at `pos`.
    pub fn secondary_click(pos: Point) -> Self {
        Self {
            position: Some(pos),
            secondary_pressed: true,
            ..Self::default()
        }
    }
}
