//! Ragdoll simulation: snapping, idle drift, pick-up and the per-frame tick.
//!
//! The window layer samples the pointer once per frame and calls
//! [`Ragdoll::tick`]. A tick runs these phases in order:
//! 1. Resolve presses: pick up a limb or body segment, toggle gravity, release
//! 2. Move the dragged limb (pulling its body segment) or the dragged segment
//! 3. Drift, constrain and tolerance-check every limb against its segment
//! 4. Restore the fixed distance between the two torso circles

use crate::config::{RagdollConfig, SnapPolicy};
use crate::constants;
use crate::solver::{maintain_fixed_distance, pull_child_toward_parent, pull_parent_toward_child};
use crate::types::*;

/// Per-frame inputs shared by every limb update.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Anchors on the current board
    pub anchors: &'a [Anchor],
    /// Distance a drifting limb may move this frame
    pub gravity_step: f32,
    /// How a moved limb looks for an anchor
    pub snap_policy: SnapPolicy,
}

impl<'a> StepContext<'a> {
    /// Builds the context for a frame of length `dt` seconds.
    pub fn new(anchors: &'a [Anchor], config: &RagdollConfig, dt: f32) -> Self {
        Self {
            anchors,
            gravity_step: config.gravity_rate * dt.max(0.0),
            snap_policy: config.snap_policy,
        }
    }
}

/// Outcome of evaluating limbs under a pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimbPick {
    /// This limb is picked up
    Picked(LimbId),
    /// A limb was hit but overlaps one evaluated before it; nothing is picked up
    Suppressed,
    /// No limb under the pointer
    Miss,
}

/// Decides which limb, if any, a press at `pointer` picks up.
///
/// Limbs are evaluated in slice order. A limb qualifies when the pointer hits it
/// and is not within the sum of both hit radii of any limb evaluated earlier. The
/// first qualifying limb wins.
pub fn resolve_limb_pick(limbs: &[Limb], pointer: Point) -> LimbPick {
    let mut suppressed = false;
    for (i, limb) in limbs.iter().enumerate() {
        if !limb.contains(pointer) {
            continue;
        }
        let overlaps = limbs[..i]
            .iter()
            .any(|other| other.position.distance_to(pointer) < limb.hit_radius + other.hit_radius);
        if overlaps {
            suppressed = true;
            continue;
        }
        return LimbPick::Picked(limb.id);
    }
    if suppressed {
        LimbPick::Suppressed
    } else {
        LimbPick::Miss
    }
}

impl Limb {
    /// Anchor the limb would lock onto at its current position.
    fn snap_target(&self, anchors: &[Anchor], policy: SnapPolicy) -> Option<Point> {
        let allowed = |p: &Point| Some(*p) != self.released_from;
        if policy == SnapPolicy::NearestMatchingAnchor {
            let kind = self.shape_kind();
            let nearest = anchors
                .iter()
                .filter(|a| a.kind == kind && allowed(&a.position))
                .map(|a| (a.position, a.position.distance_to(self.position)))
                .filter(|(_, d)| *d <= self.snap_radius)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(p, _)| p);
            if nearest.is_some() {
                return nearest;
            }
        }
        self.snapped_shape
            .filter(|shape| allowed(shape) && shape.distance_to(self.position) <= self.snap_radius)
    }

    /// Remembers `anchor` as the limb's snap target without moving it.
    pub fn remember_anchor(&mut self, anchor: Point) {
        self.snapped_shape = Some(anchor);
    }

    /// Locks the limb onto its snap target if it is within reach.
    ///
    /// Returns true when the limb is snapped afterwards.
    pub fn check_snapping(&mut self, anchors: &[Anchor], policy: SnapPolicy) -> bool {
        let Some(anchor) = self.snap_target(anchors, policy) else {
            return false;
        };
        if self.state == SnapState::Free {
            log::debug!("{} snapped to ({:.1}, {:.1})", self.id.label(), anchor.x, anchor.y);
        }
        self.position = anchor;
        self.state = SnapState::Snapped;
        self.snapped_shape = Some(anchor);
        true
    }

    /// Moves the limb to `new_pos`, pulls `parent` after it and checks snapping.
    ///
    /// Returns the new parent position.
    pub fn move_to(&mut self, new_pos: Point, parent: Point, anchors: &[Anchor], policy: SnapPolicy) -> Point {
        self.position = new_pos;
        let parent = pull_parent_toward_child(self.position, parent, self.max_distance);
        self.check_snapping(anchors, policy);
        parent
    }

    /// Starts a drag at `pointer`. Called once, on the press that grabs the limb.
    ///
    /// A snapped limb is freed unconditionally, however little the pointer moved,
    /// and cannot lock back onto the anchor it left until [`Limb::end_drag`]. The
    /// remembered anchor survives only while the pointer is still within snap
    /// radius of it.
    pub fn begin_drag(&mut self, pointer: Point) {
        self.position = pointer;
        self.released_from = None;
        if self.state != SnapState::Snapped {
            return;
        }
        self.state = SnapState::Free;
        self.released_from = self.snapped_shape;
        if self
            .snapped_shape
            .is_some_and(|shape| shape.distance_to(pointer) > self.snap_radius)
        {
            self.snapped_shape = None;
        }
        log::debug!("{} released by drag", self.id.label());
    }

    /// Ends the current drag; the anchor it left is snappable again.
    pub fn end_drag(&mut self) {
        self.released_from = None;
    }

    /// Frees a snapped limb that ended up beyond snap radius of its anchor.
    pub fn check_unsnap(&mut self) {
        if self.state != SnapState::Snapped {
            return;
        }
        let Some(shape) = self.snapped_shape else {
            self.state = SnapState::Free;
            return;
        };
        if shape.distance_to(self.position) > self.snap_radius {
            self.state = SnapState::Free;
            self.snapped_shape = None;
            log::debug!("{} pulled off its anchor", self.id.label());
        }
    }

    /// Applies the soft reach constraint toward `parent`. Snapped limbs stay put.
    pub fn constrain(&mut self, parent: Point) {
        if self.state == SnapState::Free {
            self.position = pull_child_toward_parent(self.position, parent, self.max_distance);
        }
    }

    /// Resting height the limb drifts toward when gravity is on.
    pub fn rest_y(&self, parent: Point) -> f32 {
        parent.y + self.max_distance / 2.0
    }

    /// Moves a free limb with gravity on up to `step` units toward its resting
    /// height, never past it.
    pub fn apply_gravity(&mut self, parent: Point, step: f32) {
        if !self.gravity_on || self.state == SnapState::Snapped {
            return;
        }
        let dy = self.rest_y(parent) - self.position.y;
        self.position.y += dy.clamp(-step, step);
    }

    /// Advances the limb by one frame and returns the (possibly pulled) parent
    /// position.
    ///
    /// A dragged limb follows `pointer` and pulls its parent; an undragged one
    /// drifts under gravity. Either way the reach constraint and snap tolerance are
    /// applied afterwards. The press that starts a drag goes through
    /// [`Limb::begin_drag`] first.
    pub fn update(&mut self, pointer: Option<Point>, dragging: bool, parent: Point, ctx: &StepContext) -> Point {
        let parent = match pointer.filter(|_| dragging) {
            Some(p) => self.move_to(p, parent, ctx.anchors, ctx.snap_policy),
            None => {
                self.apply_gravity(parent, ctx.gravity_step);
                parent
            }
        };
        self.constrain(parent);
        self.check_unsnap();
        parent
    }
}

/// The whole puppet: two torso circles, four limbs and the current grab.
#[derive(Debug, Clone)]
pub struct Ragdoll {
    /// Parameters the ragdoll was built with
    pub config: RagdollConfig,
    /// Upper torso circle
    pub upper: BodySegment,
    /// Lower torso circle
    pub lower: BodySegment,
    /// Limbs in [`LimbId::ALL`] order
    pub limbs: [Limb; 4],
    /// Where the torso was centred when the ragdoll was created
    home: Point,
    /// What the held pointer is dragging, if anything
    grab: Option<DragTarget>,
}

impl Default for Ragdoll {
    fn default() -> Self {
        Self::new(RagdollConfig::default())
    }
}

impl Ragdoll {
    /// Creates a ragdoll standing in the middle of the board.
    pub fn new(config: RagdollConfig) -> Self {
        Self::with_center(
            config,
            Point::new(constants::BOARD_WIDTH / 2.0, constants::BOARD_HEIGHT / 2.0),
        )
    }

    /// Creates a ragdoll whose torso is centred on `center`.
    pub fn with_center(config: RagdollConfig, center: Point) -> Self {
        let limbs = LimbId::ALL.map(|id| {
            let (max_distance, snap_radius, hit_radius) = limb_params(&config, id);
            Limb::new(id, Point::default(), max_distance, snap_radius, hit_radius)
        });
        let mut ragdoll = Self {
            upper: BodySegment::new(SegmentId::Upper, center, config.body_radius),
            lower: BodySegment::new(SegmentId::Lower, center, config.body_radius),
            limbs,
            config,
            home: center,
            grab: None,
        };
        ragdoll.reset_pose();
        ragdoll
    }

    /// Puts every part back into the starting pose and frees all limbs.
    ///
    /// Gravity toggles are kept.
    pub fn reset_pose(&mut self) {
        let half = self.config.body_distance / 2.0;
        let spread = constants::LIMB_SPREAD;
        self.upper.position = Point::new(self.home.x, self.home.y - half);
        self.lower.position = Point::new(self.home.x, self.home.y + half);
        let upper = self.upper.position;
        let lower = self.lower.position;
        for limb in &mut self.limbs {
            limb.position = match limb.id {
                LimbId::LeftArm => Point::new(upper.x - spread, upper.y - spread),
                LimbId::RightArm => Point::new(upper.x + spread, upper.y - spread),
                LimbId::LeftLeg => Point::new(lower.x - spread, lower.y + spread),
                LimbId::RightLeg => Point::new(lower.x + spread, lower.y + spread),
            };
            limb.state = SnapState::Free;
            limb.snapped_shape = None;
            limb.released_from = None;
        }
        self.grab = None;
    }

    /// Replaces the configuration, updating limb and segment parameters in place.
    pub fn apply_config(&mut self, config: RagdollConfig) {
        for limb in &mut self.limbs {
            let (max_distance, snap_radius, hit_radius) = limb_params(&config, limb.id);
            limb.max_distance = max_distance;
            limb.snap_radius = snap_radius;
            limb.hit_radius = hit_radius;
        }
        self.upper.radius = config.body_radius;
        self.lower.radius = config.body_radius;
        self.config = config;
    }

    /// Returns the given limb.
    pub fn limb(&self, id: LimbId) -> &Limb {
        &self.limbs[id.index()]
    }

    /// Returns the given limb mutably.
    pub fn limb_mut(&mut self, id: LimbId) -> &mut Limb {
        &mut self.limbs[id.index()]
    }

    /// Returns the given torso circle.
    pub fn segment(&self, id: SegmentId) -> &BodySegment {
        match id {
            SegmentId::Upper => &self.upper,
            SegmentId::Lower => &self.lower,
        }
    }

    fn segment_mut(&mut self, id: SegmentId) -> &mut BodySegment {
        match id {
            SegmentId::Upper => &mut self.upper,
            SegmentId::Lower => &mut self.lower,
        }
    }

    /// Position of the head, which sits directly on top of the upper body.
    pub fn head_position(&self) -> Point {
        Point::new(
            self.upper.position.x,
            self.upper.position.y - self.upper.radius - constants::HEAD_RADIUS,
        )
    }

    /// What is currently being dragged.
    pub fn grabbed(&self) -> Option<DragTarget> {
        self.grab
    }

    /// Drops the current grab, if any.
    pub fn release(&mut self) {
        if let Some(DragTarget::Limb(id)) = self.grab.take() {
            self.limb_mut(id).end_drag();
        }
    }

    /// Flips idle drift for one limb and returns the new setting.
    pub fn toggle_gravity(&mut self, id: LimbId) -> bool {
        let limb = self.limb_mut(id);
        limb.gravity_on = !limb.gravity_on;
        log::debug!("{} gravity {}", id.label(), if limb.gravity_on { "on" } else { "off" });
        limb.gravity_on
    }

    /// Frees limbs locked onto an anchor that is no longer on the board.
    pub fn drop_stale_snaps(&mut self, anchors: &[Anchor]) {
        for limb in &mut self.limbs {
            let Some(shape) = limb.snapped_shape else {
                continue;
            };
            let kind = limb.shape_kind();
            if !anchors.iter().any(|a| a.kind == kind && a.position == shape) {
                limb.state = SnapState::Free;
                limb.snapped_shape = None;
            }
        }
    }

    /// Decides what a primary press at `pointer` picks up.
    ///
    /// Limbs come first with the overlap rule of [`resolve_limb_pick`]; a
    /// suppressed pick grabs nothing. With no limb under the pointer the upper and
    /// then the lower body are tested.
    pub fn resolve_drag_target(&self, pointer: Point) -> Option<DragTarget> {
        match resolve_limb_pick(&self.limbs, pointer) {
            LimbPick::Picked(id) => Some(DragTarget::Limb(id)),
            LimbPick::Suppressed => None,
            LimbPick::Miss => [&self.upper, &self.lower]
                .into_iter()
                .find(|seg| seg.contains(pointer))
                .map(|seg| DragTarget::Segment(seg.id)),
        }
    }

    /// Advances the ragdoll by one frame of `dt` seconds.
    pub fn tick(&mut self, input: &PointerInput, anchors: &[Anchor], dt: f32) {
        if input.secondary_pressed {
            if let Some(pointer) = input.position {
                if let Some(id) = LimbId::ALL.into_iter().find(|id| self.limb(*id).contains(pointer)) {
                    self.toggle_gravity(id);
                }
            }
        }

        if !input.primary_down {
            self.release();
        } else if input.primary_pressed {
            self.release();
            if let Some(pointer) = input.position {
                self.grab = self.resolve_drag_target(pointer);
                if let Some(DragTarget::Limb(id)) = self.grab {
                    self.limb_mut(id).begin_drag(pointer);
                }
            }
        }

        let ctx = StepContext::new(anchors, &self.config, dt);
        let pointer = input.position.filter(|_| input.primary_down);
        let dragged_limb = match (self.grab, pointer) {
            (Some(DragTarget::Segment(id)), Some(p)) => {
                self.segment_mut(id).position = p;
                None
            }
            (Some(DragTarget::Limb(id)), Some(_)) => Some(id),
            _ => None,
        };

        // The dragged limb goes first so the others see the segment it pulled.
        let order = dragged_limb
            .into_iter()
            .chain(LimbId::ALL.into_iter().filter(|id| Some(*id) != dragged_limb));
        for id in order {
            let segment = id.parent();
            let parent = self.segment(segment).position;
            let dragging = Some(id) == dragged_limb;
            let new_parent = self.limbs[id.index()].update(pointer, dragging, parent, &ctx);
            self.segment_mut(segment).position = new_parent;
        }

        let (upper, lower) =
            maintain_fixed_distance(self.upper.position, self.lower.position, self.config.body_distance);
        self.upper.position = upper;
        self.lower.position = lower;
    }
}

/// Reach, snap radius and hit radius for a limb under `config`.
fn limb_params(config: &RagdollConfig, id: LimbId) -> (f32, f32, f32) {
    match id.shape_kind() {
        ShapeKind::Circle => (config.arm_max_distance, config.arm_snap_radius, config.hand_radius),
        ShapeKind::Square => (config.leg_max_distance, config.leg_snap_radius, config.foot_hit_radius),
    }
}
