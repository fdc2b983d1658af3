//! Tunable parameters for the ragdoll simulation.

use crate::constants;
use serde::{Deserialize, Serialize};

/// How a limb finds the anchor it may lock onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapPolicy {
    /// Only re-snap to the anchor the limb last locked onto.
    #[default]
    RememberedOnly,
    /// Lock onto the nearest anchor of the limb's own shape within snap radius,
    /// falling back to the remembered anchor.
    NearestMatchingAnchor,
}

/// Configuration for the ragdoll's constraints, snapping and idle drift.
///
/// # Builder Pattern
/// ```
/// use ragdoll_climber::{RagdollConfig, SnapPolicy};
///
/// let config = RagdollConfig::new()
///     .with_body_distance(90.0)
///     .with_gravity_rate(120.0)
///     .with_snap_policy(SnapPolicy::NearestMatchingAnchor);
/// assert_eq!(config.body_distance, 90.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagdollConfig {
    /// Exact separation kept between the upper and lower body.
    pub body_distance: f32,
    /// Reach of the hands from the upper body.
    pub arm_max_distance: f32,
    /// Reach of the feet from the lower body.
    pub leg_max_distance: f32,
    /// Lock-on distance for hands.
    pub arm_snap_radius: f32,
    /// Lock-on distance for feet.
    pub leg_snap_radius: f32,
    /// Pick-up radius of a hand.
    pub hand_radius: f32,
    /// Pick-up half-extent of a foot.
    pub foot_hit_radius: f32,
    /// Radius of each body circle.
    pub body_radius: f32,
    /// Idle drift speed in units per second.
    pub gravity_rate: f32,
    /// Anchor search used when a moved limb checks for snapping.
    pub snap_policy: SnapPolicy,
}

impl RagdollConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            body_distance: constants::BODY_DISTANCE,
            arm_max_distance: constants::HAND_BODY_MAX_DISTANCE,
            leg_max_distance: constants::FEET_BODY_MAX_DISTANCE,
            arm_snap_radius: constants::ARM_SNAP_RADIUS,
            leg_snap_radius: constants::LEG_SNAP_RADIUS,
            hand_radius: constants::HAND_RADIUS,
            foot_hit_radius: constants::FEET_SIZE / 2.0,
            body_radius: constants::BODY_RADIUS,
            gravity_rate: constants::GRAVITY_RATE,
            snap_policy: SnapPolicy::RememberedOnly,
        }
    }

    /// Set the torso link length.
    pub fn with_body_distance(mut self, distance: f32) -> Self {
        self.body_distance = distance.max(0.0);
        self
    }

    /// Set the reach of both hands.
    pub fn with_arm_max_distance(mut self, distance: f32) -> Self {
        self.arm_max_distance = distance.max(0.0);
        self
    }

    /// Set the reach of both feet.
    pub fn with_leg_max_distance(mut self, distance: f32) -> Self {
        self.leg_max_distance = distance.max(0.0);
        self
    }

    /// Set the lock-on distance for hands and feet.
    pub fn with_snap_radii(mut self, arm: f32, leg: f32) -> Self {
        self.arm_snap_radius = arm.max(0.0);
        self.leg_snap_radius = leg.max(0.0);
        self
    }

    /// Set the idle drift speed.
    pub fn with_gravity_rate(mut self, rate: f32) -> Self {
        self.gravity_rate = rate.max(0.0);
        self
    }

    /// Set the anchor search policy.
    pub fn with_snap_policy(mut self, policy: SnapPolicy) -> Self {
        self.snap_policy = policy;
        self
    }
}

impl Default for RagdollConfig {
    fn default() -> Self {
        Self::new()
    }
}
