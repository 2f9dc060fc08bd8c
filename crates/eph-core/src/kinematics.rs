//! Instantaneous body state and actuation limits.

use crate::error::{ensure_positive, EphResult};
use crate::geo::Vec2;

/// What other agents can observe about a body in one tick: pose, velocity
/// and size.  Neighbour snapshots handed to the perception layer are slices
/// of these.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing direction in radians, counter-clockwise from world +x.
    pub heading:  f64,
    pub radius:   f64,
}

impl BodyState {
    pub fn new(position: Vec2, velocity: Vec2, heading: f64, radius: f64) -> Self {
        Self { position, velocity, heading, radius }
    }

    /// Rotate a world-frame vector into this body's egocentric frame
    /// (+x forward, +y left).
    #[inline]
    pub fn to_ego(&self, world: Vec2) -> Vec2 {
        world.rotate(-self.heading)
    }

    /// Inverse of [`to_ego`](Self::to_ego).
    #[inline]
    pub fn to_world(&self, ego: Vec2) -> Vec2 {
        ego.rotate(self.heading)
    }
}

/// Bounds applied by the controller (to `u`) and the integrator (to both).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActuationLimits {
    /// Per-component bound on the acceleration command.
    pub u_max:     f64,
    /// Bound on the velocity norm after integration.
    pub max_speed: f64,
}

impl Default for ActuationLimits {
    fn default() -> Self {
        Self { u_max: 2.0, max_speed: 1.5 }
    }
}

impl ActuationLimits {
    pub fn validate(&self) -> EphResult<()> {
        ensure_positive("limits.u_max", self.u_max)?;
        ensure_positive("limits.max_speed", self.max_speed)
    }

    /// Clamp an action to the actuation box `[-u_max, u_max]²`.
    #[inline]
    pub fn clamp_action(&self, u: Vec2) -> Vec2 {
        u.clamp_components(self.u_max)
    }
}
