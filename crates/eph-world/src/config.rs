//! World and dynamics configuration.

use eph_core::{ensure_non_negative, ensure_positive, EphError, EphResult, Obstacle};
use eph_perception::{DepositKind, EnvHazeConfig};

/// Trail left by every agent at its committed position each tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrailConfig {
    pub kind:   DepositKind,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    pub width:     f64,
    pub height:    f64,
    pub obstacles: Vec<Obstacle>,
    /// Environmental haze grid; `None` disables it entirely.
    pub env_haze:  Option<EnvHazeConfig>,
    /// Requires `env_haze`.
    pub trail:     Option<TrailConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width:     40.0,
            height:    40.0,
            obstacles: Vec::new(),
            env_haze:  None,
            trail:     None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> EphResult<()> {
        ensure_positive("world.width", self.width)?;
        ensure_positive("world.height", self.height)?;
        for (i, o) in self.obstacles.iter().enumerate() {
            if !o.center.is_finite() {
                return Err(EphError::config(format!("obstacle {i}: non-finite centre")));
            }
            ensure_positive(&format!("obstacle {i} radius"), o.radius)?;
        }
        if let Some(haze) = &self.env_haze {
            haze.validate()?;
        }
        if let Some(trail) = &self.trail {
            if self.env_haze.is_none() {
                return Err(EphError::config("world.trail requires world.env_haze"));
            }
            ensure_non_negative("world.trail.amount", trail.amount)?;
        }
        Ok(())
    }
}

/// Integrator constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DynamicsConfig {
    /// Heading only follows velocity above this speed.
    pub min_heading_speed:  f64,
    /// Inward velocity is removed within this multiple of contact distance
    /// from an obstacle.
    pub obstacle_clearance: f64,
    pub resolve_collisions: bool,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self { min_heading_speed: 0.05, obstacle_clearance: 1.1, resolve_collisions: true }
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> EphResult<()> {
        ensure_non_negative("dynamics.min_heading_speed", self.min_heading_speed)?;
        ensure_positive("dynamics.obstacle_clearance", self.obstacle_clearance)
    }
}
