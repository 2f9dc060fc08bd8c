//! Self-haze, haze composition and precision.
//!
//! Self-haze is `h_max · exp(-α · ch1)` per bin: directions where nothing is
//! observed are foggy, densely observed ones are clear.  The scalar mode is
//! the same field with every bin set from the mean occupancy.
//!
//! An agent that stays slow for longer than the stall window also builds up
//! stall haze over its frontal sector.  It is composed into self-haze by
//! per-bin max, so the precision of whatever blocks the way ahead drops
//! until the agent starts moving again.

use eph_core::{ensure_non_negative, ensure_positive, EphError, EphResult};

use crate::spm::PROXIMITY;
use crate::{BinField, PolarGrid, SaliencyMap};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HazeMode {
    /// One haze value per bin.
    #[default]
    Field,
    /// A single value from the mean occupancy, broadcast to every bin.
    Scalar,
}

/// Haze and precision parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HazeConfig {
    /// Upper bound of self-haze.  0 disables it.
    pub h_max:   f64,
    /// Decay of self-haze with occupancy.
    pub alpha:   f64,
    /// ε in `precision = 1 / (haze + ε)`.
    pub epsilon: f64,
    pub mode:    HazeMode,
    pub stall:   StallConfig,
}

impl Default for HazeConfig {
    fn default() -> Self {
        Self { h_max: 1.0, alpha: 4.0, epsilon: 0.1, mode: HazeMode::Field, stall: StallConfig::default() }
    }
}

impl HazeConfig {
    pub fn validate(&self) -> EphResult<()> {
        ensure_non_negative("haze.h_max", self.h_max)?;
        ensure_non_negative("haze.alpha", self.alpha)?;
        ensure_positive("haze.epsilon", self.epsilon)?;
        self.stall.validate()
    }
}

// ── Stall haze ────────────────────────────────────────────────────────────────

/// Deadlock escape parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StallConfig {
    /// A tick with committed speed below this counts as stalled.
    pub speed_threshold:        f64,
    /// Stall haze rises only while the stall counter exceeds this.
    pub window_ticks:           u32,
    /// Per-tick increase of the stall level past the window.
    pub rise:                   f64,
    /// Per-tick decrease otherwise.
    pub fall:                   f64,
    /// Bins whose centre bearing is within this many degrees of the heading
    /// receive stall haze.
    pub frontal_half_angle_deg: f64,
}

impl Default for StallConfig {
    fn default() -> Self {
        Self {
            speed_threshold:        0.1,
            window_ticks:           50,
            rise:                   0.05,
            fall:                   0.01,
            frontal_half_angle_deg: 60.0,
        }
    }
}

impl StallConfig {
    pub fn validate(&self) -> EphResult<()> {
        ensure_non_negative("haze.stall.speed_threshold", self.speed_threshold)?;
        ensure_non_negative("haze.stall.rise", self.rise)?;
        ensure_non_negative("haze.stall.fall", self.fall)?;
        ensure_non_negative("haze.stall.frontal_half_angle_deg", self.frontal_half_angle_deg)?;
        if self.frontal_half_angle_deg > 180.0 {
            return Err(EphError::config(format!(
                "haze.stall.frontal_half_angle_deg must be at most 180, got {}",
                self.frontal_half_angle_deg
            )));
        }
        Ok(())
    }

    /// One tick of an agent's stall state: `(counter, level)` given the speed
    /// it just committed.  The level stays in `[0, 1]`.
    pub fn advance(&self, ticks: u32, level: f64, speed: f64) -> (u32, f64) {
        let ticks = if speed < self.speed_threshold { ticks.saturating_add(1) } else { ticks.saturating_sub(1) };
        let level = if level.is_finite() { level } else { 0.0 };
        let level = if ticks > self.window_ticks { level + self.rise } else { level - self.fall };
        (ticks, level.clamp(0.0, 1.0))
    }
}

/// Derives self-haze from a saliency map's proximity channel.
#[derive(Clone, Debug)]
pub struct SelfHazeEstimator {
    pub config: HazeConfig,
}

impl SelfHazeEstimator {
    pub fn new(config: HazeConfig) -> EphResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    fn haze_for(&self, occupancy: f64) -> f64 {
        let occ = if occupancy.is_finite() { occupancy.clamp(0.0, 1.0) } else { 0.0 };
        (self.config.h_max * (-self.config.alpha * occ).exp()).clamp(0.0, self.config.h_max)
    }

    pub fn estimate(&self, map: &SaliencyMap) -> BinField {
        let occupancy = map.channel_field(PROXIMITY);
        match self.config.mode {
            HazeMode::Field => occupancy.map(|o| self.haze_for(o)),
            HazeMode::Scalar => {
                let h = self.haze_for(occupancy.mean());
                BinField::filled(map.n_radial, map.n_angular, h)
            }
        }
    }

    /// `level · h_max` over the frontal sector, zero elsewhere.
    pub fn stall_haze(&self, grid: &PolarGrid, level: f64) -> BinField {
        let level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
        let half = self.config.stall.frontal_half_angle_deg.to_radians();
        let h = level * self.config.h_max;
        let mut field = BinField::uniform(grid, 0.0);
        for a in (0..grid.n_angular).filter(|&a| grid.bearing_center(a).abs() <= half) {
            for r in 0..grid.n_radial {
                field.set(r, a, h);
            }
        }
        field
    }

    /// Self-haze of `map` with the stall haze of `level` composed in.
    pub fn estimate_stalled(&self, map: &SaliencyMap, grid: &PolarGrid, level: f64) -> BinField {
        let haze = self.estimate(map);
        if level > 0.0 { compose(&haze, &self.stall_haze(grid, level)) } else { haze }
    }

    /// Per-bin precision of a composed haze field.
    pub fn precision_field(&self, haze: &BinField) -> BinField {
        haze.map(|h| precision(h, self.config.epsilon))
    }
}

/// Per-bin maximum of two haze fields.  Commutative and idempotent, and never
/// larger than the larger input bound.
pub fn compose(self_haze: &BinField, env_haze: &BinField) -> BinField {
    debug_assert!(self_haze.same_shape(env_haze));
    BinField {
        n_radial:  self_haze.n_radial,
        n_angular: self_haze.n_angular,
        values:    self_haze
            .values
            .iter()
            .zip(&env_haze.values)
            .map(|(&a, &b)| a.max(b))
            .collect(),
    }
}

/// `1 / (haze + ε)`.  Negative or non-finite haze is treated as 0 so the
/// result is always finite and positive for `ε > 0`.
#[inline]
pub fn precision(haze: f64, epsilon: f64) -> f64 {
    let h = if haze.is_finite() { haze.max(0.0) } else { 0.0 };
    1.0 / (h + epsilon)
}
