//! The egocentric saliency map and its encoder.
//!
//! # Channels
//!
//! | Channel | Meaning            | Range     | Per-neighbour value                                 |
//! |---------|--------------------|-----------|-----------------------------------------------------|
//! | 0 (ch1) | proximity          | `[0, 1]`  | `min(1, (r_ego + r_other) / max(d, ε))`             |
//! | 1 (ch2) | closing speed      | `[-1, 1]` | `clamp(-(p·v_rel) / max(d, ε) / speed_scale, ±1)`   |
//! | 2 (ch3) | collision risk     | `[0, 1]`  | `1 - exp(-β · max(0, ch2·speed_scale) / range_c)`   |
//!
//! `p` and `v_rel` are the neighbour's position and velocity relative to the
//! ego agent; `range_c` is the representative range of the neighbour's bin.
//! Several neighbours in one bin combine by element-wise max; the first one
//! written sets the bin so a lone receding neighbour keeps its negative ch2.

use eph_core::{BodyState, EphResult, Obstacle, Torus, Vec2, EPSILON};

use crate::{BinField, PolarGrid, SpmConfig};

/// Number of saliency channels.
pub const CHANNELS: usize = 3;

pub(crate) const PROXIMITY: usize = 0;
pub(crate) const CLOSING: usize = 1;
pub(crate) const RISK: usize = 2;

// ── SaliencyMap ───────────────────────────────────────────────────────────────

/// Three-channel polar tensor, recomputed every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SaliencyMap {
    pub n_radial:  usize,
    pub n_angular: usize,
    /// `channels[c][r * n_angular + a]`.
    pub channels:  [Vec<f64>; CHANNELS],
    /// Bins written by at least one neighbour or obstacle.
    pub occupied:  Vec<bool>,
}

impl SaliencyMap {
    pub fn zeros(n_radial: usize, n_angular: usize) -> Self {
        let n = n_radial * n_angular;
        Self {
            n_radial,
            n_angular,
            channels: [vec![0.0; n], vec![0.0; n], vec![0.0; n]],
            occupied: vec![false; n],
        }
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.n_radial * self.n_angular
    }

    #[inline]
    pub fn get(&self, channel: usize, r: usize, a: usize) -> f64 {
        self.channels[channel][r * self.n_angular + a]
    }

    #[inline]
    pub fn proximity(&self) -> &[f64] {
        &self.channels[PROXIMITY]
    }

    #[inline]
    pub fn closing(&self) -> &[f64] {
        &self.channels[CLOSING]
    }

    #[inline]
    pub fn risk(&self) -> &[f64] {
        &self.channels[RISK]
    }

    /// Flat indices of occupied bins.
    pub fn occupied_bins(&self) -> impl Iterator<Item = usize> + '_ {
        self.occupied.iter().enumerate().filter(|&(_, &o)| o).map(|(i, _)| i)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    pub fn channel_mean(&self, channel: usize) -> f64 {
        let values = &self.channels[channel];
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub fn channel_max(&self, channel: usize) -> f64 {
        self.channels[channel].iter().copied().fold(0.0, f64::max)
    }

    /// Copy one channel out as a [`BinField`].
    pub fn channel_field(&self, channel: usize) -> BinField {
        BinField {
            n_radial:  self.n_radial,
            n_angular: self.n_angular,
            values:    self.channels[channel].clone(),
        }
    }

    /// All channels concatenated, channel-major.
    pub fn flatten(&self) -> Vec<f64> {
        self.channels.iter().flat_map(|c| c.iter().copied()).collect()
    }

    /// Combine one neighbour's contribution into bin `i`.
    #[inline]
    fn write(&mut self, i: usize, values: [f64; CHANNELS]) {
        if self.occupied[i] {
            for (c, v) in values.into_iter().enumerate() {
                let slot = &mut self.channels[c][i];
                *slot = slot.max(v);
            }
        } else {
            for (c, v) in values.into_iter().enumerate() {
                self.channels[c][i] = v;
            }
            self.occupied[i] = true;
        }
    }
}

// ── SaliencyEncoder ───────────────────────────────────────────────────────────

/// Builds saliency maps for one grid configuration.  Immutable and shared by
/// every agent in a tick.
#[derive(Clone, Debug)]
pub struct SaliencyEncoder {
    pub config: SpmConfig,
    pub grid:   PolarGrid,
}

impl SaliencyEncoder {
    pub fn new(config: SpmConfig) -> EphResult<Self> {
        let grid = PolarGrid::new(&config)?;
        Ok(Self { config, grid })
    }

    pub fn empty_map(&self) -> SaliencyMap {
        SaliencyMap::zeros(self.grid.n_radial, self.grid.n_angular)
    }

    /// Encode `neighbors` (which must not include `ego`) and static
    /// `obstacles` into `ego`'s egocentric frame.
    pub fn encode(
        &self,
        ego:       &BodyState,
        neighbors: &[BodyState],
        obstacles: &[Obstacle],
        torus:     &Torus,
    ) -> SaliencyMap {
        let mut map = self.empty_map();
        for other in neighbors {
            let rel_pos = torus.displacement(ego.position, other.position);
            self.accumulate(&mut map, ego, rel_pos, other.velocity - ego.velocity, other.radius);
        }
        for obstacle in obstacles {
            let rel_pos = torus.displacement(ego.position, obstacle.center);
            self.accumulate(&mut map, ego, rel_pos, -ego.velocity, obstacle.radius);
        }
        map
    }

    fn accumulate(
        &self,
        map:          &mut SaliencyMap,
        ego:          &BodyState,
        rel_pos:      Vec2,
        rel_vel:      Vec2,
        other_radius: f64,
    ) {
        let range = rel_pos.norm();
        let bearing = ego.to_ego(rel_pos).angle();
        let Some((r, a)) = self.grid.locate(range, bearing) else {
            return;
        };
        let d = range.max(EPSILON);
        let proximity = ((ego.radius + other_radius) / d).min(1.0);
        let closing = -rel_pos.dot(rel_vel) / d;
        let ch2 = self.normalize_closing(closing);
        let ch3 = self.risk_from_closing(ch2 * self.config.speed_scale, r);
        map.write(self.grid.index(r, a), [proximity, ch2, ch3]);
    }

    /// Closing speed → ch2.
    #[inline]
    pub fn normalize_closing(&self, closing: f64) -> f64 {
        if !closing.is_finite() {
            return 0.0;
        }
        (closing / self.config.speed_scale).clamp(-1.0, 1.0)
    }

    /// Collision risk of a bin at radial index `r` given its closing speed.
    #[inline]
    pub fn risk_from_closing(&self, closing: f64, r: usize) -> f64 {
        let c = closing.max(0.0);
        if c == 0.0 {
            return 0.0;
        }
        let range = self.grid.range_center(r).max(EPSILON);
        1.0 - (-self.config.risk_gain * c / range).exp()
    }
}
