//! Kinematic forecasts of a saliency map.
//!
//! Two kinds of "what would I see" questions are answered here:
//!
//! - **Action-conditioned**: if the ego agent changes its velocity by `Δv`
//!   (ego frame), each occupied bin's closing speed becomes
//!   `ch2 · speed_scale + Δv · ê_bin`, where `ê_bin` is the unit vector at
//!   the bin's centre bearing.  ch2 and ch3 are recomputed from that; ch1 is
//!   unchanged.  `Δv = 0` reproduces the input map.
//! - **Time-shifted**: every body (ego included) coasts at constant velocity
//!   for `horizon` seconds and the scene is re-encoded.

use eph_core::{BodyState, Obstacle, Torus, Vec2};

use crate::spm::{CLOSING, RISK};
use crate::{BinField, SaliencyEncoder, SaliencyMap};

impl SaliencyEncoder {
    /// Forecast closing speed of occupied bin `i` under ego-frame `dv`.
    #[inline]
    fn forecast_closing(&self, map: &SaliencyMap, i: usize, dv: Vec2) -> f64 {
        let a = i % map.n_angular;
        map.channels[CLOSING][i] * self.config.speed_scale + dv.dot(self.grid.direction(a))
    }

    /// The map as it would look after an ego-frame velocity change `dv`.
    pub fn forecast(&self, map: &SaliencyMap, dv: Vec2) -> SaliencyMap {
        let mut out = map.clone();
        if dv == Vec2::ZERO {
            return out;
        }
        for i in map.occupied_bins() {
            let r = i / map.n_angular;
            let closing = self.forecast_closing(map, i, dv);
            let ch2 = self.normalize_closing(closing);
            out.channels[CLOSING][i] = ch2;
            out.channels[RISK][i] = self.risk_from_closing(ch2 * self.config.speed_scale, r);
        }
        out
    }

    /// `Σ_bin precision(bin) · risk(bin)` of the forecast map, without
    /// materialising it.
    pub fn weighted_risk(&self, map: &SaliencyMap, precision: &BinField, dv: Vec2) -> f64 {
        debug_assert_eq!(map.bins(), precision.len());
        map.occupied_bins()
            .map(|i| {
                let r = i / map.n_angular;
                let ch2 = self.normalize_closing(self.forecast_closing(map, i, dv));
                precision.values[i] * self.risk_from_closing(ch2 * self.config.speed_scale, r)
            })
            .sum()
    }

    /// Re-encode the scene after every body coasts for `horizon` seconds.
    /// Obstacles stay put and headings are unchanged.
    pub fn encode_ahead(
        &self,
        ego:       &BodyState,
        neighbors: &[BodyState],
        obstacles: &[Obstacle],
        torus:     &Torus,
        horizon:   f64,
    ) -> SaliencyMap {
        let coast = |b: &BodyState| BodyState {
            position: torus.wrap(b.position + b.velocity * horizon),
            ..*b
        };
        let future_ego = coast(ego);
        let future: Vec<BodyState> = neighbors.iter().map(coast).collect();
        self.encode(&future_ego, &future, obstacles, torus)
    }
}
