//! Expected free energy of a candidate action.
//!
//! ```text
//! EFE(u) = λ_goal   · ‖v + u·dt − v_goal‖²
//!        + λ_safety · p · Σ_bin Π(bin) · risk(bin | Δv)
//!        + λ_surp   · surprise(spm, u_ego)                       (model present)
//!        + w · λ_safety · p · mean_k Σ_bin Π(bin) · risk_k(bin | Δv)   (lookahead)
//! ```
//!
//! `Δv = u·dt` rotated into the ego frame, `p` is the agent's personal
//! precision, `Π = 1 / (haze + ε)` and `risk_k` is evaluated on the scene
//! re-encoded `k` lookahead steps ahead.

use eph_core::{BodyState, Vec2};
use eph_perception::{BinField, SaliencyEncoder, SaliencyMap};

use crate::PredictiveModel;

/// The individual terms of one evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EfeTerms {
    pub goal:         f64,
    pub safety:       f64,
    pub surprise:     f64,
    pub anticipation: f64,
}

impl EfeTerms {
    #[inline]
    pub fn total(&self) -> f64 {
        self.goal + self.safety + self.surprise + self.anticipation
    }
}

/// The objective for one agent in one tick, with everything that does not
/// depend on `u` precomputed.
pub struct Objective<'a> {
    pub encoder:          &'a SaliencyEncoder,
    pub ego:              BodyState,
    pub desired_velocity: Vec2,
    pub dt:               f64,
    pub spm:              &'a SaliencyMap,
    pub precision:        &'a BinField,
    pub lambda_goal:      f64,
    /// `λ_safety` already multiplied by the personal precision.
    pub safety_weight:    f64,
    /// Model and `λ_surprise`, when the surprise term is active.
    pub surprise:         Option<(&'a dyn PredictiveModel, f64)>,
    /// Scenes re-encoded at each lookahead step; empty in reactive mode.
    pub lookahead:        Vec<SaliencyMap>,
    pub lookahead_weight: f64,
}

impl Objective<'_> {
    pub fn terms(&self, u: Vec2) -> EfeTerms {
        let dv_world = u * self.dt;
        let predicted_velocity = self.ego.velocity + dv_world;
        let goal = self.lambda_goal * (predicted_velocity - self.desired_velocity).norm_sq();

        let dv = self.ego.to_ego(dv_world);
        let safety = self.safety_weight * self.encoder.weighted_risk(self.spm, self.precision, dv);

        let surprise = match self.surprise {
            Some((model, lambda)) => lambda * model.surprise(self.spm, self.ego.to_ego(u)),
            None => 0.0,
        };

        let anticipation = if self.lookahead.is_empty() {
            0.0
        } else {
            let sum: f64 = self
                .lookahead
                .iter()
                .map(|map| self.encoder.weighted_risk(map, self.precision, dv))
                .sum();
            self.lookahead_weight * self.safety_weight * sum / self.lookahead.len() as f64
        };

        EfeTerms { goal, safety, surprise, anticipation }
    }

    /// Total objective; non-finite values become `+∞` so they never win.
    #[inline]
    pub fn value(&self, u: Vec2) -> f64 {
        let v = self.terms(u).total();
        if v.is_finite() { v } else { f64::INFINITY }
    }

    /// Central finite-difference gradient with step `h`.
    pub fn gradient(&self, u: Vec2, h: f64) -> Vec2 {
        let dx = Vec2::new(h, 0.0);
        let dy = Vec2::new(0.0, h);
        Vec2::new(
            (self.value(u + dx) - self.value(u - dx)) / (2.0 * h),
            (self.value(u + dy) - self.value(u - dy)) / (2.0 * h),
        )
    }
}
