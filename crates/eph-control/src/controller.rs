//! The expected-free-energy controller.
//!
//! # Modes
//!
//! | Mode         | Search                                                      |
//! |--------------|-------------------------------------------------------------|
//! | `Reactive`   | Projected gradient descent on the current-scene objective   |
//! | `Predictive` | Reactive search, then refined with the anticipation term    |
//! | `Sampling`   | Best of 16 compass actions at `u_max`, zero and warm start  |
//!
//! Gradient modes start from the previous action and step
//! `u ← clamp(u − η·∇EFE(u), ±u_max)`.  They stop once a step's
//! projected-gradient norm drops below `grad_threshold`, or after `max_iter`
//! steps.  At least one step is always taken.  The best iterate seen is
//! returned either way.
//!
//! The predictive search starts from the reactive optimum.  If the refined
//! action sidesteps less than the reactive one (ego-frame lateral
//! magnitude), the reactive action is kept.

use std::f64::consts::TAU;

use eph_core::{ensure_non_negative, ensure_positive, EphError, EphResult, Vec2};
use tracing::trace;

use crate::model::{ActionModel, Decision, Diagnostics, PerceptionFrame, TickContext};
use crate::Objective;

/// Number of compass directions tried by [`ControlMode::Sampling`].
pub const SAMPLING_DIRECTIONS: usize = 16;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControlMode {
    #[default]
    Reactive,
    Predictive,
    Sampling,
}

impl ControlMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlMode::Reactive => "reactive",
            ControlMode::Predictive => "predictive",
            ControlMode::Sampling => "sampling",
        }
    }
}

/// Constant-velocity lookahead used by [`ControlMode::Predictive`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LookaheadConfig {
    pub steps:   usize,
    /// Seconds between lookahead steps.
    pub step_dt: f64,
    /// Weight of the anticipation term relative to the safety term.
    pub weight:  f64,
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self { steps: 3, step_dt: 0.5, weight: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    pub mode:            ControlMode,
    pub lambda_goal:     f64,
    pub lambda_safety:   f64,
    pub lambda_surprise: f64,
    /// Gradient step size η.
    pub eta:             f64,
    pub max_iter:        u32,
    /// Ω: stop once the projected-gradient norm is below this.
    pub grad_threshold:  f64,
    /// Finite-difference step.
    pub fd_step:         f64,
    pub lookahead:       LookaheadConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode:            ControlMode::Reactive,
            lambda_goal:     1.0,
            lambda_safety:   5.0,
            lambda_surprise: 1.0,
            eta:             10.0,
            max_iter:        20,
            grad_threshold:  1e-3,
            fd_step:         1e-4,
            lookahead:       LookaheadConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> EphResult<()> {
        ensure_non_negative("controller.lambda_goal", self.lambda_goal)?;
        ensure_non_negative("controller.lambda_safety", self.lambda_safety)?;
        ensure_non_negative("controller.lambda_surprise", self.lambda_surprise)?;
        ensure_positive("controller.eta", self.eta)?;
        ensure_positive("controller.grad_threshold", self.grad_threshold)?;
        ensure_positive("controller.fd_step", self.fd_step)?;
        ensure_non_negative("controller.lookahead.weight", self.lookahead.weight)?;
        if self.mode == ControlMode::Predictive {
            if self.lookahead.steps == 0 {
                return Err(EphError::config("controller.lookahead.steps must be at least 1 in predictive mode"));
            }
            ensure_positive("controller.lookahead.step_dt", self.lookahead.step_dt)?;
        }
        Ok(())
    }
}

// ── EfeController ─────────────────────────────────────────────────────────────

/// The expected-free-energy [`ActionModel`].
#[derive(Clone, Debug)]
pub struct EfeController {
    pub config:        ControllerConfig,
    /// Whether a predictive model is expected.  When it is and none is
    /// supplied, the controller degrades: reactive mode, no surprise term, no
    /// environmental haze, and `predictor_unavailable` set.
    pub use_predictor: bool,
}

impl EfeController {
    pub fn new(config: ControllerConfig, use_predictor: bool) -> EphResult<Self> {
        config.validate()?;
        Ok(Self { config, use_predictor })
    }

    /// The mode that will actually run given whether a model is present.
    pub fn effective_mode(&self, predictor_present: bool) -> ControlMode {
        if self.use_predictor && !predictor_present { ControlMode::Reactive } else { self.config.mode }
    }
}

struct SearchResult {
    action:     Vec2,
    efe:        f64,
    grad_norm:  f64,
    iterations: u32,
    converged:  bool,
}

impl EfeController {
    fn gradient_search(&self, objective: &Objective<'_>, start: Vec2, u_max: f64) -> SearchResult {
        let clamp = |u: Vec2| u.clamp_components(u_max);
        let eta = self.config.eta;

        let mut u = clamp(start);
        let mut best = (u, objective.value(u));
        let mut grad_norm = f64::INFINITY;
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..self.config.max_iter.max(1) {
            iterations += 1;
            let grad = objective.gradient(u, self.config.fd_step);
            if !grad.is_finite() {
                break;
            }
            let next = clamp(u - grad * eta);
            grad_norm = (u - next).norm() / eta;
            u = next;
            let f = objective.value(u);
            if f < best.1 {
                best = (u, f);
            }
            if grad_norm < self.config.grad_threshold {
                converged = true;
                break;
            }
        }

        SearchResult { action: best.0, efe: best.1, grad_norm, iterations, converged }
    }

    /// Refine `reactive` under the full objective, never sidestepping less.
    fn lookahead_search(
        &self,
        objective: &Objective<'_>,
        reactive:  SearchResult,
        u_max:     f64,
    ) -> SearchResult {
        let lateral = |u: Vec2| objective.ego.to_ego(u).y.abs();
        let refined = self.gradient_search(objective, reactive.action, u_max);
        if lateral(refined.action) < lateral(reactive.action) {
            SearchResult { efe: objective.value(reactive.action), ..reactive }
        } else {
            refined
        }
    }

    fn sampling_search(&self, objective: &Objective<'_>, warm: Vec2, u_max: f64) -> SearchResult {
        let candidates = (0..SAMPLING_DIRECTIONS)
            .map(|k| Vec2::from_angle(TAU * k as f64 / SAMPLING_DIRECTIONS as f64) * u_max)
            .chain([Vec2::ZERO, warm])
            .map(|u| u.clamp_components(u_max));

        let mut best = (Vec2::ZERO, f64::INFINITY);
        for u in candidates {
            let f = objective.value(u);
            if f < best.1 {
                best = (u, f);
            }
        }
        SearchResult { action: best.0, efe: best.1, grad_norm: 0.0, iterations: 0, converged: true }
    }
}

impl ActionModel for EfeController {
    fn decide_action(&self, frame: &PerceptionFrame<'_>, ctx: &TickContext<'_>) -> Decision {
        let u_max = ctx.limits.u_max;
        let predictor_unavailable = self.use_predictor && ctx.predictor.is_none();
        let mode = self.effective_mode(ctx.predictor.is_some());

        let self_precision;
        let (precision, haze) = if predictor_unavailable && frame.percept.env_haze.is_some() {
            self_precision = ctx.perception.self_precision(&frame.percept);
            (&self_precision, frame.percept.self_haze.mean())
        } else {
            (&frame.percept.precision, frame.percept.haze.mean())
        };

        let encoder = &ctx.perception.encoder;
        let lookahead = if mode == ControlMode::Predictive {
            let la = &self.config.lookahead;
            (1..=la.steps)
                .map(|k| {
                    let horizon = k as f64 * la.step_dt;
                    encoder.encode_ahead(&frame.ego, frame.neighbors, ctx.obstacles, ctx.torus, horizon)
                })
                .collect()
        } else {
            Vec::new()
        };

        let surprise = match (self.use_predictor, ctx.predictor) {
            (true, Some(model)) => Some((model, self.config.lambda_surprise)),
            _ => None,
        };

        let mut objective = Objective {
            encoder,
            ego: frame.ego,
            desired_velocity: frame.desired_velocity,
            dt: ctx.dt,
            spm: &frame.percept.spm,
            precision,
            lambda_goal: self.config.lambda_goal,
            safety_weight: self.config.lambda_safety * frame.personal_precision,
            surprise,
            lookahead: Vec::new(),
            lookahead_weight: self.config.lookahead.weight,
        };

        let warm = if frame.warm_start.is_finite() { frame.warm_start } else { Vec2::ZERO };
        let result = match mode {
            ControlMode::Sampling => self.sampling_search(&objective, warm, u_max),
            ControlMode::Reactive => self.gradient_search(&objective, warm, u_max),
            ControlMode::Predictive => {
                let reactive = self.gradient_search(&objective, warm, u_max);
                objective.lookahead = lookahead;
                self.lookahead_search(&objective, reactive, u_max)
            }
        };

        if !result.converged {
            trace!(
                agent = %frame.agent,
                grad_norm = result.grad_norm,
                iterations = result.iterations,
                "EFE optimisation did not converge; using best iterate"
            );
        }

        let action = result.action.clamp_components(u_max);
        let terms = objective.terms(action);
        Decision {
            action,
            diagnostics: Diagnostics {
                efe: result.efe,
                haze,
                surprise: terms.surprise,
                grad_norm: result.grad_norm,
                iterations: result.iterations,
                converged: result.converged,
                predictor_unavailable,
            },
        }
    }

    fn name(&self) -> &'static str {
        self.config.mode.as_str()
    }
}
