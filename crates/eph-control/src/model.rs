//! The `ActionModel` trait and the data it consumes and produces.

use eph_core::{ActuationLimits, AgentId, BodyState, Obstacle, Tick, Torus, Vec2};
use eph_perception::{Percept, Perception};

use crate::PredictiveModel;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Read-only state shared by every agent's decision in one tick.
///
/// Built once per tick by `eph-sim`; no agent can mutate anything it
/// borrows.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub tick:       Tick,
    /// Integration step, seconds.
    pub dt:         f64,
    pub torus:      &'a Torus,
    pub obstacles:  &'a [Obstacle],
    pub perception: &'a Perception,
    pub limits:     ActuationLimits,
    /// The loaded predictive model, if any.
    pub predictor:  Option<&'a dyn PredictiveModel>,
}

/// One agent's view of the world this tick.
#[derive(Clone, Debug)]
pub struct PerceptionFrame<'a> {
    pub agent:              AgentId,
    pub ego:                BodyState,
    pub desired_velocity:   Vec2,
    /// Personal precision scalar multiplying the safety term.
    pub personal_precision: f64,
    /// Neighbours considered by this agent (excluding itself).
    pub neighbors:          &'a [BodyState],
    pub percept:            Percept,
    /// Previous tick's action; the optimizer starts here.
    pub warm_start:         Vec2,
}

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Per-agent scalars produced alongside the action.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// Objective value at the returned action.
    pub efe:                   f64,
    /// Mean composed haze used for precision.
    pub haze:                  f64,
    /// Surprise term at the returned action, 0 when no model was used.
    pub surprise:              f64,
    /// Projected-gradient norm at the last iterate.
    pub grad_norm:             f64,
    pub iterations:            u32,
    /// `false` when `max_iter` ran out above the gradient threshold.
    pub converged:             bool,
    /// The predictive model was requested but not available.
    pub predictor_unavailable: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Decision {
    /// World-frame acceleration, each component within `±u_max`.
    pub action:      Vec2,
    pub diagnostics: Diagnostics,
}

// ── ActionModel ───────────────────────────────────────────────────────────────

/// Pluggable per-agent action selection.
///
/// The simulation may call `decide_action` for many agents in parallel, so
/// implementations must be `Send + Sync` and keep no per-agent mutable state;
/// anything carried across ticks (like the warm start) lives in the agent
/// store and arrives through the frame.
pub trait ActionModel: Send + Sync + 'static {
    /// Choose this tick's action.  Must never fail: degenerate inputs yield a
    /// bounded action and flags in [`Diagnostics`].
    fn decide_action(&self, frame: &PerceptionFrame<'_>, ctx: &TickContext<'_>) -> Decision;

    /// Short label for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}
