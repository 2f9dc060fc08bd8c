//! Core agent storage.
//!
//! The read phase of a tick borrows `&AgentStore` from every worker; only the
//! sequential commit phase (in `eph-world`) writes to it.  All arrays are
//! indexed by `AgentId`.

use eph_core::{AgentId, BodyState, EphError, EphResult, GroupId, Torus, Vec2, EPSILON};

/// Distance from the goal inside which the desired speed ramps down linearly.
pub const GOAL_SLOWDOWN_RADIUS: f64 = 1.0;

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agent state.
///
/// Every `Vec` field has exactly `count` elements; the `AgentId` value is the
/// index into all of them.
#[derive(Debug)]
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    // ── Kinematics ────────────────────────────────────────────────────────
    /// World-frame position, always inside the torus bounds.
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    /// Facing direction in radians; the egocentric frame is built from it.
    pub heading:  Vec<f64>,
    pub radius:   Vec<f64>,

    // ── Goals ─────────────────────────────────────────────────────────────
    /// Optional goal position.  `None` means "keep moving at `goal_velocity`".
    pub goal:          Vec<Option<Vec2>>,
    /// Preferred velocity; with a goal position only its norm is used.
    pub goal_velocity: Vec<Vec2>,

    // ── Controller inputs ─────────────────────────────────────────────────
    /// Personal precision scalar multiplying the safety term.
    pub precision:   Vec<f64>,
    pub group:       Vec<GroupId>,
    /// Action committed last tick, used as the optimizer's warm start.
    pub last_action: Vec<Vec2>,
    /// Consecutive slow ticks, net of fast ones.
    pub stall_ticks: Vec<u32>,
    /// Stall level in `[0, 1]`, scaling the frontal stall haze.
    pub stall_haze:  Vec<f64>,
}

impl AgentStore {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Observable body state of one agent.
    ///
    /// # Panics
    /// Panics if `agent` is out of range; use [`try_body`](Self::try_body) for
    /// ids from untrusted sources.
    #[inline]
    pub fn body(&self, agent: AgentId) -> BodyState {
        let i = agent.index();
        BodyState {
            position: self.position[i],
            velocity: self.velocity[i],
            heading:  self.heading[i],
            radius:   self.radius[i],
        }
    }

    pub fn try_body(&self, agent: AgentId) -> EphResult<BodyState> {
        if agent.index() < self.count {
            Ok(self.body(agent))
        } else {
            Err(EphError::AgentNotFound(agent))
        }
    }

    /// Snapshot of every agent's body state in id order.  This is the shared
    /// read-phase view handed to perception.
    pub fn bodies(&self) -> Vec<BodyState> {
        self.agent_ids().map(|a| self.body(a)).collect()
    }

    /// The velocity the agent would like to have right now.
    ///
    /// With a goal position: `|goal_velocity|` along the toroidal shortest
    /// path to the goal, ramped down inside [`GOAL_SLOWDOWN_RADIUS`].  Without
    /// one: `goal_velocity` unchanged.
    pub fn desired_velocity(&self, agent: AgentId, torus: &Torus) -> Vec2 {
        let i = agent.index();
        let preferred = self.goal_velocity[i];
        match self.goal[i] {
            None => preferred,
            Some(goal) => {
                let to_goal = torus.displacement(self.position[i], goal);
                let dist = to_goal.norm();
                if dist < EPSILON {
                    return Vec2::ZERO;
                }
                let speed = preferred.norm() * (dist / GOAL_SLOWDOWN_RADIUS).min(1.0);
                to_goal * (speed / dist)
            }
        }
    }

    /// Mean speed over all agents; `0.0` for an empty store.
    pub fn mean_speed(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.velocity.iter().map(|v| v.norm()).sum::<f64>() / self.count as f64
    }

    pub(crate) fn with_capacity(count: usize) -> Self {
        Self {
            count:         0,
            position:      Vec::with_capacity(count),
            velocity:      Vec::with_capacity(count),
            heading:       Vec::with_capacity(count),
            radius:        Vec::with_capacity(count),
            goal:          Vec::with_capacity(count),
            goal_velocity: Vec::with_capacity(count),
            precision:     Vec::with_capacity(count),
            group:         Vec::with_capacity(count),
            last_action:   Vec::with_capacity(count),
            stall_ticks:   Vec::with_capacity(count),
            stall_haze:    Vec::with_capacity(count),
        }
    }
}
