//! Fluent builder for constructing an `AgentStore`.
//!
//! # Usage
//!
//! ```rust
//! use eph_agent::{AgentSpec, AgentStoreBuilder};
//! use eph_core::Vec2;
//!
//! let store = AgentStoreBuilder::new()
//!     .spawn(AgentSpec::new(Vec2::new(1.0, 1.0)).goal_velocity(Vec2::new(1.0, 0.0)))
//!     .spawn(AgentSpec::new(Vec2::new(9.0, 1.0)).goal_velocity(Vec2::new(-1.0, 0.0)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.count, 2);
//! ```

use eph_core::{ensure_positive, EphError, EphResult, GroupId, Torus, Vec2, EPSILON};

use crate::AgentStore;

/// Initial state of one agent.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSpec {
    pub position:      Vec2,
    pub velocity:      Vec2,
    /// Explicit heading.  When `None` the heading follows the initial
    /// velocity, then the goal direction, then +x.
    pub heading:       Option<f64>,
    pub radius:        f64,
    pub goal:          Option<Vec2>,
    pub goal_velocity: Vec2,
    pub precision:     f64,
    pub group:         GroupId,
}

impl AgentSpec {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity:      Vec2::ZERO,
            heading:       None,
            radius:        0.3,
            goal:          None,
            goal_velocity: Vec2::ZERO,
            precision:     1.0,
            group:         GroupId(0),
        }
    }

    pub fn velocity(mut self, v: Vec2) -> Self {
        self.velocity = v;
        self
    }

    pub fn heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn radius(mut self, r: f64) -> Self {
        self.radius = r;
        self
    }

    pub fn goal(mut self, goal: Vec2) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn goal_velocity(mut self, v: Vec2) -> Self {
        self.goal_velocity = v;
        self
    }

    pub fn precision(mut self, p: f64) -> Self {
        self.precision = p;
        self
    }

    pub fn group(mut self, g: GroupId) -> Self {
        self.group = g;
        self
    }

    fn resolved_heading(&self) -> f64 {
        if let Some(h) = self.heading {
            return h;
        }
        if self.velocity.norm() > EPSILON {
            self.velocity.angle()
        } else if self.goal_velocity.norm() > EPSILON {
            self.goal_velocity.angle()
        } else {
            0.0
        }
    }

    fn validate(&self, index: usize) -> EphResult<()> {
        if !self.position.is_finite() || !self.velocity.is_finite() || !self.goal_velocity.is_finite() {
            return Err(EphError::config(format!("agent {index}: non-finite initial state")));
        }
        ensure_positive(&format!("agent {index} radius"), self.radius)?;
        ensure_positive(&format!("agent {index} precision"), self.precision)
    }
}

/// Fluent builder for [`AgentStore`].
///
/// Specs are validated at [`build`](Self::build); a negative radius or
/// precision is a configuration error, not something clamped later.
#[derive(Default)]
pub struct AgentStoreBuilder {
    specs: Vec<AgentSpec>,
    torus: Option<Torus>,
}

impl AgentStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(mut self, spec: AgentSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn spawn_all(mut self, specs: impl IntoIterator<Item = AgentSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Wrap initial positions (and goals) into these bounds at build time.
    pub fn wrap_into(mut self, torus: Torus) -> Self {
        self.torus = Some(torus);
        self
    }

    pub fn build(self) -> EphResult<AgentStore> {
        let mut store = AgentStore::with_capacity(self.specs.len());
        for (i, spec) in self.specs.iter().enumerate() {
            spec.validate(i)?;
            let wrap = |p: Vec2| self.torus.map_or(p, |t| t.wrap(p));
            store.position.push(wrap(spec.position));
            store.velocity.push(spec.velocity);
            store.heading.push(spec.resolved_heading());
            store.radius.push(spec.radius);
            store.goal.push(spec.goal.map(wrap));
            store.goal_velocity.push(spec.goal_velocity);
            store.precision.push(spec.precision);
            store.group.push(spec.group);
            store.last_action.push(Vec2::ZERO);
            store.stall_ticks.push(0);
            store.stall_haze.push(0.0);
        }
        store.count = self.specs.len();
        Ok(store)
    }
}
