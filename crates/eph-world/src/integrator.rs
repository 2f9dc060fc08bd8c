//! Applies chosen actions to agent kinematics.
//!
//! # Step (per agent, ascending id)
//!
//! 1. Clamp the action to `±u_max` per component.
//! 2. `v ← v + u·dt`.
//! 3. Remove velocity components pointing into any obstacle closer than
//!    `obstacle_clearance ×` contact distance.
//! 4. Clamp `‖v‖` to `max_speed`.
//! 5. `p ← wrap(p + v·dt)` (semi-implicit Euler); heading follows `v` above
//!    `min_heading_speed`.
//!
//! Then, if enabled, overlaps are resolved: agent pairs are pushed apart
//! half each along the line of centres, and agents overlapping an obstacle
//! are pushed out with their inward velocity removed.  Coincident centres use
//! a fixed +x normal.

use eph_agent::AgentStore;
use eph_core::{ensure_positive, ActuationLimits, AgentId, EphResult, Obstacle, Torus, Vec2, EPSILON};
use tracing::debug;

use crate::{DynamicsConfig, SpatialIndex, World};

/// Used when two centres coincide and no line of centres exists.
const FALLBACK_NORMAL: Vec2 = Vec2::new(1.0, 0.0);

/// Contacts resolved during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub agent_contacts:    usize,
    pub obstacle_contacts: usize,
}

#[derive(Clone, Debug)]
pub struct DynamicsIntegrator {
    pub config: DynamicsConfig,
    pub limits: ActuationLimits,
    pub dt:     f64,
}

impl DynamicsIntegrator {
    pub fn new(config: DynamicsConfig, limits: ActuationLimits, dt: f64) -> EphResult<Self> {
        config.validate()?;
        limits.validate()?;
        ensure_positive("dynamics dt", dt)?;
        Ok(Self { config, limits, dt })
    }

    /// Advance every agent by one step.  `actions` is indexed by `AgentId`;
    /// missing entries count as the zero action.
    pub fn step(&self, agents: &mut AgentStore, actions: &[Vec2], world: &World) -> StepReport {
        let torus = world.torus;
        for i in 0..agents.count {
            let u = actions.get(i).copied().filter(|u| u.is_finite()).unwrap_or(Vec2::ZERO);
            let u = self.limits.clamp_action(u);

            let mut v = agents.velocity[i] + u * self.dt;
            v = self.block_obstacles(agents.position[i], agents.radius[i], v, &world.obstacles, &torus);
            v = v.clamp_norm(self.limits.max_speed);

            agents.position[i] = torus.wrap(agents.position[i] + v * self.dt);
            agents.velocity[i] = v;
            if v.norm() > self.config.min_heading_speed {
                agents.heading[i] = v.angle();
            }
            agents.last_action[i] = u;
        }

        let mut report = StepReport::default();
        if self.config.resolve_collisions {
            report.agent_contacts = resolve_agent_overlaps(agents, &torus);
            report.obstacle_contacts = resolve_obstacle_overlaps(agents, &world.obstacles, &torus);
        }
        if report.agent_contacts + report.obstacle_contacts > 0 {
            debug!(
                agent_contacts = report.agent_contacts,
                obstacle_contacts = report.obstacle_contacts,
                "resolved overlaps"
            );
        }
        report
    }

    fn block_obstacles(&self, p: Vec2, radius: f64, mut v: Vec2, obstacles: &[Obstacle], torus: &Torus) -> Vec2 {
        for o in obstacles {
            let to_center = torus.displacement(p, o.center);
            let dist = to_center.norm();
            if dist >= self.config.obstacle_clearance * (radius + o.radius) {
                continue;
            }
            let n = if dist < EPSILON { FALLBACK_NORMAL } else { to_center * (1.0 / dist) };
            let inward = v.dot(n);
            if inward > 0.0 {
                v -= n * inward;
            }
        }
        v
    }
}

fn resolve_agent_overlaps(agents: &mut AgentStore, torus: &Torus) -> usize {
    if agents.count < 2 {
        return 0;
    }
    let max_radius = agents.radius.iter().copied().fold(0.0, f64::max);
    let reach = 2.0 * max_radius;
    let index = SpatialIndex::build(*torus, &agents.position, reach);

    let mut contacts = 0;
    for i in 0..agents.count {
        for j in index.neighbors_of(AgentId(i as u32), reach) {
            let j = j.index();
            if j <= i {
                continue;
            }
            let d = torus.displacement(agents.position[i], agents.position[j]);
            let dist = d.norm();
            let overlap = agents.radius[i] + agents.radius[j] - dist;
            if overlap <= 0.0 {
                continue;
            }
            let n = if dist < EPSILON { FALLBACK_NORMAL } else { d * (1.0 / dist) };
            agents.position[i] = torus.wrap(agents.position[i] - n * (overlap * 0.5));
            agents.position[j] = torus.wrap(agents.position[j] + n * (overlap * 0.5));
            contacts += 1;
        }
    }
    contacts
}

fn resolve_obstacle_overlaps(agents: &mut AgentStore, obstacles: &[Obstacle], torus: &Torus) -> usize {
    let mut contacts = 0;
    for i in 0..agents.count {
        for o in obstacles {
            let d = torus.displacement(o.center, agents.position[i]);
            let dist = d.norm();
            let overlap = agents.radius[i] + o.radius - dist;
            if overlap <= 0.0 {
                continue;
            }
            let n = if dist < EPSILON { FALLBACK_NORMAL } else { d * (1.0 / dist) };
            agents.position[i] = torus.wrap(agents.position[i] + n * overlap);
            let vn = agents.velocity[i].dot(n);
            if vn < 0.0 {
                agents.velocity[i] -= n * vn;
            }
            contacts += 1;
        }
    }
    contacts
}
