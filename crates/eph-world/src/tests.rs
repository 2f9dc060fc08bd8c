//! Unit tests for eph-world.

use eph_agent::{AgentSpec, AgentStore, AgentStoreBuilder};
use eph_core::{ActuationLimits, Torus, Vec2};

use crate::{DynamicsConfig, DynamicsIntegrator, World, WorldConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn store(specs: Vec<AgentSpec>) -> AgentStore {
    AgentStoreBuilder::new().spawn_all(specs).build().unwrap()
}

fn integrator() -> DynamicsIntegrator {
    DynamicsIntegrator::new(DynamicsConfig::default(), ActuationLimits::default(), 0.1).unwrap()
}

fn open_world() -> World {
    World::new(&WorldConfig { width: 20.0, height: 20.0, ..WorldConfig::default() }).unwrap()
}

#[cfg(test)]
mod index_tests {
    use eph_core::{AgentId, SimRng};

    use super::*;
    use crate::SpatialIndex;

    #[test]
    fn query_matches_brute_force() {
        let torus = Torus::new(30.0, 20.0);
        let mut rng = SimRng::new(4);
        let positions: Vec<Vec2> = (0..300)
            .map(|_| Vec2::new(rng.gen_range(0.0..30.0), rng.gen_range(0.0..20.0)))
            .collect();
        let index = SpatialIndex::build(torus, &positions, 2.0);
        for _ in 0..50 {
            let p = Vec2::new(rng.gen_range(0.0..30.0), rng.gen_range(0.0..20.0));
            let radius = rng.gen_range(0.0..9.0);
            let expected: Vec<AgentId> = positions
                .iter()
                .enumerate()
                .filter(|(_, q)| torus.distance(p, **q) <= radius)
                .map(|(i, _)| AgentId(i as u32))
                .collect();
            assert_eq!(index.query(p, radius), expected);
        }
    }

    #[test]
    fn query_wraps_across_edges() {
        let torus = Torus::new(10.0, 10.0);
        let positions = [Vec2::new(0.2, 5.0), Vec2::new(9.9, 5.0), Vec2::new(5.0, 5.0)];
        let index = SpatialIndex::build(torus, &positions, 1.0);
        assert_eq!(index.query(Vec2::new(0.0, 5.0), 0.5), vec![AgentId(0), AgentId(1)]);
        assert_eq!(index.neighbors_of(AgentId(1), 0.5), vec![AgentId(0)]);
    }

    #[test]
    fn huge_radius_returns_everyone_once() {
        let torus = Torus::new(10.0, 10.0);
        let positions = [Vec2::new(1.0, 1.0), Vec2::new(6.0, 6.0)];
        let index = SpatialIndex::build(torus, &positions, 1.0);
        assert_eq!(index.query(Vec2::ZERO, 1e9), vec![AgentId(0), AgentId(1)]);
        assert!(index.query(Vec2::ZERO, -1.0).is_empty());
    }
}

#[cfg(test)]
mod integrator_tests {
    use eph_core::Obstacle;

    use super::*;

    #[test]
    fn semi_implicit_step_uses_new_velocity() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0)).velocity(Vec2::new(1.0, 0.0))]);
        integrator().step(&mut agents, &[Vec2::new(1.0, 0.0)], &open_world());
        assert!((agents.velocity[0].x - 1.1).abs() < 1e-12);
        assert!((agents.position[0].x - 5.11).abs() < 1e-12);
        assert_eq!(agents.last_action[0], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn action_and_speed_are_clamped() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0)).velocity(Vec2::new(1.4, 0.0))]);
        integrator().step(&mut agents, &[Vec2::new(100.0, 0.0)], &open_world());
        assert_eq!(agents.last_action[0], Vec2::new(2.0, 0.0));
        assert!((agents.velocity[0].norm() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn position_wraps_and_heading_follows_velocity() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(19.95, 0.02)).velocity(Vec2::new(1.0, -1.0))]);
        integrator().step(&mut agents, &[], &open_world());
        let p = agents.position[0];
        assert!(p.x >= 0.0 && p.x < 20.0 && p.y >= 0.0 && p.y < 20.0, "got {p}");
        assert!((agents.heading[0] + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn slow_agents_keep_heading() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0)).heading(1.0)]);
        integrator().step(&mut agents, &[Vec2::new(0.1, 0.0)], &open_world());
        assert_eq!(agents.heading[0], 1.0);
    }

    #[test]
    fn non_finite_action_counts_as_zero() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0)).velocity(Vec2::new(0.5, 0.0))]);
        integrator().step(&mut agents, &[Vec2::new(f64::NAN, 1.0)], &open_world());
        assert_eq!(agents.velocity[0], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn overlapping_agents_are_split_half_and_half() {
        let mut agents = store(vec![
            AgentSpec::new(Vec2::new(5.0, 5.0)),
            AgentSpec::new(Vec2::new(5.4, 5.0)),
        ]);
        let report = integrator().step(&mut agents, &[], &open_world());
        assert_eq!(report.agent_contacts, 1);
        assert!((agents.position[0].x - 4.9).abs() < 1e-12);
        assert!((agents.position[1].x - 5.5).abs() < 1e-12);
    }

    #[test]
    fn coincident_agents_use_fallback_normal() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0)), AgentSpec::new(Vec2::new(5.0, 5.0))]);
        integrator().step(&mut agents, &[], &open_world());
        let gap = open_world().torus.distance(agents.position[0], agents.position[1]);
        assert!((gap - 0.6).abs() < 1e-12);
        assert!(agents.position.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn overlap_across_wrap_is_resolved() {
        let mut agents = store(vec![AgentSpec::new(Vec2::new(19.9, 5.0)), AgentSpec::new(Vec2::new(0.1, 5.0))]);
        let report = integrator().step(&mut agents, &[], &open_world());
        assert_eq!(report.agent_contacts, 1);
        let gap = open_world().torus.distance(agents.position[0], agents.position[1]);
        assert!((gap - 0.6).abs() < 1e-9);
    }

    #[test]
    fn obstacle_blocks_inward_velocity() {
        let world = World::new(&WorldConfig {
            width: 20.0,
            height: 20.0,
            obstacles: vec![Obstacle::new(Vec2::new(6.0, 5.0), 0.6)],
            ..WorldConfig::default()
        })
        .unwrap();
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.05, 5.0)).velocity(Vec2::new(1.0, 0.5))]);
        integrator().step(&mut agents, &[], &world);
        assert!(agents.velocity[0].x.abs() < 1e-12);
        assert!((agents.velocity[0].y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn agent_inside_obstacle_is_pushed_out() {
        let world = World::new(&WorldConfig {
            width: 20.0,
            height: 20.0,
            obstacles: vec![Obstacle::new(Vec2::new(6.0, 5.0), 1.0)],
            ..WorldConfig::default()
        })
        .unwrap();
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0))]);
        let report = integrator().step(&mut agents, &[], &world);
        assert_eq!(report.obstacle_contacts, 1);
        assert!((agents.position[0].x - 4.7).abs() < 1e-12);
    }

    #[test]
    fn collisions_can_be_disabled() {
        let cfg = DynamicsConfig { resolve_collisions: false, ..DynamicsConfig::default() };
        let integ = DynamicsIntegrator::new(cfg, ActuationLimits::default(), 0.1).unwrap();
        let mut agents = store(vec![AgentSpec::new(Vec2::new(5.0, 5.0)), AgentSpec::new(Vec2::new(5.1, 5.0))]);
        let report = integ.step(&mut agents, &[], &open_world());
        assert_eq!(report.agent_contacts, 0);
        assert_eq!(agents.position[1], Vec2::new(5.1, 5.0));
    }
}

#[cfg(test)]
mod world_tests {
    use eph_perception::{DepositKind, EnvHazeConfig};

    use super::*;
    use crate::TrailConfig;

    fn hazy_config(trail: Option<TrailConfig>) -> WorldConfig {
        WorldConfig {
            width: 10.0,
            height: 10.0,
            env_haze: Some(EnvHazeConfig { decay_rate: 0.5, ..EnvHazeConfig::default() }),
            trail,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn trails_deposit_then_decay_once() {
        let trail = TrailConfig { kind: DepositKind::Repellent, amount: 0.4 };
        let mut world = World::new(&hazy_config(Some(trail))).unwrap();
        let p = Vec2::new(2.5, 2.5);
        let n = world.commit_trails(&[p, p]);
        assert_eq!(n, 2);
        let haze = world.haze().unwrap();
        assert!((haze.value_at(p) - 0.4).abs() < 1e-12);
        assert_eq!(haze.value_at(Vec2::new(7.5, 7.5)), 0.0);
    }

    #[test]
    fn no_trail_still_decays() {
        let mut world = World::new(&hazy_config(None)).unwrap();
        let p = Vec2::new(1.0, 1.0);
        world.deposit(eph_perception::HazeDeposit { position: p, kind: DepositKind::Repellent, amount: 0.8 });
        assert_eq!(world.commit_trails(&[p]), 0);
        assert!((world.haze().unwrap().value_at(p) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn no_haze_grid_is_inert() {
        let mut world = open_world();
        assert!(world.haze().is_none());
        assert_eq!(world.commit_trails(&[Vec2::ZERO]), 0);
        world.decay_haze();
    }

    #[test]
    fn config_validation() {
        assert!(WorldConfig { width: 0.0, ..WorldConfig::default() }.validate().is_err());
        let trail = TrailConfig { kind: DepositKind::Lubricant, amount: 0.1 };
        assert!(WorldConfig { trail: Some(trail), ..WorldConfig::default() }.validate().is_err());
        let bad_obstacle = WorldConfig {
            obstacles: vec![eph_core::Obstacle::new(Vec2::ZERO, -1.0)],
            ..WorldConfig::default()
        };
        assert!(World::new(&bad_obstacle).is_err());
    }
}
