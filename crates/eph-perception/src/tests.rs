//! Unit tests for eph-perception.

use eph_core::{BodyState, Torus, Vec2};

use crate::{SaliencyEncoder, SpmConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn encoder() -> SaliencyEncoder {
    SaliencyEncoder::new(SpmConfig::default()).unwrap()
}

fn body(x: f64, y: f64, vx: f64, vy: f64) -> BodyState {
    let v = Vec2::new(vx, vy);
    BodyState::new(Vec2::new(x, y), v, 0.0, 0.3)
}

fn world() -> Torus {
    Torus::new(20.0, 20.0)
}

#[cfg(test)]
mod grid_tests {
    use std::f64::consts::PI;

    use crate::{PolarGrid, RadialSpacing, SpmConfig};

    #[test]
    fn log_edges_are_increasing_and_span_range() {
        let grid = PolarGrid::new(&SpmConfig::default()).unwrap();
        let edges = grid.radial_edges();
        assert_eq!(edges.len(), 17);
        assert_eq!(edges[0], 0.0);
        assert_eq!(edges[16], 8.0);
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        for r in 0..grid.n_radial {
            let c = grid.range_center(r);
            assert!(c >= edges[r] && c <= edges[r + 1], "bin {r} centre {c}");
        }
    }

    #[test]
    fn linear_centres_are_midpoints() {
        let cfg = SpmConfig { spacing: RadialSpacing::Linear, n_radial: 4, ..SpmConfig::default() };
        let grid = PolarGrid::new(&cfg).unwrap();
        assert!((grid.range_center(0) - 1.0).abs() < 1e-12);
        assert!((grid.range_center(3) - 7.0).abs() < 1e-12);
        assert_eq!(grid.locate(2.5, 0.0), Some((1, 8)));
    }

    #[test]
    fn locate_rejects_out_of_range_and_fov() {
        let grid = PolarGrid::new(&SpmConfig::default()).unwrap();
        assert_eq!(grid.locate(8.5, 0.0), None);
        assert_eq!(grid.locate(2.0, PI), None);
        assert_eq!(grid.locate(2.0, f64::NAN), None);
        assert!(grid.locate(0.0, 0.0).is_some());
    }

    #[test]
    fn fov_edges_map_to_first_and_last_bins() {
        let grid = PolarGrid::new(&SpmConfig::default()).unwrap();
        let half = grid.half_fov;
        assert_eq!(grid.locate(2.0, -half).map(|b| b.1), Some(0));
        assert_eq!(grid.locate(2.0, half).map(|b| b.1), Some(15));
        assert_eq!(grid.locate(8.0, 0.0).map(|b| b.0), Some(15));
    }

    #[test]
    fn index_coords_roundtrip() {
        let grid = PolarGrid::new(&SpmConfig::default()).unwrap();
        for i in [0, 1, 17, 255] {
            let (r, a) = grid.coords(i);
            assert_eq!(grid.index(r, a), i);
        }
    }

    #[test]
    fn invalid_configs_fail_fast() {
        let base = SpmConfig::default();
        assert!(SpmConfig { n_radial: 0, ..base.clone() }.validate().is_err());
        assert!(SpmConfig { n_angular: 0, ..base.clone() }.validate().is_err());
        assert!(SpmConfig { fov_deg: 400.0, ..base.clone() }.validate().is_err());
        assert!(SpmConfig { d_max: -1.0, ..base.clone() }.validate().is_err());
        assert!(SpmConfig { r_min: 9.0, ..base.clone() }.validate().is_err());
        assert!(SpmConfig { r_min: 9.0, spacing: RadialSpacing::Linear, ..base }.validate().is_ok());
    }
}

#[cfg(test)]
mod spm_tests {
    use eph_core::{Obstacle, Vec2};

    use super::*;

    #[test]
    fn no_neighbors_gives_all_zero_channels() {
        let enc = encoder();
        let map = enc.encode(&body(5.0, 5.0, 1.0, 0.0), &[], &[], &world());
        for c in 0..crate::CHANNELS {
            assert!(map.channels[c].iter().all(|&v| v == 0.0), "channel {c}");
        }
        assert_eq!(map.occupied_count(), 0);
    }

    #[test]
    fn approaching_neighbor_ahead() {
        let enc = encoder();
        let ego = body(5.0, 5.0, 1.0, 0.0);
        let other = body(8.0, 5.0, -1.0, 0.0);
        let map = enc.encode(&ego, &[other], &[], &world());

        let (r, a) = enc.grid.locate(3.0, 0.0).unwrap();
        assert_eq!(a, 8);
        assert_eq!(map.occupied_count(), 1);
        assert!((map.get(0, r, a) - 0.2).abs() < 1e-12);
        assert!((map.get(1, r, a) - 2.0 / 3.0).abs() < 1e-12);
        let expected = 1.0 - (-2.0 / enc.grid.range_center(r)).exp();
        assert!((map.get(2, r, a) - expected).abs() < 1e-12);
    }

    #[test]
    fn occupied_bins_lists_written_bins_in_order() {
        let enc = encoder();
        let ego = body(5.0, 5.0, 1.0, 0.0);
        let map = enc.encode(&ego, &[body(8.0, 5.0, 0.0, 0.0), body(5.0, 7.0, 0.0, 0.0)], &[], &world());
        let ahead = enc.grid.locate(3.0, 0.0).unwrap();
        let left = enc.grid.locate(2.0, std::f64::consts::FRAC_PI_2).unwrap();
        let mut expected = vec![enc.grid.index(ahead.0, ahead.1), enc.grid.index(left.0, left.1)];
        expected.sort_unstable();
        assert_eq!(map.occupied_bins().collect::<Vec<_>>(), expected);
        assert_eq!(enc.empty_map().occupied_bins().count(), 0);
    }

    #[test]
    fn receding_neighbor_has_negative_closing_and_no_risk() {
        let enc = encoder();
        let map = enc.encode(&body(5.0, 5.0, 0.0, 0.0), &[body(7.0, 5.0, 1.5, 0.0)], &[], &world());
        let (r, a) = enc.grid.locate(2.0, 0.0).unwrap();
        assert!((map.get(1, r, a) + 0.5).abs() < 1e-12);
        assert_eq!(map.get(2, r, a), 0.0);
    }

    #[test]
    fn neighbor_behind_is_outside_fov() {
        let enc = encoder();
        let map = enc.encode(&body(5.0, 5.0, 1.0, 0.0), &[body(3.0, 5.0, 1.0, 0.0)], &[], &world());
        assert_eq!(map.occupied_count(), 0);
    }

    #[test]
    fn neighbor_across_the_wrap_is_seen() {
        let enc = encoder();
        let map = enc.encode(&body(19.0, 10.0, 0.0, 0.0), &[body(1.0, 10.0, 0.0, 0.0)], &[], &world());
        let (r, a) = enc.grid.locate(2.0, 0.0).unwrap();
        assert!(map.occupied[enc.grid.index(r, a)]);
    }

    #[test]
    fn same_bin_combines_by_max() {
        let enc = encoder();
        let ego = body(5.0, 5.0, 0.0, 0.0);
        let receding = body(8.0, 5.0, 1.0, 0.0);
        let approaching = body(8.05, 5.0, -2.0, 0.0);
        let map = enc.encode(&ego, &[receding, approaching], &[], &world());
        let (r, a) = enc.grid.locate(3.0, 0.0).unwrap();
        assert_eq!(map.occupied_count(), 1);
        assert!(map.get(1, r, a) > 0.6);
        assert!(map.get(2, r, a) > 0.0);
    }

    #[test]
    fn touching_neighbor_saturates_proximity() {
        let enc = encoder();
        let map = enc.encode(&body(5.0, 5.0, 0.0, 0.0), &[body(5.0, 5.0, 0.0, 0.0)], &[], &world());
        assert_eq!(map.channel_max(0), 1.0);
        assert!(map.flatten().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn obstacles_are_static_neighbors() {
        let enc = encoder();
        let ego = body(5.0, 5.0, 1.0, 0.0);
        let wall = Obstacle::new(Vec2::new(7.0, 5.0), 0.5);
        let map = enc.encode(&ego, &[], &[wall], &world());
        let (r, a) = enc.grid.locate(2.0, 0.0).unwrap();
        assert!((map.get(0, r, a) - 0.4).abs() < 1e-12);
        assert!((map.get(1, r, a) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn channels_stay_in_range_for_random_scenes() {
        let enc = encoder();
        let mut rng = eph_core::SimRng::new(5);
        for _ in 0..100 {
            let ego = BodyState::new(
                Vec2::new(rng.gen_range(0.0..20.0), rng.gen_range(0.0..20.0)),
                Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)),
                rng.gen_range(-3.0..3.0),
                0.3,
            );
            let others: Vec<BodyState> = (0..10)
                .map(|_| body(rng.gen_range(0.0..20.0), rng.gen_range(0.0..20.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)))
                .collect();
            let map = enc.encode(&ego, &others, &[], &world());
            assert!(map.proximity().iter().all(|&v| (0.0..=1.0).contains(&v)));
            assert!(map.closing().iter().all(|&v| (-1.0..=1.0).contains(&v)));
            assert!(map.risk().iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}

#[cfg(test)]
mod forecast_tests {
    use eph_core::Vec2;

    use super::*;
    use crate::BinField;

    #[test]
    fn zero_velocity_change_reproduces_map() {
        let enc = encoder();
        let map = enc.encode(&body(5.0, 5.0, 1.0, 0.0), &[body(8.0, 5.5, -1.0, 0.0)], &[], &world());
        assert_eq!(enc.forecast(&map, Vec2::ZERO), map);
    }

    #[test]
    fn accelerating_toward_threat_raises_risk() {
        let enc = encoder();
        let map = enc.encode(&body(5.0, 5.0, 1.0, 0.0), &[body(8.0, 5.0, -1.0, 0.0)], &[], &world());
        let toward = enc.forecast(&map, Vec2::new(0.5, 0.0));
        let away = enc.forecast(&map, Vec2::new(-0.5, 0.0));
        assert!(toward.channel_max(2) > map.channel_max(2));
        assert!(away.channel_max(2) < map.channel_max(2));
        assert_eq!(toward.proximity(), map.proximity());
    }

    #[test]
    fn weighted_risk_matches_materialised_forecast() {
        let enc = encoder();
        let ego = body(5.0, 5.0, 1.0, 0.0);
        let others = [body(8.0, 5.0, -1.0, 0.0), body(6.0, 7.0, 0.0, -1.0)];
        let map = enc.encode(&ego, &others, &[], &world());
        let precision = BinField::uniform(&enc.grid, 2.0);
        let dv = Vec2::new(0.2, -0.1);
        let expected: f64 = 2.0 * enc.forecast(&map, dv).risk().iter().sum::<f64>();
        assert!((enc.weighted_risk(&map, &precision, dv) - expected).abs() < 1e-12);
    }

    #[test]
    fn encode_ahead_moves_closer_bodies_into_nearer_bins() {
        let enc = encoder();
        let ego = body(5.0, 5.0, 1.0, 0.0);
        let other = body(11.0, 5.0, -1.0, 0.0);
        let now = enc.encode(&ego, &[other], &[], &world());
        let later = enc.encode_ahead(&ego, &[other], &[], &world(), 1.0);
        let (r_now, _) = enc.grid.locate(6.0, 0.0).unwrap();
        let (r_later, _) = enc.grid.locate(4.0, 0.0).unwrap();
        assert!(r_later < r_now);
        assert!(later.occupied[enc.grid.index(r_later, 8)]);
        assert!(later.channel_max(2) > now.channel_max(2));
    }
}

#[cfg(test)]
mod haze_tests {
    use eph_core::SimRng;

    use super::*;
    use crate::{compose, precision, BinField, HazeConfig, HazeMode, SelfHazeEstimator};

    #[test]
    fn precision_is_finite_positive_and_decreasing() {
        let eps = 0.1;
        let mut prev = f64::INFINITY;
        for k in 0..=100 {
            let h = k as f64 / 100.0;
            let p = precision(h, eps);
            assert!(p.is_finite() && p > 0.0);
            assert!(p < prev);
            prev = p;
        }
        assert!((precision(0.0, eps) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn compose_is_commutative_idempotent_and_bounded() {
        let mut rng = SimRng::new(9);
        for _ in 0..200 {
            let a = BinField { n_radial: 4, n_angular: 4, values: (0..16).map(|_| rng.gen_range(0.0..=1.0)).collect() };
            let b = BinField { n_radial: 4, n_angular: 4, values: (0..16).map(|_| rng.gen_range(0.0..=1.0)).collect() };
            assert_eq!(compose(&a, &b), compose(&b, &a));
            assert_eq!(compose(&a, &a), a);
            assert!(compose(&a, &b).values.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn empty_scene_is_fully_hazy() {
        let enc = encoder();
        let est = SelfHazeEstimator::new(HazeConfig::default()).unwrap();
        let map = enc.empty_map();
        let haze = est.estimate(&map);
        assert!(haze.values.iter().all(|&h| (h - 1.0).abs() < 1e-12));
    }

    #[test]
    fn observed_bins_are_clearer() {
        let enc = encoder();
        let est = SelfHazeEstimator::new(HazeConfig::default()).unwrap();
        let map = enc.encode(&body(5.0, 5.0, 0.0, 0.0), &[body(6.0, 5.0, 0.0, 0.0)], &[], &world());
        let haze = est.estimate(&map);
        let (r, a) = enc.grid.locate(1.0, 0.0).unwrap();
        assert!(haze.get(r, a) < 1.0);
        assert!(haze.values.iter().all(|&h| (0.0..=1.0).contains(&h)));
    }

    #[test]
    fn scalar_mode_is_uniform() {
        let enc = encoder();
        let est = SelfHazeEstimator::new(HazeConfig { mode: HazeMode::Scalar, ..HazeConfig::default() }).unwrap();
        let map = enc.encode(&body(5.0, 5.0, 0.0, 0.0), &[body(6.0, 5.0, 0.0, 0.0)], &[], &world());
        let haze = est.estimate(&map);
        let first = haze.values[0];
        assert!(haze.values.iter().all(|&h| h == first));
        assert!(first < 1.0);
    }

    #[test]
    fn zero_h_max_disables_self_haze() {
        let est = SelfHazeEstimator::new(HazeConfig { h_max: 0.0, ..HazeConfig::default() }).unwrap();
        let haze = est.estimate(&encoder().empty_map());
        assert_eq!(haze.max(), 0.0);
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        assert!(SelfHazeEstimator::new(HazeConfig { epsilon: 0.0, ..HazeConfig::default() }).is_err());
        assert!(SelfHazeEstimator::new(HazeConfig { h_max: -1.0, ..HazeConfig::default() }).is_err());
    }
}

#[cfg(test)]
mod env_haze_tests {
    use eph_core::{SimRng, Vec2};

    use super::*;
    use crate::{DepositKind, EnvHazeConfig, EnvHazeField, HazeDeposit};

    fn field(config: EnvHazeConfig) -> EnvHazeField {
        EnvHazeField::new(world(), &config).unwrap()
    }

    #[test]
    fn repellent_deposit_stays_in_upper_band() {
        let mut f = field(EnvHazeConfig::default());
        let p = Vec2::new(3.5, 4.5);
        f.set(p, 0.5);
        f.deposit(p, DepositKind::Repellent, 0.3);
        let v = f.value_at(p);
        assert!((0.5..=1.0).contains(&v), "got {v}");
        f.deposit(p, DepositKind::Repellent, 5.0);
        assert_eq!(f.value_at(p), 1.0);
    }

    #[test]
    fn lubricant_deposit_stays_in_lower_band() {
        let mut f = field(EnvHazeConfig::default());
        let p = Vec2::new(3.5, 4.5);
        f.set(p, 0.5);
        f.deposit(p, DepositKind::Lubricant, 0.3);
        let v = f.value_at(p);
        assert!((0.0..=0.5).contains(&v), "got {v}");
        f.deposit(p, DepositKind::Lubricant, 5.0);
        assert_eq!(f.value_at(p), 0.0);
    }

    #[test]
    fn decay_moves_monotonically_toward_baseline() {
        let mut f = field(EnvHazeConfig { baseline: 0.3, decay_rate: 0.1, ..EnvHazeConfig::default() });
        let mut rng = SimRng::new(21);
        for _ in 0..150 {
            let p = Vec2::new(rng.gen_range(0.0..20.0), rng.gen_range(0.0..20.0));
            f.set(p, rng.gen_range(0.0..=1.0));
        }
        let mut prev: Vec<f64> = f.cells().to_vec();
        for _ in 0..40 {
            f.decay();
            for (&before, &after) in prev.iter().zip(f.cells()) {
                assert!((after - 0.3).abs() <= (before - 0.3).abs());
                assert!((after - 0.3) * (before - 0.3) >= 0.0);
            }
            prev = f.cells().to_vec();
        }
    }

    #[test]
    fn deposits_apply_in_order_and_wrap() {
        let mut f = field(EnvHazeConfig::default());
        let deposits = [
            HazeDeposit { position: Vec2::new(-0.5, 0.5), kind: DepositKind::Repellent, amount: 0.6 },
            HazeDeposit { position: Vec2::new(19.5, 20.5), kind: DepositKind::Lubricant, amount: 0.2 },
        ];
        f.apply_deposits(&deposits);
        assert!((f.value_at(Vec2::new(19.5, 0.5)) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn uniform_field_samples_uniformly() {
        let f = field(EnvHazeConfig { initial: 0.7, ..EnvHazeConfig::default() });
        let enc = encoder();
        let sampled = f.sample(&body(0.2, 19.9, 0.0, 0.0), &enc.grid);
        assert_eq!(sampled.len(), enc.grid.len());
        assert!(sampled.values.iter().all(|&v| (v - 0.7).abs() < 1e-12));
    }

    #[test]
    fn sample_sees_haze_ahead() {
        let mut f = field(EnvHazeConfig::default());
        let ego = body(5.0, 5.0, 0.0, 0.0);
        let enc = encoder();
        let (r, a) = enc.grid.locate(3.0, 0.0).unwrap();
        let target = ego.position + enc.grid.bin_point(r, a);
        f.set(target, 1.0);
        let sampled = f.sample(&ego, &enc.grid);
        assert!(sampled.get(r, a) > 0.0);
        assert_eq!(sampled.get(r, 0), 0.0);
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(EnvHazeField::new(world(), &EnvHazeConfig { cell_size: 0.0, ..EnvHazeConfig::default() }).is_err());
        assert!(EnvHazeField::new(world(), &EnvHazeConfig { decay_rate: 1.5, ..EnvHazeConfig::default() }).is_err());
    }
}

#[cfg(test)]
mod stall_tests {
    use super::*;
    use crate::{HazeConfig, Perception, SelfHazeEstimator, StallConfig};

    #[test]
    fn level_rises_only_past_the_window() {
        let cfg = StallConfig::default();
        let (mut ticks, mut level) = (0, 0.0);
        for _ in 0..cfg.window_ticks {
            (ticks, level) = cfg.advance(ticks, level, 0.0);
        }
        assert_eq!(ticks, 50);
        assert_eq!(level, 0.0);

        (ticks, level) = cfg.advance(ticks, level, 0.0);
        assert_eq!(ticks, 51);
        assert!((level - 0.05).abs() < 1e-12);
        for _ in 0..100 {
            (ticks, level) = cfg.advance(ticks, level, 0.0);
        }
        assert_eq!(level, 1.0);
    }

    #[test]
    fn moving_again_winds_the_stall_down() {
        let cfg = StallConfig::default();
        let (ticks, level) = cfg.advance(60, 0.5, 1.2);
        assert_eq!(ticks, 59);
        assert!((level - 0.55).abs() < 1e-12, "still past the window, got {level}");

        let (mut ticks, mut level) = (0, 0.5);
        for _ in 0..10 {
            (ticks, level) = cfg.advance(ticks, level, 1.2);
        }
        assert_eq!(ticks, 0);
        assert!((level - 0.4).abs() < 1e-9);
        assert_eq!(cfg.advance(0, 0.0, 1.2), (0, 0.0));
        assert_eq!(cfg.advance(0, f64::NAN, 1.2), (0, 0.0));
    }

    #[test]
    fn stall_haze_covers_the_frontal_sector_only() {
        let enc = encoder();
        let est = SelfHazeEstimator::new(HazeConfig::default()).unwrap();
        let field = est.stall_haze(&enc.grid, 0.5);
        for a in 0..enc.grid.n_angular {
            let expected = if enc.grid.bearing_center(a).abs() <= 60f64.to_radians() { 0.5 } else { 0.0 };
            for r in 0..enc.grid.n_radial {
                assert_eq!(field.get(r, a), expected, "bin ({r}, {a})");
            }
        }
        assert_eq!(est.stall_haze(&enc.grid, 0.0).max(), 0.0);
    }

    #[test]
    fn stalled_agent_loses_frontal_precision() {
        let perception = Perception::new(SpmConfig::default(), HazeConfig::default()).unwrap();
        let ego = body(5.0, 5.0, 0.0, 0.0);
        let blocker = [body(6.5, 5.0, 0.0, 0.0)];
        let flanker = [body(5.0, 6.5, 0.0, 0.0)];

        let front = perception.encoder.grid.locate(1.5, 0.0).unwrap();
        let free = perception.perceive_stalled(&ego, &blocker, &[], &world(), None, 0.0);
        let stuck = perception.perceive_stalled(&ego, &blocker, &[], &world(), None, 0.8);
        assert_eq!(free.precision, perception.perceive(&ego, &blocker, &[], &world(), None).precision);
        assert!(stuck.precision.get(front.0, front.1) < free.precision.get(front.0, front.1));
        assert!((stuck.self_haze.get(front.0, front.1) - 0.8).abs() < 1e-12);

        // Bearing 90° lies outside the frontal sector.
        let side = perception.encoder.grid.locate(1.5, std::f64::consts::FRAC_PI_2).unwrap();
        let free = perception.perceive_stalled(&ego, &flanker, &[], &world(), None, 0.0);
        let stuck = perception.perceive_stalled(&ego, &flanker, &[], &world(), None, 0.8);
        assert_eq!(stuck.precision.get(side.0, side.1), free.precision.get(side.0, side.1));
    }

    #[test]
    fn wide_frontal_sector_is_rejected() {
        let stall = StallConfig { frontal_half_angle_deg: 200.0, ..StallConfig::default() };
        assert!(SelfHazeEstimator::new(HazeConfig { stall, ..HazeConfig::default() }).is_err());
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use crate::{EnvHazeConfig, EnvHazeField, HazeConfig, Perception};

    #[test]
    fn env_haze_raises_composed_haze() {
        let perception = Perception::new(SpmConfig::default(), HazeConfig { h_max: 0.2, ..HazeConfig::default() }).unwrap();
        let env = EnvHazeField::new(world(), &EnvHazeConfig { initial: 0.9, ..EnvHazeConfig::default() }).unwrap();
        let ego = body(5.0, 5.0, 1.0, 0.0);

        let without = perception.perceive(&ego, &[], &[], &world(), None);
        assert!(without.env_haze.is_none());
        assert_eq!(without.haze, without.self_haze);

        let with = perception.perceive(&ego, &[], &[], &world(), Some(&env));
        assert!((with.haze.mean() - 0.9).abs() < 1e-9);
        assert!(with.precision.max() < without.precision.min());
        assert_eq!(perception.self_precision(&with), without.precision);
    }

    #[test]
    fn percept_shapes_agree() {
        let perception = Perception::new(SpmConfig::default(), HazeConfig::default()).unwrap();
        let p = perception.perceive(&body(5.0, 5.0, 0.0, 0.0), &[body(6.0, 5.5, 0.0, 0.0)], &[], &world(), None);
        assert_eq!(p.spm.bins(), p.haze.len());
        assert_eq!(p.precision.len(), p.haze.len());
        assert!(p.precision.values.iter().all(|v| v.is_finite() && *v > 0.0));
    }
}
