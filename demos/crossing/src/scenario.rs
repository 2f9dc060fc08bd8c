//! Agent layouts for the demo scenarios.
//!
//! Layouts are expressed relative to the world size so a JSON config with a
//! different `world.width`/`world.height` still produces a sensible scene.

use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;

use anyhow::bail;
use eph_agent::{AgentSpec, AgentStore, AgentStoreBuilder};
use eph_core::{EphResult, GroupId, Obstacle, SimRng, Torus, Vec2};
use eph_sim::EphConfig;

/// Half-width of the uniform spawn jitter.  `SPACING - 2·JITTER` stays above
/// one default body diameter.
const JITTER: f64 = 0.2;
const SPACING: f64 = 1.2;
const WALKING_SPEED: f64 = 1.2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Four groups crossing the centre of the world from every side.
    Scramble,
    /// Two counter-flowing groups between rows of obstacles.
    Corridor,
    /// Two agents walking straight at each other.
    HeadOn,
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "scramble" => Ok(Scenario::Scramble),
            "corridor" => Ok(Scenario::Corridor),
            "head-on" => Ok(Scenario::HeadOn),
            other => bail!("unknown scenario {other:?} (expected scramble, corridor or head-on)"),
        }
    }
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Scramble => "scramble",
            Scenario::Corridor => "corridor",
            Scenario::HeadOn => "head-on",
        }
    }

    /// Defaults for this scenario when no config file is given.
    pub fn base_config(self) -> EphConfig {
        let mut config = EphConfig::default();
        match self {
            Scenario::Scramble => {
                config.sim.total_ticks = 400;
            }
            Scenario::Corridor => {
                config.world.width = 40.0;
                config.world.height = 12.0;
                config.sim.total_ticks = 600;
            }
            Scenario::HeadOn => {
                config.sim.total_ticks = 150;
            }
        }
        config
    }

    /// Scenario geometry added on top of whatever the config declares.
    pub fn obstacles(self, config: &EphConfig) -> Vec<Obstacle> {
        match self {
            Scenario::Corridor => corridor_walls(config.world.width, config.world.height),
            Scenario::Scramble | Scenario::HeadOn => Vec::new(),
        }
    }

    pub fn agents(self, config: &EphConfig, rng: &mut SimRng) -> EphResult<AgentStore> {
        let torus = Torus::new(config.world.width, config.world.height);
        let specs = match self {
            Scenario::Scramble => scramble(torus, rng),
            Scenario::Corridor => corridor(torus, rng),
            Scenario::HeadOn => head_on(torus),
        };
        AgentStoreBuilder::new().wrap_into(torus).spawn_all(specs).build()
    }
}

// ── Layouts ───────────────────────────────────────────────────────────────────

fn scramble(torus: Torus, rng: &mut SimRng) -> Vec<AgentSpec> {
    let centre = Vec2::new(torus.width * 0.5, torus.height * 0.5);
    let reach = torus.width.min(torus.height) * 0.3;
    let directions = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0)];

    let mut specs = Vec::new();
    for (g, forward) in directions.into_iter().enumerate() {
        let start = centre - forward * reach;
        for p in block(start, forward, 3, 4, rng) {
            specs.push(
                AgentSpec::new(p)
                    .heading(forward.angle())
                    .goal(p + forward * (2.0 * reach))
                    .goal_velocity(forward * WALKING_SPEED)
                    .group(GroupId(g as u16)),
            );
        }
    }
    specs
}

fn corridor(torus: Torus, rng: &mut SimRng) -> Vec<AgentSpec> {
    let mid_y = torus.height * 0.5;
    let flows = [(torus.width * 0.25, Vec2::new(1.0, 0.0)), (torus.width * 0.75, Vec2::new(-1.0, 0.0))];

    let mut specs = Vec::new();
    for (g, (x, forward)) in flows.into_iter().enumerate() {
        for p in block(Vec2::new(x, mid_y), forward, 5, 3, rng) {
            // No goal position: each group keeps flowing around the torus.
            specs.push(
                AgentSpec::new(p)
                    .velocity(forward * (0.5 * WALKING_SPEED))
                    .goal_velocity(forward * WALKING_SPEED)
                    .group(GroupId(g as u16)),
            );
        }
    }
    specs
}

fn head_on(torus: Torus) -> Vec<AgentSpec> {
    let centre = Vec2::new(torus.width * 0.5, torus.height * 0.5);
    let offset = Vec2::new(6.0, 0.0);
    // A slight lateral offset so the encounter is not perfectly symmetric.
    let west = centre - offset + Vec2::new(0.0, 0.1);
    let east = centre + offset;
    vec![
        AgentSpec::new(west).velocity(Vec2::new(1.0, 0.0)).goal(east).goal_velocity(Vec2::new(1.0, 0.0)),
        AgentSpec::new(east)
            .velocity(Vec2::new(-1.0, 0.0))
            .goal(west)
            .goal_velocity(Vec2::new(1.0, 0.0))
            .group(GroupId(1)),
    ]
}

/// `rows × cols` jittered grid centred on `centre`; rows advance along
/// `forward`.
fn block(centre: Vec2, forward: Vec2, rows: usize, cols: usize, rng: &mut SimRng) -> Vec<Vec2> {
    let lateral = forward.rotate(FRAC_PI_2);
    let row_mid = (rows as f64 - 1.0) * 0.5;
    let col_mid = (cols as f64 - 1.0) * 0.5;
    let mut points = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let along = (r as f64 - row_mid) * SPACING;
            let across = (c as f64 - col_mid) * SPACING;
            points.push(centre + forward * along + lateral * across + rng.jitter(JITTER));
        }
    }
    points
}

/// Two rows of touching circular obstacles at 20 % and 80 % of the height.
fn corridor_walls(width: f64, height: f64) -> Vec<Obstacle> {
    let radius = 0.6;
    let n = (width / (2.0 * radius)).floor().max(1.0) as usize;
    let step = width / n as f64;
    [height * 0.2, height * 0.8]
        .into_iter()
        .flat_map(|y| (0..n).map(move |i| Obstacle::new(Vec2::new((i as f64 + 0.5) * step, y), radius)))
        .collect()
}
