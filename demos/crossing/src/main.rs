//! crossing — runs one crowd scenario and writes per-tick diagnostics to
//! `output/<scenario>/`.
//!
//! ```text
//! crossing [scramble|corridor|head-on] [config.json]
//! ```
//!
//! The optional JSON file holds an `EphConfig`; any omitted section keeps its
//! default.  `RUST_LOG` controls log verbosity (default `info`).

mod scenario;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use eph_control::KinematicPredictor;
use eph_core::{SimRng, Tick};
use eph_output::{CsvWriter, OutputWriter, SimOutputObserver};
use eph_perception::SaliencyEncoder;
use eph_sim::{EphConfig, SimBuilder, SimObserver, TickSummary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Log a progress line every this many ticks.
const PROGRESS_INTERVAL: u64 = 50;

// ── Progress observer ─────────────────────────────────────────────────────────

/// Wraps the output observer and logs running totals.
struct Progress<W: OutputWriter> {
    output:        SimOutputObserver<W>,
    contacts:      usize,
    non_converged: usize,
    last:          TickSummary,
}

impl<W: OutputWriter> SimObserver for Progress<W> {
    fn on_tick_start(&mut self, tick: Tick) {
        self.output.on_tick_start(tick);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.contacts += summary.agent_contacts;
        self.non_converged += summary.non_converged;
        self.last = *summary;
        if summary.tick.0.is_multiple_of(PROGRESS_INTERVAL) {
            info!(
                tick = summary.tick.0,
                mean_efe = summary.mean_efe,
                mean_haze = summary.mean_haze,
                mean_speed = summary.mean_speed,
                contacts = summary.agent_contacts,
                stalled = summary.stalled,
                "progress"
            );
        }
        self.output.on_tick_end(summary);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &eph_agent::AgentStore, decisions: &[eph_control::Decision]) {
        self.output.on_snapshot(tick, agents, decisions);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.output.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let scenario: Scenario = args.next().as_deref().unwrap_or("scramble").parse()?;
    let mut config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => scenario.base_config(),
    };
    let walls = scenario.obstacles(&config);
    config.world.obstacles.extend(walls);

    let mut rng = SimRng::new(config.sim.seed);
    let agents = scenario.agents(&config, &mut rng)?;
    let model = config.controller_model()?;

    let mut builder = SimBuilder::new(config.clone(), agents, model);
    if config.use_predictor {
        let encoder = SaliencyEncoder::new(config.spm.clone())?;
        builder = builder.predictor(Arc::new(KinematicPredictor::new(encoder, config.sim.dt)?));
    }
    let mut sim = builder.build()?;

    let out_dir = PathBuf::from("output").join(scenario.name());
    let writer = CsvWriter::new(&out_dir).with_context(|| format!("opening {}", out_dir.display()))?;
    let mut observer = Progress {
        output:        SimOutputObserver::new(writer, &config.sim),
        contacts:      0,
        non_converged: 0,
        last:          TickSummary::default(),
    };

    info!(
        scenario = scenario.name(),
        agents = sim.agents.count,
        obstacles = sim.world.obstacles.len(),
        mode = config.controller.mode.as_str(),
        "starting run"
    );
    let t0 = Instant::now();
    sim.run(&mut observer)?;

    if let Some(e) = observer.output.take_error() {
        warn!("output incomplete: {e}");
        return Err(e.into());
    }
    info!(
        ticks = config.sim.total_ticks,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        total_contacts = observer.contacts,
        non_converged = observer.non_converged,
        final_mean_speed = observer.last.mean_speed,
        output = %out_dir.display(),
        "run complete"
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<EphConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: EphConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
