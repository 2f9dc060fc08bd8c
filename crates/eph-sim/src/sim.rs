//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use eph_agent::AgentStore;
use eph_control::{ActionModel, Decision, PerceptionFrame, PredictiveModel, TickContext};
use eph_core::{AgentId, BodyState, SimClock, Tick, Vec2};
use eph_perception::Perception;
use eph_world::{DynamicsIntegrator, SpatialIndex, World};
use tracing::debug;

use crate::{EphConfig, SimObserver, SimResult, TickSummary};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<M>` owns all simulation state and drives the two-phase tick:
///
/// 1. **Read phase** (optionally parallel with the `parallel` feature):
///    every agent perceives last tick's snapshot and calls
///    [`ActionModel::decide_action`].  Nothing is written.
/// 2. **Commit phase** (sequential, ascending `AgentId`): the integrator
///    applies all actions, stall counters follow the committed speeds, then
///    haze trails are deposited and the haze grid decays once.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<M: ActionModel> {
    /// Full run configuration, validated at build time.
    pub config: EphConfig,

    pub clock: SimClock,

    /// Agent state (SoA arrays).  Written only in the commit phase.
    pub agents: AgentStore,

    /// Torus, obstacles and environmental haze grid.
    pub world: World,

    /// Shared encoder and self-haze estimator.
    pub perception: Perception,

    pub integrator: DynamicsIntegrator,

    /// The action model.  Called once per agent per tick.
    pub model: M,

    /// The predictive model handle, when one was supplied.
    pub predictor: Option<Arc<dyn PredictiveModel>>,

    /// Decisions from the most recent tick, indexed by `AgentId`.
    pub decisions: Vec<Decision>,

    /// Neighbours beyond this centre distance are not perceived.
    pub(crate) sensing_radius: f64,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<M: ActionModel> Sim<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.sim.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.sim.end_tick() {
                break;
            }
            self.observed_tick(now, observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            self.observed_tick(now, observer);
        }
        Ok(())
    }

    /// Process one tick without an observer.
    pub fn step(&mut self) -> TickSummary {
        let now = self.clock.current_tick;
        let summary = self.process_tick(now);
        self.clock.advance();
        summary
    }

    /// Whether decisions are being made with a predictive model.
    pub fn predictor_available(&self) -> bool {
        self.predictor.is_some()
    }

    fn observed_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) {
        observer.on_tick_start(now);
        let summary = self.process_tick(now);
        observer.on_tick_end(&summary);
        if now.0.is_multiple_of(self.config.sim.output_interval_ticks) {
            observer.on_snapshot(now, &self.agents, &self.decisions);
        }
        self.clock.advance();
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> TickSummary {
        // ── Read phase ────────────────────────────────────────────────────
        self.decisions = self.compute_decisions(now);

        // ── Commit phase ──────────────────────────────────────────────────
        let actions: Vec<Vec2> = self.decisions.iter().map(|d| d.action).collect();
        let report = self.integrator.step(&mut self.agents, &actions, &self.world);
        self.track_stalls();
        let haze_deposits = self.world.commit_trails(&self.agents.position);

        let summary = TickSummary {
            agent_contacts: report.agent_contacts,
            obstacle_contacts: report.obstacle_contacts,
            haze_deposits,
            ..TickSummary::collect(now, &self.agents, &self.decisions)
        };
        debug!(
            tick = now.0,
            mean_efe = summary.mean_efe,
            mean_haze = summary.mean_haze,
            non_converged = summary.non_converged,
            contacts = summary.agent_contacts,
            "tick committed"
        );
        summary
    }

    fn track_stalls(&mut self) {
        let stall = &self.perception.estimator.config.stall;
        let agents = &mut self.agents;
        for i in 0..agents.count {
            let (ticks, level) = stall.advance(agents.stall_ticks[i], agents.stall_haze[i], agents.velocity[i].norm());
            agents.stall_ticks[i] = ticks;
            agents.stall_haze[i] = level;
        }
    }

    /// Perceive and decide for every agent against the same snapshot.
    ///
    /// With the `parallel` Cargo feature this runs on Rayon's thread pool;
    /// results are collected in ascending `AgentId` order either way.
    fn compute_decisions(&self, now: Tick) -> Vec<Decision> {
        // Explicit field borrows so the closure only captures shared data.
        let agents     = &self.agents;
        let world      = &self.world;
        let perception = &self.perception;
        let model      = &self.model;
        let radius     = self.sensing_radius;

        let bodies = agents.bodies();
        let index = SpatialIndex::build(world.torus, &agents.position, radius);
        let ctx = TickContext {
            tick:       now,
            dt:         self.clock.dt,
            torus:      &world.torus,
            obstacles:  &world.obstacles,
            perception,
            limits:     self.integrator.limits,
            predictor:  self.predictor.as_deref(),
        };

        let decide = |i: usize| -> Decision {
            let agent = AgentId(i as u32);
            let ego = bodies[i];
            let neighbors: Vec<BodyState> = index
                .neighbors_of(agent, radius)
                .into_iter()
                .map(|j| bodies[j.index()])
                .collect();
            let percept = perception.perceive_stalled(
                &ego,
                &neighbors,
                &world.obstacles,
                &world.torus,
                world.haze(),
                agents.stall_haze[i],
            );
            let frame = PerceptionFrame {
                agent,
                ego,
                desired_velocity:   agents.desired_velocity(agent, &world.torus),
                personal_precision: agents.precision[i],
                neighbors:          &neighbors,
                percept,
                warm_start:         agents.last_action[i],
            };
            model.decide_action(&frame, &ctx)
        };

        #[cfg(not(feature = "parallel"))]
        {
            (0..agents.count).map(decide).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let run = || -> Vec<Decision> { (0..agents.count).into_par_iter().map(decide).collect() };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }
    }
}
