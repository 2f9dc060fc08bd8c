//! Simulation observer trait for progress reporting and data collection.

use eph_agent::AgentStore;
use eph_control::Decision;
use eph_core::Tick;

/// Aggregate diagnostics for one committed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickSummary {
    pub tick:                  Tick,
    pub agents:                usize,
    /// Mean EFE over agents whose objective was finite.
    pub mean_efe:              f64,
    pub mean_haze:             f64,
    pub mean_speed:            f64,
    /// Decisions whose optimizer hit `max_iter` above the threshold.
    pub non_converged:         usize,
    /// Decisions made without the requested predictive model.
    pub predictor_unavailable: usize,
    pub agent_contacts:        usize,
    pub obstacle_contacts:     usize,
    /// Trail deposits committed to the environmental haze grid.
    pub haze_deposits:         usize,
    /// Agents whose stall level is above zero after the commit.
    pub stalled:               usize,
}

impl TickSummary {
    pub(crate) fn collect(tick: Tick, agents: &AgentStore, decisions: &[Decision]) -> Self {
        let n = decisions.len();
        let finite: Vec<f64> = decisions
            .iter()
            .map(|d| d.diagnostics.efe)
            .filter(|e| e.is_finite())
            .collect();
        let mean = |sum: f64, count: usize| if count == 0 { 0.0 } else { sum / count as f64 };
        Self {
            tick,
            agents: n,
            mean_efe: mean(finite.iter().sum(), finite.len()),
            mean_haze: mean(decisions.iter().map(|d| d.diagnostics.haze).sum(), n),
            mean_speed: agents.mean_speed(),
            non_converged: decisions.iter().filter(|d| !d.diagnostics.converged).count(),
            predictor_unavailable: decisions
                .iter()
                .filter(|d| d.diagnostics.predictor_unavailable)
                .count(),
            stalled: agents.stall_haze.iter().filter(|&&h| h > 0.0).count(),
            ..Self::default()
        }
    }
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example
///
/// ```rust,ignore
/// struct Progress { interval: u64 }
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, s: &TickSummary) {
///         if s.tick.0 % self.interval == 0 {
///             println!("{}: mean EFE {:.3}", s.tick, s.mean_efe);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the commit phase of each tick.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `sim.output_interval_ticks` ticks).
    ///
    /// `agents` is the committed state after this tick; `decisions[i]` is the
    /// action and diagnostics agent `i` chose during it.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore, _decisions: &[Decision]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
