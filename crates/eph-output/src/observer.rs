//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use eph_agent::AgentStore;
use eph_control::Decision;
use eph_core::{SimConfig, Tick};
use eph_sim::{SimObserver, TickSummary};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    dt:         f64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config.dt` for the time
    /// column.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self { writer, dt: config.dt, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn time_secs(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.dt
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:                  summary.tick.0,
            time_secs:             self.time_secs(summary.tick),
            agents:                summary.agents as u64,
            mean_efe:              summary.mean_efe,
            mean_haze:             summary.mean_haze,
            mean_speed:            summary.mean_speed,
            non_converged:         summary.non_converged as u64,
            predictor_unavailable: summary.predictor_unavailable as u64,
            agent_contacts:        summary.agent_contacts as u64,
            obstacle_contacts:     summary.obstacle_contacts as u64,
            haze_deposits:         summary.haze_deposits as u64,
            stalled:               summary.stalled as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, decisions: &[Decision]) {
        let time_secs = self.time_secs(tick);
        let rows: Vec<AgentSnapshotRow> = (0..agents.count)
            .map(|i| {
                let decision = decisions.get(i).copied().unwrap_or_default();
                let d = decision.diagnostics;
                AgentSnapshotRow {
                    agent_id:              i as u32,
                    tick:                  tick.0,
                    time_secs,
                    x:                     agents.position[i].x,
                    y:                     agents.position[i].y,
                    vx:                    agents.velocity[i].x,
                    vy:                    agents.velocity[i].y,
                    heading:               agents.heading[i],
                    ux:                    decision.action.x,
                    uy:                    decision.action.y,
                    efe:                   d.efe,
                    haze:                  d.haze,
                    surprise:              d.surprise,
                    converged:             d.converged,
                    predictor_unavailable: d.predictor_unavailable,
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
