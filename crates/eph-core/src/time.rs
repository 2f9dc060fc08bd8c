//! Simulation time model.
//!
//! Time is an integer `Tick` counter; `SimClock` maps it to simulated seconds
//! with a fixed step `dt`.  Keeping the tick integral means "every N ticks"
//! checks are exact even though `dt` is fractional.

use std::fmt;

use crate::error::{ensure_positive, EphError, EphResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The current tick and the fixed integration step.
#[derive(Clone, Debug, PartialEq)]
pub struct SimClock {
    /// Seconds per tick; also the integrator's `dt`.
    pub dt:           f64,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        Self { dt, current_tick: Tick(0) }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick.0 += 1;
    }

    /// Simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.dt
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level settings: step length, duration, seed and threading.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Seconds per tick.  Default: 0.1.
    pub dt: f64,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master seed for scenario randomness.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Emit an agent snapshot every N ticks.  1 = every tick.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt:                    0.1,
            total_ticks:           600,
            seed:                  42,
            num_threads:           None,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.dt)
    }

    pub fn validate(&self) -> EphResult<()> {
        ensure_positive("sim.dt", self.dt)?;
        if self.output_interval_ticks == 0 {
            return Err(EphError::config("sim.output_interval_ticks must be at least 1"));
        }
        if self.num_threads == Some(0) {
            return Err(EphError::config("sim.num_threads must be at least 1 when set"));
        }
        Ok(())
    }
}
