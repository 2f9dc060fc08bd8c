//! Plain data row types written by output backends.
//!
//! Field order is column order.

use serde::Serialize;

/// One agent's committed state and decision diagnostics at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentSnapshotRow {
    pub agent_id:              u32,
    pub tick:                  u64,
    pub time_secs:             f64,
    pub x:                     f64,
    pub y:                     f64,
    pub vx:                    f64,
    pub vy:                    f64,
    pub heading:               f64,
    /// World-frame action chosen this tick.
    pub ux:                    f64,
    pub uy:                    f64,
    pub efe:                   f64,
    pub haze:                  f64,
    pub surprise:              f64,
    pub converged:             bool,
    pub predictor_unavailable: bool,
}

impl AgentSnapshotRow {
    pub const HEADERS: [&'static str; 15] = [
        "agent_id",
        "tick",
        "time_secs",
        "x",
        "y",
        "vx",
        "vy",
        "heading",
        "ux",
        "uy",
        "efe",
        "haze",
        "surprise",
        "converged",
        "predictor_unavailable",
    ];
}

/// Aggregate statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickSummaryRow {
    pub tick:                  u64,
    pub time_secs:             f64,
    pub agents:                u64,
    pub mean_efe:              f64,
    pub mean_haze:             f64,
    pub mean_speed:            f64,
    pub non_converged:         u64,
    pub predictor_unavailable: u64,
    pub agent_contacts:        u64,
    pub obstacle_contacts:     u64,
    pub haze_deposits:         u64,
    pub stalled:               u64,
}

impl TickSummaryRow {
    pub const HEADERS: [&'static str; 12] = [
        "tick",
        "time_secs",
        "agents",
        "mean_efe",
        "mean_haze",
        "mean_speed",
        "non_converged",
        "predictor_unavailable",
        "agent_contacts",
        "obstacle_contacts",
        "haze_deposits",
        "stalled",
    ];
}
