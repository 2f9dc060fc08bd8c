//! `eph-perception` — what an agent sees and how sure it is about it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`grid`]       | `SpmConfig`, `RadialSpacing`, `PolarGrid` (bin geometry)       |
//! | [`field`]      | `BinField` — one scalar per polar bin (haze, precision)        |
//! | [`spm`]        | `SaliencyMap`, `SaliencyEncoder`                               |
//! | [`forecast`]   | Action-conditioned closing-speed forecast of a saliency map    |
//! | [`haze`]       | `HazeConfig`, `SelfHazeEstimator`, stall haze, `compose`       |
//! | [`env_haze`]   | `EnvHazeField` world grid: sample, deposit, decay              |
//! | [`pipeline`]   | `Perception` (encoder + estimator), `Percept`                  |
//!
//! # Per-tick data flow
//!
//! ```text
//! neighbours ──► SaliencyEncoder::encode ──► SaliencyMap
//!                                              │
//!                       SelfHazeEstimator ◄────┘
//!                              │
//!  EnvHazeField::sample ──► compose (per-bin max) ──► precision = 1/(h+ε)
//! ```
//!
//! Everything here is read-only with respect to shared state except
//! [`EnvHazeField::deposit`] and [`EnvHazeField::decay`], which the world
//! calls during the sequential commit phase.

pub mod env_haze;
pub mod field;
pub mod forecast;
pub mod grid;
pub mod haze;
pub mod pipeline;
pub mod spm;

#[cfg(test)]
mod tests;

pub use env_haze::{DepositKind, EnvHazeConfig, EnvHazeField, HazeDeposit};
pub use field::BinField;
pub use grid::{PolarGrid, RadialSpacing, SpmConfig};
pub use haze::{compose, precision, HazeConfig, HazeMode, SelfHazeEstimator, StallConfig};
pub use pipeline::{Percept, Perception};
pub use spm::{SaliencyEncoder, SaliencyMap, CHANNELS};
