//! `eph-world` — the shared environment and how bodies move through it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`config`]      | `WorldConfig`, `TrailConfig`, `DynamicsConfig`             |
//! | [`world`]       | `World` — torus, obstacles, optional environmental haze    |
//! | [`index`]       | `SpatialIndex` — uniform bucket grid over the torus        |
//! | [`integrator`]  | `DynamicsIntegrator`, `StepReport`                         |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash for the neighbour bucket map.                       |
//! | `serde`   | Derives `Serialize`/`Deserialize` on configuration types.  |
//!
//! The world is mutated only in the sequential commit phase: the integrator
//! writes agent kinematics and [`World::commit_trails`] writes the haze grid.

pub mod config;
pub mod index;
pub mod integrator;
pub mod world;

#[cfg(test)]
mod tests;

pub use config::{DynamicsConfig, TrailConfig, WorldConfig};
pub use index::SpatialIndex;
pub use integrator::{DynamicsIntegrator, StepReport};
pub use world::World;
