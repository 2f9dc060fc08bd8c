//! `eph-sim` — tick loop orchestrator for the perceptual-haze simulator.
//!
//! # Two-phase tick loop
//!
//! ```text
//! for tick in 0..config.sim.total_ticks:
//!   ① Index:  rebuild the neighbour bucket grid from last tick's positions.
//!   ② Read:   per agent: gather neighbours within sensing range, encode
//!             the saliency map, estimate and compose haze, and call
//!             ActionModel::decide_action (parallel with `parallel`).
//!   ③ Commit: DynamicsIntegrator::step applies every action in
//!             ascending AgentId order, then World::commit_trails
//!             deposits haze trails and decays the grid once.
//! ```
//!
//! Every agent in ② reads the same snapshot, so update order cannot bias
//! the outcome.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the read phase on Rayon's thread pool.            |
//! | `fx-hash`  | FxHash for the neighbour index.                        |
//! | `serde`    | `EphConfig` (and every nested config) is deserializable. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use eph_agent::{AgentSpec, AgentStoreBuilder};
//! use eph_sim::{EphConfig, NoopObserver, SimBuilder};
//!
//! let config = EphConfig::default();
//! let agents = AgentStoreBuilder::new()
//!     .spawn(AgentSpec::new(Vec2::new(5.0, 5.0)).goal(Vec2::new(30.0, 5.0)))
//!     .build()?;
//! let model = config.controller_model()?;
//! let mut sim = SimBuilder::new(config, agents, model).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use config::EphConfig;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use sim::Sim;
