//! `eph-control` — per-agent action selection.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`model`]       | `ActionModel` trait, `TickContext`, `PerceptionFrame`, `Decision` |
//! | [`predictor`]   | `PredictiveModel` contract, `Latent`, `KinematicPredictor`      |
//! | [`objective`]   | `Objective` — the expected-free-energy of one candidate action  |
//! | [`controller`]  | `ControllerConfig`, `ControlMode`, `EfeController`              |
//! | [`hold`]        | `HoldCourse` — zero-action model                                |
//!
//! # Design notes
//!
//! Action selection runs in the read phase of the two-phase tick: every
//! agent's [`ActionModel::decide_action`] only reads its own
//! [`PerceptionFrame`] and the shared [`TickContext`], so models need only be
//! `Send + Sync` and the simulation may call them in parallel.
//!
//! The action `u` is a world-frame acceleration command bounded per component
//! by `u_max`.  Predictive models are always queried with the ego-frame
//! rotation of `u`.

pub mod controller;
pub mod hold;
pub mod model;
pub mod objective;
pub mod predictor;


pub use controller::{ControlMode, ControllerConfig, EfeController, LookaheadConfig};
pub use hold::HoldCourse;
pub use model::{ActionModel, Decision, Diagnostics, PerceptionFrame, TickContext};
pub use objective::{EfeTerms, Objective};
pub use predictor::{KinematicPredictor, Latent, PredictiveModel};
