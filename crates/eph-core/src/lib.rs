//! `eph-core` — foundational types for the perceptual-haze crowd simulator.
//!
//! This crate is a dependency of every other `eph-*` crate.  It intentionally
//! has no `eph-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `GroupId`                                   |
//! | [`geo`]         | `Vec2`, `Torus` (shared toroidal distance), `Obstacle` |
//! | [`kinematics`]  | `BodyState`, `ActuationLimits`                         |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                        |
//! | [`rng`]         | `SimRng` (seeded scenario randomness)                  |
//! | [`error`]       | `EphError`, `EphResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod kinematics;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{ensure_non_negative, ensure_positive, EphError, EphResult};
pub use geo::{normalize_angle, Obstacle, Torus, Vec2, EPSILON};
pub use ids::{AgentId, GroupId};
pub use kinematics::{ActuationLimits, BodyState};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
