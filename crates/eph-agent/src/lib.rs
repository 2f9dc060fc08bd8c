//! `eph-agent` — Structure-of-Arrays agent storage.
//!
//! # Crate layout
//!
//! | Module      | Contents                                           |
//! |-------------|----------------------------------------------------|
//! | [`store`]   | `AgentStore` (SoA arrays), desired-velocity helper |
//! | [`builder`] | `AgentSpec`, `AgentStoreBuilder`                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `AgentSpec`.   |

pub mod builder;
pub mod store;


pub use builder::{AgentSpec, AgentStoreBuilder};
pub use store::{AgentStore, GOAL_SLOWDOWN_RADIUS};
