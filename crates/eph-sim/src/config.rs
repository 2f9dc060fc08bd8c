//! The aggregate of every recognized option.

use eph_control::{ControllerConfig, EfeController};
use eph_core::{ActuationLimits, EphResult, SimConfig};
use eph_perception::{HazeConfig, SpmConfig};
use eph_world::{DynamicsConfig, WorldConfig};

/// Complete run configuration.
///
/// With the `serde` feature every section may be omitted from a JSON file and
/// falls back to its defaults.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EphConfig {
    pub sim:           SimConfig,
    pub world:         WorldConfig,
    pub spm:           SpmConfig,
    pub haze:          HazeConfig,
    pub controller:    ControllerConfig,
    pub dynamics:      DynamicsConfig,
    pub limits:        ActuationLimits,
    /// Expect a predictive model handle.  Without one the controller degrades
    /// to reactive mode and flags every decision.
    pub use_predictor: bool,
}

impl EphConfig {
    /// Validate every section; the first failure is returned.
    pub fn validate(&self) -> EphResult<()> {
        self.sim.validate()?;
        self.world.validate()?;
        self.spm.validate()?;
        self.haze.validate()?;
        self.controller.validate()?;
        self.dynamics.validate()?;
        self.limits.validate()
    }

    /// The expected-free-energy controller described by this configuration.
    pub fn controller_model(&self) -> EphResult<EfeController> {
        EfeController::new(self.controller.clone(), self.use_predictor)
    }
}
