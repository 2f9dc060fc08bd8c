//! The explicitly owned environment passed into each tick.

use eph_core::{EphResult, Obstacle, Torus, Vec2};
use eph_perception::{EnvHazeField, HazeDeposit};

use crate::{TrailConfig, WorldConfig};

/// Torus, static obstacles and the environmental haze grid.
///
/// The haze grid is changed only through [`deposit`](Self::deposit),
/// [`commit_trails`](Self::commit_trails) and [`decay_haze`](Self::decay_haze).
#[derive(Clone, Debug)]
pub struct World {
    pub torus:     Torus,
    pub obstacles: Vec<Obstacle>,
    haze:          Option<EnvHazeField>,
    trail:         Option<TrailConfig>,
}

impl World {
    pub fn new(config: &WorldConfig) -> EphResult<Self> {
        config.validate()?;
        let torus = Torus::new(config.width, config.height);
        let haze = config
            .env_haze
            .as_ref()
            .map(|c| EnvHazeField::new(torus, c))
            .transpose()?;
        Ok(Self {
            torus,
            obstacles: config.obstacles.clone(),
            haze,
            trail: config.trail.clone(),
        })
    }

    /// Read-only view of the haze grid, for sampling.
    pub fn haze(&self) -> Option<&EnvHazeField> {
        self.haze.as_ref()
    }

    pub fn trail(&self) -> Option<&TrailConfig> {
        self.trail.as_ref()
    }

    /// Single deposit; a no-op without a haze grid.
    pub fn deposit(&mut self, deposit: HazeDeposit) {
        if let Some(field) = &mut self.haze {
            field.deposit(deposit.position, deposit.kind, deposit.amount);
        }
    }

    pub fn decay_haze(&mut self) {
        if let Some(field) = &mut self.haze {
            field.decay();
        }
    }

    /// End-of-tick haze update: one trail deposit per position, in slice
    /// order, then exactly one decay.  Returns the number of deposits.
    pub fn commit_trails(&mut self, positions: &[Vec2]) -> usize {
        let Some(field) = &mut self.haze else {
            return 0;
        };
        let deposits: Vec<HazeDeposit> = match &self.trail {
            Some(trail) => positions
                .iter()
                .map(|&position| HazeDeposit { position, kind: trail.kind, amount: trail.amount })
                .collect(),
            None => Vec::new(),
        };
        field.apply_deposits(&deposits);
        field.decay();
        deposits.len()
    }
}
