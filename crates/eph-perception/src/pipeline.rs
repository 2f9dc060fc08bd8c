//! One agent's full perception pass for one tick.

use eph_core::{BodyState, EphResult, Obstacle, Torus};

use crate::{compose, BinField, EnvHazeField, HazeConfig, SaliencyEncoder, SaliencyMap, SelfHazeEstimator, SpmConfig};

/// Everything an agent perceives in one tick.
#[derive(Clone, Debug)]
pub struct Percept {
    pub spm:       SaliencyMap,
    pub self_haze: BinField,
    /// Environmental haze sampled into the polar frame, if the world has a
    /// haze field.
    pub env_haze:  Option<BinField>,
    /// `compose(self_haze, env_haze)`, or `self_haze` alone.
    pub haze:      BinField,
    pub precision: BinField,
}

/// Encoder plus self-haze estimator, shared read-only by all agents.
#[derive(Clone, Debug)]
pub struct Perception {
    pub encoder:   SaliencyEncoder,
    pub estimator: SelfHazeEstimator,
}

impl Perception {
    pub fn new(spm: SpmConfig, haze: HazeConfig) -> EphResult<Self> {
        Ok(Self {
            encoder:   SaliencyEncoder::new(spm)?,
            estimator: SelfHazeEstimator::new(haze)?,
        })
    }

    /// Encode → self-haze → sample env haze → compose → precision.
    pub fn perceive(
        &self,
        ego:       &BodyState,
        neighbors: &[BodyState],
        obstacles: &[Obstacle],
        torus:     &Torus,
        env:       Option<&EnvHazeField>,
    ) -> Percept {
        self.perceive_stalled(ego, neighbors, obstacles, torus, env, 0.0)
    }

    /// [`perceive`](Self::perceive) for an agent whose stall level is
    /// `stall`; its frontal stall haze is part of the self-haze.
    pub fn perceive_stalled(
        &self,
        ego:       &BodyState,
        neighbors: &[BodyState],
        obstacles: &[Obstacle],
        torus:     &Torus,
        env:       Option<&EnvHazeField>,
        stall:     f64,
    ) -> Percept {
        let spm = self.encoder.encode(ego, neighbors, obstacles, torus);
        let self_haze = self.estimator.estimate_stalled(&spm, &self.encoder.grid, stall);
        let env_haze = env.map(|field| field.sample(ego, &self.encoder.grid));
        let haze = match &env_haze {
            Some(env) => compose(&self_haze, env),
            None => self_haze.clone(),
        };
        let precision = self.estimator.precision_field(&haze);
        Percept { spm, self_haze, env_haze, haze, precision }
    }

    /// Precision from self-haze only, ignoring any environmental haze.
    pub fn self_precision(&self, percept: &Percept) -> BinField {
        self.estimator.precision_field(&percept.self_haze)
    }
}
