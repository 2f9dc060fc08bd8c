//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use eph_agent::AgentStore;
use eph_control::{ActionModel, Decision, PredictiveModel};
use eph_core::Vec2;
use eph_perception::Perception;
use eph_world::{DynamicsIntegrator, World};
use tracing::{info, warn};

use crate::{EphConfig, Sim, SimError, SimResult};

/// Fluent builder for [`Sim<M>`].
///
/// # Required inputs
///
/// - [`EphConfig`]: every recognized option; validated in `build`
/// - [`AgentStore`]: from [`eph_agent::AgentStoreBuilder`]
/// - `M: ActionModel`: usually [`EphConfig::controller_model`]
///
/// # Optional inputs
///
/// | Method             | Default                         |
/// |--------------------|---------------------------------|
/// | `.predictor(m)`    | None (see `use_predictor`)      |
/// | `.warm_start(v)`   | The store's `last_action`       |
pub struct SimBuilder<M: ActionModel> {
    config:     EphConfig,
    agents:     AgentStore,
    model:      M,
    predictor:  Option<Arc<dyn PredictiveModel>>,
    warm_start: Option<Vec<Vec2>>,
}

impl<M: ActionModel> SimBuilder<M> {
    pub fn new(config: EphConfig, agents: AgentStore, model: M) -> Self {
        Self { config, agents, model, predictor: None, warm_start: None }
    }

    /// Supply the externally loaded predictive model, shared read-only by all
    /// agents.
    pub fn predictor(mut self, model: Arc<dyn PredictiveModel>) -> Self {
        self.predictor = Some(model);
        self
    }

    /// Initial optimizer starting points, one per agent.
    pub fn warm_start(mut self, actions: Vec<Vec2>) -> Self {
        self.warm_start = Some(actions);
        self
    }

    /// Validate every input and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<M>> {
        self.config.validate()?;
        let mut agents = self.agents;
        let agent_count = agents.count;

        if let Some(actions) = self.warm_start {
            if actions.len() != agent_count {
                return Err(SimError::AgentCountMismatch {
                    expected: agent_count,
                    got:      actions.len(),
                    what:     "warm starts",
                });
            }
            agents.last_action = actions;
        }

        let world = World::new(&self.config.world)?;
        for p in &mut agents.position {
            *p = world.torus.wrap(*p);
        }

        let perception = Perception::new(self.config.spm.clone(), self.config.haze.clone())?;
        let integrator = DynamicsIntegrator::new(
            self.config.dynamics.clone(),
            self.config.limits,
            self.config.sim.dt,
        )?;

        if self.config.use_predictor && self.predictor.is_none() {
            warn!("predictive model enabled but no model supplied; running reactive without surprise");
        }
        info!(
            agents = agent_count,
            model = self.model.name(),
            predictor = self.predictor.is_some(),
            ticks = self.config.sim.total_ticks,
            "simulation built"
        );

        #[cfg(feature = "parallel")]
        let pool = match self.config.sim.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        let sensing_radius = self.config.spm.d_max;
        Ok(Sim {
            clock:          self.config.sim.make_clock(),
            config:         self.config,
            agents,
            world,
            perception,
            integrator,
            model:          self.model,
            predictor:      self.predictor,
            decisions:      vec![Decision::default(); agent_count],
            sensing_radius,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
