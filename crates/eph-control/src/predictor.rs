//! The predictive-model contract consumed by the controller.
//!
//! Trained models are loaded outside this workspace and handed to the
//! simulation as `Arc<dyn PredictiveModel>`.  The controller calls the model
//! once or more per objective evaluation, from many threads at once, so
//! implementations must be read-only.

use eph_core::{ensure_positive, EphResult, Vec2};
use eph_perception::{SaliencyEncoder, SaliencyMap, CHANNELS};

/// Gaussian latent code.  The controller only ever uses `mean`.
#[derive(Clone, Debug, PartialEq)]
pub struct Latent {
    pub mean:   Vec<f64>,
    pub logvar: Vec<f64>,
}

/// Action-conditioned model of sensory consequences.
///
/// `action` is always an ego-frame acceleration command.
pub trait PredictiveModel: Send + Sync {
    fn encode(&self, spm: &SaliencyMap) -> Latent;

    /// Predicted next saliency map under `action`.
    fn decode(&self, latent: &Latent, action: Vec2) -> SaliencyMap;

    /// How unexpected `spm` would be after taking `action`.
    ///
    /// Defaults to the mean squared difference between the prediction from
    /// the mean latent and `spm` itself.
    fn surprise(&self, spm: &SaliencyMap, action: Vec2) -> f64 {
        let predicted = self.decode(&self.encode(spm), action);
        mean_squared_difference(&predicted, spm)
    }
}

/// Mean squared difference over all channels and bins.  Shapes must match.
pub fn mean_squared_difference(a: &SaliencyMap, b: &SaliencyMap) -> f64 {
    let (fa, fb) = (a.flatten(), b.flatten());
    if fa.is_empty() || fa.len() != fb.len() {
        return 0.0;
    }
    fa.iter().zip(&fb).map(|(x, y)| (x - y) * (x - y)).sum::<f64>() / fa.len() as f64
}

// ── KinematicPredictor ────────────────────────────────────────────────────────

/// Weight-free reference model.
///
/// The latent mean is the flattened map (log-variance zero); decoding applies
/// the encoder's kinematic forecast for the velocity change `action · dt`.
#[derive(Clone, Debug)]
pub struct KinematicPredictor {
    encoder: SaliencyEncoder,
    dt:      f64,
}

impl KinematicPredictor {
    pub fn new(encoder: SaliencyEncoder, dt: f64) -> EphResult<Self> {
        ensure_positive("predictor dt", dt)?;
        Ok(Self { encoder, dt })
    }

    fn unflatten(&self, flat: &[f64]) -> SaliencyMap {
        let mut map = self.encoder.empty_map();
        let n = map.bins();
        if flat.len() != CHANNELS * n {
            return map;
        }
        for (c, channel) in map.channels.iter_mut().enumerate() {
            channel.copy_from_slice(&flat[c * n..(c + 1) * n]);
        }
        // Any body within range has strictly positive proximity.
        for i in 0..n {
            map.occupied[i] = map.channels[0][i] > 0.0;
        }
        map
    }
}

impl PredictiveModel for KinematicPredictor {
    fn encode(&self, spm: &SaliencyMap) -> Latent {
        let mean = spm.flatten();
        let logvar = vec![0.0; mean.len()];
        Latent { mean, logvar }
    }

    fn decode(&self, latent: &Latent, action: Vec2) -> SaliencyMap {
        let current = self.unflatten(&latent.mean);
        self.encoder.forecast(&current, action * self.dt)
    }
}
