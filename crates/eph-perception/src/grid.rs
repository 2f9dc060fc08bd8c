//! Polar bin geometry of the egocentric saliency map.
//!
//! Bearings are measured from the agent's heading, counter-clockwise
//! positive.  Angular bins split `[-fov/2, +fov/2]` evenly; a bearing of
//! exactly `+fov/2` belongs to the last bin.  Radial bins partition
//! `[0, d_max]`.
//!
//! With [`RadialSpacing::Log`] the nominal edges are
//! `r_min · (d_max / r_min)^(k / n)` for `k = 0..=n`; the first bin is
//! extended down to range 0 so that touching neighbours are still seen.

use std::f64::consts::TAU;

use eph_core::{ensure_positive, EphError, EphResult, Vec2};

// ── SpmConfig ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RadialSpacing {
    /// Log-scaled edges; resolution concentrated in the near field.
    Log,
    Linear,
}

/// Saliency-map resolution and encoding constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpmConfig {
    pub n_radial:    usize,
    pub n_angular:   usize,
    /// Field of view in degrees, centred on the heading.  At most 360.
    pub fov_deg:     f64,
    /// Sensing radius.
    pub d_max:       f64,
    /// Inner reference radius for log spacing.
    pub r_min:       f64,
    pub spacing:     RadialSpacing,
    /// Closing speed mapped to `ch2 = 1`.
    pub speed_scale: f64,
    /// β in `ch3 = 1 - exp(-β · closing / range)`.
    pub risk_gain:   f64,
}

impl Default for SpmConfig {
    fn default() -> Self {
        Self {
            n_radial:    16,
            n_angular:   16,
            fov_deg:     210.0,
            d_max:       8.0,
            r_min:       1.0,
            spacing:     RadialSpacing::Log,
            speed_scale: 3.0,
            risk_gain:   1.0,
        }
    }
}

impl SpmConfig {
    pub fn validate(&self) -> EphResult<()> {
        if self.n_radial == 0 || self.n_angular == 0 {
            return Err(EphError::config(format!(
                "spm grid must have at least one bin per axis, got {}x{}",
                self.n_radial, self.n_angular
            )));
        }
        ensure_positive("spm.fov_deg", self.fov_deg)?;
        if self.fov_deg > 360.0 {
            return Err(EphError::config(format!("spm.fov_deg must be at most 360, got {}", self.fov_deg)));
        }
        ensure_positive("spm.d_max", self.d_max)?;
        ensure_positive("spm.speed_scale", self.speed_scale)?;
        ensure_positive("spm.risk_gain", self.risk_gain)?;
        if self.spacing == RadialSpacing::Log {
            ensure_positive("spm.r_min", self.r_min)?;
            if self.r_min >= self.d_max {
                return Err(EphError::config(format!(
                    "spm.r_min ({}) must be smaller than spm.d_max ({}) for log spacing",
                    self.r_min, self.d_max
                )));
            }
        }
        Ok(())
    }
}

// ── PolarGrid ─────────────────────────────────────────────────────────────────

/// Precomputed bin edges and representative points.
///
/// Bins are addressed `(r, a)` and flattened radial-major:
/// `index = r * n_angular + a`.
#[derive(Clone, Debug)]
pub struct PolarGrid {
    pub n_radial:  usize,
    pub n_angular: usize,
    /// Half the field of view, radians.
    pub half_fov:  f64,
    pub d_max:     f64,
    spacing:       RadialSpacing,
    r_min:         f64,
    /// `n_radial + 1` membership edges; `edges[0] = 0`, `edges[n] = d_max`.
    edges:         Vec<f64>,
    centers:       Vec<f64>,
    bearings:      Vec<f64>,
    /// Unit vectors at each angular bin's centre bearing (ego frame).
    directions:    Vec<Vec2>,
}

impl PolarGrid {
    pub fn new(config: &SpmConfig) -> EphResult<Self> {
        config.validate()?;
        let n = config.n_radial;
        let (edges, centers) = match config.spacing {
            RadialSpacing::Log => {
                let ratio = config.d_max / config.r_min;
                let nominal = |k: f64| config.r_min * ratio.powf(k / n as f64);
                let mut edges: Vec<f64> = (0..=n).map(|k| nominal(k as f64)).collect();
                edges[0] = 0.0;
                edges[n] = config.d_max;
                let centers = (0..n).map(|k| nominal(k as f64 + 0.5)).collect();
                (edges, centers)
            }
            RadialSpacing::Linear => {
                let step = config.d_max / n as f64;
                let mut edges: Vec<f64> = (0..=n).map(|k| k as f64 * step).collect();
                edges[n] = config.d_max;
                let centers = (0..n).map(|k| (k as f64 + 0.5) * step).collect();
                (edges, centers)
            }
        };

        let fov = config.fov_deg.to_radians().min(TAU);
        let width = fov / config.n_angular as f64;
        let bearings: Vec<f64> = (0..config.n_angular)
            .map(|a| -fov * 0.5 + (a as f64 + 0.5) * width)
            .collect();
        let directions = bearings.iter().map(|&b| Vec2::from_angle(b)).collect();

        Ok(Self {
            n_radial: n,
            n_angular: config.n_angular,
            half_fov: fov * 0.5,
            d_max: config.d_max,
            spacing: config.spacing,
            r_min: config.r_min,
            edges,
            centers,
            bearings,
            directions,
        })
    }

    /// Total number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_radial * self.n_angular
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, r: usize, a: usize) -> usize {
        r * self.n_angular + a
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.n_angular, index % self.n_angular)
    }

    /// Membership edges, `n_radial + 1` values from 0 to `d_max`.
    pub fn radial_edges(&self) -> &[f64] {
        &self.edges
    }

    /// Representative range of radial bin `r`.
    #[inline]
    pub fn range_center(&self, r: usize) -> f64 {
        self.centers[r]
    }

    /// Centre bearing of angular bin `a`, radians from the heading.
    #[inline]
    pub fn bearing_center(&self, a: usize) -> f64 {
        self.bearings[a]
    }

    /// Ego-frame unit vector pointing at the centre of angular bin `a`.
    #[inline]
    pub fn direction(&self, a: usize) -> Vec2 {
        self.directions[a]
    }

    /// Ego-frame point at the centre of bin `(r, a)`.
    #[inline]
    pub fn bin_point(&self, r: usize, a: usize) -> Vec2 {
        self.directions[a] * self.centers[r]
    }

    /// Bin containing `(range, bearing)`, or `None` outside range or FOV.
    pub fn locate(&self, range: f64, bearing: f64) -> Option<(usize, usize)> {
        if !range.is_finite() || !bearing.is_finite() || range < 0.0 || range > self.d_max {
            return None;
        }
        if bearing.abs() > self.half_fov {
            return None;
        }
        let fov = 2.0 * self.half_fov;
        let a = (((bearing + self.half_fov) / fov) * self.n_angular as f64) as usize;
        let a = a.min(self.n_angular - 1);
        Some((self.radial_bin(range), a))
    }

    fn radial_bin(&self, range: f64) -> usize {
        let n = self.n_radial;
        let r = match self.spacing {
            RadialSpacing::Linear => ((range / self.d_max) * n as f64) as usize,
            RadialSpacing::Log => {
                if range < self.edges[1] {
                    0
                } else {
                    let ratio = (self.d_max / self.r_min).ln();
                    ((range / self.r_min).ln() / ratio * n as f64) as usize
                }
            }
        };
        r.min(n - 1)
    }
}
