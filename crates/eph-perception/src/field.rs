//! A scalar per polar bin.

use crate::PolarGrid;

/// One `f64` per saliency-map bin, flattened radial-major like
/// [`PolarGrid::index`].  Used for self-haze, sampled environmental haze,
/// composed haze and precision.
#[derive(Clone, Debug, PartialEq)]
pub struct BinField {
    pub n_radial:  usize,
    pub n_angular: usize,
    pub values:    Vec<f64>,
}

impl BinField {
    pub fn filled(n_radial: usize, n_angular: usize, value: f64) -> Self {
        Self { n_radial, n_angular, values: vec![value; n_radial * n_angular] }
    }

    /// A field shaped like `grid`, every bin set to `value`.
    pub fn uniform(grid: &PolarGrid, value: f64) -> Self {
        Self::filled(grid.n_radial, grid.n_angular, value)
    }

    #[inline]
    pub fn get(&self, r: usize, a: usize) -> f64 {
        self.values[r * self.n_angular + a]
    }

    #[inline]
    pub fn set(&mut self, r: usize, a: usize, value: f64) {
        self.values[r * self.n_angular + a] = value;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn same_shape(&self, other: &BinField) -> bool {
        self.n_radial == other.n_radial && self.n_angular == other.n_angular
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    /// Apply `f` to every bin.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> BinField {
        BinField {
            n_radial:  self.n_radial,
            n_angular: self.n_angular,
            values:    self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}
