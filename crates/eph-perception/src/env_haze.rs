//! The environmental haze grid.
//!
//! A Cartesian grid of values in `[0, 1]` covering the whole torus,
//! independent of any agent's polar grid.  It is written only through
//! [`EnvHazeField::deposit`] / [`EnvHazeField::apply_deposits`] and relaxed
//! toward a baseline by [`EnvHazeField::decay`]; agents read it through
//! [`EnvHazeField::sample`].
//!
//! Cell `(i, j)` covers `[i·dx, (i+1)·dx) × [j·dy, (j+1)·dy)`; its value lives
//! at the cell centre for bilinear sampling, which wraps across the edges.

use eph_core::{ensure_positive, BodyState, EphError, EphResult, Torus, Vec2};

use crate::{BinField, PolarGrid};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvHazeConfig {
    /// Requested cell edge length; rounded so cells tile the torus exactly.
    pub cell_size:  f64,
    /// Value cells relax toward.
    pub baseline:   f64,
    /// Fraction of the gap to the baseline closed per tick, in `[0, 1]`.
    pub decay_rate: f64,
    /// Initial value of every cell.
    pub initial:    f64,
}

impl Default for EnvHazeConfig {
    fn default() -> Self {
        Self { cell_size: 1.0, baseline: 0.0, decay_rate: 0.02, initial: 0.0 }
    }
}

impl EnvHazeConfig {
    pub fn validate(&self) -> EphResult<()> {
        ensure_positive("env_haze.cell_size", self.cell_size)?;
        for (what, v) in [
            ("env_haze.baseline", self.baseline),
            ("env_haze.decay_rate", self.decay_rate),
            ("env_haze.initial", self.initial),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(EphError::config(format!("{what} must lie in [0, 1], got {v}")));
            }
        }
        Ok(())
    }
}

/// Direction of a trail deposit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DepositKind {
    /// Clears haze: `v ← max(0, v - amount)`.
    Lubricant,
    /// Thickens haze: `v ← min(1, v + amount)`.
    Repellent,
}

/// A deposit buffered during the read phase and applied at commit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HazeDeposit {
    pub position: Vec2,
    pub kind:     DepositKind,
    pub amount:   f64,
}

// ── EnvHazeField ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct EnvHazeField {
    torus:      Torus,
    nx:         usize,
    ny:         usize,
    dx:         f64,
    dy:         f64,
    baseline:   f64,
    decay_rate: f64,
    cells:      Vec<f64>,
}

impl EnvHazeField {
    pub fn new(torus: Torus, config: &EnvHazeConfig) -> EphResult<Self> {
        config.validate()?;
        ensure_positive("world.width", torus.width)?;
        ensure_positive("world.height", torus.height)?;
        let nx = ((torus.width / config.cell_size).round() as usize).max(1);
        let ny = ((torus.height / config.cell_size).round() as usize).max(1);
        Ok(Self {
            torus,
            nx,
            ny,
            dx: torus.width / nx as f64,
            dy: torus.height / ny as f64,
            baseline: config.baseline,
            decay_rate: config.decay_rate,
            cells: vec![config.initial; nx * ny],
        })
    }

    /// Grid dimensions `(nx, ny)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn mean(&self) -> f64 {
        self.cells.iter().sum::<f64>() / self.cells.len() as f64
    }

    /// Flat index of the cell containing `p` (wrapped into the torus).
    pub fn cell_index(&self, p: Vec2) -> usize {
        let p = self.torus.wrap(p);
        let i = ((p.x / self.dx) as usize).min(self.nx - 1);
        let j = ((p.y / self.dy) as usize).min(self.ny - 1);
        j * self.nx + i
    }

    /// Value of the cell containing `p`.
    pub fn value_at(&self, p: Vec2) -> f64 {
        self.cells[self.cell_index(p)]
    }

    /// Overwrite the cell containing `p`, clamped to `[0, 1]`.
    pub fn set(&mut self, p: Vec2, value: f64) {
        let i = self.cell_index(p);
        self.cells[i] = value.clamp(0.0, 1.0);
    }

    /// Adjust the cell containing `position`.  Negative amounts are ignored.
    pub fn deposit(&mut self, position: Vec2, kind: DepositKind, amount: f64) {
        if !(amount.is_finite() && amount > 0.0) {
            return;
        }
        let i = self.cell_index(position);
        let v = self.cells[i];
        self.cells[i] = match kind {
            DepositKind::Lubricant => (v - amount).max(0.0),
            DepositKind::Repellent => (v + amount).min(1.0),
        };
    }

    /// Apply buffered deposits in slice order.
    pub fn apply_deposits(&mut self, deposits: &[HazeDeposit]) {
        for d in deposits {
            self.deposit(d.position, d.kind, d.amount);
        }
    }

    /// Relax every cell toward the baseline by `decay_rate`.
    pub fn decay(&mut self) {
        let (b, k) = (self.baseline, self.decay_rate);
        for v in &mut self.cells {
            *v += (b - *v) * k;
        }
    }

    /// Bilinear, wrap-around sample at world point `p`.
    pub fn sample_point(&self, p: Vec2) -> f64 {
        let p = self.torus.wrap(p);
        let gx = p.x / self.dx - 0.5;
        let gy = p.y / self.dy - 0.5;
        let (fx, fy) = (gx - gx.floor(), gy - gy.floor());
        let i0 = (gx.floor() as i64).rem_euclid(self.nx as i64) as usize;
        let j0 = (gy.floor() as i64).rem_euclid(self.ny as i64) as usize;
        let i1 = (i0 + 1) % self.nx;
        let j1 = (j0 + 1) % self.ny;
        let at = |i: usize, j: usize| self.cells[j * self.nx + i];
        let bottom = at(i0, j0) * (1.0 - fx) + at(i1, j0) * fx;
        let top = at(i0, j1) * (1.0 - fx) + at(i1, j1) * fx;
        (bottom * (1.0 - fy) + top * fy).clamp(0.0, 1.0)
    }

    /// Environmental haze seen by `ego`, one value per bin of `grid`.
    pub fn sample(&self, ego: &BodyState, grid: &PolarGrid) -> BinField {
        let mut field = BinField::uniform(grid, 0.0);
        for r in 0..grid.n_radial {
            for a in 0..grid.n_angular {
                let world = ego.position + ego.to_world(grid.bin_point(r, a));
                field.set(r, a, self.sample_point(world));
            }
        }
        field
    }
}
