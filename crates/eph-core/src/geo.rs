//! Planar vector type and the toroidal world topology.
//!
//! Everything in the simulator is 2D and uses `f64`: the controller takes
//! finite-difference gradients of its objective, and single precision makes
//! those differences too noisy at small step sizes.
//!
//! Every cross-agent distance (saliency encoding, collision resolution, haze
//! sampling, neighbour queries) goes through [`Torus::displacement`] so the
//! wrap-around rule is identical everywhere.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Guard used at every division site that could otherwise hit zero
/// (distances, speeds).
pub const EPSILON: f64 = 1e-6;

// ── Vec2 ─────────────────────────────────────────────────────────────────────

/// A 2D vector in world or egocentric coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians (counter-clockwise from +x).
    #[inline]
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Angle of the vector in `(-π, π]`.  `Vec2::ZERO` maps to `0.0`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Rotate counter-clockwise by `angle` radians.
    #[inline]
    pub fn rotate(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c * self.x - s * self.y, s * self.x + c * self.y)
    }

    /// Unit vector in the same direction, or `Vec2::ZERO` for (near) zero input.
    #[inline]
    pub fn normalized_or_zero(self) -> Self {
        let n = self.norm();
        if n < EPSILON { Vec2::ZERO } else { self * (1.0 / n) }
    }

    /// Scale down (never up) so that `norm() <= max`.
    #[inline]
    pub fn clamp_norm(self, max: f64) -> Self {
        let n = self.norm();
        if n > max && n > EPSILON { self * (max / n) } else { self }
    }

    /// Clamp each component independently to `[-max, max]`.
    #[inline]
    pub fn clamp_components(self, max: f64) -> Self {
        Self::new(self.x.clamp(-max, max), self.y.clamp(-max, max))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI { a + TAU } else { a }
}

// ── Torus ────────────────────────────────────────────────────────────────────

/// A rectangular world `[0, width) × [0, height)` whose opposite edges are
/// glued together.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Torus {
    pub width:  f64,
    pub height: f64,
}

impl Torus {
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Shortest displacement from `from` to `to`, taking wrap-around into
    /// account.  Each component lies in `(-extent/2, extent/2]`.
    #[inline]
    pub fn displacement(&self, from: Vec2, to: Vec2) -> Vec2 {
        Vec2::new(
            wrap_delta(to.x - from.x, self.width),
            wrap_delta(to.y - from.y, self.height),
        )
    }

    /// Shortest-path distance between two points.
    #[inline]
    pub fn distance(&self, a: Vec2, b: Vec2) -> f64 {
        self.displacement(a, b).norm()
    }

    /// Map any point back into `[0, width) × [0, height)`.
    #[inline]
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(wrap_coord(p.x, self.width), wrap_coord(p.y, self.height))
    }
}

impl Default for Torus {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

#[inline]
fn wrap_delta(delta: f64, extent: f64) -> f64 {
    let d = delta.rem_euclid(extent);
    if d > extent * 0.5 { d - extent } else { d }
}

#[inline]
fn wrap_coord(value: f64, extent: f64) -> f64 {
    let v = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs.
    if v >= extent { 0.0 } else { v }
}

// ── Obstacle ─────────────────────────────────────────────────────────────────

/// A static circular obstacle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f64,
}

impl Obstacle {
    #[inline]
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }
}
