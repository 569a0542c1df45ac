//! Angle and direction helpers.
//!
//! Pure functions with no state. Rotor angles are radians and may exceed a
//! full turn; everything that compares angles reduces them first.
//!
//! Direction vectors are expected to be normalized. A dot product that
//! drifts slightly outside `[-1, 1]` is clamped before `acos`, so these
//! helpers never return NaN for unit inputs.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::Neg;

/// The four rotor rest positions, indexed by [`Quadrant::index`].
pub const CALIBRATED_ANGLES: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// Three-component direction vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Direction {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Direction {
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(&self) -> Option<Self> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    /// Rotate by `angle` radians about the unit `axis` (right-hand rule).
    pub fn rotated(&self, axis: &Self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let k_cross_v = axis.cross(self);
        let k_dot_v = axis.dot(self);
        Self::new(
            self.x * cos + k_cross_v.x * sin + axis.x * k_dot_v * (1.0 - cos),
            self.y * cos + k_cross_v.y * sin + axis.y * k_dot_v * (1.0 - cos),
            self.z * cos + k_cross_v.z * sin + axis.z * k_dot_v * (1.0 - cos),
        )
    }
}

impl Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Reduce an angle into `[0, 2π)`.
///
/// A tiny negative remainder would round up to exactly `2π` when corrected,
/// so that case folds to `0`.
#[inline]
pub fn reduce_to_full_turn(angle: f64) -> f64 {
    let arc = angle % TAU;
    if arc >= 0.0 {
        return arc;
    }
    let corrected = arc + TAU;
    if corrected >= TAU { 0.0 } else { corrected }
}

/// Reduce an angle into `(-π, π]`.
#[inline]
pub fn reduce_to_half_turn(angle: f64) -> f64 {
    let arc = reduce_to_full_turn(angle);
    if arc > PI { arc - TAU } else { arc }
}

/// Angle between two normalized directions, in `[-π, π]`.
///
/// The magnitude comes from the clamped dot product; the sign is copied from
/// the unclamped dot product, so opposed vectors give `-π`.
pub fn direction_angle(a: &Direction, b: &Direction) -> f64 {
    let dot = a.dot(b);
    let angle = dot.clamp(-1.0, 1.0).acos();
    if dot < 0.0 { -angle } else { angle }
}

/// Signed angle that rotates `from` onto `to` about `axis`, in `[-π, π]`.
///
/// Both directions are expected to lie in the plane normal to `axis`.
pub fn planar_angle(from: &Direction, to: &Direction, axis: &Direction) -> f64 {
    let magnitude = direction_angle(from, to).abs();
    if axis.dot(&from.cross(to)) < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Snap an angle to the nearest calibrated position `{0, π/2, π, 3π/2}`.
///
/// Angles close below a full turn snap to `2π`, which folds back to `0`.
pub fn calibrate(angle: f64) -> f64 {
    let reduced = reduce_to_full_turn(angle);
    let nearest = CALIBRATED_ANGLES
        .iter()
        .copied()
        .chain(std::iter::once(TAU))
        .min_by(|a, b| (a - reduced).abs().total_cmp(&(b - reduced).abs()))
        .unwrap_or(0.0);
    if nearest < TAU { nearest } else { 0.0 }
}

/// One of the four calibrated rotor rest positions.
///
/// A level holds exactly one effector per quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Quadrant {
    Deg0 = 0,
    Deg90 = 1,
    Deg180 = 2,
    Deg270 = 3,
}

impl Quadrant {
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Quadrant for an index, wrapping modulo four.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Quadrant whose calibrated angle is nearest to `angle`.
    pub fn from_angle(angle: f64) -> Self {
        Self::from_index((calibrate(angle) / FRAC_PI_2).round() as usize)
    }

    /// Calibrated rotor angle in `[0, 2π)`.
    #[inline]
    pub const fn angle(self) -> f64 {
        CALIBRATED_ANGLES[self.index()]
    }

    /// The quadrant `quarter_turns` positions further around.
    #[inline]
    pub const fn offset(self, quarter_turns: usize) -> Self {
        Self::from_index(self.index() + quarter_turns)
    }
}
