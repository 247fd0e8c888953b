//! Core shield geometry types, errors and constants.

use bevy::math::DVec3;

/// Quarter turn, used by the ring envelope and the reduced latitude pole guard.
pub const HALF_PI: f64 = std::f64::consts::FRAC_PI_2;

/// Maximum value of an 8-bit colour channel.
pub const CHANNEL_MAX: u32 = 255;

/// Errors raised while building a shield impact animation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShieldError {
    #[error("invalid shield semi-axes a={a}, b={b} (require a >= b > 0)")]
    InvalidSemiAxes { a: u32, b: u32 },

    #[error("beam source and target coincide")]
    DegenerateBeam,

    #[error("beam misses the shield ellipsoid (discriminant {discriminant})")]
    BeamMissesShield { discriminant: f64 },

    #[error("shield target was never set")]
    MissingTarget,

    #[error("beam source was never set")]
    MissingSource,

    #[error("shield build cancelled")]
    Cancelled,
}

/// Oblate spheroid wrapping a ship hull, in screen pixel units.
///
/// The `x` axis carries the distinct semi-axis `b`; `y` and `z` share the
/// circular radius `a`. Rasters are laid out with one column per integer `x`
/// in `[-b, b]` and one row per integer `y` in `[-a, a]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Center in combat-screen coordinates.
    pub center: DVec3,
    a: u32,
    b: u32,
}

impl Ellipsoid {
    /// Create an ellipsoid, rejecting anything that is not an oblate (or round) spheroid.
    pub fn new(center: DVec3, a: u32, b: u32) -> Result<Self, ShieldError> {
        if b == 0 || a < b {
            return Err(ShieldError::InvalidSemiAxes { a, b });
        }
        Ok(Self { center, a, b })
    }

    /// Circular semi-axis (shared by `y` and `z`).
    pub fn a(&self) -> u32 {
        self.a
    }

    /// Distinct semi-axis (along `x`).
    pub fn b(&self) -> u32 {
        self.b
    }

    /// Flattening `(a - b) / a`.
    pub fn flattening(&self) -> f64 {
        (self.a - self.b) as f64 / self.a as f64
    }

    /// Raster width: one column per integer `x` in `[-b, b]`.
    pub fn columns(&self) -> usize {
        2 * self.b as usize + 1
    }

    /// Raster height: one row per integer `y` in `[-a, a]`.
    pub fn rows(&self) -> usize {
        2 * self.a as usize + 1
    }

    /// Implicit surface value `x²/b² + (y² + z²)/a²` of an absolute point.
    ///
    /// Equals 1 on the surface, less inside.
    pub fn surface_value(&self, point: DVec3) -> f64 {
        let p = point - self.center;
        let aa = (self.a as f64).powi(2);
        let bb = (self.b as f64).powi(2);
        p.x * p.x / bb + (p.y * p.y + p.z * p.z) / aa
    }
}
