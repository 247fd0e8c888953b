//! Where a beam meets the shield.
//!
//! The beam is the ray `target + m·(source - target)`. Substituting it into
//! the ellipsoid equation `x²/b² + (y² + z²)/a² = 1` (recentered on the
//! shield) gives a quadratic in `m`; the larger root is the surface point
//! facing the beam source.

use bevy::math::DVec3;

use crate::types::{Ellipsoid, ShieldError};

/// Result of locating the beam impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactSolution {
    /// Absolute impact point on the shield surface.
    pub point: DVec3,
    /// Ray parameter of the impact: the fraction of the target → source
    /// segment that lies behind the shield surface.
    pub veiled_ratio: f64,
}

impl ImpactSolution {
    /// Impact point rounded to whole pixels.
    pub fn rounded_point(&self) -> [i64; 3] {
        let p = self.point.round();
        [p.x as i64, p.y as i64, p.z as i64]
    }
}

/// Intersect the beam from `source` to `target` with the shield surface.
///
/// # Errors
/// * [`ShieldError::DegenerateBeam`] if source and target coincide.
/// * [`ShieldError::BeamMissesShield`] if the beam line never touches the ellipsoid.
pub fn locate_impact(
    shield: &Ellipsoid,
    source: DVec3,
    target: DVec3,
) -> Result<ImpactSolution, ShieldError> {
    let aa = (shield.a() as f64).powi(2);
    let bb = (shield.b() as f64).powi(2);

    let o = target - shield.center;
    let d = source - target;
    // Direction scaled by the inverse squared semi-axes.
    let dn = DVec3::new(d.x / bb, d.y / aa, d.z / aa);

    let k2 = d.dot(dn);
    let k1 = 2.0 * o.dot(dn);
    let k3 = o.x * o.x / bb + (o.y * o.y + o.z * o.z) / aa;

    if k2 <= 0.0 {
        return Err(ShieldError::DegenerateBeam);
    }

    let discriminant = k1 * k1 - 4.0 * k2 * (k3 - 1.0);
    if discriminant < 0.0 {
        return Err(ShieldError::BeamMissesShield { discriminant });
    }

    let root = discriminant.sqrt();
    let m1 = (-k1 - root) / (2.0 * k2);
    let m2 = (-k1 + root) / (2.0 * k2);
    let veiled_ratio = m1.max(m2);

    Ok(ImpactSolution {
        point: target + veiled_ratio * d,
        veiled_ratio,
    })
}
