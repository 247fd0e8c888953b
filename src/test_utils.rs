//! Test utilities for shield rendering tests.
//!
//! Provides fixtures for building shields and rasterizers at test scale, and
//! assertions over rendered frames.

use bevy::math::DVec3;

use crate::shield::{
    CombatShield, EllipsoidGeodesy, ImpactGeodesy, PaintTable, RingBank, ShieldFrame,
    ShieldRasterizer, Tint,
};
use crate::types::Ellipsoid;

/// Fixtures for creating test shields.
pub mod fixtures {
    use super::*;

    pub const YELLOW: Tint = Tint::rgb(255, 255, 0);
    pub const RED: Tint = Tint::rgb(255, 0, 0);

    /// Canonical yellow-shield, red-beam ring bank.
    pub fn ring_bank(beam_diameter: u32) -> RingBank {
        RingBank::canonical(beam_diameter, YELLOW, RED)
    }

    /// Small ellipsoid `a = 30, b = 20` centered on the origin.
    pub fn small_ellipsoid() -> Ellipsoid {
        Ellipsoid::new(DVec3::ZERO, 30, 20).unwrap()
    }

    /// Rasterizer for [`small_ellipsoid`] struck at the front pole `(0, 0, 30)`.
    ///
    /// Frames are 41 columns by 61 rows.
    pub fn small_rasterizer() -> ShieldRasterizer {
        let geodesy = EllipsoidGeodesy::new(&small_ellipsoid());
        ShieldRasterizer::new(ImpactGeodesy::new(geodesy, DVec3::new(0.0, 0.0, 30.0)))
    }

    /// Un-evolved paint table for the small shield (`d = 4`).
    pub fn small_paint() -> PaintTable {
        PaintTable::build(ring_bank(4).rings(), 100)
    }

    /// Small shield hit head-on from `+z`.
    pub fn small_shield() -> CombatShield {
        let mut shield = CombatShield::new(DVec3::ZERO, 30, 20, YELLOW).unwrap();
        shield.set_target(DVec3::ZERO);
        shield.set_source(DVec3::new(0.0, 0.0, 500.0), RED, 4);
        shield
    }
}

/// Assertions over rendered frames.
pub mod assertions {
    use super::*;

    /// Count of pixels with nonzero alpha.
    pub fn visible_pixels(pixels: &[u32]) -> usize {
        pixels.iter().filter(|&&p| p >> 24 != 0).count()
    }

    /// Assert that nothing was drawn outside the projected ellipse.
    ///
    /// # Panics
    /// Panics on the first painted pixel outside the boundary.
    pub fn assert_transparent_outside(frame: &ShieldFrame, geodesy: &EllipsoidGeodesy) {
        for row in 0..frame.front.height() {
            for column in 0..frame.front.width() {
                let x = column as i64 - geodesy.b();
                let y = row as i64 - geodesy.a();
                if geodesy.inside_ellipse(x, y) {
                    continue;
                }
                assert_eq!(
                    (frame.front.argb_at(column, row), frame.back.argb_at(column, row)),
                    (0, 0),
                    "Painted outside the shield at x={x}, y={y}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_rasterizer_dimensions() {
        let rasterizer = fixtures::small_rasterizer();
        assert_eq!(rasterizer.columns(), 41);
        assert_eq!(rasterizer.rows(), 61);
    }

    #[test]
    fn test_small_frame_is_contained() {
        let rasterizer = fixtures::small_rasterizer();
        let frame = rasterizer.render(&fixtures::small_paint());
        assertions::assert_transparent_outside(&frame, rasterizer.geodesy().geodesy());
        assert!(assertions::visible_pixels(frame.front.pixels()) > 0);
    }

    #[test]
    fn test_visible_pixels() {
        assert_eq!(assertions::visible_pixels(&[0, 0x0100_0000, 0x00FF_FFFF]), 1);
    }
}
