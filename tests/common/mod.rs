//! Common test utilities for integration tests.

use beam_shield::shield::{CombatShield, ShieldRaster, Tint};
use bevy::math::DVec3;

pub const YELLOW: Tint = Tint::rgb(255, 255, 0);
pub const RED: Tint = Tint::rgb(255, 0, 0);

/// Combat-size shield `a = 300, b = 200` at the origin, beam diameter 8.
pub fn standard_shield(source: DVec3) -> CombatShield {
    let mut shield = CombatShield::new(DVec3::ZERO, 300, 200, YELLOW).unwrap();
    shield.set_target(DVec3::ZERO);
    shield.set_source(source, RED, 8);
    shield
}

/// Whether raster pixel `(column, row)` lies outside the projected ellipse.
pub fn outside_ellipse(column: usize, row: usize, a: i64, b: i64) -> bool {
    let x = column as i64 - b;
    let y = row as i64 - a;
    x * x * a * a + y * y * b * b > a * a * b * b
}

/// Assert no pixel outside the ellipse was painted.
pub fn assert_clear_outside(raster: &ShieldRaster, a: i64, b: i64) {
    for row in 0..raster.height() {
        for column in 0..raster.width() {
            if outside_ellipse(column, row, a, b) {
                assert_eq!(
                    raster.argb_at(column, row),
                    0,
                    "painted outside the shield at column {column}, row {row}"
                );
            }
        }
    }
}
