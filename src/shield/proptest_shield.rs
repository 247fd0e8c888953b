//! Property-based tests for shield geometry and colour blending using proptest.

use bevy::math::DVec3;
use proptest::prelude::*;

use crate::shield::geodesy::{EllipsoidGeodesy, ImpactGeodesy};
use crate::shield::impact::locate_impact;
use crate::shield::rings::Ring;
use crate::shield::tint::Tint;
use crate::types::Ellipsoid;

fn any_tint() -> impl Strategy<Value = Tint> {
    any::<[u8; 4]>().prop_map(|[r, g, b, a]| Tint::rgba(r, g, b, a))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The silhouette test only sees squares, so both axes mirror.
    #[test]
    fn prop_inside_ellipse_symmetric(
        b in 1u32..200,
        extra in 0u32..200,
        x in -400i64..400,
        y in -400i64..400,
    ) {
        let shield = Ellipsoid::new(DVec3::ZERO, b + extra, b).unwrap();
        let g = EllipsoidGeodesy::new(&shield);
        let inside = g.inside_ellipse(x, y);
        prop_assert_eq!(inside, g.inside_ellipse(-x, y));
        prop_assert_eq!(inside, g.inside_ellipse(x, -y));
        prop_assert_eq!(inside, g.inside_ellipse(-x, -y));
    }

    /// On a sphere the impact lies exactly one radius from the center.
    #[test]
    fn prop_sphere_impact_on_radius(
        r in 1u32..400,
        cx in -500.0f64..500.0,
        cy in -500.0f64..500.0,
        sx in -1000.0f64..1000.0,
        sy in -1000.0f64..1000.0,
        sz in -1000.0f64..1000.0,
    ) {
        let offset = DVec3::new(sx, sy, sz);
        prop_assume!(offset.length() > 1.0);
        let center = DVec3::new(cx, cy, 0.0);
        let shield = Ellipsoid::new(center, r, r).unwrap();
        let hit = locate_impact(&shield, center + offset, center).unwrap();
        let radius = (hit.point - center).length();
        prop_assert!((radius - r as f64).abs() < 1e-6 * r as f64, "radius {} vs {}", radius, r);
        prop_assert!(hit.veiled_ratio > 0.0);
    }

    /// Distance from the impact to itself vanishes for any on-surface impact.
    #[test]
    fn prop_self_distance_is_zero(
        b in 1u32..150,
        extra in 0u32..150,
        u in 0.0f64..1.0,
        v in -1.0f64..1.0,
    ) {
        let a = b + extra;
        let shield = Ellipsoid::new(DVec3::ZERO, a, b).unwrap();
        let g = EllipsoidGeodesy::new(&shield);
        let x = ((u * 2.0 - 1.0) * b as f64).round() as i64;
        // Largest |y| still inside the silhouette at this column.
        let y_max = (a as f64 * (1.0 - (x * x) as f64 / (b * b) as f64).max(0.0).sqrt()).floor();
        let y = (v * y_max).round() as i64;
        prop_assume!(g.inside_ellipse(x, y));

        let z = g.surface_height(x, y);
        let lambert = ImpactGeodesy::new(g, DVec3::new(x as f64, y as f64, z));
        let [front, _] = lambert.distances(x, y);
        prop_assert!(front.abs() < 1e-3, "self distance {} at ({}, {}, {})", front, x, y, z);
    }

    /// Rings contribute nothing outside `[center - width, center + width]` and peak at the center.
    #[test]
    fn prop_ring_support(
        center in 0.0f32..100.0,
        width in 0.1f32..50.0,
        shape in 0.0f32..3.0,
        distance in 0usize..200,
    ) {
        let ring = Ring {
            color: Tint::rgb(10, 20, 30),
            center,
            width,
            shape,
            ..Ring::default()
        };
        if (distance as f32 - center).abs() > width + 1e-3 {
            prop_assert_eq!(ring.paint_point_color(distance), Tint::TRANSPARENT);
        }
        prop_assert_eq!(ring.alpha_multiplier(center), Some(1.0));
    }

    /// Opaque black hides anything; full transparency shows anything.
    #[test]
    fn prop_compose_identities(x in any_tint()) {
        prop_assert_eq!(Tint::OPAQUE_BLACK.over(x), Tint::OPAQUE_BLACK);
        prop_assert_eq!(Tint::TRANSPARENT.over(x), x);
    }
}
