//! Surface distances on the shield ellipsoid using Lambert's formula for long lines.
//!
//! [`EllipsoidGeodesy`] holds everything that depends only on the semi-axes:
//! squared axes, flattening and a reduced latitude per raster column.
//! [`ImpactGeodesy`] adds the per-column trigonometric products of the
//! Lambert correction for one fixed impact point, after which each pixel costs
//! a square root, an `acos` and a `sin` per hemisphere.
//!
//! Point coordinates are relative to the ellipsoid center, with the distinct
//! semi-axis `b` along `x` and the circular radius `a` in the `y`/`z` plane.

use bevy::math::DVec3;
use wide::f64x4;

use crate::types::{Ellipsoid, HALF_PI};

use super::rings::PaintTable;

/// Semi-axis dependent tables.
#[derive(Clone, Debug)]
pub struct EllipsoidGeodesy {
    a: i64,
    b: i64,
    half_f: f64,
    aa: f64,
    bb: f64,
    aa_i: i64,
    bb_i: i64,
    aabb: i64,
    inv_aa: f64,
    inv_bb: f64,
    b_over_a: f64,
    aa_over_bb: f64,
    beta: Vec<f64>,
}

impl EllipsoidGeodesy {
    pub fn new(shield: &Ellipsoid) -> Self {
        let a = shield.a() as i64;
        let b = shield.b() as i64;
        let aa_i = a * a;
        let bb_i = b * b;
        let b_over_a = b as f64 / a as f64;
        let mut geodesy = Self {
            a,
            b,
            half_f: shield.flattening() / 2.0,
            aa: aa_i as f64,
            bb: bb_i as f64,
            aa_i,
            bb_i,
            aabb: aa_i * bb_i,
            inv_aa: 1.0 / aa_i as f64,
            inv_bb: 1.0 / bb_i as f64,
            b_over_a,
            aa_over_bb: 1.0 / (b_over_a * b_over_a),
            beta: Vec::new(),
        };
        geodesy.beta = (-b..=b).map(|x| geodesy.reduced_latitude(x)).collect();
        geodesy
    }

    /// Number of raster columns, `2b + 1`.
    pub fn columns(&self) -> usize {
        self.beta.len()
    }

    /// Circular semi-axis.
    pub fn a(&self) -> i64 {
        self.a
    }

    /// Distinct semi-axis.
    pub fn b(&self) -> i64 {
        self.b
    }

    /// Reduced latitude β for a column offset `x`: `tan β = (b/a)·x / sqrt(b² - x²)`.
    ///
    /// The poles (`x = ±b`) map to `±π/2`.
    pub fn reduced_latitude(&self, x: i64) -> f64 {
        let delta = self.bb_i - x * x;
        if delta == 0 {
            if x > 0 { HALF_PI } else { -HALF_PI }
        } else {
            (self.b_over_a * x as f64 / (delta as f64).sqrt()).atan()
        }
    }

    /// Cached reduced latitude of a raster column.
    pub fn beta(&self, column: usize) -> f64 {
        self.beta[column]
    }

    /// Whether projected offset `(x, y)` lies inside the silhouette, boundary included.
    pub fn inside_ellipse(&self, x: i64, y: i64) -> bool {
        x * x * self.aa_i + y * y * self.bb_i <= self.aabb
    }

    /// Height `z ≥ 0` of the surface above projected offset `(x, y)`.
    pub fn surface_height(&self, x: i64, y: i64) -> f64 {
        let y = y as f64;
        let x = x as f64;
        ((self.aa - y * y) - x * x * self.aa_over_bb).max(0.0).sqrt()
    }

    /// Raster column holding offset `x`, clamped to the table.
    pub fn column_of(&self, x: f64) -> usize {
        (x.round() as i64 + self.b).clamp(0, 2 * self.b) as usize
    }
}

/// Lambert tables for one impact point.
#[derive(Clone, Debug)]
pub struct ImpactGeodesy {
    geodesy: EllipsoidGeodesy,
    impact: DVec3,
    beta_impact: f64,
    /// `x_I / b²`, `y_I / a²`, `z_I / a²`.
    kx: f64,
    ky: f64,
    kz: f64,
    sq_sin_p_cos_q_x2: Vec<f64>,
    sq_cos_p_sin_q_x2: Vec<f64>,
}

impl ImpactGeodesy {
    /// Precompute the Lambert products for every column against `impact`.
    ///
    /// `impact` is relative to the ellipsoid center and should lie on its surface.
    pub fn new(geodesy: EllipsoidGeodesy, impact: DVec3) -> Self {
        let beta_impact = geodesy.beta[geodesy.column_of(impact.x)];
        let (sq_sin_p_cos_q_x2, sq_cos_p_sin_q_x2) = geodesy
            .beta
            .iter()
            .map(|&beta_p| {
                let cos_p = ((beta_impact + beta_p) / 2.0).cos();
                let cos2_p = cos_p * cos_p;
                let sin2_p = 1.0 - cos2_p;
                let cos_q = ((beta_impact - beta_p) / 2.0).cos();
                let cos2_q = cos_q * cos_q;
                let sin2_q = 1.0 - cos2_q;
                (2.0 * sin2_p * cos2_q, 2.0 * cos2_p * sin2_q)
            })
            .unzip();
        Self {
            kx: impact.x * geodesy.inv_bb,
            ky: impact.y * geodesy.inv_aa,
            kz: impact.z * geodesy.inv_aa,
            geodesy,
            impact,
            beta_impact,
            sq_sin_p_cos_q_x2,
            sq_cos_p_sin_q_x2,
        }
    }

    pub fn geodesy(&self) -> &EllipsoidGeodesy {
        &self.geodesy
    }

    /// Impact point relative to the ellipsoid center.
    pub fn impact(&self) -> DVec3 {
        self.impact
    }

    pub fn beta_impact(&self) -> f64 {
        self.beta_impact
    }

    /// Lambert surface distance for a spherical central angle given by its cosine.
    ///
    /// `column` selects the reduced latitude of the far point.
    pub fn lambert_distance(&self, cos_delta_sigma: f64, column: usize) -> f64 {
        let cos_ds = cos_delta_sigma.clamp(-1.0, 1.0);
        // Rounding noise around the impact itself.
        if cos_ds >= 1.0 - f64::EPSILON {
            return 0.0;
        }
        let delta_sigma = cos_ds.acos();
        let near = self.sq_cos_p_sin_q_x2[column] / (1.0 - cos_ds);
        let far = if cos_ds > -1.0 {
            self.sq_sin_p_cos_q_x2[column] / (1.0 + cos_ds)
        } else {
            0.0
        };
        self.geodesy.a as f64
            * (delta_sigma
                - self.geodesy.half_f * (2.0 * delta_sigma + delta_sigma.sin() * (near - far)))
    }

    /// Central angle cosines `(front, back)` at projected offset `(x, y)` with height `z`.
    fn cosines(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        let planar = x * self.kx + y * self.ky;
        let depth = z * self.kz;
        (planar + depth, planar - depth)
    }

    /// Surface distances from the impact to the front (`+z`) and back (`-z`)
    /// points above projected offset `(x, y)`.
    pub fn distances(&self, x: i64, y: i64) -> [f64; 2] {
        let z = self.geodesy.surface_height(x, y);
        let column = (x + self.geodesy.b) as usize;
        let (front, back) = self.cosines(x as f64, y as f64, z);
        [
            self.lambert_distance(front, column),
            self.lambert_distance(back, column),
        ]
    }

    /// Surface distance from the impact to any point on the surface.
    pub fn surface_distance(&self, point: DVec3) -> f64 {
        let cos_ds = point.x * self.kx + point.y * self.ky + point.z * self.kz;
        self.lambert_distance(cos_ds, self.geodesy.column_of(point.x))
    }

    fn shade(&self, front: f64, back: f64, z: f64, column: usize, paint: &PaintTable) -> [u32; 2] {
        // Fades toward the silhouette.
        let depth_factor = 1.0 - z / self.geodesy.bb;
        [
            paint
                .lookup(self.lambert_distance(front, column))
                .pack(depth_factor),
            paint
                .lookup(self.lambert_distance(back, column))
                .pack(depth_factor),
        ]
    }

    /// Packed front and back colours at projected offset `(x, y)`; 0 means no contribution.
    ///
    /// The offset must be inside the ellipse.
    pub fn colors(&self, x: i64, y: i64, paint: &PaintTable) -> [u32; 2] {
        let z = self.geodesy.surface_height(x, y);
        let (front, back) = self.cosines(x as f64, y as f64, z);
        self.shade(front, back, z, (x + self.geodesy.b) as usize, paint)
    }

    /// [`Self::colors`] for the four offsets `x0..x0 + 4` of one row.
    ///
    /// Lanes outside the ellipse (or the raster) are `None`.
    pub fn colors_x4(&self, x0: i64, y: i64, paint: &PaintTable) -> [Option<[u32; 2]>; 4] {
        let g = &self.geodesy;
        let xs = [x0, x0 + 1, x0 + 2, x0 + 3];
        let yf = y as f64;

        let x = f64x4::new(xs.map(|x| x as f64));
        let z_sq = f64x4::splat(g.aa - yf * yf) - x * x * f64x4::splat(g.aa_over_bb);
        let z = z_sq.max(f64x4::splat(0.0)).sqrt();
        let planar = x * f64x4::splat(self.kx) + f64x4::splat(yf * self.ky);
        let depth = z * f64x4::splat(self.kz);

        let front = (planar + depth).to_array();
        let back = (planar - depth).to_array();
        let z = z.to_array();

        std::array::from_fn(|lane| {
            let x = xs[lane];
            if !g.inside_ellipse(x, y) {
                return None;
            }
            Some(self.shade(front[lane], back[lane], z[lane], (x + g.b) as usize, paint))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shield::rings::RingBank;
    use crate::shield::tint::Tint;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn geodesy(a: u32, b: u32) -> EllipsoidGeodesy {
        EllipsoidGeodesy::new(&Ellipsoid::new(DVec3::ZERO, a, b).unwrap())
    }

    #[test]
    fn test_reduced_latitude_poles_and_equator() {
        let g = geodesy(300, 200);
        assert_eq!(g.columns(), 401);
        assert_eq!(g.beta(0), -HALF_PI);
        assert_eq!(g.beta(400), HALF_PI);
        assert_eq!(g.beta(200), 0.0);
        assert!(g.beta(250) > 0.0 && g.beta(250) < HALF_PI);
    }

    #[test]
    fn test_inside_ellipse_boundary_inclusive() {
        let g = geodesy(300, 200);
        assert!(g.inside_ellipse(200, 0));
        assert!(g.inside_ellipse(0, -300));
        assert!(!g.inside_ellipse(201, 0));
        assert!(!g.inside_ellipse(0, 301));
        assert!(!g.inside_ellipse(150, 250));
    }

    #[test]
    fn test_surface_height() {
        let g = geodesy(300, 200);
        assert_relative_eq!(g.surface_height(0, 0), 300.0);
        assert_abs_diff_eq!(g.surface_height(200, 0), 0.0);
        assert_abs_diff_eq!(g.surface_height(0, 300), 0.0);
    }

    #[test]
    fn test_self_distance_is_zero() {
        let g = geodesy(300, 200);
        let impact = DVec3::new(0.0, 0.0, 300.0);
        let lambert = ImpactGeodesy::new(g, impact);
        assert_abs_diff_eq!(lambert.surface_distance(impact), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lambert.distances(0, 0)[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_reduces_to_great_circle() {
        let g = geodesy(100, 100);
        let lambert = ImpactGeodesy::new(g, DVec3::new(0.0, 0.0, 100.0));
        // Quarter turn to the rim of the silhouette.
        assert_relative_eq!(
            lambert.surface_distance(DVec3::new(0.0, 100.0, 0.0)),
            100.0 * HALF_PI,
            epsilon = 1e-9
        );
        // Back pole is half a turn away.
        let [front, back] = lambert.distances(0, 0);
        assert_abs_diff_eq!(front, 0.0, epsilon = 1e-9);
        assert_relative_eq!(back, 100.0 * std::f64::consts::PI, epsilon = 1e-4);
    }

    #[test]
    fn test_distance_grows_away_from_impact() {
        let g = geodesy(300, 200);
        let lambert = ImpactGeodesy::new(g, DVec3::new(0.0, 0.0, 300.0));
        let mut last = 0.0;
        for y in (0..=300).step_by(30) {
            let d = lambert.distances(0, y)[0];
            assert!(d >= last, "distance shrank at y={y}: {d} < {last}");
            last = d;
        }
    }

    #[test]
    fn test_simd_matches_scalar() {
        let g = geodesy(60, 40);
        let impact = DVec3::new(12.0, -20.0, (3600.0_f64 - 400.0 - 144.0 * 2.25).sqrt());
        let lambert = ImpactGeodesy::new(g, impact);
        let bank = RingBank::canonical(4, Tint::rgb(255, 255, 0), Tint::rgb(255, 0, 0));
        let paint = PaintTable::build(bank.rings(), 200);
        for y in [-60, -33, 0, 17, 59] {
            let mut x0 = -40;
            while x0 <= 40 {
                let lanes = lambert.colors_x4(x0, y, &paint);
                for (lane, got) in lanes.iter().enumerate() {
                    let x = x0 + lane as i64;
                    let want = (x <= 40 && lambert.geodesy().inside_ellipse(x, y))
                        .then(|| lambert.colors(x, y, &paint));
                    assert_eq!(*got, want, "mismatch at ({x}, {y})");
                }
                x0 += 4;
            }
        }
    }
}
