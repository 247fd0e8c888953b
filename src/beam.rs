//! Screen-space beam line drawn alongside the shield animation.
//!
//! The beam grows from the source toward the shield over the wind-up frames.
//! The stretch behind the shield surface (impact → target) is "veiled" and
//! drawn faint.

use bevy::math::DVec2;

/// Opacity multiplier for the veiled part of the beam.
pub const VEIL_ALPHA: f32 = 0.3;

/// A beam from `source` to `target` clipped at the shield surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamPath {
    pub source: DVec2,
    pub target: DVec2,
    /// Fraction of the beam hidden behind the shield, measured from the target.
    pub veiled_ratio: f64,
    wind_up: u32,
}

impl BeamPath {
    pub fn new(source: DVec2, target: DVec2, veiled_ratio: f64, wind_up: u32) -> Self {
        Self {
            source,
            target,
            veiled_ratio,
            wind_up,
        }
    }

    /// Progressive segments drawn during wind-up, one fewer than the wind-up frames.
    pub fn segment_count(&self) -> u32 {
        self.wind_up.saturating_sub(1)
    }

    /// Point at `t` along the beam, 0 at the source and 1 at the target.
    fn lerp(&self, t: f64) -> DVec2 {
        self.source + (self.target - self.source) * t
    }

    /// Segment `i` of the visible beam, or `None` past the last one.
    pub fn segment(&self, i: u32) -> Option<(DVec2, DVec2)> {
        let count = self.segment_count();
        if i >= count {
            return None;
        }
        let k = (1.0 - self.veiled_ratio) / count as f64;
        Some((self.lerp(i as f64 * k), self.lerp((i + 1) as f64 * k)))
    }

    /// Where the beam meets the shield surface.
    pub fn impact_point(&self) -> DVec2 {
        self.lerp(1.0 - self.veiled_ratio)
    }

    /// Impact → target, drawn at [`VEIL_ALPHA`].
    pub fn veiled_segment(&self) -> (DVec2, DVec2) {
        (self.impact_point(), self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn beam() -> BeamPath {
        BeamPath::new(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0), 0.2, 5)
    }

    #[test]
    fn test_segments_cover_visible_beam() {
        let beam = beam();
        assert_eq!(beam.segment_count(), 4);
        let (start, _) = beam.segment(0).unwrap();
        let (_, end) = beam.segment(3).unwrap();
        assert_eq!(start, beam.source);
        assert_relative_eq!(end.x, 80.0, epsilon = 1e-9);
        assert!(beam.segment(4).is_none());
        // Segments are contiguous.
        for i in 0..3 {
            assert_eq!(beam.segment(i).unwrap().1, beam.segment(i + 1).unwrap().0);
        }
    }

    #[test]
    fn test_veiled_segment() {
        let (from, to) = beam().veiled_segment();
        assert_relative_eq!(from.x, 80.0, epsilon = 1e-9);
        assert_eq!(to, DVec2::new(100.0, 0.0));
    }

    #[test]
    fn test_single_frame_has_no_segments() {
        let beam = BeamPath::new(DVec2::ZERO, DVec2::X, 0.5, 1);
        assert_eq!(beam.segment_count(), 0);
        assert!(beam.segment(0).is_none());
        let beam = BeamPath::new(DVec2::ZERO, DVec2::X, 0.5, 0);
        assert!(beam.segment(0).is_none());
    }
}
