//! Radial colour rings and the paint table they are blended into.
//!
//! A ring is a raised-cosine envelope around a surface distance from the
//! impact point. Every animation tick the rings are sampled at each integer
//! distance and composited, in bank order, into a 1-D [`PaintTable`].

use crate::types::HALF_PI;

use super::tint::Tint;

/// Shield colour opacity for the wide base glow.
pub const SOCLE_ALPHA: u8 = 0x33;
/// Shield colour opacity for the travelling wave.
pub const WAVE_ALPHA: u8 = 0x88;
/// Beam colour opacity at the impact.
pub const BEAM_ALPHA: u8 = 0xFF;

/// Ring slots, in composition order (later slots are drawn over earlier ones).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RingKind {
    /// Wide, faint glow in the shield colour.
    Socle,
    /// Narrow bright band in the shield colour.
    Wave,
    /// Beam-coloured halo around the strike point.
    Impact,
    /// Fills the strike point itself with the impact colour.
    Center,
}

impl RingKind {
    pub const ALL: [RingKind; 4] = [
        RingKind::Socle,
        RingKind::Wave,
        RingKind::Impact,
        RingKind::Center,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One radial colour envelope.
///
/// A ring with `width == 0` contributes nothing anywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    pub color: Tint,
    pub center: f32,
    pub width: f32,
    pub shape: f32,
    pub center_evolution: f32,
    pub width_evolution: f32,
    pub shape_evolution: f32,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            color: Tint::TRANSPARENT,
            center: 0.0,
            width: 0.0,
            shape: 1.0,
            center_evolution: 1.0,
            width_evolution: 1.0,
            shape_evolution: 1.0,
        }
    }
}

impl Ring {
    /// Apply one wind-up step.
    pub fn evolve(&mut self) {
        self.center *= self.center_evolution;
        self.width *= self.width_evolution;
        self.shape *= self.shape_evolution;
    }

    /// Undo one wind-up step. Components whose factor is zero cannot be recovered and stay put.
    pub fn devolve(&mut self) {
        fn undo(value: &mut f32, factor: f32) {
            if factor != 0.0 {
                *value /= factor;
            }
        }
        undo(&mut self.center, self.center_evolution);
        undo(&mut self.width, self.width_evolution);
        undo(&mut self.shape, self.shape_evolution);
    }

    /// Envelope opacity multiplier at `distance`, or `None` outside the ring.
    pub fn alpha_multiplier(&self, distance: f32) -> Option<f32> {
        if self.width == 0.0 {
            return None;
        }
        if distance < self.center - self.width || distance > self.center + self.width {
            return None;
        }
        let phi = HALF_PI * (distance - self.center) as f64 / self.width as f64;
        Some(((1.0 + phi.cos()) / 2.0).powf(self.shape as f64) as f32)
    }

    /// This ring's colour contribution at an integer surface distance.
    pub fn paint_point_color(&self, distance: usize) -> Tint {
        match self.alpha_multiplier(distance as f32) {
            Some(multiplier) => self.color.with_alpha_multiplier(multiplier),
            None => Tint::TRANSPARENT,
        }
    }
}

/// The four shield rings, indexed by [`RingKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct RingBank {
    rings: [Ring; 4],
}

impl RingBank {
    /// Canonical impact bank scaled by the beam diameter `d`.
    ///
    /// | ring   | center | width | shape | evolutions      |
    /// |--------|--------|-------|-------|-----------------|
    /// | CENTER | 0      | d     | 0.0   | 0, 0, 0         |
    /// | IMPACT | d      | d     | 1.0   | 1.2, 1.2, 0.9   |
    /// | SOCLE  | 3d     | 4d    | 0.5   | 1.2, 1.2, 0.8   |
    /// | WAVE   | 3d     | 0.5d  | 2.0   | 1.2, 1.2, 0.8   |
    pub fn canonical(beam_diameter: u32, shield_color: Tint, beam_color: Tint) -> Self {
        let d = beam_diameter as f32;
        let impact_color = beam_color.saturate(BEAM_ALPHA);
        let ring = |color, center, width, shape, ctr, wid, shp| Ring {
            color,
            center,
            width,
            shape,
            center_evolution: ctr,
            width_evolution: wid,
            shape_evolution: shp,
        };
        Self {
            rings: [
                ring(shield_color.saturate(SOCLE_ALPHA), 3.0 * d, 4.0 * d, 0.5, 1.2, 1.2, 0.8),
                ring(shield_color.saturate(WAVE_ALPHA), 3.0 * d, 0.5 * d, 2.0, 1.2, 1.2, 0.8),
                ring(impact_color, d, d, 1.0, 1.2, 1.2, 0.9),
                // No black hole at the strike point.
                ring(impact_color, 0.0, d, 0.0, 0.0, 0.0, 0.0),
            ],
        }
    }

    pub fn ring(&self, kind: RingKind) -> &Ring {
        &self.rings[kind.index()]
    }

    pub fn ring_mut(&mut self, kind: RingKind) -> &mut Ring {
        &mut self.rings[kind.index()]
    }

    /// Rings in composition order.
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn evolve(&mut self) {
        self.rings.iter_mut().for_each(Ring::evolve);
    }

    pub fn devolve(&mut self) {
        self.rings.iter_mut().for_each(Ring::devolve);
    }
}

/// Blended colour per integer surface distance from the impact point.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintTable {
    paint: Vec<Tint>,
}

impl PaintTable {
    /// Sample every ring at each distance in `0..length` and composite in bank order.
    pub fn build(rings: &[Ring], length: usize) -> Self {
        let paint = (0..length)
            .map(|distance| {
                rings.iter().fold(Tint::TRANSPARENT, |acc, ring| {
                    ring.paint_point_color(distance).over(acc)
                })
            })
            .collect();
        Self { paint }
    }

    /// Scale every entry's opacity (used while fading out).
    pub fn fade(&mut self, multiplier: f32) {
        for tint in &mut self.paint {
            if !tint.is_transparent() {
                *tint = tint.with_alpha_multiplier(multiplier);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.paint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paint.is_empty()
    }

    pub fn get(&self, distance: usize) -> Option<Tint> {
        self.paint.get(distance).copied()
    }

    /// Colour at a continuous surface distance, rounded to the nearest entry.
    ///
    /// Negative distances read entry 0; distances past the table are transparent.
    pub fn lookup(&self, distance: f64) -> Tint {
        let index = distance.round().max(0.0) as usize;
        self.get(index).unwrap_or(Tint::TRANSPARENT)
    }
}
