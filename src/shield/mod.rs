//! Energy shield impact rendering.
//!
//! A beam strikes an oblate ellipsoid wrapped around a ship. The pipeline is:
//! - locate the impact point on the surface ([`impact`])
//! - precompute reduced latitudes and Lambert distance terms ([`geodesy`])
//! - blend the ring bank into a per-distance paint table ([`rings`])
//! - rasterize front and back hemispheres ([`raster`])
//! - evolve the rings through the animation phases ([`animation`])
//!
//! [`CombatShield`] ties these together behind the interface the combat
//! animation driver uses.

pub mod animation;
pub mod geodesy;
pub mod impact;
pub mod raster;
pub mod rings;
pub mod tint;
pub mod weapon;

#[cfg(test)]
mod proptest_shield;

use std::time::Instant;

use bevy::log::{debug, info};
use bevy::math::DVec3;

use crate::types::{Ellipsoid, ShieldError};

pub use animation::{
    AnimationPhase, AnimationSequencer, AnimationState, CancelToken, FrameCounts, FrameQueue,
};
pub use geodesy::{EllipsoidGeodesy, ImpactGeodesy};
pub use impact::{ImpactSolution, locate_impact};
pub use raster::{ShieldFrame, ShieldRaster, ShieldRasterizer};
pub use rings::{PaintTable, Ring, RingBank, RingKind};
pub use tint::Tint;
pub use weapon::WeaponProfile;

/// Beam source as set by the combat driver.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BeamSource {
    point: DVec3,
    color: Tint,
    diameter: u32,
}

/// Everything produced by one shield build.
#[derive(Clone, Debug)]
pub struct BuiltShield {
    pub impact: ImpactSolution,
    pub frames: FrameQueue,
}

/// One beam impact on one ship's shield.
///
/// Configure with the setters, then either call [`CombatShield::build`] and
/// consume the returned queue, or pull frames with [`CombatShield::next_frame`],
/// which builds every frame on its first call.
#[derive(Clone, Debug)]
pub struct CombatShield {
    shield: Ellipsoid,
    shield_color: Tint,
    target: Option<DVec3>,
    source: Option<BeamSource>,
    frames: FrameCounts,
    weapons: WeaponProfile,
    parallel: bool,
    cancel: CancelToken,
    impact: Option<ImpactSolution>,
    pending: Option<FrameQueue>,
}

impl CombatShield {
    /// # Errors
    /// [`ShieldError::InvalidSemiAxes`] unless `a >= b > 0`.
    pub fn new(center: DVec3, a: u32, b: u32, shield_color: Tint) -> Result<Self, ShieldError> {
        Ok(Self {
            shield: Ellipsoid::new(center, a, b)?,
            shield_color,
            target: None,
            source: None,
            frames: FrameCounts::default(),
            weapons: WeaponProfile::default(),
            parallel: true,
            cancel: CancelToken::new(),
            impact: None,
            pending: None,
        })
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.shield
    }

    /// Point the beam is aimed at, usually inside the hull.
    pub fn set_target(&mut self, point: DVec3) {
        self.target = Some(point);
        self.reset();
    }

    pub fn set_source(&mut self, point: DVec3, beam_color: Tint, beam_diameter: u32) {
        self.source = Some(BeamSource {
            point,
            color: beam_color,
            diameter: beam_diameter,
        });
        self.reset();
    }

    pub fn set_frames(&mut self, frames: FrameCounts) {
        self.frames = frames;
        self.pending = None;
    }

    pub fn frames(&self) -> FrameCounts {
        self.frames
    }

    pub fn set_weapons(&mut self, attacks_per_round: u32, damage: f64, beam_force: f64) {
        self.weapons = WeaponProfile::new(attacks_per_round, damage, beam_force);
    }

    pub fn weapons(&self) -> &WeaponProfile {
        &self.weapons
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Share a cancel token with whoever may abandon this build.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn reset(&mut self) {
        self.impact = None;
        self.pending = None;
    }

    fn source(&self) -> Result<BeamSource, ShieldError> {
        self.source.ok_or(ShieldError::MissingSource)
    }

    /// Locate the impact once and cache it until the beam changes.
    pub fn impact(&mut self) -> Result<ImpactSolution, ShieldError> {
        if let Some(impact) = self.impact {
            return Ok(impact);
        }
        let target = self.target.ok_or(ShieldError::MissingTarget)?;
        let source = self.source()?;

        let started = Instant::now();
        let impact = locate_impact(&self.shield, source.point, target)?;
        debug!(
            "Shield impact located at {:?} (veiled {:.3}) in {:.1} µs",
            impact.point,
            impact.veiled_ratio,
            started.elapsed().as_secs_f64() * 1e6
        );

        self.impact = Some(impact);
        Ok(impact)
    }

    /// Impact point rounded to whole pixels.
    pub fn impact_point(&mut self) -> Result<[i64; 3], ShieldError> {
        Ok(self.impact()?.rounded_point())
    }

    /// Fraction of the beam segment hidden behind the shield surface.
    pub fn veiled_ratio(&mut self) -> Result<f64, ShieldError> {
        Ok(self.impact()?.veiled_ratio)
    }

    /// Rasterizer for the current beam.
    pub fn rasterizer(&mut self) -> Result<ShieldRasterizer, ShieldError> {
        let impact = self.impact()?;
        let geodesy = EllipsoidGeodesy::new(&self.shield);
        let relative = impact.point - self.shield.center;
        Ok(ShieldRasterizer::new(ImpactGeodesy::new(geodesy, relative))
            .with_parallel(self.parallel))
    }

    /// Paint table length: twice the sum of the semi-axes covers any surface distance.
    pub fn paint_length(&self) -> usize {
        2 * (self.shield.a() + self.shield.b()) as usize
    }

    /// Render every frame of the animation.
    ///
    /// # Errors
    /// Missing target or source, a beam that misses the shield, or cancellation.
    pub fn build(&mut self) -> Result<BuiltShield, ShieldError> {
        let started = Instant::now();
        let rasterizer = self.rasterizer()?;
        let impact = self.impact()?;
        let source = self.source()?;

        let rings = RingBank::canonical(source.diameter, self.shield_color, source.color);
        let sequencer = AnimationSequencer::new(self.frames, rings, self.paint_length());
        let frames = sequencer.run(&rasterizer, &self.cancel)?;

        info!(
            "Shield built: impact {:?}, veiled ratio {:.3}, {} frames ({}x{}) in {:.1} ms",
            impact.rounded_point(),
            impact.veiled_ratio,
            frames.len(),
            rasterizer.columns(),
            rasterizer.rows(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(BuiltShield { impact, frames })
    }

    /// Pop the next front/back pair, building all frames on the first call.
    ///
    /// Returns `Ok(None)` once the queue is drained; it is never refilled.
    pub fn next_frame(&mut self) -> Result<Option<ShieldFrame>, ShieldError> {
        if self.pending.is_none() {
            let built = self.build()?;
            self.pending = Some(built.frames);
        }
        Ok(self.pending.as_mut().and_then(FrameQueue::pop))
    }
}
