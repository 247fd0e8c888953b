//! Bevy integration: shield impact effects driven by messages.
//!
//! The combat driver writes a [`ShieldImpactRequest`] per beam hit. Each one
//! becomes either a [`ShieldEffect`] playing the rendered frame queue, or a
//! [`ShieldFlash`] when the shield geometry cannot be built.

use bevy::math::{DVec2, DVec3};
use bevy::prelude::*;

use crate::beam::{BeamPath, VEIL_ALPHA};
use crate::shield::{CombatShield, FrameCounts, FrameQueue, ShieldFrame, Tint, WeaponProfile};
use crate::types::ShieldError;

/// Updates a fallback flash stays on screen.
const FLASH_TICKS: u32 = 12;

/// Plugin providing shield effect state and playback.
///
/// Adds systems for:
/// - Building shields from impact requests
/// - Advancing frame queues and flashes each update
/// - Dropping effects when combat is auto-completed
pub struct ShieldEffectPlugin;

impl Plugin for ShieldEffectPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShieldSettings>()
            .add_message::<ShieldImpactRequest>()
            .add_systems(
                Update,
                (
                    cancel_on_auto_complete,
                    spawn_shield_effects,
                    advance_shield_effects,
                    tick_shield_flashes,
                )
                    .chain(),
            );
    }
}

/// Plugin drawing beams and fallback flashes with gizmos.
pub struct ShieldRenderPlugin;

impl Plugin for ShieldRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (draw_shield_beams, draw_shield_flashes).after(advance_shield_effects),
        );
    }
}

/// Settings for shield impact effects.
#[derive(Resource, Clone, Debug)]
pub struct ShieldSettings {
    /// Render shields at all.
    pub enabled: bool,

    /// Combat is being resolved without animation: skip builds, drop live effects.
    pub auto_complete: bool,

    /// Frames per animation phase.
    pub frames: FrameCounts,

    /// Rasterize rows on the rayon pool.
    pub parallel: bool,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_complete: false,
            frames: FrameCounts::default(),
            parallel: true,
        }
    }
}

/// Message asking for a shield impact animation.
#[derive(Message, Clone, Debug)]
pub struct ShieldImpactRequest {
    /// Shield center (combat screen pixels).
    pub center: DVec3,
    /// Circular semi-axis.
    pub a: u32,
    /// Distinct semi-axis.
    pub b: u32,
    pub shield_color: Tint,
    /// Beam aim point, usually the ship center.
    pub target: DVec3,
    pub source: DVec3,
    pub beam_color: Tint,
    pub beam_diameter: u32,
    pub weapons: WeaponProfile,
}

impl ShieldImpactRequest {
    fn shield(&self, settings: &ShieldSettings) -> Result<CombatShield, ShieldError> {
        let mut shield = CombatShield::new(self.center, self.a, self.b, self.shield_color)?;
        shield.set_target(self.target);
        shield.set_source(self.source, self.beam_color, self.beam_diameter);
        shield.set_frames(settings.frames);
        shield.set_parallel(settings.parallel);
        let w = self.weapons;
        shield.set_weapons(w.attacks_per_round, w.damage, w.beam_force);
        Ok(shield)
    }
}

/// Component for a playing shield animation.
#[derive(Component, Debug)]
pub struct ShieldEffect {
    /// Frames not yet shown.
    pub frames: FrameQueue,
    /// Frame on screen this update.
    pub current: Option<ShieldFrame>,
    /// Frames shown so far.
    pub shown: u32,
    /// Absolute impact point, rounded to pixels.
    pub impact_point: [i64; 3],
    pub beam: BeamPath,
    pub beam_color: Tint,
    /// Top-left of the raster on screen.
    pub origin: DVec2,
}

/// Component for the flat flash shown when a shield cannot be built.
#[derive(Component, Clone, Debug)]
pub struct ShieldFlash {
    pub center: DVec2,
    pub radius: f32,
    pub color: Tint,
    pub impact_alpha: f32,
    pub spread_alpha: f32,
    pub remaining: u32,
}

impl ShieldFlash {
    fn from_request(request: &ShieldImpactRequest) -> Self {
        Self {
            center: request.center.truncate(),
            radius: request.a.max(request.b) as f32,
            color: request.shield_color,
            impact_alpha: request.weapons.impact_alpha() as f32,
            spread_alpha: request.weapons.spread_alpha() as f32,
            remaining: FLASH_TICKS,
        }
    }

    /// Fraction of the flash lifetime left, 1 when fresh.
    pub fn strength(&self) -> f32 {
        self.remaining as f32 / FLASH_TICKS as f32
    }
}

/// Build a shield for each impact request.
pub fn spawn_shield_effects(
    mut commands: Commands,
    mut requests: MessageReader<ShieldImpactRequest>,
    settings: Res<ShieldSettings>,
) {
    if !settings.enabled || settings.auto_complete {
        requests.clear();
        return;
    }

    for request in requests.read() {
        let built = request.shield(&settings).and_then(|mut shield| shield.build());
        match built {
            Ok(built) => {
                let beam = BeamPath::new(
                    request.source.truncate(),
                    request.target.truncate(),
                    built.impact.veiled_ratio,
                    settings.frames.wind_up,
                );
                let origin = request.center.truncate()
                    - DVec2::new(request.b as f64, request.a as f64);
                commands.spawn(ShieldEffect {
                    frames: built.frames,
                    current: None,
                    shown: 0,
                    impact_point: built.impact.rounded_point(),
                    beam,
                    beam_color: request.beam_color,
                    origin,
                });
            }
            Err(err) => {
                warn!("Shield build failed ({err}), falling back to a flat flash");
                commands.spawn(ShieldFlash::from_request(request));
            }
        }
    }
}

/// Show the next frame of every shield effect; despawn finished ones.
pub fn advance_shield_effects(
    mut commands: Commands,
    mut effects: Query<(Entity, &mut ShieldEffect)>,
) {
    for (entity, mut effect) in effects.iter_mut() {
        match effect.frames.pop() {
            Some(frame) => {
                effect.current = Some(frame);
                effect.shown += 1;
            }
            None => {
                commands.entity(entity).despawn();
            }
        }
    }
}

/// Count flashes down and despawn expired ones.
pub fn tick_shield_flashes(
    mut commands: Commands,
    mut flashes: Query<(Entity, &mut ShieldFlash)>,
) {
    for (entity, mut flash) in flashes.iter_mut() {
        flash.remaining = flash.remaining.saturating_sub(1);
        if flash.remaining == 0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Drop every live effect while combat is auto-completing.
pub fn cancel_on_auto_complete(
    mut commands: Commands,
    settings: Res<ShieldSettings>,
    effects: Query<Entity, Or<(With<ShieldEffect>, With<ShieldFlash>)>>,
) {
    if !settings.auto_complete || effects.is_empty() {
        return;
    }
    let mut cancelled = 0;
    for entity in effects.iter() {
        commands.entity(entity).despawn();
        cancelled += 1;
    }
    warn!("Auto-complete: cancelled {cancelled} shield effects");
}

fn to_color(tint: Tint, alpha_scale: f32) -> Color {
    Color::srgba_u8(
        tint.red(),
        tint.green(),
        tint.blue(),
        (tint.alpha() as f32 * alpha_scale) as u8,
    )
}

fn to_vec3(point: DVec2) -> Vec3 {
    Vec3::new(point.x as f32, point.y as f32, 0.0)
}

/// Draw the beam growing toward the shield, with its veiled tail.
fn draw_shield_beams(effects: Query<&ShieldEffect>, mut gizmos: Gizmos) {
    for effect in effects.iter() {
        let beam = &effect.beam;
        let color = to_color(effect.beam_color, 1.0);
        let drawn = effect.shown.min(beam.segment_count());
        for i in 0..drawn {
            if let Some((from, to)) = beam.segment(i) {
                gizmos.line(to_vec3(from), to_vec3(to), color);
            }
        }
        if drawn == beam.segment_count() {
            let (from, to) = beam.veiled_segment();
            gizmos.line(
                to_vec3(from),
                to_vec3(to),
                to_color(effect.beam_color, VEIL_ALPHA),
            );
        }
    }
}

/// Draw fallback flashes: a spreading glow and a bright core.
fn draw_shield_flashes(flashes: Query<&ShieldFlash>, mut gizmos: Gizmos) {
    for flash in flashes.iter() {
        let strength = flash.strength();
        let center = to_vec3(flash.center);
        let progress = 1.0 - strength;

        let spread = to_color(flash.color, flash.spread_alpha * strength);
        let radius = flash.radius * (0.6 + 0.4 * progress);
        draw_circle_segments(&mut gizmos, center, radius, spread, 32);

        let core = to_color(flash.color.saturate(255), flash.impact_alpha * strength);
        draw_circle_segments(&mut gizmos, center, flash.radius * 0.2, core, 12);
    }
}

/// Draw a circle using line segments.
fn draw_circle_segments(
    gizmos: &mut Gizmos,
    center: Vec3,
    radius: f32,
    color: Color,
    segments: usize,
) {
    let angle_step = std::f32::consts::TAU / segments as f32;

    for i in 0..segments {
        let angle1 = i as f32 * angle_step;
        let angle2 = (i + 1) as f32 * angle_step;

        let p1 = center + Vec3::new(angle1.cos() * radius, angle1.sin() * radius, 0.0);
        let p2 = center + Vec3::new(angle2.cos() * radius, angle2.sin() * radius, 0.0);

        gizmos.line(p1, p2, color);
    }
}
