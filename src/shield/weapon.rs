//! Weapon figures attached to a shield impact.

/// Attack statistics for the beam that struck the shield.
///
/// The ring bank never reads these; they shape the flat fallback flash.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeaponProfile {
    pub attacks_per_round: u32,
    /// Damage that went through the shield.
    pub damage: f64,
    /// Raw beam strength before the shield absorbed anything.
    pub beam_force: f64,
}

impl WeaponProfile {
    pub fn new(attacks_per_round: u32, damage: f64, beam_force: f64) -> Self {
        Self {
            attacks_per_round,
            damage,
            beam_force,
        }
    }

    /// `log10(force)`, or 0 for a powerless beam.
    pub fn beam_power_factor(&self) -> f64 {
        if self.beam_force > 0.0 {
            self.beam_force.log10()
        } else {
            0.0
        }
    }

    /// Share of the beam the shield soaked up, in `[0, 1]` for sane inputs.
    pub fn absorption_ratio(&self) -> f64 {
        if self.beam_force <= 0.0 {
            0.0
        } else if self.damage > 0.0 {
            1.0 - self.damage / self.beam_force
        } else {
            1.0
        }
    }

    /// Opacity of the strike point flash.
    pub fn impact_alpha(&self) -> f64 {
        0.5 + self.absorption_ratio() * 0.5
    }

    /// Opacity of the glow spreading over the shield.
    pub fn spread_alpha(&self) -> f64 {
        let spread = (self.beam_power_factor() * self.absorption_ratio())
            .max(0.0)
            .sqrt()
            .clamp(0.0, 1.0);
        0.5 + spread * 0.5
    }
}
