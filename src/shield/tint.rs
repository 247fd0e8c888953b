//! Colour with transmittance, and the fixed-point compositing used by the paint table.
//!
//! Opacity is carried as *transmittance* (`255 - alpha`): a fresh [`Tint`] is
//! fully transparent. All arithmetic truncates like the integer `/ 255`
//! pipeline the shield renderer was tuned against.

use crate::types::CHANNEL_MAX;

const FF: u32 = CHANNEL_MAX;

/// RGB colour plus transmittance, each in `[0, 255]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tint {
    trans: u8,
    red: u8,
    green: u8,
    blue: u8,
}

impl Default for Tint {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl Tint {
    /// Nothing at all.
    pub const TRANSPARENT: Tint = Tint {
        trans: 255,
        red: 0,
        green: 0,
        blue: 0,
    };

    /// Fully opaque black.
    pub const OPAQUE_BLACK: Tint = Tint {
        trans: 0,
        red: 0,
        green: 0,
        blue: 0,
    };

    /// Build from straight channels.
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            trans: 255 - alpha,
            red,
            green,
            blue,
        }
    }

    /// Opaque colour.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    /// Unpack `0xAARRGGBB`.
    pub const fn from_argb(argb: u32) -> Self {
        Self::rgba(
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
            (argb >> 24) as u8,
        )
    }

    /// Pack to `0xAARRGGBB`.
    pub fn argb(&self) -> u32 {
        ((self.alpha() as u32) << 24)
            | ((self.red as u32) << 16)
            | ((self.green as u32) << 8)
            | self.blue as u32
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn alpha(&self) -> u8 {
        255 - self.trans
    }

    pub fn transmittance(&self) -> u8 {
        self.trans
    }

    pub fn is_transparent(&self) -> bool {
        self.trans == 255
    }

    /// Composite `self` over `bottom` ("A over B").
    pub fn over(self, bottom: Tint) -> Tint {
        if bottom.is_transparent() {
            return self;
        }
        if self.is_transparent() {
            return bottom;
        }
        let top_trans = self.trans as u32;
        let top_alpha = FF - top_trans;
        let mix = |under: u8, over: u8| {
            ((under as u32 * top_trans + over as u32 * top_alpha) / FF) as u8
        };
        Tint {
            trans: (bottom.trans as u32 * top_trans / FF) as u8,
            red: mix(bottom.red, self.red),
            green: mix(bottom.green, self.green),
            blue: mix(bottom.blue, self.blue),
        }
    }

    /// Stretch RGB so the brightest channel reaches 255 and set the opacity.
    ///
    /// Black has no hue to keep and becomes white.
    pub fn saturate(self, alpha: u8) -> Tint {
        let max = self.red.max(self.green).max(self.blue);
        let (red, green, blue) = if max == 0 {
            (255, 255, 255)
        } else {
            let factor = 255.0_f32 / max as f32;
            let scale = |c: u8| (c as f32 * factor) as u8;
            (scale(self.red), scale(self.green), scale(self.blue))
        };
        Tint {
            trans: 255 - alpha,
            red,
            green,
            blue,
        }
    }

    /// Scale opacity: `trans' = 255 - m·(255 - trans)`.
    pub fn with_alpha_multiplier(self, multiplier: f32) -> Tint {
        let alpha = (FF - self.trans as u32) as f32;
        let trans = (FF as f32 - multiplier * alpha).clamp(0.0, FF as f32);
        Tint {
            trans: trans as u8,
            ..self
        }
    }

    /// Pack with transmittance further scaled by `depth_factor`.
    ///
    /// Returns 0 (no contribution) when the tint is already fully transparent.
    pub fn pack(&self, depth_factor: f64) -> u32 {
        if self.is_transparent() {
            return 0;
        }
        let trans = (self.trans as f64 * depth_factor.clamp(0.0, 1.0)) as u32;
        ((FF - trans) << 24)
            | ((self.red as u32) << 16)
            | ((self.green as u32) << 8)
            | self.blue as u32
    }
}
