//! Beam Shield - combat shield impact renderer
//!
//! A library crate that rasterizes the animated energy shield shown when a
//! weapon beam strikes a ship's ellipsoidal shield, plus the Bevy plugin that
//! plays those animations.

pub mod beam;
pub mod effects;
pub mod shield;
pub mod types;

#[cfg(test)]
pub mod test_utils;
