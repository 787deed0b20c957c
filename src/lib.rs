//! Sky Barrage - a single-screen boss-rush shoot-'em-up core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pools, collisions, boss, power-ups)
//! - `game`: Run lifecycle controller owning the simulation state
//! - `persistence`: Profile save/load through a pluggable storage backend
//! - `platform`: Browser/native platform abstraction (logging, clock)
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Length of one nominal display frame (60 Hz). Entity speeds are
    /// expressed in pixels per nominal frame.
    pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest frame delta the controller will feed the simulation
    pub const MAX_FRAME_MS: u64 = 100;

    /// Default playfield dimensions
    pub const GAME_WIDTH: f32 = 480.0;
    pub const GAME_HEIGHT: f32 = 800.0;
}

/// Unit heading for an angle measured clockwise from straight up.
///
/// Player bullets are aimed this way: angle 0 travels toward negative y.
#[inline]
pub fn heading_from_vertical(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

/// Angle (clockwise from straight up) pointing from `from` toward `to`
#[inline]
pub fn vertical_angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.x.atan2(-d.y)
}

/// Unit direction for a standard polar angle (radians from +x, y down)
#[inline]
pub fn polar_direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Standard polar bearing from `from` toward `to`
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
