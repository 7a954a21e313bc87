//! Point lights moving on closed-form paths.
//!
//! Positions are pure functions of elapsed seconds; nothing is integrated.

use std::f32::consts::PI;

use glam::Vec3;

pub const LIGHT_COUNT: usize = 4;

/// Constant radiant intensity per light.
pub const LIGHT_INTENSITIES: [Vec3; LIGHT_COUNT] = [
    Vec3::splat(15.0),
    Vec3::splat(10.0),
    Vec3::splat(8.0),
    Vec3::splat(5.0),
];

/// Light positions at `t` seconds:
/// - two lights circling opposite each other above the grid
/// - one bobbing straight above the origin
/// - one circling slowly below
pub fn light_positions(t: f32) -> [Vec3; LIGHT_COUNT] {
    let orbit = t * 0.7;
    [
        Vec3::new(6.0 * orbit.cos(), 4.0, 6.0 * orbit.sin()),
        Vec3::new(6.0 * (orbit + PI).cos(), 4.0, 6.0 * (orbit + PI).sin()),
        Vec3::new(0.0, 6.0 + 1.5 * (t * 1.3).sin(), 0.0),
        Vec3::new(8.0 * (t * 0.35).cos(), -2.5, 8.0 * (t * 0.35).sin()),
    ]
}
