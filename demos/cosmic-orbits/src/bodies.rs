//! The four-body chain: galactic center, sun, earth, moon.
//!
//! Sizes are screen pixels, rates are radians per simulation unit.

use cosmic_engine::{
    BodyColor, BodyId, HierarchyError, OrbitRadius, OrbitalBody, OrbitalHierarchy, Pulse,
};

pub const GALACTIC_CENTER: BodyId = BodyId(0);
pub const SUN: BodyId = BodyId(1);
pub const EARTH: BodyId = BodyId(2);
pub const MOON: BodyId = BodyId(3);

// ── Galactic center ─────────────────────────────────────────────────

pub const GALACTIC_RADIUS_PX: f32 = 18.0;
pub const GALACTIC_PULSE: Pulse = Pulse::new(0.5, 0.3);

// ── Sun ─────────────────────────────────────────────────────────────

/// Sun orbit as a fraction of the shorter viewport side.
pub const SUN_ORBIT_FRACTION: f64 = 0.25;
pub const SUN_ANGULAR_SPEED: f64 = 0.1;
pub const SUN_RADIUS_PX: f32 = 14.0;
pub const SUN_PULSE: Pulse = Pulse::new(3.0, 0.2);

// ── Earth ───────────────────────────────────────────────────────────

pub const EARTH_ORBIT_PX: f64 = 60.0;
pub const EARTH_ANGULAR_SPEED: f64 = 1.5;
pub const EARTH_RADIUS_PX: f32 = 9.0;

// ── Moon ────────────────────────────────────────────────────────────

pub const MOON_ORBIT_PX: f64 = 20.0;
pub const MOON_ANGULAR_SPEED: f64 = 5.0;
pub const MOON_RADIUS_PX: f32 = 4.0;

pub fn cosmic_chain() -> Result<OrbitalHierarchy, HierarchyError> {
    OrbitalHierarchy::new(vec![
        OrbitalBody::root(GALACTIC_CENTER)
            .with_visuals(GALACTIC_RADIUS_PX, BodyColor::rgb8(255, 153, 255))
            .with_label("Galactic Center")
            .with_pulse(GALACTIC_PULSE),
        OrbitalBody::orbiting(SUN, GALACTIC_CENTER, 0.0, SUN_ANGULAR_SPEED)
            .with_orbit_radius(OrbitRadius::ViewportFraction(SUN_ORBIT_FRACTION))
            .with_visuals(SUN_RADIUS_PX, BodyColor::rgb8(255, 204, 0))
            .with_label("Sun")
            .with_pulse(SUN_PULSE),
        OrbitalBody::orbiting(EARTH, SUN, EARTH_ORBIT_PX, EARTH_ANGULAR_SPEED)
            .with_visuals(EARTH_RADIUS_PX, BodyColor::rgb8(100, 149, 237))
            .with_label("Earth"),
        OrbitalBody::orbiting(MOON, EARTH, MOON_ORBIT_PX, MOON_ANGULAR_SPEED)
            .with_visuals(MOON_RADIUS_PX, BodyColor::rgb8(192, 192, 192))
            .with_label("Moon"),
    ])
}
