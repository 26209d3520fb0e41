//! Decorative effects computed purely from simulation time.
//!
//! Nothing here carries state between frames: twinkle and pulse are
//! oscillations of `time`, and the star field is a fixed function of the
//! viewport size. Sinks call these while drawing; body positions and trails
//! never depend on them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of background stars drawn by the default overlay.
pub const STAR_COUNT: usize = 300;

/// Periodic size oscillation of a body's disc and glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    /// Angular rate in radians per simulation unit.
    pub rate: f64,
    /// Peak relative size change (0.3 = ±30%).
    pub amplitude: f64,
}

impl Pulse {
    pub const fn new(rate: f64, amplitude: f64) -> Self {
        Self { rate, amplitude }
    }

    /// Scale factor at `time`, centred on 1.0.
    pub fn scale_at(&self, time: f64) -> f32 {
        let s = 1.0 + self.amplitude * (self.rate * time).sin();
        if s.is_finite() {
            s as f32
        } else {
            1.0
        }
    }
}

/// Twinkle phase of star `index` at `time`, in 0.0 - 1.0.
pub fn twinkle(time: f64, index: usize) -> f32 {
    let v = (time * 2.0 + index as f64).sin() * 0.5 + 0.5;
    if v.is_finite() {
        v as f32
    } else {
        0.5
    }
}

/// One background star for a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub alpha: f32,
}

/// Deterministic star field scattered over a `width` × `height` viewport.
/// Empty for degenerate viewports.
pub fn star_field(width: f32, height: f32, count: usize, time: f64) -> impl Iterator<Item = Star> {
    let usable = width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0;
    let count = if usable { count } else { 0 };
    (0..count).map(move |i| {
        let x = ((i * 127 + 50) as f32).rem_euclid(width);
        let y = ((i * 211 + 30) as f32).rem_euclid(height);
        let tw = twinkle(time, i);
        Star {
            pos: Vec2::new(x, y),
            size: ((i % 3) as f32 * 0.5 + 0.5) * (0.5 + tw * 0.5),
            alpha: 0.3 + tw * 0.7,
        }
    })
}
