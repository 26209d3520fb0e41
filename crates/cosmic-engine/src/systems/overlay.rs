//! Tessellated picture of one frame: star field, dashed orbit rings, fading
//! trails, glowing discs. Usable directly as a [`RenderSink`].

use glam::Vec2;

use crate::api::error::SinkError;
use crate::api::types::BodyColor;
use crate::core::trail::TrailBuffer;
use crate::renderer::snapshot::FrameSnapshot;
use crate::renderer::traits::RenderSink;
use crate::systems::decor::{star_field, STAR_COUNT};
use crate::systems::vector::VectorState;

/// Stroke for one orbit ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingStyle {
    pub color: BodyColor,
    pub width: f32,
    pub dash: f32,
    pub gap: f32,
}

/// Rings get finer and greyer the deeper the orbiting body sits.
pub fn ring_style(depth: usize) -> RingStyle {
    match depth {
        0 | 1 => RingStyle {
            color: BodyColor::new(1.0, 1.0, 150.0 / 255.0, 0.25),
            width: 2.0,
            dash: 5.0,
            gap: 5.0,
        },
        2 => RingStyle {
            color: BodyColor::new(100.0 / 255.0, 150.0 / 255.0, 1.0, 0.35),
            width: 1.5,
            dash: 3.0,
            gap: 3.0,
        },
        _ => RingStyle {
            color: BodyColor::new(200.0 / 255.0, 200.0 / 255.0, 200.0 / 255.0, 0.3),
            width: 1.0,
            dash: 2.0,
            gap: 2.0,
        },
    }
}

/// Outer glow radius relative to the disc.
const GLOW_SCALE: f32 = 2.5;

/// Peak trail opacity and width, reached at the newest segment.
const TRAIL_MAX_ALPHA: f32 = 0.6;
const TRAIL_MAX_WIDTH: f32 = 2.0;

/// One drawable piece of a trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub from: Vec2,
    pub to: Vec2,
    /// `i / n` for the segment ending at point `i` of `n` (zero-based).
    pub recency: f32,
    pub alpha: f32,
    pub width: f32,
}

/// Segments between consecutive trail points, oldest first, weighted so the
/// tail fades out.
pub fn trail_segments(trail: &TrailBuffer) -> impl Iterator<Item = TrailSegment> + '_ {
    let n = trail.len() as f32;
    trail
        .iter()
        .zip(trail.iter().skip(1))
        .enumerate()
        .map(move |(i, (from, to))| {
            let recency = (i + 1) as f32 / n;
            TrailSegment {
                from,
                to,
                recency,
                alpha: TRAIL_MAX_ALPHA * recency,
                width: TRAIL_MAX_WIDTH * recency,
            }
        })
}

/// Vector overlay rebuilt from scratch every frame.
pub struct Overlay {
    vectors: VectorState,
    star_count: usize,
}

impl Overlay {
    pub fn new() -> Self {
        Self {
            vectors: VectorState::new(),
            star_count: STAR_COUNT,
        }
    }

    pub fn with_star_count(mut self, star_count: usize) -> Self {
        self.star_count = star_count;
        self
    }

    pub fn vectors(&self) -> &VectorState {
        &self.vectors
    }

    /// Tessellate `frame` into the vertex buffer, replacing the last frame.
    pub fn draw(&mut self, frame: &FrameSnapshot<'_>) {
        let v = &mut self.vectors;
        v.clear();

        for star in star_field(frame.viewport.width, frame.viewport.height, self.star_count, frame.time) {
            v.fill_circle(star.pos, star.size, BodyColor::WHITE.with_alpha(star.alpha));
        }

        if frame.show_orbits {
            for ring in frame.iter().filter_map(|b| b.orbit) {
                let style = ring_style(ring.depth);
                v.stroke_dashed_circle(ring.center, ring.radius, style.width, style.dash, style.gap, style.color);
            }
        }

        for body in frame.iter() {
            let color = body.body.color;
            for seg in trail_segments(body.trail) {
                v.stroke_segment(seg.from, seg.to, seg.width, color.with_alpha(color.a * seg.alpha));
            }
        }

        for body in frame.iter() {
            let desc = body.body;
            let scale = desc.pulse.map_or(1.0, |p| p.scale_at(frame.time));
            let radius = desc.visual_radius * scale;
            v.fill_circle(body.position, radius * GLOW_SCALE, desc.color.with_alpha(0.12));
            v.fill_circle(body.position, radius * 1.5, desc.color.with_alpha(0.25));
            v.fill_circle(body.position, radius, desc.color);
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for Overlay {
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), SinkError> {
        self.draw(frame);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "lyon"
    }
}
