//! Lyon-based vector tessellation for the orbit overlay.
//!
//! Turns circles, dashed rings and line segments into a flat triangle-list
//! vertex buffer that the browser renders with WebGPU or uploads to a 2D
//! fallback.
//!
//! # Usage
//!
//! ```ignore
//! let mut vectors = VectorState::new();
//! vectors.fill_circle(sun, 14.0, BodyColor::rgb8(255, 204, 0));
//! vectors.stroke_dashed_circle(sun, 60.0, 1.5, 3.0, 3.0, ring_color);
//! vectors.stroke_segment(a, b, 2.0, trail_color);
//! ```

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::point;
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::api::types::BodyColor;

/// Tessellation tolerance in pixels.
const TOLERANCE: f32 = 0.25;

/// Upper bound on dashes per ring; wider rings get longer dashes instead.
pub const MAX_RING_DASHES: usize = 720;

/// Upper bound on line steps per dash arc.
const MAX_DASH_STEPS: usize = 8;

/// Per-vertex data. 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4; // 24
}

/// Colors every vertex lyon emits, for both fill and stroke.
struct Paint(BodyColor);

impl Paint {
    fn vertex(&self, x: f32, y: f32) -> VectorVertex {
        let c = self.0;
        VectorVertex { x, y, r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

impl FillVertexConstructor<VectorVertex> for Paint {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        let p = vertex.position();
        self.vertex(p.x, p.y)
    }
}

impl StrokeVertexConstructor<VectorVertex> for Paint {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        let p = vertex.position();
        self.vertex(p.x, p.y)
    }
}

/// Tessellators plus the output vertex buffer.
/// Cleared each frame and repopulated by drawing commands.
pub struct VectorState {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
}

impl VectorState {
    pub fn new() -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(8192 * VectorVertex::FLOATS),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    /// Triangle-list vertices, 6 floats each.
    pub fn as_slice(&self) -> &[f32] {
        &self.buffer
    }

    pub fn vertices(&self) -> &[VectorVertex] {
        bytemuck::cast_slice(&self.buffer)
    }

    /// Raw pointer to the flat float buffer.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    /// Expand indexed geometry into the flat triangle list.
    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            let v = self.geometry.vertices[*idx as usize];
            self.buffer.extend_from_slice(bytemuck::cast_slice(&[v]));
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: BodyColor) {
        if !(radius > 0.0 && center.is_finite()) || color.a <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.add_circle(point(center.x, center.y), radius, Winding::Positive);
        self.fill_path(&builder.build(), color);
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: BodyColor) {
        if !(radius > 0.0 && width > 0.0 && center.is_finite()) {
            return;
        }
        let mut builder = Path::builder();
        builder.add_circle(point(center.x, center.y), radius, Winding::Positive);
        self.stroke_path(&builder.build(), width, color);
    }

    /// Ring drawn as `dash`-long arcs separated by `gap`, both in pixels
    /// along the circumference.
    pub fn stroke_dashed_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        width: f32,
        dash: f32,
        gap: f32,
        color: BodyColor,
    ) {
        if !(radius > 0.0 && width > 0.0 && center.is_finite()) {
            return;
        }
        if !(dash > 0.0 && gap > 0.0) {
            self.stroke_circle(center, radius, width, color);
            return;
        }

        let circumference = TAU * radius;
        let count = ((circumference / (dash + gap)).floor().max(1.0) as usize).min(MAX_RING_DASHES);
        let period = TAU / count as f32;
        let sweep = period * dash / (dash + gap);
        // Chord length of roughly 2px per arc step.
        let steps = ((sweep * radius / 2.0).ceil() as usize).clamp(1, MAX_DASH_STEPS);

        let at = |angle: f32| {
            let p = center + Vec2::from_angle(angle) * radius;
            point(p.x, p.y)
        };
        let mut builder = Path::builder();
        for k in 0..count {
            let start = k as f32 * period;
            builder.begin(at(start));
            for s in 1..=steps {
                builder.line_to(at(start + sweep * s as f32 / steps as f32));
            }
            builder.end(false);
        }
        self.stroke_path(&builder.build(), width, color);
    }

    /// Single straight line with butt caps.
    pub fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f32, color: BodyColor) {
        if width <= 0.0 || color.a <= 0.0 || !(from.is_finite() && to.is_finite()) || from == to {
            return;
        }
        let mut builder = Path::builder();
        builder.begin(point(from.x, from.y));
        builder.line_to(point(to.x, to.y));
        builder.end(false);
        self.stroke_path(&builder.build(), width, color);
    }

    pub fn fill_path(&mut self, path: &Path, color: BodyColor) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut self.geometry, Paint(color)),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(err) => {
                log::warn!("fill tessellation failed: {err:?}");
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    pub fn stroke_path(&mut self, path: &Path, width: f32, color: BodyColor) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(TOLERANCE).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.geometry, Paint(color)),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(err) => {
                log::warn!("stroke tessellation failed: {err:?}");
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}
