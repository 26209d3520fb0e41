//! Frame buffer layout shared with the JS renderer, which reads it through
//! `get_frame_ptr` / `get_frame_len` exported by `cosmic-web`.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 12 floats]
//! [Bodies: body_count × 16 floats]
//! [Trails: trail_point_count × 2 floats (x, y), grouped per body, oldest first]
//! ```
//!
//! Rewritten every frame. TypeScript reads counts and section offsets from
//! the header.

use bytemuck::{Pod, Zeroable};

use crate::renderer::snapshot::{BodyFrame, FrameSnapshot};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_SIM_TIME: usize = 2;
pub const HEADER_VIEWPORT_WIDTH: usize = 3;
pub const HEADER_VIEWPORT_HEIGHT: usize = 4;
pub const HEADER_FLAGS: usize = 5;
pub const HEADER_SPEED: usize = 6;
pub const HEADER_BODY_COUNT: usize = 7;
pub const HEADER_TRAIL_POINT_COUNT: usize = 8;
pub const HEADER_BODY_DATA_OFFSET: usize = 9;
pub const HEADER_TRAIL_DATA_OFFSET: usize = 10;
pub const HEADER_RESERVED: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Bits of `HEADER_FLAGS`.
pub const FLAG_SHOW_ORBITS: u32 = 1;
pub const FLAG_SHOW_LABELS: u32 = 1 << 1;
pub const FLAG_PAUSED: u32 = 1 << 2;

/// Floats per trail point: x, y (wire format, never changes).
pub const TRAIL_POINT_FLOATS: usize = 2;

/// Per-body record. 16 floats = 64 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyRecord {
    pub id: f32,
    /// Parent id, or -1 for the root.
    pub parent: f32,
    pub x: f32,
    pub y: f32,
    /// Visual disc radius in pixels.
    pub radius: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    /// Orbit ring center and radius. Radius 0 for the root.
    pub orbit_x: f32,
    pub orbit_y: f32,
    pub orbit_radius: f32,
    /// First trail point of this body, counted in points from the start of
    /// the trail section.
    pub trail_start: f32,
    pub trail_len: f32,
    /// Pulse scale applied to the disc (1.0 without a pulse).
    pub scale: f32,
    pub _pad: f32,
}

impl BodyRecord {
    pub const FLOATS: usize = 16;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn from_frame(body: &BodyFrame<'_>, time: f64, trail_start: usize) -> Self {
        let desc = body.body;
        let (orbit_x, orbit_y, orbit_radius) = match body.orbit {
            Some(ring) => (ring.center.x, ring.center.y, ring.radius),
            None => (body.position.x, body.position.y, 0.0),
        };
        Self {
            id: desc.id.0 as f32,
            parent: desc.parent.map_or(-1.0, |p| p.0 as f32),
            x: body.position.x,
            y: body.position.y,
            radius: desc.visual_radius,
            r: desc.color.r,
            g: desc.color.g,
            b: desc.color.b,
            a: desc.color.a,
            orbit_x,
            orbit_y,
            orbit_radius,
            trail_start: trail_start as f32,
            trail_len: body.trail.len() as f32,
            scale: desc.pulse.map_or(1.0, |p| p.scale_at(time)),
            _pad: 0.0,
        }
    }
}

/// Packed frame ready to be copied into a typed array.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    data: Vec<f32>,
    body_count: usize,
    trail_points: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(HEADER_FLOATS + 16 * BodyRecord::FLOATS),
            body_count: 0,
            trail_points: 0,
        }
    }

    /// Overwrite the buffer with `frame`. Reuses the allocation.
    pub fn pack(&mut self, frame: &FrameSnapshot<'_>) {
        let body_count = frame.len();
        let trail_points: usize = frame.iter().map(|b| b.trail.len()).sum();
        let body_offset = HEADER_FLOATS;
        let trail_offset = body_offset + body_count * BodyRecord::FLOATS;

        let mut flags = 0;
        if frame.show_orbits {
            flags |= FLAG_SHOW_ORBITS;
        }
        if frame.show_labels {
            flags |= FLAG_SHOW_LABELS;
        }
        if frame.paused {
            flags |= FLAG_PAUSED;
        }

        self.data.clear();
        self.data.resize(HEADER_FLOATS, 0.0);
        self.data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        self.data[HEADER_FRAME_COUNTER] = frame.frame as f32;
        self.data[HEADER_SIM_TIME] = frame.time as f32;
        self.data[HEADER_VIEWPORT_WIDTH] = frame.viewport.width;
        self.data[HEADER_VIEWPORT_HEIGHT] = frame.viewport.height;
        self.data[HEADER_FLAGS] = flags as f32;
        self.data[HEADER_SPEED] = frame.speed_multiplier as f32;
        self.data[HEADER_BODY_COUNT] = body_count as f32;
        self.data[HEADER_TRAIL_POINT_COUNT] = trail_points as f32;
        self.data[HEADER_BODY_DATA_OFFSET] = body_offset as f32;
        self.data[HEADER_TRAIL_DATA_OFFSET] = trail_offset as f32;

        let mut trail_start = 0;
        for body in frame.iter() {
            let record = BodyRecord::from_frame(body, frame.time, trail_start);
            self.data.extend_from_slice(bytemuck::cast_slice(&[record]));
            trail_start += body.trail.len();
        }
        for body in frame.iter() {
            for point in body.trail.iter() {
                self.data.push(point.x);
                self.data.push(point.y);
            }
        }

        self.body_count = body_count;
        self.trail_points = trail_points;
    }

    pub fn header(&self, index: usize) -> f32 {
        self.data.get(index).copied().unwrap_or(0.0)
    }

    /// Body section reinterpreted as records.
    pub fn bodies(&self) -> &[BodyRecord] {
        let start = HEADER_FLOATS.min(self.data.len());
        let end = start + self.body_count * BodyRecord::FLOATS;
        bytemuck::cast_slice(&self.data[start..end])
    }

    /// Trail section as flat x, y pairs.
    pub fn trail_data(&self) -> &[f32] {
        let start = HEADER_FLOATS + self.body_count * BodyRecord::FLOATS;
        self.data.get(start..).unwrap_or(&[])
    }

    pub fn trail_point_count(&self) -> usize {
        self.trail_points
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw pointer for zero-copy reads from wasm memory.
    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    /// Length in floats.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{BodyColor, BodyId};
    use crate::core::hierarchy::{OrbitalBody, OrbitalHierarchy};
    use crate::core::trail::TrailSet;
    use crate::renderer::snapshot::{OrbitRing, Viewport};
    use crate::systems::decor::Pulse;
    use glam::Vec2;

    fn hierarchy() -> OrbitalHierarchy {
        OrbitalHierarchy::new(vec![
            OrbitalBody::root(BodyId(0)).with_visuals(3.0, BodyColor::WHITE),
            OrbitalBody::orbiting(BodyId(1), BodyId(0), 100.0, 0.1)
                .with_visuals(25.0, BodyColor::rgb(1.0, 0.8, 0.0))
                .with_pulse(Pulse::new(2.0, 0.05)),
        ])
        .unwrap()
    }

    fn snapshot<'a>(h: &'a OrbitalHierarchy, trails: &'a TrailSet) -> FrameSnapshot<'a> {
        let root = &h.bodies()[0];
        let star = &h.bodies()[1];
        FrameSnapshot {
            frame: 7,
            time: 1.5,
            viewport: Viewport { width: 800.0, height: 600.0 },
            paused: true,
            speed_multiplier: 2.0,
            show_orbits: true,
            show_labels: false,
            bodies: vec![
                BodyFrame {
                    body: root,
                    position: Vec2::new(400.0, 300.0),
                    orbit: None,
                    trail: trails.trail(root.id),
                },
                BodyFrame {
                    body: star,
                    position: Vec2::new(500.0, 300.0),
                    orbit: Some(OrbitRing { center: Vec2::new(400.0, 300.0), radius: 100.0, depth: 1 }),
                    trail: trails.trail(star.id),
                },
            ],
        }
    }

    #[test]
    fn body_record_is_16_floats() {
        assert_eq!(std::mem::size_of::<BodyRecord>(), 64);
        assert_eq!(BodyRecord::STRIDE_BYTES, 64);
    }

    #[test]
    fn header_describes_frame() {
        let h = hierarchy();
        let mut trails = TrailSet::new(10);
        trails.record(BodyId(1), Vec2::new(1.0, 2.0));
        trails.record(BodyId(1), Vec2::new(3.0, 4.0));
        trails.record(BodyId(0), Vec2::new(5.0, 6.0));

        let mut buf = FrameBuffer::new();
        buf.pack(&snapshot(&h, &trails));

        assert_eq!(buf.header(HEADER_PROTOCOL_VERSION), PROTOCOL_VERSION);
        assert_eq!(buf.header(HEADER_FRAME_COUNTER), 7.0);
        assert_eq!(buf.header(HEADER_SIM_TIME), 1.5);
        assert_eq!(buf.header(HEADER_FLAGS), (FLAG_SHOW_ORBITS | FLAG_PAUSED) as f32);
        assert_eq!(buf.header(HEADER_SPEED), 2.0);
        assert_eq!(buf.header(HEADER_BODY_COUNT), 2.0);
        assert_eq!(buf.header(HEADER_TRAIL_POINT_COUNT), 3.0);
        assert_eq!(buf.header(HEADER_BODY_DATA_OFFSET), HEADER_FLOATS as f32);
        assert_eq!(buf.header(HEADER_TRAIL_DATA_OFFSET), (HEADER_FLOATS + 32) as f32);
        assert_eq!(buf.len(), HEADER_FLOATS + 32 + 6);
    }

    #[test]
    fn records_and_trails_line_up() {
        let h = hierarchy();
        let mut trails = TrailSet::new(10);
        trails.record(BodyId(0), Vec2::new(5.0, 6.0));
        trails.record(BodyId(1), Vec2::new(1.0, 2.0));
        trails.record(BodyId(1), Vec2::new(3.0, 4.0));

        let mut buf = FrameBuffer::new();
        buf.pack(&snapshot(&h, &trails));

        let records = buf.bodies();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parent, -1.0);
        assert_eq!(records[0].orbit_radius, 0.0);
        assert_eq!(records[0].scale, 1.0);
        assert_eq!((records[0].trail_start, records[0].trail_len), (0.0, 1.0));

        assert_eq!(records[1].id, 1.0);
        assert_eq!(records[1].parent, 0.0);
        assert_eq!((records[1].x, records[1].y), (500.0, 300.0));
        assert_eq!(records[1].radius, 25.0);
        assert_eq!(records[1].orbit_radius, 100.0);
        assert_eq!((records[1].trail_start, records[1].trail_len), (1.0, 2.0));
        assert_ne!(records[1].scale, 1.0);

        assert_eq!(buf.trail_data(), &[5.0, 6.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buf.trail_point_count(), 3);
    }

    #[test]
    fn repack_shrinks() {
        let h = hierarchy();
        let mut trails = TrailSet::new(10);
        trails.record(BodyId(1), Vec2::ONE);
        let mut buf = FrameBuffer::new();
        buf.pack(&snapshot(&h, &trails));

        trails.clear();
        buf.pack(&snapshot(&h, &trails));
        assert_eq!(buf.trail_point_count(), 0);
        assert!(buf.trail_data().is_empty());
        assert_eq!(buf.len(), HEADER_FLOATS + 32);
    }

    #[test]
    fn empty_buffer_has_no_sections() {
        let buf = FrameBuffer::new();
        assert!(buf.is_empty());
        assert!(buf.bodies().is_empty());
        assert!(buf.trail_data().is_empty());
        assert_eq!(buf.header(HEADER_BODY_COUNT), 0.0);
    }
}
