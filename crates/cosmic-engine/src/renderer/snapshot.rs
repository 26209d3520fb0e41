use glam::Vec2;

use crate::api::types::BodyId;
use crate::core::hierarchy::OrbitalBody;
use crate::core::trail::TrailBuffer;

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Circle a body travels on, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitRing {
    pub center: Vec2,
    pub radius: f32,
    /// Depth of the orbiting body; 1 for children of the root.
    pub depth: usize,
}

/// One body's state in a frame.
#[derive(Debug, Clone, Copy)]
pub struct BodyFrame<'a> {
    /// Static description, including presentation attributes.
    pub body: &'a OrbitalBody,
    pub position: Vec2,
    /// Parent position and resolved radius. `None` for the root.
    pub orbit: Option<OrbitRing>,
    /// Recent positions, oldest first.
    pub trail: &'a TrailBuffer,
}

impl BodyFrame<'_> {
    pub fn id(&self) -> BodyId {
        self.body.id
    }
}

/// Everything a rendering sink needs for one frame.
///
/// Borrowed from the orchestrator for the duration of the sink call and
/// dropped afterwards.
#[derive(Debug, Clone)]
pub struct FrameSnapshot<'a> {
    /// Frame counter, starting at 1.
    pub frame: u64,
    /// Simulation time shared by every body in this frame.
    pub time: f64,
    pub viewport: Viewport,
    pub paused: bool,
    pub speed_multiplier: f64,
    pub show_orbits: bool,
    pub show_labels: bool,
    /// Bodies in parent-before-child order. Bodies whose position could not
    /// be computed this frame are absent.
    pub bodies: Vec<BodyFrame<'a>>,
}

impl<'a> FrameSnapshot<'a> {
    pub fn get(&self, id: BodyId) -> Option<&BodyFrame<'a>> {
        self.bodies.iter().find(|b| b.body.id == id)
    }

    pub fn position_of(&self, id: BodyId) -> Option<Vec2> {
        self.get(id).map(|b| b.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyFrame<'a>> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
