// core/hierarchy.rs
//
// Orbital hierarchy: a fixed parent-pointer tree of bodies.
// Each body circles its parent at a constant radius and angular rate; the
// root circles the viewport center.
//
// Usage:
//   let hierarchy = OrbitalHierarchy::new(bodies)?;
//   let pos = hierarchy.position_of(moon_id, t)?;

use std::collections::HashMap;

use glam::{DVec2, Vec2};

use crate::api::error::HierarchyError;
use crate::api::types::{BodyColor, BodyId};
use crate::systems::decor::Pulse;

/// Distance of a body from its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitRadius {
    /// Constant distance in pixels.
    Fixed(f64),
    /// Fraction of `min(viewport width, viewport height)`.
    ViewportFraction(f64),
}

impl OrbitRadius {
    /// Radius in pixels for the given geometry.
    pub fn resolve(&self, geometry: &Geometry) -> f64 {
        match *self {
            OrbitRadius::Fixed(r) => r,
            OrbitRadius::ViewportFraction(f) => f * geometry.extent(),
        }
    }

    fn raw(&self) -> f64 {
        match *self {
            OrbitRadius::Fixed(r) | OrbitRadius::ViewportFraction(r) => r,
        }
    }
}

/// Viewport-derived constants: the root's anchor and the extent used by
/// viewport-relative orbits. Always finite and non-degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    width: f64,
    height: f64,
    center: DVec2,
}

impl Geometry {
    /// Geometry for a viewport, centred in it. `None` when either side is
    /// zero, negative or non-finite.
    pub fn from_viewport(width: f32, height: f32) -> Option<Self> {
        let (w, h) = (width as f64, height as f64);
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return None;
        }
        Some(Self {
            width: w,
            height: h,
            center: DVec2::new(w / 2.0, h / 2.0),
        })
    }

    /// Same viewport size anchored at an explicit center.
    pub fn with_center(self, center: DVec2) -> Self {
        if center.is_finite() {
            Self { center, ..self }
        } else {
            self
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    /// Shorter viewport side.
    pub fn extent(&self) -> f64 {
        self.width.min(self.height)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            center: DVec2::new(400.0, 300.0),
        }
    }
}

/// One celestial body in the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalBody {
    pub id: BodyId,
    /// `None` only for the root.
    pub parent: Option<BodyId>,
    pub orbit_radius: OrbitRadius,
    /// Radians per simulation unit, relative to the parent. Sign sets direction.
    pub angular_speed: f64,
    /// Constant added to the angle.
    pub phase_offset: f64,

    // Presentation, passed through to the sink.
    pub visual_radius: f32,
    pub color: BodyColor,
    pub label: String,
    pub pulse: Option<Pulse>,
}

impl OrbitalBody {
    /// A root body sitting on the viewport center.
    pub fn root(id: BodyId) -> Self {
        Self {
            id,
            parent: None,
            orbit_radius: OrbitRadius::Fixed(0.0),
            angular_speed: 0.0,
            phase_offset: 0.0,
            visual_radius: 1.0,
            color: BodyColor::WHITE,
            label: String::new(),
            pulse: None,
        }
    }

    /// A body circling `parent` at a fixed radius.
    pub fn orbiting(id: BodyId, parent: BodyId, radius: f64, angular_speed: f64) -> Self {
        Self {
            parent: Some(parent),
            orbit_radius: OrbitRadius::Fixed(radius),
            angular_speed,
            ..Self::root(id)
        }
    }

    pub fn with_orbit_radius(mut self, radius: OrbitRadius) -> Self {
        self.orbit_radius = radius;
        self
    }

    pub fn with_phase(mut self, phase_offset: f64) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    pub fn with_visuals(mut self, visual_radius: f32, color: BodyColor) -> Self {
        self.visual_radius = visual_radius;
        self.color = color;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_pulse(mut self, pulse: Pulse) -> Self {
        self.pulse = Some(pulse);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Orbit angle at simulation time `t`.
    pub fn angle_at(&self, t: f64) -> f64 {
        self.angular_speed * t + self.phase_offset
    }

    /// Offset from the parent at time `t` for the given geometry.
    /// A zero radius yields zero regardless of the angle.
    pub fn offset_at(&self, t: f64, geometry: &Geometry) -> DVec2 {
        let r = self.orbit_radius.resolve(geometry);
        if r == 0.0 {
            return DVec2::ZERO;
        }
        let angle = self.angle_at(t);
        DVec2::new(r * angle.cos(), r * angle.sin())
    }

    fn validate(&self) -> Result<(), HierarchyError> {
        let radius = self.orbit_radius.raw();
        if !radius.is_finite() || radius < 0.0 {
            return Err(HierarchyError::InvalidRadius { id: self.id, radius });
        }
        if !self.angular_speed.is_finite() {
            return Err(HierarchyError::NonFiniteParameter {
                id: self.id,
                field: "angular speed",
            });
        }
        if !self.phase_offset.is_finite() {
            return Err(HierarchyError::NonFiniteParameter {
                id: self.id,
                field: "phase offset",
            });
        }
        Ok(())
    }
}

/// Immutable tree of orbiting bodies.
///
/// Bodies are stored parent-before-child; each keeps only a lookup index of
/// its parent, so there are no back references to manage.
#[derive(Debug, Clone)]
pub struct OrbitalHierarchy {
    bodies: Vec<OrbitalBody>,
    parents: Vec<Option<usize>>,
    index: HashMap<BodyId, usize>,
    geometry: Geometry,
}

impl OrbitalHierarchy {
    /// Validate and build the hierarchy.
    ///
    /// Requires exactly one root, unique ids, known parents, no cycles and
    /// finite, non-negative orbit parameters.
    pub fn new(bodies: Vec<OrbitalBody>) -> Result<Self, HierarchyError> {
        if bodies.is_empty() {
            return Err(HierarchyError::Empty);
        }

        let mut input_index = HashMap::with_capacity(bodies.len());
        let mut root: Option<BodyId> = None;
        for body in &bodies {
            body.validate()?;
            if input_index.insert(body.id, input_index.len()).is_some() {
                return Err(HierarchyError::DuplicateId(body.id));
            }
            if body.is_root() {
                if let Some(first) = root {
                    return Err(HierarchyError::MultipleRoots { first, second: body.id });
                }
                root = Some(body.id);
            }
        }
        if root.is_none() {
            return Err(HierarchyError::NoRoot);
        }

        // Depth of every body; a chain longer than the body count is a cycle.
        let mut depths = Vec::with_capacity(bodies.len());
        for body in &bodies {
            let mut depth = 0usize;
            let mut current = body;
            while let Some(parent) = current.parent {
                let &pi = input_index.get(&parent).ok_or(HierarchyError::UnknownParent {
                    child: current.id,
                    parent,
                })?;
                depth += 1;
                if depth > bodies.len() {
                    return Err(HierarchyError::Cycle(body.id));
                }
                current = &bodies[pi];
            }
            depths.push(depth);
        }

        // Stable sort by depth puts every parent before its children.
        let mut order: Vec<usize> = (0..bodies.len()).collect();
        order.sort_by_key(|&i| depths[i]);
        let mut slots: Vec<Option<OrbitalBody>> = bodies.into_iter().map(Some).collect();
        let bodies: Vec<OrbitalBody> = order.iter().filter_map(|&i| slots[i].take()).collect();

        let index: HashMap<BodyId, usize> =
            bodies.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
        let parents = bodies
            .iter()
            .map(|b| b.parent.and_then(|p| index.get(&p).copied()))
            .collect();

        Ok(Self {
            bodies,
            parents,
            index,
            geometry: Geometry::default(),
        })
    }

    /// Builder-style geometry override.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Absolute position of `id` at simulation time `t`.
    ///
    /// Walks the parent chain root-first, adding each orbit offset to the
    /// viewport center. Pure: the same inputs give bit-identical output.
    pub fn position_of(&self, id: BodyId, t: f64) -> Result<Vec2, HierarchyError> {
        let &start = self.index.get(&id).ok_or(HierarchyError::UnknownBody(id))?;

        let mut chain = Vec::with_capacity(4);
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            chain.push(i);
            cursor = self.parents[i];
        }

        let mut pos = self.geometry.center;
        for &i in chain.iter().rev() {
            pos += self.bodies[i].offset_at(t, &self.geometry);
        }

        let screen = pos.as_vec2();
        if screen.is_finite() {
            Ok(screen)
        } else {
            Err(HierarchyError::NonFinitePosition(id))
        }
    }

    /// Resolved orbit radius of `id` in pixels under the current geometry.
    pub fn orbit_radius_of(&self, id: BodyId) -> Option<f64> {
        self.get(id).map(|b| b.orbit_radius.resolve(&self.geometry))
    }

    /// Recompute geometry for a new viewport size.
    /// Degenerate sizes keep the last valid geometry and return `false`.
    pub fn set_viewport(&mut self, width: f32, height: f32) -> bool {
        match Geometry::from_viewport(width, height) {
            Some(geometry) => {
                self.geometry = geometry;
                true
            }
            None => false,
        }
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Bodies in parent-before-child order.
    pub fn bodies(&self) -> &[OrbitalBody] {
        &self.bodies
    }

    pub fn get(&self, id: BodyId) -> Option<&OrbitalBody> {
        self.index.get(&id).map(|&i| &self.bodies[i])
    }

    pub fn root(&self) -> &OrbitalBody {
        &self.bodies[0]
    }

    /// Parent of `id`, or `None` for the root and unknown ids.
    pub fn parent_of(&self, id: BodyId) -> Option<BodyId> {
        self.get(id).and_then(|b| b.parent)
    }

    /// Direct children of `id` in storage order.
    pub fn children_of(&self, id: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies
            .iter()
            .filter(move |b| b.parent == Some(id))
            .map(|b| b.id)
    }

    /// Number of edges between `id` and the root.
    pub fn depth_of(&self, id: BodyId) -> Option<usize> {
        let &start = self.index.get(&id)?;
        let mut depth = 0;
        let mut cursor = self.parents[start];
        while let Some(i) = cursor {
            depth += 1;
            cursor = self.parents[i];
        }
        Some(depth)
    }

    /// Storage index of `id` (parent-before-child order).
    pub fn index_of(&self, id: BodyId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Storage index of the parent of the body at `index`.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
