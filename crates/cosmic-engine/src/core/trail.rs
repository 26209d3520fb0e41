use std::collections::{HashMap, VecDeque};

use glam::Vec2;

use crate::api::types::BodyId;

/// Bounded FIFO history of one body's recent positions, oldest first.
///
/// `len() <= capacity()` holds after every call. A zero capacity keeps the
/// buffer empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<Vec2>,
    capacity: usize,
}

/// Shared empty trail handed to sinks for bodies without history.
pub static EMPTY_TRAIL: TrailBuffer = TrailBuffer::EMPTY;

impl TrailBuffer {
    pub const EMPTY: Self = Self {
        points: VecDeque::new(),
        capacity: 0,
    };

    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest ones beyond capacity.
    pub fn record(&mut self, point: Vec2) {
        if self.capacity == 0 {
            self.points.clear();
            return;
        }
        self.points.push_back(point);
        self.trim();
    }

    /// Change capacity. Excess oldest points are dropped immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    fn trim(&mut self) {
        if self.points.len() > self.capacity {
            let excess = self.points.len() - self.capacity;
            self.points.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Vec2> + DoubleEndedIterator + '_ {
        self.points.iter().copied()
    }

    pub fn oldest(&self) -> Option<Vec2> {
        self.points.front().copied()
    }

    pub fn newest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Which trail buffers a capacity change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityScope {
    /// Every buffer, and buffers created later.
    All,
    /// A single body's buffer.
    Body(BodyId),
}

/// One [`TrailBuffer`] per body, each capacity-limited on its own.
#[derive(Debug, Clone, Default)]
pub struct TrailSet {
    buffers: HashMap<BodyId, TrailBuffer>,
    default_capacity: usize,
}

impl TrailSet {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            default_capacity,
        }
    }

    /// Append a point to `id`'s trail, creating the buffer on first use.
    pub fn record(&mut self, id: BodyId, point: Vec2) {
        let capacity = self.default_capacity;
        self.buffers
            .entry(id)
            .or_insert_with(|| TrailBuffer::new(capacity))
            .record(point);
    }

    pub fn set_capacity(&mut self, scope: CapacityScope, capacity: usize) {
        match scope {
            CapacityScope::All => {
                self.default_capacity = capacity;
                for buffer in self.buffers.values_mut() {
                    buffer.set_capacity(capacity);
                }
            }
            CapacityScope::Body(id) => {
                self.buffers
                    .entry(id)
                    .or_insert_with(|| TrailBuffer::new(capacity))
                    .set_capacity(capacity);
            }
        }
    }

    pub fn get(&self, id: BodyId) -> Option<&TrailBuffer> {
        self.buffers.get(&id)
    }

    /// Trail of `id`, or the shared empty trail.
    pub fn trail(&self, id: BodyId) -> &TrailBuffer {
        self.buffers.get(&id).unwrap_or(&EMPTY_TRAIL)
    }

    pub fn clear(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.clear();
        }
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    /// Total points held across every body.
    pub fn total_points(&self) -> usize {
        self.buffers.values().map(TrailBuffer::len).sum()
    }
}
