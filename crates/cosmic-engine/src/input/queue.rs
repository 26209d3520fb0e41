use crate::api::config::{AnimationConfig, ConfigPatch};

/// Control events sent by the UI layer (buttons, sliders, checkboxes) and the
/// surface adapter. Queued between frames and applied at the start of the
/// next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    SetPaused(bool),
    TogglePause,
    /// Requested speed multiplier, clamped when applied.
    SetSpeed(f64),
    /// Requested trail length, clamped into `0..=150` when applied.
    SetTrailLength(f64),
    SetShowOrbits(bool),
    SetShowLabels(bool),
    /// Several fields at once, e.g. parsed from JSON.
    Patch(ConfigPatch),
    /// The drawing surface changed size.
    Resize { width: f32, height: f32 },
}

impl ControlEvent {
    /// Apply a configuration event. Returns `false` for events that are not
    /// configuration (resize).
    pub fn apply_to(&self, config: &mut AnimationConfig) -> bool {
        match self {
            ControlEvent::SetPaused(paused) => config.paused = *paused,
            ControlEvent::TogglePause => config.toggle_pause(),
            ControlEvent::SetSpeed(speed) => config.set_speed(*speed),
            ControlEvent::SetTrailLength(length) => config.set_trail_length(*length),
            ControlEvent::SetShowOrbits(show) => config.show_orbits = *show,
            ControlEvent::SetShowLabels(show) => config.show_labels = *show,
            ControlEvent::Patch(patch) => config.apply(patch),
            ControlEvent::Resize { .. } => return false,
        }
        true
    }
}

/// A queue of control events.
/// The UI pushes at any time; the orchestrator drains once per tick.
#[derive(Debug)]
pub struct ControlQueue {
    events: Vec<ControlEvent>,
}

impl ControlQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}
