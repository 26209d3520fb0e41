use serde::{Deserialize, Serialize};

/// Upper bound of the trail length slider.
pub const MAX_TRAIL_LENGTH: usize = 150;

/// Speed used when the UI sends a zero or negative multiplier.
pub const MIN_SPEED_MULTIPLIER: f64 = 0.01;

/// Per-frame configuration read by the orchestrator at the start of each tick.
///
/// Values are always in range: every setter clamps instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Freezes simulation time. Frames keep being produced.
    pub paused: bool,
    /// Multiplier on the base simulation rate. Always positive.
    pub speed_multiplier: f64,
    /// Trail capacity shared by every body (0 disables trails).
    pub trail_length: usize,
    /// Rendering hint: draw orbit paths.
    pub show_orbits: bool,
    /// Rendering hint: draw body labels.
    pub show_labels: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            paused: false,
            speed_multiplier: 1.0,
            trail_length: 0,
            show_orbits: true,
            show_labels: true,
        }
    }
}

impl AnimationConfig {
    /// Set the speed multiplier. Zero or negative values clamp to
    /// [`MIN_SPEED_MULTIPLIER`]; NaN and infinities are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        match clamp_speed(speed) {
            Some(s) => {
                if s != speed {
                    log::warn!("speed multiplier {speed} clamped to {s}");
                }
                self.speed_multiplier = s;
            }
            None => log::warn!("ignoring non-finite speed multiplier {speed}"),
        }
    }

    /// Set the trail length, rounding and clamping into `0..=MAX_TRAIL_LENGTH`.
    pub fn set_trail_length(&mut self, length: f64) {
        let clamped = clamp_trail_length(length);
        if clamped as f64 != length {
            log::warn!("trail length {length} clamped to {clamped}");
        }
        self.trail_length = clamped;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Apply every field present in the patch.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(paused) = patch.paused {
            self.paused = paused;
        }
        if let Some(speed) = patch.speed_multiplier {
            self.set_speed(speed);
        }
        if let Some(length) = patch.trail_length {
            self.set_trail_length(length);
        }
        if let Some(show) = patch.show_orbits {
            self.show_orbits = show;
        }
        if let Some(show) = patch.show_labels {
            self.show_labels = show;
        }
    }

    /// Copy of this configuration with every field forced into range.
    pub fn sanitized(self) -> Self {
        Self {
            speed_multiplier: clamp_speed(self.speed_multiplier).unwrap_or(1.0),
            trail_length: self.trail_length.min(MAX_TRAIL_LENGTH),
            ..self
        }
    }
}

/// Partial configuration update sent by the UI as camelCase JSON.
///
/// ```json
/// { "paused": true, "speedMultiplier": 8, "trailLength": 120 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub paused: Option<bool>,
    pub speed_multiplier: Option<f64>,
    /// Slider values arrive as JSON numbers, possibly fractional or negative.
    pub trail_length: Option<f64>,
    pub show_orbits: Option<bool>,
    pub show_labels: Option<bool>,
}

impl ConfigPatch {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Clamp a requested speed multiplier. Returns `None` for NaN or infinity.
pub fn clamp_speed(speed: f64) -> Option<f64> {
    if !speed.is_finite() {
        None
    } else if speed <= 0.0 {
        Some(MIN_SPEED_MULTIPLIER)
    } else {
        Some(speed)
    }
}

/// Clamp a requested trail length into `0..=MAX_TRAIL_LENGTH`.
pub fn clamp_trail_length(length: f64) -> usize {
    if length.is_nan() || length <= 0.0 {
        return 0;
    }
    (length.round() as usize).min(MAX_TRAIL_LENGTH)
}

/// Speed presets offered by the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedPreset {
    Slow,
    Normal,
    Fast,
    Ultra,
    Ludicrous,
}

impl SpeedPreset {
    pub const ALL: [SpeedPreset; 5] = [
        SpeedPreset::Slow,
        SpeedPreset::Normal,
        SpeedPreset::Fast,
        SpeedPreset::Ultra,
        SpeedPreset::Ludicrous,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            SpeedPreset::Slow => 0.5,
            SpeedPreset::Normal => 1.0,
            SpeedPreset::Fast => 3.0,
            SpeedPreset::Ultra => 8.0,
            SpeedPreset::Ludicrous => 20.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedPreset::Slow => "Slow",
            SpeedPreset::Normal => "Normal",
            SpeedPreset::Fast => "Fast",
            SpeedPreset::Ultra => "Ultra",
            SpeedPreset::Ludicrous => "Ludicrous",
        }
    }

    /// Preset whose multiplier equals `speed` exactly, if any.
    pub fn matching(speed: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.multiplier() == speed)
    }
}
