use crate::api::config::{clamp_speed, AnimationConfig};

/// Simulation units per wall-clock second at speed 1.
/// Matches 0.005 units per frame at 60 frames per second.
pub const BASE_RATE: f64 = 0.3;

/// Simulation clock. Starts at zero and never runs backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    current: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time.
    pub fn now(&self) -> f64 {
        self.current
    }
}

/// Converts wall-clock frame deltas into simulation time.
///
/// Sole owner of the [`SimulationClock`]. Pause and speed come from the
/// configuration passed to each `advance` call, so a change applies on the
/// very next frame with no smoothing.
#[derive(Debug, Clone)]
pub struct TimeController {
    clock: SimulationClock,
    base_rate: f64,
}

impl TimeController {
    pub fn new() -> Self {
        Self::with_base_rate(BASE_RATE)
    }

    /// Controller with a custom base rate. Non-positive or non-finite rates
    /// fall back to [`BASE_RATE`].
    pub fn with_base_rate(base_rate: f64) -> Self {
        let base_rate = if base_rate.is_finite() && base_rate > 0.0 {
            base_rate
        } else {
            log::warn!("invalid base rate {base_rate}, using {BASE_RATE}");
            BASE_RATE
        };
        Self {
            clock: SimulationClock::new(),
            base_rate,
        }
    }

    /// Advance by one frame of `frame_delta` wall-clock seconds.
    /// Returns the new simulation time.
    pub fn advance(&mut self, frame_delta: f64, config: &AnimationConfig) -> f64 {
        let step = self.step_for(frame_delta, config);
        let next = self.clock.current + step;
        if next.is_finite() {
            self.clock.current = next;
        }
        self.clock.current
    }

    /// Simulation time a frame of `frame_delta` would add under `config`.
    /// Zero while paused, and for negative or non-finite deltas.
    pub fn step_for(&self, frame_delta: f64, config: &AnimationConfig) -> f64 {
        if config.paused || !frame_delta.is_finite() || frame_delta <= 0.0 {
            return 0.0;
        }
        let speed = clamp_speed(config.speed_multiplier).unwrap_or(1.0);
        let step = self.base_rate * speed * frame_delta;
        if step.is_finite() {
            step
        } else {
            0.0
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }
}

impl Default for TimeController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(speed: f64) -> AnimationConfig {
        AnimationConfig {
            speed_multiplier: speed,
            ..AnimationConfig::default()
        }
    }

    #[test]
    fn starts_at_zero() {
        assert_eq!(TimeController::new().now(), 0.0);
    }

    #[test]
    fn speed_scales_step_exactly() {
        let mut tc = TimeController::new();
        let t = tc.advance(0.5, &running(8.0));
        assert_eq!(t, BASE_RATE * 8.0 * 0.5);
    }

    #[test]
    fn paused_freezes_time() {
        let mut tc = TimeController::new();
        tc.advance(1.0, &running(1.0));
        let before = tc.now();
        let paused = AnimationConfig {
            paused: true,
            ..running(20.0)
        };
        for _ in 0..100 {
            tc.advance(1.0 / 60.0, &paused);
        }
        assert_eq!(tc.now(), before);
    }

    #[test]
    fn negative_and_nan_deltas_do_not_rewind() {
        let mut tc = TimeController::new();
        tc.advance(1.0, &running(1.0));
        let before = tc.now();
        tc.advance(-5.0, &running(1.0));
        tc.advance(f64::NAN, &running(1.0));
        tc.advance(f64::INFINITY, &running(1.0));
        assert_eq!(tc.now(), before);
    }

    #[test]
    fn resume_takes_effect_next_frame() {
        let mut tc = TimeController::new();
        let mut config = running(3.0);
        config.paused = true;
        assert_eq!(tc.advance(0.1, &config), 0.0);
        config.paused = false;
        assert_eq!(tc.advance(0.1, &config), BASE_RATE * 3.0 * 0.1);
    }

    #[test]
    fn monotonic_across_speed_changes() {
        let mut tc = TimeController::new();
        let mut last = tc.now();
        for (i, speed) in [0.5, 1.0, 3.0, 8.0, 20.0, 0.25].iter().cycle().take(600).enumerate() {
            let config = AnimationConfig {
                paused: i % 7 == 0,
                ..running(*speed)
            };
            let t = tc.advance(1.0 / 60.0, &config);
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn invalid_base_rate_falls_back() {
        assert_eq!(TimeController::with_base_rate(-1.0).base_rate(), BASE_RATE);
        assert_eq!(TimeController::with_base_rate(2.0).base_rate(), 2.0);
    }
}
