use glam::Vec2;

use crate::api::config::AnimationConfig;
use crate::core::hierarchy::OrbitalHierarchy;
use crate::core::scheduler::Scheduler;
use crate::core::time::TimeController;
use crate::core::trail::{CapacityScope, TrailSet};
use crate::input::queue::{ControlEvent, ControlQueue};
use crate::renderer::snapshot::{BodyFrame, FrameSnapshot, OrbitRing, Viewport};
use crate::renderer::traits::RenderSink;

/// Longest wall-clock gap a single frame may cover, in seconds.
/// Keeps a backgrounded tab from jumping the orbits on return.
pub const FRAME_DELTA_CAP: f64 = 0.25;

/// Lifecycle state of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Producing frames with simulation time advancing.
    Running,
    /// Producing frames with simulation time frozen.
    Paused,
    /// Torn down. No frame will run again.
    Stopped,
}

/// Counters kept across the lifetime of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub sink_failures: u64,
    pub skipped_bodies: u64,
    pub schedule_failures: u64,
}

/// Drives the per-frame cycle.
///
/// Each tick: drain controls, advance time once, position every body at that
/// single time (parent before child), update trails, hand the snapshot to the
/// sink. Exactly one scheduler handle is live between ticks; teardown cancels
/// it.
pub struct FrameOrchestrator<S: Scheduler, R: RenderSink> {
    hierarchy: OrbitalHierarchy,
    time: TimeController,
    trails: TrailSet,
    config: AnimationConfig,
    controls: ControlQueue,
    scheduler: S,
    sink: R,
    handle: Option<S::Handle>,
    last_timestamp: Option<f64>,
    /// Per-frame positions indexed like `hierarchy.bodies()`.
    positions: Vec<Option<Vec2>>,
    stopped: bool,
    stats: FrameStats,
}

impl<S: Scheduler, R: RenderSink> FrameOrchestrator<S, R> {
    pub fn new(hierarchy: OrbitalHierarchy, scheduler: S, sink: R) -> Self {
        let config = AnimationConfig::default();
        Self {
            trails: TrailSet::new(config.trail_length),
            positions: Vec::with_capacity(hierarchy.len()),
            hierarchy,
            time: TimeController::new(),
            config,
            controls: ControlQueue::new(),
            scheduler,
            sink,
            handle: None,
            last_timestamp: None,
            stopped: false,
            stats: FrameStats::default(),
        }
    }

    /// Replace the initial configuration.
    pub fn with_config(mut self, config: AnimationConfig) -> Self {
        self.config = config.sanitized();
        self.trails.set_capacity(CapacityScope::All, self.config.trail_length);
        self
    }

    /// Replace the time controller (e.g. a custom base rate).
    pub fn with_time_controller(mut self, time: TimeController) -> Self {
        self.time = time;
        self
    }

    /// Request the first tick. No-op when already scheduled or torn down.
    pub fn start(&mut self) {
        if self.stopped {
            log::warn!("start ignored: frame loop already torn down");
            return;
        }
        if self.handle.is_some() {
            return;
        }
        log::info!(
            "frame loop starting: {} bodies, sink {}",
            self.hierarchy.len(),
            self.sink.backend()
        );
        self.schedule_next();
    }

    /// Queue a control event. Applied at the start of the next tick.
    pub fn push_control(&mut self, event: ControlEvent) {
        self.controls.push(event);
    }

    /// Queue a viewport change. Geometry is recomputed on the next tick;
    /// simulation time and trails are untouched.
    pub fn request_resize(&mut self, width: f32, height: f32) {
        self.push_control(ControlEvent::Resize { width, height });
    }

    /// Scheduler callback. `timestamp_ms` is the refresh timestamp in
    /// milliseconds; the gap since the previous one becomes the frame delta.
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        if self.stopped {
            log::debug!("frame callback after teardown ignored");
            return;
        }
        self.handle = None;
        let delta = self.frame_delta(timestamp_ms);
        self.tick(delta);
        self.schedule_next();
    }

    /// Run the per-frame sequence for `frame_delta` wall-clock seconds
    /// without touching the scheduler. Returns the frame's simulation time.
    pub fn tick(&mut self, frame_delta: f64) -> f64 {
        if self.stopped {
            return self.time.now();
        }

        self.apply_controls();
        let config = self.config;
        self.trails.set_capacity(CapacityScope::All, config.trail_length);

        let time = self.time.advance(frame_delta, &config);

        let geometry = *self.hierarchy.geometry();
        self.positions.clear();
        for body in self.hierarchy.bodies() {
            match self.hierarchy.position_of(body.id, time) {
                Ok(pos) => {
                    // A body that sits on its parent has nothing to trace.
                    if config.trail_length > 0 && body.orbit_radius.resolve(&geometry) > 0.0 {
                        self.trails.record(body.id, pos);
                    }
                    self.positions.push(Some(pos));
                }
                Err(err) => {
                    log::warn!("skipping {} this frame: {err}", body.id);
                    self.stats.skipped_bodies += 1;
                    self.positions.push(None);
                }
            }
        }

        self.stats.frames += 1;
        let mut bodies = Vec::with_capacity(self.positions.len());
        for (i, body) in self.hierarchy.bodies().iter().enumerate() {
            let Some(position) = self.positions[i] else {
                continue;
            };
            let orbit = self
                .hierarchy
                .parent_index(i)
                .and_then(|pi| self.positions[pi])
                .map(|center| OrbitRing {
                    center,
                    radius: body.orbit_radius.resolve(&geometry) as f32,
                    depth: self.hierarchy.depth_of(body.id).unwrap_or(1),
                });
            bodies.push(BodyFrame {
                body,
                position,
                orbit,
                trail: self.trails.trail(body.id),
            });
        }

        let snapshot = FrameSnapshot {
            frame: self.stats.frames,
            time,
            viewport: Viewport {
                width: geometry.width() as f32,
                height: geometry.height() as f32,
            },
            paused: config.paused,
            speed_multiplier: config.speed_multiplier,
            show_orbits: config.show_orbits,
            show_labels: config.show_labels,
            bodies,
        };

        if let Err(err) = self.sink.render(&snapshot) {
            log::warn!("render sink failed on frame {}: {err}", snapshot.frame);
            self.stats.sink_failures += 1;
        }

        time
    }

    /// Cancel the pending tick and stop for good. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel_tick(handle);
        }
        if !self.stopped {
            self.stopped = true;
            log::info!("frame loop stopped after {} frames", self.stats.frames);
        }
    }

    fn apply_controls(&mut self) {
        for event in self.controls.drain() {
            match event {
                ControlEvent::Resize { width, height } => {
                    if self.hierarchy.set_viewport(width, height) {
                        log::debug!("viewport resized to {width}x{height}");
                    } else {
                        log::warn!("ignoring degenerate viewport {width}x{height}, keeping last geometry");
                    }
                }
                other => {
                    other.apply_to(&mut self.config);
                    log::debug!("configuration updated: {other:?}");
                }
            }
        }
    }

    fn frame_delta(&mut self, timestamp_ms: f64) -> f64 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }
        let delta = match self.last_timestamp {
            Some(prev) => ((timestamp_ms - prev) / 1000.0).clamp(0.0, FRAME_DELTA_CAP),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        delta
    }

    fn schedule_next(&mut self) {
        if self.stopped || self.handle.is_some() {
            return;
        }
        match self.scheduler.request_tick() {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => {
                self.stats.schedule_failures += 1;
                log::error!("could not schedule next frame: {err}");
            }
        }
    }

    pub fn state(&self) -> LoopState {
        if self.stopped {
            LoopState::Stopped
        } else if self.config.paused {
            LoopState::Paused
        } else {
            LoopState::Running
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }

    /// Configuration as of the last tick (pending controls not yet applied).
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn simulation_time(&self) -> f64 {
        self.time.now()
    }

    pub fn hierarchy(&self) -> &OrbitalHierarchy {
        &self.hierarchy
    }

    pub fn trails(&self) -> &TrailSet {
        &self.trails
    }

    pub fn pending_controls(&self) -> usize {
        self.controls.len()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

impl<S: Scheduler, R: RenderSink> Drop for FrameOrchestrator<S, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::SinkError;
    use crate::api::types::BodyId;
    use crate::core::hierarchy::OrbitalBody;
    use crate::core::scheduler::ManualScheduler;
    use crate::core::time::BASE_RATE;

    const ROOT: BodyId = BodyId(0);
    const STAR: BodyId = BodyId(1);
    const PLANET: BodyId = BodyId(2);
    const MOON: BodyId = BodyId(3);

    #[derive(Debug, Clone)]
    struct Recorded {
        time: f64,
        positions: Vec<(BodyId, Vec2)>,
        trail_lens: Vec<(BodyId, usize)>,
        orbits: Vec<(BodyId, Option<OrbitRing>)>,
        viewport: Viewport,
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Recorded>,
        fail_frames: Vec<u64>,
    }

    impl RenderSink for Recorder {
        fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), SinkError> {
            if self.fail_frames.contains(&frame.frame) {
                return Err(SinkError::Rejected("boom".into()));
            }
            self.frames.push(Recorded {
                time: frame.time,
                positions: frame.iter().map(|b| (b.id(), b.position)).collect(),
                trail_lens: frame.iter().map(|b| (b.id(), b.trail.len())).collect(),
                orbits: frame.iter().map(|b| (b.id(), b.orbit)).collect(),
                viewport: frame.viewport,
            });
            Ok(())
        }
    }

    fn chain() -> OrbitalHierarchy {
        OrbitalHierarchy::new(vec![
            OrbitalBody::root(ROOT),
            OrbitalBody::orbiting(STAR, ROOT, 100.0, 0.1),
            OrbitalBody::orbiting(PLANET, STAR, 60.0, 1.5),
            OrbitalBody::orbiting(MOON, PLANET, 20.0, 5.0),
        ])
        .unwrap()
    }

    fn orchestrator() -> FrameOrchestrator<ManualScheduler, Recorder> {
        FrameOrchestrator::new(chain(), ManualScheduler::new(), Recorder::default())
    }

    #[test]
    fn every_body_uses_the_frame_time() {
        let mut orch = orchestrator();
        for _ in 0..5 {
            orch.tick(1.0 / 60.0);
        }
        let reference = chain();
        for frame in &orch.sink().frames {
            assert_eq!(frame.positions.len(), 4);
            for &(id, pos) in &frame.positions {
                assert_eq!(pos, reference.position_of(id, frame.time).unwrap());
            }
        }
    }

    #[test]
    fn paused_ticks_keep_time() {
        let mut orch = orchestrator();
        orch.tick(0.5);
        let before = orch.simulation_time();
        orch.push_control(ControlEvent::SetPaused(true));
        for _ in 0..30 {
            orch.tick(1.0 / 60.0);
        }
        assert_eq!(orch.simulation_time(), before);
        assert_eq!(orch.state(), LoopState::Paused);
        // Frames are still produced while paused.
        assert_eq!(orch.stats().frames, 31);
    }

    #[test]
    fn speed_change_applies_next_frame() {
        let mut orch = orchestrator();
        orch.push_control(ControlEvent::SetSpeed(20.0));
        let t = orch.tick(0.1);
        assert_eq!(t, BASE_RATE * 20.0 * 0.1);
    }

    #[test]
    fn trails_fill_and_empty_immediately() {
        let mut orch = orchestrator();
        orch.push_control(ControlEvent::SetTrailLength(150.0));
        for _ in 0..200 {
            orch.tick(1.0 / 60.0);
        }
        assert_eq!(orch.trails().trail(MOON).len(), 150);

        orch.push_control(ControlEvent::SetTrailLength(0.0));
        orch.tick(1.0 / 60.0);
        assert_eq!(orch.trails().total_points(), 0);
        let last = orch.sink().frames.last().unwrap();
        assert!(last.trail_lens.iter().all(|&(_, len)| len == 0));
    }

    #[test]
    fn root_leaves_no_trail() {
        let mut orch = orchestrator();
        orch.push_control(ControlEvent::SetTrailLength(150.0));
        for _ in 0..20 {
            orch.tick(1.0 / 60.0);
        }
        assert_eq!(orch.trails().trail(ROOT).len(), 0);
        assert_eq!(orch.trails().trail(STAR).len(), 20);
        assert_eq!(orch.trails().total_points(), 60);
    }

    #[test]
    fn no_trail_points_when_length_zero() {
        let mut orch = orchestrator();
        for _ in 0..10 {
            orch.tick(1.0 / 60.0);
        }
        assert_eq!(orch.trails().total_points(), 0);
    }

    #[test]
    fn orbit_rings_center_on_parent() {
        let mut orch = orchestrator();
        orch.tick(0.3);
        let frame = &orch.sink().frames[0];
        let pos = |id: BodyId| frame.positions.iter().find(|p| p.0 == id).unwrap().1;
        for &(id, ring) in &frame.orbits {
            match id {
                ROOT => assert!(ring.is_none()),
                STAR => assert_eq!(ring.unwrap(), OrbitRing { center: pos(ROOT), radius: 100.0, depth: 1 }),
                PLANET => assert_eq!(ring.unwrap(), OrbitRing { center: pos(STAR), radius: 60.0, depth: 2 }),
                MOON => assert_eq!(ring.unwrap(), OrbitRing { center: pos(PLANET), radius: 20.0, depth: 3 }),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn sink_failure_does_not_stop_the_loop() {
        let mut orch = orchestrator();
        orch.sink_mut().fail_frames = vec![2];
        orch.push_control(ControlEvent::SetTrailLength(10.0));
        orch.start();
        for i in 0..4 {
            assert!(orch.scheduler_mut().fire());
            orch.on_frame(i as f64 * 16.0);
        }
        assert_eq!(orch.stats().sink_failures, 1);
        assert_eq!(orch.stats().frames, 4);
        assert_eq!(orch.sink().frames.len(), 3);
        assert_eq!(orch.trails().trail(STAR).len(), 4);
        assert!(orch.is_scheduled());
    }

    #[test]
    fn failing_body_is_skipped_others_render() {
        let hierarchy = OrbitalHierarchy::new(vec![
            OrbitalBody::root(ROOT),
            OrbitalBody::orbiting(STAR, ROOT, 100.0, 0.1),
            OrbitalBody::orbiting(PLANET, ROOT, 50.0, f64::MAX),
            OrbitalBody::orbiting(MOON, PLANET, 20.0, 5.0),
        ])
        .unwrap();
        let mut orch = FrameOrchestrator::new(hierarchy, ManualScheduler::new(), Recorder::default());
        orch.tick(10.0);
        let frame = &orch.sink().frames[0];
        let ids: Vec<BodyId> = frame.positions.iter().map(|p| p.0).collect();
        assert_eq!(ids, vec![ROOT, STAR]);
        assert_eq!(orch.stats().skipped_bodies, 2);
    }

    #[test]
    fn resize_keeps_time_and_trails() {
        let mut orch = orchestrator();
        orch.push_control(ControlEvent::SetTrailLength(20.0));
        for _ in 0..5 {
            orch.tick(0.1);
        }
        let time = orch.simulation_time();
        let trail: Vec<Vec2> = orch.trails().trail(PLANET).iter().collect();

        orch.request_resize(1200.0, 900.0);
        orch.tick(0.0);
        assert_eq!(orch.simulation_time(), time);
        let after: Vec<Vec2> = orch.trails().trail(PLANET).iter().collect();
        assert_eq!(&after[..trail.len()], &trail[..]);
        let last = orch.sink().frames.last().unwrap();
        assert_eq!(last.viewport, Viewport { width: 1200.0, height: 900.0 });
        assert_eq!(last.positions[0].1, Vec2::new(600.0, 450.0));
    }

    #[test]
    fn degenerate_resize_keeps_geometry() {
        let mut orch = orchestrator();
        orch.request_resize(0.0, 900.0);
        orch.tick(0.1);
        let frame = orch.sink().frames.last().unwrap();
        assert_eq!(frame.viewport, Viewport { width: 800.0, height: 600.0 });
        assert!(frame.positions.iter().all(|(_, p)| p.is_finite()));
    }

    #[test]
    fn timestamps_become_capped_deltas() {
        let mut orch = orchestrator();
        orch.start();
        orch.scheduler_mut().fire();
        orch.on_frame(1000.0);
        assert_eq!(orch.simulation_time(), 0.0);

        orch.scheduler_mut().fire();
        orch.on_frame(1100.0);
        let expected = BASE_RATE * 0.1;
        assert!((orch.simulation_time() - expected).abs() < 1e-12);

        orch.scheduler_mut().fire();
        orch.on_frame(60_000.0);
        let expected = expected + BASE_RATE * FRAME_DELTA_CAP;
        assert!((orch.simulation_time() - expected).abs() < 1e-12);

        orch.scheduler_mut().fire();
        orch.on_frame(500.0);
        assert!((orch.simulation_time() - expected).abs() < 1e-12);
    }

    #[test]
    fn start_requests_exactly_one_tick() {
        let mut orch = orchestrator();
        orch.start();
        orch.start();
        assert_eq!(orch.scheduler().request_count(), 1);
        assert!(orch.is_scheduled());
    }

    #[test]
    fn teardown_cancels_and_is_idempotent() {
        let mut orch = orchestrator();
        orch.start();
        orch.teardown();
        assert_eq!(orch.scheduler().pending(), None);
        assert_eq!(orch.scheduler().cancel_count(), 1);
        assert_eq!(orch.state(), LoopState::Stopped);

        orch.teardown();
        assert_eq!(orch.scheduler().cancel_count(), 1);

        orch.on_frame(16.0);
        orch.start();
        assert_eq!(orch.stats().frames, 0);
        assert_eq!(orch.scheduler().request_count(), 1);
    }

    #[test]
    fn teardown_without_schedule_is_fine() {
        let mut orch = orchestrator();
        orch.teardown();
        assert_eq!(orch.scheduler().cancel_count(), 0);
        assert_eq!(orch.state(), LoopState::Stopped);
    }

    #[test]
    fn schedule_failure_is_counted() {
        let mut orch = orchestrator();
        orch.scheduler_mut().set_refusing(true);
        orch.start();
        assert!(!orch.is_scheduled());
        assert_eq!(orch.stats().schedule_failures, 1);

        orch.scheduler_mut().set_refusing(false);
        orch.start();
        assert!(orch.is_scheduled());
    }

    #[test]
    fn config_applies_only_at_tick_boundary() {
        let mut orch = orchestrator();
        orch.push_control(ControlEvent::SetShowOrbits(false));
        assert!(orch.config().show_orbits);
        assert_eq!(orch.pending_controls(), 1);
        orch.tick(0.0);
        assert!(!orch.config().show_orbits);
        assert_eq!(orch.pending_controls(), 0);
    }
}
