//! Drives the full frame loop headlessly: manual scheduler in, recording
//! sink out.

use std::cell::RefCell;
use std::rc::Rc;

use cosmic_engine::{
    BodyColor, BodyId, ControlEvent, FrameOrchestrator, FrameSnapshot, LoopState, ManualScheduler,
    OrbitRadius, OrbitalBody, OrbitalHierarchy, SinkError, SystemManifest, BASE_RATE,
};
use glam::Vec2;

const CENTER: BodyId = BodyId(0);
const SUN: BodyId = BodyId(1);
const EARTH: BodyId = BodyId(2);
const MOON: BodyId = BodyId(3);

#[derive(Debug, Clone)]
struct Seen {
    frame: u64,
    time: f64,
    paused: bool,
    positions: Vec<(BodyId, Vec2)>,
    trail_lens: Vec<usize>,
}

type Log = Rc<RefCell<Vec<Seen>>>;

fn recorder(log: Log) -> impl FnMut(&FrameSnapshot<'_>) -> Result<(), SinkError> {
    move |frame: &FrameSnapshot<'_>| -> Result<(), SinkError> {
        log.borrow_mut().push(Seen {
            frame: frame.frame,
            time: frame.time,
            paused: frame.paused,
            positions: frame.iter().map(|b| (b.id(), b.position)).collect(),
            trail_lens: frame.iter().map(|b| b.trail.len()).collect(),
        });
        Ok(())
    }
}

fn cosmic_chain() -> OrbitalHierarchy {
    OrbitalHierarchy::new(vec![
        OrbitalBody::root(CENTER).with_visuals(18.0, BodyColor::rgb8(255, 153, 255)),
        OrbitalBody::orbiting(MOON, EARTH, 20.0, 5.0).with_visuals(4.0, BodyColor::rgb8(192, 192, 192)),
        OrbitalBody::orbiting(EARTH, SUN, 60.0, 1.5).with_visuals(9.0, BodyColor::rgb8(65, 105, 225)),
        OrbitalBody::orbiting(SUN, CENTER, 0.0, 0.1)
            .with_orbit_radius(OrbitRadius::ViewportFraction(0.25))
            .with_visuals(14.0, BodyColor::rgb8(255, 204, 0)),
    ])
    .unwrap()
}

/// Fire the pending tick `frames` times at 60 Hz starting from `start_ms`.
fn run<F>(orch: &mut FrameOrchestrator<ManualScheduler, F>, start_ms: f64, frames: usize) -> f64
where
    F: FnMut(&FrameSnapshot<'_>) -> Result<(), SinkError>,
{
    let mut ts = start_ms;
    for _ in 0..frames {
        assert!(orch.scheduler_mut().fire(), "no tick was pending");
        orch.on_frame(ts);
        ts += 1000.0 / 60.0;
    }
    ts
}

#[test]
fn bodies_follow_their_parents_every_frame() {
    let log = Log::default();
    let mut orch = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(log.clone()));
    orch.start();
    run(&mut orch, 0.0, 120);

    let frames = log.borrow();
    assert_eq!(frames.len(), 120);
    for seen in frames.iter() {
        let pos = |id| seen.positions.iter().find(|p| p.0 == id).map(|p| p.1).unwrap();
        // Parent-before-child ordering regardless of input order.
        let order: Vec<BodyId> = seen.positions.iter().map(|p| p.0).collect();
        assert_eq!(order, vec![CENTER, SUN, EARTH, MOON]);

        assert_eq!(pos(CENTER), Vec2::new(400.0, 300.0));
        assert!((pos(SUN).distance(pos(CENTER)) - 150.0).abs() < 1e-3);
        assert!((pos(EARTH).distance(pos(SUN)) - 60.0).abs() < 1e-3);
        assert!((pos(MOON).distance(pos(EARTH)) - 20.0).abs() < 1e-3);
    }
    assert_eq!(frames[0].frame, 1);
    assert_eq!(frames[119].frame, 120);
}

#[test]
fn pause_then_resume() {
    let log = Log::default();
    let mut orch = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(log.clone()));
    orch.start();
    let ts = run(&mut orch, 0.0, 30);
    let before = orch.simulation_time();
    assert!(before > 0.0);

    orch.push_control(ControlEvent::TogglePause);
    let ts = run(&mut orch, ts, 45);
    assert_eq!(orch.simulation_time(), before);
    assert_eq!(orch.state(), LoopState::Paused);
    {
        let frames = log.borrow();
        let paused: Vec<&Seen> = frames.iter().skip(30).collect();
        assert_eq!(paused.len(), 45);
        assert!(paused.iter().all(|s| s.paused && s.time == before));
        // Frozen time gives identical positions.
        assert!(paused.windows(2).all(|w| w[0].positions == w[1].positions));
    }

    orch.push_control(ControlEvent::TogglePause);
    run(&mut orch, ts, 1);
    assert!(orch.simulation_time() > before);
    assert_eq!(orch.state(), LoopState::Running);
}

#[test]
fn speed_scales_time_linearly() {
    let mut slow = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(Log::default()));
    let mut fast = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(Log::default()));
    fast.push_control(ControlEvent::SetSpeed(8.0));
    for _ in 0..10 {
        slow.tick(0.05);
        fast.tick(0.05);
    }
    assert!((slow.simulation_time() - BASE_RATE * 0.5).abs() < 1e-12);
    assert!((fast.simulation_time() - 8.0 * slow.simulation_time()).abs() < 1e-9);
}

#[test]
fn trail_length_changes_take_effect_next_frame() {
    let log = Log::default();
    let mut orch = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(log.clone()));
    orch.start();
    orch.push_control(ControlEvent::SetTrailLength(150.0));
    let ts = run(&mut orch, 0.0, 200);
    assert_eq!(log.borrow().last().unwrap().trail_lens, vec![0, 150, 150, 150]);

    orch.push_control(ControlEvent::SetTrailLength(40.0));
    let ts = run(&mut orch, ts, 1);
    assert_eq!(log.borrow().last().unwrap().trail_lens, vec![0, 40, 40, 40]);

    orch.push_control(ControlEvent::SetTrailLength(0.0));
    run(&mut orch, ts, 1);
    assert_eq!(log.borrow().last().unwrap().trail_lens, vec![0; 4]);
    assert_eq!(orch.trails().total_points(), 0);
}

#[test]
fn resize_moves_center_and_keeps_history() {
    let log = Log::default();
    let mut orch = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(log.clone()));
    orch.start();
    orch.push_control(ControlEvent::SetTrailLength(10.0));
    let ts = run(&mut orch, 0.0, 10);
    let time = orch.simulation_time();

    orch.request_resize(1000.0, 400.0);
    orch.push_control(ControlEvent::SetPaused(true));
    run(&mut orch, ts, 1);

    assert_eq!(orch.simulation_time(), time);
    let frames = log.borrow();
    let last = frames.last().unwrap();
    assert_eq!(last.positions[0].1, Vec2::new(500.0, 200.0));
    let sun = last.positions[1].1;
    assert!((sun.distance(Vec2::new(500.0, 200.0)) - 100.0).abs() < 1e-3);
    assert_eq!(last.trail_lens, vec![0, 10, 10, 10]);
}

#[test]
fn teardown_leaves_nothing_pending() {
    let log = Log::default();
    let mut orch = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), recorder(log.clone()));
    orch.start();
    run(&mut orch, 0.0, 3);
    assert!(orch.scheduler().pending().is_some());

    orch.teardown();
    orch.teardown();
    assert_eq!(orch.scheduler().pending(), None);
    assert_eq!(orch.scheduler().cancel_count(), 1);

    // A callback that raced the cancellation is ignored.
    orch.on_frame(1000.0);
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(orch.state(), LoopState::Stopped);
}

#[test]
fn failing_sink_does_not_disturb_the_loop() {
    let mut calls = 0u32;
    let sink = move |_: &FrameSnapshot<'_>| -> Result<(), SinkError> {
        calls += 1;
        if calls % 2 == 0 {
            Err(SinkError::Rejected("context lost".into()))
        } else {
            Ok(())
        }
    };
    let mut orch = FrameOrchestrator::new(cosmic_chain(), ManualScheduler::new(), sink);
    orch.push_control(ControlEvent::SetTrailLength(5.0));
    orch.start();
    run(&mut orch, 0.0, 10);

    assert_eq!(orch.stats().frames, 10);
    assert_eq!(orch.stats().sink_failures, 5);
    assert!(orch.is_scheduled());
    assert_eq!(orch.trails().trail(MOON).len(), 5);
}

#[test]
fn manifest_system_runs() {
    let json = r#"{
        "bodies": [
            { "id": 0 },
            { "id": 1, "parentId": 0, "orbitRadius": 50, "angularSpeed": 2.0 },
            { "id": 2, "parentId": 1, "orbitRadius": 10, "angularSpeed": -4.0, "label": "Tiny" }
        ]
    }"#;
    let hierarchy = SystemManifest::load(json).unwrap();
    let log = Log::default();
    let mut orch = FrameOrchestrator::new(hierarchy, ManualScheduler::new(), recorder(log.clone()));
    orch.start();
    run(&mut orch, 0.0, 5);
    assert_eq!(log.borrow().len(), 5);
    assert!(log.borrow().iter().all(|s| s.positions.len() == 3));
}
