use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cosmic_engine::{
    ConfigPatch, ControlEvent, FrameOrchestrator, FrameStats, OrbitalHierarchy, ScheduleError,
    SpeedPreset,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;

use crate::scheduler::RafScheduler;
use crate::sink::BufferSink;

type Orchestrator = FrameOrchestrator<RafScheduler, BufferSink>;
type Listener = Rc<RefCell<Option<js_sys::Function>>>;

/// Browser-side owner of the frame loop.
///
/// Each demo keeps one `WebRunner` in a `thread_local!` and exports free
/// functions via `#[wasm_bindgen]` (see `export_system!`), because
/// wasm-bindgen cannot export generic structs directly.
///
/// The animation-frame callback holds only a weak reference, so dropping the
/// runner ends the loop.
pub struct WebRunner {
    orchestrator: Rc<RefCell<Orchestrator>>,
    listener: Listener,
}

impl WebRunner {
    /// Wire a hierarchy to `requestAnimationFrame` for a `width` × `height`
    /// surface. The loop does not run until [`WebRunner::start`].
    pub fn new(hierarchy: OrbitalHierarchy, width: f32, height: f32) -> Result<Self, ScheduleError> {
        let scheduler = RafScheduler::new()?;
        let orchestrator = Rc::new(RefCell::new(FrameOrchestrator::new(
            hierarchy,
            scheduler,
            BufferSink::new(),
        )));
        let listener: Listener = Rc::new(RefCell::new(None));

        let callback = frame_callback(Rc::downgrade(&orchestrator), listener.clone());
        {
            let mut orch = orchestrator.borrow_mut();
            orch.scheduler_mut().set_callback(callback);
            orch.request_resize(width, height);
        }

        Ok(Self {
            orchestrator,
            listener,
        })
    }

    pub fn start(&self) {
        if let Ok(mut orch) = self.orchestrator.try_borrow_mut() {
            orch.start();
        }
    }

    pub fn stop(&self) {
        if let Ok(mut orch) = self.orchestrator.try_borrow_mut() {
            orch.teardown();
        }
    }

    pub fn push_control(&self, event: ControlEvent) {
        match self.orchestrator.try_borrow_mut() {
            Ok(mut orch) => orch.push_control(event),
            Err(_) => log::warn!("control event dropped: frame in progress"),
        }
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.push_control(ControlEvent::Resize { width, height });
    }

    /// Apply a camelCase JSON patch, e.g. `{"speedMultiplier": 3}`.
    pub fn apply_config_json(&self, json: &str) -> Result<(), serde_json::Error> {
        let patch = ConfigPatch::from_json(json)?;
        self.push_control(ControlEvent::Patch(patch));
        Ok(())
    }

    /// JS function called after every frame with the frame timestamp.
    pub fn set_listener(&self, listener: Option<js_sys::Function>) {
        *self.listener.borrow_mut() = listener;
    }

    fn read<T>(&self, f: impl FnOnce(&Orchestrator) -> T) -> Option<T> {
        self.orchestrator.try_borrow().ok().map(|orch| f(&orch))
    }

    // ---- Accessors for JS reads ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.read(|o| o.sink().frame().as_ptr()).unwrap_or(std::ptr::null())
    }

    pub fn frame_len(&self) -> u32 {
        self.read(|o| o.sink().frame().len() as u32).unwrap_or(0)
    }

    pub fn labels_json(&self) -> String {
        self.read(|o| o.sink().labels_json().to_owned())
            .unwrap_or_else(|| String::from("[]"))
    }

    pub fn config_json(&self) -> String {
        self.read(|o| serde_json::to_string(o.config()).unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn simulation_time(&self) -> f64 {
        self.read(|o| o.simulation_time()).unwrap_or(0.0)
    }

    pub fn stats(&self) -> FrameStats {
        self.read(|o| o.stats()).unwrap_or_default()
    }

    pub fn speed_presets_json() -> String {
        let presets: Vec<serde_json::Value> = SpeedPreset::ALL
            .iter()
            .map(|p| serde_json::json!({ "name": p.name(), "multiplier": p.multiplier() }))
            .collect();
        serde_json::Value::Array(presets).to_string()
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.read(|o| o.sink().overlay().vectors().buffer_ptr())
            .unwrap_or(std::ptr::null())
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertex_count(&self) -> u32 {
        self.read(|o| o.sink().overlay().vectors().vertex_count() as u32)
            .unwrap_or(0)
    }
}

impl Drop for WebRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn frame_callback(orchestrator: Weak<RefCell<Orchestrator>>, listener: Listener) -> Closure<dyn FnMut(f64)> {
    Closure::new(move |timestamp: f64| {
        let Some(orch) = orchestrator.upgrade() else {
            return;
        };
        match orch.try_borrow_mut() {
            Ok(mut o) => o.on_frame(timestamp),
            Err(_) => {
                log::warn!("frame callback re-entered, skipping");
                return;
            }
        }

        // Clone out so the listener may replace itself.
        let current = listener.borrow().clone();
        if let Some(f) = current {
            if let Err(err) = f.call1(&JsValue::NULL, &JsValue::from_f64(timestamp)) {
                log::warn!("frame listener threw: {err:?}");
            }
        }
        drop(orch);
    })
}
