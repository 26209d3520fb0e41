use cosmic_engine::{ScheduleError, Scheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// `requestAnimationFrame` as a [`Scheduler`].
///
/// Holds the JS callback for the lifetime of the loop; the callback is
/// installed once by the runner after the orchestrator exists.
pub struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
    pub fn new() -> Result<Self, ScheduleError> {
        let window = web_sys::window().ok_or(ScheduleError::Unavailable)?;
        Ok(Self {
            window,
            callback: None,
        })
    }

    pub fn set_callback(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }
}

impl Scheduler for RafScheduler {
    type Handle = i32;

    fn request_tick(&mut self) -> Result<i32, ScheduleError> {
        let callback = self.callback.as_ref().ok_or(ScheduleError::Unavailable)?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|err| ScheduleError::Rejected(format!("{err:?}")))
    }

    fn cancel_tick(&mut self, handle: i32) {
        if let Err(err) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame({handle}) failed: {err:?}");
        }
    }
}
