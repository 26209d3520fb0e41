pub mod runner;
pub mod scheduler;
pub mod sink;

pub use cosmic_engine;
pub use js_sys;
pub use runner::WebRunner;
pub use scheduler::RafScheduler;
pub use sink::BufferSink;

/// Route `log` output to the browser console and panics to `console.error`.
/// Safe to call more than once.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Generate all `#[wasm_bindgen]` exports for an orbital system.
///
/// Generates:
/// - `thread_local!` storage for the WebRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (init, start/stop, controls, frame accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod bodies;
///
/// cosmic_web::export_system!(bodies::cosmic_chain, "cosmic-orbits", vectors);
/// ```
///
/// # Arguments
///
/// - `$build`: path to a `fn() -> Result<OrbitalHierarchy, HierarchyError>`
/// - `$name`: A string literal used in log messages
#[macro_export]
macro_rules! export_system {
    ($build:path, $name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::WebRunner>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&$crate::WebRunner) -> R) -> Option<R> {
            RUNNER.with(|cell| match cell.borrow().as_ref() {
                Some(runner) => Some(f(runner)),
                None => {
                    log::warn!("{}: not initialized, call system_init() first", $name);
                    None
                }
            })
        }

        fn install(hierarchy: $crate::cosmic_engine::OrbitalHierarchy, width: f32, height: f32) -> Result<(), JsValue> {
            let bodies = hierarchy.len();
            let runner = $crate::WebRunner::new(hierarchy, width, height)
                .map_err(|err| JsValue::from_str(&err.to_string()))?;
            // Replacing a previous runner drops it, which stops its loop.
            let previous = RUNNER.with(|cell| cell.borrow_mut().replace(runner));
            drop(previous);
            log::info!("{}: initialized with {} bodies", $name, bodies);
            Ok(())
        }

        #[wasm_bindgen]
        pub fn system_init(width: f32, height: f32) -> Result<(), JsValue> {
            $crate::init_logging();
            let hierarchy = $build().map_err(|err| JsValue::from_str(&err.to_string()))?;
            install(hierarchy, width, height)
        }

        #[wasm_bindgen]
        pub fn system_init_from_manifest(json: &str, width: f32, height: f32) -> Result<(), JsValue> {
            $crate::init_logging();
            let hierarchy = $crate::cosmic_engine::SystemManifest::load(json)
                .map_err(|err| JsValue::from_str(&err.to_string()))?;
            install(hierarchy, width, height)
        }

        #[wasm_bindgen]
        pub fn system_start() {
            with_runner(|r| r.start());
        }

        #[wasm_bindgen]
        pub fn system_stop() {
            let runner = RUNNER.with(|cell| cell.borrow_mut().take());
            if runner.is_some() {
                log::info!("{}: stopped", $name);
            }
        }

        #[wasm_bindgen]
        pub fn system_resize(width: f32, height: f32) {
            with_runner(|r| r.resize(width, height));
        }

        // ---- Controls ----

        #[wasm_bindgen]
        pub fn system_set_paused(paused: bool) {
            with_runner(|r| r.push_control($crate::cosmic_engine::ControlEvent::SetPaused(paused)));
        }

        #[wasm_bindgen]
        pub fn system_toggle_pause() {
            with_runner(|r| r.push_control($crate::cosmic_engine::ControlEvent::TogglePause));
        }

        #[wasm_bindgen]
        pub fn system_set_speed(speed: f64) {
            with_runner(|r| r.push_control($crate::cosmic_engine::ControlEvent::SetSpeed(speed)));
        }

        #[wasm_bindgen]
        pub fn system_set_trail_length(length: f64) {
            with_runner(|r| r.push_control($crate::cosmic_engine::ControlEvent::SetTrailLength(length)));
        }

        #[wasm_bindgen]
        pub fn system_set_show_orbits(show: bool) {
            with_runner(|r| r.push_control($crate::cosmic_engine::ControlEvent::SetShowOrbits(show)));
        }

        #[wasm_bindgen]
        pub fn system_set_show_labels(show: bool) {
            with_runner(|r| r.push_control($crate::cosmic_engine::ControlEvent::SetShowLabels(show)));
        }

        #[wasm_bindgen]
        pub fn system_apply_config(json: &str) -> Result<(), JsValue> {
            match with_runner(|r| r.apply_config_json(json)) {
                Some(Err(err)) => Err(JsValue::from_str(&err.to_string())),
                _ => Ok(()),
            }
        }

        #[wasm_bindgen]
        pub fn system_on_frame(callback: Option<$crate::js_sys::Function>) {
            with_runner(|r| r.set_listener(callback));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_frame_ptr() -> *const f32 {
            with_runner(|r| r.frame_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_frame_len() -> u32 {
            with_runner(|r| r.frame_len()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_labels_json() -> String {
            with_runner(|r| r.labels_json()).unwrap_or_else(|| String::from("[]"))
        }

        #[wasm_bindgen]
        pub fn get_config_json() -> String {
            with_runner(|r| r.config_json()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_simulation_time() -> f64 {
            with_runner(|r| r.simulation_time()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_speed_presets_json() -> String {
            $crate::WebRunner::speed_presets_json()
        }
    };

    // Variant with vectors feature
    ($build:path, $name:literal, vectors) => {
        $crate::export_system!($build, $name);

        // ---- Vector accessors (only when vectors feature is enabled) ----

        #[wasm_bindgen]
        pub fn get_vector_vertices_ptr() -> *const f32 {
            with_runner(|r| r.vector_vertices_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_vector_vertex_count() -> u32 {
            with_runner(|r| r.vector_vertex_count()).unwrap_or(0)
        }
    };
}
