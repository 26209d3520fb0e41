use wasm_bindgen::prelude::*;

pub mod bodies;

cosmic_web::export_system!(bodies::cosmic_chain, "cosmic-orbits", vectors);
