pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::config::{AnimationConfig, ConfigPatch, SpeedPreset, MAX_TRAIL_LENGTH, MIN_SPEED_MULTIPLIER};
pub use api::error::{HierarchyError, ManifestError, ScheduleError, SinkError};
pub use api::types::{BodyColor, BodyId};
pub use core::hierarchy::{Geometry, OrbitRadius, OrbitalBody, OrbitalHierarchy};
pub use core::orchestrator::{FrameOrchestrator, FrameStats, LoopState, FRAME_DELTA_CAP};
pub use core::scheduler::{ManualScheduler, Scheduler};
pub use core::time::{SimulationClock, TimeController, BASE_RATE};
pub use core::trail::{CapacityScope, TrailBuffer, TrailSet};
pub use input::queue::{ControlEvent, ControlQueue};
pub use renderer::snapshot::{BodyFrame, FrameSnapshot, OrbitRing, Viewport};
pub use renderer::traits::RenderSink;
pub use bridge::protocol::{BodyRecord, FrameBuffer};
pub use assets::manifest::{BodyDescriptor, SystemManifest};
pub use systems::decor::{star_field, twinkle, Pulse, Star, STAR_COUNT};
pub use systems::labels::{place_labels, LabelPlacement};

#[cfg(feature = "vectors")]
pub use systems::vector::{VectorState, VectorVertex};
#[cfg(feature = "vectors")]
pub use systems::overlay::{ring_style, trail_segments, Overlay, RingStyle};
