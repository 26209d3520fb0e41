pub mod snapshot;
pub mod traits;

// Re-export key types for convenient access
pub use snapshot::{BodyFrame, FrameSnapshot, OrbitRing, Viewport};
pub use traits::RenderSink;
