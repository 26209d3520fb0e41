//! Rendering sink contract.
//!
//! The core never draws. Each frame it hands a [`FrameSnapshot`] to a sink,
//! which owns all pixel output: the browser bridge packs it into shared
//! buffers for a Canvas/WebGPU renderer, tests record it.

use crate::api::error::SinkError;
use crate::renderer::snapshot::FrameSnapshot;

/// Consumer of per-frame snapshots.
///
/// A returned error is logged by the orchestrator and the loop carries on
/// with the next frame; simulation time and trails are unaffected.
///
/// # Example Implementation
///
/// ```ignore
/// struct CanvasSink {
///     ctx: web_sys::CanvasRenderingContext2d,
/// }
///
/// impl RenderSink for CanvasSink {
///     fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), SinkError> {
///         for body in frame.iter() {
///             // Draw glow, disc, trail...
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait RenderSink {
    /// Consume one frame.
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), SinkError>;

    /// Backend identifier for logs.
    fn backend(&self) -> &'static str {
        "custom"
    }
}

impl<F> RenderSink for F
where
    F: FnMut(&FrameSnapshot<'_>) -> Result<(), SinkError>,
{
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), SinkError> {
        self(frame)
    }

    fn backend(&self) -> &'static str {
        "closure"
    }
}
