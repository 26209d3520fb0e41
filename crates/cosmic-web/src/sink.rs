use cosmic_engine::bridge::protocol::FrameBuffer;
use cosmic_engine::{place_labels, FrameSnapshot, RenderSink, SinkError};
#[cfg(feature = "vectors")]
use cosmic_engine::Overlay;

/// Sink that leaves each frame in wasm memory for the JS renderer:
/// the packed frame buffer, label placements as JSON and, with `vectors`,
/// the tessellated overlay.
pub struct BufferSink {
    frame: FrameBuffer,
    labels_json: String,
    #[cfg(feature = "vectors")]
    overlay: Overlay,
}

impl BufferSink {
    pub fn new() -> Self {
        Self {
            frame: FrameBuffer::new(),
            labels_json: String::from("[]"),
            #[cfg(feature = "vectors")]
            overlay: Overlay::new(),
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn labels_json(&self) -> &str {
        &self.labels_json
    }

    #[cfg(feature = "vectors")]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for BufferSink {
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), SinkError> {
        self.frame.pack(frame);
        #[cfg(feature = "vectors")]
        self.overlay.draw(frame);

        self.labels_json = serde_json::to_string(&place_labels(frame))
            .map_err(|err| SinkError::Rejected(format!("label encoding: {err}")))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "wasm-buffer"
    }
}
