use glam::Vec2;
use serde::Serialize;

use crate::api::types::BodyColor;
use crate::renderer::snapshot::FrameSnapshot;

/// Gap between a body's disc and its label, in pixels.
pub const LABEL_GAP: f32 = 4.0;

/// Where to draw one body label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPlacement<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
    pub color: BodyColor,
}

/// Labels for every named body, up-right of its disc.
/// Empty when labels are hidden.
pub fn place_labels<'a>(frame: &FrameSnapshot<'a>) -> Vec<LabelPlacement<'a>> {
    if !frame.show_labels {
        return Vec::new();
    }
    frame
        .iter()
        .filter(|b| !b.body.label.is_empty())
        .map(|b| {
            let d = b.body.visual_radius + LABEL_GAP;
            let at = b.position + Vec2::new(d, -d);
            LabelPlacement {
                text: b.body.label.as_str(),
                x: at.x,
                y: at.y,
                color: b.body.color,
            }
        })
        .collect()
}
