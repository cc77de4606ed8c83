//! HUD labels
//!
//! The host renders these strings; styling comes from `consts`.

use serde::Serialize;

use crate::consts::{HUD_EDGE_MARGIN, HUD_FONT_NAME, HUD_FONT_SIZE};

/// Which edge of the view a label hugs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelEdge {
    Top,
    Bottom,
}

/// A text label for the host to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudLabel {
    pub text: String,
    pub font_name: &'static str,
    pub font_size: f32,
    pub edge: LabelEdge,
    /// Distance from the edge, in view points
    pub margin: f32,
}

impl HudLabel {
    fn new(text: String, edge: LabelEdge) -> Self {
        Self {
            text,
            font_name: HUD_FONT_NAME,
            font_size: HUD_FONT_SIZE,
            edge,
            margin: HUD_EDGE_MARGIN,
        }
    }
}

pub fn remaining_text(remaining: u32) -> String {
    format!("Remaining: {}", remaining)
}

/// Completion text; elapsed is truncated to whole seconds
pub fn time_taken_text(elapsed_secs: f64) -> String {
    format!("Time taken: {} seconds", elapsed_secs.max(0.0).trunc() as u64)
}

/// Running counter, top of the view
pub fn remaining_label(remaining: u32) -> HudLabel {
    HudLabel::new(remaining_text(remaining), LabelEdge::Top)
}

/// Completion screen label, bottom of the view
pub fn time_taken_label(elapsed_secs: f64) -> HudLabel {
    HudLabel::new(time_taken_text(elapsed_secs), LabelEdge::Bottom)
}
