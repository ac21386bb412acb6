//! Box geometry for display and drag editing.
//!
//! The box snaps to the active keyframe; there is no blending between
//! neighbouring keyframes.

use serde::{Deserialize, Serialize};

use crate::keyframe::{BoxEdges, FrameSize, Keyframe};

/// Colors used by the player chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub control_bar: String,
    pub control_active: String,
    pub scrubber: String,
    pub keyframe_marker: String,
    pub box_border: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            control_bar: "#4d6779".to_string(),
            control_active: "#6a8da6".to_string(),
            scrubber: "#314453".to_string(),
            keyframe_marker: "#639b24".to_string(),
            box_border: "white".to_string(),
        }
    }
}

/// Dimension constants for the player chrome, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Height of the control bar overlaid on the bottom of the video.
    pub control_height: f64,
    pub scrubber_width: f64,
    pub seek_width: f64,
    pub marker_width: f64,
    /// Vertical offset of any chrome drawn above the video.
    pub chrome_offset: f64,
    /// Smallest width or height a resize drag may produce.
    pub min_box_size: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            control_height: 50.0,
            scrubber_width: 10.0,
            seek_width: 800.0,
            marker_width: 10.0,
            chrome_offset: 0.0,
            min_box_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub palette: Palette,
    pub layout: Layout,
}

impl Theme {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Displayed box: top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of `keyframe` as drawn over the video.
pub fn display_box(keyframe: &Keyframe, layout: &Layout) -> BoxRect {
    BoxRect {
        left: keyframe.left,
        top: keyframe.top + layout.chrome_offset,
        width: keyframe.width(),
        height: keyframe.height(),
    }
}

/// Moves `origin` by the cumulative drag offset, keeping its size.
/// The top-left corner never leaves the frame's top or left edge.
pub fn drag_move(origin: &BoxEdges, dx: f64, dy: f64) -> BoxEdges {
    let left = (origin.left + dx).max(0.0);
    let top = (origin.top + dy).max(0.0);
    BoxEdges::new(left, top, left + origin.width(), top + origin.height())
}

/// Resizes `origin` from its bottom-right corner by the cumulative drag offset.
///
/// Each side is at least `layout.min_box_size` and the box stays inside the
/// frame above the control bar; the minimum wins if the two conflict.
pub fn drag_resize(
    origin: &BoxEdges,
    dx: f64,
    dy: f64,
    frame: FrameSize,
    layout: &Layout,
) -> BoxEdges {
    let min = layout.min_box_size;
    let max_width = (frame.width - origin.left).max(min);
    let max_height = (frame.height - layout.control_height - origin.top).max(min);

    let width = (origin.width() + dx).min(max_width).max(min);
    let height = (origin.height() + dy).min(max_height).max(min);
    BoxEdges::new(
        origin.left,
        origin.top,
        origin.left + width,
        origin.top + height,
    )
}
