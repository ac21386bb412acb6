//! Coordinate math for the seek bar: scrubber, keyframe markers and
//! pointer-to-time conversion.

use crate::keyframe::Keyframe;
use crate::render::Layout;

/// Seek bar placed after the square play button of the control bar.
#[derive(Debug, Clone, Copy)]
pub struct SeekBar {
    layout: Layout,
}

impl SeekBar {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Converts a pointer x coordinate to seconds into the video.
    ///
    /// The seek bar starts one pixel after the play button; positions outside
    /// the bar clamp to its ends.
    pub fn x_to_time(&self, client_x: f64, duration: f64) -> f64 {
        let local = (client_x - self.layout.control_height - 1.0)
            .min(self.layout.seek_width)
            .max(0.0);
        local / self.layout.seek_width * duration
    }

    /// Left offset of the scrubber for `time` seconds.
    /// Unknown durations park the scrubber at the start.
    pub fn scrubber_left(&self, time: f64, duration: Option<f64>) -> f64 {
        let half = self.layout.scrubber_width / 2.0;
        match duration {
            Some(d) if d > 0.0 => time / d * self.layout.seek_width - half,
            _ => -half,
        }
    }

    /// Left offset of the marker drawn for `keyframe`.
    pub fn marker_left(&self, keyframe: &Keyframe) -> f64 {
        keyframe.t * self.layout.seek_width - self.layout.marker_width / 2.0
    }

    /// Pointer x at the centre of the marker for `keyframe`; the inverse of
    /// [`SeekBar::x_to_time`] for times inside the bar.
    pub fn marker_client_x(&self, keyframe: &Keyframe) -> f64 {
        keyframe.t * self.layout.seek_width + self.layout.control_height + 1.0
    }
}

impl Default for SeekBar {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}
