//! Bounding-box keyframes and the reference frame they are measured against.

use serde::{Deserialize, Serialize};

use crate::row::Row;

/// Reference frame the editor measures pixel coordinates against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    /// Seek bar width with a 16:9 video underneath.
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
        }
    }
}

/// Edges of a box, without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxEdges {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoxEdges {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// True when the box has positive extent with its top-left corner inside the frame.
    pub fn is_well_formed(&self) -> bool {
        self.right > self.left && self.bottom > self.top && self.left >= 0.0 && self.top >= 0.0
    }
}

/// A time-stamped bounding box: `(t, left, top, right, bottom)`.
///
/// `t` is the fraction of the total video duration. Edges are pixels while
/// editing and fractions of the reference frame once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Row", into = "Row")]
pub struct Keyframe {
    pub t: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Keyframe {
    pub fn new(t: f64, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            t,
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a keyframe at `t` with the given edges.
    pub fn with_edges(t: f64, edges: BoxEdges) -> Self {
        Self::new(t, edges.left, edges.top, edges.right, edges.bottom)
    }

    pub fn edges(&self) -> BoxEdges {
        BoxEdges::new(self.left, self.top, self.right, self.bottom)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Divides horizontal edges by the frame width and vertical edges by its height.
    pub fn normalized(&self, frame: FrameSize) -> Self {
        Self {
            t: self.t,
            left: self.left / frame.width,
            top: self.top / frame.height,
            right: self.right / frame.width,
            bottom: self.bottom / frame.height,
        }
    }

    /// Inverse of [`Keyframe::normalized`].
    pub fn denormalized(&self, frame: FrameSize) -> Self {
        Self {
            t: self.t,
            left: self.left * frame.width,
            top: self.top * frame.height,
            right: self.right * frame.width,
            bottom: self.bottom * frame.height,
        }
    }
}

impl From<Row> for Keyframe {
    /// Missing fields read as NaN.
    fn from(row: Row) -> Self {
        let field = |i: usize| row.get(i).unwrap_or(f64::NAN);
        Self::new(field(0), field(1), field(2), field(3), field(4))
    }
}

impl From<Keyframe> for Row {
    fn from(kf: Keyframe) -> Self {
        Row::new(vec![kf.t, kf.left, kf.top, kf.right, kf.bottom])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_row_pads_with_nan() {
        let kf = Keyframe::from(Row::new(vec![0.5, 10.0]));
        assert!((kf.t - 0.5).abs() < f64::EPSILON);
        assert!((kf.left - 10.0).abs() < f64::EPSILON);
        assert!(kf.top.is_nan());
        assert!(kf.bottom.is_nan());
    }

    #[test]
    fn test_normalize_scales_by_frame() {
        let kf = Keyframe::new(0.25, 100.0, 50.0, 300.0, 150.0);
        let n = kf.normalized(FrameSize::new(400.0, 200.0));
        assert!((n.t - 0.25).abs() < f64::EPSILON);
        assert!((n.left - 0.25).abs() < f64::EPSILON);
        assert!((n.top - 0.25).abs() < f64::EPSILON);
        assert!((n.right - 0.75).abs() < f64::EPSILON);
        assert!((n.bottom - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_well_formed_edges() {
        assert!(BoxEdges::new(0.0, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!BoxEdges::new(10.0, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!BoxEdges::new(-1.0, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!BoxEdges::new(0.0, f64::NAN, 10.0, 10.0).is_well_formed());
    }

    #[test]
    fn test_keyframe_json_is_a_row() {
        let kf = Keyframe::new(0.5, 1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&kf).unwrap();
        assert_eq!(json, "[0.5,1.0,2.0,3.0,4.0]");
        let back: Keyframe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kf);
    }
}
