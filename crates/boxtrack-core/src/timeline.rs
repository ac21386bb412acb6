//! Time-ordered keyframe storage and active keyframe lookup.

use thiserror::Error;

use crate::keyframe::{FrameSize, Keyframe};
use crate::row::Row;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("Timeline must contain at least one keyframe")]
    Empty,

    #[error("Frame size must be positive, got {width}x{height}")]
    InvalidFrame { width: f64, height: f64 },
}

/// Non-empty sequence of keyframes sorted by time.
///
/// A timeline is never mutated in place. Edits build a new timeline, see
/// [`crate::edit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    keyframes: Vec<Keyframe>,
}

impl Timeline {
    /// Sorts `keyframes` by time. Rejects an empty list.
    pub fn new(mut keyframes: Vec<Keyframe>) -> Result<Self, TimelineError> {
        if keyframes.is_empty() {
            return Err(TimelineError::Empty);
        }
        sort_by_time(&mut keyframes);
        Ok(Self { keyframes })
    }

    /// Builds a pixel-space timeline from persisted rows.
    pub fn denormalize(rows: &[Row], frame: FrameSize) -> Result<Self, TimelineError> {
        check_frame(frame)?;
        let keyframes: Vec<Keyframe> = rows
            .iter()
            .map(|row| Keyframe::from(row.clone()).denormalized(frame))
            .collect();

        let ill_formed = keyframes
            .iter()
            .filter(|kf| !kf.edges().is_well_formed())
            .count();
        if ill_formed > 0 {
            tracing::warn!(
                ill_formed,
                total = keyframes.len(),
                "Loaded keyframes with degenerate or unparseable boxes"
            );
        }

        Self::new(keyframes)
    }

    /// Converts to persisted rows, scaling edges down by `frame`.
    pub fn normalize(&self, frame: FrameSize) -> Result<Vec<Row>, TimelineError> {
        check_frame(frame)?;
        Ok(self
            .keyframes
            .iter()
            .map(|kf| Row::from(kf.normalized(frame)))
            .collect())
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn first(&self) -> &Keyframe {
        &self.keyframes[0]
    }

    pub fn last(&self) -> &Keyframe {
        &self.keyframes[self.keyframes.len() - 1]
    }

    pub fn last_index(&self) -> usize {
        self.keyframes.len() - 1
    }

    /// Index of the last keyframe with a time. Untimed keyframes sort after it.
    pub fn last_timed_index(&self) -> usize {
        self.keyframes
            .iter()
            .rposition(|kf| !kf.t.is_nan())
            .unwrap_or_else(|| self.last_index())
    }

    /// True for the first and last timed keyframes, which can never be
    /// deleted, and for any untimed keyframe sorted after them.
    pub fn is_boundary(&self, index: usize) -> bool {
        index == 0 || index >= self.last_timed_index()
    }

    /// Index of the keyframe active at `time` (a fraction of the duration).
    ///
    /// The active keyframe is the last one with `t <= time`. Times before the
    /// first keyframe, and NaN, resolve to 0.
    pub fn find_keyframe_index(&self, time: f64) -> usize {
        self.keyframes
            .iter()
            .rposition(|kf| kf.t <= time)
            .unwrap_or(0)
    }

    /// Keyframe active at `time`.
    pub fn active(&self, time: f64) -> &Keyframe {
        &self.keyframes[self.find_keyframe_index(time)]
    }

    pub(crate) fn resorted(mut keyframes: Vec<Keyframe>) -> Self {
        debug_assert!(!keyframes.is_empty());
        sort_by_time(&mut keyframes);
        Self { keyframes }
    }
}

/// Stable sort; equal times keep their relative order and NaN sorts last.
fn sort_by_time(keyframes: &mut [Keyframe]) {
    keyframes.sort_by(|a, b| a.t.total_cmp(&b.t));
}

fn check_frame(frame: FrameSize) -> Result<(), TimelineError> {
    if frame.width > 0.0 && frame.height > 0.0 && frame.width.is_finite() && frame.height.is_finite()
    {
        Ok(())
    } else {
        Err(TimelineError::InvalidFrame {
            width: frame.width,
            height: frame.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(t: f64) -> Keyframe {
        Keyframe::new(t, 10.0, 10.0, 60.0, 60.0)
    }

    fn three_keyframes() -> Timeline {
        Timeline::new(vec![kf(0.0), kf(0.5), kf(0.8)]).unwrap()
    }

    #[test]
    fn test_empty_timeline_rejected() {
        assert_eq!(Timeline::new(Vec::new()), Err(TimelineError::Empty));
        assert_eq!(
            Timeline::denormalize(&[], FrameSize::new(400.0, 400.0)),
            Err(TimelineError::Empty)
        );
    }

    #[test]
    fn test_new_sorts_by_time() {
        let timeline = Timeline::new(vec![kf(0.8), kf(0.0), kf(0.5)]).unwrap();
        let times: Vec<f64> = timeline.keyframes().iter().map(|k| k.t).collect();
        assert_eq!(times, vec![0.0, 0.5, 0.8]);
    }

    #[test]
    fn test_nan_time_sorts_last() {
        let timeline = Timeline::new(vec![kf(f64::NAN), kf(0.5), kf(0.0)]).unwrap();
        assert!(timeline.last().t.is_nan());
        assert!((timeline.first().t).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_keyframe_index() {
        let timeline = three_keyframes();
        assert_eq!(timeline.find_keyframe_index(0.3), 0);
        assert_eq!(timeline.find_keyframe_index(0.6), 1);
        assert_eq!(timeline.find_keyframe_index(0.9), 2);
        assert_eq!(timeline.find_keyframe_index(0.0), 0);
    }

    #[test]
    fn test_find_keyframe_index_edges() {
        let timeline = Timeline::new(vec![kf(0.2), kf(0.6)]).unwrap();
        // Before the first keyframe
        assert_eq!(timeline.find_keyframe_index(0.1), 0);
        // Exactly on a keyframe
        assert_eq!(timeline.find_keyframe_index(0.6), 1);
        // Past the end
        assert_eq!(timeline.find_keyframe_index(1.0), 1);
        assert_eq!(timeline.find_keyframe_index(f64::NAN), 0);
    }

    #[test]
    fn test_single_keyframe_always_active() {
        let timeline = Timeline::new(vec![kf(0.5)]).unwrap();
        for time in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(timeline.find_keyframe_index(time), 0);
        }
    }

    #[test]
    fn test_normalize_roundtrip() {
        let frame = FrameSize::new(640.0, 360.0);
        let timeline = Timeline::new(vec![
            Keyframe::new(0.0, 12.5, 7.25, 100.0, 90.0),
            Keyframe::new(0.33, 0.0, 0.0, 640.0, 360.0),
            Keyframe::new(1.0, 320.1, 180.7, 400.9, 300.3),
        ])
        .unwrap();

        let rows = timeline.normalize(frame).unwrap();
        let back = Timeline::denormalize(&rows, frame).unwrap();

        for (a, b) in timeline.keyframes().iter().zip(back.keyframes()) {
            assert!((a.t - b.t).abs() < 1e-9);
            assert!((a.left - b.left).abs() < 1e-9);
            assert!((a.top - b.top).abs() < 1e-9);
            assert!((a.right - b.right).abs() < 1e-9);
            assert!((a.bottom - b.bottom).abs() < 1e-9);
        }
    }

    #[test]
    fn test_denormalize_then_normalize() {
        let frame = FrameSize::new(400.0, 400.0);
        let rows = vec![
            Row::new(vec![0.0, 0.0, 0.0, 0.25, 0.25]),
            Row::new(vec![1.0, 0.125, 0.125, 0.375, 0.375]),
        ];
        let timeline = Timeline::denormalize(&rows, frame).unwrap();
        assert!((timeline.last().right - 150.0).abs() < 1e-9);

        let back = timeline.normalize(frame).unwrap();
        for (a, b) in rows.iter().zip(&back) {
            for (x, y) in a.fields().iter().zip(b.fields()) {
                assert!((x - y).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_invalid_frame_rejected() {
        let timeline = three_keyframes();
        assert!(matches!(
            timeline.normalize(FrameSize::new(0.0, 100.0)),
            Err(TimelineError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_unparseable_rows_load_as_nan() {
        let rows = vec![Row::new(vec![0.0, f64::NAN, 0.0, 0.5, 0.5])];
        let timeline = Timeline::denormalize(&rows, FrameSize::new(100.0, 100.0)).unwrap();
        assert!(timeline.first().left.is_nan());
    }
}
