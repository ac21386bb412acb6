//! Edit operations over a [`Timeline`].
//!
//! Every operation leaves the source timeline untouched and returns a new,
//! re-sorted one.

use thiserror::Error;

use crate::keyframe::{BoxEdges, Keyframe};
use crate::timeline::Timeline;

/// Offset subtracted from the requested time when adding a keyframe
/// interactively, so the new keyframe is active at that time.
pub const ADD_EPSILON: f64 = 0.0001;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Keyframe index {index} out of range for timeline of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Video duration is not known yet: {0}")]
    UnknownDuration(f64),
}

/// A single edit, applied with [`Timeline::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Insert a keyframe as given.
    AddKeyframe(Keyframe),
    /// Insert a copy of the keyframe active at `time`, just before `time`.
    AddKeyframeAt { time: f64 },
    /// Remove the keyframe active at `time` unless it is the first or last.
    DeleteKeyframe { time: f64 },
    /// Move a keyframe to `seconds` into a video lasting `duration` seconds.
    ModifyKeyframeTime {
        index: usize,
        seconds: f64,
        duration: f64,
    },
    /// Replace the box of a keyframe, keeping its time.
    ModifyBox { index: usize, edges: BoxEdges },
}

impl Timeline {
    pub fn apply(&self, edit: &Edit) -> Result<Timeline, EditError> {
        match edit {
            Edit::AddKeyframe(keyframe) => Ok(self.with_keyframe(*keyframe)),
            Edit::AddKeyframeAt { time } => Ok(self.with_keyframe_at(*time)),
            Edit::DeleteKeyframe { time } => Ok(self.without_keyframe_at(*time)),
            Edit::ModifyKeyframeTime {
                index,
                seconds,
                duration,
            } => self.with_keyframe_time(*index, *seconds, *duration),
            Edit::ModifyBox { index, edges } => self.with_box(*index, *edges),
        }
    }

    pub fn with_keyframe(&self, keyframe: Keyframe) -> Timeline {
        let mut keyframes = Vec::with_capacity(self.len() + 1);
        keyframes.push(keyframe);
        keyframes.extend_from_slice(self.keyframes());
        Timeline::resorted(keyframes)
    }

    /// Copies the geometry active at `time` into a new keyframe at
    /// `time - ADD_EPSILON`, so the box does not move when it is added.
    pub fn with_keyframe_at(&self, time: f64) -> Timeline {
        let edges = self.active(time).edges();
        self.with_keyframe(Keyframe::with_edges(time - ADD_EPSILON, edges))
    }

    /// Deleting the first or last keyframe is silently ignored.
    pub fn without_keyframe_at(&self, time: f64) -> Timeline {
        let index = self.find_keyframe_index(time);
        if self.is_boundary(index) {
            tracing::debug!(index, time, "Refusing to delete boundary keyframe");
            return self.clone();
        }
        let mut keyframes = self.keyframes().to_vec();
        keyframes.remove(index);
        Timeline::resorted(keyframes)
    }

    /// The keyframe may change position after the re-sort.
    pub fn with_keyframe_time(
        &self,
        index: usize,
        seconds: f64,
        duration: f64,
    ) -> Result<Timeline, EditError> {
        self.retime(index, seconds, duration)
            .map(|(timeline, _)| timeline)
    }

    /// Like [`Timeline::with_keyframe_time`], also returning the keyframe's
    /// index in the new timeline.
    pub fn retime(
        &self,
        index: usize,
        seconds: f64,
        duration: f64,
    ) -> Result<(Timeline, usize), EditError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(EditError::UnknownDuration(duration));
        }
        let mut tagged: Vec<(usize, Keyframe)> =
            self.owned_with_index(index)?.into_iter().enumerate().collect();
        tagged[index].1.t = seconds / duration;
        tagged.sort_by(|a, b| a.1.t.total_cmp(&b.1.t));

        let new_index = tagged
            .iter()
            .position(|(i, _)| *i == index)
            .unwrap_or(index);
        let keyframes = tagged.into_iter().map(|(_, kf)| kf).collect();
        Ok((Timeline::resorted(keyframes), new_index))
    }

    pub fn with_box(&self, index: usize, edges: BoxEdges) -> Result<Timeline, EditError> {
        let mut keyframes = self.owned_with_index(index)?;
        let t = keyframes[index].t;
        keyframes[index] = Keyframe::with_edges(t, edges);
        Ok(Timeline::resorted(keyframes))
    }

    fn owned_with_index(&self, index: usize) -> Result<Vec<Keyframe>, EditError> {
        if index >= self.len() {
            return Err(EditError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.keyframes().to_vec())
    }
}
