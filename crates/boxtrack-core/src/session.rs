//! Editing session for one video.
//!
//! The session owns the working timeline, the playback position sampled from
//! the video element and the drag controller. It is driven by external
//! callbacks: a ~200ms polling tick, seek bar and button events, and pointer
//! moves delivered through a [`DragGuard`]. Each call applies at most one
//! edit and replaces the timeline wholesale.

use thiserror::Error;

use crate::drag::{DragContext, DragController, DragGuard, DragKind};
use crate::edit::{Edit, EditError};
use crate::keyframe::{FrameSize, Keyframe};
use crate::render::{BoxRect, Layout, display_box};
use crate::row::{Row, retain_timed};
use crate::timeline::{Timeline, TimelineError};

/// Polling interval for playback position and box redraw.
pub const TICK_INTERVAL_MS: u64 = 200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Unknown video: {0}")]
    UnknownVideo(String),
}

/// Playback state mirrored from the video element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Playback {
    /// Seconds into the video.
    pub time: f64,
    /// `None` until the video reports its metadata.
    pub duration: Option<f64>,
    pub playing: bool,
}

impl Playback {
    /// Playback position as a fraction of the duration.
    pub fn fractional_time(&self) -> Option<f64> {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| self.time / d)
    }
}

/// Rows to submit for one video on save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub video_id: String,
    pub rows: Vec<Row>,
}

#[derive(Debug)]
pub struct EditingSession {
    video_id: String,
    original: Vec<Row>,
    timeline: Timeline,
    frame: FrameSize,
    layout: Layout,
    playback: Playback,
    active: usize,
    drag: DragController,
    revision: u64,
    dirty: bool,
}

impl EditingSession {
    /// Opens a session over persisted `rows`. Fails when there are none.
    pub fn open(
        video_id: impl Into<String>,
        rows: Vec<Row>,
        frame: FrameSize,
        layout: Layout,
    ) -> Result<Self, SessionError> {
        let video_id = video_id.into();
        let timeline = Timeline::denormalize(&rows, frame)?;
        tracing::debug!(video_id = %video_id, keyframes = timeline.len(), "Opened editing session");
        Ok(Self {
            video_id,
            original: rows,
            timeline,
            frame,
            layout,
            playback: Playback::default(),
            active: 0,
            drag: DragController::new(),
            revision: 0,
            dirty: false,
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_keyframe(&self) -> &Keyframe {
        // `active` is clamped after every replacement.
        &self.timeline.keyframes()[self.active]
    }

    /// Incremented whenever the timeline is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when there are edits since the last load, save or discard.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Geometry of the active keyframe's box as drawn over the video.
    pub fn display_box(&self) -> BoxRect {
        display_box(self.active_keyframe(), &self.layout)
    }

    pub fn drag_context(&self) -> DragContext {
        DragContext {
            frame: self.frame,
            layout: self.layout,
            duration: self.playback.duration,
        }
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.playback.duration = Some(duration);
        self.relocate();
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playback.playing = playing;
    }

    /// Polling entry point. Samples `current_time` while playing and returns
    /// true if the active keyframe changed.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use boxtrack_core::{EditingSession, FrameSize, Layout, Row, TICK_INTERVAL_MS};
    ///
    /// let rows = vec![
    ///     Row::new(vec![0.0, 0.1, 0.1, 0.2, 0.2]),
    ///     Row::new(vec![0.5, 0.2, 0.2, 0.3, 0.3]),
    /// ];
    /// let mut session =
    ///     EditingSession::open("clip", rows, FrameSize::default(), Layout::default()).unwrap();
    /// session.set_duration(10.0);
    /// session.set_playing(true);
    ///
    /// let step = Duration::from_millis(TICK_INTERVAL_MS).as_secs_f64();
    /// let changes = (1..=40)
    ///     .filter(|n| session.tick(f64::from(*n) * step))
    ///     .count();
    /// assert_eq!(changes, 1);
    /// assert_eq!(session.active_index(), 1);
    /// ```
    pub fn tick(&mut self, current_time: f64) -> bool {
        if self.playback.playing {
            self.playback.time = current_time;
        }
        let before = self.active;
        self.relocate();
        before != self.active
    }

    /// Jumps to `seconds`; the caller seeks the video element.
    pub fn seek(&mut self, seconds: f64) {
        self.playback.time = seconds;
        self.relocate();
    }

    pub fn apply(&mut self, edit: &Edit) -> Result<(), SessionError> {
        let timeline = self.timeline.apply(edit)?;
        self.replace(timeline);
        Ok(())
    }

    /// Adds a keyframe at the current playback position.
    pub fn add_keyframe_here(&mut self) -> Result<(), SessionError> {
        let time = self.require_fractional_time()?;
        self.apply(&Edit::AddKeyframeAt { time })
    }

    /// Deletes the active keyframe unless it is the first or last.
    pub fn delete_keyframe_here(&mut self) -> Result<(), SessionError> {
        let time = self.require_fractional_time()?;
        self.apply(&Edit::DeleteKeyframe { time })
    }

    /// Starts moving or resizing the active box from pointer `(x, y)`.
    pub fn begin_box_drag(&self, kind: DragKind, x: f64, y: f64) -> Option<DragGuard> {
        debug_assert!(kind != DragKind::Retime);
        self.drag
            .begin(kind, self.active, *self.active_keyframe(), x, y)
    }

    /// Starts dragging the seek bar marker of keyframe `index`.
    pub fn begin_marker_drag(&self, index: usize, x: f64) -> Option<DragGuard> {
        let origin = *self.timeline.get(index)?;
        self.drag.begin(DragKind::Retime, index, origin, x, 0.0)
    }

    /// Applies the edit for the pointer at `(x, y)`. Move and resize target
    /// the active keyframe; a retimed keyframe is followed to its new index
    /// so later moves keep editing it.
    pub fn drag_to(&mut self, guard: &mut DragGuard, x: f64, y: f64) -> Result<(), SessionError> {
        let Some(edit) = guard.track(x, y, &self.drag_context()) else {
            return Ok(());
        };
        match edit {
            Edit::ModifyKeyframeTime {
                index,
                seconds,
                duration,
            } => {
                let (timeline, new_index) = self.timeline.retime(index, seconds, duration)?;
                self.replace(timeline);
                guard.retarget(new_index);
                Ok(())
            }
            // Box drags edit whichever keyframe is active now.
            Edit::ModifyBox { edges, .. } => self.apply(&Edit::ModifyBox {
                index: self.active,
                edges,
            }),
            other => self.apply(&other),
        }
    }

    /// Drops every edit since the last load or save.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        let timeline = Timeline::denormalize(&self.original, self.frame)?;
        self.replace(timeline);
        self.dirty = false;
        tracing::info!(video_id = %self.video_id, "Discarded changes");
        Ok(())
    }

    /// Normalizes the timeline for persistence. Rows without a time are
    /// dropped; the result becomes the new discard point. Refuses to save a
    /// timeline with no timed keyframes left.
    pub fn save(&mut self) -> Result<SavePayload, SessionError> {
        let rows = retain_timed(self.timeline.normalize(self.frame)?);
        if rows.is_empty() {
            return Err(TimelineError::Empty.into());
        }
        self.original.clone_from(&rows);
        self.dirty = false;
        tracing::info!(video_id = %self.video_id, rows = rows.len(), "Prepared keyframes for save");
        Ok(SavePayload {
            video_id: self.video_id.clone(),
            rows,
        })
    }

    fn replace(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.revision += 1;
        self.dirty = true;
        self.active = self.active.min(self.timeline.last_index());
        self.relocate();
    }

    fn relocate(&mut self) {
        if let Some(time) = self.playback.fractional_time() {
            self.active = self.timeline.find_keyframe_index(time);
        }
    }

    fn require_fractional_time(&self) -> Result<f64, SessionError> {
        self.playback
            .fractional_time()
            .ok_or_else(|| EditError::UnknownDuration(self.playback.duration.unwrap_or(0.0)).into())
    }
}
