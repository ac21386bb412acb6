//! Pointer drag tracking.
//!
//! A drag is an explicit [`DragState`] value. Starting one hands out a
//! [`DragGuard`], the only way to feed pointer positions into the drag.
//! Dropping the guard, on pointer release or on teardown, returns the
//! controller to [`DragState::Idle`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::edit::Edit;
use crate::keyframe::{FrameSize, Keyframe};
use crate::render::{Layout, drag_move, drag_resize};
use crate::seek::SeekBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Drag the box body.
    Move,
    /// Drag the box's bottom-right corner.
    Resize,
    /// Drag a keyframe marker along the seek bar.
    Retime,
}

/// Where a drag started and what it is editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub kind: DragKind,
    pub index: usize,
    pub origin: Keyframe,
    pub start_x: f64,
    pub start_y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragAnchor),
}

/// What a drag needs to know about the player to turn offsets into edits.
#[derive(Debug, Clone, Copy)]
pub struct DragContext {
    pub frame: FrameSize,
    pub layout: Layout,
    pub duration: Option<f64>,
}

impl DragContext {
    fn seek_bar(&self) -> SeekBar {
        SeekBar::new(self.layout)
    }
}

/// Owns the drag state shared with outstanding guards.
#[derive(Debug, Default)]
pub struct DragController {
    state: Rc<RefCell<DragState>>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        *self.state.borrow()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state(), DragState::Dragging(_))
    }

    /// Starts a drag at pointer `(x, y)`. Returns `None` while another drag
    /// is still held.
    pub fn begin(
        &self,
        kind: DragKind,
        index: usize,
        origin: Keyframe,
        x: f64,
        y: f64,
    ) -> Option<DragGuard> {
        let mut state = self.state.borrow_mut();
        if let DragState::Dragging(active) = *state {
            tracing::debug!(kind = ?active.kind, "Ignoring drag start while another drag is held");
            return None;
        }
        let anchor = DragAnchor {
            kind,
            index,
            origin,
            start_x: x,
            start_y: y,
        };
        *state = DragState::Dragging(anchor);
        Some(DragGuard {
            state: Rc::clone(&self.state),
            anchor,
        })
    }
}

/// Scoped handle for one drag. Released on drop.
#[derive(Debug)]
pub struct DragGuard {
    state: Rc<RefCell<DragState>>,
    anchor: DragAnchor,
}

impl DragGuard {
    pub fn anchor(&self) -> &DragAnchor {
        &self.anchor
    }

    /// Cumulative offset of pointer `(x, y)` from the drag start.
    pub fn offset(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.anchor.start_x, y - self.anchor.start_y)
    }

    /// Edit for the pointer at absolute `(x, y)`.
    pub fn track(&self, x: f64, y: f64, ctx: &DragContext) -> Option<Edit> {
        let (dx, dy) = self.offset(x, y);
        self.track_offset(dx, dy, ctx)
    }

    /// Edit for a cumulative offset `(dx, dy)` from the drag start.
    ///
    /// Retiming needs the video duration and yields nothing until it is known.
    pub fn track_offset(&self, dx: f64, dy: f64, ctx: &DragContext) -> Option<Edit> {
        let origin = self.anchor.origin;
        let index = self.anchor.index;
        match self.anchor.kind {
            DragKind::Move => Some(Edit::ModifyBox {
                index,
                edges: drag_move(&origin.edges(), dx, dy),
            }),
            DragKind::Resize => Some(Edit::ModifyBox {
                index,
                edges: drag_resize(&origin.edges(), dx, dy, ctx.frame, &ctx.layout),
            }),
            DragKind::Retime => {
                let duration = ctx.duration.filter(|d| *d > 0.0)?;
                let bar = ctx.seek_bar();
                let seconds = bar.x_to_time(bar.marker_client_x(&origin) + dx, duration);
                Some(Edit::ModifyKeyframeTime {
                    index,
                    seconds,
                    duration,
                })
            }
        }
    }

    /// Points the drag at the keyframe's new index after a re-sort.
    pub fn retarget(&mut self, index: usize) {
        self.anchor.index = index;
        *self.state.borrow_mut() = DragState::Dragging(self.anchor);
    }

    /// Ends the drag. Equivalent to dropping the guard.
    pub fn release(self) {}
}

impl Drop for DragGuard {
    fn drop(&mut self) {
        *self.state.borrow_mut() = DragState::Idle;
    }
}
