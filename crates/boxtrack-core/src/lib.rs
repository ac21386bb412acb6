//! Boxtrack Core Library
//!
//! Keyframe timeline and editing engine for annotating a bounding box over a
//! video. Keyframes are kept sorted by time; the box snaps to the active
//! keyframe during playback and drag gestures become edit operations that
//! replace the timeline.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod annotator;
pub mod drag;
pub mod edit;
pub mod keyframe;
pub mod render;
pub mod row;
pub mod seek;
pub mod session;
pub mod timeline;

pub use annotator::{Annotator, AnnotatorAction, LoadState, video_path};
pub use drag::{DragAnchor, DragContext, DragController, DragGuard, DragKind, DragState};
pub use edit::{ADD_EPSILON, Edit, EditError};
pub use keyframe::{BoxEdges, FrameSize, Keyframe};
pub use render::{BoxRect, Layout, Palette, Theme, display_box, drag_move, drag_resize};
pub use row::{Catalog, Row, encode_csv, parse_csv, retain_timed};
pub use seek::SeekBar;
pub use session::{EditingSession, Playback, SavePayload, SessionError, TICK_INTERVAL_MS};
pub use timeline::{Timeline, TimelineError};
