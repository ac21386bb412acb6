//! Top-level annotator state: catalog loading, video selection and saving.

use crate::keyframe::FrameSize;
use crate::render::Theme;
use crate::row::Catalog;
use crate::session::{EditingSession, SavePayload, SessionError};

/// Media path for a video identifier.
pub fn video_path(video_id: &str) -> String {
    format!("video/{video_id}.mp4")
}

/// Progress of the catalog fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// The fetch or the first session failed; `retry` goes back to `Loading`.
    Failed { message: String, attempts: u32 },
}

/// Events that drive the annotator.
#[derive(Debug, Clone)]
pub enum AnnotatorAction {
    /// The catalog arrived.
    Loaded(Catalog),
    /// The catalog fetch failed.
    LoadFailed(String),
    /// Fetch the catalog again after a failure.
    Retry,
    /// Tear down the current session and open another video.
    SelectVideo(String),
}

#[derive(Debug)]
pub struct Annotator {
    load: LoadState,
    attempts: u32,
    catalog: Catalog,
    session: Option<EditingSession>,
    frame: FrameSize,
    theme: Theme,
}

impl Annotator {
    pub fn new(frame: FrameSize, theme: Theme) -> Self {
        Self {
            load: LoadState::Loading,
            attempts: 0,
            catalog: Catalog::new(),
            session: None,
            frame,
            theme,
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn video_ids(&self) -> impl Iterator<Item = &str> {
        self.catalog.keys().map(String::as_str)
    }

    pub fn current_video(&self) -> Option<&str> {
        self.session.as_ref().map(EditingSession::video_id)
    }

    pub fn session(&self) -> Option<&EditingSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditingSession> {
        self.session.as_mut()
    }

    /// Applies `action`. Returns true when the caller should start a fetch.
    pub fn dispatch(&mut self, action: AnnotatorAction) -> bool {
        match action {
            AnnotatorAction::Loaded(catalog) => {
                self.on_loaded(catalog);
                false
            }
            AnnotatorAction::LoadFailed(message) => {
                self.fail(message);
                false
            }
            AnnotatorAction::Retry => self.retry(),
            AnnotatorAction::SelectVideo(video_id) => {
                if let Err(err) = self.select_video(&video_id) {
                    tracing::warn!(video_id = %video_id, error = %err, "Failed to open video");
                }
                false
            }
        }
    }

    /// Accepts a fetched catalog and opens its first video.
    pub fn on_loaded(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        let Some(first) = self.catalog.keys().next().cloned() else {
            self.fail("No videos to annotate".to_string());
            return;
        };
        match self.select_video(&first) {
            Ok(()) => {
                tracing::info!(videos = self.catalog.len(), current = %first, "Catalog loaded");
                self.load = LoadState::Ready;
            }
            Err(err) => self.fail(format!("Failed to open {first}: {err}")),
        }
    }

    /// Moves back to `Loading` after a failure. Returns false in any other state.
    pub fn retry(&mut self) -> bool {
        if matches!(self.load, LoadState::Failed { .. }) {
            self.load = LoadState::Loading;
            true
        } else {
            false
        }
    }

    /// Opens `video_id`, discarding the current session and its unsaved edits.
    pub fn select_video(&mut self, video_id: &str) -> Result<(), SessionError> {
        let rows = self
            .catalog
            .get(video_id)
            .ok_or_else(|| SessionError::UnknownVideo(video_id.to_string()))?
            .clone();
        let session = EditingSession::open(video_id, rows, self.frame, self.theme.layout)?;
        if let Some(previous) = self.session.replace(session) {
            if previous.is_dirty() {
                tracing::warn!(video_id = %previous.video_id(), "Dropped unsaved edits");
            }
        }
        Ok(())
    }

    /// Saves the current session and records the rows in the catalog.
    /// Returns `None` when no video is open.
    pub fn save(&mut self) -> Option<Result<SavePayload, SessionError>> {
        let session = self.session.as_mut()?;
        let result = session.save();
        if let Ok(payload) = &result {
            self.catalog
                .insert(payload.video_id.clone(), payload.rows.clone());
        }
        Some(result)
    }

    fn fail(&mut self, message: String) {
        self.attempts += 1;
        tracing::error!(attempts = self.attempts, "Failed to load annotations: {message}");
        self.load = LoadState::Failed {
            message,
            attempts: self.attempts,
        };
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(FrameSize::default(), Theme::default())
    }
}
