use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use boxtrack_core::{Catalog, Row, encode_csv, parse_csv};
use parking_lot::RwLock;
use thiserror::Error;

use crate::util::required_video_id;

/// Keyframe files live at `{root}/{video_id}.csv`.
#[derive(Clone, Debug)]
pub struct DataStore {
    root: Arc<PathBuf>,
    // Writers replace whole files; readers must not observe a partial write.
    lock: Arc<RwLock<()>>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid video id {0:?}")]
    InvalidVideoId(String),

    #[error("No keyframes stored for video {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::InvalidVideoId(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Io(_) | StoreError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Data store request failed");
        }
        (status, self.to_string()).into_response()
    }
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads every `*.csv` file in the data directory. A missing directory is
    /// an empty catalog.
    pub fn list(&self) -> Result<Catalog, StoreError> {
        let _guard = self.lock.read();
        let mut catalog = Catalog::new();

        let entries = match fs::read_dir(self.root.as_path()) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(root = %self.root.display(), "Data directory does not exist");
                return Ok(catalog);
            }
            Err(err) => return Err(err.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "csv") {
                continue;
            }
            let Some(video_id) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "Skipping file with non UTF-8 name");
                continue;
            };
            let rows = parse_csv(&fs::read_to_string(&path)?);
            catalog.insert(video_id.to_string(), rows);
        }

        tracing::debug!(videos = catalog.len(), "Listed keyframe files");
        Ok(catalog)
    }

    pub fn get(&self, video_id: &str) -> Result<Vec<Row>, StoreError> {
        let path = self.path_for(video_id)?;
        let _guard = self.lock.read();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(parse_csv(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(video_id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrites the keyframe file of `video_id`.
    pub fn put(&self, video_id: &str, rows: &[Row]) -> Result<(), StoreError> {
        let path = self.path_for(video_id)?;
        let text = encode_csv(rows);
        let _guard = self.lock.write();
        fs::create_dir_all(self.root.as_path())?;
        fs::write(&path, text)?;
        Ok(())
    }

    fn path_for(&self, video_id: &str) -> Result<PathBuf, StoreError> {
        let video_id = required_video_id(video_id)?;
        Ok(self.root.join(format!("{video_id}.csv")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_reads_csv_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "0,0.1,0.1,0.2,0.2\n1,0.3,0.3,0.4,0.4\n").unwrap();
        fs::write(dir.path().join("b.csv"), "0,x,0,1,1").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = DataStore::new(dir.path()).list().unwrap();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(catalog["a"].len(), 2);
        assert!(catalog["b"][0].get(1).unwrap().is_nan());
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("missing"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("data"));
        let rows = vec![
            Row::new(vec![0.0, 0.1, 0.2, 0.3, 0.4]),
            Row::new(vec![0.5, f64::NAN, 0.2, 0.3, 0.4]),
        ];
        store.put("clip", &rows).unwrap();

        let text = fs::read_to_string(dir.path().join("data/clip.csv")).unwrap();
        assert_eq!(text, "0,0.1,0.2,0.3,0.4\n0.5,,0.2,0.3,0.4");

        let back = store.get("clip").unwrap();
        assert_eq!(back.len(), 2);
        assert!((back[1].time() - 0.5).abs() < f64::EPSILON);
        assert!(back[1].get(1).unwrap().is_nan());
    }

    #[test]
    fn test_get_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let missing = store.get("nothing").unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        let invalid = store.get("../etc/passwd").unwrap_err();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }
}
