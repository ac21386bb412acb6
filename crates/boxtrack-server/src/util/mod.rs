use crate::service::store::StoreError;

/// Video ids name files in the data directory, so only `[A-Za-z0-9_-]` is allowed.
pub fn is_valid_video_id(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

pub fn required_video_id(s: &str) -> Result<&str, StoreError> {
    if is_valid_video_id(s) {
        Ok(s)
    } else {
        Err(StoreError::InvalidVideoId(s.to_string()))
    }
}
