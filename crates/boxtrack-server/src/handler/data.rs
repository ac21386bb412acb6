use axum::{
    Json,
    extract::{Path, State},
};
use boxtrack_core::{Catalog, Row};

use crate::service::store::{DataStore, StoreError};

pub const SAVE_RESPONSE: &str = "All good!";

pub async fn list_data(State(store): State<DataStore>) -> Result<Json<Catalog>, StoreError> {
    let catalog = tokio::task::spawn_blocking(move || store.list()).await??;
    Ok(Json(catalog))
}

pub async fn get_data(
    State(store): State<DataStore>,
    Path(video_id): Path<String>,
) -> Result<Json<Vec<Row>>, StoreError> {
    let rows = tokio::task::spawn_blocking(move || store.get(&video_id)).await??;
    Ok(Json(rows))
}

pub async fn put_data(
    State(store): State<DataStore>,
    Path(video_id): Path<String>,
    Json(rows): Json<Vec<Row>>,
) -> Result<&'static str, StoreError> {
    let count = rows.len();
    let saved_id = video_id.clone();
    tokio::task::spawn_blocking(move || store.put(&video_id, &rows)).await??;
    tracing::info!(video_id = %saved_id, rows = count, "Saved keyframes");
    Ok(SAVE_RESPONSE)
}
