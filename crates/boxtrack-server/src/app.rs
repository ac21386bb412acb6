use std::path::Path;

use axum::{Router, routing::get};
use http::{Method, header};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{handler::data, service::store::DataStore};

/// Keyframe API under `/data`, media under `/video`, everything else from
/// `static_dir`.
pub fn router(store: DataStore, video_dir: &Path, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/data", get(data::list_data))
        .route("/data/{video_id}", get(data::get_data).post(data::put_data))
        .with_state(store)
        .nest_service("/video", ServeDir::new(video_dir))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
