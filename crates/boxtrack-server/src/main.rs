//! Boxtrack Server
//!
//! Axum backend that stores keyframe CSV files, serves video media and the
//! annotator's static assets.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::service::store::DataStore;

mod app;
mod handler;
mod service;
mod util;

#[derive(Parser, Debug)]
#[command(name = "boxtrack-server", about = "Keyframe storage and media server for boxtrack")]
struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "BOXTRACK_ADDR", default_value = "0.0.0.0:3050")]
    addr: SocketAddr,

    /// Directory holding one `{video_id}.csv` per video
    #[arg(long, env = "BOXTRACK_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding `{video_id}.mp4` files
    #[arg(long, env = "BOXTRACK_VIDEO_DIR", default_value = "video")]
    video_dir: PathBuf,

    /// Root for every other static path
    #[arg(long, env = "BOXTRACK_STATIC_DIR", default_value = ".")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();
    let addr = args.addr;

    let store = DataStore::new(args.data_dir.clone());
    let router = app::router(store, &args.video_dir, &args.static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on {addr}");
    tracing::info!("  - Keyframes: http://{addr}/data ({})", args.data_dir.display());
    tracing::info!("  - Video: http://{addr}/video/{{video_id}}.mp4 ({})", args.video_dir.display());
    tracing::info!("  - Static: http://{addr}/ ({})", args.static_dir.display());

    axum::serve(listener, router).await.context("Server terminated")?;
    Ok(())
}
