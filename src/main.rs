//! ytinfo - HTTP API over yt-dlp
//!
//! Resolves URLs or search terms into yt-dlp metadata documents and streams
//! re-muxed downloads through ffmpeg.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ytinfo::downloader::Transcoder;
use ytinfo::{build_app, AppSettings, AppState, InfoFacade, YtDlpExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = AppSettings::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ytinfo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let extractor = match &settings.ytdlp_path {
        Some(path) => YtDlpExtractor::with_path(path),
        None => YtDlpExtractor::new(),
    }
    .context("Failed to initialize yt-dlp (install it with `pip install yt-dlp` or set YTDLP_PATH)")?;

    let transcoder = match &settings.ffmpeg_path {
        Some(path) => Transcoder::new(path),
        None => Transcoder::locate(),
    };

    let facade = InfoFacade::new(Arc::new(extractor), settings.request_timeout());
    let app = build_app(AppState::new(facade, transcoder));

    let addr = settings.bind_addr();
    tracing::info!("Starting server on {}", addr);
    tracing::info!(
        "Request timeout: {}s",
        settings.request_timeout().as_secs()
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
