//! Handlink - drive the pointer with hand gestures and stream the camera view.
//!
//! The library hosts the gesture pipeline (geometry, classification, cursor
//! smoothing, the grab/click state machine), the length-prefixed MessagePack
//! wire protocol and the single-client stream server that ties them together.

pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod gesture;
pub mod input;
pub mod interaction;
pub mod processing;
pub mod protocol;
pub mod server;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capture::{JpegResizer, SubprocessTracker};
use config::RelayConfig;
use input::{InputInjector, JournalInjector, LoggingInjector};
use server::{FramePipeline, StreamServer};

/// Run the relay until the session ends or Ctrl-C is pressed
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handlink=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Handlink v{}", env!("CARGO_PKG_VERSION"));

    let config = RelayConfig::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let server = StreamServer::bind(config.bind_address.as_str(), config.output)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    serve_once(&config, server).await
}

/// Serve one session on an already bound server.
///
/// The action journal is written whether the session ends cleanly, fails, or
/// is interrupted; a session error is returned after the flush.
pub async fn serve_once(config: &RelayConfig, server: StreamServer) -> anyhow::Result<()> {
    let tracker = SubprocessTracker::spawn(&config.tracker_command)
        .context("Failed to start hand tracker")?;
    let encoder = JpegResizer::new(config.jpeg_quality);

    let journal = config
        .journal_path
        .as_ref()
        .map(|_| JournalInjector::new(config.screen));
    let injector: Box<dyn InputInjector> = match &journal {
        Some(journal) => Box::new(journal.clone()),
        None => Box::new(LoggingInjector::new(config.screen)),
    };

    let pipeline = FramePipeline::new(config, encoder, injector);

    let outcome = tokio::select! {
        summary = server.serve(tracker, pipeline) => summary.map(Some),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            Ok(None)
        }
    };

    let flushed = match (&journal, &config.journal_path) {
        (Some(journal), Some(path)) => journal.flush_to_disk(path),
        _ => Ok(()),
    };

    if let Some(summary) = outcome.context("Session failed")? {
        tracing::info!(
            "Session {} with {} finished: {:?}, {} frames sent",
            summary.session_id,
            summary.peer,
            summary.end,
            summary.frames_sent
        );
    }
    flushed.context("Failed to write action journal")?;

    Ok(())
}
