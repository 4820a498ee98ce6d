//! Single-client TCP stream session
//!
//! After the one client connects, two loops run concurrently over the split
//! socket. The send loop pulls observations from the tracker, runs them
//! through the [`FramePipeline`] and writes framed payloads. The receive loop
//! reads control messages and updates the shared output size. Whichever loop
//! finishes first ends the session.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::Instrument;
use uuid::Uuid;

use crate::capture::{FrameEncoder, HandTracker, Resolution};
use crate::error::{RelayError, RelayResult};
use crate::input::InputInjector;
use crate::protocol::{self, ControlMessage};
use crate::server::output::SharedResolution;
use crate::server::pipeline::FramePipeline;

/// Why a session ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEnd {
    /// The client closed its side cleanly
    ClientClosed,
    /// A write or read failed because the peer went away
    ClientDisconnected,
    /// The tracker feed ended
    TrackerClosed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub peer: SocketAddr,
    pub frames_sent: u64,
    pub end: SessionEnd,
}

pub struct StreamServer {
    listener: TcpListener,
    output: SharedResolution,
}

impl StreamServer {
    pub async fn bind(addr: impl ToSocketAddrs, initial: Resolution) -> RelayResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            output: SharedResolution::new(initial),
        })
    }

    pub fn local_addr(&self) -> RelayResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle on the outbound size, shared with the running session
    pub fn output(&self) -> SharedResolution {
        self.output.clone()
    }

    /// Accept exactly one client and stream to it until the session ends.
    ///
    /// The listener is dropped once the client is accepted, so later
    /// connection attempts are refused.
    pub async fn serve<T, E, I>(
        self,
        tracker: T,
        pipeline: FramePipeline<E, I>,
    ) -> RelayResult<SessionSummary>
    where
        T: HandTracker,
        E: FrameEncoder,
        I: InputInjector,
    {
        let StreamServer { listener, output } = self;

        tracing::info!("Waiting for connection on {}", listener.local_addr()?);
        let (stream, peer) = listener.accept().await?;
        drop(listener);

        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("session", id = %session_id, peer = %peer);
        span.in_scope(|| tracing::info!("Client connected"));

        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        let frames_sent = Arc::new(AtomicU64::new(0));

        let mut receive = tokio::spawn(receive_loop(reader, output.clone()).instrument(span.clone()));
        let send = send_loop(writer, tracker, pipeline, output, frames_sent.clone())
            .instrument(span.clone());

        let result = tokio::select! {
            result = send => {
                receive.abort();
                result
            }
            joined = &mut receive => joined.unwrap_or_else(|e| Err(RelayError::from(e))),
        };

        let end = match result {
            Ok(end) => end,
            Err(e) if e.is_disconnect() => {
                span.in_scope(|| tracing::info!("Client disconnected: {}", e));
                SessionEnd::ClientDisconnected
            }
            Err(e) => {
                span.in_scope(|| tracing::error!("Session failed: {}", e));
                return Err(e);
            }
        };

        let summary = SessionSummary {
            session_id,
            peer,
            frames_sent: frames_sent.load(Ordering::Relaxed),
            end,
        };
        span.in_scope(|| {
            tracing::info!("Session ended ({:?}) after {} frames", summary.end, summary.frames_sent)
        });
        Ok(summary)
    }
}

async fn send_loop<T, E, I>(
    mut writer: OwnedWriteHalf,
    mut tracker: T,
    mut pipeline: FramePipeline<E, I>,
    output: SharedResolution,
    frames_sent: Arc<AtomicU64>,
) -> RelayResult<SessionEnd>
where
    T: HandTracker,
    E: FrameEncoder,
    I: InputInjector,
{
    let clock = Instant::now();

    loop {
        let observation = match tracker.next_observation().await {
            Ok(Some(observation)) => observation,
            Ok(None) => {
                tracing::debug!("Dropped capture, skipping frame");
                tokio::task::yield_now().await;
                continue;
            }
            Err(RelayError::TrackerClosed) => {
                tracing::info!("Tracker feed ended");
                return Ok(SessionEnd::TrackerClosed);
            }
            Err(e) => return Err(e),
        };

        // Sampled once per frame, after the capture is in hand
        let target = output.snapshot();

        let payload = match pipeline.process(observation, target, clock.elapsed()).await {
            Ok(payload) => payload,
            Err(RelayError::Encoding(msg)) => {
                tracing::warn!("Skipping frame: {}", msg);
                continue;
            }
            Err(e) => return Err(e),
        };

        let framed = protocol::encode_frame(&payload)?;
        protocol::write_message(&mut writer, &framed).await?;

        let sent = frames_sent.fetch_add(1, Ordering::Relaxed) + 1;
        if sent % 300 == 0 {
            tracing::debug!("Sent {} frames ({})", sent, target);
        }
    }
}

async fn receive_loop(mut reader: OwnedReadHalf, output: SharedResolution) -> RelayResult<SessionEnd> {
    loop {
        let Some(payload) = protocol::read_message(&mut reader).await? else {
            tracing::info!("Client closed the connection");
            return Ok(SessionEnd::ClientClosed);
        };

        match protocol::decode_control_payload(&payload) {
            Ok(ControlMessage::Resize { width, height }) => {
                let size = Resolution::new(width, height);
                if size.is_empty() {
                    tracing::warn!("Ignoring resize to empty size {}", size);
                    continue;
                }
                output.replace(size);
                tracing::info!("Resize request: {}", size);
            }
            Ok(ControlMessage::Unknown) => {
                tracing::debug!("Ignoring unknown control message");
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed control message: {}", e);
            }
        }
    }
}
