//! Hand tracker fed by an external process
//!
//! The landmark model runs out of process. For every capture it writes one
//! JSON header line to stdout followed by the raw JPEG bytes:
//!
//! ```text
//! {"width":1280,"height":720,"hands":[[[0.41,0.77], ... 21 points]],"imageLen":48213}\n
//! <48213 bytes of JPEG>
//! ```
//!
//! A blank line is a dropped capture. Hands without exactly 21 points are
//! discarded individually.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use crate::capture::traits::{CapturedImage, FrameObservation, HandTracker};
use crate::error::{RelayError, RelayResult};
use crate::gesture::{Hand, Landmark};
use crate::protocol::MAX_MESSAGE_SIZE;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedHeader {
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<Vec<(f64, f64)>>,
    #[serde(default)]
    image_len: usize,
}

/// Parses the header+image feed from any buffered reader
pub struct FeedTracker<R> {
    reader: R,
    line: String,
    frames_read: u64,
}

impl<R: AsyncBufRead + Unpin + Send> FeedTracker<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            frames_read: 0,
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn hands_from(raw: Vec<Vec<(f64, f64)>>) -> Vec<Hand> {
        raw.into_iter()
            .filter_map(|points| {
                let points: Vec<Landmark> = points.into_iter().map(Landmark::from).collect();
                match Hand::try_from(points) {
                    Ok(hand) => Some(hand),
                    Err(e) => {
                        tracing::warn!("Discarding hand: {}", e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> HandTracker for FeedTracker<R> {
    async fn next_observation(&mut self) -> RelayResult<Option<FrameObservation>> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line).await?;
        if n == 0 {
            return Err(RelayError::TrackerClosed);
        }

        let header_text = self.line.trim();
        if header_text.is_empty() {
            return Ok(None);
        }

        // A bad header leaves an unknown number of image bytes in the pipe
        let header: FeedHeader = serde_json::from_str(header_text)
            .map_err(|e| RelayError::Tracker(format!("Malformed feed header: {}", e)))?;

        if header.image_len > MAX_MESSAGE_SIZE {
            return Err(RelayError::Tracker(format!(
                "Image too large: {} > {}",
                header.image_len, MAX_MESSAGE_SIZE
            )));
        }

        let mut data = vec![0u8; header.image_len];
        self.reader.read_exact(&mut data).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                RelayError::TrackerClosed
            } else {
                RelayError::Io(e)
            }
        })?;

        self.frames_read += 1;

        Ok(Some(FrameObservation {
            hands: Self::hands_from(header.hands),
            image: CapturedImage {
                data,
                width: header.width,
                height: header.height,
            },
        }))
    }
}

/// Spawns the tracker command and reads its stdout feed
pub struct SubprocessTracker {
    // Held so the process is killed when the tracker is dropped
    _child: Child,
    feed: FeedTracker<BufReader<ChildStdout>>,
}

impl SubprocessTracker {
    pub fn spawn(command: &[String]) -> RelayResult<Self> {
        let (program, args) = command.split_first().ok_or_else(|| {
            RelayError::Configuration("Tracker command is empty".to_string())
        })?;

        tracing::info!("Starting tracker process: {} {:?}", program, args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RelayError::Tracker("Tracker stdout unavailable".to_string()))?;

        Ok(Self {
            _child: child,
            feed: FeedTracker::new(BufReader::new(stdout)),
        })
    }
}

#[async_trait]
impl HandTracker for SubprocessTracker {
    async fn next_observation(&mut self) -> RelayResult<Option<FrameObservation>> {
        self.feed.next_observation().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(hands: &str, image_len: usize) -> String {
        format!(
            "{{\"width\":640,\"height\":480,\"hands\":{},\"imageLen\":{}}}\n",
            hands, image_len
        )
    }

    fn full_hand() -> String {
        let points: Vec<String> = (0..21).map(|i| format!("[{},0.5]", i as f64 / 100.0)).collect();
        format!("[{}]", points.join(","))
    }

    #[tokio::test]
    async fn test_reads_header_and_image() {
        let mut feed = header(&format!("[{}]", full_hand()), 3).into_bytes();
        feed.extend_from_slice(&[9, 8, 7]);
        let mut tracker = FeedTracker::new(Cursor::new(feed));

        let obs = tracker.next_observation().await.unwrap().unwrap();
        assert_eq!(obs.hands.len(), 1);
        assert_eq!(obs.hands[0][20], Landmark::new(0.2, 0.5));
        assert_eq!(obs.image.data, vec![9, 8, 7]);
        assert_eq!(obs.capture_size(), crate::capture::Resolution::new(640, 480));
        assert_eq!(tracker.frames_read(), 1);

        assert!(matches!(
            tracker.next_observation().await,
            Err(RelayError::TrackerClosed)
        ));
    }

    #[tokio::test]
    async fn test_blank_line_is_dropped_frame() {
        let mut feed = b"\n".to_vec();
        feed.extend(header("[]", 0).into_bytes());
        let mut tracker = FeedTracker::new(Cursor::new(feed));

        assert!(tracker.next_observation().await.unwrap().is_none());
        let obs = tracker.next_observation().await.unwrap().unwrap();
        assert!(obs.hands.is_empty());
    }

    #[tokio::test]
    async fn test_partial_hand_is_discarded() {
        let partial = "[[0.1,0.1],[0.2,0.2]]";
        let feed = header(&format!("[{},{}]", partial, full_hand()), 0);
        let mut tracker = FeedTracker::new(Cursor::new(feed.into_bytes()));

        let obs = tracker.next_observation().await.unwrap().unwrap();
        assert_eq!(obs.hands.len(), 1);
    }

    #[tokio::test]
    async fn test_short_image_means_closed() {
        let mut feed = header("[]", 10).into_bytes();
        feed.extend_from_slice(&[1, 2]);
        let mut tracker = FeedTracker::new(Cursor::new(feed));
        assert!(matches!(
            tracker.next_observation().await,
            Err(RelayError::TrackerClosed)
        ));
    }

    #[tokio::test]
    async fn test_malformed_header_is_fatal() {
        let mut tracker = FeedTracker::new(Cursor::new(b"not json\n".to_vec()));
        assert!(matches!(
            tracker.next_observation().await,
            Err(RelayError::Tracker(_))
        ));
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(matches!(
            SubprocessTracker::spawn(&[]),
            Err(RelayError::Configuration(_))
        ));
    }
}
