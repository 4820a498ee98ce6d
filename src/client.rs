//! Consumer side of the stream
//!
//! Connects with a bounded number of retries, then reads frames and sends
//! control messages over the same socket.

use std::time::Duration;

use tokio::net::{TcpStream, ToSocketAddrs};

use crate::capture::Resolution;
use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::protocol::{self, ControlMessage, FramePayload};

pub struct StreamClient {
    stream: TcpStream,
}

impl StreamClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> RelayResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Try up to `attempts` times, sleeping `interval` between failures
    pub async fn connect_with_retry(
        addr: &str,
        attempts: u32,
        interval: Duration,
    ) -> RelayResult<Self> {
        let attempts = attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match Self::connect(addr).await {
                Ok(client) => {
                    tracing::info!("Connected to {} (attempt {})", addr, attempt);
                    return Ok(client);
                }
                Err(e) => {
                    tracing::warn!("Connection attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RelayError::Configuration(format!("No connection attempts made to {}", addr))
        }))
    }

    /// Connect to `bindAddress` using the configured retry count and interval
    pub async fn connect_with_config(config: &RelayConfig) -> RelayResult<Self> {
        Self::connect_with_retry(
            &config.bind_address,
            config.connect_retries,
            config.connect_retry_interval(),
        )
        .await
    }

    /// Next frame, or `None` once the server closes the stream
    pub async fn recv_frame(&mut self) -> RelayResult<Option<FramePayload>> {
        match protocol::read_message(&mut self.stream).await? {
            Some(payload) => Ok(Some(protocol::decode_frame_payload(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn send_control(&mut self, msg: &ControlMessage) -> RelayResult<()> {
        let framed = protocol::encode_control(msg)?;
        protocol::write_message(&mut self.stream, &framed).await
    }

    pub async fn request_resize(&mut self, size: Resolution) -> RelayResult<()> {
        self.send_control(&ControlMessage::Resize {
            width: size.width,
            height: size.height,
        })
        .await
    }
}
