//! Length-prefixed framing for the reporting stream.
//!
//! Every message on the wire carries an 8-byte header followed by the payload:
//!
//! ```text
//! +---------------------+---------------------+--------------------+
//! | message type (4 B)  | length (4 bytes)    |   payload          |
//! | u32 little-endian   | u32 little-endian   |   (length bytes)   |
//! +---------------------+---------------------+--------------------+
//! ```
//!
//! The length does **not** include the header. Heartbeats are type `0` with a
//! length of `0`. Reports use the current protocol id; the id is bumped every
//! time the report payload layout changes, so receivers reject types they do
//! not know.

use tokio::io::AsyncReadExt;

/// Message type of a keep-alive frame.
pub const HEARTBEAT_ID: u32 = 0;

/// Message type of a report frame. Bump when the payload layout changes.
pub const REPORTING_PROTOCOL_ID: u32 = 2;

/// Size of the frame header in bytes.
pub const HEADER_LEN: usize = 8;

/// Known frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Zero-length keep-alive.
    Heartbeat,
    /// Full server status snapshot.
    Report,
}

impl MessageType {
    /// Wire id of this message type.
    pub fn id(self) -> u32 {
        match self {
            Self::Heartbeat => HEARTBEAT_ID,
            Self::Report => REPORTING_PROTOCOL_ID,
        }
    }

    /// Map a wire id back to a known type.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            HEARTBEAT_ID => Some(Self::Heartbeat),
            REPORTING_PROTOCOL_ID => Some(Self::Report),
            _ => None,
        }
    }
}

/// Configuration for the framing layer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum allowed payload size in bytes. Default: 1 MB.
    pub max_payload_size: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 1_048_576,
        }
    }
}

/// Errors that can occur during framing operations.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload size exceeds the configured maximum.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// The actual payload size.
        size: u64,
        /// The configured maximum.
        max: u32,
    },

    /// A heartbeat frame announced a non-empty payload.
    #[error("heartbeat frame carries {0} payload bytes")]
    HeartbeatWithPayload(u32),

    /// The frame type is not one this build understands. The payload has been
    /// consumed so the stream stays aligned on the next header.
    #[error("unknown message type {0}")]
    UnknownMessageType(u32),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame type.
    pub message_type: MessageType,
    /// Payload bytes (empty for heartbeats).
    pub payload: Vec<u8>,
}

/// Build a complete frame (header + payload) ready to be queued.
pub fn encode_frame(
    message_type: MessageType,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<Vec<u8>, FrameError> {
    if payload.len() as u64 > u64::from(config.max_payload_size) {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len() as u64,
            max: config.max_payload_size,
        });
    }
    if message_type == MessageType::Heartbeat && !payload.is_empty() {
        return Err(FrameError::HeartbeatWithPayload(payload.len() as u32));
    }

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&message_type.id().to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

/// The 8-byte heartbeat frame.
pub fn heartbeat_frame() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    bytes.extend_from_slice(&HEARTBEAT_ID.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}

/// Read a single frame from the stream.
///
/// Blocks until the full frame is available. Returns
/// [`FrameError::ConnectionClosed`] if the peer closes the connection before
/// the frame is complete, and [`FrameError::UnknownMessageType`] after
/// skipping the payload of a frame whose type is not recognized.
pub async fn read_frame<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Frame, FrameError> {
    let mut header = [0u8; HEADER_LEN];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(FrameError::ConnectionClosed);
        }
        Err(e) => return Err(FrameError::Io(e)),
    }

    let type_id = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let payload_len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    if payload_len > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: u64::from(payload_len),
            max: config.max_payload_size,
        });
    }

    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        reader.read_exact(&mut payload).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FrameError::ConnectionClosed
            } else {
                FrameError::Io(e)
            }
        })?;
    }

    let message_type =
        MessageType::from_id(type_id).ok_or(FrameError::UnknownMessageType(type_id))?;
    if message_type == MessageType::Heartbeat && payload_len != 0 {
        return Err(FrameError::HeartbeatWithPayload(payload_len));
    }

    Ok(Frame {
        message_type,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, duplex};

    fn default_config() -> FrameConfig {
        FrameConfig::default()
    }

    #[test]
    fn test_heartbeat_frame_layout() {
        assert_eq!(heartbeat_frame(), vec![0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_report_header_is_little_endian() {
        let bytes = encode_frame(MessageType::Report, b"abc", &default_config()).unwrap();
        assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[3, 0, 0, 0]);
        // Payload follows the header, never overwrites it.
        assert_eq!(&bytes[8..], b"abc");
    }

    #[test]
    fn test_oversized_payload_rejected_on_encode() {
        let config = FrameConfig {
            max_payload_size: 16,
        };
        let result = encode_frame(MessageType::Report, &[0u8; 64], &config);
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { size: 64, .. })));
    }

    #[test]
    fn test_heartbeat_with_payload_rejected() {
        let result = encode_frame(MessageType::Heartbeat, b"x", &default_config());
        assert!(matches!(result, Err(FrameError::HeartbeatWithPayload(1))));
    }

    #[tokio::test]
    async fn test_sequence_of_frames_is_read_in_order() {
        let (mut client, mut server) = duplex(8192);
        let config = default_config();

        let report = encode_frame(MessageType::Report, b"first", &config).unwrap();
        client.write_all(&report).await.unwrap();
        client.write_all(&heartbeat_frame()).await.unwrap();
        client.flush().await.unwrap();

        let first = read_frame(&mut server, &config).await.unwrap();
        assert_eq!(first.message_type, MessageType::Report);
        assert_eq!(first.payload, b"first");

        let second = read_frame(&mut server, &config).await.unwrap();
        assert_eq!(second.message_type, MessageType::Heartbeat);
        assert!(second.payload.is_empty());
    }

    #[tokio::test]
    async fn test_partial_read_resumes_correctly() {
        let (mut client, mut server) = duplex(8);
        let config = default_config();
        let frame = encode_frame(
            MessageType::Report,
            b"this message is larger than the buffer",
            &config,
        )
        .unwrap();

        let write_task = tokio::spawn(async move {
            client.write_all(&frame).await.unwrap();
        });

        let received = read_frame(&mut server, &config).await.unwrap();
        write_task.await.unwrap();
        assert_eq!(received.payload, b"this message is larger than the buffer");
    }

    #[tokio::test]
    async fn test_unknown_type_is_skipped_and_stream_stays_aligned() {
        let (mut client, mut server) = duplex(8192);
        let config = default_config();

        client.write_all(&7u32.to_le_bytes()).await.unwrap();
        client.write_all(&3u32.to_le_bytes()).await.unwrap();
        client.write_all(b"old").await.unwrap();
        client.write_all(&heartbeat_frame()).await.unwrap();
        client.flush().await.unwrap();

        let result = read_frame(&mut server, &config).await;
        assert!(matches!(result, Err(FrameError::UnknownMessageType(7))));

        let next = read_frame(&mut server, &config).await.unwrap();
        assert_eq!(next.message_type, MessageType::Heartbeat);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected_on_read() {
        let (mut client, mut server) = duplex(8192);
        let config = FrameConfig {
            max_payload_size: 16,
        };

        client
            .write_all(&REPORTING_PROTOCOL_ID.to_le_bytes())
            .await
            .unwrap();
        client.write_all(&1024u32.to_le_bytes()).await.unwrap();
        client.flush().await.unwrap();

        let result = read_frame(&mut server, &config).await;
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_connection_closed_during_header_read() {
        let (client, mut server) = duplex(8192);
        drop(client);

        let result = read_frame(&mut server, &default_config()).await;
        assert!(matches!(result, Err(FrameError::ConnectionClosed)));
    }
}
