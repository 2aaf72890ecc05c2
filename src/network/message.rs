//! Message Envelope
//!
//! Outbound messages carry a numeric type and the service node the routing
//! layer should deliver them to. On the wire each message is a fixed header
//! followed by its payload:
//!
//! ```text
//! ┌──────────────┬─────────────────┬─────────────────┬─────────────┐
//! │ u16 type BE  │ u24 length BE   │ u16 version BE  │ payload ... │
//! └──────────────┴─────────────────┴─────────────────┴─────────────┘
//! ```

use serde::{Serialize, Deserialize};

use crate::core::stream::{ByteStream, CodecError, CodecResult};
use crate::game::home::Home;

/// Header size in bytes.
pub const FRAME_HEADER_LEN: usize = 7;

/// Largest payload a u24 length can describe.
pub const MAX_PAYLOAD_LEN: usize = 0x00FF_FFFF;

/// Message type of [`OwnHomeDataMessage`].
pub const OWN_HOME_DATA_TYPE: u16 = 24101;

/// Logical service a message is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ServiceNode {
    /// Login and account state.
    Account = 0,
    /// Player home.
    Home = 1,
    /// Clans.
    Alliance = 2,
    /// Leaderboards.
    Scoring = 3,
    /// Battles.
    Battle = 4,
}

/// A message the home layer can send.
pub trait Message {
    /// Numeric message type.
    fn message_type(&self) -> u16;

    /// Service the message is routed to.
    fn service_node(&self) -> ServiceNode;

    /// Payload version.
    fn version(&self) -> u16 {
        0
    }

    /// Write the payload.
    fn encode(&self, stream: &mut ByteStream);

    /// Encode the payload and wrap it in a frame.
    fn to_frame(&self) -> MessageFrame {
        let mut stream = ByteStream::new();
        self.encode(&mut stream);
        MessageFrame {
            message_type: self.message_type(),
            version: self.version(),
            payload: stream.into_bytes(),
        }
    }
}

// =============================================================================
// Frame
// =============================================================================

/// Header plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFrame {
    /// Numeric message type.
    pub message_type: u16,
    /// Payload version.
    pub version: u16,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

impl MessageFrame {
    /// Serialize header and payload.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let len = self.payload.len();
        if len > MAX_PAYLOAD_LEN {
            return Err(CodecError::InvalidLength {
                what: "frame payload",
                length: len as i64,
            });
        }

        let mut out = Vec::with_capacity(FRAME_HEADER_LEN + len);
        out.extend_from_slice(&self.message_type.to_be_bytes());
        out.extend_from_slice(&(len as u32).to_be_bytes()[1..]);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Read one frame from `stream`.
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let header = stream.read_range(FRAME_HEADER_LEN)?;
        let message_type = u16::from_be_bytes([header[0], header[1]]);
        let len = u32::from_be_bytes([0, header[2], header[3], header[4]]) as usize;
        let version = u16::from_be_bytes([header[5], header[6]]);
        let payload = stream.read_range(len)?;

        Ok(Self {
            message_type,
            version,
            payload,
        })
    }

    /// Stream positioned at the start of the payload.
    pub fn payload_stream(&self) -> ByteStream {
        ByteStream::from_bytes(self.payload.clone())
    }
}

// =============================================================================
// Own Home Data
// =============================================================================

/// Full home state sent when a client finishes logging in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnHomeDataMessage {
    /// Home snapshot.
    pub home: Home,
    /// Server time in unix seconds.
    pub server_time: i64,
}

impl OwnHomeDataMessage {
    /// Decode the payload of an own-home-data frame.
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let home = Home::decode(stream)?;
        let server_time = stream.read_long()?;
        Ok(Self { home, server_time })
    }
}

impl Message for OwnHomeDataMessage {
    fn message_type(&self) -> u16 {
        OWN_HOME_DATA_TYPE
    }

    fn service_node(&self) -> ServiceNode {
        ServiceNode::Home
    }

    fn encode(&self, stream: &mut ByteStream) {
        self.home.encode(stream);
        stream.write_long(self.server_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_content;

    #[test]
    fn test_header_layout() {
        let frame = MessageFrame {
            message_type: 0x5E25,
            version: 3,
            payload: vec![0xAA; 0x0102],
        };
        let bytes = frame.encode().unwrap();

        assert_eq!(bytes.len(), FRAME_HEADER_LEN + 0x0102);
        assert_eq!(&bytes[..FRAME_HEADER_LEN], &[0x5E, 0x25, 0x00, 0x01, 0x02, 0x00, 0x03]);
    }

    #[test]
    fn test_frames_decode_back_to_back() {
        let first = MessageFrame { message_type: 1, version: 0, payload: vec![1, 2, 3] };
        let second = MessageFrame { message_type: 2, version: 9, payload: Vec::new() };

        let mut bytes = first.encode().unwrap();
        bytes.extend(second.encode().unwrap());

        let mut stream = ByteStream::from_bytes(bytes);
        assert_eq!(MessageFrame::decode(&mut stream).unwrap(), first);
        assert_eq!(MessageFrame::decode(&mut stream).unwrap(), second);
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_truncated_frame() {
        let bytes = MessageFrame { message_type: 1, version: 0, payload: vec![0; 10] }
            .encode()
            .unwrap();

        for cut in [3, FRAME_HEADER_LEN + 4] {
            let mut stream = ByteStream::from_bytes(&bytes[..cut]);
            assert!(matches!(
                MessageFrame::decode(&mut stream),
                Err(CodecError::UnexpectedEndOfStream { .. })
            ));
        }
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let frame = MessageFrame {
            message_type: 1,
            version: 0,
            payload: vec![0; MAX_PAYLOAD_LEN + 1],
        };
        assert!(matches!(frame.encode(), Err(CodecError::InvalidLength { .. })));
    }

    #[test]
    fn test_own_home_data() {
        let content = test_content();
        let message = OwnHomeDataMessage {
            home: Home::new(2, 77, &content),
            server_time: 1_700_000_000,
        };
        assert_eq!(message.service_node(), ServiceNode::Home);

        let frame = message.to_frame();
        assert_eq!(frame.message_type, OWN_HOME_DATA_TYPE);

        let mut stream = ByteStream::from_bytes(frame.encode().unwrap());
        let frame = MessageFrame::decode(&mut stream).unwrap();
        let decoded = OwnHomeDataMessage::decode(&mut frame.payload_stream()).unwrap();
        assert_eq!(decoded, message);
    }
}
