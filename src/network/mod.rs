//! Network Layer
//!
//! Message framing and the per-home session actor. The transport and the
//! message-routing bus live outside this crate; this layer hands them framed
//! bytes tagged with a service node.

pub mod message;
pub mod session;

pub use message::{
    Message, MessageFrame, OwnHomeDataMessage, ServiceNode,
    FRAME_HEADER_LEN, MAX_PAYLOAD_LEN, OWN_HOME_DATA_TYPE,
};
pub use session::{
    HomeHandle, HomeJob, HomeSession, OutboundMessage, SessionConfig, SessionError,
};
