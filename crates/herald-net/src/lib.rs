//! TCP plumbing for the server-list reporter: endpoint resolution, failover
//! connection establishment, wire framing and the outbound frame queue.

pub mod connector;
pub mod endpoint;
pub mod framing;
pub mod queue;

pub use connector::{Connection, Connector, ConnectorConfig};
pub use endpoint::{Endpoint, Resolve, ResolveError, SystemResolver, resolve};
pub use framing::{
    Frame, FrameConfig, FrameError, HEADER_LEN, HEARTBEAT_ID, MessageType, REPORTING_PROTOCOL_ID,
    encode_frame, heartbeat_frame, read_frame,
};
pub use queue::OutboundQueue;
