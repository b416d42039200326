//! Connection to the browser extension.
//!
//! The extension runs a thin shim that performs browser API calls on the
//! host's behalf. Requests go out as JSON text frames correlated by id;
//! replies, tab events and media chunks come back over the same socket.

mod browser_bridge;
mod protocol;

pub(crate) use {
    browser_bridge::BrowserBridge,
    protocol::{BridgeInbound, BridgeOp, BridgeRequest},
};

/// Capacity of the media chunk queue between the socket and the surface.
pub(crate) const CHUNK_QUEUE_CAPACITY: usize = 256;

/// Capacity of the outbound request queue to the extension.
pub(crate) const OUTBOUND_CAPACITY: usize = 64;
