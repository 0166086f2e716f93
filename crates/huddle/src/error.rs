//! Unified error type for the Huddle server.

use huddle_protocol::ProtocolError;
use huddle_room::RoomError;
use huddle_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Users of the `huddle` meta-crate deal with this single type instead
/// of importing errors from each sub-crate. The `#[from]` attribute on
/// each variant auto-generates `From` impls, so the `?` operator
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (coordinator gone, deck exhausted).
    #[error(transparent)]
    Room(#[from] RoomError),
}
