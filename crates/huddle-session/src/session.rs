//! The session record: one participant's identity across reconnects.

use std::time::Instant;

use huddle_protocol::{Color, RoomCode, SessionToken};

/// One participant's durable state on the server.
///
/// Created on first contact and kept until the retention sweep reclaims
/// it. The transport a session is reachable on is NOT stored here — that
/// binding lives in the gateway and changes on every reconnect, while
/// everything in this struct is identity.
#[derive(Debug, Clone)]
pub struct Session {
    /// The secret token the client replays to reconnect.
    /// A 32-character hex string (128 bits of randomness).
    pub token: SessionToken,

    /// Display name, fixed the first time this session joins.
    /// Later joins with a different name do not change it.
    pub display_name: String,

    /// Assigned on the first successful room join, stable while the
    /// session stays in that room. Cleared on explicit leave so the next
    /// room hands out a fresh pool color.
    pub color: Option<Color>,

    /// The dealt secret number, present only while the owning room is
    /// playing. Cleared on reset and on leave.
    pub secret: Option<u8>,

    /// The room this session belongs to, if any. A reconnecting session
    /// is routed back to this room regardless of the code it supplies.
    pub room: Option<RoomCode>,

    /// Last time this session showed any activity. Input to the
    /// retention sweep; never part of identity.
    pub last_seen: Instant,
}

impl Session {
    /// Creates a fresh session with no room, color, or secret.
    pub(crate) fn new(token: SessionToken, display_name: String) -> Self {
        Self {
            token,
            display_name,
            color: None,
            secret: None,
            room: None,
            last_seen: Instant::now(),
        }
    }
}
