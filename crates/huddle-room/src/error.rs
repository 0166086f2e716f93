//! Error types for the room layer.

/// Errors that can occur during room operations.
///
/// Deliberately small: most "failures" in this layer (unknown room code,
/// non-member leave) are specified as silent no-ops, not errors.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// More members than the deck can serve. The deck is the integers
    /// 1..=100, one per member, so a 101st member cannot be dealt a
    /// distinct secret.
    #[error("cannot deal secrets to {0} members: the deck holds only 100 numbers")]
    TooManyMembers(usize),

    /// The coordinator's command channel is closed — the server is
    /// shutting down.
    #[error("coordinator is unavailable")]
    Unavailable,
}
