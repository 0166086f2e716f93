//! Participant session management for Huddle.
//!
//! A *session* is the durable identity of one human participant, distinct
//! from whatever transport they happen to be connected on right now. The
//! client persists the session token and replays it after a network drop,
//! so the same person keeps the same seat, color and secret number.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)  ← memberships reference sessions by token
//!     ↕
//! Session layer (this crate)  ← identity, color, secret, last activity
//!     ↕
//! Protocol layer (below)  ← provides SessionToken, Color types
//! ```
//!
//! The registry is deliberately infallible: an unknown or absent token is
//! resolved by creating a fresh session, never by returning an error.

mod registry;
mod session;

pub use registry::SessionRegistry;
pub use session::Session;
