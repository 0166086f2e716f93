//! Wire protocol for Huddle.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientIntent`], [`ServerEvent`], [`MemberRecord`],
//!   identity newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw bytes) and the
//! coordinator (room/session state). It doesn't know about connections
//! or rooms — it only knows how to serialize and deserialize messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Audience, ClientIntent, Color, MemberRecord, PromptMode, RoomCode,
    RoomPhase, ServerEvent, SessionToken,
};
