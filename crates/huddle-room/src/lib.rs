//! Room coordination for Huddle.
//!
//! This crate is the heart of the server: the single coordinator actor
//! that owns all room and session state, processes client intents one at
//! a time, and fans addressed events out through the gateway.
//!
//! # Key types
//!
//! - [`Coordinator`] — handle to the running coordinator actor
//! - [`RoomRegistry`] / [`Room`] — rooms keyed by short code
//! - [`Gateway`] — token → outbound channel bindings
//! - [`assign`] — pure color-pool and number-deck algorithms
//! - [`CoordinatorConfig`] — retention window, sweep cadence
//!
//! # Concurrency model
//!
//! One Tokio task owns everything mutable. Intents arrive on an mpsc
//! channel and are processed strictly in order, so no intent ever
//! observes another's half-applied mutation and per-room events go out
//! in intent order. The only suspending operation, prompt generation,
//! runs in a spawned task and re-enters the queue as a command when it
//! resolves — the actor itself never awaits the provider.

pub mod assign;
mod coordinator;
mod error;
mod gateway;
mod registry;
mod room;

pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorStats, spawn_coordinator};
pub use error::RoomError;
pub use gateway::{EventSender, Gateway};
pub use registry::RoomRegistry;
pub use room::Room;
