//! # Huddle
//!
//! Room and session coordination server for turn-based party games.
//!
//! Players join rooms by short four-character codes, reconnect across
//! transport drops with a persisted session token, and receive color
//! and secret-number assignments from the server. A single coordinator
//! task owns all mutable state, so every client sees a consistent view.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use huddle::HuddleServer;
//! use huddle_prompt::DisabledProvider;
//!
//! # async fn run() -> Result<(), huddle::HuddleError> {
//! let server = HuddleServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(DisabledProvider)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::HuddleError;
pub use server::{HuddleServer, HuddleServerBuilder};

// Re-exports so server binaries only need the meta-crate.
pub use huddle_prompt::{DisabledProvider, GeminiProvider, PromptProvider};
pub use huddle_protocol::{
    ClientIntent, Color, MemberRecord, PromptMode, RoomCode, RoomPhase, ServerEvent, SessionToken,
};
pub use huddle_room::CoordinatorConfig;
pub use huddle_session::{Session, SessionRegistry};
