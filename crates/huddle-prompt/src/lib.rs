//! Discussion prompt generation for Huddle.
//!
//! The game's only external collaborator: given a tone
//! ([`PromptMode`](huddle_protocol::PromptMode)), produce one short
//! category string like "Worst to best superpowers". The coordinator
//! treats the provider as an opaque async function — no retries, no
//! caching, failures surface to the requesting player only.
//!
//! Implementations:
//! - [`GeminiProvider`] — Google's `generateContent` REST endpoint
//! - [`DisabledProvider`] — always fails; used when no API key is
//!   configured

mod error;
mod gemini;
mod provider;

pub use error::PromptError;
pub use gemini::GeminiProvider;
pub use provider::{DisabledProvider, PromptProvider};
