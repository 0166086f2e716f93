//! The [`PromptProvider`] trait: Huddle's text-generation seam.
//!
//! Huddle doesn't bake in one LLM vendor. The coordinator is generic over
//! this trait, so production uses [`GeminiProvider`](crate::GeminiProvider),
//! development can run with [`DisabledProvider`], and tests plug in
//! canned or failing providers without touching coordinator code.

use huddle_protocol::PromptMode;

use crate::PromptError;

/// Generates one discussion category string for the given tone.
///
/// `Send + Sync + 'static` because the provider is shared across the
/// coordinator's spawned request tasks for the lifetime of the server.
/// `Clone` lets each in-flight request hold its own handle (providers
/// are expected to be cheap to clone, e.g. wrapping a `reqwest::Client`
/// which is internally reference-counted).
pub trait PromptProvider: Clone + Send + Sync + 'static {
    /// Produces a short natural-language category, or fails.
    ///
    /// Implementations should bound their own latency (a hung provider
    /// call leaves the requesting player staring at a spinner). The
    /// caller applies no retry policy.
    fn generate(
        &self,
        mode: PromptMode,
    ) -> impl Future<Output = Result<String, PromptError>> + Send;
}

/// A provider for servers with no generation backend configured.
///
/// Every call fails with [`PromptError::NotConfigured`], which the
/// coordinator relays to the requesting player as a private error.
/// Everything else about the game keeps working.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

impl PromptProvider for DisabledProvider {
    async fn generate(&self, _mode: PromptMode) -> Result<String, PromptError> {
        Err(PromptError::NotConfigured)
    }
}
