//! Error types for prompt generation.

/// Errors that can occur while generating a discussion prompt.
///
/// All of these end up as a private error notification to the player who
/// asked — never as room state.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The server was started without a generation backend (no API key).
    #[error("prompt generation is not configured on this server")]
    NotConfigured,

    /// The HTTP request to the provider failed (connect, timeout, TLS).
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned status {0}")]
    Status(u16),

    /// The provider's response parsed, but contained no usable text.
    #[error("provider response contained no text")]
    EmptyResponse,
}
