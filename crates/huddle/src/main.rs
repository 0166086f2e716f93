//! Huddle server binary.
//!
//! Configuration comes from the environment:
//!
//! - `HUDDLE_ADDR` — listen address (default `0.0.0.0:8080`)
//! - `GEMINI_API_KEY` — enables the Gemini prompt provider; without it,
//!   prompt requests fail gracefully with a client-visible error
//! - `GEMINI_MODEL` — overrides the default Gemini model
//! - `RUST_LOG` — tracing filter (default `info`)

use huddle::{DisabledProvider, GeminiProvider, HuddleError, HuddleServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), HuddleError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("HUDDLE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    match std::env::var("GEMINI_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let provider = match std::env::var("GEMINI_MODEL") {
                Ok(model) if !model.is_empty() => GeminiProvider::with_model(api_key, model),
                _ => GeminiProvider::new(api_key),
            };
            tracing::info!("prompt generation enabled");
            run(&addr, provider).await
        }
        _ => {
            tracing::warn!("GEMINI_API_KEY not set, prompt generation disabled");
            run(&addr, DisabledProvider).await
        }
    }
}

async fn run<P: huddle::PromptProvider>(addr: &str, provider: P) -> Result<(), HuddleError> {
    let server = HuddleServer::builder().bind(addr).build(provider).await?;
    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "listening");
    }
    server.run().await
}
