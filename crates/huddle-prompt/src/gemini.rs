//! Gemini-backed prompt provider.
//!
//! Talks to Google's `generateContent` REST endpoint. One request per
//! prompt, no streaming, no retries. The request carries a fixed
//! instruction describing the game's category format plus tone examples
//! for the selected mode; the model is expected to reply with just the
//! category text.

use std::time::Duration;

use huddle_protocol::PromptMode;
use serde::{Deserialize, Serialize};

use crate::{PromptError, PromptProvider};

/// Default model when none is configured.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Bound on a single generation call. A slow provider resolves late or
/// errors; it never wedges the requesting player forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A [`PromptProvider`] backed by the Gemini `generateContent` API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference-counted,
/// so every in-flight request can hold its own copy.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Creates a provider with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Creates a provider for a specific model name.
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

impl PromptProvider for GeminiProvider {
    async fn generate(&self, mode: PromptMode) -> Result<String, PromptError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: instruction_for(mode),
                }],
            }],
        };

        tracing::debug!(%mode, model = %self.model, "requesting prompt");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%mode, status = status.as_u16(), "provider rejected request");
            return Err(PromptError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .first_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(PromptError::EmptyResponse)?;

        tracing::info!(%mode, prompt = %text, "prompt generated");
        Ok(text)
    }
}

/// Builds the generation instruction for the given tone.
///
/// The category must describe a spectrum that players can argue their
/// secret 1-100 number onto, so the instruction pins the output format
/// and seeds each tone with examples.
fn instruction_for(mode: PromptMode) -> String {
    let examples = match mode {
        PromptMode::Safe => {
            "Tone: whimsical, family-friendly, abstract, funny, or everyday scenarios.\n\
             \"Superpowers from least to most powerful\"\n\
             \"Worst to best places to start dancing uncontrollably\"\n\
             \"Scenarios from least to most annoying\"\n\
             \"Animals and fantasy creatures from least to most cool to have as a pet\"\n\
             \"Worst to best things to put in a smoothie\""
        }
        PromptMode::Nsfw => {
            "Tone: adult humor, dark or morbid curiosity, taboo, or gross-out humor.\n\
             \"Worst to best ways to commit a murder and try to get away with it\"\n\
             \"Worst to best things to get tattooed\"\n\
             \"Places to hide a body from worst to best\"\n\
             \"Worst to best things to do in a zombie apocalypse\"\n\
             \"Things that least to most disgust you\""
        }
    };

    format!(
        "Role: you are a content generator for a cooperative party game. Players \
         hold secret numbers and must place them on a spectrum described by a \
         category.\n\n\
         Objective: generate a single new category in the format \
         \"Subject X from [Metric A] to [Metric B]\" or \"Worst to best [Subject X]\". \
         The category must be subjective enough that players can debate where a \
         number falls on the scale.\n\n\
         Match the tone of these examples:\n{examples}\n\n\
         Output only the category text. No preamble, no explanation.\n\n\
         Mode: {mode}"
    )
}

// ---------------------------------------------------------------------------
// Wire structs for the generateContent endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GenerateResponse {
    /// Returns the first text part of the first candidate, if any.
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

// =========================================================================
// Tests
// =========================================================================
