//! Core protocol types for Huddle's wire format.
//!
//! Everything here is serialized to JSON, pushed over the transport, and
//! parsed on the other side. Clients send [`ClientIntent`]s; the server
//! answers with [`ServerEvent`]s, each addressed to an [`Audience`]
//! (one session or a whole room).

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The durable identity of one participant.
///
/// A newtype wrapper around the opaque token string the server hands out
/// on first contact. The client persists it (e.g. in local storage) and
/// replays it to reconnect, so the same human keeps the same seat, color
/// and secret across transport drops.
///
/// `#[serde(transparent)]` makes the JSON just the inner string, not
/// `{ "0": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Returns the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tokens are secrets shared between the server and one client, so
/// `Display` (used in logs) shows only a short prefix.
impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "s-{prefix}")
    }
}

/// A short human-typable room code, e.g. `AB12`.
///
/// Always stored uppercase so that codes typed as `ab12` and `AB12` name
/// the same room. Construct through [`RoomCode::new`] to get that
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Creates a room code, normalizing to uppercase.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member's display color as a `#RRGGBB` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    /// Returns the hex string, including the leading `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Room phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// ```text
///   Lobby ──(start)──→ Playing
///     ↑                   │
///     └──────(reset)──────┘
/// ```
///
/// - **Lobby**: members gather, no secrets dealt. The prompt may already
///   be set (topic selection happens pre-game).
/// - **Playing**: every member who was present at `start` holds a dealt
///   secret. Members joining mid-game hold none until the next start.
///
/// On the wire this is `"LOBBY"` / `"PLAYING"`, matching what clients
/// render in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomPhase {
    Lobby,
    Playing,
}

impl RoomPhase {
    /// Returns `true` if a game is in progress.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "LOBBY"),
            Self::Playing => write!(f, "PLAYING"),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt mode
// ---------------------------------------------------------------------------

/// Tone selector for generated discussion prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptMode {
    /// Whimsical, family-friendly categories.
    Safe,
    /// Adult humor, dark or taboo categories.
    Nsfw,
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Nsfw => write!(f, "NSFW"),
        }
    }
}

// ---------------------------------------------------------------------------
// Member record
// ---------------------------------------------------------------------------

/// One room member as broadcast to clients.
///
/// This is the public view: it carries the member's own session token
/// (clients use it to find themselves in the list), but never the
/// member's secret value — secrets only travel in private
/// [`ServerEvent::SecretDealt`] events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    /// The member's session token.
    pub session_token: SessionToken,
    /// Display name, fixed at first join.
    pub name: String,
    /// `true` for exactly one member per room: the first ever to join.
    pub is_host: bool,
    /// Display color, unique within the room while the palette lasts.
    pub color: Color,
}

// ---------------------------------------------------------------------------
// Audience — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// The coordinator computes `(Audience, ServerEvent)` pairs; the gateway
/// resolves each audience to concrete outbound channels. Secrets and
/// error notifications go to a single session; membership updates go to
/// the whole room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every member of the room with a live transport.
    Room(RoomCode),
    /// One specific session.
    Session(SessionToken),
}

// ---------------------------------------------------------------------------
// Client intents
// ---------------------------------------------------------------------------

/// A request from a client to the room coordinator.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "join", "name": "Alice" }` — easy to dispatch on in a
/// JavaScript client. Field names are camelCase on the wire
/// (`roomCode`, `sessionToken`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientIntent {
    /// Join (or create) a room, optionally reconnecting an old session.
    Join {
        name: String,
        #[serde(default)]
        room_code: Option<RoomCode>,
        #[serde(default)]
        session_token: Option<SessionToken>,
    },

    /// Start the game: deal a secret number to every member.
    Start { room_code: RoomCode },

    /// Return the room to the lobby, clearing secrets and the prompt.
    Reset { room_code: RoomCode },

    /// Ask the prompt provider for a fresh discussion category.
    RequestPrompt {
        room_code: RoomCode,
        mode: PromptMode,
    },

    /// Leave the room for good (distinct from a transport drop).
    Leave { room_code: RoomCode },
}

// ---------------------------------------------------------------------------
// Server events
// ---------------------------------------------------------------------------

/// An event pushed from the server to one or more clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Private: "here is (or here is again) your session token."
    /// Sent to the joining client only, so it can persist the token
    /// for reconnection.
    SessionSet { session_token: SessionToken },

    /// Room-wide: full membership and phase snapshot.
    ///
    /// `prompt` carries the room's current prompt (null after a reset),
    /// so reconnecting clients resynchronize without a separate fetch.
    RoomUpdate {
        room_code: RoomCode,
        members: Vec<MemberRecord>,
        #[serde(rename = "state")]
        phase: RoomPhase,
        prompt: Option<String>,
    },

    /// Private: the recipient's own secret number. Never contains
    /// another member's value.
    SecretDealt { value: u8 },

    /// Room-wide: a freshly generated discussion prompt.
    PromptReady { prompt: String },

    /// Private: something went wrong with the recipient's request.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests for protocol types and their JSON shapes.
    //!
    //! Clients are written against the exact JSON produced here, so these
    //! tests pin the serde attributes: tag names, camelCase fields, and
    //! the transparent identity newtypes.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_session_token_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionToken("abc123".into())).unwrap();
        assert_eq!(json, "\"abc123\"");
    }

    #[test]
    fn test_session_token_display_truncates() {
        // Full tokens must not leak into logs.
        let token = SessionToken("0123456789abcdef0123456789abcdef".into());
        assert_eq!(token.to_string(), "s-01234567");
    }

    #[test]
    fn test_room_code_new_uppercases() {
        assert_eq!(RoomCode::new("ab12"), RoomCode::new("AB12"));
        assert_eq!(RoomCode::new("ab12").as_str(), "AB12");
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::new("AB12")).unwrap();
        assert_eq!(json, "\"AB12\"");
    }

    // =====================================================================
    // RoomPhase / PromptMode wire names
    // =====================================================================

    #[test]
    fn test_room_phase_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&RoomPhase::Lobby).unwrap(), "\"LOBBY\"");
        assert_eq!(
            serde_json::to_string(&RoomPhase::Playing).unwrap(),
            "\"PLAYING\""
        );
    }

    #[test]
    fn test_room_phase_is_playing() {
        assert!(!RoomPhase::Lobby.is_playing());
        assert!(RoomPhase::Playing.is_playing());
    }

    #[test]
    fn test_prompt_mode_round_trip() {
        let mode: PromptMode = serde_json::from_str("\"NSFW\"").unwrap();
        assert_eq!(mode, PromptMode::Nsfw);
        assert_eq!(serde_json::to_string(&PromptMode::Safe).unwrap(), "\"SAFE\"");
    }

    // =====================================================================
    // MemberRecord
    // =====================================================================

    #[test]
    fn test_member_record_uses_camel_case_fields() {
        let member = MemberRecord {
            session_token: SessionToken("tok".into()),
            name: "Alice".into(),
            is_host: true,
            color: Color("#FF6B6B".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&member).unwrap();

        assert_eq!(json["sessionToken"], "tok");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["isHost"], true);
        assert_eq!(json["color"], "#FF6B6B");
    }

    // =====================================================================
    // ClientIntent — wire shape per variant
    // =====================================================================

    #[test]
    fn test_intent_join_json_format() {
        let intent = ClientIntent::Join {
            name: "Alice".into(),
            room_code: Some(RoomCode::new("AB12")),
            session_token: None,
        };
        let json: serde_json::Value = serde_json::to_value(&intent).unwrap();

        assert_eq!(json["type"], "join");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["roomCode"], "AB12");
        assert!(json["sessionToken"].is_null());
    }

    #[test]
    fn test_intent_join_optionals_default_when_missing() {
        // A fresh client sends only its name.
        let intent: ClientIntent =
            serde_json::from_str(r#"{"type": "join", "name": "Bob"}"#).unwrap();
        assert_eq!(
            intent,
            ClientIntent::Join {
                name: "Bob".into(),
                room_code: None,
                session_token: None,
            }
        );
    }

    #[test]
    fn test_intent_start_round_trip() {
        let intent = ClientIntent::Start {
            room_code: RoomCode::new("ZZ99"),
        };
        let bytes = serde_json::to_vec(&intent).unwrap();
        let decoded: ClientIntent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(intent, decoded);
    }

    #[test]
    fn test_intent_request_prompt_json_format() {
        let intent = ClientIntent::RequestPrompt {
            room_code: RoomCode::new("AB12"),
            mode: PromptMode::Safe,
        };
        let json: serde_json::Value = serde_json::to_value(&intent).unwrap();

        assert_eq!(json["type"], "request_prompt");
        assert_eq!(json["roomCode"], "AB12");
        assert_eq!(json["mode"], "SAFE");
    }

    #[test]
    fn test_intent_leave_round_trip() {
        let intent = ClientIntent::Leave {
            room_code: RoomCode::new("AB12"),
        };
        let bytes = serde_json::to_vec(&intent).unwrap();
        let decoded: ClientIntent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(intent, decoded);
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_event_session_set_json_format() {
        let event = ServerEvent::SessionSet {
            session_token: SessionToken("tok".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "session_set");
        assert_eq!(json["sessionToken"], "tok");
    }

    #[test]
    fn test_event_room_update_phase_serializes_as_state() {
        // Clients read the phase from a field named "state".
        let event = ServerEvent::RoomUpdate {
            room_code: RoomCode::new("AB12"),
            members: vec![],
            phase: RoomPhase::Playing,
            prompt: None,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "room_update");
        assert_eq!(json["state"], "PLAYING");
        assert!(json["prompt"].is_null());
    }

    #[test]
    fn test_event_secret_dealt_round_trip() {
        let event = ServerEvent::SecretDealt { value: 42 };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_event_prompt_ready_round_trip() {
        let event = ServerEvent::PromptReady {
            prompt: "Worst to best superpowers".into(),
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_event_error_json_format() {
        let event = ServerEvent::Error {
            message: "prompt generation failed".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "prompt generation failed");
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientIntent, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_intent_type_returns_error() {
        let unknown = r#"{"type": "teleport", "roomCode": "AB12"}"#;
        let result: Result<ClientIntent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_required_field_returns_error() {
        // `start` without a room code has nothing to act on.
        let wrong = r#"{"type": "start"}"#;
        let result: Result<ClientIntent, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
