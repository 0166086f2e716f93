//! The session registry: every participant the server knows about.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — it uses a plain
//! `HashMap`, not a concurrent one. This is intentional: the registry is
//! owned by the single coordinator task and mutated only from there, so
//! locking here would be pure overhead.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use huddle_protocol::{Color, RoomCode, SessionToken};
use rand::Rng;

use crate::Session;

/// Maps session tokens to participant records.
///
/// Every operation is infallible: lookups for unknown tokens either
/// create a session ([`resolve`](Self::resolve)) or quietly do nothing
/// (the mutators). Errors are not part of this layer's contract.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionToken, Session>,
}

impl SessionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Resolves a token to a session, creating one if needed.
    ///
    /// - No token, or a token the server has never issued (or already
    ///   reclaimed): a fresh session is created under a newly generated
    ///   token, with `name` as its display name.
    /// - A known token: the existing session is returned with its
    ///   activity stamp refreshed. The supplied `name` is ignored —
    ///   display names are fixed at first contact.
    pub fn resolve(&mut self, token: Option<&SessionToken>, name: &str) -> &Session {
        if let Some(token) = token {
            if self.sessions.contains_key(token) {
                let session = self
                    .sessions
                    .get_mut(token)
                    .expect("checked contains_key above");
                session.last_seen = Instant::now();
                tracing::debug!(token = %session.token, "session resolved");
                return session;
            }
        }

        let token = generate_token();
        tracing::info!(%token, name, "session created");
        self.sessions
            .entry(token.clone())
            .or_insert_with(|| Session::new(token, name.to_string()))
    }

    /// Looks up a session without creating one.
    pub fn get(&self, token: &SessionToken) -> Option<&Session> {
        self.sessions.get(token)
    }

    /// Sets or clears a session's secret number. Unknown tokens are
    /// ignored.
    pub fn set_secret(&mut self, token: &SessionToken, value: Option<u8>) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.secret = value;
        }
    }

    /// Assigns a color only if the session doesn't have one yet.
    ///
    /// Idempotent: once colored, later calls keep the original color.
    /// Returns the session's effective color, or `None` for unknown
    /// tokens.
    pub fn set_color_if_unset(&mut self, token: &SessionToken, color: Color) -> Option<Color> {
        let session = self.sessions.get_mut(token)?;
        if session.color.is_none() {
            session.color = Some(color);
        }
        session.color.clone()
    }

    /// Records which room a session belongs to.
    pub fn attach_to_room(&mut self, token: &SessionToken, code: RoomCode) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.room = Some(code);
        }
    }

    /// Severs a session's room association.
    ///
    /// Used on explicit leave: the room, color, and secret are all
    /// cleared so a later rejoin with the same token starts fresh.
    pub fn detach_from_room(&mut self, token: &SessionToken) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.room = None;
            session.color = None;
            session.secret = None;
        }
    }

    /// Refreshes a session's activity stamp.
    pub fn touch(&mut self, token: &SessionToken) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.last_seen = Instant::now();
        }
    }

    /// Returns tokens of sessions that belong to no room and have been
    /// inactive for longer than `ttl`.
    ///
    /// The caller decides which of these are actually reclaimable (a
    /// session with a live transport binding should survive even if it
    /// hasn't sent an intent in a while).
    pub fn roomless_stale(&self, ttl: Duration) -> Vec<SessionToken> {
        self.sessions
            .values()
            .filter(|s| s.room.is_none() && s.last_seen.elapsed() > ttl)
            .map(|s| s.token.clone())
            .collect()
    }

    /// Removes a session entirely. Its token becomes invalid.
    pub fn remove(&mut self, token: &SessionToken) {
        if self.sessions.remove(token).is_some() {
            tracing::info!(%token, "session reclaimed");
        }
    }

    /// Returns the number of known sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions exist.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Generates a random 32-character hex token (128 bits of entropy).
///
/// Tokens double as reconnect credentials, so 128 bits keeps guessing a
/// live token computationally infeasible.
fn generate_token() -> SessionToken {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    SessionToken(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionRegistry`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! Time-dependent behavior (staleness) is tested with a zero TTL
    //! (everything inactive is immediately stale) or a one-hour TTL
    //! (nothing goes stale during the test) — no sleeps, no flakiness.

    use super::*;

    fn color(hex: &str) -> Color {
        Color(hex.to_string())
    }

    // =====================================================================
    // resolve()
    // =====================================================================

    #[test]
    fn test_resolve_without_token_creates_session() {
        let mut reg = SessionRegistry::new();

        let session = reg.resolve(None, "Alice");

        assert_eq!(session.display_name, "Alice");
        assert_eq!(session.token.as_str().len(), 32);
        assert!(session.color.is_none());
        assert!(session.secret.is_none());
        assert!(session.room.is_none());
    }

    #[test]
    fn test_resolve_known_token_returns_same_session() {
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        let session = reg.resolve(Some(&token), "Alice");

        assert_eq!(session.token, token);
        assert_eq!(reg.len(), 1, "no duplicate session should be created");
    }

    #[test]
    fn test_resolve_known_token_ignores_new_name() {
        // Display names are fixed at first contact.
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        let session = reg.resolve(Some(&token), "Definitely Not Alice");

        assert_eq!(session.display_name, "Alice");
    }

    #[test]
    fn test_resolve_unknown_token_creates_fresh_session() {
        // A token the server never issued (or already reclaimed) gets a
        // brand-new session under a brand-new token.
        let mut reg = SessionRegistry::new();
        let stale = SessionToken("00000000000000000000000000000000".into());

        let session = reg.resolve(Some(&stale), "Bob");

        assert_ne!(session.token, stale);
        assert_eq!(session.display_name, "Bob");
    }

    #[test]
    fn test_resolve_generates_unique_tokens() {
        let mut reg = SessionRegistry::new();
        let t1 = reg.resolve(None, "Alice").token.clone();
        let t2 = reg.resolve(None, "Bob").token.clone();
        assert_ne!(t1, t2);
    }

    // =====================================================================
    // set_secret() / set_color_if_unset()
    // =====================================================================

    #[test]
    fn test_set_secret_sets_and_clears() {
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        reg.set_secret(&token, Some(42));
        assert_eq!(reg.get(&token).unwrap().secret, Some(42));

        reg.set_secret(&token, None);
        assert_eq!(reg.get(&token).unwrap().secret, None);
    }

    #[test]
    fn test_set_secret_unknown_token_is_noop() {
        let mut reg = SessionRegistry::new();
        reg.set_secret(&SessionToken("nope".into()), Some(1));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_set_color_if_unset_assigns_first_color() {
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        let assigned = reg.set_color_if_unset(&token, color("#FF6B6B"));

        assert_eq!(assigned, Some(color("#FF6B6B")));
    }

    #[test]
    fn test_set_color_if_unset_is_idempotent() {
        // A second assignment must not recolor the session.
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        reg.set_color_if_unset(&token, color("#FF6B6B"));
        let second = reg.set_color_if_unset(&token, color("#4ECDC4"));

        assert_eq!(second, Some(color("#FF6B6B")));
    }

    #[test]
    fn test_set_color_if_unset_unknown_token_returns_none() {
        let mut reg = SessionRegistry::new();
        let result = reg.set_color_if_unset(&SessionToken("nope".into()), color("#FF6B6B"));
        assert_eq!(result, None);
    }

    // =====================================================================
    // attach_to_room() / detach_from_room()
    // =====================================================================

    #[test]
    fn test_attach_records_room() {
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        reg.attach_to_room(&token, RoomCode::new("AB12"));

        assert_eq!(
            reg.get(&token).unwrap().room,
            Some(RoomCode::new("AB12"))
        );
    }

    #[test]
    fn test_detach_clears_room_color_and_secret() {
        // Leaving is a fresh start: the next join behaves like a new
        // member (new color from the pool, no stale secret).
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();
        reg.attach_to_room(&token, RoomCode::new("AB12"));
        reg.set_color_if_unset(&token, color("#FF6B6B"));
        reg.set_secret(&token, Some(7));

        reg.detach_from_room(&token);

        let session = reg.get(&token).unwrap();
        assert!(session.room.is_none());
        assert!(session.color.is_none());
        assert!(session.secret.is_none());
    }

    #[test]
    fn test_detach_preserves_identity() {
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();
        reg.attach_to_room(&token, RoomCode::new("AB12"));

        reg.detach_from_room(&token);

        let session = reg.get(&token).unwrap();
        assert_eq!(session.token, token);
        assert_eq!(session.display_name, "Alice");
    }

    // =====================================================================
    // roomless_stale() / remove()
    // =====================================================================

    #[test]
    fn test_roomless_stale_skips_members_of_rooms() {
        let mut reg = SessionRegistry::new();
        let in_room = reg.resolve(None, "Alice").token.clone();
        let drifting = reg.resolve(None, "Bob").token.clone();
        reg.attach_to_room(&in_room, RoomCode::new("AB12"));

        let stale = reg.roomless_stale(Duration::ZERO);

        assert_eq!(stale, vec![drifting]);
    }

    #[test]
    fn test_roomless_stale_skips_recently_active() {
        let mut reg = SessionRegistry::new();
        reg.resolve(None, "Alice");

        let stale = reg.roomless_stale(Duration::from_secs(3600));

        assert!(stale.is_empty());
    }

    #[test]
    fn test_remove_invalidates_token() {
        let mut reg = SessionRegistry::new();
        let token = reg.resolve(None, "Alice").token.clone();

        reg.remove(&token);

        assert!(reg.get(&token).is_none());
        assert!(reg.is_empty());

        // Resolving the reclaimed token starts over with a new identity.
        let session = reg.resolve(Some(&token), "Alice");
        assert_ne!(session.token, token);
    }
}
