//! A single room: members, phase, color pool, current prompt.

use std::time::Instant;

use huddle_protocol::{Color, MemberRecord, RoomCode, RoomPhase, ServerEvent, SessionToken};
use rand::Rng;

use crate::assign;

/// One active room.
///
/// Rooms are plain data: all mutation happens inside the coordinator
/// task, so there is no locking here. Members are kept in join order;
/// that order is what clients render and what the deal follows.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    /// Members in join order.
    pub(crate) members: Vec<MemberRecord>,
    pub(crate) phase: RoomPhase,
    /// The founding member. Host status never transfers, even if this
    /// session leaves the room.
    pub(crate) host: SessionToken,
    /// Remaining palette colors, popped from the back as members join.
    color_pool: Vec<Color>,
    /// The current discussion prompt, if one has been generated since
    /// the last reset.
    pub(crate) prompt: Option<String>,
    /// Stamp of the last intent that touched this room. Drives idle
    /// reclamation.
    pub(crate) last_activity: Instant,
}

impl Room {
    /// Creates an empty room founded by `host`.
    ///
    /// The color pool is shuffled once here; the pop order is fixed for
    /// the room's lifetime.
    pub fn new<R: Rng + ?Sized>(code: RoomCode, host: SessionToken, rng: &mut R) -> Self {
        Self {
            code,
            members: Vec::new(),
            phase: RoomPhase::Lobby,
            host,
            color_pool: assign::shuffled_palette(rng),
            prompt: None,
            last_activity: Instant::now(),
        }
    }

    /// Returns the room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Returns `true` if `token` holds a seat in this room.
    pub fn has_member(&self, token: &SessionToken) -> bool {
        self.members.iter().any(|m| &m.session_token == token)
    }

    /// Returns `true` if `token` founded this room.
    pub fn is_host(&self, token: &SessionToken) -> bool {
        &self.host == token
    }

    /// Removes the member with `token`, preserving everyone else's
    /// order. Returns whether a member was actually removed.
    ///
    /// Colors are not returned to the pool; a popped color stays spent
    /// for the room's lifetime.
    pub fn remove_member(&mut self, token: &SessionToken) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.session_token != token);
        self.members.len() < before
    }

    /// Pops the next pool color, or synthesizes a random one when the
    /// palette is exhausted.
    pub fn pop_color<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Color {
        self.color_pool
            .pop()
            .unwrap_or_else(|| assign::fallback_color(rng))
    }

    /// Refreshes the room's activity stamp.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Builds the room-wide snapshot event clients use to render the
    /// member list.
    pub fn snapshot(&self) -> ServerEvent {
        ServerEvent::RoomUpdate {
            room_code: self.code.clone(),
            members: self.members.clone(),
            phase: self.phase,
            prompt: self.prompt.clone(),
        }
    }

    /// Tokens of all current members, for audience resolution.
    pub fn member_tokens(&self) -> impl Iterator<Item = &SessionToken> {
        self.members.iter().map(|m| &m.session_token)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn token(s: &str) -> SessionToken {
        SessionToken(s.to_string())
    }

    fn member(tok: &str, host: bool) -> MemberRecord {
        MemberRecord {
            session_token: token(tok),
            name: tok.to_string(),
            is_host: host,
            color: Color("#FF6B6B".into()),
        }
    }

    fn room() -> Room {
        Room::new(
            RoomCode::new("AB12"),
            token("host"),
            &mut StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_new_room_starts_in_lobby() {
        let room = room();
        assert_eq!(room.phase, RoomPhase::Lobby);
        assert!(room.members.is_empty());
        assert!(room.prompt.is_none());
        assert!(room.is_host(&token("host")));
    }

    #[test]
    fn test_pop_color_exhausts_pool_then_falls_back() {
        let mut room = room();
        let mut rng = StdRng::seed_from_u64(2);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..12 {
            let color = room.pop_color(&mut rng);
            assert!(
                crate::assign::PALETTE.contains(&color.as_str()),
                "first twelve colors come from the palette"
            );
            assert!(seen.insert(color), "pool colors must be distinct");
        }

        // The thirteenth member still gets a color, just not a pool one.
        let extra = room.pop_color(&mut rng);
        assert_eq!(extra.as_str().len(), 7);
        assert!(extra.as_str().starts_with('#'));
    }

    #[test]
    fn test_remove_member_preserves_order_of_rest() {
        let mut room = room();
        room.members.push(member("host", true));
        room.members.push(member("b", false));
        room.members.push(member("c", false));

        assert!(room.remove_member(&token("b")));

        let names: Vec<_> = room.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["host", "c"]);
    }

    #[test]
    fn test_remove_member_unknown_token_returns_false() {
        let mut room = room();
        room.members.push(member("host", true));
        assert!(!room.remove_member(&token("stranger")));
        assert_eq!(room.members.len(), 1);
    }

    #[test]
    fn test_host_status_survives_host_leaving() {
        let mut room = room();
        room.members.push(member("host", true));
        room.members.push(member("b", false));

        room.remove_member(&token("host"));

        // The seat is gone but founding status is not reassigned.
        assert!(room.is_host(&token("host")));
        assert!(!room.is_host(&token("b")));
    }

    #[test]
    fn test_snapshot_carries_phase_and_prompt() {
        let mut room = room();
        room.members.push(member("host", true));
        room.phase = RoomPhase::Playing;
        room.prompt = Some("Scariest animals".into());

        match room.snapshot() {
            ServerEvent::RoomUpdate {
                room_code,
                members,
                phase,
                prompt,
            } => {
                assert_eq!(room_code, RoomCode::new("AB12"));
                assert_eq!(members.len(), 1);
                assert_eq!(phase, RoomPhase::Playing);
                assert_eq!(prompt.as_deref(), Some("Scariest animals"));
            }
            other => panic!("expected RoomUpdate, got {other:?}"),
        }
    }
}
