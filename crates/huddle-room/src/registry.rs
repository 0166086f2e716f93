//! The room registry: all active rooms, keyed by their short code.
//!
//! # Concurrency note
//!
//! Like the session registry, this is a plain `HashMap` owned by the
//! coordinator task. No interior locking.

use std::collections::HashMap;

use huddle_protocol::{RoomCode, SessionToken};
use rand::Rng;

use crate::Room;

/// Alphabet for generated room codes. Uppercase letters and digits only,
/// so codes are easy to read aloud and retype.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 4;

/// All active rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Resolves a join to a room code, creating the room if needed.
    ///
    /// - `Some(code)`: that room is used. If no room exists under the
    ///   code, one is created with `founder` as host — joining an
    ///   unknown code founds a room rather than failing, so a typo'd
    ///   code quietly becomes a new empty room.
    /// - `None`: a fresh room is created under a newly generated
    ///   4-character code, retrying on the (rare) collision.
    pub fn get_or_create<R: Rng + ?Sized>(
        &mut self,
        code: Option<RoomCode>,
        founder: &SessionToken,
        rng: &mut R,
    ) -> RoomCode {
        let code = match code {
            Some(code) => code,
            None => self.generate_code(rng),
        };
        self.rooms.entry(code.clone()).or_insert_with(|| {
            tracing::info!(room = %code, host = %founder, "room created");
            Room::new(code.clone(), founder.clone(), rng)
        });
        code
    }

    /// Looks up a room.
    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Looks up a room mutably.
    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Removes a room. Its code becomes available again.
    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        let removed = self.rooms.remove(code);
        if removed.is_some() {
            tracing::info!(room = %code, "room reclaimed");
        }
        removed
    }

    /// Iterates over all rooms.
    pub fn iter(&self) -> impl Iterator<Item = (&RoomCode, &Room)> {
        self.rooms.iter()
    }

    /// Returns the number of active rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Generates a room code not currently in use.
    ///
    /// With 36^4 possible codes, collisions only matter under absurd
    /// load, but the loop makes the guarantee unconditional.
    fn generate_code<R: Rng + ?Sized>(&self, rng: &mut R) -> RoomCode {
        loop {
            let raw: String = (0..CODE_LEN)
                .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
                .collect();
            let code = RoomCode::new(raw);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
