//! Pure assignment algorithms: color pools and the number deck.
//!
//! Everything here is a function of its inputs and the supplied RNG —
//! no registries, no I/O. The coordinator calls these during join and
//! start transitions; tests call them with a seeded RNG.

use huddle_protocol::Color;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::RoomError;

/// The fixed palette handed out to the first twelve members of a room.
///
/// Pool-allocated colors never collide within a room because each is
/// popped exactly once from a shuffled copy of this list.
pub const PALETTE: [&str; 12] = [
    "#FF6B6B", // red
    "#4ECDC4", // teal
    "#45B7D1", // blue
    "#FFA07A", // light salmon
    "#96CEB4", // green
    "#FFEEAD", // yellow
    "#D4A5A5", // pink
    "#9B59B6", // purple
    "#3498DB", // dark blue
    "#E67E22", // orange
    "#2ECC71", // emerald
    "#F1C40F", // sun
];

/// Largest dealable secret: the deck is `1..=DECK_SIZE`.
pub const DECK_SIZE: usize = 100;

/// Returns a uniformly shuffled copy of the palette.
///
/// Computed once per room at creation; members pop colors off the end.
pub fn shuffled_palette<R: Rng + ?Sized>(rng: &mut R) -> Vec<Color> {
    let mut pool: Vec<Color> = PALETTE.iter().map(|hex| Color(hex.to_string())).collect();
    pool.shuffle(rng);
    pool
}

/// Synthesizes a random `#RRGGBB` color for members past the palette.
///
/// Uniform over the full 24-bit color space. Unlike pool colors, these
/// are NOT collision-checked — a 13th and 14th member could in principle
/// match, which is acceptable for a party game.
pub fn fallback_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color(format!("#{:06X}", rng.random_range(0..0x1000000u32)))
}

/// Deals `count` distinct secrets from a freshly shuffled 1..=100 deck.
///
/// The returned values are in deal order: the first element goes to the
/// first member by join order, and so on.
///
/// # Errors
/// Returns [`RoomError::TooManyMembers`] if `count` exceeds the deck.
pub fn deal<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Vec<u8>, RoomError> {
    if count > DECK_SIZE {
        return Err(RoomError::TooManyMembers(count));
    }
    let mut deck: Vec<u8> = (1..=DECK_SIZE as u8).collect();
    deck.shuffle(rng);
    deck.truncate(count);
    Ok(deck)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Uses a seeded `StdRng` so every assertion about randomized output
    //! is reproducible.

    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    // =====================================================================
    // shuffled_palette()
    // =====================================================================

    #[test]
    fn test_shuffled_palette_is_permutation_of_palette() {
        let pool = shuffled_palette(&mut rng());

        assert_eq!(pool.len(), PALETTE.len());
        let pool_set: HashSet<&str> = pool.iter().map(|c| c.as_str()).collect();
        let palette_set: HashSet<&str> = PALETTE.iter().copied().collect();
        assert_eq!(pool_set, palette_set);
    }

    #[test]
    fn test_shuffled_palette_has_no_duplicates() {
        let pool = shuffled_palette(&mut rng());
        let unique: HashSet<_> = pool.iter().collect();
        assert_eq!(unique.len(), pool.len());
    }

    // =====================================================================
    // fallback_color()
    // =====================================================================

    #[test]
    fn test_fallback_color_is_seven_char_hex() {
        let mut r = rng();
        for _ in 0..50 {
            let color = fallback_color(&mut r);
            let s = color.as_str();
            assert_eq!(s.len(), 7, "expected #RRGGBB, got {s}");
            assert!(s.starts_with('#'));
            assert!(
                s[1..].chars().all(|c| c.is_ascii_hexdigit()),
                "non-hex digit in {s}"
            );
        }
    }

    // =====================================================================
    // deal()
    // =====================================================================

    #[test]
    fn test_deal_returns_distinct_values_in_range() {
        let values = deal(10, &mut rng()).expect("10 members fit the deck");

        assert_eq!(values.len(), 10);
        let unique: HashSet<_> = values.iter().collect();
        assert_eq!(unique.len(), 10, "dealt values must be distinct");
        assert!(values.iter().all(|&v| (1..=100).contains(&v)));
    }

    #[test]
    fn test_deal_full_deck_covers_every_value() {
        let values = deal(100, &mut rng()).expect("exactly the deck size");

        let unique: HashSet<_> = values.iter().collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_deal_zero_members_returns_empty() {
        let values = deal(0, &mut rng()).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_deal_over_capacity_is_rejected() {
        let result = deal(101, &mut rng());
        assert!(matches!(result, Err(RoomError::TooManyMembers(101))));
    }
}
