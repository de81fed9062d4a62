//! State Hashing for Verification
//!
//! Deterministic hashing of game state, used to check that a replayed
//! recording reaches exactly the same board as the live game.

use sha2::{Sha256, Digest};
use super::grid::GridPos;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for game state.
///
/// Wraps SHA-256 with helpers for grid types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for game state.
    pub fn for_game_state() -> Self {
        Self::new(b"SNAKE_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a grid position.
    #[inline]
    pub fn update_pos(&mut self, value: GridPos) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Update with an optional grid position.
    ///
    /// A presence byte keeps `None` distinct from any real cell.
    #[inline]
    pub fn update_opt_pos(&mut self, value: Option<GridPos>) {
        match value {
            Some(pos) => {
                self.update_bool(true);
                self.update_pos(pos);
            }
            None => self.update_bool(false),
        }
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for replay verification.
///
/// This function is called by `GameState::compute_hash()`.
/// The closure adds state-specific data after tick and seed.
pub fn compute_state_hash<F>(tick: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_game_state();

    // Always hash tick and seed first
    hasher.update_u32(tick);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_game_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_pos(GridPos::new(3, 4));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_pos(GridPos::new(1, 2));
            h.update_pos(GridPos::new(2, 1));
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_pos(GridPos::new(2, 1));
            h.update_pos(GridPos::new(1, 2));
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_missing_food_differs_from_origin() {
        let none = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_pos(None);
            h.finalize()
        };
        let origin = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_pos(Some(GridPos::ORIGIN));
            h.finalize()
        };
        assert_ne!(none, origin);
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(100, 12345, |hasher| {
            hasher.update_pos(GridPos::new(5, 5));
        });
        let hash2 = compute_state_hash(100, 12345, |hasher| {
            hasher.update_pos(GridPos::new(5, 5));
        });
        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(101, 12345, |hasher| {
            hasher.update_pos(GridPos::new(5, 5));
        });
        assert_ne!(hash, hash3);
    }
}
