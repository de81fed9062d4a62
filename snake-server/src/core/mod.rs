//! Core deterministic primitives.
//!
//! Grid geometry, seeded randomness and state hashing. Nothing in here
//! touches the clock, the filesystem or a renderer.

pub mod grid;
pub mod rng;
pub mod hash;

// Re-export core types
pub use grid::{GridPos, Direction};
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
