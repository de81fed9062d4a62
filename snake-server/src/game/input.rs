//! Input Mapping and Recording
//!
//! Maps raw key symbols to game commands, enforces the one-turn-per-tick
//! rule, and records accepted turns so a game can be replayed.

use serde::{Serialize, Deserialize};
use crate::core::grid::Direction;

// =============================================================================
// KEY MAPPING
// =============================================================================

/// A command decoded from a raw key symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputCommand {
    /// Request a new heading
    Turn(Direction),
    /// Start from idle, or restart after game over
    Start,
}

impl InputCommand {
    /// Decode a raw key symbol.
    ///
    /// Arrow keys and WASD (either case) map to the four headings,
    /// `Enter` maps to [`InputCommand::Start`]. Anything else is `None`.
    pub fn from_key(symbol: &str) -> Option<Self> {
        let command = match symbol {
            "ArrowUp" | "w" | "W" => InputCommand::Turn(Direction::Up),
            "ArrowDown" | "s" | "S" => InputCommand::Turn(Direction::Down),
            "ArrowLeft" | "a" | "A" => InputCommand::Turn(Direction::Left),
            "ArrowRight" | "d" | "D" => InputCommand::Turn(Direction::Right),
            "Enter" => InputCommand::Start,
            _ => return None,
        };
        Some(command)
    }
}

/// Decode a raw key symbol into a heading, ignoring non-direction keys.
#[inline]
pub fn direction_from_key(symbol: &str) -> Option<Direction> {
    match InputCommand::from_key(symbol)? {
        InputCommand::Turn(direction) => Some(direction),
        InputCommand::Start => None,
    }
}

// =============================================================================
// DIRECTION LATCH
// =============================================================================

/// Outcome of a turn request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Heading changed
    Accepted(Direction),
    /// Requested heading equals the current one
    Unchanged,
    /// Requested heading points straight back
    Reversal,
    /// A turn was already accepted this tick
    AlreadyTurned,
    /// No game is running
    Inactive,
}

impl TurnOutcome {
    /// Check if the heading changed.
    #[inline]
    pub fn is_accepted(self) -> bool {
        matches!(self, TurnOutcome::Accepted(_))
    }
}

/// One-turn-per-tick guard.
///
/// `Open` at the start of every tick; the first accepted turn commits it
/// until the next tick reopens it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionLatch {
    /// No turn taken this tick
    #[default]
    Open,
    /// A turn to the contained heading was taken this tick
    Committed(Direction),
}

impl DirectionLatch {
    /// Try to turn from `current` to `requested`.
    pub fn request(&mut self, current: Direction, requested: Direction) -> TurnOutcome {
        if let DirectionLatch::Committed(_) = self {
            return TurnOutcome::AlreadyTurned;
        }
        if requested == current {
            return TurnOutcome::Unchanged;
        }
        if current.is_opposite(requested) {
            return TurnOutcome::Reversal;
        }
        *self = DirectionLatch::Committed(requested);
        TurnOutcome::Accepted(requested)
    }

    /// Reopen for the next tick.
    #[inline]
    pub fn reopen(&mut self) {
        *self = DirectionLatch::Open;
    }

    /// Check if a turn was taken this tick.
    #[inline]
    pub fn is_committed(&self) -> bool {
        matches!(self, DirectionLatch::Committed(_))
    }
}

// =============================================================================
// RECORDING
// =============================================================================

/// An accepted turn, stamped with the number of ticks completed before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Ticks completed when the turn was accepted
    pub tick: u32,
    /// New heading
    pub direction: Direction,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: u32, direction: Direction) -> Self {
        Self { tick, direction }
    }
}

/// All accepted turns of one game, in order.
///
/// Together with the RNG seed this fully determines the game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    /// Seed the game was started with
    pub rng_seed: u64,
    /// Accepted turns, ordered by tick
    pub deltas: Vec<InputDelta>,
}

impl InputRecording {
    /// Create an empty recording for a seed.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            deltas: Vec::new(),
        }
    }

    /// Append an accepted turn.
    pub fn record(&mut self, tick: u32, direction: Direction) {
        debug_assert!(
            self.deltas.last().map_or(true, |d| d.tick < tick),
            "at most one turn per tick"
        );
        self.deltas.push(InputDelta::new(tick, direction));
    }

    /// The turn accepted after `tick` completed ticks, if any.
    pub fn turn_at(&self, tick: u32) -> Option<Direction> {
        self.deltas
            .binary_search_by_key(&tick, |d| d.tick)
            .ok()
            .map(|idx| self.deltas[idx].direction)
    }

    /// Number of recorded turns.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Check if no turns were recorded.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Serialize to compact binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from compact binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(InputCommand::from_key("ArrowUp"), Some(InputCommand::Turn(Direction::Up)));
        assert_eq!(InputCommand::from_key("w"), Some(InputCommand::Turn(Direction::Up)));
        assert_eq!(InputCommand::from_key("S"), Some(InputCommand::Turn(Direction::Down)));
        assert_eq!(InputCommand::from_key("a"), Some(InputCommand::Turn(Direction::Left)));
        assert_eq!(InputCommand::from_key("ArrowRight"), Some(InputCommand::Turn(Direction::Right)));
        assert_eq!(InputCommand::from_key("Enter"), Some(InputCommand::Start));
        assert_eq!(InputCommand::from_key("x"), None);
        assert_eq!(InputCommand::from_key(""), None);
        assert_eq!(direction_from_key("Enter"), None);
        assert_eq!(direction_from_key("D"), Some(Direction::Right));
    }

    #[test]
    fn test_latch_accepts_one_turn_per_tick() {
        let mut latch = DirectionLatch::Open;

        assert_eq!(latch.request(Direction::Right, Direction::Up), TurnOutcome::Accepted(Direction::Up));
        assert!(latch.is_committed());

        // Second turn in the same tick is refused, even a legal one
        assert_eq!(latch.request(Direction::Up, Direction::Left), TurnOutcome::AlreadyTurned);

        latch.reopen();
        assert_eq!(latch.request(Direction::Up, Direction::Left), TurnOutcome::Accepted(Direction::Left));
    }

    #[test]
    fn test_latch_rejects_reversal_without_committing() {
        let mut latch = DirectionLatch::Open;

        assert_eq!(latch.request(Direction::Right, Direction::Left), TurnOutcome::Reversal);
        assert_eq!(latch, DirectionLatch::Open);

        assert_eq!(latch.request(Direction::Right, Direction::Right), TurnOutcome::Unchanged);
        assert_eq!(latch, DirectionLatch::Open);

        assert_eq!(latch.request(Direction::Right, Direction::Down), TurnOutcome::Accepted(Direction::Down));
    }

    #[test]
    fn test_recording_lookup() {
        let mut recording = InputRecording::new(7);
        recording.record(0, Direction::Up);
        recording.record(5, Direction::Left);

        assert_eq!(recording.turn_at(0), Some(Direction::Up));
        assert_eq!(recording.turn_at(3), None);
        assert_eq!(recording.turn_at(5), Some(Direction::Left));
        assert_eq!(recording.len(), 2);
    }

    #[test]
    fn test_recording_binary_form() {
        let mut recording = InputRecording::new(99);
        recording.record(2, Direction::Down);
        recording.record(9, Direction::Right);

        let bytes = recording.to_bytes().unwrap();
        let restored = InputRecording::from_bytes(&bytes).unwrap();
        assert_eq!(restored, recording);
    }
}
