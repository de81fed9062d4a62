//! Game Events
//!
//! Notifications emitted by the simulation and the engine, in the order
//! they happened. The surrounding UI renders score text and overlay
//! visibility from these.

use serde::{Serialize, Deserialize};
use crate::core::grid::GridPos;
use crate::game::collision::Collision;

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Head hit a wall or the body
    Collision {
        /// What was hit
        kind: Collision,
        /// Cell the head tried to enter
        head: GridPos,
    },
    /// Snake covers the whole board, no cell left for food
    BoardFilled,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A new game began
    GameStarted {
        /// Seed of this game
        rng_seed: u64,
        /// Best score known when the game began
        high_score: u32,
    },

    /// Current score changed
    ScoreChanged {
        score: u32,
    },

    /// A new best score was set and persisted
    HighScoreChanged {
        high_score: u32,
    },

    /// Head reached the food
    FoodEaten {
        position: GridPos,
        new_length: u32,
        speed_ms: u64,
    },

    /// The game ended
    GameOver {
        final_score: u32,
        reason: GameOverReason,
    },

    /// The game was stopped from outside
    GameStopped,
}

/// A game event stamped with the tick it occurred on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Ticks completed when the event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create game started event.
    pub fn game_started(tick: u32, rng_seed: u64, high_score: u32) -> Self {
        Self::new(tick, GameEventData::GameStarted { rng_seed, high_score })
    }

    /// Create score changed event.
    pub fn score_changed(tick: u32, score: u32) -> Self {
        Self::new(tick, GameEventData::ScoreChanged { score })
    }

    /// Create high score changed event.
    pub fn high_score_changed(tick: u32, high_score: u32) -> Self {
        Self::new(tick, GameEventData::HighScoreChanged { high_score })
    }

    /// Create food eaten event.
    pub fn food_eaten(tick: u32, position: GridPos, new_length: u32, speed_ms: u64) -> Self {
        Self::new(
            tick,
            GameEventData::FoodEaten {
                position,
                new_length,
                speed_ms,
            },
        )
    }

    /// Create game over event.
    pub fn game_over(tick: u32, final_score: u32, reason: GameOverReason) -> Self {
        Self::new(tick, GameEventData::GameOver { final_score, reason })
    }

    /// Create game stopped event.
    pub fn game_stopped(tick: u32) -> Self {
        Self::new(tick, GameEventData::GameStopped)
    }

    /// Check if this event ends the game.
    pub fn is_game_over(&self) -> bool {
        matches!(self.data, GameEventData::GameOver { .. })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_over_detection() {
        let over = GameEvent::game_over(
            12,
            40,
            GameOverReason::Collision { kind: Collision::Wall, head: GridPos::new(-1, 5) },
        );
        assert!(over.is_game_over());
        assert!(!GameEvent::score_changed(3, 10).is_game_over());
    }

    #[test]
    fn test_json_shape() {
        let json = GameEvent::score_changed(3, 10).to_json().unwrap();
        assert!(json.contains("\"tick\":3"));
        assert!(json.contains("ScoreChanged"));
        assert!(json.contains("\"score\":10"));
    }
}
