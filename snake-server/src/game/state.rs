//! Game State Definitions
//!
//! Everything the simulation mutates lives in [`GameState`]. Persistence,
//! rendering and timers are layered on top by the engine.

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::core::grid::{Direction, GridPos};
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::events::GameEvent;
use crate::game::food::place_food;
use crate::game::input::{DirectionLatch, InputRecording, TurnOutcome};

// =============================================================================
// RUN STATE
// =============================================================================

/// Lifecycle of a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RunState {
    /// Waiting for a start
    #[default]
    Idle = 0,
    /// Ticking
    Running = 1,
    /// Ended by a collision or a full board
    GameOver = 2,
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Segments from head (index 0) to tail
    pub snake: VecDeque<GridPos>,

    /// Current food cell (`None` before the first start or on a full board)
    pub food: Option<GridPos>,

    /// Current heading
    pub direction: Direction,

    /// One-turn-per-tick guard
    pub latch: DirectionLatch,

    /// Current score
    pub score: u32,

    /// Current tick interval (ms)
    pub speed_ms: u64,

    /// Lifecycle phase
    pub phase: RunState,

    /// Ticks completed since start
    pub tick: u32,

    /// Seed of the current game
    pub rng_seed: u64,

    /// Food placement randomness
    pub rng: DeterministicRng,

    /// Accepted turns of the current game
    pub recording: InputRecording,

    /// Events generated since the last drain
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle state showing the spawn snake.
    pub fn new(config: &GameConfig, rng_seed: u64) -> Self {
        let mut snake = VecDeque::new();
        snake.push_back(config.origin);

        Self {
            snake,
            food: None,
            direction: Direction::Right,
            latch: DirectionLatch::Open,
            score: 0,
            speed_ms: config.initial_speed_ms,
            phase: RunState::Idle,
            tick: 0,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            recording: InputRecording::new(rng_seed),
            events: Vec::new(),
        }
    }

    /// Reset everything and enter `Running`.
    ///
    /// Snake back to a single segment at the origin, score 0, heading
    /// right, initial speed, fresh food. `high_score` is only reported in
    /// the `GameStarted` event.
    pub fn begin(&mut self, config: &GameConfig, rng_seed: u64, high_score: u32) {
        let pending = std::mem::take(&mut self.events);
        *self = Self::new(config, rng_seed);
        self.events = pending;

        self.food = place_food(
            &mut self.rng,
            &self.snake,
            config.cells_per_side,
            config.max_food_attempts,
        );
        self.phase = RunState::Running;

        self.push_event(GameEvent::game_started(self.tick, rng_seed, high_score));
        self.push_event(GameEvent::score_changed(self.tick, self.score));
    }

    /// Request a heading change.
    ///
    /// Only while running; subject to the latch. Accepted turns are
    /// recorded against the current tick count.
    pub fn turn(&mut self, requested: Direction) -> TurnOutcome {
        if self.phase != RunState::Running {
            return TurnOutcome::Inactive;
        }

        let outcome = self.latch.request(self.direction, requested);
        if let TurnOutcome::Accepted(direction) = outcome {
            self.direction = direction;
            self.recording.record(self.tick, direction);
        }
        outcome
    }

    /// Head cell.
    #[inline]
    pub fn head(&self) -> GridPos {
        // Length is never below one
        self.snake[0]
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.snake.len()
    }

    /// Check if the snake is empty (never true for a constructed state).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    /// Check if any segment covers `pos`.
    pub fn occupies(&self, pos: GridPos) -> bool {
        self.snake.contains(&pos)
    }

    /// Check if a game is in progress.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == RunState::Running
    }

    /// Segments as a contiguous list, head first.
    pub fn segments(&self) -> Vec<GridPos> {
        self.snake.iter().copied().collect()
    }

    /// Push an event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Compute deterministic hash of the board.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u8(self.phase as u8);
            hasher.update_u8(self.direction as u8);
            hasher.update_u32(self.score);
            hasher.update_u64(self.speed_ms);
            hasher.update_opt_pos(self.food);
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
            hasher.update_u32(self.snake.len() as u32);
            for segment in &self.snake {
                hasher.update_pos(*segment);
            }
        })
    }
}
