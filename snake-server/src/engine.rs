//! Game Engine
//!
//! Owns one game: the simulation state, the high score and its store, the
//! render sink, and the single pending tick. Everything is synchronous;
//! a driver (see [`crate::session`]) reads [`GameEngine::pending_tick`],
//! waits out the delay and calls [`GameEngine::fire`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, GameConfig};
use crate::core::grid::{Direction, GridPos};
use crate::core::rng::derive_game_seed;
use crate::game::events::{GameEvent, GameEventData, GameOverReason};
use crate::game::input::{direction_from_key, InputCommand, InputRecording, TurnOutcome};
use crate::game::state::{GameState, RunState};
use crate::game::tick::{tick, TickResult};
use crate::render::{Frame, RenderSink};
use crate::storage::HighScoreStore;

/// Handle of the one tick that may be pending.
///
/// A driver must present the generation back to [`GameEngine::fire`];
/// ticks from a cancelled or superseded schedule are refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTick {
    /// Schedule counter at the time this tick was armed
    pub generation: u64,
    /// Wait before firing
    pub delay: Duration,
}

/// One Snake game with persistence and rendering attached.
pub struct GameEngine {
    id: Uuid,
    config: GameConfig,
    state: GameState,
    high_score: u32,
    store: Box<dyn HighScoreStore>,
    sink: Box<dyn RenderSink>,
    pending: Option<ScheduledTick>,
    generation: u64,
}

impl GameEngine {
    /// Create an idle engine.
    ///
    /// Loads the high score (any read failure counts as 0) and draws the
    /// idle board once.
    pub fn new(
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
        sink: Box<dyn RenderSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let high_score = match store.load() {
            Ok(score) => score.unwrap_or(0),
            Err(e) => {
                warn!("Could not read high score, starting from 0: {}", e);
                0
            }
        };

        let id = Uuid::new_v4();
        let seed = config.rng_seed.unwrap_or(0);
        let state = GameState::new(&config, seed);

        let mut engine = Self {
            id,
            config,
            state,
            high_score,
            store,
            sink,
            pending: None,
            generation: 0,
        };
        engine.draw();

        debug!("Engine {} ready, high score {}", engine.id, engine.high_score);
        Ok(engine)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Start a new game. No-op (returns `false`) while one is running.
    pub fn start(&mut self) -> bool {
        if self.state.phase == RunState::Running {
            return false;
        }

        self.cancel_pending();

        let seed = self.next_seed();
        self.state.begin(&self.config, seed, self.high_score);
        info!("Game started (engine {}, seed {})", self.id, seed);

        self.draw();
        self.schedule();
        true
    }

    /// Start again after a game over. No-op in any other state.
    pub fn restart(&mut self) -> bool {
        if self.state.phase != RunState::GameOver {
            return false;
        }
        self.start()
    }

    /// Stop the current game and go idle, cancelling the pending tick.
    pub fn stop(&mut self) -> bool {
        if self.state.phase == RunState::Idle {
            return false;
        }

        self.cancel_pending();
        self.state.phase = RunState::Idle;
        let event = GameEvent::game_stopped(self.state.tick);
        self.state.push_event(event);
        info!("Game stopped at tick {} with score {}", self.state.tick, self.state.score);
        true
    }

    /// Handle a raw direction symbol (arrow key or WASD).
    ///
    /// Returns `true` when the heading changed. Unknown symbols, reversals,
    /// a second turn in one tick, and turns outside a running game are
    /// ignored.
    pub fn request_direction_change(&mut self, symbol: &str) -> bool {
        match direction_from_key(symbol) {
            Some(direction) => self.turn(direction).is_accepted(),
            None => false,
        }
    }

    /// Request a heading change.
    pub fn turn(&mut self, direction: Direction) -> TurnOutcome {
        let outcome = self.state.turn(direction);
        if !outcome.is_accepted() {
            debug!("Turn to {:?} refused: {:?}", direction, outcome);
        }
        outcome
    }

    /// Input adapter entry point for any raw key symbol.
    ///
    /// `Enter` starts from idle or restarts after game over; direction
    /// symbols turn the snake. Returns `true` if anything changed.
    pub fn handle_key(&mut self, symbol: &str) -> bool {
        match InputCommand::from_key(symbol) {
            Some(InputCommand::Start) => match self.state.phase {
                RunState::Idle => self.start(),
                RunState::GameOver => self.restart(),
                RunState::Running => false,
            },
            Some(InputCommand::Turn(direction)) => self.turn(direction).is_accepted(),
            None => false,
        }
    }

    /// Advance the game by one cell.
    ///
    /// Consumes the pending tick. On success draws a frame and schedules
    /// the next tick at the current speed; on game over updates the high
    /// score and leaves nothing scheduled.
    pub fn tick(&mut self) -> TickResult {
        if self.state.phase != RunState::Running {
            debug!("Tick ignored in {:?}", self.state.phase);
            return TickResult::default();
        }

        self.pending = None;
        let mut result = tick(&mut self.state, &self.config);

        if let Some(reason) = result.game_over {
            self.finish(reason, &mut result.events);
        }

        if result.moved {
            self.draw();
        }

        if self.state.phase == RunState::Running {
            self.schedule();
        }

        result
    }

    /// Fire a previously scheduled tick.
    ///
    /// Returns `None` if `generation` does not match the pending tick,
    /// i.e. the schedule was cancelled or replaced since it was armed.
    pub fn fire(&mut self, generation: u64) -> Option<TickResult> {
        match self.pending {
            Some(pending) if pending.generation == generation => Some(self.tick()),
            _ => {
                debug!("Stale tick {} ignored", generation);
                None
            }
        }
    }

    /// Take all pending events from non-tick operations.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The tick waiting to fire, if any.
    pub fn pending_tick(&self) -> Option<ScheduledTick> {
        self.pending
    }

    /// Lifecycle phase.
    pub fn run_state(&self) -> RunState {
        self.state.phase
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Best score seen, including persisted ones.
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Current tick interval.
    pub fn speed(&self) -> Duration {
        Duration::from_millis(self.state.speed_ms)
    }

    /// Current heading.
    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    /// Segments, head first.
    pub fn snake(&self) -> Vec<GridPos> {
        self.state.segments()
    }

    /// Current food cell.
    pub fn food(&self) -> Option<GridPos> {
        self.state.food
    }

    /// Accepted turns of the current game.
    pub fn recording(&self) -> &InputRecording {
        &self.state.recording
    }

    /// Full simulation state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable simulation state, for tests that stage specific boards.
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Engine identifier used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Record the high score and log the end of the game.
    ///
    /// A new best is inserted just before the `GameOver` event.
    fn finish(&mut self, reason: GameOverReason, events: &mut Vec<GameEvent>) {
        self.cancel_pending();
        let score = self.state.score;

        if score > self.high_score {
            self.high_score = score;
            if let Err(e) = self.store.save(score) {
                warn!("Could not persist high score {}: {}", score, e);
            }
            info!("New high score: {}", score);

            let at = events
                .iter()
                .position(|e| matches!(e.data, GameEventData::GameOver { .. }))
                .unwrap_or(events.len());
            events.insert(at, GameEvent::high_score_changed(self.state.tick, score));
        }

        info!(
            "Game over at tick {}: score {}, length {}, {:?}",
            self.state.tick,
            score,
            self.state.len(),
            reason
        );
    }

    fn schedule(&mut self) {
        self.generation += 1;
        self.pending = Some(ScheduledTick {
            generation: self.generation,
            delay: Duration::from_millis(self.state.speed_ms),
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Cancelled pending tick {}", pending.generation);
        }
    }

    fn draw(&mut self) {
        let frame = Frame {
            snake: self.state.segments(),
            food: self.state.food,
            cell_size: self.config.cell_size,
            board_size: self.config.cells_per_side,
        };
        self.sink.draw_frame(&frame);
    }

    fn next_seed(&self) -> u64 {
        if let Some(seed) = self.config.rng_seed {
            return seed;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        derive_game_seed(self.id.as_bytes(), nanos)
    }
}
