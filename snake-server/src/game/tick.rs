//! Simulation Tick
//!
//! One step of the snake. Pure and deterministic: given the same state and
//! configuration it always produces the same result, which is what makes
//! [`replay_game`] work.

use crate::config::GameConfig;
use crate::game::collision::check_collision;
use crate::game::events::{GameEvent, GameOverReason};
use crate::game::food::place_food;
use crate::game::input::InputRecording;
use crate::game::state::{GameState, RunState};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// The snake advanced one cell
    pub moved: bool,
    /// The head landed on the food
    pub ate_food: bool,
    /// Set when the game ended this tick
    pub game_over: Option<GameOverReason>,
}

/// Run one simulation tick.
///
/// A no-op unless the state is `Running`. Order of operations:
///
/// 1. Reopen the direction latch
/// 2. Compute the new head one cell along the heading
/// 3. Check it against the walls and every current segment (the tail
///    has not moved yet); a hit ends the game without moving
/// 4. Prepend the head
/// 5. On food: add points, place new food, speed up; the tail stays
/// 6. Otherwise drop the tail
pub fn tick(state: &mut GameState, config: &GameConfig) -> TickResult {
    let mut result = TickResult::default();

    if state.phase != RunState::Running {
        return result;
    }

    // 0. Advance tick counter
    state.tick += 1;

    // 1. New turn window
    state.latch.reopen();

    // 2. Next head
    let new_head = state.head().step(state.direction);

    // 3. Collision
    if let Some(kind) = check_collision(new_head, &state.snake, config.cells_per_side) {
        end_game(state, GameOverReason::Collision { kind, head: new_head }, &mut result);
        result.events = state.take_events();
        return result;
    }

    // 4. Advance
    state.snake.push_front(new_head);
    result.moved = true;

    if state.food == Some(new_head) {
        // 5. Grow
        result.ate_food = true;
        eat_food(state, config, &mut result);
    } else {
        // 6. Move
        state.snake.pop_back();
    }

    result.events = state.take_events();
    result
}

/// Score, respawn food and speed up after the head reached the food.
fn eat_food(state: &mut GameState, config: &GameConfig, result: &mut TickResult) {
    let eaten_at = state.head();

    state.score = state.score.saturating_add(config.food_points);
    state.push_event(GameEvent::score_changed(state.tick, state.score));

    state.food = place_food(
        &mut state.rng,
        &state.snake,
        config.cells_per_side,
        config.max_food_attempts,
    );
    state.speed_ms = config.next_speed(state.speed_ms);

    state.push_event(GameEvent::food_eaten(
        state.tick,
        eaten_at,
        state.snake.len() as u32,
        state.speed_ms,
    ));

    if state.food.is_none() {
        end_game(state, GameOverReason::BoardFilled, result);
    }
}

/// Enter `GameOver` and emit the final event.
fn end_game(state: &mut GameState, reason: GameOverReason, result: &mut TickResult) {
    state.phase = RunState::GameOver;
    result.game_over = Some(reason);
    state.push_event(GameEvent::game_over(state.tick, state.score, reason));
}

/// Replay a game from its recording.
///
/// Starts a fresh game with the recorded seed and applies each recorded
/// turn before the tick it was accepted in. Stops at game over or after
/// `max_ticks`. Returns the final state and every event. The replayed
/// `GameStarted` reports a high score of 0.
pub fn replay_game(
    config: &GameConfig,
    recording: &InputRecording,
    max_ticks: u32,
) -> (GameState, Vec<GameEvent>) {
    let mut state = GameState::new(config, recording.rng_seed);
    state.begin(config, recording.rng_seed, 0);
    let mut all_events = state.take_events();

    while state.tick < max_ticks {
        if let Some(direction) = recording.turn_at(state.tick) {
            state.turn(direction);
        }

        let result = tick(&mut state, config);
        all_events.extend(result.events);

        if result.game_over.is_some() {
            break;
        }
    }

    (state, all_events)
}
