//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Key mapping, direction latch, input recording
//! - `state`: Snake, food, score and run state
//! - `tick`: One simulation step and replay
//! - `collision`: Wall and self-collision checks
//! - `food`: Food placement on free cells
//! - `events`: Game events for observers and replay

pub mod input;
pub mod state;
pub mod tick;
pub mod collision;
pub mod food;
pub mod events;

// Re-export key types
pub use input::{InputCommand, InputDelta, InputRecording, TurnOutcome};
pub use state::{GameState, RunState};
pub use tick::TickResult;
pub use events::{GameEvent, GameEventData, GameOverReason};
