//! # Snake Engine
//!
//! Grid Snake with a deterministic core and a cancellable tick driver.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SNAKE ENGINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── grid.rs     - Cell coordinates and headings             │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Key mapping and direction latch           │
//! │  ├── state.rs    - Snake, food, score, run state             │
//! │  ├── tick.rs     - Simulation step and replay                │
//! │  ├── collision.rs- Wall and self collision                   │
//! │  ├── food.rs     - Food placement                            │
//! │  └── events.rs   - Game events                               │
//! │                                                              │
//! │  engine.rs       - Lifecycle, scheduling, high score         │
//! │  session.rs      - Async tick driver (tokio)                 │
//! │  render.rs       - Frame sinks                               │
//! │  storage.rs      - High score persistence                    │
//! │  config.rs       - Game and session configuration            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - No floating-point arithmetic
//! - No HashMap (uses BTreeSet for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! A game's seed plus its recorded turns reproduce it exactly, down to
//! the state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod config;
pub mod engine;
pub mod render;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use self::core::grid::{Direction, GridPos};
pub use self::core::rng::DeterministicRng;
pub use config::{ConfigError, GameConfig, SessionConfig};
pub use engine::{GameEngine, ScheduledTick};
pub use game::events::{GameEvent, GameEventData};
pub use game::state::{GameState, RunState};
pub use render::{FanoutSink, Frame, RenderSink};
pub use session::{GameSession, SessionHandle};
pub use storage::{HighScoreStore, JsonFileStore, MemoryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
