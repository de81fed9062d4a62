//! Snake Demo Server
//!
//! Runs one game in a tokio session with a greedy autopilot at the keys,
//! then replays the recorded input and checks that the state hashes match.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snake::{
    VERSION,
    config::{GameConfig, SessionConfig},
    core::grid::{Direction, GridPos},
    engine::GameEngine,
    game::{events::GameEventData, input::InputRecording, state::RunState, tick::replay_game},
    render::{FanoutSink, Frame, RenderSink, TextSink, WatchSink},
    session::{wait_for_event, GameSession, SessionCommand},
    storage::JsonFileStore,
};

/// Where the demo keeps its high score.
const HIGH_SCORE_PATH: &str = "snake_high_score.json";

/// Give up on a game that outlives this.
const GAME_TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Snake Server v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => GameConfig::default(),
    };
    info!(
        "Board {}x{}, tick {}ms (min {}ms)",
        config.cells_per_side, config.cells_per_side, config.initial_speed_ms, config.min_speed_ms
    );

    demo_game(config).await
}

/// Play one game with the autopilot and verify its replay.
async fn demo_game(config: GameConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Game ===");

    // Autopilot watches the board; RUST_LOG=debug also prints it
    let (watch_sink, frames) = WatchSink::channel();
    let sinks: Vec<Box<dyn RenderSink>> = vec![Box::new(watch_sink), Box::new(TextSink::new())];
    let sink = FanoutSink::new(sinks);
    let store = JsonFileStore::new(HIGH_SCORE_PATH);
    let engine = GameEngine::new(config.clone(), Box::new(store), Box::new(sink))?;
    info!("Engine {} (high score {})", engine.id(), engine.high_score());

    let handle = GameSession::spawn(engine, SessionConfig::default());
    let mut events = handle.subscribe();
    let pilot = tokio::spawn(autopilot(frames, handle.command_sender()));

    handle.start().await?;

    match tokio::time::timeout(GAME_TIMEOUT, wait_for_event(&mut events, |e| e.is_game_over())).await {
        Ok(event) => {
            if let GameEventData::GameOver { final_score, reason } = event?.data {
                info!("Game over: {:?}, final score {}", reason, final_score);
            }
        }
        Err(_) => warn!("Game still running after {:?}, stopping it", GAME_TIMEOUT),
    }

    let engine = handle.shutdown().await?;
    pilot.abort();

    // Print final results
    info!("=== Game Results ===");
    info!("Score: {}  High score: {}  Length: {}", engine.score(), engine.high_score(), engine.snake().len());
    info!("Ticks: {}", engine.state().tick);

    if engine.run_state() == RunState::GameOver {
        verify_replay(&config, &engine)?;
    } else {
        info!("Skipping replay check for an unfinished game");
    }
    Ok(())
}

/// Replay the recorded turns and compare the final hashes.
fn verify_replay(config: &GameConfig, engine: &GameEngine) -> anyhow::Result<()> {
    info!("=== Verifying Determinism ===");

    // Round-trip through the wire encoding, as a saved replay would
    let bytes = engine.recording().to_bytes()?;
    let recording = InputRecording::from_bytes(&bytes)?;
    info!("Recording: {} turns, {} bytes", recording.len(), bytes.len());

    let live_hash = engine.state().compute_hash();
    let (replayed, replay_events) = replay_game(config, &recording, engine.state().tick);
    let replay_hash = replayed.compute_hash();

    info!("Live State Hash:   {}", hex::encode(live_hash));
    info!("Replay State Hash: {}", hex::encode(replay_hash));
    info!("Replay produced {} events", replay_events.len());

    if live_hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("replay diverged from the live game")
    }
}

// =============================================================================
// AUTOPILOT
// =============================================================================

/// Steer toward the food on every new frame.
async fn autopilot(mut frames: watch::Receiver<Option<Frame>>, commands: mpsc::Sender<SessionCommand>) {
    while frames.changed().await.is_ok() {
        let Some(frame) = frames.borrow_and_update().clone() else {
            continue;
        };
        let Some(direction) = choose_direction(&frame) else {
            continue;
        };
        if commands.send(SessionCommand::Key(key_for(direction).to_string())).await.is_err() {
            break;
        }
    }
}

/// Arrow key for a heading.
fn key_for(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "ArrowUp",
        Direction::Down => "ArrowDown",
        Direction::Left => "ArrowLeft",
        Direction::Right => "ArrowRight",
    }
}

/// Greedy choice: the safe neighbour closest to the food, preferring the
/// current heading on ties. `None` when the current heading is already best
/// or nothing is safe.
fn choose_direction(frame: &Frame) -> Option<Direction> {
    let head = *frame.snake.first()?;
    let heading = frame
        .snake
        .get(1)
        .and_then(|neck| Direction::ALL.into_iter().find(|d| neck.step(*d) == head));
    let body: BTreeSet<GridPos> = frame.snake.iter().copied().collect();
    let target = frame.food.unwrap_or(head);

    let best = Direction::ALL
        .into_iter()
        .filter(|d| heading.map_or(true, |h| !d.is_opposite(h)))
        .filter(|d| {
            let next = head.step(*d);
            next.is_on_board(frame.board_size) && !body.contains(&next)
        })
        .min_by_key(|d| (head.step(*d).manhattan(target), Some(*d) != heading))?;

    (Some(best) != heading).then_some(best)
}
