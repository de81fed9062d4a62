//! Game Session
//!
//! Async tick driver for a [`GameEngine`]. One tokio task owns the engine;
//! input arrives over an mpsc channel, events leave over a broadcast
//! channel. The task waits on whichever comes first: the deadline of the
//! engine's pending tick or the next command.

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::SessionConfig;
use crate::engine::GameEngine;
use crate::game::events::GameEvent;
use crate::game::state::RunState;

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session task has exited.
    #[error("Session closed")]
    Closed,

    /// The session task panicked or was aborted.
    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Commands accepted by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// A raw key symbol from the input device
    Key(String),
    /// Start button
    Start,
    /// Stop the game and go idle
    Stop,
    /// End the session task
    Shutdown,
}

/// Armed timer for one scheduled tick.
#[derive(Debug, Clone, Copy)]
struct ArmedTick {
    generation: u64,
    deadline: Instant,
}

/// Handle to a spawned session.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    events: broadcast::Sender<GameEvent>,
    task: JoinHandle<GameEngine>,
}

impl SessionHandle {
    /// Subscribe to engine events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Deliver a raw key symbol.
    pub async fn send_key(&self, symbol: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::Key(symbol.into())).await
    }

    /// Press the start button.
    pub async fn start(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Start).await
    }

    /// Stop the current game.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Stop).await
    }

    /// A sender that can be moved into other tasks.
    pub fn command_sender(&self) -> mpsc::Sender<SessionCommand> {
        self.commands.clone()
    }

    /// End the session and get the engine back.
    pub async fn shutdown(self) -> Result<GameEngine, SessionError> {
        // The task may already be gone; joining reports that
        let _ = self.commands.send(SessionCommand::Shutdown).await;
        Ok(self.task.await?)
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// Spawns and runs session tasks.
pub struct GameSession;

impl GameSession {
    /// Spawn a task driving `engine`.
    pub fn spawn(engine: GameEngine, config: SessionConfig) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        let events = event_tx.clone();
        let task = tokio::spawn(async move { Self::run(engine, command_rx, events).await });

        SessionHandle {
            commands: command_tx,
            events: event_tx,
            task,
        }
    }

    /// Drive the engine until shutdown or until every command sender is gone.
    #[instrument(skip_all, fields(engine = %engine.id()))]
    async fn run(
        mut engine: GameEngine,
        mut commands: mpsc::Receiver<SessionCommand>,
        events: broadcast::Sender<GameEvent>,
    ) -> GameEngine {
        info!("Session started");
        let mut armed: Option<ArmedTick> = None;

        loop {
            armed = Self::rearm(&engine, armed);
            let deadline = armed.map(|a| a.deadline).unwrap_or_else(Instant::now);

            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(SessionCommand::Key(symbol)) => {
                            engine.handle_key(&symbol);
                        }
                        Some(SessionCommand::Start) => {
                            engine.start();
                        }
                        Some(SessionCommand::Stop) => {
                            engine.stop();
                        }
                        Some(SessionCommand::Shutdown) | None => break,
                    }
                }
                _ = sleep_until(deadline), if armed.is_some() => {
                    if let Some(tick) = armed.take() {
                        if let Some(result) = engine.fire(tick.generation) {
                            Self::publish(&events, result.events);
                        }
                    }
                }
            }

            Self::publish(&events, engine.take_events());
        }

        if engine.run_state() == RunState::Running {
            engine.stop();
            Self::publish(&events, engine.take_events());
        }
        info!("Session ended");
        engine
    }

    /// Keep the armed deadline while the engine's pending tick is unchanged;
    /// arm a fresh one when it changed; disarm when nothing is pending.
    fn rearm(engine: &GameEngine, armed: Option<ArmedTick>) -> Option<ArmedTick> {
        let pending = engine.pending_tick()?;
        match armed {
            Some(current) if current.generation == pending.generation => Some(current),
            _ => {
                debug!("Armed tick {} in {:?}", pending.generation, pending.delay);
                Some(ArmedTick {
                    generation: pending.generation,
                    deadline: Instant::now() + pending.delay,
                })
            }
        }
    }

    fn publish(events: &broadcast::Sender<GameEvent>, batch: Vec<GameEvent>) {
        for event in batch {
            debug!("Event at tick {}: {:?}", event.tick, event.data);
            // Err only means nobody is subscribed
            let _ = events.send(event);
        }
    }
}

/// Wait for the next event matching `pred`, skipping lagged messages.
pub async fn wait_for_event<F>(
    rx: &mut broadcast::Receiver<GameEvent>,
    mut pred: F,
) -> Result<GameEvent, SessionError>
where
    F: FnMut(&GameEvent) -> bool,
{
    loop {
        match rx.recv().await {
            Ok(event) if pred(&event) => return Ok(event),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event receiver lagged by {} events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return Err(SessionError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::config::GameConfig;
    use crate::game::events::GameEventData;
    use crate::render::{NullSink, RecordingSink};
    use crate::storage::MemoryStore;

    fn engine(store: MemoryStore, sink: RecordingSink) -> GameEngine {
        let config = GameConfig {
            rng_seed: Some(7),
            ..Default::default()
        };
        GameEngine::new(config, Box::new(store), Box::new(sink)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_runs_until_wall() {
        let store = MemoryStore::new();
        let handle = GameSession::spawn(engine(store, RecordingSink::new()), SessionConfig::default());
        let mut rx = handle.subscribe();

        handle.send_key("Enter").await.unwrap();

        let started = wait_for_event(&mut rx, |e| matches!(e.data, GameEventData::GameStarted { .. }))
            .await
            .unwrap();
        assert_eq!(started.data, GameEventData::GameStarted { rng_seed: 7, high_score: 0 });

        // Heading right from (10,10) with no input reaches the wall
        let over = wait_for_event(&mut rx, GameEvent::is_game_over).await.unwrap();
        assert!(over.tick >= 10);

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.run_state(), RunState::GameOver);
        assert_eq!(engine.pending_tick(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_speed() {
        let sink = RecordingSink::new();
        let handle = GameSession::spawn(engine(MemoryStore::new(), sink.clone()), SessionConfig::default());

        handle.start().await.unwrap();
        // Turn down so the first ticks stay on the board
        handle.send_key("ArrowDown").await.unwrap();

        // Idle frame + start frame, then one frame per 100ms tick
        tokio::time::sleep(Duration::from_millis(350)).await;
        let frames = sink.len();
        assert!((4..=6).contains(&frames), "unexpected frame count {}", frames);

        let engine = handle.shutdown().await.unwrap();
        assert!(engine.state().tick >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_tick() {
        let handle = GameSession::spawn(engine(MemoryStore::new(), RecordingSink::new()), SessionConfig::default());
        let mut rx = handle.subscribe();

        handle.start().await.unwrap();
        handle.stop().await.unwrap();
        wait_for_event(&mut rx, |e| e.data == GameEventData::GameStopped)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.run_state(), RunState::Idle);
        assert_eq!(engine.state().tick, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_game_over() {
        let store = MemoryStore::new();
        let handle = GameSession::spawn(engine(store, RecordingSink::new()), SessionConfig::default());
        let mut rx = handle.subscribe();

        handle.send_key("Enter").await.unwrap();
        wait_for_event(&mut rx, GameEvent::is_game_over).await.unwrap();

        handle.send_key("Enter").await.unwrap();
        let restarted = wait_for_event(&mut rx, |e| matches!(e.data, GameEventData::ScoreChanged { score: 0 }))
            .await
            .unwrap();
        assert_eq!(restarted.tick, 0);

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.run_state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_send_after_shutdown_fails() {
        let engine = GameEngine::new(GameConfig::default(), Box::new(MemoryStore::new()), Box::new(NullSink)).unwrap();
        let handle = GameSession::spawn(engine, SessionConfig::default());
        let sender = handle.command_sender();

        handle.shutdown().await.unwrap();
        assert!(sender.send(SessionCommand::Start).await.is_err());
    }
}
