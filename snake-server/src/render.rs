//! Render Sinks
//!
//! The engine never paints anything itself; it hands a [`Frame`] to a
//! [`RenderSink`] once at idle, once at start and once per successful tick.

use std::sync::{Arc, Mutex};
use serde::{Serialize, Deserialize};
use tokio::sync::watch;
use tracing::debug;

use crate::core::grid::GridPos;

/// Snapshot of the board to paint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Segments, head first
    pub snake: Vec<GridPos>,
    /// Food cell, if any
    pub food: Option<GridPos>,
    /// Size of one cell in render units
    pub cell_size: u32,
    /// Board side length in cells
    pub board_size: u32,
}

impl Frame {
    /// Draw the board as text: `@` head, `o` body, `*` food, `.` empty.
    pub fn to_ascii(&self) -> String {
        let side = self.board_size as usize;
        let mut rows = vec![vec!['.'; side]; side];

        let mut put = |pos: GridPos, ch: char| {
            if pos.is_on_board(self.board_size) {
                rows[pos.y as usize][pos.x as usize] = ch;
            }
        };

        if let Some(food) = self.food {
            put(food, '*');
        }
        for segment in self.snake.iter().skip(1) {
            put(*segment, 'o');
        }
        if let Some(head) = self.snake.first() {
            put(*head, '@');
        }

        let mut out = String::with_capacity(side * (side + 1));
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

/// Something that can paint a frame.
pub trait RenderSink: Send {
    /// Paint the board.
    fn draw_frame(&mut self, frame: &Frame);
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn draw_frame(&mut self, _frame: &Frame) {}
}

/// Logs each frame as an ASCII board at debug level.
#[derive(Debug, Default)]
pub struct TextSink {
    frames_drawn: u64,
}

impl TextSink {
    /// Create a new text sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

impl RenderSink for TextSink {
    fn draw_frame(&mut self, frame: &Frame) {
        self.frames_drawn += 1;
        debug!(
            "frame {} (length {}):\n{}",
            self.frames_drawn,
            frame.snake.len(),
            frame.to_ascii()
        );
    }
}

/// Keeps every frame in a shared list. Clones see the same frames.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingSink {
    /// Create a new, empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all frames drawn so far.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<Frame> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }

    /// Number of frames drawn.
    pub fn len(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// Check if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RenderSink for RecordingSink {
    fn draw_frame(&mut self, frame: &Frame) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(frame.clone());
        }
    }
}

/// Publishes the latest frame on a tokio watch channel.
///
/// Lets other tasks (an autopilot, a UI) observe the board without
/// borrowing the engine.
#[derive(Debug)]
pub struct WatchSink {
    tx: watch::Sender<Option<Frame>>,
}

impl WatchSink {
    /// Create a sink and a receiver for its frames.
    pub fn channel() -> (Self, watch::Receiver<Option<Frame>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl RenderSink for WatchSink {
    fn draw_frame(&mut self, frame: &Frame) {
        self.tx.send_replace(Some(frame.clone()));
    }
}

/// Hands every frame to several sinks in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl FanoutSink {
    /// Create a fan-out over `sinks`.
    pub fn new(sinks: Vec<Box<dyn RenderSink>>) -> Self {
        Self { sinks }
    }
}

impl RenderSink for FanoutSink {
    fn draw_frame(&mut self, frame: &Frame) {
        for sink in &mut self.sinks {
            sink.draw_frame(frame);
        }
    }
}
