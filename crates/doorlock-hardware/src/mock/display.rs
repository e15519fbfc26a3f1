//! Mock two-row character display.
//!
//! Renders into shared memory instead of hardware. The handle exposes the
//! current screen contents plus a history of every line ever shown, so
//! tests can assert on messages that were displayed and later replaced.

use crate::traits::DisplayDevice;
use doorlock_core::{Error, Result, constants::DISPLAY_ROWS};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct DisplayState {
    lines: [String; DISPLAY_ROWS],
    cursor_row: usize,
    history: Vec<String>,
}

/// Mock display device.
#[derive(Debug)]
pub struct MockDisplay {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplay {
    /// Create a new mock display with an inspection handle.
    pub fn new() -> (Self, MockDisplayHandle) {
        let state = Arc::new(Mutex::new(DisplayState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockDisplayHandle { state },
        )
    }

    fn state(&self) -> MutexGuard<'_, DisplayState> {
        // A panic while holding the lock only poisons test state
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DisplayDevice for MockDisplay {
    async fn clear(&mut self) -> Result<()> {
        let mut state = self.state();
        for line in &mut state.lines {
            line.clear();
        }
        state.cursor_row = 0;
        Ok(())
    }

    async fn show(&mut self, row: usize, text: &str) -> Result<()> {
        if row >= DISPLAY_ROWS {
            return Err(Error::DisplayRowOutOfRange { row });
        }
        let mut state = self.state();
        state.lines[row] = text.to_string();
        state.cursor_row = row;
        if !text.is_empty() {
            state.history.push(text.to_string());
        }
        Ok(())
    }

    async fn put_char(&mut self, ch: char) -> Result<()> {
        let mut state = self.state();
        let row = state.cursor_row;
        state.lines[row].push(ch);
        Ok(())
    }
}

/// Handle for inspecting a mock display.
///
/// Can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplayHandle {
    fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current contents of both rows.
    pub fn lines(&self) -> [String; DISPLAY_ROWS] {
        self.state().lines.clone()
    }

    /// Every non-empty line that has been shown, in order.
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Whether the given message has ever been shown.
    pub fn saw_message(&self, message: &str) -> bool {
        self.state().history.iter().any(|line| line == message)
    }
}
