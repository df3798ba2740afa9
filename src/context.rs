// src/context.rs

//! The "current" sketch/board/port the operator is working with.
//!
//! Operations record into it as a side effect; readers take a snapshot. All
//! writes go through one mutex, so concurrent updates serialize and the last
//! writer wins without torn state.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    pub current_sketch: Option<PathBuf>,
    pub current_board: Option<String>,
    pub current_port: Option<String>,
}

#[derive(Debug, Default)]
pub struct SessionContext {
    state: Mutex<ContextSnapshot>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn record_sketch(&self, sketch: impl Into<PathBuf>) {
        self.update(|s| s.current_sketch = Some(sketch.into()));
    }

    pub fn record_board(&self, board: impl Into<String>) {
        self.update(|s| s.current_board = Some(board.into()));
    }

    /// Board and port change together on upload.
    pub fn record_target(&self, board: impl Into<String>, port: impl Into<String>) {
        let board = board.into();
        let port = port.into();
        self.update(|s| {
            s.current_board = Some(board);
            s.current_port = Some(port);
        });
    }

    fn update(&self, f: impl FnOnce(&mut ContextSnapshot)) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}
