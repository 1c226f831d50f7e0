//! Process-wide running/paused flag
//!
//! Starts running, is never persisted. Callers perform the admin check;
//! `pause`/`resume` are unconditional.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct RunState {
    running: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn resume(&self) {
        self.running.store(true, Ordering::Release);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let state = RunState::new();
        assert!(state.is_running());
        state.pause();
        state.pause();
        assert!(!state.is_running());
        state.resume();
        assert!(state.is_running());
    }
}
