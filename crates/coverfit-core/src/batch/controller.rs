//! Run state machine shared between the executor and whoever drives it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::types::RunState;

/// Tracks whether a batch is running and whether it was asked to stop.
///
/// Cancellation is a sub-state of `Running` held in the same atomic, so a
/// request can never outlive the run it was made against.
///
/// Share it through an `Arc`: the presentation layer calls [`cancel`] and
/// reads [`state`], the executor holds the [`RunGuard`] returned by
/// [`try_begin`].
///
/// [`cancel`]: RunController::cancel
/// [`state`]: RunController::state
/// [`try_begin`]: RunController::try_begin
#[derive(Debug)]
pub struct RunController {
    state: AtomicU8,
}

impl Default for RunController {
    fn default() -> Self {
        Self::new()
    }
}

impl RunController {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(encode(RunState::Idle)),
        }
    }

    /// Current state of the most recent run.
    pub fn state(&self) -> RunState {
        decode(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Request cancellation of the active run.
    ///
    /// Returns false (and does nothing) when no run is active. The executor
    /// stops at the next file boundary.
    pub fn cancel(&self) -> bool {
        match self.state.compare_exchange(
            RUNNING,
            CANCELLING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                tracing::debug!("Cancellation requested");
                true
            }
            Err(actual) => actual == CANCELLING,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLING
    }

    /// Move into `Running` unless a run is already in progress.
    ///
    /// The new run starts with no pending cancellation.
    pub fn try_begin(self: &Arc<Self>) -> PipelineResult<RunGuard> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if decode(current) == RunState::Running {
                return Err(PipelineError::RunInProgress);
            }
            match self.state.compare_exchange(
                current,
                RUNNING,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        Ok(RunGuard {
            controller: Arc::clone(self),
            outcome: RunState::Failed,
        })
    }
}

/// Exclusive claim on a running batch.
///
/// Dropping the guard always leaves the controller in a terminal state, so a
/// new run can start. A guard dropped without [`RunGuard::finish`] (for
/// example while unwinding) records `Failed`.
#[derive(Debug)]
pub struct RunGuard {
    controller: Arc<RunController>,
    outcome: RunState,
}

impl RunGuard {
    pub fn controller(&self) -> &RunController {
        &self.controller
    }

    /// Release the run with the given terminal state.
    pub fn finish(mut self, state: RunState) {
        debug_assert!(state != RunState::Running);
        self.outcome = state;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.controller
            .state
            .store(encode(self.outcome), Ordering::Release);
    }
}

const RUNNING: u8 = 1;
/// Running with a stop requested; reads as `Running` from outside.
const CANCELLING: u8 = 5;

fn encode(state: RunState) -> u8 {
    match state {
        RunState::Idle => 0,
        RunState::Running => RUNNING,
        RunState::Completed => 2,
        RunState::Cancelled => 3,
        RunState::Failed => 4,
    }
}

fn decode(value: u8) -> RunState {
    match value {
        0 => RunState::Idle,
        RUNNING | CANCELLING => RunState::Running,
        2 => RunState::Completed,
        3 => RunState::Cancelled,
        _ => RunState::Failed,
    }
}
