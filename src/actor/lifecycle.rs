//! The per-actor lifecycle state machine.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// States of the actor lifecycle.
///
/// ```text
/// Constructed -> Starting -> Running <-> Suspended
///                               |            |
///                               |        Restarting -> Running
///                               v
///                           Stopping -> Stopped
/// ```
///
/// `Stopped` is terminal; user message handlers run only in `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeCycleState {
    /// Instance exists; `start` has not been processed yet.
    Constructed,

    /// `before_start` is in progress.
    Starting,

    /// Dispatching user messages.
    Running,

    /// Dispatch halted after a fault, awaiting a supervision directive.
    Suspended,

    /// A replacement instance is being swapped in.
    Restarting,

    /// The shutdown sequence is in progress.
    Stopping,

    /// Terminal.
    Stopped,
}

impl LifeCycleState {
    /// Whether user message handlers may run.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether the actor is stopping or has stopped.
    pub fn is_stopping_or_stopped(&self) -> bool {
        matches!(self, Self::Stopping | Self::Stopped)
    }
}

/// Upper bound on remembered restart timestamps; windows only ever look
/// back a bounded period, so older entries are pruned.
const RESTART_LOG_LIMIT: usize = 64;

/// Lifecycle tracker: current state, transition timestamp, restart log.
#[derive(Debug, Clone)]
pub struct LifeCycle {
    state: LifeCycleState,
    last_transition: DateTime<Utc>,
    restart_count: u32,
    restarts: VecDeque<DateTime<Utc>>,
}

impl LifeCycle {
    /// A tracker in `Constructed` state.
    pub fn new() -> Self {
        Self {
            state: LifeCycleState::Constructed,
            last_transition: Utc::now(),
            restart_count: 0,
            restarts: VecDeque::new(),
        }
    }

    /// Transition to a new state, recording the timestamp.
    ///
    /// Transitions out of `Stopped` are ignored. Entering `Restarting`
    /// appends to the restart log.
    pub fn transition_to(&mut self, new_state: LifeCycleState) {
        if self.state == LifeCycleState::Stopped {
            return;
        }
        self.state = new_state;
        self.last_transition = Utc::now();

        if new_state == LifeCycleState::Restarting {
            self.restart_count = self.restart_count.saturating_add(1);
            self.restarts.push_back(Utc::now());
            while self.restarts.len() > RESTART_LOG_LIMIT {
                self.restarts.pop_front();
            }
        }
    }

    /// The current state.
    pub fn state(&self) -> LifeCycleState {
        self.state
    }

    /// Timestamp of the last transition.
    pub fn last_transition(&self) -> DateTime<Utc> {
        self.last_transition
    }

    /// Total restarts over the actor's lifetime.
    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Restarts recorded within the trailing `period`.
    pub fn restarts_within(&self, period: Duration) -> u32 {
        let window = chrono::Duration::from_std(period).unwrap_or(chrono::Duration::MAX);
        let floor = Utc::now()
            .checked_sub_signed(window)
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
        self.restarts.iter().filter(|at| **at >= floor).count() as u32
    }
}

impl Default for LifeCycle {
    fn default() -> Self {
        Self::new()
    }
}
