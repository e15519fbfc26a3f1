//! Door cycle state machine.
//!
//! A granted open request runs one fixed cycle:
//!
//! ```text
//! Idle -> Unlocking (15 ticks, motor forward)
//!      -> Holding   (3 ticks,  motor stopped)
//!      -> Locking   (15 ticks, motor reverse)
//!      -> Idle      (motor stopped)
//! ```
//!
//! [`DoorSequencer`] is a non-blocking step function over tick values.
//! Drivers ask for the current phase deadline, sleep on the clock until
//! it passes, then poll. Polling performs at most one transition per
//! call, so a driver that re-polls after a coarse tick jump still walks
//! every phase and issues every actuator command in order.

use doorlock_core::constants::{DOOR_CYCLE_TIME, HOLD_TIME, OPEN_TIME};
use doorlock_core::types::MotorDirection;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Phase of the door cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    /// Door locked, no cycle running.
    Idle,

    /// Motor rotating forward, door opening.
    Unlocking,

    /// Door held open, motor stopped.
    Holding,

    /// Motor rotating in reverse, door closing.
    Locking,
}

impl DoorState {
    /// Check if transition to target state is valid from this state.
    ///
    /// The cycle only ever moves forward; there is no abort path.
    pub fn can_transition_to(&self, target: &DoorState) -> bool {
        matches!(
            (self, target),
            (DoorState::Idle, DoorState::Unlocking)
                | (DoorState::Unlocking, DoorState::Holding)
                | (DoorState::Holding, DoorState::Locking)
                | (DoorState::Locking, DoorState::Idle)
        )
    }

    /// Motor command to issue when entering this state.
    #[must_use]
    pub fn motor_command(&self) -> MotorDirection {
        match self {
            DoorState::Unlocking => MotorDirection::Forward,
            DoorState::Holding | DoorState::Idle => MotorDirection::Stop,
            DoorState::Locking => MotorDirection::Reverse,
        }
    }

    /// Message shown on the remote display during this state.
    ///
    /// Returns `None` for `Idle`; the remote node is back at its menu by
    /// then.
    #[must_use]
    pub fn display_message(&self) -> Option<&'static str> {
        use doorlock_core::constants::{MSG_DOOR_HOLDING, MSG_DOOR_LOCKING, MSG_DOOR_UNLOCKING};
        match self {
            DoorState::Idle => None,
            DoorState::Unlocking => Some(MSG_DOOR_UNLOCKING),
            DoorState::Holding => Some(MSG_DOOR_HOLDING),
            DoorState::Locking => Some(MSG_DOOR_LOCKING),
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            DoorState::Idle => "Idle",
            DoorState::Unlocking => "Unlocking",
            DoorState::Holding => "Holding",
            DoorState::Locking => "Locking",
        };
        write!(f, "{}", state_str)
    }
}

/// Step-function driver for one door cycle.
///
/// # Examples
///
/// ```
/// use doorlock_timing::{DoorSequencer, DoorState};
///
/// let mut sequencer = DoorSequencer::new();
/// assert_eq!(sequencer.start(), DoorState::Unlocking);
///
/// // Nothing happens before the phase deadline
/// assert_eq!(sequencer.poll(14), None);
///
/// // One transition per poll, even when ticks jump past several phases
/// assert_eq!(sequencer.poll(40), Some(DoorState::Holding));
/// assert_eq!(sequencer.poll(40), Some(DoorState::Locking));
/// assert_eq!(sequencer.poll(40), Some(DoorState::Idle));
/// assert_eq!(sequencer.poll(40), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DoorSequencer {
    state: DoorState,
}

impl DoorSequencer {
    /// Create an idle sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DoorState::Idle,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Begin a cycle from tick zero.
    ///
    /// The caller resets its clock alongside this. Returns the entered
    /// state so the driver can issue its motor command.
    pub fn start(&mut self) -> DoorState {
        debug!("door cycle started");
        self.state = DoorState::Unlocking;
        self.state
    }

    /// Tick at which the current phase ends, if a cycle is running.
    ///
    /// Returns `None` once the cycle is back at `Idle`.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u32> {
        match self.state {
            DoorState::Idle => None,
            DoorState::Unlocking => Some(OPEN_TIME),
            DoorState::Holding => Some(OPEN_TIME + HOLD_TIME),
            DoorState::Locking => Some(DOOR_CYCLE_TIME),
        }
    }

    /// Advance past the phase deadline if `now` has reached it.
    ///
    /// Performs at most one transition per call and returns the state
    /// that was entered, or `None` if the current phase is still running.
    pub fn poll(&mut self, now: u32) -> Option<DoorState> {
        let deadline = self.next_deadline()?;
        if now < deadline {
            return None;
        }
        let next = match self.state {
            DoorState::Unlocking => DoorState::Holding,
            DoorState::Holding => DoorState::Locking,
            DoorState::Locking => DoorState::Idle,
            DoorState::Idle => return None,
        };
        debug!(from = %self.state, to = %next, now, "door phase complete");
        self.state = next;
        Some(next)
    }
}

impl Default for DoorSequencer {
    fn default() -> Self {
        Self::new()
    }
}
