//! Alarm timer state machine.
//!
//! After too many consecutive rejections the local node sounds the alarm
//! for a fixed danger period while the remote node shows its error
//! screen. Like the door cycle, the timer is a non-blocking step
//! function over tick values.

use doorlock_core::constants::DANGER_TIME;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Alarm sounder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    /// Alarm off.
    Silent,

    /// Alarm sounding for the danger period.
    Sounding,
}

impl AlarmState {
    /// Check if transition to target state is valid from this state.
    pub fn can_transition_to(&self, target: &AlarmState) -> bool {
        matches!(
            (self, target),
            (AlarmState::Silent, AlarmState::Sounding)
                | (AlarmState::Sounding, AlarmState::Silent)
        )
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AlarmState::Silent => "Silent",
            AlarmState::Sounding => "Sounding",
        };
        write!(f, "{}", state_str)
    }
}

/// Step-function driver for one alarm period.
///
/// # Examples
///
/// ```
/// use doorlock_timing::{AlarmState, AlarmTimer};
///
/// let mut timer = AlarmTimer::new();
/// assert_eq!(timer.start(), AlarmState::Sounding);
///
/// assert_eq!(timer.poll(59), None);
/// assert_eq!(timer.poll(60), Some(AlarmState::Silent));
/// assert_eq!(timer.next_deadline(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AlarmTimer {
    state: AlarmState,
}

impl AlarmTimer {
    /// Create a silent timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AlarmState::Silent,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Begin sounding from tick zero.
    ///
    /// The caller resets its clock alongside this.
    pub fn start(&mut self) -> AlarmState {
        debug!("alarm period started");
        self.state = AlarmState::Sounding;
        self.state
    }

    /// Tick at which the alarm falls silent, if it is sounding.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u32> {
        match self.state {
            AlarmState::Silent => None,
            AlarmState::Sounding => Some(DANGER_TIME),
        }
    }

    /// Silence the alarm if `now` has reached the danger deadline.
    ///
    /// Returns the entered state, or `None` while the alarm keeps
    /// sounding.
    pub fn poll(&mut self, now: u32) -> Option<AlarmState> {
        let deadline = self.next_deadline()?;
        if now < deadline {
            return None;
        }
        debug!(now, "alarm period complete");
        self.state = AlarmState::Silent;
        Some(AlarmState::Silent)
    }
}

impl Default for AlarmTimer {
    fn default() -> Self {
        Self::new()
    }
}
