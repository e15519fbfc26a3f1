//! Mock door motor and alarm sounder.
//!
//! Both actuators just record what they were told to do; tests assert on
//! the command logs through the handles.

use crate::traits::{AlarmDevice, DoorMotor};
use doorlock_core::{Result, types::MotorDirection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

fn lock<T>(log: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    log.lock().unwrap_or_else(|e| e.into_inner())
}

/// Mock door motor that records every rotation command.
#[derive(Debug)]
pub struct MockMotor {
    commands: Arc<Mutex<Vec<MotorDirection>>>,
}

impl MockMotor {
    /// Create a new mock motor with an inspection handle.
    pub fn new() -> (Self, MockMotorHandle) {
        let commands = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                commands: Arc::clone(&commands),
            },
            MockMotorHandle { commands },
        )
    }
}

impl DoorMotor for MockMotor {
    async fn rotate(&mut self, direction: MotorDirection) -> Result<()> {
        debug!(%direction, "motor command");
        lock(&self.commands).push(direction);
        Ok(())
    }
}

/// Handle for inspecting a mock motor.
#[derive(Debug, Clone)]
pub struct MockMotorHandle {
    commands: Arc<Mutex<Vec<MotorDirection>>>,
}

impl MockMotorHandle {
    /// Every rotation command issued so far, in order.
    pub fn commands(&self) -> Vec<MotorDirection> {
        lock(&self.commands).clone()
    }
}

/// Mock alarm that records activation changes.
#[derive(Debug)]
pub struct MockAlarm {
    events: Arc<Mutex<Vec<bool>>>,
}

impl MockAlarm {
    /// Create a new mock alarm with an inspection handle.
    pub fn new() -> (Self, MockAlarmHandle) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
            },
            MockAlarmHandle { events },
        )
    }
}

impl AlarmDevice for MockAlarm {
    async fn activate(&mut self) -> Result<()> {
        debug!("alarm on");
        lock(&self.events).push(true);
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<()> {
        debug!("alarm off");
        lock(&self.events).push(false);
        Ok(())
    }
}

/// Handle for inspecting a mock alarm.
#[derive(Debug, Clone)]
pub struct MockAlarmHandle {
    events: Arc<Mutex<Vec<bool>>>,
}

impl MockAlarmHandle {
    /// Activation changes so far: `true` for on, `false` for off.
    pub fn events(&self) -> Vec<bool> {
        lock(&self.events).clone()
    }

    /// Whether the alarm is currently sounding.
    pub fn is_active(&self) -> bool {
        lock(&self.events).last().copied().unwrap_or(false)
    }
}
