//! Mock device implementations for testing and emulation.
//!
//! Each mock comes as a `(Device, Handle)` pair: the device end implements
//! the hardware trait and is owned by the node, while the handle stays
//! with the test to feed input or inspect what the node did to the device.

mod actuators;
mod display;
mod eeprom;
mod keypad;

pub use actuators::{MockAlarm, MockAlarmHandle, MockMotor, MockMotorHandle};
pub use display::{MockDisplay, MockDisplayHandle};
pub use eeprom::MemoryEeprom;
pub use keypad::{MockKeypad, MockKeypadHandle};
