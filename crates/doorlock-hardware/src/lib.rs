//! Peripheral device abstraction for the door lock.
//!
//! The remote node owns a keypad and a character display; the local node
//! owns the door motor, the alarm, and the persistent credential store.
//! This crate defines trait interfaces for all five peripherals plus mock
//! implementations for testing and emulation, and a file-backed store for
//! persistence across runs.

pub mod mock;
pub mod store;
pub mod traits;

pub use store::FileEeprom;
pub use traits::{
    AlarmDevice, CredentialStore, DisplayDevice, DoorMotor, KeyPress, KeypadDevice,
};
