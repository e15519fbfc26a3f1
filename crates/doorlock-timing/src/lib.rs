//! Logical time and the timed state machines of the lock.
//!
//! Both nodes pace their door and alarm sequences off a tick counter, not
//! wall-clock time. [`TickClock`] is that counter: a shared, watchable
//! value that a periodic ticker task (or a test) advances. The
//! [`DoorSequencer`] and [`AlarmTimer`] state machines are pure step
//! functions over tick values; drivers poll them and sleep on the clock
//! between phase deadlines, so nothing busy-waits and tests never need
//! real time.

pub mod alarm;
pub mod clock;
pub mod door;

pub use alarm::{AlarmState, AlarmTimer};
pub use clock::{TickClock, Ticker};
pub use door::{DoorSequencer, DoorState};
