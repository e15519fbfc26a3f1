//! Remote HMI node of the door lock.
//!
//! This node owns the keypad and the two-row display. It collects
//! credential entries, forwards them to the local control node over the
//! link, and renders the outcome: menu screens, retry prompts, the door
//! cycle progress, and the alarm error screen. It holds no credential of
//! its own; every comparison happens on the control side.

pub mod session;

pub use session::RemoteSession;
