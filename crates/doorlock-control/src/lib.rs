//! Local control node of the door lock.
//!
//! This node owns the door motor, the alarm sounder, and the persistent
//! credential store. It never touches the keypad or display; everything
//! it knows about the operator arrives as bytes from the remote node over
//! the link. [`LocalController`] is the session driver: enroll a
//! credential, then serve open and change requests until the link closes.

pub mod controller;

pub use controller::LocalController;
