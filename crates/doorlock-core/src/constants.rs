//! Protocol and timing constants shared by both nodes.
//!
//! The two nodes of the lock (the remote keypad/display unit and the local
//! control unit) never share memory. Everything they agree on is collected
//! here: the wire encoding of commands and outcome flags, the credential
//! format, the persistent store layout, and the tick counts that drive the
//! door and alarm sequences.
//!
//! # Wire Protocol
//!
//! The link between the nodes is a raw byte stream with no framing:
//!
//! ```text
//! credential  = 5 raw digit bytes (each 0-9), sent in entry order
//! command     = 1 byte, '+' (open door) or '-' (change credential)
//! outcome     = 1 byte, 1 (match) or 0 (mismatch)
//! ```
//!
//! Modifying these values breaks interoperability between the nodes.

// ============================================================================
// Credential Format
// ============================================================================

/// Number of digits in a credential.
///
/// Entries shorter or longer than this never reach the wire; the remote
/// node collects exactly this many digits before transmitting.
pub const CREDENTIAL_LENGTH: usize = 5;

// ============================================================================
// Wire Protocol Bytes
// ============================================================================

/// Command byte requesting a door open cycle.
pub const CMD_OPEN_DOOR: u8 = b'+';

/// Command byte requesting a credential change.
pub const CMD_CHANGE_CREDENTIAL: u8 = b'-';

/// Outcome flag for a successful comparison.
pub const FLAG_MATCH: u8 = 1;

/// Outcome flag for a failed comparison.
pub const FLAG_MISMATCH: u8 = 0;

// ============================================================================
// Retry Policy
// ============================================================================

/// Number of consecutive rejections tolerated before the alarm.
///
/// The rejection after this many consecutive failures sounds the alarm.
/// With the value 2, the alarm fires on the third consecutive rejection.
pub const MAX_TRIALS: u8 = 2;

// ============================================================================
// Persistent Store Layout
// ============================================================================

/// Byte offset of the stored credential in the persistent store.
///
/// The credential occupies [`CREDENTIAL_LENGTH`] contiguous cells starting
/// at this address, one digit per cell, written in entry order.
pub const CREDENTIAL_OFFSET: u16 = 0x0311;

/// Total size of the persistent store in bytes.
pub const STORE_SIZE: usize = 0x0800;

/// Value read from a store cell that has never been written.
pub const ERASED_CELL: u8 = 0xFF;

// ============================================================================
// Door and Alarm Timing (in ticks)
// ============================================================================

/// Ticks spent unlocking (motor rotating forward).
pub const OPEN_TIME: u32 = 15;

/// Ticks the door is held open (motor stopped).
pub const HOLD_TIME: u32 = 3;

/// Ticks spent locking (motor rotating in reverse).
pub const CLOSE_TIME: u32 = 15;

/// Total length of a full door cycle in ticks.
pub const DOOR_CYCLE_TIME: u32 = OPEN_TIME + HOLD_TIME + CLOSE_TIME;

/// Ticks the alarm sounds after too many consecutive rejections.
pub const DANGER_TIME: u32 = 60;

/// Default wall-clock period of one tick in milliseconds.
///
/// Production runs at one tick per second. Tests shrink this to run the
/// timed sequences in milliseconds.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

// ============================================================================
// Display Geometry
// ============================================================================

/// Number of rows on the character display.
pub const DISPLAY_ROWS: usize = 2;

/// Number of columns on the character display.
pub const DISPLAY_COLUMNS: usize = 16;

// ============================================================================
// Display Messages
// ============================================================================

/// Prompt for a credential entry.
pub const MSG_ENTER_PASS: &str = "Plz Enter Pass:";

/// Prompt for the confirmation entry during enrollment.
pub const MSG_REENTER_PASS: &str = "Plz reEnter Pass:";

/// Shown when the two enrollment entries agree.
pub const MSG_MATCHING: &str = "Matching....";

/// Shown when the two enrollment entries differ.
pub const MSG_NOT_MATCHING: &str = "Not Matching!";

/// Shown when a verification entry is rejected.
pub const MSG_WRONG_PASS: &str = "Not Correct!";

/// Shown when a change-credential verification succeeds.
pub const MSG_CORRECT_PASS: &str = "Correct pass";

/// First menu row.
pub const MSG_MENU_OPEN: &str = "+ : Open Door";

/// Second menu row.
pub const MSG_MENU_CHANGE: &str = "- : Change Pass";

/// Shown after a keypress that is not a menu option.
pub const MSG_INVALID_KEY: &str = "Enter Valid Key";

/// Shown while the door is unlocking.
pub const MSG_DOOR_UNLOCKING: &str = "Door Un-locking";

/// Shown while the door is held open.
pub const MSG_DOOR_HOLDING: &str = "Holding";

/// Shown while the door is locking.
pub const MSG_DOOR_LOCKING: &str = "Door Locking";

/// Shown while the alarm is sounding.
pub const MSG_ALARM: &str = "Error !!!";
