use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid credential digit {value} at position {position}")]
    InvalidDigit { value: u8, position: usize },

    #[error("Credential must have {expected} digits, got {actual}")]
    InvalidCredentialLength { expected: usize, actual: usize },

    // Wire protocol errors
    #[error("Unknown command byte: 0x{byte:02X}")]
    UnknownCommand { byte: u8 },

    #[error("Invalid outcome flag: 0x{byte:02X}")]
    InvalidOutcome { byte: u8 },

    #[error("Link closed by peer")]
    LinkClosed,

    // Device errors
    #[error("Store address out of range: 0x{address:04X}")]
    StoreOutOfRange { address: u16 },

    #[error("Display row out of range: {row}")]
    DisplayRowOutOfRange { row: usize },

    #[error("Device channel closed: {device}")]
    ChannelClosed { device: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a channel closed error for the named device.
    pub fn channel_closed(device: impl Into<String>) -> Self {
        Self::ChannelClosed {
            device: device.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
