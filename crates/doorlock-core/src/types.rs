use crate::{
    Result,
    constants::{CMD_CHANGE_CREDENTIAL, CMD_OPEN_DOOR, CREDENTIAL_LENGTH, FLAG_MATCH, FLAG_MISMATCH, MAX_TRIALS},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// A 5-digit access credential.
///
/// Each digit is stored as a raw value 0-9, exactly as it travels on the
/// wire and sits in the persistent store.
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when comparing credentials during verification. `Debug` and `Display`
/// render a masked form so credentials never leak into logs.
#[derive(Clone, Copy, Eq)]
pub struct Credential([u8; CREDENTIAL_LENGTH]);

impl Credential {
    /// Create a new credential with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if any digit is greater than 9.
    pub fn new(digits: [u8; CREDENTIAL_LENGTH]) -> Result<Self> {
        for (position, &value) in digits.iter().enumerate() {
            if value > 9 {
                return Err(Error::InvalidDigit { value, position });
            }
        }
        Ok(Credential(digits))
    }

    /// Create a credential from a byte slice.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredentialLength` if the slice is not exactly
    /// [`CREDENTIAL_LENGTH`] bytes, or `Error::InvalidDigit` if any byte is
    /// greater than 9.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let digits: [u8; CREDENTIAL_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| Error::InvalidCredentialLength {
                    expected: CREDENTIAL_LENGTH,
                    actual: bytes.len(),
                })?;
        Credential::new(digits)
    }

    /// Get the raw digits.
    #[must_use]
    pub fn digits(&self) -> &[u8; CREDENTIAL_LENGTH] {
        &self.0
    }

    /// Compare against raw stored bytes in constant time.
    ///
    /// The stored side is compared as-is, so erased store cells (0xFF)
    /// never match a valid entry.
    #[must_use]
    pub fn matches_bytes(&self, stored: &[u8]) -> bool {
        if stored.len() != CREDENTIAL_LENGTH {
            return false;
        }
        self.0.as_slice().ct_eq(stored).into()
    }
}

/// Constant-time comparison implementation for Credential
///
/// This prevents timing attacks by ensuring comparison takes the same time
/// regardless of where the digits differ.
impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Credential(*****)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "*****")
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != CREDENTIAL_LENGTH {
            return Err(Error::InvalidCredentialLength {
                expected: CREDENTIAL_LENGTH,
                actual: s.len(),
            });
        }
        let mut digits = [0u8; CREDENTIAL_LENGTH];
        for (position, (slot, ch)) in digits.iter_mut().zip(s.chars()).enumerate() {
            let value = ch.to_digit(10).ok_or(Error::InvalidDigit {
                value: ch as u8,
                position,
            })?;
            *slot = value as u8;
        }
        Ok(Credential(digits))
    }
}

/// Session command sent from the remote node to the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Run a full door open/hold/close cycle.
    OpenDoor,
    /// Replace the stored credential with a freshly enrolled one.
    ChangeCredential,
}

impl Command {
    /// Create a command from its wire byte.
    ///
    /// # Errors
    /// Returns `Error::UnknownCommand` for any byte other than `'+'` or `'-'`.
    #[inline]
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            CMD_OPEN_DOOR => Ok(Command::OpenDoor),
            CMD_CHANGE_CREDENTIAL => Ok(Command::ChangeCredential),
            _ => Err(Error::UnknownCommand { byte }),
        }
    }

    /// Convert the command to its wire byte.
    #[inline]
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Command::OpenDoor => CMD_OPEN_DOOR,
            Command::ChangeCredential => CMD_CHANGE_CREDENTIAL,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::OpenDoor => write!(f, "OpenDoor"),
            Command::ChangeCredential => write!(f, "ChangeCredential"),
        }
    }
}

/// Result of a credential comparison, as reported over the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The entry matched.
    Match,
    /// The entry did not match.
    Mismatch,
}

impl Outcome {
    /// Create an outcome from its wire flag byte.
    ///
    /// # Errors
    /// Returns `Error::InvalidOutcome` for any byte other than 0 or 1.
    #[inline]
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            FLAG_MATCH => Ok(Outcome::Match),
            FLAG_MISMATCH => Ok(Outcome::Mismatch),
            _ => Err(Error::InvalidOutcome { byte }),
        }
    }

    /// Convert the outcome to its wire flag byte.
    #[inline]
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Outcome::Match => FLAG_MATCH,
            Outcome::Mismatch => FLAG_MISMATCH,
        }
    }

    /// Returns `true` for a matching outcome.
    #[inline]
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Outcome::Match)
    }
}

/// Direction command for the door motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    /// Rotate forward (unlock).
    Forward,
    /// Stop rotating.
    Stop,
    /// Rotate in reverse (lock).
    Reverse,
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MotorDirection::Forward => write!(f, "Forward"),
            MotorDirection::Stop => write!(f, "Stop"),
            MotorDirection::Reverse => write!(f, "Reverse"),
        }
    }
}

/// What a session should do after a rejected verification entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPolicy {
    /// Prompt for another entry.
    Retry,
    /// Too many consecutive rejections; sound the alarm.
    SoundAlarm,
}

/// Consecutive-rejection counter for a verification session.
///
/// Both nodes keep one of these and feed it the same outcome stream, so
/// they reach the alarm decision in lockstep without exchanging counter
/// state. The counter resets on every success and whenever the alarm
/// decision is reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialCounter {
    failures: u8,
}

impl TrialCounter {
    /// Create a counter with no recorded failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of consecutive rejections recorded so far.
    #[must_use]
    pub fn failures(&self) -> u8 {
        self.failures
    }

    /// Record a successful verification, clearing the failure streak.
    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    /// Record a rejected entry and decide what happens next.
    ///
    /// Up to [`MAX_TRIALS`] consecutive rejections are tolerated with
    /// [`TrialPolicy::Retry`]; the rejection after that returns
    /// [`TrialPolicy::SoundAlarm`] and resets the counter.
    pub fn record_mismatch(&mut self) -> TrialPolicy {
        if self.failures < MAX_TRIALS {
            self.failures += 1;
            TrialPolicy::Retry
        } else {
            self.failures = 0;
            TrialPolicy::SoundAlarm
        }
    }
}
