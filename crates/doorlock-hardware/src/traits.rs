//! Hardware device trait definitions.
//!
//! These traits establish the contract between the session logic and the
//! peripheral devices on each node, enabling substitution between mock
//! and real hardware implementations.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024
//! RPITIT), eliminating the need for the `async_trait` macro. They are
//! NOT object-safe; use generic type parameters rather than trait
//! objects.

#![allow(async_fn_in_trait)]

use doorlock_core::{
    Command, Credential, Error, Result,
    constants::{CREDENTIAL_LENGTH, CREDENTIAL_OFFSET},
    types::MotorDirection,
};

/// A single keypress from the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Enter/confirm key.
    Enter,

    /// Plus key, selects the open-door menu option.
    Plus,

    /// Minus key, selects the change-credential menu option.
    Minus,
}

impl KeyPress {
    /// Create a digit keypress with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::KeyPress;
    ///
    /// let key = KeyPress::digit(5).unwrap();
    /// assert_eq!(key.as_digit(), Some(5));
    ///
    /// assert!(KeyPress::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(Error::InvalidDigit {
                value: d,
                position: 0,
            });
        }
        Ok(Self::Digit(d))
    }

    /// Get the digit value if this is a digit keypress.
    #[must_use]
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }

    /// Interpret this keypress as a menu command, if it is one.
    #[must_use]
    pub fn as_command(&self) -> Option<Command> {
        match self {
            Self::Plus => Some(Command::OpenDoor),
            Self::Minus => Some(Command::ChangeCredential),
            _ => None,
        }
    }
}

/// Keypad device abstraction.
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::{KeyPress, KeypadDevice};
/// use doorlock_core::Result;
///
/// async fn wait_for_enter<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     loop {
///         if matches!(keypad.read_key().await?, KeyPress::Enter) {
///             return Ok(());
///         }
///     }
/// }
/// ```
pub trait KeypadDevice: Send {
    /// Read the next keypress.
    ///
    /// Blocks asynchronously until a key is pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_key(&mut self) -> Result<KeyPress>;
}

/// Two-row character display abstraction.
///
/// The display keeps a cursor; [`show`](DisplayDevice::show) moves it to
/// the start of a row and writes a line, [`put_char`](DisplayDevice::put_char)
/// appends at the cursor. Masked credential entry is a `show` of the
/// prompt row followed by one `put_char('*')` per accepted digit.
pub trait DisplayDevice: Send {
    /// Clear both rows and home the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn clear(&mut self) -> Result<()>;

    /// Replace the contents of a row and leave the cursor at its end.
    ///
    /// # Errors
    ///
    /// Returns `Error::DisplayRowOutOfRange` if `row` is not a valid row
    /// index.
    async fn show(&mut self, row: usize, text: &str) -> Result<()>;

    /// Append a character at the cursor position.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn put_char(&mut self, ch: char) -> Result<()>;
}

/// Door motor abstraction.
pub trait DoorMotor: Send {
    /// Command the motor to rotate in the given direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn rotate(&mut self, direction: MotorDirection) -> Result<()>;
}

/// Alarm sounder abstraction.
pub trait AlarmDevice: Send {
    /// Start sounding the alarm.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn activate(&mut self) -> Result<()>;

    /// Stop sounding the alarm.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn deactivate(&mut self) -> Result<()>;
}

/// Byte-addressed persistent credential store.
///
/// Models a small EEPROM: individually writable byte cells that survive
/// restarts, with erased cells reading 0xFF. The credential layout on top
/// of the raw cells is provided by
/// [`store_credential`](CredentialStore::store_credential) and
/// [`load_credential_bytes`](CredentialStore::load_credential_bytes).
pub trait CredentialStore: Send {
    /// Read one cell.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreOutOfRange` if the address is outside the
    /// store.
    fn read_byte(&mut self, address: u16) -> impl Future<Output = Result<u8>> + Send;

    /// Write one cell.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreOutOfRange` if the address is outside the
    /// store.
    fn write_byte(&mut self, address: u16, value: u8) -> impl Future<Output = Result<()>> + Send;

    /// Persist a credential at its fixed offset, one digit per cell.
    fn store_credential(
        &mut self,
        credential: &Credential,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            for (i, &digit) in credential.digits().iter().enumerate() {
                self.write_byte(CREDENTIAL_OFFSET + i as u16, digit).await?;
            }
            Ok(())
        }
    }

    /// Read back the raw credential cells.
    ///
    /// Returns raw bytes rather than a [`Credential`] because a store
    /// that has never been enrolled holds erased cells, which are not
    /// valid digits. Compare with
    /// [`Credential::matches_bytes`](doorlock_core::Credential::matches_bytes).
    fn load_credential_bytes(
        &mut self,
    ) -> impl Future<Output = Result<[u8; CREDENTIAL_LENGTH]>> + Send {
        async move {
            let mut bytes = [0u8; CREDENTIAL_LENGTH];
            for (i, slot) in bytes.iter_mut().enumerate() {
                *slot = self.read_byte(CREDENTIAL_OFFSET + i as u16).await?;
            }
            Ok(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_digit_validation() {
        let key = KeyPress::digit(5).unwrap();
        assert_eq!(key, KeyPress::Digit(5));
        assert_eq!(key.as_digit(), Some(5));

        assert!(KeyPress::digit(10).is_err());
    }

    #[test]
    fn test_key_press_as_command() {
        assert_eq!(KeyPress::Plus.as_command(), Some(Command::OpenDoor));
        assert_eq!(KeyPress::Minus.as_command(), Some(Command::ChangeCredential));
        assert_eq!(KeyPress::Digit(1).as_command(), None);
        assert_eq!(KeyPress::Enter.as_command(), None);
    }

    #[test]
    fn test_non_digit_keys_have_no_digit_value() {
        assert_eq!(KeyPress::Enter.as_digit(), None);
        assert_eq!(KeyPress::Plus.as_digit(), None);
        assert_eq!(KeyPress::Minus.as_digit(), None);
    }
}
