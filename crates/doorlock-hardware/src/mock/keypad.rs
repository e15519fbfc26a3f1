//! Mock keypad implementation.
//!
//! Simulates the keypad by receiving keypresses through an internal
//! channel. Tests and the emulator binary send input programmatically
//! using a [`MockKeypadHandle`].

use crate::traits::{KeyPress, KeypadDevice};
use doorlock_core::{Error, Result};
use tokio::sync::mpsc;

/// Mock keypad device.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockKeypad;
/// use doorlock_hardware::{KeyPress, KeypadDevice};
///
/// #[tokio::main]
/// async fn main() -> doorlock_core::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     tokio::spawn(async move {
///         handle.send_key(KeyPress::Digit(1)).await.unwrap();
///         handle.send_key(KeyPress::Enter).await.unwrap();
///     });
///
///     assert_eq!(keypad.read_key().await?, KeyPress::Digit(1));
///     assert_eq!(keypad.read_key().await?, KeyPress::Enter);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    input_rx: mpsc::Receiver<KeyPress>,
}

impl MockKeypad {
    /// Create a new mock keypad.
    ///
    /// Returns the device together with the handle used to simulate
    /// keypresses.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(32);
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_key(&mut self) -> Result<KeyPress> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| Error::channel_closed("keypad"))
    }
}

/// Handle for driving a mock keypad.
///
/// Can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    input_tx: mpsc::Sender<KeyPress>,
}

impl MockKeypadHandle {
    /// Send a single keypress.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_key(&self, key: KeyPress) -> Result<()> {
        self.input_tx
            .send(key)
            .await
            .map_err(|_| Error::channel_closed("keypad"))
    }

    /// Send a sequence of digit keypresses.
    ///
    /// # Errors
    ///
    /// Returns an error if any digit is greater than 9 or the keypad has
    /// been dropped.
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            self.send_key(KeyPress::digit(digit)?).await?;
        }
        Ok(())
    }

    /// Send a complete credential entry: the digits followed by Enter.
    ///
    /// # Errors
    ///
    /// Returns an error if any digit is greater than 9 or the keypad has
    /// been dropped.
    pub async fn send_entry(&self, digits: &[u8]) -> Result<()> {
        self.send_digits(digits).await?;
        self.send_key(KeyPress::Enter).await
    }
}
