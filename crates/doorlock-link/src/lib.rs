//! Point-to-point byte link between the two lock nodes.
//!
//! The nodes exchange single bytes over a serial-style full-duplex link
//! with no framing, checksums, or timeouts. The [`Link`] trait captures
//! that byte interface and layers the small wire vocabulary (credentials,
//! commands, outcome flags) on top as provided methods.
//!
//! Two transports are included:
//!
//! - [`channel_pair`] wires two ends together in memory, for tests and
//!   single-process emulation.
//! - [`TcpLink`] carries the same byte stream over TCP so the two nodes
//!   can run as separate processes.

#![allow(async_fn_in_trait)]

pub mod channel;
pub mod tcp;

pub use channel::{ChannelLink, channel_pair};
pub use tcp::{TcpLink, TcpLinkListener};

use doorlock_core::{
    Command, Credential, Outcome, Result, constants::CREDENTIAL_LENGTH,
};

/// Byte transport between the two nodes.
///
/// Implementors provide the raw byte send/receive pair; the wire
/// vocabulary is layered on top as provided methods so every transport
/// speaks the same protocol.
///
/// # Object Safety
///
/// This trait is NOT object-safe (`async fn` methods return opaque
/// `impl Future` types). Use generic type parameters:
///
/// ```no_run
/// use doorlock_link::Link;
/// use doorlock_core::Result;
///
/// async fn relay<L: Link>(link: &mut L) -> Result<()> {
///     let byte = link.recv_byte().await?;
///     link.send_byte(byte).await?;
///     Ok(())
/// }
/// ```
pub trait Link: Send {
    /// Send a single byte to the peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the link has been closed by the peer.
    async fn send_byte(&mut self, byte: u8) -> Result<()>;

    /// Receive a single byte from the peer.
    ///
    /// Blocks asynchronously until a byte arrives. The link has no read
    /// timeout; a node waits indefinitely for its peer.
    ///
    /// # Errors
    ///
    /// Returns `Error::LinkClosed` if the peer has closed the link.
    async fn recv_byte(&mut self) -> Result<u8>;

    /// Send a credential as its raw digit bytes, in entry order.
    async fn send_credential(&mut self, credential: &Credential) -> Result<()> {
        for &digit in credential.digits() {
            self.send_byte(digit).await?;
        }
        Ok(())
    }

    /// Receive a credential as raw digit bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDigit` if the peer sends a byte that is not
    /// a digit 0-9.
    async fn recv_credential(&mut self) -> Result<Credential> {
        let mut digits = [0u8; CREDENTIAL_LENGTH];
        for slot in digits.iter_mut() {
            *slot = self.recv_byte().await?;
        }
        Credential::new(digits)
    }

    /// Send a session command byte.
    async fn send_command(&mut self, command: Command) -> Result<()> {
        self.send_byte(command.to_byte()).await
    }

    /// Send a comparison outcome flag.
    async fn send_outcome(&mut self, outcome: Outcome) -> Result<()> {
        self.send_byte(outcome.to_byte()).await
    }

    /// Receive a comparison outcome flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOutcome` if the byte is not 0 or 1.
    async fn recv_outcome(&mut self) -> Result<Outcome> {
        let byte = self.recv_byte().await?;
        Outcome::from_byte(byte)
    }
}
