//! In-memory link transport over tokio channels.
//!
//! This transport wires two link ends together inside one process. It is
//! the default transport for tests and for running both nodes in a single
//! emulator binary.

use crate::Link;
use doorlock_core::{Error, Result};
use tokio::sync::mpsc;
use tracing::trace;

/// One end of an in-memory byte link.
///
/// Created in pairs by [`channel_pair`]; bytes sent on one end arrive at
/// the other. Dropping an end closes the link for its peer.
#[derive(Debug)]
pub struct ChannelLink {
    tx: mpsc::Sender<u8>,
    rx: mpsc::Receiver<u8>,
}

/// Create two connected link ends.
///
/// `capacity` bounds the number of in-flight bytes in each direction.
/// Sends block once the peer's buffer is full, like a serial transmit
/// register waiting to drain.
///
/// # Examples
///
/// ```
/// use doorlock_link::{Link, channel_pair};
///
/// #[tokio::main]
/// async fn main() -> doorlock_core::Result<()> {
///     let (mut a, mut b) = channel_pair(16);
///
///     a.send_byte(0x42).await?;
///     assert_eq!(b.recv_byte().await?, 0x42);
///
///     Ok(())
/// }
/// ```
pub fn channel_pair(capacity: usize) -> (ChannelLink, ChannelLink) {
    let (a_tx, b_rx) = mpsc::channel(capacity);
    let (b_tx, a_rx) = mpsc::channel(capacity);

    (
        ChannelLink { tx: a_tx, rx: a_rx },
        ChannelLink { tx: b_tx, rx: b_rx },
    )
}

impl Link for ChannelLink {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        trace!(byte, "link send");
        self.tx.send(byte).await.map_err(|_| Error::LinkClosed)
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        let byte = self.rx.recv().await.ok_or(Error::LinkClosed)?;
        trace!(byte, "link recv");
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_core::{Command, Credential, Outcome};

    #[tokio::test]
    async fn test_bytes_cross_between_ends() {
        let (mut a, mut b) = channel_pair(4);

        a.send_byte(1).await.unwrap();
        b.send_byte(2).await.unwrap();

        assert_eq!(b.recv_byte().await.unwrap(), 1);
        assert_eq!(a.recv_byte().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_credential_travels_as_digit_bytes() {
        let (mut a, mut b) = channel_pair(8);

        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        a.send_credential(&credential).await.unwrap();

        let received = b.recv_credential().await.unwrap();
        assert_eq!(received, credential);
    }

    #[tokio::test]
    async fn test_malformed_wire_digit_is_rejected() {
        let (mut a, mut b) = channel_pair(8);

        for byte in [1, 2, 3, 4, 77] {
            a.send_byte(byte).await.unwrap();
        }

        let result = b.recv_credential().await;
        assert!(matches!(
            result,
            Err(Error::InvalidDigit {
                value: 77,
                position: 4
            })
        ));
    }

    #[tokio::test]
    async fn test_command_and_outcome_helpers() {
        let (mut a, mut b) = channel_pair(4);

        a.send_command(Command::OpenDoor).await.unwrap();
        assert_eq!(b.recv_byte().await.unwrap(), b'+');

        b.send_outcome(Outcome::Match).await.unwrap();
        assert_eq!(a.recv_outcome().await.unwrap(), Outcome::Match);
    }

    #[tokio::test]
    async fn test_dropped_peer_closes_link() {
        let (mut a, b) = channel_pair(4);
        drop(b);

        assert!(matches!(a.recv_byte().await, Err(Error::LinkClosed)));
        assert!(matches!(a.send_byte(0).await, Err(Error::LinkClosed)));
    }
}
