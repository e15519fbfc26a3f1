//! TCP link transport.
//!
//! Carries the raw byte stream over a TCP connection so the two nodes can
//! run as separate processes. The local node listens, the remote node
//! connects; afterwards both sides use the same [`Link`] interface as the
//! in-memory transport.
//!
//! Unlike the in-process transport, a broken connection is observable
//! here: a closed socket surfaces as `Error::LinkClosed` on receive
//! instead of blocking forever.

use crate::Link;
use doorlock_core::{Error, Result};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// One end of a TCP byte link.
pub struct TcpLink {
    stream: TcpStream,
}

impl TcpLink {
    /// Connect to a listening peer.
    ///
    /// The connection is configured with TCP_NODELAY: the protocol moves
    /// one byte at a time and would otherwise stall on Nagle batching.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer refuses the connection or the network
    /// is unreachable.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        info!(%addr, "connecting to peer");
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already established connection.
    pub fn from_stream(stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {} - latency may be impacted", e);
        }
        Self { stream }
    }

    /// Address of the connected peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is no longer connected.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

impl Link for TcpLink {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.stream.write_u8(byte).await?;
        Ok(())
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        match self.stream.read_u8().await {
            Ok(byte) => Ok(byte),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("peer closed connection");
                Err(Error::LinkClosed)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Listener for incoming link connections.
///
/// The local node binds one of these and accepts a single connection from
/// the remote node.
///
/// # Examples
///
/// ```no_run
/// use doorlock_link::{Link, TcpLink, TcpLinkListener};
///
/// # async fn example() -> doorlock_core::Result<()> {
/// let listener = TcpLinkListener::bind("127.0.0.1:0".parse().unwrap()).await?;
/// let addr = listener.local_addr()?;
///
/// // The remote node connects to `addr`...
/// let mut link = listener.accept().await?;
/// let byte = link.recv_byte().await?;
/// # Ok(())
/// # }
/// ```
pub struct TcpLinkListener {
    listener: TcpListener,
}

impl TcpLinkListener {
    /// Bind to the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is already in use or cannot be
    /// bound.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening for peer");
        Ok(Self { listener })
    }

    /// Address the listener is bound to.
    ///
    /// Useful when binding to port 0 and letting the OS pick a port.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be determined.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept one connection from the peer.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting the connection fails.
    pub async fn accept(&self) -> Result<TcpLink> {
        let (stream, peer) = self.listener.accept().await?;
        debug!(%peer, "peer connected");
        Ok(TcpLink::from_stream(stream))
    }
}
