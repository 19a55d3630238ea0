//! UDP transport endpoint.
//!
//! One process owns exactly one [`UdpEndpoint`]: a socket bound to
//! `0.0.0.0:<local_port>` plus a fixed peer address resolved once at setup.
//! Every outbound datagram goes to that peer.  The origin of inbound datagrams
//! is ignored; only the payload length is trusted.
//!
//! The endpoint is a thin wrapper.  It never retries, never times out, and
//! never sends keepalives.  Loss, duplication, and reordering are accepted
//! as-is.  The only logic it carries is validating the peer address.
//!
//! # Testability
//!
//! The relay loops talk to the [`DatagramTransport`] trait, so tests can
//! substitute [`mock::MockTransport`] for a real socket.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use evrelay_core::{validate_ipv4, AddressError};
use thiserror::Error;
use tracing::{debug, info, trace};

pub mod mock;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured peer address is not a dotted-decimal IPv4 address.
    #[error("invalid peer address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
    /// The OS refused to create a socket (descriptor or buffer exhaustion).
    #[error("failed to create UDP socket: {0}")]
    SocketCreateFailed(#[source] io::Error),
    /// The local port could not be bound.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// `sendto` failed.
    #[error("send error: {0}")]
    Send(#[source] io::Error),
    /// `recvfrom` failed.
    #[error("receive error: {0}")]
    Receive(#[source] io::Error),
}

/// Trait abstracting blocking datagram I/O with a fixed peer.
pub trait DatagramTransport {
    /// Sends `bytes` as one datagram to the peer and returns the count the OS
    /// reported.  No retry on partial send or transient failure.
    fn send(&self, bytes: &[u8]) -> Result<usize, TransportError>;

    /// Blocks until a datagram arrives and copies its payload into `buf`.
    ///
    /// A datagram larger than `buf` is truncated silently; the returned length
    /// never exceeds `buf.len()`.
    fn receive(&self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl<T: DatagramTransport + ?Sized> DatagramTransport for &T {
    fn send(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        (**self).send(bytes)
    }

    fn receive(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).receive(buf)
    }
}

/// The bound local socket plus the fixed remote peer.
#[derive(Debug)]
pub struct UdpEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
}

impl UdpEndpoint {
    /// Validates the peer address, binds `0.0.0.0:local_port`, and fixes the
    /// peer at `remote_address:remote_port`.
    ///
    /// Passing `local_port = 0` lets the OS choose a port; the chosen port is
    /// available from [`UdpEndpoint::local_addr`].
    ///
    /// # Errors
    ///
    /// - [`TransportError::InvalidAddress`] for a malformed peer address.
    /// - [`TransportError::BindFailed`] if the port is unavailable.
    /// - [`TransportError::SocketCreateFailed`] for any other socket failure.
    pub fn setup(
        remote_address: &str,
        local_port: u16,
        remote_port: u16,
    ) -> Result<Self, TransportError> {
        let remote_ip =
            validate_ipv4(remote_address).map_err(|source| TransportError::InvalidAddress {
                address: remote_address.to_string(),
                source,
            })?;

        let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, local_port));
        let socket = UdpSocket::bind(bind_addr).map_err(|e| classify_setup_error(bind_addr, e))?;
        let local_addr = socket.local_addr().unwrap_or(bind_addr);
        let remote_addr = SocketAddr::V4(SocketAddrV4::new(remote_ip, remote_port));

        info!("UDP endpoint bound on {local_addr}, peer {remote_addr}");
        Ok(Self {
            socket,
            local_addr,
            remote_addr,
        })
    }

    /// The address the socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The fixed peer every datagram is sent to.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Closes the socket.
    pub fn teardown(self) {
        debug!("closing UDP endpoint {}", self.local_addr);
        drop(self.socket);
    }
}

impl DatagramTransport for UdpEndpoint {
    fn send(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        self.socket
            .send_to(bytes, self.remote_addr)
            .map_err(TransportError::Send)
    }

    fn receive(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let (len, origin) = self.socket.recv_from(buf).map_err(TransportError::Receive)?;
        trace!("received {len} bytes from {origin}");
        Ok(len)
    }
}

/// Splits a failed `bind` into "port unavailable" and "no socket at all".
fn classify_setup_error(addr: SocketAddr, source: io::Error) -> TransportError {
    match source.kind() {
        io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::InvalidInput => TransportError::BindFailed { addr, source },
        _ => TransportError::SocketCreateFailed(source),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
