//! Mock datagram transport for unit testing.
//!
//! Inbound datagrams are queued with [`MockTransport::push_datagram`] (or a
//! failure with [`MockTransport::push_receive_error`]); outbound datagrams are
//! recorded in `sent` so tests can assert exactly what left the process and in
//! what order.
//!
//! When the inbound queue runs dry, `receive` returns a `WouldBlock` error and,
//! if a stop flag was attached with [`MockTransport::stop_when_drained`],
//! clears it so a relay loop under test exits after its next iteration.

use std::collections::VecDeque;
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use super::{DatagramTransport, TransportError};

/// A mock implementation of [`DatagramTransport`].
#[derive(Default)]
pub struct MockTransport {
    inbound: Mutex<VecDeque<Result<Vec<u8>, io::ErrorKind>>>,
    /// Every payload passed to `send`, in order.
    pub sent: Mutex<Vec<Vec<u8>>>,
    /// When `true`, `send` fails with `ConnectionRefused` and records nothing.
    pub fail_sends: AtomicBool,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl MockTransport {
    /// Creates a mock with no queued datagrams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `running` once every queued datagram has been received.
    pub fn stop_when_drained(mut self, running: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(running);
        self
    }

    /// Queues one inbound datagram.
    pub fn push_datagram(&self, payload: impl Into<Vec<u8>>) {
        self.inbound
            .lock()
            .expect("lock poisoned")
            .push_back(Ok(payload.into()));
    }

    /// Queues one failed receive.
    pub fn push_receive_error(&self, kind: io::ErrorKind) {
        self.inbound
            .lock()
            .expect("lock poisoned")
            .push_back(Err(kind));
    }

    /// Returns a copy of every datagram sent so far.
    pub fn sent_datagrams(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("lock poisoned").clone()
    }

    fn drained(&self) -> TransportError {
        if let Some(flag) = &self.stop_flag {
            flag.store(false, Ordering::SeqCst);
        }
        TransportError::Receive(io::Error::new(io::ErrorKind::WouldBlock, "no datagram queued"))
    }
}

impl DatagramTransport for MockTransport {
    fn send(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock send failure",
            )));
        }
        self.sent.lock().expect("lock poisoned").push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn receive(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let next = self.inbound.lock().expect("lock poisoned").pop_front();
        match next {
            Some(Ok(payload)) => {
                // Same truncation a real datagram socket applies.
                let len = payload.len().min(buf.len());
                buf[..len].copy_from_slice(&payload[..len]);
                Ok(len)
            }
            Some(Err(kind)) => Err(TransportError::Receive(io::Error::new(kind, "mock receive failure"))),
            None => Err(self.drained()),
        }
    }
}
