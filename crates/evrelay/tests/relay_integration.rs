//! End-to-end tests: a capture loop and an inject loop talking over real
//! loopback UDP sockets, with mock devices at both ends.
//!
//! # What is being exercised?
//!
//! ```text
//! MockDevice ──read──▶ CaptureLoop ──UDP──▶ InjectLoop ──write──▶ MockDevice
//!  (scripted)          (pre-filter)          (predicate)          (recorded)
//! ```
//!
//! Datagrams sent on loopback are queued in the receiving socket's buffer, so
//! the capture side can run to completion before the inject side starts
//! receiving.  No timing assumptions are needed.

use std::net::UdpSocket;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};
use std::thread;

use evrelay::application::{CaptureLoop, CaptureStats, InjectLoop};
use evrelay::infrastructure::device::{mock::MockDevice, DeviceError, EventSink};
use evrelay::infrastructure::transport::{DatagramTransport, TransportError, UdpEndpoint};
use evrelay_core::protocol::record::{EV_ABS, EV_KEY, EV_LED, EV_REL, EV_SYN, REL_DIAL, REL_X, SYN_REPORT};
use evrelay_core::{encode_batch, InputEventRecord, RECORD_SIZE};

/// How many times to retry a setup that lost its port to another process.
const SETUP_ATTEMPTS: usize = 5;

/// Returns `N` distinct UDP ports that were free a moment ago.
///
/// All placeholder sockets are held until every port is known, so the ports
/// never collide with each other.  Another process may still grab one before the
/// caller binds it; callers retry on [`TransportError::BindFailed`].
fn free_ports<const N: usize>() -> [u16; N] {
    let holders: Vec<UdpSocket> = (0..N)
        .map(|_| UdpSocket::bind("127.0.0.1:0").expect("reserve port"))
        .collect();
    let mut ports = [0u16; N];
    for (port, holder) in ports.iter_mut().zip(&holders) {
        *port = holder.local_addr().unwrap().port();
    }
    ports
}

/// Two endpoints on loopback, each pointed at the other.
fn endpoint_pair() -> (UdpEndpoint, UdpEndpoint) {
    for _ in 0..SETUP_ATTEMPTS {
        let [capture_port, inject_port] = free_ports::<2>();
        let pair = UdpEndpoint::setup("127.0.0.1", capture_port, inject_port).and_then(|capture| {
            UdpEndpoint::setup("127.0.0.1", inject_port, capture_port).map(|inject| (capture, inject))
        });
        match pair {
            Ok(pair) => return pair,
            Err(TransportError::BindFailed { .. }) => continue,
            Err(e) => panic!("endpoint setup failed: {e}"),
        }
    }
    panic!("no free port pair after {SETUP_ATTEMPTS} attempts");
}

#[test]
fn test_key_tap_relayed_end_to_end_in_order() {
    // Arrange: the capture device yields a key press, release, and sync.
    let tap = [
        InputEventRecord::new(EV_KEY, 30, 1).with_timestamp(1_700_000_000, 10),
        InputEventRecord::new(EV_KEY, 30, 0).with_timestamp(1_700_000_000, 20),
        InputEventRecord::new(EV_SYN, SYN_REPORT, 0).with_timestamp(1_700_000_000, 30),
    ];
    let (capture_end, inject_end) = endpoint_pair();
    let running = Arc::new(AtomicBool::new(true));
    let mut source = MockDevice::new().stop_when_drained(Arc::clone(&running));
    for record in tap {
        source.push_record(record);
    }

    // Act: capture runs until its script is exhausted.
    let mut capture = CaptureLoop::new(source, capture_end);
    let stats = capture.run(&running);

    // Then inject receives one datagram per record.
    let mut inject = InjectLoop::new(inject_end, MockDevice::new());
    let reports: Vec<_> = (0..3).map(|_| inject.step().expect("receive")).collect();

    // Assert
    assert_eq!(stats.sent, 3);
    assert!(reports.iter().all(|r| r.records == 1 && r.written == 1));
    let (_, target) = inject.into_parts();
    assert_eq!(target.written_records(), tap.to_vec());
    assert!(target.written.iter().all(|w| w.len() == RECORD_SIZE));
}

#[test]
fn test_two_gate_filtering_end_to_end() {
    // Arrange
    let script = [
        InputEventRecord::new(EV_LED, 0, 1),      // stopped by the pre-filter
        InputEventRecord::new(EV_ABS, 0, 300),    // sent, rejected on arrival
        InputEventRecord::new(EV_REL, REL_DIAL, 1), // sent, rejected on arrival
        InputEventRecord::new(EV_REL, REL_X, -6), // relayed
        InputEventRecord::new(EV_SYN, SYN_REPORT, 0), // relayed
    ];
    let (capture_end, inject_end) = endpoint_pair();
    let running = Arc::new(AtomicBool::new(true));
    let mut source = MockDevice::new().stop_when_drained(Arc::clone(&running));
    for record in script {
        source.push_record(record);
    }

    // Act
    let stats = CaptureLoop::new(source, capture_end).run(&running);
    let mut inject = InjectLoop::new(inject_end, MockDevice::new());
    for _ in 0..4 {
        inject.step().expect("receive");
    }

    // Assert
    assert_eq!(
        stats,
        CaptureStats {
            read: 5,
            sent: 4,
            skipped: 1,
            faults: 1,
        }
    );
    assert_eq!(inject.stats().rejected, 2);
    let (_, target) = inject.into_parts();
    assert_eq!(target.written_records(), vec![script[3], script[4]]);
}

#[test]
fn test_multi_record_datagram_with_trailing_bytes() {
    // Arrange: a raw peer sends one datagram holding two records and a stub.
    let (peer, inject_end) = endpoint_pair();
    let mut payload = encode_batch(&[
        InputEventRecord::new(EV_KEY, 48, 1),
        InputEventRecord::new(EV_SYN, SYN_REPORT, 0),
    ]);
    payload.extend_from_slice(&[0xEE; 5]);
    peer.send(&payload).expect("send");

    // Act
    let mut inject = InjectLoop::new(inject_end, MockDevice::new());
    let report = inject.step().expect("receive");

    // Assert
    assert_eq!(report.records, 2);
    assert_eq!(report.trailing_bytes, 5);
    assert_eq!(report.written, 2);
}

#[test]
fn test_runt_datagram_writes_nothing() {
    let (peer, inject_end) = endpoint_pair();
    peer.send(&[0u8; RECORD_SIZE - 1]).expect("send");

    let mut inject = InjectLoop::new(inject_end, MockDevice::new());
    let report = inject.step().expect("a runt datagram is not a fault");

    assert_eq!(report.records, 0);
    assert!(report.write_faults.is_empty());
    let (_, target) = inject.into_parts();
    assert!(target.written.is_empty());
}

/// A sink that reports each completed write on a channel.
struct SignallingSink(mpsc::Sender<InputEventRecord>);

impl EventSink for SignallingSink {
    fn write_event(&mut self, bytes: &[u8]) -> Result<usize, DeviceError> {
        if let Ok(record) = evrelay_core::decode_record(bytes) {
            let _ = self.0.send(record);
        }
        Ok(bytes.len())
    }
}

#[test]
fn test_inject_loop_stops_after_flag_cleared() {
    // Arrange
    let (peer, inject_end) = endpoint_pair();
    let running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = mpsc::channel();
    let handle = {
        let running = Arc::clone(&running);
        thread::spawn(move || InjectLoop::new(inject_end, SignallingSink(tx)).run(&running))
    };

    // Act: relay one record and wait until it has been written.
    let press = InputEventRecord::new(EV_KEY, 30, 1);
    peer.send(&press.to_bytes()).expect("send");
    assert_eq!(rx.recv().expect("first write"), press);

    // Clear the flag, then wake the receive the loop may be parked in.
    running.store(false, Ordering::SeqCst);
    peer.send(&InputEventRecord::new(EV_SYN, SYN_REPORT, 0).to_bytes())
        .expect("wake send");
    let stats = handle.join().expect("inject thread");

    // Assert: the loop exited after at most the wake-up datagram.
    assert!((1..=2).contains(&stats.datagrams), "{stats:?}");
    assert_eq!(stats.faults, 0);
}

#[test]
fn test_setup_rejects_bad_peer_address_before_binding() {
    for _ in 0..SETUP_ATTEMPTS {
        let [port] = free_ports::<1>();
        let result = UdpEndpoint::setup("300.1.1.1", port, 5005);
        assert!(matches!(result, Err(TransportError::InvalidAddress { .. })));

        // Nothing was bound, so the same port is still available.
        match UdpEndpoint::setup("127.0.0.1", port, 5005) {
            Ok(endpoint) => return endpoint.teardown(),
            Err(TransportError::BindFailed { .. }) => continue,
            Err(e) => panic!("unexpected setup error: {e}"),
        }
    }
    panic!("port kept being taken after {SETUP_ATTEMPTS} attempts");
}
