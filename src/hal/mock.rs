//! Test doubles for pacing and event capture.
//!
//! These let the full threaded bank run in tests without real delays, and
//! let a test freeze a car between floors to observe it mid-trip.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`InstantPacer`] | [`Pacer`] | No delays, counts ticks |
//! | [`GatedPacer`] | [`Pacer`] | Each floor of travel (and optionally each dwell) waits for a permit |
//! | [`RecordingSink`] | [`EventSink`] | Keeps every event for assertions |
//!
//! # Example
//!
//! ```rust
//! use elevator_bank::config::{Config, TimingConfig};
//! use elevator_bank::hal::{InstantPacer, RecordingSink};
//! use elevator_bank::{Dispatcher, ElevatorEvent};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let bank = Dispatcher::builder(Config::default())
//!     .with_sink(sink.clone())
//!     .with_pacer(InstantPacer::new())
//!     .start()
//!     .unwrap();
//!
//! bank.request_floor(None, 3).unwrap();
//! assert!(sink.wait_for(
//!     |e| matches!(e, ElevatorEvent::DoorOpened { floor: 3, .. }),
//!     Duration::from_secs(5),
//! ));
//! bank.shutdown();
//! ```
//!
//! [`Pacer`]: crate::traits::Pacer
//! [`EventSink`]: crate::traits::EventSink

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::commands::ElevatorId;
use crate::events::ElevatorEvent;
use crate::traits::{EventSink, Pacer};

const POLL: Duration = Duration::from_millis(2);

// ============================================================================
// Pacing Mocks
// ============================================================================

/// Pacer that never waits.
///
/// Counts calls so tests can check how many floors were travelled.
#[derive(Debug, Default)]
pub struct InstantPacer {
    travels: AtomicUsize,
    dwells: AtomicUsize,
}

impl InstantPacer {
    /// Creates a new pacer with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Floors travelled so far, across all cars.
    pub fn travels(&self) -> usize {
        self.travels.load(Ordering::SeqCst)
    }

    /// Door cycles so far, across all cars.
    pub fn dwells(&self) -> usize {
        self.dwells.load(Ordering::SeqCst)
    }
}

impl Pacer for InstantPacer {
    fn travel(&self, _elevator: ElevatorId) {
        self.travels.fetch_add(1, Ordering::SeqCst);
    }

    fn dwell(&self, _elevator: ElevatorId) {
        self.dwells.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pacer whose travel ticks each need a permit.
///
/// A car that has just moved one floor blocks in [`Pacer::travel`] until a
/// permit is [`release`](Self::release)d, or until the gate is
/// [`open`](Self::open)ed for good. Door dwell passes freely unless the
/// gate was built with [`with_dwell_gate`](Self::with_dwell_gate), in which
/// case it takes permits from the same pool.
///
/// ```rust
/// use elevator_bank::hal::GatedPacer;
/// use elevator_bank::traits::Pacer;
/// use elevator_bank::ElevatorId;
///
/// let gate = GatedPacer::new();
/// gate.release(1);
/// gate.travel(ElevatorId(0)); // consumes the permit
/// gate.open();
/// gate.travel(ElevatorId(0)); // passes freely
/// assert_eq!(gate.travels(), 2);
/// ```
#[derive(Debug)]
pub struct GatedPacer {
    permits_tx: Sender<()>,
    permits_rx: Receiver<()>,
    open: AtomicBool,
    gate_dwell: bool,
    travels: AtomicUsize,
    dwells: AtomicUsize,
    waiting: AtomicUsize,
}

impl GatedPacer {
    /// Creates a closed gate with no permits.
    pub fn new() -> Self {
        let (permits_tx, permits_rx) = crossbeam_channel::unbounded();
        Self {
            permits_tx,
            permits_rx,
            open: AtomicBool::new(false),
            gate_dwell: false,
            travels: AtomicUsize::new(0),
            dwells: AtomicUsize::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Also hold cars with their doors open until a permit is released.
    pub fn with_dwell_gate(mut self) -> Self {
        self.gate_dwell = true;
        self
    }

    /// Let `n` more floors of travel through.
    pub fn release(&self, n: usize) {
        for _ in 0..n {
            let _ = self.permits_tx.send(());
        }
    }

    /// Stop gating; every current and future travel tick passes.
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    /// Travel ticks started so far (including ones still waiting).
    pub fn travels(&self) -> usize {
        self.travels.load(Ordering::SeqCst)
    }

    /// Door dwells started so far (including ones still waiting).
    pub fn dwells(&self) -> usize {
        self.dwells.load(Ordering::SeqCst)
    }

    /// Workers currently held at the gate.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Block until at least `n` workers are held at the gate.
    pub fn wait_for_waiting(&self, n: usize, timeout: Duration) -> bool {
        poll_until(timeout, || self.waiting() >= n)
    }

    fn hold(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        while !self.open.load(Ordering::SeqCst) {
            if self.permits_rx.recv_timeout(POLL).is_ok() {
                break;
            }
        }
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for GatedPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for GatedPacer {
    fn travel(&self, _elevator: ElevatorId) {
        self.travels.fetch_add(1, Ordering::SeqCst);
        self.hold();
    }

    fn dwell(&self, _elevator: ElevatorId) {
        self.dwells.fetch_add(1, Ordering::SeqCst);
        if self.gate_dwell {
            self.hold();
        }
    }
}

// ============================================================================
// Event Mocks
// ============================================================================

/// Sink that records every event.
///
/// Share it with the dispatcher through an `Arc` and inspect it from the
/// test thread.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ElevatorEvent>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in arrival order.
    pub fn events(&self) -> Vec<ElevatorEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events concerning one car, in the order that car produced them.
    pub fn events_for(&self, elevator: ElevatorId) -> Vec<ElevatorEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.elevator() == Some(elevator))
            .collect()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&ElevatorEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| pred(e))
            .count()
    }

    /// Wait until some recorded event matches `pred`. Returns false on timeout.
    pub fn wait_for(&self, pred: impl Fn(&ElevatorEvent) -> bool, timeout: Duration) -> bool {
        poll_until(timeout, || self.count(&pred) > 0)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ElevatorEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

fn poll_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(POLL);
    }
}
