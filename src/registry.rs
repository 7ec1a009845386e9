//! Shared per-car state and the set of cars in a bank.
//!
//! [`ElevatorCar`] pairs one car's [`ElevatorState`] with its wake channel.
//! [`SystemRegistry`] owns the fixed list of cars and the bank-wide running
//! flag. Both are shared by `Arc` between the dispatcher and every worker.
//!
//! # Thread Safety
//!
//! - Each car has its own `Mutex`; nothing locks two cars at once.
//! - Lock poisoning is recovered: a panicking worker leaves its car's state
//!   readable for status and shutdown.
//! - The wake channel is `bounded(1)`. A token sent while the worker is busy
//!   stays in the channel, so the next wait returns at once.
//!
//! # Example
//!
//! ```rust
//! use elevator_bank::config::Config;
//! use elevator_bank::registry::SystemRegistry;
//! use elevator_bank::{ElevatorId, InsertOutcome, Direction};
//!
//! let registry = SystemRegistry::new(&Config::default());
//! let car = registry.car(ElevatorId(1)).unwrap();
//!
//! assert_eq!(car.enqueue(4), Ok(InsertOutcome::Queued(Direction::Up)));
//! assert_eq!(car.snapshot().pending_up, vec![4]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::commands::{ElevatorId, Floor, InsertOutcome, RejectReason};
use crate::config::Config;
use crate::state::{ElevatorSnapshot, ElevatorState};

// ============================================================================
// Elevator Car
// ============================================================================

/// One car: its locked state and the channel used to wake its worker.
pub struct ElevatorCar {
    id: ElevatorId,
    state: Mutex<ElevatorState>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl ElevatorCar {
    /// Create a car at floor 0.
    pub fn new(id: ElevatorId, max_floor: Floor, capacity: u32) -> Self {
        let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);
        Self {
            id,
            state: Mutex::new(ElevatorState::new(id, max_floor, capacity)),
            wake_tx,
            wake_rx,
        }
    }

    /// This car's id.
    #[inline]
    pub fn id(&self) -> ElevatorId {
        self.id
    }

    /// Run `f` with the car's lock held.
    ///
    /// Keep `f` short and never call back into another car from inside it.
    pub fn with_state<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ElevatorState) -> R,
    {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Read-only copy of the car's state, taken under its lock.
    pub fn snapshot(&self) -> ElevatorSnapshot {
        self.with_state(|state| state.snapshot())
    }

    /// Hand a floor to this car and wake its worker.
    ///
    /// The wake is sent after the lock is released, and only when the call
    /// added work.
    pub fn enqueue(&self, floor: Floor) -> Result<InsertOutcome, RejectReason> {
        let outcome = self.with_state(|state| state.enqueue(floor))?;
        if outcome.is_new() {
            self.wake();
        }
        Ok(outcome)
    }

    /// Signal the worker. A no-op if a wake is already pending.
    pub fn wake(&self) {
        let _ = self.wake_tx.try_send(());
    }

    /// Block until woken.
    pub fn wait_for_wake(&self) {
        // The car holds its own sender, so the channel never disconnects.
        let _ = self.wake_rx.recv();
    }

    /// Block until woken or `timeout` passes. Returns true if woken.
    pub fn wait_for_wake_timeout(&self, timeout: Duration) -> bool {
        !matches!(
            self.wake_rx.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }
}

impl std::fmt::Debug for ElevatorCar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevatorCar")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

// ============================================================================
// System Registry
// ============================================================================

/// The fixed set of cars plus the bank-wide running flag.
///
/// Cars are created once, at ids `0..elevators`, and never added or removed.
#[derive(Debug)]
pub struct SystemRegistry {
    cars: Vec<Arc<ElevatorCar>>,
    max_floor: Floor,
    running: AtomicBool,
}

impl SystemRegistry {
    /// Build the cars described by `config`.
    ///
    /// Does not validate; see [`Config::validate`].
    pub fn new(config: &Config) -> Self {
        let max_floor = config.building.max_floor;
        let cars = (0..config.building.elevators)
            .map(|i| Arc::new(ElevatorCar::new(ElevatorId(i), max_floor, config.elevator.capacity)))
            .collect();
        Self {
            cars,
            max_floor,
            running: AtomicBool::new(true),
        }
    }

    /// All cars in id order.
    pub fn cars(&self) -> &[Arc<ElevatorCar>] {
        &self.cars
    }

    /// The car with this id, if it exists.
    pub fn car(&self, id: ElevatorId) -> Option<&Arc<ElevatorCar>> {
        self.cars.get(id.index())
    }

    /// Number of cars.
    pub fn len(&self) -> usize {
        self.cars.len()
    }

    /// Returns true if there are no cars.
    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Highest valid floor.
    pub fn max_floor(&self) -> Floor {
        self.max_floor
    }

    /// Returns false once termination has been requested.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clear the running flag and wake every car so idle workers notice.
    ///
    /// Returns true on the first call only.
    pub fn request_termination(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        for car in &self.cars {
            car.wake();
        }
        was_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildingConfig;
    use crate::state::Direction;
    use std::thread;

    // === ElevatorCar Tests ===
    #[test]
    fn enqueue_wakes_worker() {
        let car = ElevatorCar::new(ElevatorId(0), 10, 5);
        car.enqueue(3).unwrap();
        assert!(car.wait_for_wake_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn duplicate_enqueue_does_not_wake() {
        let car = ElevatorCar::new(ElevatorId(0), 10, 5);
        car.enqueue(3).unwrap();
        assert!(car.wait_for_wake_timeout(Duration::from_millis(10)));

        assert_eq!(car.enqueue(3), Ok(InsertOutcome::AlreadyQueued(Direction::Up)));
        assert!(!car.wait_for_wake_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn rejected_enqueue_leaves_state_alone() {
        let car = ElevatorCar::new(ElevatorId(0), 10, 5);
        assert_eq!(car.enqueue(12), Err(RejectReason::InvalidFloor));
        assert_eq!(car.snapshot().pending(), 0);
        assert!(!car.wait_for_wake_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn wakes_coalesce() {
        let car = ElevatorCar::new(ElevatorId(0), 10, 5);
        car.wake();
        car.wake();
        car.wake();
        assert!(car.wait_for_wake_timeout(Duration::from_millis(10)));
        assert!(!car.wait_for_wake_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn early_wake_is_not_lost() {
        let car = Arc::new(ElevatorCar::new(ElevatorId(0), 10, 5));
        car.wake();
        let waiter = {
            let car = Arc::clone(&car);
            thread::spawn(move || car.wait_for_wake())
        };
        waiter.join().unwrap();
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let car = Arc::new(ElevatorCar::new(ElevatorId(0), 10, 5));
        let crashing = {
            let car = Arc::clone(&car);
            thread::spawn(move || {
                car.with_state(|_| panic!("worker crashed"));
            })
        };
        assert!(crashing.join().is_err());
        assert_eq!(car.snapshot().current_floor, 0);
        assert!(car.enqueue(2).is_ok());
    }

    // === SystemRegistry Tests ===
    #[test]
    fn registry_builds_configured_cars() {
        let config =
            Config::default().with_building(BuildingConfig::default().with_elevators(4));
        let registry = SystemRegistry::new(&config);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.max_floor(), 10);
        for (i, car) in registry.cars().iter().enumerate() {
            assert_eq!(car.id(), ElevatorId(i));
        }
        assert!(registry.car(ElevatorId(4)).is_none());
    }

    #[test]
    fn termination_is_reported_once_and_wakes_all() {
        let registry = SystemRegistry::new(&Config::default());
        assert!(registry.is_running());
        assert!(registry.request_termination());
        assert!(!registry.request_termination());
        assert!(!registry.is_running());
        for car in registry.cars() {
            assert!(car.wait_for_wake_timeout(Duration::from_millis(10)));
        }
    }
}
