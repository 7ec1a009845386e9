//! Request intake, car selection, and bank lifecycle.
//!
//! A [`Dispatcher`] owns the [`SystemRegistry`] and one worker thread per
//! car. It is the only entry point for new work:
//!
//! - [`request_floor`](Dispatcher::request_floor): send a car (named, or
//!   chosen by the [`DispatchPolicy`]) to a floor
//! - [`exchange`](Dispatcher::exchange): register passengers at a floor and
//!   send the named car there
//! - [`status`](Dispatcher::status): snapshot every car
//! - [`shutdown`](Dispatcher::shutdown): stop and join every worker
//!
//! # Locking
//!
//! The dispatcher holds at most one car's lock at a time. Choosing a car
//! takes a [`Candidate`] from each car in turn, so the choice may be based on
//! slightly stale views; the request itself is applied under the chosen car's
//! lock.
//!
//! # Example
//!
//! ```rust
//! use elevator_bank::config::Config;
//! use elevator_bank::hal::InstantPacer;
//! use elevator_bank::{Dispatcher, ElevatorId};
//!
//! let bank = Dispatcher::builder(Config::default())
//!     .with_pacer(InstantPacer::new())
//!     .start()
//!     .unwrap();
//!
//! // All cars start at floor 0, so the lowest id wins the tie.
//! let assignment = bank.request_floor(None, 5).unwrap();
//! assert_eq!(assignment.elevator, ElevatorId(0));
//!
//! assert!(bank.request_floor(None, 42).is_err());
//! bank.shutdown();
//! ```

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::commands::{Assignment, DispatchError, ElevatorId, Floor, RejectReason};
use crate::config::Config;
use crate::controller::ElevatorController;
use crate::events::{ElevatorEvent, LogSink};
use crate::hal::SleepPacer;
use crate::registry::{ElevatorCar, SystemRegistry};
use crate::state::ElevatorSnapshot;
use crate::traits::{Candidate, DispatchPolicy, EventSink, Pacer};

// ============================================================================
// Builder
// ============================================================================

/// Configures and starts a [`Dispatcher`].
///
/// Defaults: events go to [`LogSink`], pacing is a [`SleepPacer`] built from
/// the config's timing section, and the policy comes from the config's
/// dispatch section.
pub struct DispatcherBuilder {
    config: Config,
    sink: Option<Arc<dyn EventSink>>,
    pacer: Option<Arc<dyn Pacer>>,
    policy: Option<Box<dyn DispatchPolicy>>,
}

impl DispatcherBuilder {
    /// Start from a config.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink: None,
            pacer: None,
            policy: None,
        }
    }

    /// Send events to `sink`.
    pub fn with_sink<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Pace cars with `pacer`.
    pub fn with_pacer<P: Pacer + 'static>(mut self, pacer: P) -> Self {
        self.pacer = Some(Arc::new(pacer));
        self
    }

    /// Choose cars with `policy`, overriding the config.
    pub fn with_policy<D: DispatchPolicy + 'static>(mut self, policy: D) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Validate the config, build the cars, and spawn one worker per car.
    ///
    /// Workers are named `elevator-<id>`. An invalid config fails with
    /// [`io::ErrorKind::InvalidInput`]; if a spawn fails, the workers already
    /// started are stopped before the error is returned.
    pub fn start(self) -> io::Result<Dispatcher> {
        self.config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let registry = Arc::new(SystemRegistry::new(&self.config));
        let sink = self.sink.unwrap_or_else(|| Arc::new(LogSink));
        let pacer = self
            .pacer
            .unwrap_or_else(|| Arc::new(SleepPacer::from_config(&self.config.timing)));
        let policy = self
            .policy
            .unwrap_or_else(|| self.config.dispatch.policy.build());

        let mut workers = Vec::with_capacity(registry.len());
        for car in registry.cars() {
            let controller = ElevatorController::new(
                Arc::clone(car),
                Arc::clone(&registry),
                Arc::clone(&sink),
                Arc::clone(&pacer),
            );
            let spawned = thread::Builder::new()
                .name(format!("elevator-{}", car.id()))
                .spawn(move || controller.run());
            match spawned {
                Ok(handle) => workers.push((car.id(), handle)),
                Err(e) => {
                    log::error!("failed to spawn worker for elevator {}: {}", car.id(), e);
                    registry.request_termination();
                    join_all(workers);
                    return Err(e);
                }
            }
        }

        log::info!(
            "elevator bank started: {} elevator(s), floors 0 to {}, capacity {}, policy {}",
            registry.len(),
            registry.max_floor(),
            self.config.elevator.capacity,
            policy.name()
        );

        Ok(Dispatcher {
            registry,
            sink,
            policy,
            workers: Mutex::new(workers),
        })
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// What [`Dispatcher::shutdown`] found when joining the workers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Requests each car dropped on exit, in id order.
    pub abandoned: Vec<(ElevatorId, usize)>,
    /// Cars whose worker had panicked.
    pub panicked: Vec<ElevatorId>,
}

impl ShutdownReport {
    /// Sum of all abandoned requests.
    pub fn total_abandoned(&self) -> usize {
        self.abandoned.iter().map(|(_, n)| n).sum()
    }

    /// Workers joined (cleanly or not) by this call.
    pub fn joined(&self) -> usize {
        self.abandoned.len() + self.panicked.len()
    }
}

/// A running elevator bank.
///
/// Dropping it performs [`shutdown`](Self::shutdown).
pub struct Dispatcher {
    registry: Arc<SystemRegistry>,
    sink: Arc<dyn EventSink>,
    policy: Box<dyn DispatchPolicy>,
    workers: Mutex<Vec<(ElevatorId, JoinHandle<usize>)>>,
}

impl Dispatcher {
    /// Start configuring a bank.
    pub fn builder(config: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(config)
    }

    /// Start a bank with default sink, pacer, and policy.
    pub fn start(config: Config) -> io::Result<Self> {
        DispatcherBuilder::new(config).start()
    }

    /// Send a car to `floor`.
    ///
    /// With `Some(id)` that car gets the request; with `None` the policy
    /// picks one. Every refusal is also emitted as a `Rejected` event.
    pub fn request_floor(
        &self,
        elevator: Option<ElevatorId>,
        floor: Floor,
    ) -> Result<Assignment, DispatchError> {
        let car = self.admit(elevator, floor)?;
        let outcome = car
            .enqueue(floor)
            .map_err(|reason| self.refuse(Some(car.id()), floor, reason))?;

        log::info!(
            "floor {} -> elevator {} ({:?})",
            floor,
            car.id(),
            outcome
        );
        Ok(Assignment {
            elevator: car.id(),
            floor,
            outcome,
        })
    }

    /// Register passengers waiting at `floor` and send `elevator` there.
    ///
    /// `boarding` people get on and `alighting` people get off when the car
    /// next opens its doors at that floor. Boarding beyond capacity is cut
    /// and reported as a `CapacityExceeded` rejection at that time.
    pub fn exchange(
        &self,
        elevator: ElevatorId,
        floor: Floor,
        boarding: u32,
        alighting: u32,
    ) -> Result<Assignment, DispatchError> {
        let car = self.admit(Some(elevator), floor)?;
        let outcome = car
            .with_state(|state| {
                state.register_exchange(floor, boarding, alighting)?;
                state.enqueue(floor)
            })
            .map_err(|reason| self.refuse(Some(elevator), floor, reason))?;
        if outcome.is_new() {
            car.wake();
        }

        log::info!(
            "elevator {} to floor {}: {} boarding, {} alighting",
            elevator,
            floor,
            boarding,
            alighting
        );
        Ok(Assignment {
            elevator,
            floor,
            outcome,
        })
    }

    /// One snapshot per car, in id order. Each is taken under that car's
    /// lock alone.
    pub fn status(&self) -> Vec<ElevatorSnapshot> {
        self.registry.cars().iter().map(|car| car.snapshot()).collect()
    }

    /// Snapshot of one car.
    pub fn snapshot(&self, elevator: ElevatorId) -> Option<ElevatorSnapshot> {
        self.registry.car(elevator).map(|car| car.snapshot())
    }

    /// Number of cars.
    pub fn elevators(&self) -> usize {
        self.registry.len()
    }

    /// Highest valid floor.
    pub fn max_floor(&self) -> Floor {
        self.registry.max_floor()
    }

    /// Returns false once shutdown has started.
    pub fn is_running(&self) -> bool {
        self.registry.is_running()
    }

    /// Name of the active dispatch policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Stop every worker and wait for all of them.
    ///
    /// Idempotent: later calls find nothing to join and return an empty
    /// report. A panicked worker is logged and does not stop the others
    /// from being joined.
    pub fn shutdown(&self) -> ShutdownReport {
        if self.registry.request_termination() {
            log::info!("shutting down elevator bank");
        }
        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let report = join_all(workers);
        if report.joined() > 0 {
            log::info!(
                "elevator bank stopped, {} request(s) abandoned",
                report.total_abandoned()
            );
        }
        report
    }

    /// Common checks for every request: running, floor in range, car exists.
    fn admit(
        &self,
        elevator: Option<ElevatorId>,
        floor: Floor,
    ) -> Result<&Arc<ElevatorCar>, DispatchError> {
        if !self.registry.is_running() {
            self.emit_rejection(elevator, floor, RejectReason::ShuttingDown);
            return Err(DispatchError::ShuttingDown);
        }

        let max_floor = self.registry.max_floor();
        if !(0..=max_floor).contains(&floor) {
            self.emit_rejection(elevator, floor, RejectReason::InvalidFloor);
            return Err(DispatchError::InvalidFloor { floor, max_floor });
        }

        let id = match elevator {
            Some(id) => id,
            None => self.choose(floor),
        };
        self.registry.car(id).ok_or_else(|| {
            self.emit_rejection(None, floor, RejectReason::UnknownElevator);
            DispatchError::UnknownElevator(id)
        })
    }

    fn choose(&self, floor: Floor) -> ElevatorId {
        let candidates: Vec<Candidate> = self
            .registry
            .cars()
            .iter()
            .map(|car| car.with_state(|state| Candidate::from_state(state)))
            .collect();
        // The registry is never empty once started.
        self.policy
            .choose(&candidates, floor)
            .unwrap_or(ElevatorId(0))
    }

    fn refuse(
        &self,
        elevator: Option<ElevatorId>,
        floor: Floor,
        reason: RejectReason,
    ) -> DispatchError {
        self.emit_rejection(elevator, floor, reason);
        match (reason, elevator) {
            (RejectReason::ShuttingDown, _) => DispatchError::ShuttingDown,
            (RejectReason::UnknownElevator, Some(id)) => DispatchError::UnknownElevator(id),
            // State-level refusals are range checks.
            _ => DispatchError::InvalidFloor {
                floor,
                max_floor: self.registry.max_floor(),
            },
        }
    }

    fn emit_rejection(&self, elevator: Option<ElevatorId>, floor: Floor, reason: RejectReason) {
        self.sink.emit(ElevatorEvent::Rejected {
            elevator,
            floor,
            reason,
        });
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("elevators", &self.registry.len())
            .field("max_floor", &self.registry.max_floor())
            .field("policy", &self.policy.name())
            .field("running", &self.registry.is_running())
            .finish()
    }
}

fn join_all(workers: Vec<(ElevatorId, JoinHandle<usize>)>) -> ShutdownReport {
    let mut report = ShutdownReport::default();
    for (id, handle) in workers {
        match handle.join() {
            Ok(abandoned) => report.abandoned.push((id, abandoned)),
            Err(_) => {
                log::error!("elevator {} worker panicked", id);
                report.panicked.push(id);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildingConfig;
    use crate::hal::{InstantPacer, RecordingSink};
    use crate::traits::DirectionAware;

    fn bank(sink: Arc<RecordingSink>) -> Dispatcher {
        Dispatcher::builder(Config::default())
            .with_sink(sink)
            .with_pacer(InstantPacer::new())
            .start()
            .unwrap()
    }

    // === Start Tests ===
    #[test]
    fn start_rejects_invalid_config() {
        let config =
            Config::default().with_building(BuildingConfig::default().with_elevators(0));
        let err = Dispatcher::builder(config)
            .with_pacer(InstantPacer::new())
            .start()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn with_policy_overrides_config() {
        let sink = Arc::new(RecordingSink::new());
        let bank = Dispatcher::builder(Config::default())
            .with_sink(sink)
            .with_pacer(InstantPacer::new())
            .with_policy(DirectionAware)
            .start()
            .unwrap();
        assert_eq!(bank.policy_name(), "direction-aware");
    }

    // === Request Tests ===
    #[test]
    fn out_of_range_is_rejected_without_mutation() {
        let sink = Arc::new(RecordingSink::new());
        let bank = bank(sink.clone());

        assert_eq!(
            bank.request_floor(None, 11),
            Err(DispatchError::InvalidFloor {
                floor: 11,
                max_floor: 10
            })
        );
        assert_eq!(
            bank.request_floor(Some(ElevatorId(1)), -1).unwrap_err().reason(),
            RejectReason::InvalidFloor
        );
        assert!(bank.status().iter().all(|s| s.pending() == 0));
        assert_eq!(sink.count(|e| e.is_rejection()), 2);
    }

    #[test]
    fn unknown_elevator_is_rejected() {
        let sink = Arc::new(RecordingSink::new());
        let bank = bank(sink.clone());
        assert_eq!(
            bank.request_floor(Some(ElevatorId(9)), 3),
            Err(DispatchError::UnknownElevator(ElevatorId(9)))
        );
        assert_eq!(
            bank.exchange(ElevatorId(3), 3, 1, 0),
            Err(DispatchError::UnknownElevator(ElevatorId(3)))
        );
    }

    #[test]
    fn requests_after_shutdown_fail() {
        let sink = Arc::new(RecordingSink::new());
        let bank = bank(sink.clone());
        bank.shutdown();
        assert_eq!(bank.request_floor(None, 2), Err(DispatchError::ShuttingDown));
        assert!(!bank.is_running());
        assert!(sink.wait_for(
            |e| matches!(
                e,
                ElevatorEvent::Rejected {
                    reason: RejectReason::ShuttingDown,
                    ..
                }
            ),
            std::time::Duration::ZERO
        ));
    }

    #[test]
    fn request_racing_a_stopped_car_is_refused() {
        let sink = Arc::new(RecordingSink::new());
        let bank = bank(sink.clone());
        // The car's worker has already dropped its queues, but the bank-wide
        // flag has not been observed by this caller yet.
        let car = bank.registry.car(ElevatorId(1)).unwrap();
        car.with_state(|s| s.abandon());
        assert!(bank.is_running());

        assert_eq!(
            bank.request_floor(Some(ElevatorId(1)), 4),
            Err(DispatchError::ShuttingDown)
        );
        assert_eq!(
            bank.exchange(ElevatorId(1), 4, 2, 0),
            Err(DispatchError::ShuttingDown)
        );
        assert_eq!(car.snapshot().pending(), 0);
        assert_eq!(
            sink.count(|e| matches!(
                e,
                ElevatorEvent::Rejected {
                    elevator: Some(ElevatorId(1)),
                    reason: RejectReason::ShuttingDown,
                    ..
                }
            )),
            2
        );
    }

    // === Shutdown Tests ===
    #[test]
    fn shutdown_is_idempotent() {
        let sink = Arc::new(RecordingSink::new());
        let bank = bank(sink.clone());
        let first = bank.shutdown();
        assert_eq!(first.joined(), 3);
        assert!(first.panicked.is_empty());

        let second = bank.shutdown();
        assert_eq!(second, ShutdownReport::default());
        assert_eq!(
            sink.count(|e| matches!(e, ElevatorEvent::Terminated { .. })),
            3
        );
    }

    #[test]
    fn status_lists_every_car() {
        let bank = bank(Arc::new(RecordingSink::new()));
        let status = bank.status();
        assert_eq!(status.len(), 3);
        for (i, snap) in status.iter().enumerate() {
            assert_eq!(snap.id, ElevatorId(i));
        }
        assert!(bank.snapshot(ElevatorId(3)).is_none());
    }
}
