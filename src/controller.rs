//! Per-car worker loop.
//!
//! An [`ElevatorController`] drives exactly one car. Each [`step`] takes the
//! car's lock once to decide and apply the next move, then releases it
//! before emitting events and pacing, so the dispatcher can keep queuing
//! work while the car travels or dwells.
//!
//! # Tick Sequence
//!
//! ```text
//! running? ──no──► Terminated
//!    │
//!   lock ─ plan ─┬─ Idle ──────► set_idle ─ unlock ──────────────► Idle
//!                ├─ Move(d) ───► advance ── unlock ─ emit ─ travel ► Moved
//!                └─ Serve(f) ──► open_doors unlock ─ emit ─ dwell
//!                                                   ─ lock ─ close ► Served
//! ```
//!
//! [`run`] loops over `step`, blocks on the car's wake channel when idle,
//! and exits once termination is observed. A door cycle already started
//! always finishes; whatever is still queued after that is abandoned.
//!
//! [`step`]: ElevatorController::step
//! [`run`]: ElevatorController::run

use std::sync::Arc;

use crate::commands::{Floor, RejectReason};
use crate::events::ElevatorEvent;
use crate::registry::{ElevatorCar, SystemRegistry};
use crate::state::{Direction, Plan, Service};
use crate::traits::{EventSink, Pacer};

/// Result of one controller iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing queued.
    Idle,
    /// Moved one floor, arriving here.
    Moved(Floor),
    /// Completed a door cycle.
    Served(Service),
    /// Termination was observed.
    Terminated,
}

enum Action {
    Idle,
    Moved(Floor, Direction),
    Opened(Service),
}

/// Drives one car until the bank terminates.
pub struct ElevatorController {
    car: Arc<ElevatorCar>,
    registry: Arc<SystemRegistry>,
    sink: Arc<dyn EventSink>,
    pacer: Arc<dyn Pacer>,
}

impl ElevatorController {
    /// Creates a controller for `car`.
    pub fn new(
        car: Arc<ElevatorCar>,
        registry: Arc<SystemRegistry>,
        sink: Arc<dyn EventSink>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            car,
            registry,
            sink,
            pacer,
        }
    }

    /// The car this controller drives.
    pub fn car(&self) -> &Arc<ElevatorCar> {
        &self.car
    }

    /// Run one iteration.
    pub fn step(&self) -> Step {
        if !self.registry.is_running() {
            return Step::Terminated;
        }

        let action = self.car.with_state(|state| match state.plan() {
            Plan::Idle => {
                state.set_idle();
                Action::Idle
            }
            Plan::Move(direction) => Action::Moved(state.advance(direction), direction),
            Plan::Serve(floor) => Action::Opened(state.open_doors(floor)),
        });

        let id = self.car.id();
        match action {
            Action::Idle => Step::Idle,
            Action::Moved(floor, direction) => {
                log::debug!("elevator {} moving {} to floor {}", id, direction, floor);
                self.sink.emit(ElevatorEvent::Moved {
                    elevator: id,
                    floor,
                    direction,
                });
                self.pacer.travel(id);
                Step::Moved(floor)
            }
            Action::Opened(service) => {
                log::debug!(
                    "elevator {} doors open at floor {} (-{} +{}, {} aboard)",
                    id,
                    service.floor,
                    service.alighted,
                    service.boarded,
                    service.occupancy
                );
                self.sink.emit(ElevatorEvent::door_opened(id, &service));
                if service.refused > 0 {
                    log::warn!(
                        "elevator {} full at floor {}, {} passenger(s) left waiting",
                        id,
                        service.floor,
                        service.refused
                    );
                    self.sink.emit(ElevatorEvent::Rejected {
                        elevator: Some(id),
                        floor: service.floor,
                        reason: RejectReason::CapacityExceeded,
                    });
                }
                self.pacer.dwell(id);
                self.car.with_state(|state| state.close_doors());
                Step::Served(service)
            }
        }
    }

    /// Loop until termination, blocking while idle.
    ///
    /// Returns the number of requests abandoned at exit.
    pub fn run(&self) -> usize {
        let id = self.car.id();
        log::debug!("elevator {} worker started", id);
        loop {
            match self.step() {
                Step::Idle => self.car.wait_for_wake(),
                Step::Moved(_) | Step::Served(_) => {}
                Step::Terminated => break,
            }
        }

        let abandoned = self.car.with_state(|state| state.abandon());
        if abandoned > 0 {
            log::warn!(
                "elevator {} stopping with {} pending request(s) abandoned",
                id,
                abandoned
            );
        } else {
            log::info!("elevator {} stopped", id);
        }
        self.sink.emit(ElevatorEvent::Terminated {
            elevator: id,
            abandoned,
        });
        abandoned
    }
}
