//! Observable events and the built-in sinks.
//!
//! Every externally visible state change produces one [`ElevatorEvent`],
//! handed to the configured [`EventSink`]. Events are emitted after the car's
//! lock has been released, so a slow sink never blocks dispatch.
//!
//! # Ordering
//!
//! Events from one car arrive in the order they happened. Events from
//! different cars are interleaved arbitrarily.
//!
//! # Sinks
//!
//! | Sink | Behaviour |
//! |------|-----------|
//! | [`LogSink`] | Writes each event through the `log` facade |
//! | `crossbeam_channel::Sender<ElevatorEvent>` | Forwards to a receiver thread |
//! | [`RecordingSink`](crate::hal::RecordingSink) | Keeps everything for assertions |
//!
//! ```rust
//! use elevator_bank::{Direction, ElevatorEvent, ElevatorId, EventSink};
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! tx.emit(ElevatorEvent::Moved {
//!     elevator: ElevatorId(0),
//!     floor: 1,
//!     direction: Direction::Up,
//! });
//!
//! assert_eq!(rx.recv().unwrap().elevator(), Some(ElevatorId(0)));
//! ```

use core::fmt;

use crossbeam_channel::Sender;

use crate::commands::{ElevatorId, Floor, RejectReason};
use crate::state::{Direction, Service};
use crate::traits::EventSink;

/// Something that happened in the elevator bank.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum ElevatorEvent {
    /// A car moved one floor.
    Moved {
        /// Car that moved.
        elevator: ElevatorId,
        /// Floor it arrived at.
        floor: Floor,
        /// Direction of travel.
        direction: Direction,
    },

    /// A car opened its doors and exchanged passengers.
    DoorOpened {
        /// Car that stopped.
        elevator: ElevatorId,
        /// Floor served.
        floor: Floor,
        /// People who got off.
        alighted: u32,
        /// People who got on.
        boarded: u32,
        /// Occupancy after the exchange.
        occupancy: u32,
    },

    /// A request, or part of one, was refused.
    Rejected {
        /// Car involved, if the request got that far.
        elevator: Option<ElevatorId>,
        /// Floor asked for.
        floor: Floor,
        /// Why it was refused.
        reason: RejectReason,
    },

    /// A car's worker stopped.
    Terminated {
        /// Car whose worker exited.
        elevator: ElevatorId,
        /// Pending requests dropped on exit.
        abandoned: usize,
    },
}

impl ElevatorEvent {
    /// Builds the `DoorOpened` event for a completed service.
    pub fn door_opened(elevator: ElevatorId, service: &Service) -> Self {
        ElevatorEvent::DoorOpened {
            elevator,
            floor: service.floor,
            alighted: service.alighted,
            boarded: service.boarded,
            occupancy: service.occupancy,
        }
    }

    /// The car this event concerns, if any.
    pub fn elevator(&self) -> Option<ElevatorId> {
        match self {
            ElevatorEvent::Moved { elevator, .. }
            | ElevatorEvent::DoorOpened { elevator, .. }
            | ElevatorEvent::Terminated { elevator, .. } => Some(*elevator),
            ElevatorEvent::Rejected { elevator, .. } => *elevator,
        }
    }

    /// Returns true for refusals.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ElevatorEvent::Rejected { .. })
    }
}

impl fmt::Display for ElevatorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevatorEvent::Moved {
                elevator,
                floor,
                direction,
            } => write!(f, "[elevator {}] moving {} -> floor {}", elevator, direction, floor),
            ElevatorEvent::DoorOpened {
                elevator,
                floor,
                alighted,
                boarded,
                occupancy,
            } => write!(
                f,
                "[elevator {}] doors open at floor {} (-{} +{}, {} aboard)",
                elevator, floor, alighted, boarded, occupancy
            ),
            ElevatorEvent::Rejected {
                elevator: Some(elevator),
                floor,
                reason,
            } => write!(f, "[elevator {}] rejected floor {}: {}", elevator, floor, reason),
            ElevatorEvent::Rejected {
                elevator: None,
                floor,
                reason,
            } => write!(f, "rejected floor {}: {}", floor, reason),
            ElevatorEvent::Terminated {
                elevator,
                abandoned,
            } => write!(
                f,
                "[elevator {}] stopped ({} request(s) abandoned)",
                elevator, abandoned
            ),
        }
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Sink that writes events through the `log` facade.
///
/// Movements go to `debug`, door cycles and termination to `info`,
/// refusals to `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ElevatorEvent) {
        match &event {
            ElevatorEvent::Moved { .. } => log::debug!("{}", event),
            ElevatorEvent::Rejected { .. } => log::warn!("{}", event),
            ElevatorEvent::DoorOpened { .. } | ElevatorEvent::Terminated { .. } => {
                log::info!("{}", event)
            }
        }
    }
}

impl EventSink for Sender<ElevatorEvent> {
    fn emit(&self, event: ElevatorEvent) {
        // Receiver gone means nobody is listening; dropping is correct.
        let _ = self.send(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
