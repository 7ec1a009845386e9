//! # elevator-bank
//!
//! Dispatch and scheduling core for a bank of elevators sharing one
//! building, with one worker thread per car.
//!
//! ## Features
//!
//! - **Scan scheduling**: each car drains its up and down queues in order and
//!   reverses only when the active direction runs out of work
//! - **Pluggable dispatch**: nearest car by default, direction-aware on request
//! - **Per-car locking**: no global lock; the dispatcher never holds two cars
//! - **Passenger exchanges**: boarding and alighting counts applied at door
//!   open, bounded by capacity
//! - **Observable**: every move, door cycle, refusal, and exit is an event
//!
//! ## Architecture
//!
//! - `commands` - Ids, outcomes, rejection reasons, dispatch errors
//! - `queue` - Ordered, deduplicated floor queue for one direction
//! - `state` - Per-car state machine and scan rule
//! - `events` - Event type and built-in sinks
//! - `traits` - Seams: event sinks, pacing, dispatch policy
//! - `hal` - Real-time pacer and test doubles
//! - `registry` - Locked cars and the termination flag
//! - `controller` - Per-car worker loop
//! - `dispatcher` - Request intake and lifecycle
//! - `console` - Text command parsing for the simulator binary
//!
//! ## Example
//!
//! ```rust
//! use elevator_bank::{
//!     config::{Config, TimingConfig},
//!     hal::RecordingSink,
//!     Dispatcher, ElevatorEvent, ElevatorId,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let events = Arc::new(RecordingSink::new());
//! let bank = Dispatcher::builder(Config::default().with_timing(TimingConfig::instant()))
//!     .with_sink(events.clone())
//!     .start()
//!     .unwrap();
//!
//! // Car 2 picks up three people at floor 4.
//! bank.exchange(ElevatorId(2), 4, 3, 0).unwrap();
//!
//! assert!(events.wait_for(
//!     |e| matches!(e, ElevatorEvent::DoorOpened { floor: 4, boarded: 3, .. }),
//!     Duration::from_secs(5),
//! ));
//! bank.shutdown();
//! ```

#![warn(missing_docs)]

/// Ids, request outcomes, and error types.
pub mod commands;
/// Bank configuration with builder-style setters.
pub mod config;
/// Text command parsing for the interactive simulator.
pub mod console;
/// Per-car worker loop.
pub mod controller;
/// Request intake, car selection, and lifecycle.
pub mod dispatcher;
/// Events and the built-in sinks.
pub mod events;
/// Real-time pacer and test doubles.
pub mod hal;
/// Direction-aware request queue.
pub mod queue;
/// Shared cars and the termination flag.
pub mod registry;
/// Per-car state and scan scheduling.
pub mod state;
/// Seams for events, pacing, and dispatch policy.
pub mod traits;

// Re-exports for convenience
pub use commands::{Assignment, DispatchError, ElevatorId, Floor, InsertOutcome, RejectReason};
pub use controller::{ElevatorController, Step};
pub use dispatcher::{Dispatcher, DispatcherBuilder, ShutdownReport};
pub use events::{ElevatorEvent, LogSink};
pub use queue::RequestQueue;
pub use registry::{ElevatorCar, SystemRegistry};
pub use state::{
    Direction, DoorState, ElevatorSnapshot, ElevatorState, PassengerExchange, Phase, Plan, Service,
};
pub use traits::{
    Candidate, DirectionAware, DispatchPolicy, EventSink, Nearest, Pacer, PolicyKind,
};

// Config re-exports
pub use config::{BuildingConfig, Config, ConfigError, DispatchConfig, ElevatorConfig, TimingConfig};
