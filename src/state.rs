//! Per-car state and the scan scheduling rule.
//!
//! [`ElevatorState`] is everything one car knows about itself: position,
//! direction preference, occupancy, doors, and its two [`RequestQueue`]s.
//! It is owned by an [`ElevatorCar`](crate::registry::ElevatorCar) behind a
//! mutex; the car's controller thread drives it and the dispatcher only ever
//! calls [`enqueue`](ElevatorState::enqueue) and
//! [`register_exchange`](ElevatorState::register_exchange).
//!
//! # Life Cycle
//!
//! ```text
//!        request            arrived          doors closed, queues empty
//! Idle ──────────► Moving ──────────► DoorOpen ──────────────────────────► Idle
//!                   ▲  │ one floor                  │
//!                   │  └───────┘ per tick           │ doors closed, work left
//!                   └───────────────────────────────┘
//! ```
//!
//! # Scan Rule
//!
//! While the queue for the current [`Direction`] has floors, the car keeps
//! going that way. When it empties and the opposite queue has work, the
//! direction flips immediately. When both are empty the car is idle.
//!
//! ```rust
//! use elevator_bank::{Direction, ElevatorId, ElevatorState, Plan};
//!
//! let mut car = ElevatorState::new(ElevatorId(0), 10, 5);
//! car.enqueue(2).unwrap();
//!
//! assert_eq!(car.plan(), Plan::Move(Direction::Up));
//! car.advance(Direction::Up);
//! car.advance(Direction::Up);
//! assert_eq!(car.plan(), Plan::Serve(2));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::commands::{ElevatorId, Floor, InsertOutcome, RejectReason};
use crate::queue::RequestQueue;

// ============================================================================
// Small Enums
// ============================================================================

/// Direction of travel, and the car's persistent preference for which queue
/// to drain next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Towards higher floors. New cars start with this preference.
    #[default]
    Up,
    /// Towards lower floors.
    Down,
}

impl Direction {
    /// The other direction.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The direction that leads from `from` to `to`, or `None` if equal.
    pub fn toward(from: Floor, to: Floor) -> Option<Self> {
        match to.cmp(&from) {
            core::cmp::Ordering::Greater => Some(Direction::Up),
            core::cmp::Ordering::Less => Some(Direction::Down),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Floor delta of one tick in this direction.
    #[inline]
    pub const fn step(self) -> Floor {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }

    /// Returns the direction as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a car is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// No pending work; the controller is (or is about to be) asleep.
    #[default]
    Idle,
    /// Travelling; the last tick moved the car in this direction.
    Moving(Direction),
    /// Stopped at a floor with the doors open.
    DoorOpen,
}

/// Door position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DoorState {
    /// Closed; the car may move.
    #[default]
    Closed,
    /// Open; passengers are boarding and alighting.
    Open,
}

/// Passengers expected to leave and enter at a floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassengerExchange {
    /// People who want to get on.
    pub boarding: u32,
    /// People who want to get off.
    pub alighting: u32,
}

/// The controller's next move, decided by [`ElevatorState::plan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to do.
    Idle,
    /// Move one floor in this direction.
    Move(Direction),
    /// Open the doors at this (the current) floor.
    Serve(Floor),
}

/// What happened during one door cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Service {
    /// Floor the doors opened at.
    pub floor: Floor,
    /// People who got off.
    pub alighted: u32,
    /// People who got on.
    pub boarded: u32,
    /// People who wanted to board but did not fit.
    pub refused: u32,
    /// Occupancy after the exchange.
    pub occupancy: u32,
}

// ============================================================================
// Elevator State
// ============================================================================

/// Mutable state of one car.
///
/// Not thread-safe on its own; see [`ElevatorCar`](crate::registry::ElevatorCar)
/// for the locked wrapper shared between the controller and the dispatcher.
#[derive(Debug)]
pub struct ElevatorState {
    id: ElevatorId,
    max_floor: Floor,
    current_floor: Floor,
    direction: Direction,
    phase: Phase,
    door: DoorState,
    occupancy: u32,
    capacity: u32,
    pending_up: RequestQueue,
    pending_down: RequestQueue,
    serve_here: bool,
    exchanges: BTreeMap<Floor, PassengerExchange>,
    closed: bool,
}

impl ElevatorState {
    /// A fresh car at floor 0, heading up, empty and idle.
    pub fn new(id: ElevatorId, max_floor: Floor, capacity: u32) -> Self {
        Self {
            id,
            max_floor,
            current_floor: 0,
            direction: Direction::Up,
            phase: Phase::Idle,
            door: DoorState::Closed,
            occupancy: 0,
            capacity,
            pending_up: RequestQueue::new(Direction::Up, max_floor),
            pending_down: RequestQueue::new(Direction::Down, max_floor),
            serve_here: false,
            exchanges: BTreeMap::new(),
            closed: false,
        }
    }

    /// Hand a floor to this car.
    ///
    /// Floors above the car go to the up queue, floors below to the down
    /// queue. A floor equal to the current one is served on the spot if the
    /// car is stationary; if the car is just leaving it, the floor is queued
    /// for the way back.
    ///
    /// Once the car has been [abandoned](Self::abandon) every request is
    /// refused with [`RejectReason::ShuttingDown`].
    pub fn enqueue(&mut self, floor: Floor) -> Result<InsertOutcome, RejectReason> {
        if self.closed {
            return Err(RejectReason::ShuttingDown);
        }
        if !self.in_range(floor) {
            return Err(RejectReason::InvalidFloor);
        }

        let direction = match (Direction::toward(self.current_floor, floor), self.phase) {
            (Some(direction), _) => direction,
            (None, Phase::Moving(heading)) => heading.opposite(),
            (None, Phase::Idle | Phase::DoorOpen) => {
                self.serve_here = true;
                return Ok(InsertOutcome::ServingNow);
            }
        };

        if self.queue_mut(direction).insert(floor)? {
            Ok(InsertOutcome::Queued(direction))
        } else {
            Ok(InsertOutcome::AlreadyQueued(direction))
        }
    }

    /// Record passengers waiting to get on or off at `floor`.
    ///
    /// Counts accumulate until the doors next open there. The floor itself
    /// still has to be requested for the car to stop.
    pub fn register_exchange(
        &mut self,
        floor: Floor,
        boarding: u32,
        alighting: u32,
    ) -> Result<(), RejectReason> {
        if self.closed {
            return Err(RejectReason::ShuttingDown);
        }
        if !self.in_range(floor) {
            return Err(RejectReason::InvalidFloor);
        }
        let entry = self.exchanges.entry(floor).or_default();
        entry.boarding = entry.boarding.saturating_add(boarding);
        entry.alighting = entry.alighting.saturating_add(alighting);
        Ok(())
    }

    /// Decide the next step.
    ///
    /// Flips [`direction`](Self::direction) when the active queue is empty
    /// and the opposite one is not; otherwise read-only.
    pub fn plan(&mut self) -> Plan {
        if self.serve_here {
            return Plan::Serve(self.current_floor);
        }

        if self.queue(self.direction).is_empty() && !self.queue(self.direction.opposite()).is_empty()
        {
            self.direction = self.direction.opposite();
        }

        let Some(target) = self.queue(self.direction).peek_next() else {
            return Plan::Idle;
        };

        match Direction::toward(self.current_floor, target) {
            Some(direction) => Plan::Move(direction),
            None => Plan::Serve(target),
        }
    }

    /// Move one floor. Returns the new floor.
    pub fn advance(&mut self, direction: Direction) -> Floor {
        let next = (self.current_floor + direction.step()).clamp(0, self.max_floor);
        self.current_floor = next;
        self.phase = Phase::Moving(direction);
        next
    }

    /// Open the doors at `floor` and run the passenger exchange.
    ///
    /// The floor is removed from both queues. Alighting is applied first and
    /// never drops occupancy below zero; boarding is cut to the free space.
    pub fn open_doors(&mut self, floor: Floor) -> Service {
        self.phase = Phase::DoorOpen;
        self.door = DoorState::Open;
        self.serve_here = false;
        self.pending_up.pop_served(floor);
        self.pending_down.pop_served(floor);

        let exchange = self.exchanges.remove(&floor).unwrap_or_default();
        let alighted = exchange.alighting.min(self.occupancy);
        self.occupancy -= alighted;

        let free = self.capacity.saturating_sub(self.occupancy);
        let boarded = exchange.boarding.min(free);
        self.occupancy += boarded;

        Service {
            floor,
            alighted,
            boarded,
            refused: exchange.boarding - boarded,
            occupancy: self.occupancy,
        }
    }

    /// Close the doors after a door cycle.
    ///
    /// The phase follows the next plan: `Idle` only when nothing is pending,
    /// `Moving` towards the next stop otherwise. A stop requested at this
    /// floor while the doors were open keeps them open for another cycle.
    pub fn close_doors(&mut self) {
        match self.plan() {
            Plan::Idle => {
                self.door = DoorState::Closed;
                self.phase = Phase::Idle;
            }
            Plan::Move(direction) => {
                self.door = DoorState::Closed;
                self.phase = Phase::Moving(direction);
            }
            Plan::Serve(_) => {}
        }
    }

    /// Mark the car idle (nothing left to do).
    pub fn set_idle(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Drop all pending work and refuse any more, returning how many
    /// requests were discarded.
    pub fn abandon(&mut self) -> usize {
        self.closed = true;
        let dropped =
            self.pending_up.clear() + self.pending_down.clear() + usize::from(self.serve_here);
        self.serve_here = false;
        self.exchanges.clear();
        dropped
    }

    /// Point-in-time copy for reporting.
    pub fn snapshot(&self) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id: self.id,
            current_floor: self.current_floor,
            direction: self.direction,
            phase: self.phase,
            door: self.door,
            occupancy: self.occupancy,
            capacity: self.capacity,
            pending_up: self.pending_up.to_vec(),
            pending_down: self.pending_down.to_vec(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// This car's id.
    pub fn id(&self) -> ElevatorId {
        self.id
    }

    /// Current floor.
    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    /// Current direction preference.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current life-cycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Door position.
    pub fn door(&self) -> DoorState {
        self.door
    }

    /// People on board.
    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// Maximum people on board.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Highest valid floor.
    pub fn max_floor(&self) -> Floor {
        self.max_floor
    }

    /// The queue drained while travelling in `direction`.
    pub fn queue(&self, direction: Direction) -> &RequestQueue {
        match direction {
            Direction::Up => &self.pending_up,
            Direction::Down => &self.pending_down,
        }
    }

    /// Number of outstanding requests, counting a pending on-the-spot stop.
    pub fn pending(&self) -> usize {
        self.pending_up.len() + self.pending_down.len() + usize::from(self.serve_here)
    }

    /// Returns true once [`abandon`](Self::abandon) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns true if there is nothing to do.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    fn queue_mut(&mut self, direction: Direction) -> &mut RequestQueue {
        match direction {
            Direction::Up => &mut self.pending_up,
            Direction::Down => &mut self.pending_down,
        }
    }

    fn in_range(&self, floor: Floor) -> bool {
        (0..=self.max_floor).contains(&floor)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Read-only copy of one car's observable state.
///
/// Produced under the car's lock and then released, so it may be stale by
/// the time it is printed.
///
/// # Example
///
/// ```rust
/// use elevator_bank::{Direction, ElevatorId, ElevatorState, Phase};
///
/// let car = ElevatorState::new(ElevatorId(1), 10, 5);
/// let snap = car.snapshot();
///
/// assert_eq!(snap.current_floor, 0);
/// assert_eq!(snap.direction, Direction::Up);
/// assert_eq!(snap.phase, Phase::Idle);
/// assert!(snap.pending_up.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevatorSnapshot {
    /// Car id.
    pub id: ElevatorId,
    /// Floor the car is at.
    pub current_floor: Floor,
    /// Direction preference.
    pub direction: Direction,
    /// Life-cycle phase.
    pub phase: Phase,
    /// Door position.
    pub door: DoorState,
    /// People on board.
    pub occupancy: u32,
    /// Maximum people on board.
    pub capacity: u32,
    /// Up queue in service order (ascending).
    pub pending_up: Vec<Floor>,
    /// Down queue in service order (descending).
    pub pending_down: Vec<Floor>,
}

impl ElevatorSnapshot {
    /// Total queued floors.
    pub fn pending(&self) -> usize {
        self.pending_up.len() + self.pending_down.len()
    }
}

fn write_floors(f: &mut fmt::Formatter<'_>, floors: &[Floor]) -> fmt::Result {
    if floors.is_empty() {
        return f.write_str("-");
    }
    for (i, floor) in floors.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", floor)?;
    }
    Ok(())
}

impl fmt::Display for ElevatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Idle => "idle",
            Phase::Moving(_) => "moving",
            Phase::DoorOpen => "door open",
        };
        write!(
            f,
            "[elevator {}] floor {} | {} ({}) | {}/{} aboard | up: ",
            self.id, self.current_floor, self.direction, phase, self.occupancy, self.capacity
        )?;
        write_floors(f, &self.pending_up)?;
        f.write_str(" | down: ")?;
        write_floors(f, &self.pending_down)
    }
}

// ============================================================================
// Tests
// ============================================================================
