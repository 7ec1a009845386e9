//! Request identifiers, outcomes, and rejection reasons.
//!
//! This module defines the vocabulary shared by the dispatcher, the per-car
//! state, and the event stream.
//!
//! # Request Flow
//!
//! Requests in elevator-bank flow through a small number of decisions before
//! they reach a car's queue:
//!
//! 1. The floor is range-checked against the building's `max_floor`
//!    ([`RejectReason::InvalidFloor`] otherwise)
//! 2. A car is chosen, either named by the caller or picked by the
//!    dispatch policy
//! 3. The car's state decides which directional queue receives it, or
//!    whether it is served on the spot
//!
//! The result of step 3 is an [`InsertOutcome`]; the dispatcher wraps it in an
//! [`Assignment`] together with the chosen car.
//!
//! # Outcomes vs. Errors
//!
//! A duplicate request is not an error. It comes back as
//! [`InsertOutcome::AlreadyQueued`] and leaves the queue untouched.
//! Only genuinely unservable requests produce a [`DispatchError`].

use core::fmt;

use crate::state::Direction;

/// A floor number. Valid floors are `0..=max_floor`.
///
/// Signed so that negative input can be represented and rejected with
/// [`RejectReason::InvalidFloor`] instead of failing earlier.
pub type Floor = i32;

// ============================================================================
// Elevator Identity
// ============================================================================

/// Stable identifier of one car in the bank.
///
/// Ids are dense indices starting at zero. Ordering is used to break ties
/// deterministically: when two cars are equally good, the lower id wins.
///
/// # Example
///
/// ```rust
/// use elevator_bank::ElevatorId;
///
/// assert!(ElevatorId(0) < ElevatorId(1));
/// assert_eq!(ElevatorId(2).to_string(), "2");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElevatorId(pub usize);

impl ElevatorId {
    /// Returns the index of this car in the registry.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Insert Outcomes
// ============================================================================

/// What happened when a floor was handed to a car.
///
/// Returned by [`ElevatorState::enqueue`](crate::state::ElevatorState::enqueue).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InsertOutcome {
    /// The floor was added to the queue for the given direction.
    Queued(Direction),

    /// The floor was already waiting in that queue; nothing changed.
    AlreadyQueued(Direction),

    /// The car is stationary at this floor and will open its doors
    /// without queuing anything.
    ServingNow,
}

impl InsertOutcome {
    /// Returns true if this call changed the car's pending work.
    pub fn is_new(&self) -> bool {
        !matches!(self, Self::AlreadyQueued(_))
    }
}

/// Result of a successful dispatch: which car took the request and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// The car that received the request.
    pub elevator: ElevatorId,
    /// The floor that was requested.
    pub floor: Floor,
    /// How the car's state absorbed it.
    pub outcome: InsertOutcome,
}

// ============================================================================
// Rejections
// ============================================================================

/// Reason a request (or part of one) was refused.
///
/// Carried by [`ElevatorEvent::Rejected`](crate::events::ElevatorEvent::Rejected)
/// so observers can report refusals without inspecting error values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectReason {
    /// The floor lies outside `0..=max_floor`. The request was dropped.
    InvalidFloor,

    /// Boarding would have exceeded the car's capacity.
    ///
    /// Not fatal: the boarding count was reduced to what fits.
    CapacityExceeded,

    /// The caller named a car that does not exist.
    UnknownElevator,

    /// The bank is shutting down and accepts no new work.
    ShuttingDown,
}

impl RejectReason {
    /// Returns the reason as a snake_case string.
    ///
    /// ```
    /// use elevator_bank::RejectReason;
    ///
    /// assert_eq!(RejectReason::InvalidFloor.as_str(), "invalid_floor");
    /// assert_eq!(RejectReason::CapacityExceeded.as_str(), "capacity_exceeded");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFloor => "invalid_floor",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::UnknownElevator => "unknown_elevator",
            Self::ShuttingDown => "shutting_down",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the [`Dispatcher`](crate::Dispatcher) request operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// Requested floor is outside `0..=max_floor`.
    InvalidFloor {
        /// The floor that was asked for.
        floor: Floor,
        /// The highest valid floor.
        max_floor: Floor,
    },

    /// No car with this id exists.
    UnknownElevator(ElevatorId),

    /// The bank has been shut down.
    ShuttingDown,
}

impl DispatchError {
    /// Maps the error onto the reason reported in events.
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::InvalidFloor { .. } => RejectReason::InvalidFloor,
            Self::UnknownElevator(_) => RejectReason::UnknownElevator,
            Self::ShuttingDown => RejectReason::ShuttingDown,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFloor { floor, max_floor } => {
                write!(f, "invalid floor {} (valid floors are 0 to {})", floor, max_floor)
            }
            Self::UnknownElevator(id) => write!(f, "unknown elevator {}", id),
            Self::ShuttingDown => write!(f, "elevator bank is shutting down"),
        }
    }
}

impl std::error::Error for DispatchError {}

// ============================================================================
// Tests
// ============================================================================
