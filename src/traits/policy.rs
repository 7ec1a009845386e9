//! Car selection for requests that do not name a car.
//!
//! The dispatcher takes a [`Candidate`] view of every car (each under its
//! own lock, one at a time) and asks a [`DispatchPolicy`] to pick one.
//!
//! # Built-in Policies
//!
//! | Policy | Cost | Tie Break |
//! |--------|------|-----------|
//! | [`Nearest`] | floor distance | lowest id |
//! | [`DirectionAware`] | distance, or detour via farthest stop when heading away | lowest id |
//!
//! # Example
//!
//! ```rust
//! use elevator_bank::traits::{Candidate, DispatchPolicy, Nearest};
//! use elevator_bank::ElevatorId;
//!
//! let cars = [Candidate::idle(ElevatorId(0), 0), Candidate::idle(ElevatorId(1), 6)];
//! assert_eq!(Nearest.choose(&cars, 5), Some(ElevatorId(1)));
//! ```

use core::fmt;
use core::str::FromStr;

use crate::commands::{ElevatorId, Floor};
use crate::state::{Direction, ElevatorState};

/// What a policy may know about one car when choosing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Car id.
    pub id: ElevatorId,
    /// Floor the car is at.
    pub current_floor: Floor,
    /// Direction the car is committed to, `None` when it has nothing queued.
    pub heading: Option<Direction>,
    /// Last stop in the committed direction (the turnaround floor).
    pub farthest: Option<Floor>,
    /// Outstanding requests.
    pub pending: usize,
}

impl Candidate {
    /// View of a car with no work.
    pub fn idle(id: ElevatorId, current_floor: Floor) -> Self {
        Self {
            id,
            current_floor,
            heading: None,
            farthest: None,
            pending: 0,
        }
    }

    /// Take a view of a car's state. The caller holds the car's lock.
    pub fn from_state(state: &ElevatorState) -> Self {
        let direction = state.direction();
        let active = state.queue(direction);
        let (heading, farthest) = if !active.is_empty() {
            (Some(direction), active.farthest())
        } else {
            let opposite = state.queue(direction.opposite());
            if opposite.is_empty() {
                (None, None)
            } else {
                (Some(direction.opposite()), opposite.farthest())
            }
        };
        Self {
            id: state.id(),
            current_floor: state.current_floor(),
            heading,
            farthest,
            pending: state.pending(),
        }
    }

    /// Floor distance to `floor`.
    pub fn distance(&self, floor: Floor) -> u32 {
        self.current_floor.abs_diff(floor)
    }
}

/// Picks the car that should serve an unassigned request.
pub trait DispatchPolicy: Send + Sync {
    /// Cost of sending this car to `floor`. Lower is better.
    fn cost(&self, candidate: &Candidate, floor: Floor) -> u32;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// The cheapest candidate; equal costs go to the lowest id.
    fn choose(&self, candidates: &[Candidate], floor: Floor) -> Option<ElevatorId> {
        candidates
            .iter()
            .min_by_key(|c| (self.cost(c, floor), c.id))
            .map(|c| c.id)
    }
}

// ============================================================================
// Nearest
// ============================================================================

/// Closest car wins, whatever it is doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Nearest;

impl DispatchPolicy for Nearest {
    fn cost(&self, candidate: &Candidate, floor: Floor) -> u32 {
        candidate.distance(floor)
    }

    fn name(&self) -> &'static str {
        "nearest"
    }
}

// ============================================================================
// Direction Aware
// ============================================================================

/// Prefers cars that are idle or already heading toward the caller.
///
/// A car heading away has to finish its run first, so its cost is the trip
/// out to its farthest pending stop plus the trip back.
///
/// ```rust
/// use elevator_bank::traits::{Candidate, DirectionAware, DispatchPolicy};
/// use elevator_bank::{Direction, ElevatorId};
///
/// // Car 0 at floor 4 going up to 9; car 1 idle at floor 0.
/// let away = Candidate {
///     heading: Some(Direction::Up),
///     farthest: Some(9),
///     pending: 1,
///     ..Candidate::idle(ElevatorId(0), 4)
/// };
/// let idle = Candidate::idle(ElevatorId(1), 0);
///
/// assert_eq!(DirectionAware.cost(&away, 3), 5 + 6);
/// assert_eq!(DirectionAware.choose(&[away, idle], 3), Some(ElevatorId(1)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionAware;

impl DispatchPolicy for DirectionAware {
    fn cost(&self, candidate: &Candidate, floor: Floor) -> u32 {
        let (Some(heading), Some(farthest)) = (candidate.heading, candidate.farthest) else {
            return candidate.distance(floor);
        };
        let toward = match heading {
            Direction::Up => floor >= candidate.current_floor,
            Direction::Down => floor <= candidate.current_floor,
        };
        if toward {
            candidate.distance(floor)
        } else {
            candidate.distance(farthest) + farthest.abs_diff(floor)
        }
    }

    fn name(&self) -> &'static str {
        "direction-aware"
    }
}

// ============================================================================
// Policy Selection
// ============================================================================

/// Built-in policy selector, used by configuration and the CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PolicyKind {
    /// [`Nearest`].
    #[default]
    Nearest,
    /// [`DirectionAware`].
    DirectionAware,
}

impl PolicyKind {
    /// Instantiate the policy.
    pub fn build(self) -> Box<dyn DispatchPolicy> {
        match self {
            PolicyKind::Nearest => Box::new(Nearest),
            PolicyKind::DirectionAware => Box::new(DirectionAware),
        }
    }

    /// Returns the policy name as accepted by [`FromStr`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Nearest => "nearest",
            PolicyKind::DirectionAware => "direction-aware",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(PolicyKind::Nearest),
            "direction-aware" | "direction_aware" => Ok(PolicyKind::DirectionAware),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Returned when a policy name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown dispatch policy '{}' (expected nearest or direction-aware)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPolicy {}
