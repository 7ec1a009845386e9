//! Direction-aware request queue for a single car.
//!
//! A [`RequestQueue`] holds the floors a car still has to visit while
//! travelling in one direction. Each car owns two of them, one per
//! [`Direction`].
//!
//! # Ordering
//!
//! Floors are stored once each, in a sorted set. The queue's direction
//! decides which end is the head:
//!
//! - [`Direction::Up`]: ascending, the lowest floor is visited first
//! - [`Direction::Down`]: descending, the highest floor is visited first
//!
//! ```rust
//! use elevator_bank::{Direction, RequestQueue};
//!
//! let mut down = RequestQueue::new(Direction::Down, 10);
//! down.insert(1).unwrap();
//! down.insert(2).unwrap();
//!
//! // Descending service order: 2 before 1
//! assert_eq!(down.peek_next(), Some(2));
//! assert_eq!(down.to_vec(), vec![2, 1]);
//! ```
//!
//! # Locking
//!
//! The queue has no synchronization of its own. It is only reachable through
//! [`ElevatorState`](crate::state::ElevatorState), which lives behind its
//! car's lock.

use core::fmt;

use sorted_vec::SortedSet;

use crate::commands::{Floor, RejectReason};
use crate::state::Direction;

/// Ordered, deduplicated floors waiting to be visited in one direction.
///
/// # Example
///
/// ```rust
/// use elevator_bank::{Direction, RejectReason, RequestQueue};
///
/// let mut up = RequestQueue::new(Direction::Up, 10);
///
/// assert_eq!(up.insert(7), Ok(true));
/// assert_eq!(up.insert(3), Ok(true));
/// assert_eq!(up.insert(7), Ok(false)); // duplicate, no-op
/// assert_eq!(up.insert(11), Err(RejectReason::InvalidFloor));
///
/// assert_eq!(up.peek_next(), Some(3));
/// assert!(up.pop_served(3));
/// assert!(!up.pop_served(3)); // already gone, not an error
/// ```
pub struct RequestQueue {
    direction: Direction,
    max_floor: Floor,
    floors: SortedSet<Floor>,
}

impl RequestQueue {
    /// Creates an empty queue serving `direction` in a building whose top
    /// floor is `max_floor`.
    pub fn new(direction: Direction, max_floor: Floor) -> Self {
        Self {
            direction,
            max_floor,
            floors: SortedSet::new(),
        }
    }

    /// The direction this queue is drained in.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Insert a floor.
    ///
    /// Returns `Ok(true)` if it was added, `Ok(false)` if it was already
    /// present, and `Err(InvalidFloor)` if it lies outside `0..=max_floor`.
    /// A rejected floor leaves the queue untouched.
    pub fn insert(&mut self, floor: Floor) -> Result<bool, RejectReason> {
        if floor < 0 || floor > self.max_floor {
            return Err(RejectReason::InvalidFloor);
        }
        let (_, previous) = self.floors.replace(floor);
        Ok(previous.is_none())
    }

    /// The next floor to visit in this queue's direction, without removing it.
    pub fn peek_next(&self) -> Option<Floor> {
        match self.direction {
            Direction::Up => self.floors.first().copied(),
            Direction::Down => self.floors.last().copied(),
        }
    }

    /// The last floor in service order (the turnaround point).
    pub fn farthest(&self) -> Option<Floor> {
        match self.direction {
            Direction::Up => self.floors.last().copied(),
            Direction::Down => self.floors.first().copied(),
        }
    }

    /// Remove a floor that has just been served.
    ///
    /// Returns whether it was present. Absence is expected when another
    /// path already removed the floor and is never an error.
    pub fn pop_served(&mut self, floor: Floor) -> bool {
        self.floors.remove_item(&floor).is_some()
    }

    /// Returns true if `floor` is waiting in this queue.
    pub fn contains(&self, floor: Floor) -> bool {
        self.floors.binary_search(&floor).is_ok()
    }

    /// Returns the number of waiting floors.
    pub fn len(&self) -> usize {
        self.floors.len()
    }

    /// Returns true if no floors are waiting.
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    /// Iterate the floors in service order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Floor> + '_> {
        let floors = self.floors.iter().copied();
        match self.direction {
            Direction::Up => Box::new(floors),
            Direction::Down => Box::new(floors.rev()),
        }
    }

    /// Copy the floors out in service order.
    pub fn to_vec(&self) -> Vec<Floor> {
        self.iter().collect()
    }

    /// Drop every waiting floor, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let dropped = self.floors.len();
        self.floors = SortedSet::new();
        dropped
    }
}

impl fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestQueue")
            .field("direction", &self.direction)
            .field("floors", &self.to_vec())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
