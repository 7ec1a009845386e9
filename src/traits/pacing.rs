//! Timing of car movement.
//!
//! A [`Pacer`] is the only place a worker spends wall-clock time outside
//! waiting for work. Production uses [`SleepPacer`](crate::hal::SleepPacer);
//! tests use [`InstantPacer`](crate::hal::InstantPacer) to run at full speed
//! or [`GatedPacer`](crate::hal::GatedPacer) to hold a car between floors.

use crate::commands::ElevatorId;

/// Paces one car's ticks.
///
/// Both calls are made without the car's lock held, so blocking here
/// never stalls the dispatcher.
pub trait Pacer: Send + Sync {
    /// Called after the car has moved one floor.
    fn travel(&self, elevator: ElevatorId);

    /// Called while the doors are open.
    fn dwell(&self, elevator: ElevatorId);
}

impl<P: Pacer + ?Sized> Pacer for std::sync::Arc<P> {
    fn travel(&self, elevator: ElevatorId) {
        (**self).travel(elevator)
    }

    fn dwell(&self, elevator: ElevatorId) {
        (**self).dwell(elevator)
    }
}
