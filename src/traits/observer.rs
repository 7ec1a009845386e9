//! Event sink trait.

use crate::events::ElevatorEvent;

/// Receives every [`ElevatorEvent`] the bank produces.
///
/// Called from the dispatcher thread and from every car's worker, never
/// while a car's lock is held. Implementations must not block for long:
/// a slow sink slows the car that emitted the event.
pub trait EventSink: Send + Sync {
    /// Handle one event.
    fn emit(&self, event: ElevatorEvent);
}

/// Sink that drops everything.
impl EventSink for () {
    fn emit(&self, _event: ElevatorEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: ElevatorEvent) {
        (**self).emit(event)
    }
}
