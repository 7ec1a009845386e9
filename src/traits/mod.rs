//! Trait definitions for the seams between the scheduling core and the
//! outside world.
//!
//! This module defines the abstractions that let elevator-bank:
//! - Report what happens without caring who listens
//! - Run in real time or as fast as a test wants
//! - Swap the car selection rule
//!
//! # Submodules
//!
//! - `observer`: Event sinks
//! - `pacing`: Travel and door dwell timing
//! - `policy`: Car selection for unassigned requests
//!
//! # Dispatch Policies
//!
//! Car selection uses the [`DispatchPolicy`] trait with built-in implementations:
//!
//! - [`Nearest`]: Closest car by floor distance (default)
//! - [`DirectionAware`]: Penalizes cars travelling away from the caller

pub mod observer;
pub mod pacing;
pub mod policy;

pub use observer::*;
pub use pacing::*;
pub use policy::*;
