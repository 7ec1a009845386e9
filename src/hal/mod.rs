//! Concrete implementations of the traits in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `sleep`: Real-time pacing with `std::thread::sleep`
//! - `mock`: Test doubles for pacing and event capture

pub mod mock;
pub mod sleep;

pub use mock::*;
pub use sleep::*;
