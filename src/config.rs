//! Configuration for an elevator bank.
//!
//! Grouped into sections the same way the running system is: the building
//! (floors, number of cars), each car (capacity), timing, and dispatch.
//! Defaults describe a ten-storey building with three five-person cars that
//! take a second per floor and hold their doors for three seconds.
//!
//! # Example
//!
//! ```rust
//! use elevator_bank::config::{BuildingConfig, Config, TimingConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.building.elevators, 3);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_building(BuildingConfig::default().with_max_floor(20))
//!     .with_timing(TimingConfig::instant());
//! assert!(config.validate().is_ok());
//! ```

use core::fmt;
use std::time::Duration;

use crate::commands::Floor;
use crate::traits::PolicyKind;

// ============================================================================
// Main Config
// ============================================================================

/// Complete elevator bank configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Building shape
    pub building: BuildingConfig,
    /// Per-car settings
    pub elevator: ElevatorConfig,
    /// Travel and door timing
    pub timing: TimingConfig,
    /// Car selection
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Set building configuration
    pub fn with_building(mut self, building: BuildingConfig) -> Self {
        self.building = building;
        self
    }

    /// Set per-car configuration
    pub fn with_elevator(mut self, elevator: ElevatorConfig) -> Self {
        self.elevator = elevator;
        self
    }

    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set dispatch configuration
    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Check that the configuration describes a bank that can run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.building.elevators == 0 {
            return Err(ConfigError::NoElevators);
        }
        if self.building.max_floor < 0 {
            return Err(ConfigError::NegativeMaxFloor(self.building.max_floor));
        }
        if self.elevator.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Configuration that cannot describe a working bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one car is required.
    NoElevators,
    /// The top floor must be zero or above.
    NegativeMaxFloor(Floor),
    /// A car must hold at least one person.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoElevators => write!(f, "at least one elevator is required"),
            Self::NegativeMaxFloor(floor) => {
                write!(f, "max floor must not be negative (got {})", floor)
            }
            Self::ZeroCapacity => write!(f, "elevator capacity must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Building Config
// ============================================================================

/// Building shape
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildingConfig {
    /// Highest floor; valid floors are `0..=max_floor`
    pub max_floor: Floor,
    /// Number of cars
    pub elevators: usize,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            max_floor: 10,
            elevators: 3,
        }
    }
}

impl BuildingConfig {
    /// Set the highest floor
    pub fn with_max_floor(mut self, max_floor: Floor) -> Self {
        self.max_floor = max_floor;
        self
    }

    /// Set the number of cars
    pub fn with_elevators(mut self, elevators: usize) -> Self {
        self.elevators = elevators;
        self
    }

    /// Returns true if `floor` exists in this building
    pub fn contains(&self, floor: Floor) -> bool {
        (0..=self.max_floor).contains(&floor)
    }
}

// ============================================================================
// Elevator Config
// ============================================================================

/// Per-car settings
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElevatorConfig {
    /// Maximum people on board
    pub capacity: u32,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self { capacity: 5 }
    }
}

impl ElevatorConfig {
    /// Set the capacity
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Travel and door timing
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Time to travel one floor in milliseconds
    pub travel_ms: u64,
    /// Time the doors stay open in milliseconds
    pub dwell_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            travel_ms: 1000,
            dwell_ms: 3000,
        }
    }
}

impl TimingConfig {
    /// No waiting at all
    pub fn instant() -> Self {
        Self {
            travel_ms: 0,
            dwell_ms: 0,
        }
    }

    /// Set the per-floor travel time
    pub fn with_travel_ms(mut self, ms: u64) -> Self {
        self.travel_ms = ms;
        self
    }

    /// Set the door dwell time
    pub fn with_dwell_ms(mut self, ms: u64) -> Self {
        self.dwell_ms = ms;
        self
    }

    /// Per-floor travel time
    pub fn travel(&self) -> Duration {
        Duration::from_millis(self.travel_ms)
    }

    /// Door dwell time
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}

// ============================================================================
// Dispatch Config
// ============================================================================

/// Car selection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Policy for requests that do not name a car
    pub policy: PolicyKind,
}

impl DispatchConfig {
    /// Set the policy
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.building.max_floor, 10);
        assert_eq!(config.building.elevators, 3);
        assert_eq!(config.elevator.capacity, 5);
        assert_eq!(config.timing.travel_ms, 1000);
        assert_eq!(config.timing.dwell_ms, 3000);
        assert_eq!(config.dispatch.policy, PolicyKind::Nearest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_building(
                BuildingConfig::default()
                    .with_max_floor(4)
                    .with_elevators(1),
            )
            .with_elevator(ElevatorConfig::default().with_capacity(8))
            .with_timing(TimingConfig::default().with_travel_ms(10).with_dwell_ms(20))
            .with_dispatch(DispatchConfig::default().with_policy(PolicyKind::DirectionAware));

        assert_eq!(config.building.max_floor, 4);
        assert_eq!(config.building.elevators, 1);
        assert_eq!(config.elevator.capacity, 8);
        assert_eq!(config.timing.travel(), Duration::from_millis(10));
        assert_eq!(config.timing.dwell(), Duration::from_millis(20));
        assert_eq!(config.dispatch.policy, PolicyKind::DirectionAware);
    }

    #[test]
    fn building_contains_is_inclusive() {
        let building = BuildingConfig::default();
        assert!(building.contains(0));
        assert!(building.contains(10));
        assert!(!building.contains(11));
        assert!(!building.contains(-1));
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn validate_rejects_empty_bank() {
        let config =
            Config::default().with_building(BuildingConfig::default().with_elevators(0));
        assert_eq!(config.validate(), Err(ConfigError::NoElevators));
    }

    #[test]
    fn validate_rejects_negative_top_floor() {
        let config =
            Config::default().with_building(BuildingConfig::default().with_max_floor(-3));
        assert_eq!(config.validate(), Err(ConfigError::NegativeMaxFloor(-3)));
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let config = Config::default().with_elevator(ElevatorConfig::default().with_capacity(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
        assert_eq!(
            ConfigError::ZeroCapacity.to_string(),
            "elevator capacity must be at least 1"
        );
    }

    #[test]
    fn single_floor_building_is_valid() {
        let config =
            Config::default().with_building(BuildingConfig::default().with_max_floor(0));
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "json")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"building":{"elevators":2},"dispatch":{"policy":"direction-aware"}}"#)
                .unwrap();
        assert_eq!(config.building.elevators, 2);
        assert_eq!(config.building.max_floor, 10);
        assert_eq!(config.dispatch.policy, PolicyKind::DirectionAware);
    }
}
