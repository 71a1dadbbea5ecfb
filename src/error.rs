//! Record Errors and Configuration Warnings

use std::fmt;

/// Errors that can occur while bringing up a record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The sample buffer could not be allocated. The record is unusable.
    Allocation { capacity: usize },
    /// Configuration text could not be parsed.
    InvalidConfig(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { capacity } => {
                write!(f, "Failed to allocate sample buffer of {} slots", capacity)
            }
            Self::InvalidConfig(e) => write!(f, "Invalid record configuration: {}", e),
        }
    }
}

impl std::error::Error for RecordError {}

/// Non-fatal coercions applied to a configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigWarning {
    /// Capacity below 1 was raised to 1.
    CapacityClamped { requested: i64 },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityClamped { requested } => {
                write!(f, "Capacity {} is below 1, using 1", requested)
            }
        }
    }
}
