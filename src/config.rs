//! Record Configuration
//!
//! Mirrors the record's configurable fields. Every field has a default, so a
//! host only needs to supply what it sets, e.g.
//!
//! ```json
//! { "name": "TANK:LEVEL:AVG", "capacity": 10,
//!   "alarms": { "high": { "threshold": 50.0, "severity": "minor" }, "hysteresis": 5.0 },
//!   "deadbands": { "value": 0.5, "archive": 2.0 } }
//! ```

use crate::error::{ConfigWarning, RecordError};
use crate::signal::Severity;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One threshold band. Disabled when `severity` is `NoAlarm`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Band {
    pub threshold: f64,
    pub severity: Severity,
}

impl Band {
    pub fn new(threshold: f64, severity: Severity) -> Self {
        Self {
            threshold,
            severity,
        }
    }
}

/// Four alarm bands plus the shared hysteresis deadband
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmLimits {
    pub hihi: Band,
    pub high: Band,
    pub low: Band,
    pub lolo: Band,
    pub hysteresis: f64,
}

/// Monitor (value) and archive deadbands
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Deadbands {
    pub value: f64,
    pub archive: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Record name, used only to tag log events
    pub name: String,
    /// Number of samples averaged. Values below 1 are clamped to 1.
    pub capacity: i64,
    pub alarms: AlarmLimits,
    pub deadbands: Deadbands,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            name: "average".to_string(),
            capacity: 1,
            alarms: AlarmLimits::default(),
            deadbands: Deadbands::default(),
        }
    }
}

impl RecordConfig {
    pub fn with_capacity(capacity: i64) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::InvalidConfig(e.to_string()))
    }

    /// Apply the capacity clamp in place and report what was coerced.
    pub fn normalize(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.capacity < 1 {
            let warning = ConfigWarning::CapacityClamped {
                requested: self.capacity,
            };
            warn!(record = %self.name, requested = self.capacity, "{}", warning);
            warnings.push(warning);
            self.capacity = 1;
        }

        warnings
    }

    /// Capacity as a slot count, never below 1.
    pub fn slot_count(&self) -> usize {
        usize::try_from(self.capacity.max(1)).unwrap_or(usize::MAX)
    }
}
