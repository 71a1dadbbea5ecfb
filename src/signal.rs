//! Alarm and Notification Vocabulary Shared with the Host
//!
//! Severity levels, alarm kinds and notification classes use the numeric
//! codes the host runtime expects, so they can cross the C ABI unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alarm severity, ordered by urgency.
#[repr(u16)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    NoAlarm = 0,
    Minor = 1,
    Major = 2,
    Invalid = 3,
}

impl Severity {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::NoAlarm),
            1 => Some(Self::Minor),
            2 => Some(Self::Major),
            3 => Some(Self::Invalid),
            _ => None,
        }
    }

    /// A band configured with `NoAlarm` severity is disabled.
    pub fn is_enabled(&self) -> bool {
        *self != Self::NoAlarm
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NoAlarm => "NO_ALARM",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Invalid => "INVALID",
        }
    }
}

/// Alarm classification (the host's alarm status codes).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKind {
    #[default]
    NoAlarm = 0,
    HiHi = 3,
    High = 4,
    LoLo = 5,
    Low = 6,
    Link = 14,
    Undefined = 17,
}

impl AlarmKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoAlarm => "NO_ALARM",
            Self::HiHi => "HIHI",
            Self::High => "HIGH",
            Self::LoLo => "LOLO",
            Self::Low => "LOW",
            Self::Link => "LINK",
            Self::Undefined => "UDF",
        }
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of notification classes fired by one scan.
    ///
    /// Bit values match the host's event mask so the raw value can be handed
    /// straight to its dispatcher.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Notifications: u16 {
        /// Value moved past the monitor deadband
        const VALUE = 0x1;
        /// Value moved past the archive deadband
        const ARCHIVE = 0x2;
        /// Latched severity or alarm kind changed
        const ALARM = 0x4;
    }
}
