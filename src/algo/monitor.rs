use crate::config::Deadbands;
use crate::signal::Notifications;
use serde::Serialize;

/// Deadband change detection for the value and archive notification classes.
///
/// Each class keeps its own baseline, which only moves when that class fires.
#[derive(Serialize, Clone, Debug, Default)]
pub struct ChangeMonitor {
    deadbands: Deadbands,
    last_value_notified: f64,
    last_archive_notified: f64,
}

impl ChangeMonitor {
    pub fn new(deadbands: Deadbands) -> Self {
        Self {
            deadbands,
            last_value_notified: 0.0,
            last_archive_notified: 0.0,
        }
    }

    /// Compare `value` against both baselines. The comparison is strict, so
    /// a zero deadband fires on any change but never on an identical value.
    pub fn evaluate(&mut self, value: f64) -> Notifications {
        let mut fired = Notifications::empty();

        if (self.last_value_notified - value).abs() > self.deadbands.value {
            fired |= Notifications::VALUE;
            self.last_value_notified = value;
        }

        if (self.last_archive_notified - value).abs() > self.deadbands.archive {
            fired |= Notifications::ARCHIVE;
            self.last_archive_notified = value;
        }

        fired
    }

    pub fn last_value_notified(&self) -> f64 {
        self.last_value_notified
    }

    pub fn last_archive_notified(&self) -> f64 {
        self.last_archive_notified
    }
}
