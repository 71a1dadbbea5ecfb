//! Average Record
//!
//! Ties the circular average, the alarm evaluator and the change monitor into
//! the one object the host drives. A scan runs in a fixed order:
//! 1. Push the raw input into the averaging window
//! 2. Classify the new average against the alarm bands
//! 3. Latch the scan's alarm and note whether it changed
//! 4. Check the value and archive deadbands
//!
//! The host must not overlap scans on one record; `&mut self` enforces that
//! for Rust callers.

use crate::algo::{AlarmEvaluator, ChangeMonitor, CircularAverage};
use crate::config::{AlarmLimits, RecordConfig};
use crate::error::{ConfigWarning, RecordError};
use crate::signal::{AlarmKind, Notifications, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Result of one scan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub average: f64,
    pub notifications: Notifications,
    pub severity: Severity,
    pub kind: AlarmKind,
    pub timestamp: DateTime<Utc>,
}

/// Host-side dispatcher for fired notification classes
pub trait EventSink {
    fn post_events(&mut self, record: &str, value: f64, mask: Notifications);
}

/// Event captured by the `Vec` sink
#[derive(Debug, Clone, PartialEq)]
pub struct PostedEvent {
    pub record: String,
    pub value: f64,
    pub mask: Notifications,
}

impl EventSink for Vec<PostedEvent> {
    fn post_events(&mut self, record: &str, value: f64, mask: Notifications) {
        self.push(PostedEvent {
            record: record.to_string(),
            value,
            mask,
        });
    }
}

/// Point-in-time view of a record for diagnostic display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub name: String,
    pub capacity: usize,
    pub write_index: Option<usize>,
    pub running_sum: f64,
    pub average: f64,
    pub raw_input: f64,
    pub buffer: Vec<f64>,
    pub severity: Severity,
    pub kind: AlarmKind,
    pub alarm_limits: AlarmLimits,
    pub last_alarm_value: f64,
    pub last_value_notified: f64,
    pub last_archive_notified: f64,
    pub undefined: bool,
    pub last_processed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AverageRecord {
    name: String,
    average: CircularAverage,
    alarms: AlarmEvaluator,
    monitor: ChangeMonitor,
    undefined: bool,
    last_processed: Option<DateTime<Utc>>,
    warnings: Vec<ConfigWarning>,
}

impl AverageRecord {
    /// Initialize a record. Capacity below 1 is clamped (see `warnings`);
    /// failure to allocate the window is fatal for this record.
    pub fn new(mut config: RecordConfig) -> Result<Self, RecordError> {
        let warnings = config.normalize();
        let capacity = config.slot_count();

        let average = CircularAverage::new(capacity).map_err(|e| {
            error!(record = %config.name, capacity, "Sample buffer allocation failed.");
            e
        })?;

        debug!(
            record = %config.name,
            capacity,
            hysteresis = config.alarms.hysteresis,
            "Average record initialized."
        );

        Ok(Self {
            name: config.name,
            average,
            alarms: AlarmEvaluator::new(config.alarms),
            monitor: ChangeMonitor::new(config.deadbands),
            undefined: true,
            last_processed: None,
            warnings,
        })
    }

    /// Report an input-link alarm for the next scan. It competes with the
    /// band alarms; the most severe one is latched.
    pub fn raise_link_alarm(&mut self, severity: Severity) -> bool {
        self.alarms.raise(AlarmKind::Link, severity)
    }

    /// Run one scan over `raw_input`.
    pub fn process(&mut self, raw_input: f64) -> ProcessOutcome {
        let average = self.average.submit(raw_input);
        let timestamp = Utc::now();

        let previous = self.alarms.latched();
        self.alarms.evaluate(average, self.undefined);

        let mut notifications = Notifications::empty();
        if self.alarms.latch() {
            let current = self.alarms.latched();
            info!(
                record = %self.name,
                value = average,
                from = %previous.kind,
                to = %current.kind,
                severity = %current.severity,
                "Alarm state changed."
            );
            notifications |= Notifications::ALARM;
        }
        notifications |= self.monitor.evaluate(average);

        self.undefined = false;
        self.last_processed = Some(timestamp);

        let latched = self.alarms.latched();
        ProcessOutcome {
            average,
            notifications,
            severity: latched.severity,
            kind: latched.kind,
            timestamp,
        }
    }

    /// Run one scan and hand any fired classes to `sink`.
    pub fn process_and_post<S: EventSink + ?Sized>(
        &mut self,
        raw_input: f64,
        sink: &mut S,
    ) -> ProcessOutcome {
        let outcome = self.process(raw_input);
        if !outcome.notifications.is_empty() {
            sink.post_events(&self.name, outcome.average, outcome.notifications);
        }
        outcome
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn average(&self) -> f64 {
        self.average.average()
    }

    pub fn capacity(&self) -> usize {
        self.average.capacity()
    }

    /// Read-only view of the averaging window.
    pub fn buffer(&self) -> &[f64] {
        self.average.buffer()
    }

    pub fn is_undefined(&self) -> bool {
        self.undefined
    }

    pub fn severity(&self) -> Severity {
        self.alarms.latched().severity
    }

    pub fn alarm_kind(&self) -> AlarmKind {
        self.alarms.latched().kind
    }

    /// Coercions applied to the configuration at initialization.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        let latched = self.alarms.latched();
        RecordSnapshot {
            name: self.name.clone(),
            capacity: self.average.capacity(),
            write_index: self.average.write_index(),
            running_sum: self.average.running_sum(),
            average: self.average.average(),
            raw_input: self.average.raw_input(),
            buffer: self.average.buffer().to_vec(),
            severity: latched.severity,
            kind: latched.kind,
            alarm_limits: *self.alarms.limits(),
            last_alarm_value: self.alarms.last_alarm_value(),
            last_value_notified: self.monitor.last_value_notified(),
            last_archive_notified: self.monitor.last_archive_notified(),
            undefined: self.undefined,
            last_processed: self.last_processed,
        }
    }
}
