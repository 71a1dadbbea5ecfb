//! Threshold Alarm Evaluation with Hysteresis
//!
//! Four bands are checked in fixed priority (HIHI, LOLO, HIGH, LOW) and the
//! first match wins. A band that latched an alarm keeps matching until the
//! value is more than `hysteresis` clear of its threshold, which stops the
//! alarm from chattering when the value hovers at the limit.
//!
//! Bands are not validated against each other. Overlapping bands, or a
//! hysteresis wider than the gap between two thresholds, can hold an alarm
//! indefinitely; that is a configuration problem, not something corrected here.

use crate::config::{AlarmLimits, Band};
use crate::signal::{AlarmKind, Severity};
use serde::{Deserialize, Serialize};

/// Alarm collected during one scan, before it is latched onto the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingAlarm {
    pub severity: Severity,
    pub kind: AlarmKind,
}

impl PendingAlarm {
    /// Raise the pending alarm if `severity` outranks what is already pending.
    ///
    /// Returns `true` only when the pending alarm changed. Equal severities do
    /// not replace the earlier alarm.
    pub fn raise(&mut self, kind: AlarmKind, severity: Severity) -> bool {
        if severity > self.severity {
            self.severity = severity;
            self.kind = kind;
            true
        } else {
            false
        }
    }
}

/// Alarm currently latched on the record (what the host displays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LatchedAlarm {
    pub severity: Severity,
    pub kind: AlarmKind,
}

impl LatchedAlarm {
    /// State of a record that has never completed a scan.
    pub fn undefined() -> Self {
        Self {
            severity: Severity::Invalid,
            kind: AlarmKind::Undefined,
        }
    }

    /// Move the scan's pending alarm into the latch and clear the pending
    /// slot for the next scan. Returns `true` if severity or kind changed.
    pub fn latch(&mut self, pending: &mut PendingAlarm) -> bool {
        let changed = self.severity != pending.severity || self.kind != pending.kind;
        self.severity = pending.severity;
        self.kind = pending.kind;
        *pending = PendingAlarm::default();
        changed
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Upper,
    Lower,
}

impl Direction {
    fn matches(self, value: f64, threshold: f64, hysteresis: f64, last_alarm_value: f64) -> bool {
        match self {
            Self::Upper => {
                value >= threshold
                    || (last_alarm_value == threshold && value >= threshold - hysteresis)
            }
            Self::Lower => {
                value <= threshold
                    || (last_alarm_value == threshold && value <= threshold + hysteresis)
            }
        }
    }
}

/// Classify `value` against `limits`, raising into `pending`.
///
/// Returns the new last-alarm value: the band threshold when a band escalated
/// the pending alarm, unchanged when a band matched without escalating, and
/// `value` itself when every band is clear. An undefined record raises
/// `Invalid`/`Undefined` and leaves the last-alarm value alone.
pub fn check_alarms(
    value: f64,
    undefined: bool,
    limits: &AlarmLimits,
    last_alarm_value: f64,
    pending: &mut PendingAlarm,
) -> f64 {
    if undefined {
        pending.raise(AlarmKind::Undefined, Severity::Invalid);
        return last_alarm_value;
    }

    let bands: [(&Band, AlarmKind, Direction); 4] = [
        (&limits.hihi, AlarmKind::HiHi, Direction::Upper),
        (&limits.lolo, AlarmKind::LoLo, Direction::Lower),
        (&limits.high, AlarmKind::High, Direction::Upper),
        (&limits.low, AlarmKind::Low, Direction::Lower),
    ];

    for (band, kind, direction) in bands {
        if !band.severity.is_enabled() {
            continue;
        }
        if direction.matches(value, band.threshold, limits.hysteresis, last_alarm_value) {
            return if pending.raise(kind, band.severity) {
                band.threshold
            } else {
                last_alarm_value
            };
        }
    }

    // Clear by at least the hysteresis: re-baseline from here.
    value
}

/// Alarm state owned by one record
#[derive(Debug, Clone, Serialize)]
pub struct AlarmEvaluator {
    limits: AlarmLimits,
    last_alarm_value: f64,
    pending: PendingAlarm,
    latched: LatchedAlarm,
}

impl AlarmEvaluator {
    pub fn new(limits: AlarmLimits) -> Self {
        Self {
            limits,
            last_alarm_value: 0.0,
            pending: PendingAlarm::default(),
            latched: LatchedAlarm::undefined(),
        }
    }

    /// Raise an alarm from outside the band check (e.g. a failed input link)
    /// for the scan in progress.
    pub fn raise(&mut self, kind: AlarmKind, severity: Severity) -> bool {
        self.pending.raise(kind, severity)
    }

    pub fn evaluate(&mut self, value: f64, undefined: bool) {
        self.last_alarm_value = check_alarms(
            value,
            undefined,
            &self.limits,
            self.last_alarm_value,
            &mut self.pending,
        );
    }

    /// End-of-scan latch. Returns `true` when the latched alarm changed.
    pub fn latch(&mut self) -> bool {
        self.latched.latch(&mut self.pending)
    }

    pub fn latched(&self) -> LatchedAlarm {
        self.latched
    }

    pub fn last_alarm_value(&self) -> f64 {
        self.last_alarm_value
    }

    pub fn limits(&self) -> &AlarmLimits {
        &self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_only(threshold: f64, hysteresis: f64) -> AlarmLimits {
        AlarmLimits {
            high: Band::new(threshold, Severity::Minor),
            hysteresis,
            ..AlarmLimits::default()
        }
    }

    fn full_limits() -> AlarmLimits {
        AlarmLimits {
            hihi: Band::new(90.0, Severity::Major),
            high: Band::new(70.0, Severity::Minor),
            low: Band::new(30.0, Severity::Minor),
            lolo: Band::new(10.0, Severity::Major),
            hysteresis: 2.0,
        }
    }

    /// Run one scan and return the latched alarm.
    fn scan(eval: &mut AlarmEvaluator, value: f64) -> LatchedAlarm {
        eval.evaluate(value, false);
        eval.latch();
        eval.latched()
    }

    #[test]
    fn test_raise_ignores_ties_and_lower_severities() {
        let mut pending = PendingAlarm::default();
        assert_eq!(pending.severity, Severity::NoAlarm);

        assert!(pending.raise(AlarmKind::High, Severity::Minor));
        assert!(!pending.raise(AlarmKind::Low, Severity::Minor));
        assert_eq!(pending.kind, AlarmKind::High);

        assert!(pending.raise(AlarmKind::Link, Severity::Invalid));
        assert!(!pending.raise(AlarmKind::HiHi, Severity::Major));
        assert_eq!(pending.kind, AlarmKind::Link);
    }

    #[test]
    fn test_undefined_short_circuits() {
        let mut pending = PendingAlarm::default();
        let lalm = check_alarms(1000.0, true, &full_limits(), 12.5, &mut pending);

        assert_eq!(lalm, 12.5);
        assert_eq!(pending.severity, Severity::Invalid);
        assert_eq!(pending.kind, AlarmKind::Undefined);
    }

    #[test]
    fn test_high_band_with_hysteresis() {
        let mut eval = AlarmEvaluator::new(high_only(50.0, 5.0));

        assert_eq!(scan(&mut eval, 40.0).kind, AlarmKind::NoAlarm);
        assert_eq!(eval.last_alarm_value(), 40.0);

        let alarm = scan(&mut eval, 55.0);
        assert_eq!(alarm.kind, AlarmKind::High);
        assert_eq!(alarm.severity, Severity::Minor);
        assert_eq!(eval.last_alarm_value(), 50.0);

        assert_eq!(scan(&mut eval, 52.0).kind, AlarmKind::High);
        assert_eq!(scan(&mut eval, 46.0).kind, AlarmKind::High);
        assert_eq!(scan(&mut eval, 45.0).kind, AlarmKind::High);

        assert_eq!(scan(&mut eval, 40.0).kind, AlarmKind::NoAlarm);
        assert_eq!(eval.last_alarm_value(), 40.0);

        // Without a latched alarm the deadband does not apply.
        assert_eq!(scan(&mut eval, 47.0).kind, AlarmKind::NoAlarm);
    }

    #[test]
    fn test_hihi_holds_inside_deadband() {
        let mut eval = AlarmEvaluator::new(AlarmLimits {
            hihi: Band::new(100.0, Severity::Major),
            hysteresis: 3.0,
            ..AlarmLimits::default()
        });

        assert_eq!(scan(&mut eval, 101.0).kind, AlarmKind::HiHi);
        for v in [100.0, 99.0, 98.5, 97.0] {
            let alarm = scan(&mut eval, v);
            assert_eq!(alarm.kind, AlarmKind::HiHi, "value {} should hold", v);
            assert_eq!(alarm.severity, Severity::Major);
        }
        assert_eq!(scan(&mut eval, 96.999).kind, AlarmKind::NoAlarm);
    }

    #[test]
    fn test_lower_bands_mirror_upper() {
        let mut eval = AlarmEvaluator::new(full_limits());

        assert_eq!(scan(&mut eval, 29.0).kind, AlarmKind::Low);
        assert_eq!(scan(&mut eval, 31.5).kind, AlarmKind::Low);
        assert_eq!(scan(&mut eval, 32.5).kind, AlarmKind::NoAlarm);

        assert_eq!(scan(&mut eval, 5.0).kind, AlarmKind::LoLo);
        // Inside LOLO deadband, and also inside LOW
        assert_eq!(scan(&mut eval, 11.0).kind, AlarmKind::LoLo);
        // LOLO released; plain LOW takes over
        let alarm = scan(&mut eval, 13.0);
        assert_eq!(alarm.kind, AlarmKind::Low);
        assert_eq!(alarm.severity, Severity::Minor);
    }

    #[test]
    fn test_priority_order_hihi_wins() {
        // Every band matches 95 because low/lolo are set above it.
        let limits = AlarmLimits {
            hihi: Band::new(90.0, Severity::Minor),
            high: Band::new(80.0, Severity::Major),
            low: Band::new(200.0, Severity::Major),
            lolo: Band::new(150.0, Severity::Major),
            hysteresis: 0.0,
        };
        let mut pending = PendingAlarm::default();
        let lalm = check_alarms(95.0, false, &limits, 0.0, &mut pending);

        assert_eq!(pending.kind, AlarmKind::HiHi);
        assert_eq!(pending.severity, Severity::Minor);
        assert_eq!(lalm, 90.0);
    }

    #[test]
    fn test_disabled_band_is_skipped() {
        let limits = AlarmLimits {
            hihi: Band::new(90.0, Severity::NoAlarm),
            high: Band::new(70.0, Severity::Minor),
            ..AlarmLimits::default()
        };
        let mut pending = PendingAlarm::default();
        check_alarms(95.0, false, &limits, 0.0, &mut pending);

        assert_eq!(pending.kind, AlarmKind::High);
    }

    #[test]
    fn test_no_escalation_keeps_last_alarm_value() {
        let mut pending = PendingAlarm::default();
        pending.raise(AlarmKind::Link, Severity::Invalid);

        let lalm = check_alarms(75.0, false, &full_limits(), 42.0, &mut pending);

        assert_eq!(lalm, 42.0);
        assert_eq!(pending.kind, AlarmKind::Link);
    }

    #[test]
    fn test_overlapping_hysteresis_never_clears() {
        // Hysteresis wider than the whole operating range.
        let limits = AlarmLimits {
            high: Band::new(50.0, Severity::Minor),
            hysteresis: 1000.0,
            ..AlarmLimits::default()
        };
        let mut eval = AlarmEvaluator::new(limits);

        scan(&mut eval, 60.0);
        for v in [0.0, -100.0, -900.0] {
            assert_eq!(scan(&mut eval, v).kind, AlarmKind::High);
        }
    }

    #[test]
    fn test_new_evaluator_starts_undefined() {
        let mut eval = AlarmEvaluator::new(high_only(50.0, 0.0));
        assert_eq!(eval.latched(), LatchedAlarm::undefined());

        // Undefined on the first scan matches what is already latched.
        eval.evaluate(60.0, true);
        assert!(!eval.latch());
        assert_eq!(eval.latched().severity, Severity::Invalid);
    }

    #[test]
    fn test_latch_reports_transitions() {
        let mut eval = AlarmEvaluator::new(high_only(50.0, 0.0));

        eval.evaluate(60.0, false);
        assert!(eval.latch());
        eval.evaluate(61.0, false);
        assert!(!eval.latch());
        eval.evaluate(10.0, false);
        assert!(eval.latch());
        assert_eq!(eval.latched(), LatchedAlarm::default());
    }
}
