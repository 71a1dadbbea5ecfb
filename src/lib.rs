use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double};

pub mod algo;
pub mod config;
pub mod error;
pub mod record;
pub mod signal;

pub use config::RecordConfig;
pub use error::{ConfigWarning, RecordError};
pub use record::{AverageRecord, EventSink, ProcessOutcome, RecordSnapshot};
pub use signal::{AlarmKind, Notifications, Severity};

/// Scan result handed back across the C ABI
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AvgProcessResult {
    pub average: c_double,
    /// Fired notification classes, host event mask bits
    pub notifications: u16,
    pub severity: u16,
    pub kind: u16,
    /// Scan time, nanoseconds since the Unix epoch
    pub timestamp_ns: i64,
}

impl From<ProcessOutcome> for AvgProcessResult {
    fn from(outcome: ProcessOutcome) -> Self {
        Self {
            average: outcome.average,
            notifications: outcome.notifications.bits(),
            severity: outcome.severity as u16,
            kind: outcome.kind as u16,
            timestamp_ns: outcome.timestamp.timestamp_nanos_opt().unwrap_or(0),
        }
    }
}

// --- Record lifecycle FFI ---
//
// One handle per record instance. The host must serialize calls on a handle.

/// Create a record from a JSON configuration (null selects all defaults).
/// Returns null if the configuration is malformed or the buffer cannot be
/// allocated; such a record must not be processed.
#[unsafe(no_mangle)]
pub extern "C" fn avg_record_create(config_json: *const c_char) -> *mut AverageRecord {
    let config = if config_json.is_null() {
        RecordConfig::default()
    } else {
        let c_str = unsafe { CStr::from_ptr(config_json) };
        let parsed = c_str
            .to_str()
            .map_err(|e| RecordError::InvalidConfig(e.to_string()))
            .and_then(RecordConfig::from_json);
        match parsed {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Rejected record configuration.");
                return std::ptr::null_mut();
            }
        }
    };

    match AverageRecord::new(config) {
        Ok(record) => Box::into_raw(Box::new(record)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn avg_record_free(ptr: *mut AverageRecord) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = Box::from_raw(ptr);
    }
}

/// Process one scan. Returns 0 on success, -1 on a null argument.
#[unsafe(no_mangle)]
pub extern "C" fn avg_record_process(
    ptr: *mut AverageRecord,
    raw_input: c_double,
    out_result: *mut AvgProcessResult,
) -> i32 {
    if ptr.is_null() || out_result.is_null() {
        return -1;
    }

    let record = unsafe { &mut *ptr };
    let result = AvgProcessResult::from(record.process(raw_input));

    unsafe {
        *out_result = result;
    }
    0
}

/// Raise an input-link alarm for the next scan. Unknown severity codes are
/// ignored.
#[unsafe(no_mangle)]
pub extern "C" fn avg_record_raise_link_alarm(ptr: *mut AverageRecord, severity: u16) -> bool {
    if ptr.is_null() {
        return false;
    }
    let Some(severity) = Severity::from_u16(severity) else {
        return false;
    };
    let record = unsafe { &mut *ptr };
    record.raise_link_alarm(severity)
}

/// Copy the averaging window into `out` (up to `out_len` elements).
/// Returns the window length, so a host can size its array with a first
/// call passing a null `out`.
#[unsafe(no_mangle)]
pub extern "C" fn avg_record_buffer(
    ptr: *const AverageRecord,
    out: *mut c_double,
    out_len: usize,
) -> usize {
    if ptr.is_null() {
        return 0;
    }
    let record = unsafe { &*ptr };
    let buffer = record.buffer();

    if !out.is_null() {
        let to_copy = buffer.len().min(out_len);
        unsafe {
            std::ptr::copy_nonoverlapping(buffer.as_ptr(), out, to_copy);
        }
    }
    buffer.len()
}

/// Diagnostic snapshot as JSON. Free with `avg_record_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn avg_record_snapshot_json(ptr: *const AverageRecord) -> *mut c_char {
    if ptr.is_null() {
        return std::ptr::null_mut();
    }
    let record = unsafe { &*ptr };

    serde_json::to_string(&record.snapshot())
        .ok()
        .and_then(|json| CString::new(json).ok())
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn avg_record_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}
