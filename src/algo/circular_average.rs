use crate::error::RecordError;
use serde::Serialize;

/// Fixed-window moving average backed by a circular buffer.
///
/// The sum of the window is carried forward one sample at a time, so each
/// update costs O(1) no matter how wide the window is. Slots start at zero,
/// which means the first `capacity - 1` averages include the zero fill.
///
/// Samples are not filtered. A NaN (or infinite) sample poisons the running
/// sum for the life of the window, even after the slot holding it is
/// overwritten, and every later average is NaN. Alarm bands never match NaN,
/// so such a record reads as clear; hosts should mark a non-finite input as
/// an invalid link alarm rather than submit it.
#[derive(Serialize, Clone, Debug)]
pub struct CircularAverage {
    buffer: Vec<f64>,
    /// `None` until the first sample lands
    write_index: Option<usize>,
    running_sum: f64,
    average: f64,
    raw_input: f64,
}

impl CircularAverage {
    /// Allocate a zero-filled window. `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Result<Self, RecordError> {
        let capacity = capacity.max(1);

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| RecordError::Allocation { capacity })?;
        buffer.resize(capacity, 0.0);

        Ok(Self {
            buffer,
            write_index: None,
            running_sum: 0.0,
            average: 0.0,
            raw_input: 0.0,
        })
    }

    /// Push one sample and return the new average.
    pub fn submit(&mut self, sample: f64) -> f64 {
        let idx = match self.write_index {
            Some(i) if i + 1 < self.buffer.len() => i + 1,
            _ => 0,
        };
        self.write_index = Some(idx);
        self.raw_input = sample;

        // Evicted slot must be read before it is overwritten.
        self.running_sum = self.running_sum + sample - self.buffer[idx];
        self.buffer[idx] = sample;
        self.average = self.running_sum / self.buffer.len() as f64;

        self.average
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Window contents in storage order (not oldest-first).
    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    pub fn write_index(&self) -> Option<usize> {
        self.write_index
    }

    pub fn running_sum(&self) -> f64 {
        self.running_sum
    }

    pub fn raw_input(&self) -> f64 {
        self.raw_input
    }
}
