//! Stats Series Module
//! Holds the parallel fuzzer counter sequences and derives axis labels.

use chrono::DateTime;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Series '{name}' has {actual} samples, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("No samples")]
    Empty,
}

/// Format a unix timestamp (seconds) as `MM-DD HH:MM` in UTC.
pub fn timestamp_label(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%m-%d %H:%M").to_string(),
        // Out of chrono's representable range; show the raw seconds
        None => ts.to_string(),
    }
}

/// Time series read from one fuzzer instance.
///
/// All sequences are index-aligned with `last_update`; a `None` counter value
/// is a gap and renders as a break, never as an interpolated point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSeries {
    pub last_update: Vec<i64>,
    pub pending_total: Vec<Option<f64>>,
    pub pending_favs: Vec<Option<f64>>,
    pub unique_crashes: Vec<Option<f64>>,
    pub unique_hangs: Vec<Option<f64>>,
}

impl StatsSeries {
    pub fn len(&self) -> usize {
        self.last_update.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_update.is_empty()
    }

    /// Append one sample, keeping all sequences aligned.
    pub fn push_sample(
        &mut self,
        last_update: i64,
        pending_total: Option<f64>,
        pending_favs: Option<f64>,
        unique_crashes: Option<f64>,
        unique_hangs: Option<f64>,
    ) {
        self.last_update.push(last_update);
        self.pending_total.push(pending_total);
        self.pending_favs.push(pending_favs);
        self.unique_crashes.push(unique_crashes);
        self.unique_hangs.push(unique_hangs);
    }

    /// One formatted `MM-DD HH:MM` label per sample.
    pub fn labels(&self) -> Vec<String> {
        self.last_update.iter().copied().map(timestamp_label).collect()
    }

    /// Check that every counter sequence matches the timestamp count.
    pub fn validate(&self) -> Result<(), SeriesError> {
        let expected = self.last_update.len();
        let counters: [(&'static str, usize); 4] = [
            ("pending_total", self.pending_total.len()),
            ("pending_favs", self.pending_favs.len()),
            ("unique_crashes", self.unique_crashes.len()),
            ("unique_hangs", self.unique_hangs.len()),
        ];
        for (name, actual) in counters {
            if actual != expected {
                return Err(SeriesError::LengthMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
