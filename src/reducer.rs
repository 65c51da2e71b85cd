//! Derived-state folds and the chart history window
//!
//! The reducer consumes canonical samples and maintains the engine's
//! externally observable state: the three instantaneous readouts plus a
//! throttled, fixed-capacity window of acceleration points for the chart.
//! Every fold is O(1); the buffer append/evict is amortized O(1). Nothing
//! here blocks.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::types::{AccelerationSample, HistoryPoint, OrientationSample, RotationRateSample};

/// Maximum number of points retained for the chart
pub const HISTORY_CAPACITY: usize = 30;

/// Minimum spacing between consecutive history appends, in milliseconds.
/// Motion events can arrive faster than 60 Hz; the chart does not need to.
pub const HISTORY_THROTTLE_MS: i64 = 100;

/// Fixed-capacity, FIFO-evicting window of acceleration points.
///
/// Points are always in non-decreasing timestamp order: a sample whose
/// timestamp precedes the last append falls under the throttle and is
/// dropped.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
    last_appended_at: Option<DateTime<Utc>>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            last_appended_at: None,
        }
    }

    /// Append the sample unless the throttle window since the last append
    /// has not elapsed yet, evicting oldest-first beyond capacity. Returns
    /// whether the point was retained.
    pub fn offer(&mut self, sample: AccelerationSample, at: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_appended_at {
            if (at - last).num_milliseconds() < HISTORY_THROTTLE_MS {
                return false;
            }
        }

        self.points.push_back(HistoryPoint {
            x: sample.x,
            y: sample.y,
            z: sample.z,
            timestamp: at,
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        self.last_appended_at = Some(at);
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points ordered oldest to newest
    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }
}

/// Folds canonical samples into the externally observable derived state
#[derive(Debug, Clone, Default)]
pub struct SampleReducer {
    acceleration: Option<AccelerationSample>,
    rotation_rate: Option<RotationRateSample>,
    orientation: Option<OrientationSample>,
    history: HistoryBuffer,
}

impl SampleReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reducer with a custom chart window size
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            history: HistoryBuffer::new(capacity),
            ..Self::default()
        }
    }

    /// Every sample replaces the instantaneous readout; the history buffer
    /// additionally retains it when the throttle window allows.
    pub fn apply_acceleration(&mut self, sample: AccelerationSample, at: DateTime<Utc>) {
        self.acceleration = Some(sample);
        self.history.offer(sample, at);
    }

    /// Point-in-time readout only; no history is retained for rotation rate
    pub fn apply_rotation_rate(&mut self, sample: RotationRateSample) {
        self.rotation_rate = Some(sample);
    }

    pub fn apply_orientation(&mut self, sample: OrientationSample) {
        self.orientation = Some(sample);
    }

    pub fn acceleration(&self) -> Option<AccelerationSample> {
        self.acceleration
    }

    pub fn rotation_rate(&self) -> Option<RotationRateSample> {
        self.rotation_rate
    }

    pub fn orientation(&self) -> Option<OrientationSample> {
        self.orientation
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }
}
