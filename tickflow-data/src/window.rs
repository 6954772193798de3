//! Fixed-capacity sliding window over scalar price observations.
//!
//! The same windowing drives both sides of the model boundary: online, the
//! live consumer pushes one tick at a time and fires inference once the
//! window is full; offline, [`training_pairs`] slides the identical window
//! across a recorded series to cut training sequences.

use std::collections::VecDeque;

/// Insertion-ordered queue of the most recent observations, capped at a fixed
/// capacity.
///
/// Two states: *Filling* (`len < capacity`) and *Ready* (`len == capacity`).
/// Ready is reached the instant the capacity-th value arrives and is permanent
/// afterwards; at capacity every push evicts the oldest value first, so the
/// length never exceeds the capacity.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    /// Capacity must be positive; a zero-length model input is meaningless.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append `value` at the tail, evicting the head first when at capacity.
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// True iff the window holds exactly `capacity` values.
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// The current window contents, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}

/// One offline training example: an ordered input window and the value that
/// immediately followed it.
#[derive(Clone, PartialEq, Debug)]
pub struct TrainingPair {
    pub window: Vec<f64>,
    pub target: f64,
}

/// Cut every valid `(window, next value)` pair from `series` by sliding a
/// window of `capacity` across it with stride 1.
///
/// Produces `series.len() - capacity` pairs (zero when the series is too
/// short). Replaying the same series through [`SlidingWindow`] one value at a
/// time yields the identical windows in the identical order, so offline
/// training and online inference see the same sequence partitioning.
pub fn training_pairs(series: &[f64], capacity: usize) -> Vec<TrainingPair> {
    let capacity = capacity.max(1);
    if series.len() <= capacity {
        return Vec::new();
    }

    (0..series.len() - capacity)
        .map(|index| TrainingPair {
            window: series[index..index + capacity].to_vec(),
            target: series[index + capacity],
        })
        .collect()
}
