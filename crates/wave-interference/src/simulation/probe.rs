//! Point probes recording the wave field over time.

use std::collections::VecDeque;

use super::lattice::Lattice;

/// Default number of samples a probe keeps.
pub const DEFAULT_PROBE_CAPACITY: usize = 600;

/// One probe reading. `value` is `NaN` when the probe sits outside the
/// lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSample {
    /// Scene time of the reading.
    pub time: f64,
    pub value: f32,
}

/// Sensor at fractional lattice coordinates with a bounded history.
#[derive(Debug, Clone)]
pub struct WaveProbe {
    x: f32,
    y: f32,
    capacity: usize,
    samples: VecDeque<ProbeSample>,
}

impl WaveProbe {
    pub fn new(x: f32, y: f32) -> Self {
        Self::with_capacity(x, y, DEFAULT_PROBE_CAPACITY)
    }

    pub fn with_capacity(x: f32, y: f32, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            x,
            y,
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Move the probe; history is kept.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Append the field value under the probe.
    pub fn record(&mut self, time: f64, lattice: &Lattice) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(ProbeSample {
            time,
            value: lattice.sample(self.x, self.y),
        });
    }

    /// Most recent reading with data.
    pub fn latest(&self) -> Option<f32> {
        self.samples
            .back()
            .map(|sample| sample.value)
            .filter(|value| value.is_finite())
    }

    /// Oldest-first history.
    pub fn samples(&self) -> impl Iterator<Item = &ProbeSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
