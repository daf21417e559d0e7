//! Fixed-rate stepping clock.
//!
//! Converts wall-clock frame intervals into whole lattice ticks so the
//! simulation's stability never depends on the host's frame rate.

use serde::{Deserialize, Serialize};

use super::physics::FIXED_DT;

/// Longest frame interval honoured; longer frames are clamped.
pub const MAX_FRAME_DT: f64 = FIXED_DT;

/// Playback speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSpeed {
    #[default]
    Normal,
    Slow,
}

impl TimeSpeed {
    /// Fraction of wall-clock time that becomes simulated time.
    pub fn factor(self) -> f64 {
        match self {
            TimeSpeed::Normal => 1.0,
            TimeSpeed::Slow => 0.25,
        }
    }
}

/// Accumulates frame time and emits fixed-size ticks.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    playing: bool,
    speed: TimeSpeed,
    accumulator: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(TimeSpeed::Normal)
    }
}

impl SimulationClock {
    pub fn new(speed: TimeSpeed) -> Self {
        Self {
            playing: true,
            speed,
            accumulator: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn speed(&self) -> TimeSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: TimeSpeed) {
        self.speed = speed;
    }

    /// Feed one frame interval; returns the number of ticks to run.
    ///
    /// Paused clocks and non-finite or negative intervals produce no ticks.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if !self.playing || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME_DT) * self.speed.factor();

        // Tolerate rounding so that 1/60 s frames yield exactly one tick.
        let epsilon = FIXED_DT * 1e-6;
        let mut ticks = 0;
        while self.accumulator + epsilon >= FIXED_DT {
            self.accumulator = (self.accumulator - FIXED_DT).max(0.0);
            ticks += 1;
        }
        ticks
    }

    /// Drop any partial tick.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
