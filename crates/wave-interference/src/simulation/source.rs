//! Oscillating wave sources.
//!
//! Supports two excitation modes:
//! - Continuous sinusoidal emission while the source button is on
//! - Pulse: one windowed cycle per trigger
//!
//! and keeps the emitted curve continuous when the frequency changes.

use std::f64::consts::{PI, TAU};

use tracing::debug;

/// Excitation mode of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveTemporalType {
    /// One bounded wave packet per trigger.
    Pulse,
    /// Indefinite sinusoidal emission.
    #[default]
    Continuous,
}

/// Firing state of a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitterState {
    /// Not emitting.
    Idle,
    /// Pulse requested; starts on the next step.
    PulsePending,
    /// Pulse in flight.
    PulseFiring {
        /// Scene time at which the pulse started.
        start: f64,
        /// Duration of the pulse, one period of the frequency at start.
        period: f64,
    },
    /// Emitting every step.
    ContinuousRunning,
}

impl EmitterState {
    /// Whether a pulse has been triggered and not yet finished.
    pub fn is_pulse_firing(&self) -> bool {
        matches!(self, Self::PulsePending | Self::PulseFiring { .. })
    }
}

/// Phase that keeps `sin(ω·t + φ)` and its direction of motion continuous
/// when the angular frequency jumps from `old_angular` to `new_angular` at
/// time `time`.
///
/// The primary arcsine branch is used when it preserves the sign of the
/// derivative, otherwise the branch shifted by half a cycle. The result is
/// normalized to `[0, 2π)`.
pub fn continuous_phase(old_angular: f64, old_phase: f64, time: f64, new_angular: f64) -> f64 {
    let old_argument = old_angular * time + old_phase;
    let value = old_argument.sin().clamp(-1.0, 1.0);
    let old_derivative = old_argument.cos();

    let arcsine = value.asin();
    let mut phase = arcsine - new_angular * time;
    let new_derivative = (new_angular * time + phase).cos();
    if old_derivative.signum() != new_derivative.signum() {
        phase = PI - arcsine - new_angular * time;
    }
    phase.rem_euclid(TAU)
}

/// Oscillator producing the value written into source cells each step.
#[derive(Debug, Clone)]
pub struct SourceInjector {
    temporal_type: WaveTemporalType,
    state: EmitterState,
    /// Frequency in Hz of the scene's physical time.
    frequency: f64,
    amplitude: f64,
    /// Phase offset in radians.
    phase: f64,
    /// Last emitted value (zero while idle).
    value: f64,
}

impl SourceInjector {
    /// Create an idle injector.
    pub fn new(temporal_type: WaveTemporalType, frequency: f64, amplitude: f64) -> Self {
        Self {
            temporal_type,
            state: EmitterState::Idle,
            frequency,
            amplitude,
            phase: 0.0,
            value: 0.0,
        }
    }

    pub fn temporal_type(&self) -> WaveTemporalType {
        self.temporal_type
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Angular frequency in radians per physical second.
    pub fn angular_frequency(&self) -> f64 {
        TAU * self.frequency
    }

    /// Last emitted value, zero when nothing was emitted.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether a pulse is pending or in flight (UI disables re-triggering).
    pub fn is_pulse_firing(&self) -> bool {
        self.state.is_pulse_firing()
    }

    /// Switch excitation mode. Always returns to [`EmitterState::Idle`].
    pub fn set_temporal_type(&mut self, temporal_type: WaveTemporalType) {
        if self.temporal_type != temporal_type {
            debug!(from = ?self.temporal_type, to = ?temporal_type, "Temporal type changed");
        }
        self.temporal_type = temporal_type;
        self.state = EmitterState::Idle;
        self.value = 0.0;
    }

    /// Change frequency at scene time `time`, keeping the curve continuous.
    pub fn set_frequency(&mut self, frequency: f64, time: f64) {
        let old_angular = self.angular_frequency();
        self.frequency = frequency;
        self.phase = continuous_phase(old_angular, self.phase, time, self.angular_frequency());
    }

    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// Request a pulse. Returns `false` if ignored (continuous mode, or a
    /// pulse is already pending or firing).
    pub fn fire_pulse(&mut self) -> bool {
        if self.temporal_type != WaveTemporalType::Pulse || self.state != EmitterState::Idle {
            return false;
        }
        self.state = EmitterState::PulsePending;
        debug!("Pulse requested");
        true
    }

    /// Toggle continuous emission. Ignored in pulse mode.
    pub fn set_continuous_on(&mut self, on: bool) {
        if self.temporal_type != WaveTemporalType::Continuous {
            return;
        }
        self.state = if on {
            EmitterState::ContinuousRunning
        } else {
            EmitterState::Idle
        };
        if !on {
            self.value = 0.0;
        }
    }

    /// Whether continuous emission is switched on.
    pub fn is_continuous_on(&self) -> bool {
        self.state == EmitterState::ContinuousRunning
    }

    /// Advance the state machine to scene time `time` and return the value
    /// to write into source cells, or `None` when the source is silent.
    pub fn step(&mut self, time: f64) -> Option<f64> {
        let emission = match self.state {
            EmitterState::Idle => None,
            EmitterState::ContinuousRunning => Some(
                self.amplitude * (self.angular_frequency() * time + self.phase).sin(),
            ),
            EmitterState::PulsePending => {
                self.state = EmitterState::PulseFiring {
                    start: time,
                    period: 1.0 / self.frequency,
                };
                Some(0.0)
            }
            EmitterState::PulseFiring { start, period } => {
                let elapsed = time - start;
                if elapsed >= period {
                    debug!("Pulse completed");
                    self.state = EmitterState::Idle;
                    None
                } else {
                    Some(self.amplitude * (TAU * elapsed / period).sin())
                }
            }
        };
        self.value = emission.unwrap_or(0.0);
        emission
    }

    /// Return to idle with zero phase.
    pub fn reset(&mut self) {
        self.state = EmitterState::Idle;
        self.phase = 0.0;
        self.value = 0.0;
    }
}
