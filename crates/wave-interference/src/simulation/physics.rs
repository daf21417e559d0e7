//! Numerical constants and unit conversions for the wave lattice.

/// Courant number `c * dt / dx` of the lattice update, in cells per step.
///
/// Fixed for every lattice. For the 2D five-point stencil the scheme is
/// stable while this stays at or below `1 / sqrt(2)`.
pub const COURANT_NUMBER: f32 = 0.5;

/// Square of [`COURANT_NUMBER`], the coefficient applied to the Laplacian.
pub const COURANT_SQUARED: f32 = COURANT_NUMBER * COURANT_NUMBER;

/// Simulated seconds advanced by one lattice step.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Lattice steps per simulated second.
pub const STEPS_PER_SECOND: f64 = 60.0;

const _: () = assert!(COURANT_NUMBER <= std::f32::consts::FRAC_1_SQRT_2);

/// Conversion between lattice cells/steps and a medium's physical units.
///
/// `cell_size` is the length of one cell in the scene's length unit and
/// `time_scale` is the number of physical seconds that elapse per simulated
/// second, so the same lattice can stand in for a ripple tank or a light
/// beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveUnits {
    /// Length of one lattice cell, in scene length units.
    pub cell_size: f64,
    /// Physical seconds per simulated second.
    pub time_scale: f64,
}

impl WaveUnits {
    /// Create a unit conversion.
    pub fn new(cell_size: f64, time_scale: f64) -> Self {
        Self {
            cell_size,
            time_scale,
        }
    }

    /// Physical time covered by a single lattice step.
    pub fn time_per_step(&self) -> f64 {
        FIXED_DT * self.time_scale
    }

    /// Wave speed in scene length units per physical second.
    pub fn wave_speed(&self) -> f64 {
        COURANT_NUMBER as f64 * STEPS_PER_SECOND * self.cell_size / self.time_scale
    }

    /// Wavelength in scene length units for a frequency in Hz.
    pub fn wavelength(&self, frequency: f64) -> f64 {
        self.wave_speed() / frequency
    }

    /// Number of cells per wavelength for a frequency in Hz.
    pub fn cells_per_wavelength(&self, frequency: f64) -> f64 {
        self.wavelength(frequency) / self.cell_size
    }

    /// Number of lattice steps per oscillation period.
    pub fn steps_per_period(&self, frequency: f64) -> f64 {
        1.0 / (frequency * self.time_per_step())
    }

    /// Check that a frequency is resolvable on the lattice.
    ///
    /// Above the stencil's cutoff the disturbance no longer propagates, so
    /// every source needs at least four steps per period.
    pub fn resolves(&self, frequency: f64) -> bool {
        self.steps_per_period(frequency) >= 4.0
    }
}

/// Check if the lattice's Courant number satisfies the CFL condition.
pub fn is_stable() -> bool {
    COURANT_NUMBER <= std::f32::consts::FRAC_1_SQRT_2
}
