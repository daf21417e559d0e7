//! Time-averaged intensity along the detection screen.

use super::lattice::Lattice;

/// Weight kept from the previous average on each sample.
pub const INTENSITY_DECAY: f32 = 0.95;

/// Running average of squared amplitude, one entry per visible row of the
/// screen column (the rightmost visible column).
#[derive(Debug, Clone)]
pub struct IntensitySampler {
    column: i32,
    first_row: i32,
    values: Vec<f32>,
}

impl IntensitySampler {
    /// Create a sampler for the rightmost visible column of `lattice`.
    pub fn new(lattice: &Lattice) -> Self {
        let bounds = lattice.visible_bounds();
        Self {
            column: bounds.max_x as i32 - 1,
            first_row: bounds.min_y as i32,
            values: vec![0.0; bounds.height()],
        }
    }

    /// Lattice column the screen reads.
    pub fn column(&self) -> i32 {
        self.column
    }

    /// Fold the lattice's current screen column into the running average.
    pub fn sample(&mut self, lattice: &Lattice) {
        for (row, intensity) in self.values.iter_mut().enumerate() {
            let value = lattice.current_value(self.column, self.first_row + row as i32);
            if value.is_finite() {
                *intensity = *intensity * INTENSITY_DECAY + value * value * (1.0 - INTENSITY_DECAY);
            }
        }
    }

    /// Current intensity per visible row.
    pub fn intensity_values(&self) -> &[f32] {
        &self.values
    }

    /// Largest intensity on the screen.
    pub fn peak(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }
}
