//! Lattice holding the discretized wave field.
//!
//! Uses Structure of Arrays (SoA) layout, row-major, with three preallocated
//! time-slice buffers whose roles (previous, current, next) rotate by index
//! on every step. Nothing is reallocated after construction.

use super::physics::COURANT_SQUARED;
use crate::error::{Result, WaveError};

/// Magnitude above which a cell counts as reached by a wave.
pub const VISITED_THRESHOLD: f32 = 1e-2;

/// How a cell takes part in wave propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellType {
    /// Normal cell - wave propagates freely.
    #[default]
    Normal,
    /// Barrier - impassable, held at exactly zero.
    Barrier,
    /// Attenuator - propagates, scaled by its transmission coefficient.
    Attenuator,
}

/// Half-open cell range of the region inside the damping border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleBounds {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl VisibleBounds {
    pub fn width(&self) -> usize {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y
    }

    pub fn contains(&self, i: i32, j: i32) -> bool {
        i >= self.min_x as i32
            && j >= self.min_y as i32
            && i < self.max_x as i32
            && j < self.max_y as i32
    }
}

/// Observer notified synchronously after each completed lattice step.
pub trait LatticeListener {
    /// Called once per step, after rotation, in registration order.
    fn lattice_changed(&mut self, lattice: &Lattice);
}

impl<F> LatticeListener for F
where
    F: FnMut(&Lattice),
{
    fn lattice_changed(&mut self, lattice: &Lattice) {
        self(lattice)
    }
}

/// 2D wave field advanced with an explicit finite-difference scheme.
///
/// Width and height include the damping border on both sides; the visible
/// region is `[damp_x, width - damp_x) x [damp_y, height - damp_y)`.
pub struct Lattice {
    width: usize,
    height: usize,
    damp_x: usize,
    damp_y: usize,

    /// Time slices; roles are assigned by `current`.
    buffers: [Vec<f32>; 3],
    /// Index of the buffer holding the present values.
    current: usize,

    /// Cell types for the barrier/aperture mask.
    cell_types: Vec<CellType>,
    /// Transmission per cell (0 = blocked, 1 = open).
    transmission: Vec<f32>,
    /// Damping factor per cell, 1 inside the visible region.
    damping: Vec<f32>,
    /// Cells whose magnitude has exceeded [`VISITED_THRESHOLD`].
    visited: Vec<bool>,

    step_count: u64,
    listeners: Vec<Box<dyn LatticeListener>>,
}

impl Lattice {
    /// Create a lattice of `width x height` cells with the given damping
    /// border thickness.
    pub fn new(width: usize, height: usize, damp_x: usize, damp_y: usize) -> Result<Self> {
        if width < 3 || height < 3 || width <= 2 * damp_x || height <= 2 * damp_y {
            return Err(WaveError::LatticeTooSmall {
                width,
                height,
                damp_x,
                damp_y,
            });
        }

        let size = width * height;
        let mut lattice = Self {
            width,
            height,
            damp_x,
            damp_y,
            buffers: [vec![0.0; size], vec![0.0; size], vec![0.0; size]],
            current: 0,
            cell_types: vec![CellType::Normal; size],
            transmission: vec![1.0; size],
            damping: vec![1.0; size],
            visited: vec![false; size],
            step_count: 0,
            listeners: Vec::new(),
        };
        lattice.initialize_damping();
        Ok(lattice)
    }

    /// Precompute the absorbing border profile.
    fn initialize_damping(&mut self) {
        let fx: Vec<f32> = (0..self.width)
            .map(|i| border_factor(i, self.width, self.damp_x))
            .collect();
        let fy: Vec<f32> = (0..self.height)
            .map(|j| border_factor(j, self.height, self.damp_y))
            .collect();

        for (j, row) in self.damping.chunks_mut(self.width).enumerate() {
            for (i, factor) in row.iter_mut().enumerate() {
                *factor = fx[i].min(fy[j]);
            }
        }
    }

    /// Convert in-bounds (i, j) coordinates to a linear index.
    #[inline(always)]
    fn idx(&self, i: i32, j: i32) -> Option<usize> {
        if i >= 0 && j >= 0 && (i as usize) < self.width && (j as usize) < self.height {
            Some(j as usize * self.width + i as usize)
        } else {
            None
        }
    }

    #[inline(always)]
    fn previous_index(&self) -> usize {
        (self.current + 2) % 3
    }

    #[inline(always)]
    fn next_index(&self) -> usize {
        (self.current + 1) % 3
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn damp_x(&self) -> usize {
        self.damp_x
    }

    pub fn damp_y(&self) -> usize {
        self.damp_y
    }

    /// Number of completed steps since construction.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Cell range inside the damping border.
    pub fn visible_bounds(&self) -> VisibleBounds {
        VisibleBounds {
            min_x: self.damp_x,
            min_y: self.damp_y,
            max_x: self.width - self.damp_x,
            max_y: self.height - self.damp_y,
        }
    }

    /// Overwrite a cell of the current time slice.
    ///
    /// Does nothing outside the lattice.
    pub fn set_current_value(&mut self, i: i32, j: i32, value: f32) {
        if let Some(idx) = self.idx(i, j) {
            self.buffers[self.current][idx] = value;
        }
    }

    /// Present value of a cell, or `NaN` outside the lattice.
    pub fn current_value(&self, i: i32, j: i32) -> f32 {
        self.idx(i, j)
            .map_or(f32::NAN, |idx| self.buffers[self.current][idx])
    }

    /// Value of a cell one step ago, or `NaN` outside the lattice.
    pub fn previous_value(&self, i: i32, j: i32) -> f32 {
        self.idx(i, j)
            .map_or(f32::NAN, |idx| self.buffers[self.previous_index()][idx])
    }

    /// Current values as a flat slice (row-major order).
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.buffers[self.current]
    }

    /// Advance one step and notify listeners.
    pub fn step(&mut self) {
        self.advance();
        self.emit_changed();
    }

    /// Perform one FDTD update without notifying listeners.
    ///
    /// Discretized wave equation:
    /// u[n+1] = 2*u[n] - u[n-1] + C²*(u_N + u_S + u_E + u_W - 4*u)
    ///
    /// Barrier cells are held at zero, attenuators are scaled by their
    /// transmission and every cell is multiplied by its damping factor.
    pub fn advance(&mut self) {
        let width = self.width;
        let height = self.height;
        let ci = self.current;
        let pi = self.previous_index();
        let ni = self.next_index();

        // The next slice is the oldest buffer; take it to borrow the others.
        let mut next = std::mem::take(&mut self.buffers[ni]);
        {
            let current = &self.buffers[ci];
            let previous = &self.buffers[pi];
            let visited = &mut self.visited;

            for j in 1..height - 1 {
                let row_start = j * width;
                for i in 1..width - 1 {
                    let idx = row_start + i;

                    let value = match self.cell_types[idx] {
                        CellType::Barrier => 0.0,
                        cell_type => {
                            let u = current[idx];
                            let laplacian = current[idx - width]
                                + current[idx + width]
                                + current[idx - 1]
                                + current[idx + 1]
                                - 4.0 * u;
                            let mut u_new = 2.0 * u - previous[idx] + COURANT_SQUARED * laplacian;
                            if cell_type == CellType::Attenuator {
                                u_new *= self.transmission[idx];
                            }
                            u_new * self.damping[idx]
                        }
                    };

                    next[idx] = value;
                    if value.abs() > VISITED_THRESHOLD {
                        visited[idx] = true;
                    }
                }
            }

            // Outermost ring has damping factor zero.
            for i in 0..width {
                next[i] = 0.0;
                next[(height - 1) * width + i] = 0.0;
            }
            for j in 1..height - 1 {
                next[j * width] = 0.0;
                next[j * width + width - 1] = 0.0;
            }
        }
        self.buffers[ni] = next;

        // next -> current, current -> previous
        self.current = ni;
        self.step_count += 1;
    }

    /// Notify all listeners that the field changed.
    pub fn emit_changed(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener.lattice_changed(self);
        }
        self.listeners = listeners;
    }

    /// Register a listener; listeners run in registration order.
    pub fn add_listener(&mut self, listener: impl LatticeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Zero all time slices and visited flags.
    pub fn clear(&mut self) {
        for buffer in self.buffers.iter_mut() {
            buffer.fill(0.0);
        }
        self.visited.fill(false);
    }

    /// Set the cell type at the given position.
    ///
    /// Barrier cells are zeroed immediately in every time slice.
    pub fn set_cell_type(&mut self, i: i32, j: i32, cell_type: CellType) {
        if let Some(idx) = self.idx(i, j) {
            self.cell_types[idx] = cell_type;
            self.transmission[idx] = match cell_type {
                CellType::Normal => 1.0,
                CellType::Barrier => 0.0,
                CellType::Attenuator => self.transmission[idx],
            };
            if cell_type == CellType::Barrier {
                for buffer in self.buffers.iter_mut() {
                    buffer[idx] = 0.0;
                }
            }
        }
    }

    /// Mark a cell as attenuating with the given transmission (clamped to 0..=1).
    pub fn set_attenuation(&mut self, i: i32, j: i32, transmission: f32) {
        if let Some(idx) = self.idx(i, j) {
            self.cell_types[idx] = CellType::Attenuator;
            self.transmission[idx] = transmission.clamp(0.0, 1.0);
        }
    }

    /// Get the cell type at the given position.
    pub fn cell_type(&self, i: i32, j: i32) -> Option<CellType> {
        self.idx(i, j).map(|idx| self.cell_types[idx])
    }

    /// Whether a cell propagates waves (in bounds and not a barrier).
    pub fn is_open(&self, i: i32, j: i32) -> bool {
        matches!(
            self.cell_type(i, j),
            Some(CellType::Normal | CellType::Attenuator)
        )
    }

    /// Reset every cell to [`CellType::Normal`].
    pub fn clear_mask(&mut self) {
        self.cell_types.fill(CellType::Normal);
        self.transmission.fill(1.0);
    }

    /// Damping factor applied to a cell each step.
    pub fn damping_factor(&self, i: i32, j: i32) -> Option<f32> {
        self.idx(i, j).map(|idx| self.damping[idx])
    }

    /// Whether any wave has reached the cell since the last clear.
    pub fn has_cell_been_visited(&self, i: i32, j: i32) -> bool {
        self.idx(i, j).is_some_and(|idx| self.visited[idx])
    }

    /// Bilinear interpolation at fractional cell coordinates.
    ///
    /// Returns `NaN` outside `[0, width - 1] x [0, height - 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        if !(0.0..=max_x).contains(&x) || !(0.0..=max_y).contains(&y) {
            return f32::NAN;
        }

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let x1 = (x0 + 1).min(self.width as i32 - 1);
        let y1 = (y0 + 1).min(self.height as i32 - 1);
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;

        let c00 = self.current_value(x0, y0);
        let c10 = self.current_value(x1, y0);
        let c01 = self.current_value(x0, y1);
        let c11 = self.current_value(x1, y1);

        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        c0 * (1.0 - ty) + c1 * ty
    }

    /// Current values of the visible region as rows.
    pub fn visible_values(&self) -> Vec<Vec<f32>> {
        let bounds = self.visible_bounds();
        let current = &self.buffers[self.current];
        (bounds.min_y..bounds.max_y)
            .map(|j| current[j * self.width + bounds.min_x..j * self.width + bounds.max_x].to_vec())
            .collect()
    }

    /// Visible values along the horizontal center line.
    pub fn center_line_values(&self) -> Vec<f32> {
        let bounds = self.visible_bounds();
        let j = self.height / 2;
        self.buffers[self.current][j * self.width + bounds.min_x..j * self.width + bounds.max_x]
            .to_vec()
    }

    /// Get the maximum absolute value in the lattice.
    pub fn max_amplitude(&self) -> f32 {
        self.values().iter().map(|v| v.abs()).fold(0.0, f32::max)
    }

    /// Get total energy in the lattice (sum of squared values).
    pub fn total_energy(&self) -> f32 {
        self.values().iter().map(|v| v * v).sum()
    }
}

/// Damping factor for one axis: 1 inside, falling as `1 - (d/damp)^2` to 0
/// at the outermost cell.
fn border_factor(index: usize, len: usize, damp: usize) -> f32 {
    if damp == 0 {
        return 1.0;
    }
    let depth = if index < damp {
        damp - index
    } else if index >= len - damp {
        index - (len - damp) + 1
    } else {
        return 1.0;
    };
    let ratio = depth as f32 / damp as f32;
    1.0 - ratio * ratio
}
