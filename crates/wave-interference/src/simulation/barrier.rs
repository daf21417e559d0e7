//! Barrier and slit apertures.
//!
//! A barrier is a vertical wall spanning the full lattice height (damping
//! rows included, so waves cannot slip around it) with zero, one or two
//! openings. Changing the configuration regenerates the lattice mask.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lattice::{CellType, Lattice};

/// Wall thickness in cells.
pub const BARRIER_THICKNESS: usize = 2;

/// Kind of obstruction placed in the wave area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierType {
    /// No barrier.
    #[default]
    None,
    /// Wall with a single slit.
    OneSlit,
    /// Wall with two slits.
    TwoSlits,
}

/// Barrier placement in scene length units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierConfig {
    #[serde(default)]
    pub barrier_type: BarrierType,
    /// Distance of the wall from the left edge of the visible region.
    pub position: f64,
    /// Opening width of each slit.
    pub slit_width: f64,
    /// Center-to-center distance between the two slits.
    pub slit_separation: f64,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            barrier_type: BarrierType::None,
            position: 30.0,
            slit_width: 4.0,
            slit_separation: 12.0,
        }
    }
}

/// Barrier resolved to lattice cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrierGeometry {
    /// Wall columns.
    pub columns: Range<usize>,
    /// Open row ranges through the wall.
    pub openings: Vec<Range<usize>>,
}

impl BarrierGeometry {
    /// Whether a row passes through the wall.
    pub fn is_open_row(&self, j: usize) -> bool {
        self.openings.iter().any(|opening| opening.contains(&j))
    }
}

impl BarrierConfig {
    /// Resolve to cells for a lattice whose cells are `cell_size` units wide.
    ///
    /// Returns `None` for [`BarrierType::None`].
    pub fn geometry(&self, lattice: &Lattice, cell_size: f64) -> Option<BarrierGeometry> {
        if self.barrier_type == BarrierType::None {
            return None;
        }

        let bounds = lattice.visible_bounds();
        let offset = (self.position / cell_size)
            .round()
            .clamp(0.0, bounds.width() as f64) as usize;
        let start = (bounds.min_x + offset).min(bounds.max_x - BARRIER_THICKNESS.min(bounds.width()));
        let columns = start..(start + BARRIER_THICKNESS).min(bounds.max_x);

        let center = (bounds.min_y + bounds.height() / 2) as f64;
        let half_width = self.slit_width / cell_size / 2.0;
        let half_separation = self.slit_separation / cell_size / 2.0;

        let centers: Vec<f64> = match self.barrier_type {
            BarrierType::None => Vec::new(),
            BarrierType::OneSlit => vec![center],
            BarrierType::TwoSlits => vec![center - half_separation, center + half_separation],
        };

        let height = lattice.height();
        let openings = centers
            .into_iter()
            .map(|c| slit_rows(c, half_width, height))
            .collect();

        Some(BarrierGeometry { columns, openings })
    }

    /// Regenerate the lattice mask for this barrier.
    pub fn apply(&self, lattice: &mut Lattice, cell_size: f64) {
        lattice.clear_mask();
        let Some(geometry) = self.geometry(lattice, cell_size) else {
            debug!("Barrier removed");
            return;
        };

        for i in geometry.columns.clone() {
            for j in 0..lattice.height() {
                if !geometry.is_open_row(j) {
                    lattice.set_cell_type(i as i32, j as i32, CellType::Barrier);
                }
            }
        }
        debug!(
            barrier = ?self.barrier_type,
            columns = ?geometry.columns,
            openings = ?geometry.openings,
            "Barrier mask regenerated"
        );
    }
}

/// Rows within `half_width` of `center`, at least the nearest row.
fn slit_rows(center: f64, half_width: f64, height: usize) -> Range<usize> {
    let mut first = (center - half_width).ceil();
    let mut last = (center + half_width).floor();
    if first > last {
        first = center.round();
        last = first;
    }
    let first = first.clamp(0.0, (height - 1) as f64) as usize;
    let last = last.clamp(0.0, (height - 1) as f64) as usize;
    first..last + 1
}
