//! Error types for the wave interference engine.

use thiserror::Error;

/// Result type for wave interference operations.
pub type Result<T> = std::result::Result<T, WaveError>;

/// Errors that can occur while configuring a lattice or a scene.
///
/// Stepping never fails: out-of-range lattice access is a sentinel, and the
/// Courant number is fixed at compile time.
#[derive(Error, Debug)]
pub enum WaveError {
    /// A user-facing parameter was rejected at its setter.
    #[error("Invalid value for {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Lattice dimensions leave no visible region inside the damping border.
    #[error("Lattice {width}x{height} too small for damping border {damp_x}x{damp_y}")]
    LatticeTooSmall {
        /// Total width in cells.
        width: usize,
        /// Total height in cells.
        height: usize,
        /// Horizontal border thickness.
        damp_x: usize,
        /// Vertical border thickness.
        damp_y: usize,
    },

    /// Configuration is structurally valid but semantically wrong.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration could not be loaded or deserialized.
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}

impl WaveError {
    /// Create an invalid parameter error.
    pub fn invalid(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
