//! # Wave Interference
//!
//! Lattice wave engine for water, sound and light interference scenes.
//!
//! A damped scalar lattice advances with the second-order finite-difference
//! wave stencil. Each scene drives it with one or two point sources or a
//! plane wave, may place a one- or two-slit barrier in its path, and reads
//! the result back through probes, a detection-screen intensity average or
//! a field of sound particles.
//!
//! ## Features
//!
//! - Fixed-rate stepping decoupled from the host frame rate
//! - Phase-continuous frequency changes
//! - Pulse and continuous sources
//! - Absorbing border with a quadratic damping profile
//! - TOML and environment configuration
//!
//! ## Run
//!
//! ```bash
//! cargo run -p wave-interference -- --scene light --barrier two-slits
//! ```

pub mod config;
pub mod error;
pub mod simulation;

pub use config::{from_toml_str, load_config, SimulationConfig};
pub use error::{Result, WaveError};
pub use simulation::{
    BarrierConfig, BarrierType, Lattice, LatticeListener, Medium, Scene, SceneConfig,
    WaveTemporalType, WavesModel,
};
