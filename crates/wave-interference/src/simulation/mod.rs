//! Simulation core for the wave interference lattice.

pub mod barrier;
pub mod clock;
pub mod intensity;
pub mod lattice;
pub mod model;
pub mod particles;
pub mod physics;
pub mod probe;
pub mod scene;
pub mod source;

pub use barrier::{BarrierConfig, BarrierGeometry, BarrierType, BARRIER_THICKNESS};
pub use clock::{SimulationClock, TimeSpeed};
pub use intensity::{IntensitySampler, INTENSITY_DECAY};
pub use lattice::{CellType, Lattice, LatticeListener, VisibleBounds};
pub use model::WavesModel;
pub use particles::{ParticleParams, SoundParticle, SoundParticles};
pub use physics::{WaveUnits, COURANT_NUMBER, FIXED_DT};
pub use probe::{ProbeSample, WaveProbe};
pub use scene::{Medium, ScaleIndicator, Scene, SceneConfig, SourceCount, SourceKind};
pub use source::{EmitterState, SourceInjector, WaveTemporalType};
