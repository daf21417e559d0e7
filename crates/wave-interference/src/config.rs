//! Configuration loading.
//!
//! Built-in presets form the base layer; a TOML file and then
//! `WAVE_INTERFERENCE__*` environment variables override individual keys
//! using the `config` crate, so a file only lists what it changes:
//!
//! ```toml
//! initial_scene = "light"
//! time_speed = "slow"
//!
//! [light]
//! frequency = 7.0e14
//!
//! [light.barrier]
//! barrier_type = "two_slits"
//! ```
//!
//! `WAVE_INTERFERENCE__WATER__FREQUENCY=3` sets the water frequency.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WaveError};
use crate::simulation::clock::TimeSpeed;
use crate::simulation::scene::{Medium, SceneConfig};

const ENV_PREFIX: &str = "WAVE_INTERFERENCE";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Water scene parameters.
    #[serde(default = "SceneConfig::water")]
    pub water: SceneConfig,

    /// Sound scene parameters.
    #[serde(default = "SceneConfig::sound")]
    pub sound: SceneConfig,

    /// Light scene parameters.
    #[serde(default = "SceneConfig::light")]
    pub light: SceneConfig,

    /// Scene active at startup.
    #[serde(default)]
    pub initial_scene: Medium,

    #[serde(default)]
    pub time_speed: TimeSpeed,

    /// Start with the clock running.
    #[serde(default = "default_playing")]
    pub playing: bool,

    /// Seed for sound particle jitter; entropy when unset.
    #[serde(default)]
    pub particle_seed: Option<u64>,
}

fn default_playing() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            water: SceneConfig::water(),
            sound: SceneConfig::sound(),
            light: SceneConfig::light(),
            initial_scene: Medium::default(),
            time_speed: TimeSpeed::default(),
            playing: default_playing(),
            particle_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file layered over the presets.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "Loading configuration");
        let builder = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()))
            .add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Presets overridden by environment variables only.
    pub fn from_env() -> Result<Self> {
        let builder = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Scene parameters for a medium.
    pub fn scene(&self, medium: Medium) -> &SceneConfig {
        match medium {
            Medium::Water => &self.water,
            Medium::Sound => &self.sound,
            Medium::Light => &self.light,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        for medium in Medium::ALL {
            let scene = self.scene(medium);
            if scene.medium != medium {
                return Err(WaveError::config(format!(
                    "[{}] section declares medium '{}'",
                    medium, scene.medium
                )));
            }
            scene.validate()?;
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    SimulationConfig::load(path)
}

/// Load configuration from a TOML string layered over the presets.
pub fn from_toml_str(content: &str) -> Result<SimulationConfig> {
    let builder = Config::builder()
        .add_source(Config::try_from(&SimulationConfig::default())?)
        .add_source(File::from_str(content, FileFormat::Toml))
        .add_source(environment());

    let config: SimulationConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
