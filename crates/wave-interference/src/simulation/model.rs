//! Top-level model holding one scene per medium.

use tracing::info;

use super::clock::{SimulationClock, TimeSpeed};
use super::physics::FIXED_DT;
use super::scene::{Medium, Scene};
use crate::config::SimulationConfig;
use crate::error::Result;

/// Water, sound and light scenes driven by a shared fixed-rate clock.
///
/// Only the selected scene steps; the others keep their state until they
/// are selected again.
pub struct WavesModel {
    water: Scene,
    sound: Scene,
    light: Scene,
    selected: Medium,
    clock: SimulationClock,
}

impl WavesModel {
    /// Build all three scenes from a validated configuration.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut clock = SimulationClock::new(config.time_speed);
        clock.set_playing(config.playing);

        let model = Self {
            water: Scene::new(config.water.clone(), config.particle_seed)?,
            sound: Scene::new(config.sound.clone(), config.particle_seed)?,
            light: Scene::new(config.light.clone(), config.particle_seed)?,
            selected: config.initial_scene,
            clock,
        };
        info!(scene = %model.selected, "Waves model created");
        Ok(model)
    }

    /// Model with the built-in presets.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&SimulationConfig::default())
    }

    pub fn selected_medium(&self) -> Medium {
        self.selected
    }

    /// Make another scene active. Pending partial ticks are dropped.
    pub fn select_scene(&mut self, medium: Medium) {
        if self.selected != medium {
            info!(from = %self.selected, to = %medium, "Scene selected");
            self.selected = medium;
            self.clock.reset();
        }
    }

    pub fn scene(&self, medium: Medium) -> &Scene {
        match medium {
            Medium::Water => &self.water,
            Medium::Sound => &self.sound,
            Medium::Light => &self.light,
        }
    }

    pub fn scene_mut(&mut self, medium: Medium) -> &mut Scene {
        match medium {
            Medium::Water => &mut self.water,
            Medium::Sound => &mut self.sound,
            Medium::Light => &mut self.light,
        }
    }

    pub fn active_scene(&self) -> &Scene {
        self.scene(self.selected)
    }

    pub fn active_scene_mut(&mut self) -> &mut Scene {
        self.scene_mut(self.selected)
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.clock.set_playing(playing);
    }

    pub fn time_speed(&self) -> TimeSpeed {
        self.clock.speed()
    }

    pub fn set_time_speed(&mut self, speed: TimeSpeed) {
        self.clock.set_speed(speed);
    }

    /// Feed one frame interval in wall-clock seconds.
    ///
    /// Returns the number of ticks the active scene advanced.
    pub fn step(&mut self, dt: f64) -> u32 {
        let ticks = self.clock.advance(dt);
        let scene = self.active_scene_mut();
        for _ in 0..ticks {
            scene.step(FIXED_DT);
        }
        ticks
    }

    /// Advance the active scene by exactly one tick, even while paused.
    pub fn step_once(&mut self) {
        self.active_scene_mut().step(FIXED_DT);
    }

    /// Reset every scene and the clock's partial tick.
    pub fn reset(&mut self) {
        for medium in Medium::ALL {
            self.scene_mut(medium).reset();
        }
        self.clock.reset();
        info!("Waves model reset");
    }
}
