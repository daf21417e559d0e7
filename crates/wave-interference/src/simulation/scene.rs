//! Water, sound and light scenes.
//!
//! A scene owns one lattice and translates user-facing parameters
//! (frequency, amplitude, source separation, barrier geometry) into lattice
//! cells and per-step source values. The three media differ only in the
//! [`SceneConfig`] they are built from.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::barrier::{BarrierConfig, BarrierGeometry, BarrierType};
use super::intensity::IntensitySampler;
use super::lattice::Lattice;
use super::particles::{SoundParticle, SoundParticles};
use super::physics::WaveUnits;
use super::probe::WaveProbe;
use super::source::{EmitterState, SourceInjector, WaveTemporalType};
use crate::error::{Result, WaveError};

/// Propagation medium of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    #[default]
    Water,
    Sound,
    Light,
}

impl Medium {
    /// All media in display order.
    pub const ALL: [Medium; 3] = [Medium::Water, Medium::Sound, Medium::Light];
}

impl std::fmt::Display for Medium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Medium::Water => write!(f, "Water"),
            Medium::Sound => write!(f, "Sound"),
            Medium::Light => write!(f, "Light"),
        }
    }
}

/// Shape of the emitted wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// One or two point sources.
    #[default]
    Point,
    /// A straight wavefront driven along a whole column.
    Plane,
}

/// Number of coherent point sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCount {
    #[default]
    One,
    Two,
}

/// Scale bar shown in the wave area.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleIndicator {
    /// Length in scene units.
    pub length: f64,
    /// Length in lattice cells.
    pub cells: f64,
    /// Display text, e.g. "500 nm".
    pub label: String,
}

/// Parameters distinguishing one medium's scene from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub medium: Medium,

    /// Total lattice width in cells, damping border included.
    pub lattice_width: usize,
    /// Total lattice height in cells, damping border included.
    pub lattice_height: usize,
    pub damp_x: usize,
    pub damp_y: usize,

    /// Width of the visible region in scene length units.
    pub wave_area_width: f64,
    pub length_unit: String,
    pub time_unit: String,
    /// Display time units per physical second (1000 for ms).
    pub time_unit_scale: f64,
    /// Physical seconds per simulated second.
    pub time_scale: f64,

    /// Frequency in Hz.
    pub frequency: f64,
    pub frequency_range: (f64, f64),
    pub amplitude: f64,
    pub amplitude_range: (f64, f64),
    pub temporal_type: WaveTemporalType,
    /// Switch continuous emission on at construction and reset.
    pub auto_start: bool,

    pub source_kind: SourceKind,
    pub source_count: SourceCount,
    /// Source distance from the left edge of the visible region.
    pub source_position: f64,
    /// Center-to-center distance between two point sources.
    pub source_separation: f64,
    pub separation_range: (f64, f64),

    pub scale_indicator_length: f64,
    pub barrier: BarrierConfig,

    /// Accumulate intensity on the detection screen.
    pub intensity_screen: bool,
    /// Sound particle spacing in cells, `None` for no particles.
    pub particle_spacing: Option<usize>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::water()
    }
}

impl SceneConfig {
    /// Ripple tank in centimeters and real-time seconds.
    pub fn water() -> Self {
        Self {
            medium: Medium::Water,
            lattice_width: 100,
            lattice_height: 100,
            damp_x: 20,
            damp_y: 20,
            wave_area_width: 10.0,
            length_unit: "cm".to_string(),
            time_unit: "s".to_string(),
            time_unit_scale: 1.0,
            time_scale: 1.0,
            frequency: 2.5,
            frequency_range: (1.0, 4.0),
            amplitude: 8.0,
            amplitude_range: (0.0, 10.0),
            temporal_type: WaveTemporalType::Continuous,
            auto_start: true,
            source_kind: SourceKind::Point,
            source_count: SourceCount::One,
            source_position: 1.0,
            source_separation: 3.0,
            separation_range: (1.0, 5.0),
            scale_indicator_length: 1.0,
            barrier: BarrierConfig {
                barrier_type: BarrierType::None,
                position: 5.0,
                slit_width: 1.0,
                slit_separation: 3.0,
            },
            intensity_screen: false,
            particle_spacing: None,
        }
    }

    /// Speaker in air, slowed 200x, time shown in milliseconds.
    pub fn sound() -> Self {
        Self {
            medium: Medium::Sound,
            wave_area_width: 343.0,
            length_unit: "cm".to_string(),
            time_unit: "ms".to_string(),
            time_unit_scale: 1e3,
            time_scale: 0.005,
            frequency: 500.0,
            frequency_range: (250.0, 1000.0),
            source_position: 20.0,
            source_separation: 100.0,
            separation_range: (40.0, 200.0),
            scale_indicator_length: 50.0,
            barrier: BarrierConfig {
                barrier_type: BarrierType::None,
                position: 171.5,
                slit_width: 40.0,
                slit_separation: 120.0,
            },
            particle_spacing: Some(3),
            ..Self::water()
        }
    }

    /// Visible light in nanometers, time shown in femtoseconds.
    pub fn light() -> Self {
        Self {
            medium: Medium::Light,
            wave_area_width: 2500.0,
            length_unit: "nm".to_string(),
            time_unit: "fs".to_string(),
            time_unit_scale: 1e15,
            time_scale: 2.5 / 6e14,
            frequency: 6e14,
            frequency_range: (3.84e14, 7.9e14),
            source_position: 200.0,
            source_separation: 800.0,
            separation_range: (400.0, 1200.0),
            scale_indicator_length: 500.0,
            barrier: BarrierConfig {
                barrier_type: BarrierType::None,
                position: 1250.0,
                slit_width: 200.0,
                slit_separation: 800.0,
            },
            intensity_screen: true,
            ..Self::water()
        }
    }

    /// Preset for a medium.
    pub fn for_medium(medium: Medium) -> Self {
        match medium {
            Medium::Water => Self::water(),
            Medium::Sound => Self::sound(),
            Medium::Light => Self::light(),
        }
    }

    /// Length of one lattice cell in scene units.
    pub fn cell_size(&self) -> f64 {
        let visible = self.lattice_width.saturating_sub(2 * self.damp_x).max(1);
        self.wave_area_width / visible as f64
    }

    pub fn units(&self) -> WaveUnits {
        WaveUnits::new(self.cell_size(), self.time_scale)
    }

    /// Check ranges and resolvability before building a scene.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(WaveError::invalid(name, value))
            }
        };
        positive("wave_area_width", self.wave_area_width)?;
        positive("time_scale", self.time_scale)?;
        positive("time_unit_scale", self.time_unit_scale)?;
        positive("frequency", self.frequency)?;
        positive("frequency_range.min", self.frequency_range.0)?;
        positive("scale_indicator_length", self.scale_indicator_length)?;

        check_range("frequency_range", self.frequency_range)?;
        check_range("amplitude_range", self.amplitude_range)?;
        check_range("separation_range", self.separation_range)?;
        if self.amplitude_range.0 < 0.0 {
            return Err(WaveError::invalid("amplitude_range.min", self.amplitude_range.0));
        }
        if !self.units().resolves(self.frequency_range.1) {
            return Err(WaveError::config(format!(
                "{} scene: {} Hz has fewer than 4 lattice steps per period",
                self.medium, self.frequency_range.1
            )));
        }
        if !self.source_position.is_finite()
            || self.source_position < 0.0
            || self.source_position > self.wave_area_width
        {
            return Err(WaveError::invalid("source_position", self.source_position));
        }
        check_barrier(&self.barrier)?;
        Ok(())
    }
}

/// Clamp a finite value into `range`, warning when it moves.
fn clamp_into(name: &'static str, value: f64, range: (f64, f64)) -> f64 {
    let applied = value.clamp(range.0, range.1);
    if applied != value {
        warn!(parameter = name, requested = value, applied, "Value clamped into range");
    }
    applied
}

fn check_range(name: &'static str, range: (f64, f64)) -> Result<()> {
    if !range.0.is_finite() || !range.1.is_finite() || range.0 > range.1 {
        return Err(WaveError::config(format!(
            "{} must be an ordered finite pair, got {:?}",
            name, range
        )));
    }
    Ok(())
}

fn check_barrier(barrier: &BarrierConfig) -> Result<()> {
    if !barrier.position.is_finite() || barrier.position < 0.0 {
        return Err(WaveError::invalid("barrier.position", barrier.position));
    }
    if !barrier.slit_width.is_finite() || barrier.slit_width <= 0.0 {
        return Err(WaveError::invalid("barrier.slit_width", barrier.slit_width));
    }
    if !barrier.slit_separation.is_finite() || barrier.slit_separation < 0.0 {
        return Err(WaveError::invalid("barrier.slit_separation", barrier.slit_separation));
    }
    Ok(())
}

/// One medium's wave area: lattice, sources, barrier and measurements.
pub struct Scene {
    config: SceneConfig,
    units: WaveUnits,
    lattice: Lattice,
    source: SourceInjector,
    source_kind: SourceKind,
    source_count: SourceCount,

    /// Animated separation and its target, in scene units.
    separation: f64,
    desired_separation: f64,

    barrier: BarrierConfig,
    intensity: Option<IntensitySampler>,
    particles: Option<SoundParticles>,
    probes: Vec<WaveProbe>,

    /// Physical time in seconds.
    time: f64,
}

impl Scene {
    /// Build a scene from its configuration.
    pub fn new(config: SceneConfig, particle_seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let mut lattice = Lattice::new(
            config.lattice_width,
            config.lattice_height,
            config.damp_x,
            config.damp_y,
        )?;
        let units = config.units();
        config.barrier.apply(&mut lattice, units.cell_size);

        let frequency = clamp_into("frequency", config.frequency, config.frequency_range);
        let amplitude = clamp_into("amplitude", config.amplitude, config.amplitude_range);
        let separation = clamp_into(
            "separation",
            config.source_separation,
            config.separation_range,
        );

        let intensity = config
            .intensity_screen
            .then(|| IntensitySampler::new(&lattice));
        let particles = config
            .particle_spacing
            .map(|spacing| SoundParticles::new(&lattice, spacing, particle_seed));

        let mut scene = Self {
            units,
            lattice,
            source: SourceInjector::new(config.temporal_type, frequency, amplitude),
            source_kind: config.source_kind,
            source_count: config.source_count,
            separation,
            desired_separation: separation,
            barrier: config.barrier.clone(),
            intensity,
            particles,
            probes: Vec::new(),
            time: 0.0,
            config,
        };
        scene.apply_auto_start();

        debug!(
            medium = %scene.config.medium,
            width = scene.lattice.width(),
            height = scene.lattice.height(),
            cell_size = scene.units.cell_size,
            "Scene created"
        );
        Ok(scene)
    }

    fn apply_auto_start(&mut self) {
        if self.config.auto_start && self.source.temporal_type() == WaveTemporalType::Continuous {
            self.source.set_continuous_on(true);
        }
    }

    pub fn medium(&self) -> Medium {
        self.config.medium
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn units(&self) -> WaveUnits {
        self.units
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Mutable lattice access, e.g. to register listeners.
    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    /// Physical time in seconds since the last reset.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Elapsed time in the scene's display unit.
    pub fn display_time(&self) -> f64 {
        self.time * self.config.time_unit_scale
    }

    pub fn time_units(&self) -> &str {
        &self.config.time_unit
    }

    pub fn length_units(&self) -> &str {
        &self.config.length_unit
    }

    pub fn scale_indicator(&self) -> ScaleIndicator {
        let length = self.config.scale_indicator_length;
        ScaleIndicator {
            length,
            cells: length / self.units.cell_size,
            label: format!("{} {}", length, self.config.length_unit),
        }
    }

    /// Wavelength in scene length units at the current frequency.
    pub fn wavelength(&self) -> f64 {
        self.units.wavelength(self.source.frequency())
    }

    pub fn frequency(&self) -> f64 {
        self.source.frequency()
    }

    pub fn amplitude(&self) -> f64 {
        self.source.amplitude()
    }

    pub fn source(&self) -> &SourceInjector {
        &self.source
    }

    pub fn temporal_type(&self) -> WaveTemporalType {
        self.source.temporal_type()
    }

    pub fn emitter_state(&self) -> EmitterState {
        self.source.state()
    }

    pub fn is_pulse_firing(&self) -> bool {
        self.source.is_pulse_firing()
    }

    /// Set the frequency in Hz, clamped into the scene's range.
    ///
    /// Returns the applied value.
    pub fn set_frequency(&mut self, frequency: f64) -> Result<f64> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(WaveError::invalid("frequency", frequency));
        }
        let applied = clamp_into("frequency", frequency, self.config.frequency_range);
        self.source.set_frequency(applied, self.time);
        debug!(medium = %self.config.medium, frequency = applied, "Frequency changed");
        Ok(applied)
    }

    /// Set the source amplitude, clamped into the scene's range.
    pub fn set_amplitude(&mut self, amplitude: f64) -> Result<f64> {
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(WaveError::invalid("amplitude", amplitude));
        }
        let applied = clamp_into("amplitude", amplitude, self.config.amplitude_range);
        self.source.set_amplitude(applied);
        Ok(applied)
    }

    /// Switch between pulse and continuous; the source goes idle.
    pub fn set_temporal_type(&mut self, temporal_type: WaveTemporalType) {
        self.source.set_temporal_type(temporal_type);
    }

    /// Trigger a pulse; `false` if ignored.
    pub fn fire_pulse(&mut self) -> bool {
        self.source.fire_pulse()
    }

    /// Toggle continuous emission.
    pub fn set_continuous_on(&mut self, on: bool) {
        self.source.set_continuous_on(on);
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn set_source_kind(&mut self, kind: SourceKind) {
        self.source_kind = kind;
    }

    pub fn source_count(&self) -> SourceCount {
        self.source_count
    }

    pub fn set_source_count(&mut self, count: SourceCount) {
        self.source_count = count;
    }

    /// Current (animated) source separation.
    pub fn separation(&self) -> f64 {
        self.separation
    }

    pub fn desired_separation(&self) -> f64 {
        self.desired_separation
    }

    /// Set the separation the sources move toward.
    pub fn set_desired_separation(&mut self, separation: f64) -> Result<f64> {
        if !separation.is_finite() || separation < 0.0 {
            return Err(WaveError::invalid("separation", separation));
        }
        self.desired_separation = clamp_into("separation", separation, self.config.separation_range);
        Ok(self.desired_separation)
    }

    pub fn barrier(&self) -> &BarrierConfig {
        &self.barrier
    }

    /// Replace the barrier and regenerate the lattice mask.
    pub fn set_barrier(&mut self, barrier: BarrierConfig) -> Result<()> {
        check_barrier(&barrier)?;
        barrier.apply(&mut self.lattice, self.units.cell_size);
        self.barrier = barrier;
        Ok(())
    }

    pub fn set_barrier_type(&mut self, barrier_type: BarrierType) {
        if self.barrier.barrier_type != barrier_type {
            self.barrier.barrier_type = barrier_type;
            self.barrier.apply(&mut self.lattice, self.units.cell_size);
        }
    }

    /// Barrier resolved to lattice cells.
    pub fn barrier_geometry(&self) -> Option<BarrierGeometry> {
        self.barrier.geometry(&self.lattice, self.units.cell_size)
    }

    /// Scene coordinates (origin at the visible region's top-left) to
    /// fractional lattice coordinates.
    pub fn model_to_lattice(&self, x: f64, y: f64) -> (f32, f32) {
        let bounds = self.lattice.visible_bounds();
        (
            (bounds.min_x as f64 + x / self.units.cell_size) as f32,
            (bounds.min_y as f64 + y / self.units.cell_size) as f32,
        )
    }

    /// Fractional lattice coordinates to scene coordinates.
    pub fn lattice_to_model(&self, i: f32, j: f32) -> (f64, f64) {
        let bounds = self.lattice.visible_bounds();
        (
            (i as f64 - bounds.min_x as f64) * self.units.cell_size,
            (j as f64 - bounds.min_y as f64) * self.units.cell_size,
        )
    }

    /// Lattice cells the source writes into this step.
    pub fn source_cells(&self) -> Vec<(i32, i32)> {
        let bounds = self.lattice.visible_bounds();
        let offset = (self.config.source_position / self.units.cell_size)
            .round()
            .clamp(0.0, (bounds.width() - 1) as f64) as i32;
        let column = bounds.min_x as i32 + offset;
        let center = (bounds.min_y + bounds.height() / 2) as f64;
        let clamp_row =
            |row: f64| (row.round() as i32).clamp(bounds.min_y as i32, bounds.max_y as i32 - 1);

        match (self.source_kind, self.source_count) {
            (SourceKind::Plane, _) => (bounds.min_y..bounds.max_y)
                .map(|j| (column, j as i32))
                .collect(),
            (SourceKind::Point, SourceCount::One) => vec![(column, center as i32)],
            (SourceKind::Point, SourceCount::Two) => {
                let half = self.separation / self.units.cell_size / 2.0;
                let top = (column, clamp_row(center - half));
                let bottom = (column, clamp_row(center + half));
                if top == bottom {
                    vec![top]
                } else {
                    vec![top, bottom]
                }
            }
        }
    }

    /// Move the separation toward its target, crossing the full range in one
    /// simulated second.
    fn animate_separation(&mut self, dt: f64) {
        let (min, max) = self.config.separation_range;
        let max_delta = (max - min).max(f64::EPSILON) * dt;
        let delta = self.desired_separation - self.separation;
        self.separation = if delta.abs() <= max_delta {
            self.desired_separation
        } else {
            self.separation + max_delta * delta.signum()
        };
    }

    /// Advance the scene by `dt` simulated seconds (one lattice step).
    ///
    /// Order: source injection, lattice update, intensity screen, probes,
    /// particles, then lattice listeners.
    pub fn step(&mut self, dt: f64) {
        self.time += dt * self.units.time_scale;
        self.animate_separation(dt);

        if let Some(value) = self.source.step(self.time) {
            for (i, j) in self.source_cells() {
                if self.lattice.is_open(i, j) {
                    self.lattice.set_current_value(i, j, value as f32);
                }
            }
        }

        self.lattice.advance();

        if let Some(sampler) = self.intensity.as_mut() {
            sampler.sample(&self.lattice);
        }
        for probe in self.probes.iter_mut() {
            probe.record(self.time, &self.lattice);
        }
        if let Some(particles) = self.particles.as_mut() {
            particles.step(&self.lattice, dt as f32);
        }

        self.lattice.emit_changed();
    }

    /// Detection screen intensity, light scenes only.
    pub fn intensity_values(&self) -> Option<&[f32]> {
        self.intensity.as_ref().map(|sampler| sampler.intensity_values())
    }

    pub fn intensity_sampler(&self) -> Option<&IntensitySampler> {
        self.intensity.as_ref()
    }

    /// Sound particles, sound scenes only.
    pub fn particles(&self) -> Option<&[SoundParticle]> {
        self.particles.as_ref().map(|particles| particles.particles())
    }

    /// Add a probe at fractional lattice coordinates; returns its index.
    pub fn add_probe(&mut self, x: f32, y: f32) -> usize {
        self.probes.push(WaveProbe::new(x, y));
        self.probes.len() - 1
    }

    pub fn probe(&self, index: usize) -> Option<&WaveProbe> {
        self.probes.get(index)
    }

    pub fn probe_mut(&mut self, index: usize) -> Option<&mut WaveProbe> {
        self.probes.get_mut(index)
    }

    /// Remove a probe; later indices shift down by one.
    pub fn remove_probe(&mut self, index: usize) -> Option<WaveProbe> {
        (index < self.probes.len()).then(|| self.probes.remove(index))
    }

    pub fn probes(&self) -> &[WaveProbe] {
        &self.probes
    }

    /// Clear the field and measurements and restore configured parameters.
    ///
    /// The barrier, source kind and probe positions are kept.
    pub fn reset(&mut self) {
        self.lattice.clear();
        self.time = 0.0;
        self.source.reset();
        self.apply_auto_start();

        let (min, max) = self.config.separation_range;
        self.separation = self.config.source_separation.clamp(min, max);
        self.desired_separation = self.separation;

        if let Some(sampler) = self.intensity.as_mut() {
            sampler.reset();
        }
        if let Some(particles) = self.particles.as_mut() {
            particles.reset();
        }
        for probe in self.probes.iter_mut() {
            probe.clear();
        }
        debug!(medium = %self.config.medium, "Scene reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::lattice::CellType;
    use crate::simulation::physics::FIXED_DT;

    fn create_test_scene(medium: Medium) -> Scene {
        Scene::new(SceneConfig::for_medium(medium), Some(3)).unwrap()
    }

    #[test]
    fn test_presets_validate() {
        for medium in Medium::ALL {
            let config = SceneConfig::for_medium(medium);
            assert_eq!(config.medium, medium);
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_physical_wave_speeds() {
        // Sound at 343 m/s, light at c
        let sound = SceneConfig::sound().units().wave_speed();
        assert!((sound - 34300.0).abs() < 1.0, "sound speed {} cm/s", sound);
        let light = SceneConfig::light().units().wave_speed();
        assert!((light / 3e17 - 1.0).abs() < 1e-6, "light speed {} nm/s", light);
    }

    #[test]
    fn test_medium_specific_measurements() {
        let water = create_test_scene(Medium::Water);
        assert!(water.intensity_values().is_none());
        assert!(water.particles().is_none());

        let sound = create_test_scene(Medium::Sound);
        assert!(sound.particles().is_some_and(|p| !p.is_empty()));

        let light = create_test_scene(Medium::Light);
        assert_eq!(light.intensity_values().map(|v| v.len()), Some(60));
    }

    #[test]
    fn test_display_parameters() {
        let sound = create_test_scene(Medium::Sound);
        assert_eq!(sound.time_units(), "ms");
        assert_eq!(sound.length_units(), "cm");
        let indicator = sound.scale_indicator();
        assert_eq!(indicator.label, "50 cm");
        assert!((indicator.cells - 50.0 / (343.0 / 60.0)).abs() < 1e-9);

        let light = create_test_scene(Medium::Light);
        assert_eq!(light.scale_indicator().label, "500 nm");
        // 600 THz light has a 500 nm wavelength
        assert!((light.wavelength() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_display_time() {
        let mut sound = create_test_scene(Medium::Sound);
        for _ in 0..60 {
            sound.step(FIXED_DT);
        }
        // One simulated second is 5 ms of sound time
        assert!((sound.display_time() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_validation() {
        let mut scene = create_test_scene(Medium::Water);
        assert!(scene.set_frequency(0.0).is_err());
        assert!(scene.set_frequency(-1.0).is_err());
        assert!(scene.set_frequency(f64::NAN).is_err());
        assert_eq!(scene.set_frequency(100.0).unwrap(), 4.0);
        assert_eq!(scene.frequency(), 4.0);
        assert_eq!(scene.set_frequency(0.2).unwrap(), 1.0);
    }

    #[test]
    fn test_amplitude_validation() {
        let mut scene = create_test_scene(Medium::Water);
        assert!(scene.set_amplitude(-0.1).is_err());
        assert!(scene.set_amplitude(f64::INFINITY).is_err());
        assert_eq!(scene.set_amplitude(50.0).unwrap(), 10.0);
        assert_eq!(scene.set_amplitude(3.0).unwrap(), 3.0);
        assert_eq!(scene.amplitude(), 3.0);
    }

    #[test]
    fn test_frequency_change_mid_run_is_smooth() {
        let mut scene = create_test_scene(Medium::Water);
        for _ in 0..17 {
            scene.step(FIXED_DT);
        }
        let before = scene.source().value();
        let time = scene.time();
        scene.set_frequency(3.3).unwrap();

        let omega = scene.source().angular_frequency();
        let after = scene.amplitude() * (omega * time + scene.source().phase()).sin();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_source_cells() {
        let mut scene = create_test_scene(Medium::Water);
        // 1 cm at 1/6 cm per cell = 6 cells in from the visible edge
        assert_eq!(scene.source_cells(), vec![(26, 50)]);

        scene.set_source_count(SourceCount::Two);
        // 3 cm separation = 18 cells
        assert_eq!(scene.source_cells(), vec![(26, 41), (26, 59)]);

        scene.set_source_kind(SourceKind::Plane);
        let cells = scene.source_cells();
        assert_eq!(cells.len(), 60);
        assert!(cells.iter().all(|&(i, _)| i == 26));
    }

    #[test]
    fn test_separation_animates() {
        let mut scene = create_test_scene(Medium::Water);
        scene.set_source_count(SourceCount::Two);
        assert_eq!(scene.set_desired_separation(5.0).unwrap(), 5.0);
        assert!(scene.set_desired_separation(-1.0).is_err());

        scene.step(FIXED_DT);
        let first = scene.separation();
        assert!(first > 3.0 && first < 5.0);

        // Full range (4 cm) per second: 2 cm takes 30 steps
        for _ in 0..40 {
            scene.step(FIXED_DT);
        }
        assert_eq!(scene.separation(), 5.0);
    }

    #[test]
    fn test_two_sources_emit() {
        let mut scene = create_test_scene(Medium::Water);
        scene.set_source_count(SourceCount::Two);
        for _ in 0..5 {
            scene.step(FIXED_DT);
        }
        for (i, j) in scene.source_cells() {
            assert!(scene.lattice().current_value(i, j).abs() > 0.0);
        }
    }

    #[test]
    fn test_barrier_blocks_source_column() {
        let mut scene = create_test_scene(Medium::Water);
        scene.set_source_kind(SourceKind::Plane);
        let mut barrier = scene.barrier().clone();
        barrier.barrier_type = BarrierType::OneSlit;
        barrier.position = 1.0;
        scene.set_barrier(barrier).unwrap();

        for _ in 0..30 {
            scene.step(FIXED_DT);
        }
        let geometry = scene.barrier_geometry().unwrap();
        for j in 0..scene.lattice().height() {
            if !geometry.is_open_row(j) {
                assert_eq!(scene.lattice().current_value(26, j as i32), 0.0);
            }
        }
    }

    #[test]
    fn test_invalid_barrier_rejected() {
        let mut scene = create_test_scene(Medium::Water);
        let mut barrier = scene.barrier().clone();
        barrier.slit_width = 0.0;
        assert!(scene.set_barrier(barrier).is_err());
        assert_eq!(scene.barrier().slit_width, 1.0);
    }

    #[test]
    fn test_coordinate_transforms() {
        let scene = create_test_scene(Medium::Water);
        let (i, j) = scene.model_to_lattice(5.0, 5.0);
        assert!((i - 50.0).abs() < 1e-4 && (j - 50.0).abs() < 1e-4);
        let (x, y) = scene.lattice_to_model(26.0, 20.0);
        assert!((x - 1.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_probes_record_each_step() {
        let mut scene = create_test_scene(Medium::Water);
        let index = scene.add_probe(30.0, 50.0);
        for _ in 0..10 {
            scene.step(FIXED_DT);
        }
        let probe = scene.probe(index).unwrap();
        assert_eq!(probe.len(), 10);
        assert!(probe.latest().is_some());

        assert!(scene.remove_probe(3).is_none());
        assert!(scene.remove_probe(index).is_some());
        assert!(scene.probes().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut scene = create_test_scene(Medium::Light);
        scene.add_probe(40.0, 50.0);
        for _ in 0..120 {
            scene.step(FIXED_DT);
        }
        assert!(scene.lattice().total_energy() > 0.0);

        scene.reset();
        assert_eq!(scene.time(), 0.0);
        assert_eq!(scene.lattice().total_energy(), 0.0);
        assert!(scene.intensity_values().unwrap().iter().all(|&v| v == 0.0));
        assert!(scene.probe(0).unwrap().is_empty());
        assert!(scene.source().is_continuous_on());
    }

    #[test]
    fn test_configured_values_clamped_into_range() {
        let config = SceneConfig {
            frequency: 50.0,
            amplitude: 25.0,
            source_separation: 0.1,
            ..SceneConfig::water()
        };
        let scene = Scene::new(config, None).unwrap();
        assert_eq!(scene.frequency(), 4.0);
        assert_eq!(scene.amplitude(), 10.0);
        assert_eq!(scene.separation(), 1.0);
    }

    #[test]
    fn test_source_position_validated() {
        for position in [1e12, -1.0, f64::NAN, f64::INFINITY] {
            let config = SceneConfig {
                source_position: position,
                ..SceneConfig::water()
            };
            assert!(matches!(
                Scene::new(config, None),
                Err(WaveError::InvalidParameter { name: "source_position", .. })
            ));
        }
    }

    #[test]
    fn test_source_at_far_edge_stays_visible() {
        let config = SceneConfig {
            source_position: 10.0,
            ..SceneConfig::water()
        };
        let mut scene = Scene::new(config, None).unwrap();
        assert_eq!(scene.source_cells(), vec![(79, 50)]);
        scene.step(FIXED_DT);
        assert_eq!(scene.lattice().step_count(), 1);
    }

    #[test]
    fn test_far_barrier_position_clamped_to_last_columns() {
        let mut scene = create_test_scene(Medium::Water);
        let mut barrier = scene.barrier().clone();
        barrier.barrier_type = BarrierType::OneSlit;
        barrier.position = 1e20;
        scene.set_barrier(barrier).unwrap();
        assert_eq!(scene.barrier_geometry().unwrap().columns, 78..80);
        scene.step(FIXED_DT);
        assert_eq!(scene.lattice().cell_type(78, 20), Some(CellType::Barrier));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            frequency_range: (1.0, 100.0),
            ..SceneConfig::water()
        };
        assert!(matches!(Scene::new(config, None), Err(WaveError::ConfigError(_))));

        let config = SceneConfig {
            time_scale: 0.0,
            ..SceneConfig::water()
        };
        assert!(Scene::new(config, None).is_err());

        let config = SceneConfig {
            lattice_width: 30,
            ..SceneConfig::water()
        };
        assert!(matches!(
            Scene::new(config, None),
            Err(WaveError::LatticeTooSmall { .. })
        ));
    }
}
