//! Headless wave interference runner.
//!
//! Runs one scene for a number of frames and prints the visible field as
//! ASCII art, followed by the detection screen for light.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p wave-interference -- --scene water --sources two --frames 240
//! cargo run -p wave-interference -- --scene light --barrier two-slits --frames 600
//! cargo run -p wave-interference -- --config waves.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use wave_interference::simulation::{FIXED_DT, SourceCount, SourceKind};
use wave_interference::{
    load_config, BarrierType, Medium, Scene, SimulationConfig, WaveTemporalType, WavesModel,
};

/// Run a wave interference scene and print the result
#[derive(Parser)]
#[command(name = "wave-interference")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file layered over the built-in presets
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene to run (defaults to the configured initial scene)
    #[arg(short, long, value_enum)]
    scene: Option<SceneArg>,

    /// Barrier to place in the wave area
    #[arg(short, long, value_enum)]
    barrier: Option<BarrierArg>,

    /// Number of point sources
    #[arg(long, value_enum)]
    sources: Option<SourcesArg>,

    /// Emit a plane wave instead of point sources
    #[arg(long)]
    plane: bool,

    /// Source frequency in Hz
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Fire a single pulse instead of a continuous wave
    #[arg(long)]
    pulse: bool,

    /// Frames of 1/60 s to run
    #[arg(short = 'n', long, default_value = "240")]
    frames: u32,

    /// Characters per row of the field snapshot
    #[arg(long, default_value = "60")]
    columns: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SceneArg {
    Water,
    Sound,
    Light,
}

impl From<SceneArg> for Medium {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::Water => Medium::Water,
            SceneArg::Sound => Medium::Sound,
            SceneArg::Light => Medium::Light,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BarrierArg {
    None,
    OneSlit,
    TwoSlits,
}

impl From<BarrierArg> for BarrierType {
    fn from(arg: BarrierArg) -> Self {
        match arg {
            BarrierArg::None => BarrierType::None,
            BarrierArg::OneSlit => BarrierType::OneSlit,
            BarrierArg::TwoSlits => BarrierType::TwoSlits,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SourcesArg {
    One,
    Two,
}

fn setup_logging(verbose: bool) {
    let directive = if verbose {
        "wave_interference=debug"
    } else {
        "wave_interference=info"
    };
    let filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn configure(scene: &mut Scene, cli: &Cli) -> Result<()> {
    if let Some(barrier) = cli.barrier {
        scene.set_barrier_type(barrier.into());
    }
    if let Some(sources) = cli.sources {
        scene.set_source_count(match sources {
            SourcesArg::One => SourceCount::One,
            SourcesArg::Two => SourceCount::Two,
        });
    }
    if cli.plane {
        scene.set_source_kind(SourceKind::Plane);
    }
    if let Some(frequency) = cli.frequency {
        scene
            .set_frequency(frequency)
            .context("Rejected --frequency")?;
    }
    if cli.pulse {
        scene.set_temporal_type(WaveTemporalType::Pulse);
        scene.fire_pulse();
    }
    Ok(())
}

/// Map a field value to a shade, darkest for troughs.
fn shade(value: f32, scale: f32) -> char {
    const RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
    if !value.is_finite() || scale <= 0.0 {
        return ' ';
    }
    let normalized = ((value / scale).clamp(-1.0, 1.0) + 1.0) / 2.0;
    let index = (normalized * (RAMP.len() - 1) as f32).round() as usize;
    RAMP[index.min(RAMP.len() - 1)]
}

fn print_field(scene: &Scene, columns: usize) {
    let lattice = scene.lattice();
    let bounds = lattice.visible_bounds();
    let rows = lattice.visible_values();
    let scale = (scene.amplitude() as f32).max(f32::EPSILON);

    let columns = columns.clamp(1, bounds.width());
    let step_x = bounds.width() as f32 / columns as f32;
    // Terminal cells are roughly twice as tall as wide
    let step_y = step_x * 2.0;

    let mut y = 0.0;
    while (y as usize) < rows.len() {
        let row = &rows[y as usize];
        let line: String = (0..columns)
            .map(|c| {
                let i = ((c as f32 * step_x) as usize).min(row.len() - 1);
                let j = bounds.min_y + y as usize;
                if lattice.is_open((bounds.min_x + i) as i32, j as i32) {
                    shade(row[i], scale)
                } else {
                    '|'
                }
            })
            .collect();
        println!("{}", line);
        y += step_y;
    }
}

fn print_screen(values: &[f32]) {
    let peak = values.iter().copied().fold(0.0, f32::max);
    if peak <= 0.0 {
        println!("Screen: no intensity yet");
        return;
    }
    println!("Screen intensity (peak {:.3}):", peak);
    for (row, value) in values.iter().enumerate().step_by(2) {
        let width = (value / peak * 40.0).round() as usize;
        println!("{:3} {}", row, "#".repeat(width));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let mut model = WavesModel::new(&config).context("Failed to build scenes")?;
    if let Some(scene) = cli.scene {
        model.select_scene(scene.into());
    }
    configure(model.active_scene_mut(), &cli)?;

    tracing::info!(
        scene = %model.selected_medium(),
        frames = cli.frames,
        "Running simulation"
    );
    for _ in 0..cli.frames {
        model.step(FIXED_DT);
    }

    let scene = model.active_scene();
    let indicator = scene.scale_indicator();
    println!(
        "{} scene after {:.3} {}: f = {} Hz, wavelength = {:.3} {}, scale bar {}",
        scene.medium(),
        scene.display_time(),
        scene.time_units(),
        scene.frequency(),
        scene.wavelength(),
        scene.length_units(),
        indicator.label,
    );
    println!(
        "max amplitude {:.3}, energy {:.3}",
        scene.lattice().max_amplitude(),
        scene.lattice().total_energy()
    );
    print_field(scene, cli.columns);

    if let Some(values) = scene.intensity_values() {
        print_screen(values);
    }
    if let Some(particles) = scene.particles() {
        let mean = particles.iter().map(|p| p.displacement()).sum::<f32>()
            / particles.len().max(1) as f32;
        println!("{} particles, mean displacement {:.3} cells", particles.len(), mean);
    }

    Ok(())
}
