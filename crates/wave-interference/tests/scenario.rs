//! End-to-end tests driving scenes and the model through whole runs.

use std::cell::RefCell;
use std::rc::Rc;

use wave_interference::simulation::{
    BarrierConfig, BarrierType, EmitterState, Lattice, Medium, Scene, SceneConfig, SourceCount,
    WaveTemporalType, WavesModel, FIXED_DT,
};
use wave_interference::{from_toml_str, SimulationConfig};

/// Point source at cell (30, 50) of a 100x100 lattice with a 20-cell border,
/// amplitude 10, 20 Hz at 24 ticks per period.
fn scenario_config() -> SceneConfig {
    SceneConfig {
        wave_area_width: 60.0,
        time_scale: 0.125,
        frequency: 20.0,
        frequency_range: (1.0, 40.0),
        amplitude: 10.0,
        amplitude_range: (0.0, 10.0),
        source_position: 10.0,
        ..SceneConfig::water()
    }
}

fn scenario_scene() -> Scene {
    Scene::new(scenario_config(), None).expect("Failed to build scenario scene")
}

fn run(scene: &mut Scene, ticks: usize) {
    for _ in 0..ticks {
        scene.step(FIXED_DT);
    }
}

fn visited_count(lattice: &Lattice) -> usize {
    let mut count = 0;
    for j in 0..lattice.height() as i32 {
        for i in 0..lattice.width() as i32 {
            if lattice.has_cell_been_visited(i, j) {
                count += 1;
            }
        }
    }
    count
}

fn max_abs_in_row(lattice: &Lattice, row: i32, columns: std::ops::RangeInclusive<i32>) -> f32 {
    columns
        .map(|i| lattice.current_value(i, row).abs())
        .fold(0.0, f32::max)
}

#[test]
fn test_point_source_scenario() {
    let mut scene = scenario_scene();
    assert_eq!(scene.source_cells(), vec![(30, 50)]);
    assert_eq!(scene.units().steps_per_period(20.0).round(), 24.0);

    run(&mut scene, 30);
    let lattice = scene.lattice();
    // The stencil reaches at most one cell further per step
    assert_eq!(lattice.current_value(61, 50), 0.0);
    assert_eq!(lattice.current_value(30, 81), 0.0);
    let early = visited_count(lattice);
    assert!(early > 0);

    run(&mut scene, 30);
    let lattice = scene.lattice();
    assert_eq!(lattice.step_count(), 60);
    assert!(visited_count(lattice) > early, "wavefront did not expand");

    // Amplitude falls off from the source region into the left border
    let near_source = max_abs_in_row(lattice, 50, 22..=38);
    let deep_border = max_abs_in_row(lattice, 50, 0..=8);
    assert!(near_source > 1.0, "near source {}", near_source);
    assert!(deep_border < near_source / 10.0, "border {}", deep_border);

    // Everything within 2 cells of the outer edge is below 1% of amplitude
    let threshold = 0.01 * 10.0;
    for j in 0..100 {
        for i in 0..100 {
            if i < 2 || i >= 98 || j < 2 || j >= 98 {
                let value = lattice.current_value(i, j);
                assert!(value.abs() < threshold, "cell ({}, {}) = {}", i, j, value);
            }
        }
    }

    for value in lattice.values() {
        assert!(value.is_finite());
    }
}

#[test]
fn test_energy_decreases_through_damping_border() {
    let mut scene = scenario_scene();
    run(&mut scene, 300);

    // Depths 1, 5, 9, 13 and 17 into the left border along the source row
    let columns = [19, 15, 11, 7, 3];
    let mut mean_square = [0.0f64; 5];
    let ticks = 96;
    for _ in 0..ticks {
        scene.step(FIXED_DT);
        for (k, &i) in columns.iter().enumerate() {
            let value = scene.lattice().current_value(i, 50) as f64;
            mean_square[k] += value * value / ticks as f64;
        }
    }

    for pair in mean_square.windows(2) {
        assert!(pair[0] > pair[1], "not decreasing outward: {:?}", mean_square);
    }
}

#[test]
fn test_barrier_cells_stay_zero() {
    let mut scene = scenario_scene();
    scene.set_source_count(SourceCount::Two);
    scene
        .set_barrier(BarrierConfig {
            barrier_type: BarrierType::TwoSlits,
            position: 30.0,
            slit_width: 4.0,
            slit_separation: 12.0,
        })
        .unwrap();
    let geometry = scene.barrier_geometry().unwrap();
    assert_eq!(geometry.columns, 50..52);

    for _ in 0..200 {
        scene.step(FIXED_DT);
        let lattice = scene.lattice();
        for i in geometry.columns.clone() {
            for j in 0..lattice.height() {
                if !geometry.is_open_row(j) {
                    assert_eq!(lattice.current_value(i as i32, j as i32), 0.0);
                }
            }
        }
    }

    // Waves pass through the slits
    assert!(scene.lattice().has_cell_been_visited(60, 50));
}

#[test]
fn test_light_screen_sees_double_slit() {
    let mut scene = Scene::new(SceneConfig::light(), None).unwrap();
    scene.set_barrier_type(BarrierType::TwoSlits);
    run(&mut scene, 400);

    let values = scene.intensity_values().unwrap();
    assert_eq!(values.len(), 60);
    assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0));
    assert!(values[30] > 0.0);
}

#[test]
fn test_pulse_lifecycle() {
    let mut scene = Scene::new(
        SceneConfig {
            temporal_type: WaveTemporalType::Pulse,
            ..scenario_config()
        },
        None,
    )
    .unwrap();
    assert_eq!(scene.emitter_state(), EmitterState::Idle);

    run(&mut scene, 5);
    assert_eq!(scene.lattice().total_energy(), 0.0);

    assert!(scene.fire_pulse());
    assert_eq!(scene.emitter_state(), EmitterState::PulsePending);
    scene.step(FIXED_DT);
    let start = match scene.emitter_state() {
        EmitterState::PulseFiring { start, period } => {
            assert!((period - 0.05).abs() < 1e-12);
            start
        }
        other => panic!("expected firing, got {:?}", other),
    };

    run(&mut scene, 10);
    // Re-triggering neither restarts nor extends the pulse
    assert!(!scene.fire_pulse());
    assert!(matches!(
        scene.emitter_state(),
        EmitterState::PulseFiring { start: s, .. } if s == start
    ));
    // Frequency changes apply to later pulses only
    scene.set_frequency(10.0).unwrap();

    run(&mut scene, 20);
    assert_eq!(scene.emitter_state(), EmitterState::Idle);
    assert!(!scene.is_pulse_firing());
    assert_eq!(scene.source().value(), 0.0);
    assert!(scene.lattice().total_energy() > 0.0);

    // A fresh pulse uses the new period
    assert!(scene.fire_pulse());
    scene.step(FIXED_DT);
    assert!(matches!(
        scene.emitter_state(),
        EmitterState::PulseFiring { period, .. } if (period - 0.1).abs() < 1e-12
    ));
}

#[test]
fn test_switching_temporal_type_mid_pulse() {
    let mut scene = Scene::new(
        SceneConfig {
            temporal_type: WaveTemporalType::Pulse,
            ..scenario_config()
        },
        None,
    )
    .unwrap();
    assert!(scene.fire_pulse());
    run(&mut scene, 5);
    assert!(scene.is_pulse_firing());

    scene.set_temporal_type(WaveTemporalType::Continuous);
    assert_eq!(scene.emitter_state(), EmitterState::Idle);
    scene.set_continuous_on(true);
    assert_eq!(scene.emitter_state(), EmitterState::ContinuousRunning);
}

#[test]
fn test_fields_stay_finite_at_range_limits() {
    for medium in Medium::ALL {
        let mut scene = Scene::new(SceneConfig::for_medium(medium), Some(9)).unwrap();
        let (_, max_frequency) = scene.config().frequency_range;
        let (_, max_amplitude) = scene.config().amplitude_range;
        scene.set_frequency(max_frequency).unwrap();
        scene.set_amplitude(max_amplitude).unwrap();
        scene.set_source_count(SourceCount::Two);
        run(&mut scene, 300);

        assert!(
            scene.lattice().values().iter().all(|v| v.is_finite()),
            "{} field diverged",
            medium
        );
        if let Some(particles) = scene.particles() {
            assert!(particles
                .iter()
                .all(|p| p.position.0.is_finite() && p.position.1.is_finite()));
        }
    }
}

#[test]
fn test_listeners_observe_each_tick_in_order() {
    let mut scene = scenario_scene();
    let probe = scene.add_probe(30.0, 50.0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&seen);
    scene
        .lattice_mut()
        .add_listener(move |lattice: &Lattice| first.borrow_mut().push(("first", lattice.step_count())));
    let second = Rc::clone(&seen);
    scene
        .lattice_mut()
        .add_listener(move |lattice: &Lattice| second.borrow_mut().push(("second", lattice.step_count())));

    run(&mut scene, 2);
    assert_eq!(
        *seen.borrow(),
        vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
    );
    // Probes record before listeners run
    assert_eq!(scene.probe(probe).unwrap().len(), 2);
}

#[test]
fn test_inactive_scenes_are_frozen() {
    let mut model = WavesModel::with_defaults().unwrap();
    for _ in 0..60 {
        model.step(FIXED_DT);
    }
    let water_time = model.scene(Medium::Water).time();
    let water_values = model.scene(Medium::Water).lattice().values().to_vec();

    model.select_scene(Medium::Light);
    for _ in 0..60 {
        model.step(FIXED_DT);
    }
    assert_eq!(model.scene(Medium::Water).time(), water_time);
    assert_eq!(model.scene(Medium::Water).lattice().values(), &water_values[..]);
    assert_eq!(model.scene(Medium::Light).lattice().step_count(), 60);

    // Returning resumes from the frozen state
    model.select_scene(Medium::Water);
    model.step(FIXED_DT);
    assert_eq!(model.scene(Medium::Water).lattice().step_count(), 61);
}

#[test]
fn test_step_once_matches_frame_stepping() {
    let mut stepped = WavesModel::with_defaults().unwrap();
    let mut single = WavesModel::with_defaults().unwrap();
    single.set_playing(false);

    for _ in 0..45 {
        stepped.step(FIXED_DT);
        single.step_once();
    }
    assert_eq!(
        stepped.active_scene().lattice().values(),
        single.active_scene().lattice().values()
    );
    assert_eq!(stepped.active_scene().time(), single.active_scene().time());
}

#[test]
fn test_model_from_config() {
    let config = from_toml_str(
        r#"
            initial_scene = "sound"
            playing = false
            particle_seed = 17

            [sound]
            source_count = "two"
        "#,
    )
    .unwrap();
    assert_ne!(config, SimulationConfig::default());

    let mut model = WavesModel::new(&config).unwrap();
    assert_eq!(model.selected_medium(), Medium::Sound);
    assert!(!model.is_playing());
    assert_eq!(model.active_scene().source_cells().len(), 2);

    assert_eq!(model.step(FIXED_DT), 0);
    model.set_playing(true);
    assert_eq!(model.step(FIXED_DT), 1);
}
