use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;

use crate::game_logic::{
    CAR_HEIGHT, CAR_WIDTH, Car, CarIntegrator, ConfigurationError, FIXED_TIMESTEP_HZ,
    PhysicsTuning, PlayerControlled, SpawnPoint,
};
use crate::input::{InputSampler, InputSignal, KeyBindings, RawKeyState};
use crate::state_snapshot::CarPhysicsSnapshot;

/// Tuning shared by every car in the session.
#[derive(Resource, Clone)]
pub struct SharedTuning(pub Arc<PhysicsTuning>);

/// While set, integrators are not stepped.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationPaused(pub bool);

/// Signal sampled for a car this tick.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct CurrentInput(pub InputSignal);

/// Where the session's tuning came from.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub enum TuningSource {
    File(PathBuf),
    /// The tuning file was missing.
    Defaults { missing: PathBuf },
}

/// Runs the car simulation on `FixedUpdate` and mirrors snapshots onto sprites.
pub struct DriftPhysicsPlugin {
    pub tuning: Arc<PhysicsTuning>,
    pub source: TuningSource,
}

impl Plugin for DriftPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SharedTuning(self.tuning.clone()))
            .insert_resource(self.source.clone())
            .init_resource::<SimulationPaused>()
            .init_resource::<KeyBindings>()
            .insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ))
            .add_systems(
                FixedUpdate,
                (
                    sample_player_input,
                    handle_restart_and_pause,
                    step_cars.run_if(|paused: Res<SimulationPaused>| !paused.0),
                    publish_snapshots,
                )
                    .chain(),
            )
            .add_systems(Startup, report_tuning_source)
            .add_systems(Update, sync_car_transforms);
    }
}

// Runs once the log subscriber exists
pub fn report_tuning_source(source: Res<TuningSource>) {
    match source.as_ref() {
        TuningSource::File(path) => info!("Loaded physics tuning from {}", path.display()),
        TuningSource::Defaults { missing } => {
            warn!("{} not found, using default tuning", missing.display())
        }
    }
}

/// Spawn a player car at rest. Fails if the tuning does not validate.
pub fn spawn_player_car(
    commands: &mut Commands,
    tuning: &SharedTuning,
    position: Vec2,
    rotation_degrees: f32,
) -> Result<Entity, ConfigurationError> {
    let integrator = CarIntegrator::new(tuning.0.clone(), position, rotation_degrees)?;
    let snapshot = integrator.snapshot();

    let mut transform = Transform::from_xyz(0., 0., 50.);
    snapshot.apply_to_transform(&mut transform);

    let entity = commands
        .spawn((
            Sprite::from_color(Color::srgb(0.85, 0.2, 0.2), Vec2::new(CAR_WIDTH, CAR_HEIGHT)),
            transform,
            integrator,
            snapshot,
            InputSampler::default(),
            CurrentInput::default(),
            SpawnPoint {
                position,
                rotation_degrees,
            },
            Car,
            PlayerControlled,
        ))
        .id();
    Ok(entity)
}

// Read the keyboard once per tick for each player car
pub fn sample_player_input(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut player_cars: Query<(&mut InputSampler, &mut CurrentInput), With<PlayerControlled>>,
) {
    let raw = RawKeyState::from_keyboard(&keyboard, &bindings);
    let now_millis = time.elapsed().as_millis() as u64;

    for (mut sampler, mut current) in player_cars.iter_mut() {
        current.0 = sampler.sample(raw, now_millis);
    }
}

pub fn handle_restart_and_pause(
    mut paused: ResMut<SimulationPaused>,
    mut cars: Query<(&mut CarIntegrator, &SpawnPoint, &CurrentInput)>,
) {
    let mut toggle_pause = false;
    for (mut integrator, spawn, input) in cars.iter_mut() {
        if input.0.restart_triggered {
            info!("Restarting car at spawn point");
            integrator.reset(spawn.position, spawn.rotation_degrees);
        }
        toggle_pause |= input.0.pause_triggered;
    }

    if toggle_pause {
        paused.0 = !paused.0;
        info!("Simulation {}", if paused.0 { "paused" } else { "resumed" });
    }
}

pub fn step_cars(time: Res<Time>, mut cars: Query<(&mut CarIntegrator, &CurrentInput)>) {
    let delta = time.delta_secs();
    for (mut integrator, input) in cars.iter_mut() {
        integrator.update(&input.0, delta);
    }
}

pub fn publish_snapshots(mut cars: Query<(&CarIntegrator, &mut CarPhysicsSnapshot)>) {
    for (integrator, mut snapshot) in cars.iter_mut() {
        *snapshot = integrator.snapshot();
    }
}

// Renderer side: sprites only ever read snapshots
pub fn sync_car_transforms(mut cars: Query<(&CarPhysicsSnapshot, &mut Transform), With<Car>>) {
    for (snapshot, mut transform) in cars.iter_mut() {
        snapshot.apply_to_transform(&mut transform);
    }
}
