use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use bevy::{prelude::*, window::PresentMode};
use drift_handling::camera::{WIN_H, WIN_W, camera_setup, move_camera};
use drift_handling::car::{TuningSource, spawn_player_car};
use drift_handling::game_logic::{ConfigurationError, PhysicsTuning, load_tuning_from_file};
use drift_handling::{DriftPhysicsPlugin, SharedTuning};

const TUNING_PATH: &str = "assets/physics_tuning.json";

// Logging is reported by the plugin once LogPlugin is up
fn load_tuning() -> Result<(PhysicsTuning, TuningSource), ConfigurationError> {
    let path = Path::new(TUNING_PATH);
    if !path.exists() {
        let tuning = PhysicsTuning::default();
        tuning.validate()?;
        return Ok((
            tuning,
            TuningSource::Defaults {
                missing: PathBuf::from(TUNING_PATH),
            },
        ));
    }
    let tuning = load_tuning_from_file(path)?;
    Ok((tuning, TuningSource::File(PathBuf::from(TUNING_PATH))))
}

fn main() -> ExitCode {
    let (tuning, source) = match load_tuning() {
        Ok(loaded) => loaded,
        Err(err) => {
            // no subscriber exists before the app is built
            eprintln!("invalid physics tuning: {err}");
            return ExitCode::FAILURE;
        }
    };

    let exit = App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Drift Handling".into(),
                resolution: (WIN_W, WIN_H).into(),
                present_mode: PresentMode::AutoVsync,
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(DriftPhysicsPlugin {
            tuning: Arc::new(tuning),
            source,
        })
        .insert_resource(ClearColor(Color::srgb(0.35, 0.35, 0.38)))
        .add_systems(Startup, (camera_setup, car_setup))
        .add_systems(Update, move_camera)
        .run();

    if exit.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn car_setup(mut commands: Commands, tuning: Res<SharedTuning>, mut exit: EventWriter<AppExit>) {
    match spawn_player_car(&mut commands, &tuning, Vec2::ZERO, 0.0) {
        Ok(entity) => info!("Spawned player car {entity}"),
        Err(err) => {
            error!("Could not spawn car: {err}");
            exit.write(AppExit::error());
        }
    }
}
