use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use std::env;

use gravwell::arena::Arena;
use gravwell::audio::GameAudioPlugin;
use gravwell::config::{load_game_config, GameConfig};
use gravwell::constants::{ARENA_HEIGHT, ARENA_WIDTH};
use gravwell::graphics::setup_camera;
use gravwell::hud::HudPlugin;
use gravwell::level::{spawn_walls, BeginLevel, SessionPlugin};
use gravwell::menu::GiveUpPromptPlugin;
use gravwell::ship::spawn_ship;
use gravwell::simulation::configure_physics;

/// Starting level, overridable for playtesting deeper layouts directly.
fn start_level() -> u32 {
    env::var("GRAVWELL_LEVEL")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&index| index >= 1)
        .unwrap_or(1)
}

/// Spawn the permanent world: walls and the ship.  Planets and the goal are
/// per-level and arrive via the first [`BeginLevel`] message.
fn spawn_world(mut commands: Commands, arena: Res<Arena>, config: Res<GameConfig>) {
    spawn_walls(&mut commands, &arena, &config);
    spawn_ship(&mut commands, &arena, &config);
}

/// Request entry of the starting level once everything else is set up.
fn request_start_level(mut begin: MessageWriter<BeginLevel>) {
    let index = start_level();
    println!("✓ Starting at level {index}");
    begin.write(BeginLevel { index });
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Gravwell".into(),
                resolution: WindowResolution::new(ARENA_WIDTH as u32, ARENA_HEIGHT as u32),
                resizable: false,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Insert GameConfig with compiled defaults; load_game_config will
        // overwrite it from assets/gravwell.toml (if present) in Startup.
        .insert_resource(GameConfig::default())
        .insert_resource(Arena::new(ARENA_WIDTH, ARENA_HEIGHT))
        // pixels_per_meter(1.0) keeps world units equal to physics units.
        // Larger values shrink collider mass quadratically and make the tuned
        // impulse and gravity scales produce runaway acceleration.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((GiveUpPromptPlugin, SessionPlugin, GameAudioPlugin, HudPlugin))
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the
                // final values.
                load_game_config,
                setup_camera.after(load_game_config),
                spawn_world.after(load_game_config),
                configure_physics,
                request_start_level.after(spawn_world),
            ),
        )
        .run();
}
