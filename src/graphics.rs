use bevy::prelude::*;

/// Setup camera for 2D rendering.
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d at the origin shows the full arena when the window is
    // sized to the arena dimensions.
    commands.spawn(Camera2d);
    eprintln!("[SETUP] Camera spawned");
}
