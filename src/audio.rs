//! Background music and fire-and-forget sound effects.
//!
//! Gameplay systems write [`PlaySound`] messages; [`sound_playback_system`]
//! turns each one into a one-shot [`AudioPlayer`] entity.  A single looping
//! music entity is spawned at startup and lives for the whole session.
//! Nothing in the core ever waits on audio: a missing or unloadable asset
//! degrades to silence (the asset server logs the failure) and the game
//! continues.

use bevy::prelude::*;

/// Asset path of the looping background track.
pub const BACKGROUND_MUSIC_PATH: &str = "sounds/music.ogg";

/// The sound effects the session can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// A push impulse fired from the ship's engine.
    Engine,
    /// The ship bounced off a planet or a wall.
    Collision,
    /// The goal strip was reached.
    Success,
}

impl SoundEffect {
    /// Asset path for this effect.
    pub fn asset_path(self) -> &'static str {
        match self {
            SoundEffect::Engine => "sounds/engine.ogg",
            SoundEffect::Collision => "sounds/collision.ogg",
            SoundEffect::Success => "sounds/success.ogg",
        }
    }
}

/// Fire-and-forget request to play a sound effect.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlaySound(pub SoundEffect);

/// Marker for the looping background-music entity.
#[derive(Component)]
pub struct BackgroundMusic;

/// Registers the [`PlaySound`] message, the playback system, and the
/// background track.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlaySound>()
            .add_systems(Startup, start_background_music)
            .add_systems(Update, sound_playback_system);
    }
}

/// Spawn the looping background track.  Spawned once and never despawned;
/// level transitions do not restart it.
fn start_background_music(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((
        AudioPlayer::new(asset_server.load(BACKGROUND_MUSIC_PATH)),
        PlaybackSettings::LOOP,
        BackgroundMusic,
    ));
    info!("[audio] background music started");
}

/// Spawn a despawn-on-finish audio entity for every requested effect.
fn sound_playback_system(
    mut commands: Commands,
    mut requests: MessageReader<PlaySound>,
    asset_server: Res<AssetServer>,
) {
    for PlaySound(effect) in requests.read() {
        commands.spawn((
            AudioPlayer::new(asset_server.load(effect.asset_path())),
            PlaybackSettings::DESPAWN,
        ));
        info!("[audio] {:?}", effect);
    }
}
