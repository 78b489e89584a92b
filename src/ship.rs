//! The spaceship: entity, push input pipeline, and the fuel controller.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`clear_push_outputs_system`] — resets [`PushIntent`] and the ship's
//!    `ExternalImpulse` / `ExternalForce` to zero.
//! 2. [`pointer_to_intent_system`] — classifies mouse presses into taps and
//!    holds and records the gesture point in [`PushIntent`].
//! 3. [`apply_push_intent_system`] — the only system that writes physics
//!    outputs: gates the intent through fuel and channel state, then converts
//!    it into an impulse or a per-tick force.
//!
//! The **input abstraction layer** (`PushIntent`) makes the push logic fully
//! testable: tests populate the resource directly and run only
//! [`apply_push_intent_system`].

use crate::arena::Arena;
use crate::audio::{PlaySound, SoundEffect};
use crate::config::GameConfig;
use crate::level::{CurrentLevel, GiveUpTimer};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Components / Resources ───────────────────────────────────────────────────

/// Marker component for the spaceship entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Spaceship;

/// Depletable push budget.  Meaningful only on levels with fuel enabled;
/// reset to `max` on every level entry and never observed below zero.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FuelState {
    pub remaining: f32,
    pub max: f32,
}

impl Default for FuelState {
    fn default() -> Self {
        Self::full(crate::constants::FUEL_MAX)
    }
}

impl FuelState {
    pub fn full(max: f32) -> Self {
        Self {
            remaining: max,
            max,
        }
    }

    /// Gate-and-consume for an instantaneous push: succeeds only while the
    /// full cost is available.  The balance itself is never clamped — the
    /// gate is what keeps it non-negative.
    pub fn try_consume(&mut self, cost: f32) -> bool {
        if self.remaining >= cost {
            self.remaining -= cost;
            true
        } else {
            false
        }
    }
}

/// Which input channels are still live for the current level.
///
/// Channels are disabled permanently for the rest of a level when fuel runs
/// out (or, on level 1, after the single launch); only level entry restores
/// them.
#[derive(Resource, Debug, Clone, Copy)]
pub struct InputChannels {
    pub tap_enabled: bool,
    pub hold_enabled: bool,
}

impl Default for InputChannels {
    fn default() -> Self {
        Self::for_level(1)
    }
}

impl InputChannels {
    /// Fresh channel state for a level: holds are a level ≥ 2 ability.
    pub fn for_level(index: u32) -> Self {
        Self {
            tap_enabled: true,
            hold_enabled: index >= 2,
        }
    }
}

/// Launch / freeze gate for the force model.
///
/// Gravity is inert until the player's first push (`launched`); a win or a
/// give-up freezes every force until the next level entry (`frozen`).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LaunchState {
    pub launched: bool,
    pub frozen: bool,
}

/// One frame of classified pointer input, in arena space.
///
/// Cleared at the start of every frame; at most one of the two fields is set.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PushIntent {
    /// Gesture point of a tap completed this frame.
    pub tap: Option<Vec2>,
    /// Gesture point of a continuous hold active this frame.
    pub hold: Option<Vec2>,
}

/// Raw press bookkeeping for [`pointer_to_intent_system`].
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PressState {
    /// Seconds the primary button has been held, if currently down.
    held_secs: Option<f32>,
}

// ── Angle math ────────────────────────────────────────────────────────────────

/// Direction of a push, from the ship's center toward the gesture point, in
/// arena space.  Normalized into `[0, 2π)` by adding `2π` when negative.
///
/// Depends only on the direction of the gesture-to-ship vector, never its
/// length, so the same angle results wherever along the ray the player
/// touches.
pub fn push_angle(ship_center: Vec2, gesture_point: Vec2) -> f32 {
    let delta = gesture_point - ship_center;
    let angle = delta.y.atan2(delta.x);
    if angle < 0.0 {
        angle + std::f32::consts::TAU
    } else {
        angle
    }
}

/// Unit vector in Bevy world space for an arena-space push angle.
/// Arena y grows downward, so the world-space y component is negated.
fn world_direction(arena_angle: f32) -> Vec2 {
    Vec2::new(arena_angle.cos(), -arena_angle.sin())
}

// ── Spawn ─────────────────────────────────────────────────────────────────────

/// Arena-space launch position: bottom center, one radius above the floor.
pub fn launch_position(arena: &Arena, config: &GameConfig) -> Vec2 {
    Vec2::new(arena.mid_x(), arena.height - config.ship_radius)
}

/// Spawn the spaceship at its launch position.
///
/// The ship is the only dynamic body in the session.  `Ccd` is enabled so a
/// fast approach cannot tunnel through the 5-unit goal strip.
pub fn spawn_ship(commands: &mut Commands, arena: &Arena, config: &GameConfig) {
    let world = arena.to_world(launch_position(arena, config));
    commands.spawn((
        Spaceship,
        Transform::from_translation(world.extend(0.1)),
        GlobalTransform::default(),
        Visibility::default(),
        RigidBody::Dynamic,
        Collider::ball(config.ship_radius),
        Velocity::zero(),
        ExternalForce::default(),
        ExternalImpulse::default(),
        Damping {
            linear_damping: config.ship_linear_damping,
            angular_damping: 0.0,
        },
        Restitution::coefficient(config.body_restitution),
        Ccd::enabled(),
        ActiveEvents::COLLISION_EVENTS,
    ));
}

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

/// Zero the ship's push outputs and the frame's [`PushIntent`].
///
/// Must run before the intent and apply systems each frame so impulses fire
/// exactly once and the continuous force vanishes the instant a hold ends.
pub fn clear_push_outputs_system(
    mut q: Query<(&mut ExternalImpulse, &mut ExternalForce), With<Spaceship>>,
    mut intent: ResMut<PushIntent>,
) {
    if let Ok((mut impulse, mut force)) = q.single_mut() {
        impulse.impulse = Vec2::ZERO;
        impulse.torque_impulse = 0.0;
        force.force = Vec2::ZERO;
        force.torque = 0.0;
    }
    *intent = PushIntent::default();
}

// ── Step 2: Pointer → Intent ──────────────────────────────────────────────────

/// Classify primary-button presses into taps and holds.
///
/// A press released before `hold_threshold_secs` is a tap at the release
/// point; a press held at least that long becomes a continuous hold that
/// reports the live cursor position every frame until release.
pub fn pointer_to_intent_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    time: Res<Time>,
    arena: Res<Arena>,
    config: Res<GameConfig>,
    mut press: ResMut<PressState>,
    mut intent: ResMut<PushIntent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        press.held_secs = None;
        return;
    };

    // Window coordinates already have a top-left origin with y down — the
    // same frame as arena space, offset only if window and arena differ in
    // size (they match in the default configuration).
    let point = Vec2::new(
        cursor.x - (window.width() - arena.width) / 2.0,
        cursor.y - (window.height() - arena.height) / 2.0,
    );

    if buttons.just_pressed(MouseButton::Left) {
        press.held_secs = Some(0.0);
    }

    if buttons.pressed(MouseButton::Left) {
        if let Some(held) = press.held_secs.as_mut() {
            *held += time.delta_secs();
            if *held >= config.hold_threshold_secs {
                intent.hold = Some(point);
            }
        }
    }

    if buttons.just_released(MouseButton::Left) {
        if let Some(held) = press.held_secs.take() {
            if held < config.hold_threshold_secs {
                intent.tap = Some(point);
            }
        }
    }
}

// ── Step 3: Apply intent → physics ───────────────────────────────────────────

/// Convert [`PushIntent`] into an `ExternalImpulse` (tap) or `ExternalForce`
/// (hold) on the ship, consuming fuel and tripping channel disables.
///
/// This is the **only** system that writes push physics; the gating rules
/// live here in full:
///
/// | Situation                                  | Effect                              |
/// |--------------------------------------------|-------------------------------------|
/// | Forces frozen (win / give-up pending)      | Intent ignored                      |
/// | Tap, fuel enabled, `remaining ≥ cost`      | Impulse fired, fuel −50             |
/// | Tap, fuel enabled, `remaining < cost`      | Rejected; taps disabled for level   |
/// | Tap, fuel disabled (level 1)               | Impulse fired; both channels disabled |
/// | Hold, `remaining ≥ 1`                      | Force applied, fuel −1 this tick    |
/// | Hold, `remaining < 1`                      | Thrust cut; holds disabled for level |
///
/// The first accepted push flips [`LaunchState::launched`] — gravity wakes up
/// and the give-up affordance countdown starts.
#[allow(clippy::too_many_arguments)]
pub fn apply_push_intent_system(
    mut q: Query<(&Transform, &mut ExternalImpulse, &mut ExternalForce), With<Spaceship>>,
    intent: Res<PushIntent>,
    arena: Res<Arena>,
    config: Res<GameConfig>,
    level: Res<CurrentLevel>,
    mut fuel: ResMut<FuelState>,
    mut channels: ResMut<InputChannels>,
    mut launch: ResMut<LaunchState>,
    mut give_up_timer: ResMut<GiveUpTimer>,
    mut sounds: MessageWriter<PlaySound>,
) {
    if launch.frozen {
        return;
    }
    let Ok((transform, mut impulse, mut force)) = q.single_mut() else {
        return;
    };

    let ship_center = arena.to_arena(transform.translation.truncate());
    let fuel_enabled = level.config.fuel_enabled;

    if let Some(point) = intent.tap {
        if channels.tap_enabled {
            let allowed = if fuel_enabled {
                let ok = fuel.try_consume(config.fuel_tap_cost);
                if !ok {
                    // Insufficient fuel permanently retires the tap channel
                    // for this level, not just this attempt.
                    channels.tap_enabled = false;
                }
                ok
            } else {
                // Level 1: the launch is a single shot.
                channels.tap_enabled = false;
                channels.hold_enabled = false;
                true
            };

            if allowed {
                let angle = push_angle(ship_center, point);
                impulse.impulse = world_direction(angle)
                    * config.instant_push_magnitude
                    * config.instant_impulse_scale;
                sounds.write(PlaySound(SoundEffect::Engine));
                begin_launch(&mut launch, &mut give_up_timer, &config);
            }
        }
    }

    if let Some(point) = intent.hold {
        if channels.hold_enabled {
            if fuel.try_consume(config.fuel_hold_cost_per_tick) {
                let angle = push_angle(ship_center, point);
                force.force = world_direction(angle)
                    * config.continuous_push_magnitude
                    * config.continuous_force_scale;
                begin_launch(&mut launch, &mut give_up_timer, &config);
            } else {
                channels.hold_enabled = false;
            }
        }
    }
}

/// First accepted push: wake gravity and schedule the give-up affordance.
fn begin_launch(launch: &mut LaunchState, give_up_timer: &mut GiveUpTimer, config: &GameConfig) {
    if !launch.launched {
        launch.launched = true;
        give_up_timer.0 = Some(config.give_up_appear_delay_secs);
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
