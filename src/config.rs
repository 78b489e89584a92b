//! Runtime game configuration loaded from `assets/gravwell.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/gravwell.toml` and overwrites the defaults with any values present
//! in the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.gravity_force_scale`, `config.fuel_tap_cost`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/gravwell.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Arena ────────────────────────────────────────────────────────────────
    pub arena_width: f32,
    pub arena_height: f32,
    pub wall_thickness: f32,

    // ── Spaceship ────────────────────────────────────────────────────────────
    pub ship_radius: f32,
    pub body_restitution: f32,
    pub ship_linear_damping: f32,

    // ── Goal strip ───────────────────────────────────────────────────────────
    pub goal_height: f32,
    pub goal_width_level_one: f32,
    pub goal_width: f32,

    // ── Gravity ──────────────────────────────────────────────────────────────
    pub gravity_strength_divisor: f32,
    pub gravity_force_scale: f32,
    pub min_gravity_dist: f32,

    // ── Push impulses ────────────────────────────────────────────────────────
    pub instant_push_magnitude: f32,
    pub continuous_push_magnitude: f32,
    pub instant_impulse_scale: f32,
    pub continuous_force_scale: f32,
    pub hold_threshold_secs: f32,

    // ── Fuel ─────────────────────────────────────────────────────────────────
    pub fuel_max: f32,
    pub fuel_tap_cost: f32,
    pub fuel_hold_cost_per_tick: f32,

    // ── Timers ───────────────────────────────────────────────────────────────
    pub level_transition_delay_secs: f32,
    pub give_up_appear_delay_secs: f32,

    // ── Procedural planet generation ─────────────────────────────────────────
    pub planet_radius_min: f32,
    pub planet_radius_max: f32,
    pub generated_planet_density: f32,
    pub planet_count_min: u32,
    pub planet_count_max: u32,
    pub planet_placement_retries: u32,
    pub planet_relaxation_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Arena
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            // Spaceship
            ship_radius: SHIP_RADIUS,
            body_restitution: BODY_RESTITUTION,
            ship_linear_damping: SHIP_LINEAR_DAMPING,
            // Goal strip
            goal_height: GOAL_HEIGHT,
            goal_width_level_one: GOAL_WIDTH_LEVEL_ONE,
            goal_width: GOAL_WIDTH,
            // Gravity
            gravity_strength_divisor: GRAVITY_STRENGTH_DIVISOR,
            gravity_force_scale: GRAVITY_FORCE_SCALE,
            min_gravity_dist: MIN_GRAVITY_DIST,
            // Push impulses
            instant_push_magnitude: INSTANT_PUSH_MAGNITUDE,
            continuous_push_magnitude: CONTINUOUS_PUSH_MAGNITUDE,
            instant_impulse_scale: INSTANT_IMPULSE_SCALE,
            continuous_force_scale: CONTINUOUS_FORCE_SCALE,
            hold_threshold_secs: HOLD_THRESHOLD_SECS,
            // Fuel
            fuel_max: FUEL_MAX,
            fuel_tap_cost: FUEL_TAP_COST,
            fuel_hold_cost_per_tick: FUEL_HOLD_COST_PER_TICK,
            // Timers
            level_transition_delay_secs: LEVEL_TRANSITION_DELAY_SECS,
            give_up_appear_delay_secs: GIVE_UP_APPEAR_DELAY_SECS,
            // Procedural planet generation
            planet_radius_min: PLANET_RADIUS_MIN,
            planet_radius_max: PLANET_RADIUS_MAX,
            generated_planet_density: GENERATED_PLANET_DENSITY,
            planet_count_min: PLANET_COUNT_MIN,
            planet_count_max: PLANET_COUNT_MAX,
            planet_placement_retries: PLANET_PLACEMENT_RETRIES,
            planet_relaxation_rounds: PLANET_RELAXATION_ROUNDS,
        }
    }
}

/// Startup system: attempt to load `assets/gravwell.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are printed
/// to stderr but do not abort the game.  A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/gravwell.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded game config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = GameConfig::default();
        assert_eq!(config.arena_width, ARENA_WIDTH);
        assert_eq!(config.fuel_max, FUEL_MAX);
        assert_eq!(config.goal_width_level_one, GOAL_WIDTH_LEVEL_ONE);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config: GameConfig = toml::from_str("fuel_max = 300.0").unwrap();
        assert_eq!(config.fuel_max, 300.0);
        assert_eq!(config.fuel_tap_cost, FUEL_TAP_COST);
        assert_eq!(config.arena_height, ARENA_HEIGHT);
    }
}
