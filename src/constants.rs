//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Runtime overrides come from `assets/gravwell.toml` via [`crate::config`].

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Width of the playfield in world units.
///
/// Arena space puts the origin at the top-left with y growing downward; all
/// placement math uses that frame and is converted to Bevy's centered world
/// coordinates only when spawning.
pub const ARENA_WIDTH: f32 = 375.0;

/// Height of the playfield in world units.
pub const ARENA_HEIGHT: f32 = 668.0;

/// Thickness of the four static boundary walls enclosing the arena.
pub const WALL_THICKNESS: f32 = 20.0;

// ── Spaceship ─────────────────────────────────────────────────────────────────

/// Radius of the spaceship's ball collider.  The launch position and the
/// planet-placement band are both derived from this value.
pub const SHIP_RADIUS: f32 = 20.0;

/// Restitution shared by the ship, the planets, and the boundary walls.
/// 0.8 gives lively but not fully elastic bounces off planets and walls.
pub const BODY_RESTITUTION: f32 = 0.8;

/// Linear damping on the ship.  Zero: space is frictionless and the only
/// decelerating influences are gravity wells and wall bounces.
pub const SHIP_LINEAR_DAMPING: f32 = 0.0;

// ── Goal strip ────────────────────────────────────────────────────────────────

/// Height of the goal strip at the top of the arena.
pub const GOAL_HEIGHT: f32 = 5.0;

/// Goal width for level 1 (the tutorial level is forgiving).
pub const GOAL_WIDTH_LEVEL_ONE: f32 = 130.0;

/// Goal width for every level after the first.
pub const GOAL_WIDTH: f32 = 70.0;

// ── Gravity ───────────────────────────────────────────────────────────────────

/// Divisor in the per-planet field strength formula `radius / 19 * density`.
///
/// Larger planets pull harder in direct proportion to their radius; 19 was
/// tuned so a radius-70 planet is a serious hazard without being inescapable.
pub const GRAVITY_STRENGTH_DIVISOR: f32 = 19.0;

/// Scale from field strength to Newtons of per-tick force on the ship.
///
/// The field strength of a radius-70, density-1.0 planet is ~3.7; at this
/// scale the ship (mass ≈ 1257 for a radius-20 ball at density 1) feels
/// ~55 u/s² of acceleration from 200 u away — enough to bend a launch
/// noticeably without capturing every trajectory.
pub const GRAVITY_FORCE_SCALE: f32 = 750_000.0;

/// Distance clamp below which the inverse-square law stops growing.
///
/// Inside this range Rapier's contact resolution takes over; injecting
/// unbounded gravity at near-zero separation destabilises the bounce.
pub const MIN_GRAVITY_DIST: f32 = 5.0;

// ── Push impulses ─────────────────────────────────────────────────────────────

/// Dimensionless magnitude of an instantaneous (tap) push.
pub const INSTANT_PUSH_MAGNITUDE: f32 = 0.3;

/// Dimensionless magnitude of the continuous (hold) thrust, applied per tick.
pub const CONTINUOUS_PUSH_MAGNITUDE: f32 = 0.5;

/// Scale from instantaneous push magnitude to a Rapier impulse.
///
/// At 600 000 a 0.3-magnitude tap changes the ship's velocity by ~143 u/s —
/// enough to cross the arena in a few seconds from a standing start.
pub const INSTANT_IMPULSE_SCALE: f32 = 600_000.0;

/// Scale from continuous push magnitude to a per-tick Rapier force.
///
/// At 250 000 a held 0.5-magnitude thrust accelerates the ship at ~100 u/s².
pub const CONTINUOUS_FORCE_SCALE: f32 = 250_000.0;

/// Seconds a press must be held before it counts as continuous thrust rather
/// than a tap.
pub const HOLD_THRESHOLD_SECS: f32 = 0.3;

// ── Fuel ──────────────────────────────────────────────────────────────────────

/// Full fuel budget granted on every level entry (when fuel is enabled).
/// Mapped 1:1 to the fuel indicator's height in pixels.
pub const FUEL_MAX: f32 = 200.0;

/// Fuel consumed by one instantaneous push.
pub const FUEL_TAP_COST: f32 = 50.0;

/// Fuel consumed per tick of continuous thrust.
pub const FUEL_HOLD_COST_PER_TICK: f32 = 1.0;

// ── Timers ────────────────────────────────────────────────────────────────────

/// Seconds between a win and entry into the next level.
pub const LEVEL_TRANSITION_DELAY_SECS: f32 = 3.0;

/// Seconds after launch before the give-up button appears.
pub const GIVE_UP_APPEAR_DELAY_SECS: f32 = 4.0;

// ── Procedural planet generation (levels > 3) ─────────────────────────────────

/// Smallest planet radius the generator may draw.
pub const PLANET_RADIUS_MIN: f32 = 10.0;

/// Largest planet radius the generator may draw.
pub const PLANET_RADIUS_MAX: f32 = 60.0;

/// Density assigned to procedurally generated planets.  Slightly below the
/// preset-planet density of 1.0 so random clusters stay navigable.
pub const GENERATED_PLANET_DENSITY: f32 = 0.8;

/// Fewest planets a generated level may contain.
pub const PLANET_COUNT_MIN: u32 = 1;

/// Most planets a generated level may contain.
pub const PLANET_COUNT_MAX: u32 = 6;

/// Placement attempts per planet before the radius range is relaxed.
///
/// Rejection sampling against the sum-of-diameters spacing rule can stall
/// when large radii are drawn into a crowded band; the cap guarantees
/// termination where unbounded retrying would not.
pub const PLANET_PLACEMENT_RETRIES: u32 = 64;

/// Radius-range relaxation rounds before a planet is skipped entirely.
/// Each round halves the maximum radius (floored at [`PLANET_RADIUS_MIN`]).
pub const PLANET_RELAXATION_ROUNDS: u32 = 3;
