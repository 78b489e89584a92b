//! Planets: static circular gravity sources, and the procedural layout
//! generator used for endless levels.
//!
//! A planet never moves once placed; its only dynamic influence is the radial
//! gravity field applied to the spaceship by
//! [`crate::simulation::planet_gravity_system`].

use crate::arena::Arena;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

/// A static circular gravity source.
#[derive(Component, Debug, Clone, Copy)]
pub struct Planet {
    pub radius: f32,
    pub density: f32,
}

impl Planet {
    /// Field strength of this planet: `radius / divisor * density`.
    ///
    /// Bigger planets pull proportionally harder; density scales the whole
    /// field (generated planets use a slightly lower density than presets).
    pub fn gravity_strength(&self, divisor: f32) -> f32 {
        self.radius / divisor * self.density
    }
}

/// Pure description of a planet before it is spawned: center in arena space,
/// radius, density.  Level presets and the generator both produce these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetSpec {
    pub center: Vec2,
    pub radius: f32,
    pub density: f32,
}

impl PlanetSpec {
    pub fn new(center: Vec2, radius: f32, density: f32) -> Self {
        Self {
            center,
            radius,
            density,
        }
    }
}

// ── Procedural generation ─────────────────────────────────────────────────────

/// Draw a planet count from a Gaussian-shaped distribution over
/// `[count_min, count_max]`, biased toward the middle of the range.
///
/// The rounded mean of three uniform draws approximates a bell curve and is
/// bounded by construction, so no clamping or resampling is needed.
pub fn draw_planet_count<R: Rng>(rng: &mut R, count_min: u32, count_max: u32) -> u32 {
    let lo = count_min as f32;
    let hi = count_max as f32;
    let sum: f32 = (0..3).map(|_| rng.gen_range(lo..=hi)).sum();
    (sum / 3.0).round() as u32
}

/// Generate a non-overlapping planet layout for a procedural level.
///
/// Each planet is drawn by rejection sampling inside the band strictly
/// between the goal strip and the ship's launch row:
/// - `radius ∈ [radius_min, radius_max]` uniform
/// - `x ∈ [0, arena.width − radius]` (at least half the planet on screen, to
///   avoid gravity from a source the player cannot see)
/// - `y ∈ [2·goal_height + radius, arena.height − radius − ship_radius]`
///
/// A candidate is rejected when its center is closer than the **sum of
/// diameters** to any accepted planet — twice the strict no-overlap margin,
/// so neighbouring wells stay visually distinct.
///
/// Rejection sampling is bounded: after `planet_placement_retries` failures
/// the radius range is relaxed (max halves), and after
/// `planet_relaxation_rounds` rounds the planet is skipped with a warning.
/// Generation therefore always terminates and never fails the session.
pub fn generate_planet_layout<R: Rng>(
    rng: &mut R,
    arena: &Arena,
    config: &GameConfig,
) -> Vec<PlanetSpec> {
    let count = draw_planet_count(rng, config.planet_count_min, config.planet_count_max);
    let mut planets: Vec<PlanetSpec> = Vec::with_capacity(count as usize);

    for _ in 0..count {
        match place_one_planet(rng, arena, config, &planets) {
            Ok(spec) => planets.push(spec),
            Err(e) => warn!("{e}; continuing with a smaller layout"),
        }
    }

    planets
}

/// Sample a single planet that fits the band and the spacing rule, relaxing
/// the radius range on repeated failure.  Errs only when every relaxation
/// round is spent.
fn place_one_planet<R: Rng>(
    rng: &mut R,
    arena: &Arena,
    config: &GameConfig,
    existing: &[PlanetSpec],
) -> GameResult<PlanetSpec> {
    let mut radius_max = config.planet_radius_max;

    for _ in 0..=config.planet_relaxation_rounds {
        for _ in 0..config.planet_placement_retries {
            let radius = rng.gen_range(config.planet_radius_min..=radius_max);
            let x = rng.gen_range(0.0..=(arena.width - radius));
            let y_lo = 2.0 * config.goal_height + radius;
            let y_hi = arena.height - radius - config.ship_radius;
            if y_lo >= y_hi {
                // Band degenerate for this radius; resample.
                continue;
            }
            let y = rng.gen_range(y_lo..=y_hi);
            let candidate = PlanetSpec::new(
                Vec2::new(x, y),
                radius,
                config.generated_planet_density,
            );

            if fits_spacing(&candidate, existing) {
                return Ok(candidate);
            }
        }
        // Shrink the draw range and try again with smaller planets.
        radius_max = (radius_max / 2.0).max(config.planet_radius_min);
    }

    Err(GameError::PlanetPlacementExhausted {
        placed: existing.len(),
        attempts: config.planet_placement_retries * (config.planet_relaxation_rounds + 1),
    })
}

/// Spacing rule: the candidate's center must be at least the sum of diameters
/// away from every accepted planet.
fn fits_spacing(candidate: &PlanetSpec, existing: &[PlanetSpec]) -> bool {
    existing.iter().all(|other| {
        let min_distance = 2.0 * other.radius + 2.0 * candidate.radius;
        candidate.center.distance(other.center) >= min_distance
    })
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn one physics entity per [`PlanetSpec`].
///
/// Planets are fixed bodies: they bounce the ship (restitution shared with
/// the walls) and report collision events, but never move.  Meshes are
/// attached separately by the rendering module so headless tests can spawn
/// levels without assets.
pub fn spawn_planets(
    commands: &mut Commands,
    arena: &Arena,
    config: &GameConfig,
    specs: &[PlanetSpec],
) {
    for spec in specs {
        let world = arena.to_world(spec.center);
        commands.spawn((
            Planet {
                radius: spec.radius,
                density: spec.density,
            },
            Transform::from_translation(world.extend(0.0)),
            GlobalTransform::default(),
            Visibility::default(),
            RigidBody::Fixed,
            Collider::ball(spec.radius),
            Restitution::coefficient(config.body_restitution),
            ActiveEvents::COLLISION_EVENTS,
        ));
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_arena() -> Arena {
        Arena::new(375.0, 668.0)
    }

    #[test]
    fn gravity_strength_scales_with_radius_and_density() {
        let big = Planet {
            radius: 70.0,
            density: 1.0,
        };
        let small = Planet {
            radius: 30.0,
            density: 1.0,
        };
        let light = Planet {
            radius: 70.0,
            density: 0.8,
        };
        assert!(big.gravity_strength(19.0) > small.gravity_strength(19.0));
        assert!(light.gravity_strength(19.0) < big.gravity_strength(19.0));
        assert!((big.gravity_strength(19.0) - 70.0 / 19.0).abs() < 1e-5);
    }

    #[test]
    fn planet_count_stays_in_bounds_across_many_draws() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let count = draw_planet_count(&mut rng, 1, 6);
            assert!((1..=6).contains(&count), "count {count} out of [1, 6]");
        }
    }

    #[test]
    fn planet_count_is_biased_toward_the_middle() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<u32> = (0..2000).map(|_| draw_planet_count(&mut rng, 1, 6)).collect();
        let mean = draws.iter().sum::<u32>() as f32 / draws.len() as f32;
        assert!((3.0..=4.0).contains(&mean), "mean {mean} not centered");
        // Extremes should be rare relative to the center of the range.
        let ones = draws.iter().filter(|&&c| c == 1).count();
        let threes = draws.iter().filter(|&&c| c == 3).count();
        assert!(threes > ones);
    }

    #[test]
    fn generated_layouts_satisfy_the_spacing_invariant() {
        let arena = test_arena();
        let config = GameConfig::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let layout = generate_planet_layout(&mut rng, &arena, &config);
            for (i, a) in layout.iter().enumerate() {
                for b in layout.iter().skip(i + 1) {
                    let dist = a.center.distance(b.center);
                    let min = 2.0 * a.radius + 2.0 * b.radius;
                    assert!(
                        dist >= min,
                        "seed {seed}: planets {dist} apart, need {min}"
                    );
                }
            }
        }
    }

    #[test]
    fn generated_planets_stay_inside_the_placement_band() {
        let arena = test_arena();
        let config = GameConfig::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for spec in generate_planet_layout(&mut rng, &arena, &config) {
                assert!(spec.center.x >= 0.0);
                assert!(spec.center.x <= arena.width - spec.radius);
                // Top of the planet below the goal strip's clearance band.
                assert!(spec.center.y - spec.radius >= 2.0 * config.goal_height);
                // Bottom of the planet above the launch row.
                assert!(spec.center.y + spec.radius <= arena.height - config.ship_radius);
                assert_eq!(spec.density, config.generated_planet_density);
            }
        }
    }

    #[test]
    fn generation_terminates_in_a_cramped_arena() {
        // An arena barely taller than the placement band forces heavy
        // rejection; the bounded loop must still return.
        let arena = Arena::new(80.0, 120.0);
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let layout = generate_planet_layout(&mut rng, &arena, &config);
        // Whatever was placed still honours the spacing rule.
        for (i, a) in layout.iter().enumerate() {
            for b in layout.iter().skip(i + 1) {
                assert!(a.center.distance(b.center) >= 2.0 * a.radius + 2.0 * b.radius);
            }
        }
    }

    #[test]
    fn exhausted_placement_reports_the_attempt_budget() {
        // An arena too short for any radius to fit the placement band: every
        // sample degenerates and the full retry budget is spent.
        let arena = Arena::new(100.0, 40.0);
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let err = place_one_planet(&mut rng, &arena, &config, &[]).unwrap_err();
        match err {
            GameError::PlanetPlacementExhausted { placed, attempts } => {
                assert_eq!(placed, 0);
                assert_eq!(
                    attempts,
                    config.planet_placement_retries * (config.planet_relaxation_rounds + 1)
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_layout() {
        let arena = test_arena();
        let config = GameConfig::default();
        let a = generate_planet_layout(&mut StdRng::seed_from_u64(99), &arena, &config);
        let b = generate_planet_layout(&mut StdRng::seed_from_u64(99), &arena, &config);
        assert_eq!(a, b);
    }
}
