//! The radial gravity field.
//!
//! Global gravity is zeroed at startup; the only gravity in the session is
//! the per-planet inverse-square pull applied here.  The field is inert until
//! the first push ([`LaunchState::launched`]) and while forces are frozen
//! after a win or give-up, so the ship sits motionless on the launch pad no
//! matter how close a planet spawned.

use crate::config::GameConfig;
use crate::planet::Planet;
use crate::ship::{LaunchState, Spaceship};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Startup: disable the engine's uniform gravity.  Planets are the only
/// gravity sources.
pub fn configure_physics(mut rapier_config: Query<&mut RapierConfiguration>) {
    if let Ok(mut config) = rapier_config.single_mut() {
        config.gravity = Vec2::ZERO;
        println!("✓ Physics configured: global gravity off, planet fields only");
    }
}

/// Accumulate every planet's pull on the ship into its `ExternalForce`.
///
/// Per planet: `force = strength · scale / d²` toward the planet's center,
/// with `d` clamped to `min_gravity_dist` so a grazing pass cannot produce an
/// unbounded kick.  Fields overlap additively; there are no range cutoffs.
///
/// Runs after the push systems in the same chain, so it adds to (never
/// overwrites) any continuous thrust applied this frame.
pub fn planet_gravity_system(
    launch: Res<LaunchState>,
    config: Res<GameConfig>,
    planets: Query<(&Transform, &Planet)>,
    mut ships: Query<(&Transform, &mut ExternalForce), With<Spaceship>>,
) {
    if !launch.launched || launch.frozen {
        return;
    }
    let Ok((ship_transform, mut force)) = ships.single_mut() else {
        return;
    };
    let ship_pos = ship_transform.translation.truncate();

    for (planet_transform, planet) in planets.iter() {
        let delta = planet_transform.translation.truncate() - ship_pos;
        let dist = delta.length().max(config.min_gravity_dist);
        let strength = planet.gravity_strength(config.gravity_strength_divisor);
        let magnitude = strength * config.gravity_force_scale / (dist * dist);
        force.force += delta / dist * magnitude;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gravity_app(launched: bool, frozen: bool) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.insert_resource(LaunchState { launched, frozen });
        app.add_systems(Update, planet_gravity_system);
        app
    }

    fn spawn_pair(app: &mut App, ship_world: Vec2, planet_world: Vec2, planet: Planet) {
        app.world_mut().spawn((
            Spaceship,
            Transform::from_translation(ship_world.extend(0.0)),
            ExternalForce::default(),
        ));
        app.world_mut().spawn((
            planet,
            Transform::from_translation(planet_world.extend(0.0)),
        ));
    }

    fn ship_force(app: &mut App) -> Vec2 {
        let mut q = app
            .world_mut()
            .query_filtered::<&ExternalForce, With<Spaceship>>();
        q.single(app.world()).unwrap().force
    }

    #[test]
    fn gravity_pulls_toward_the_planet() {
        let mut app = gravity_app(true, false);
        // Planet straight above the ship in world space.
        spawn_pair(
            &mut app,
            Vec2::new(0.0, -200.0),
            Vec2::new(0.0, 0.0),
            Planet {
                radius: 70.0,
                density: 1.0,
            },
        );
        app.update();
        let force = ship_force(&mut app);
        assert!(force.y > 0.0, "expected pull upward, got {force:?}");
        assert!(force.x.abs() < 1e-3);
    }

    #[test]
    fn gravity_is_inert_before_launch() {
        let mut app = gravity_app(false, false);
        spawn_pair(
            &mut app,
            Vec2::ZERO,
            Vec2::new(0.0, 100.0),
            Planet {
                radius: 70.0,
                density: 1.0,
            },
        );
        app.update();
        assert_eq!(ship_force(&mut app), Vec2::ZERO);
    }

    #[test]
    fn gravity_is_inert_while_frozen() {
        let mut app = gravity_app(true, true);
        spawn_pair(
            &mut app,
            Vec2::ZERO,
            Vec2::new(0.0, 100.0),
            Planet {
                radius: 70.0,
                density: 1.0,
            },
        );
        app.update();
        assert_eq!(ship_force(&mut app), Vec2::ZERO);
    }

    #[test]
    fn pull_follows_an_inverse_square_falloff() {
        let planet = Planet {
            radius: 70.0,
            density: 1.0,
        };
        let mut near = gravity_app(true, false);
        spawn_pair(&mut near, Vec2::new(100.0, 0.0), Vec2::ZERO, planet);
        near.update();
        let mut far = gravity_app(true, false);
        spawn_pair(&mut far, Vec2::new(200.0, 0.0), Vec2::ZERO, planet);
        far.update();

        let ratio = ship_force(&mut near).length() / ship_force(&mut far).length();
        assert!((ratio - 4.0).abs() < 1e-2, "ratio {ratio}, expected 4");
    }

    #[test]
    fn close_approach_is_clamped() {
        let planet = Planet {
            radius: 70.0,
            density: 1.0,
        };
        // Ship essentially at the planet center: the min-distance clamp must
        // keep the force finite.
        let mut app = gravity_app(true, false);
        spawn_pair(&mut app, Vec2::new(0.01, 0.0), Vec2::ZERO, planet);
        app.update();
        let config = GameConfig::default();
        let strength = planet.gravity_strength(config.gravity_strength_divisor);
        let cap = strength * config.gravity_force_scale
            / (config.min_gravity_dist * config.min_gravity_dist);
        let force = ship_force(&mut app).length();
        assert!(force.is_finite());
        assert!(force <= cap + 1.0);
    }

    #[test]
    fn overlapping_fields_add() {
        let planet = Planet {
            radius: 30.0,
            density: 1.0,
        };
        let mut app = gravity_app(true, false);
        app.world_mut().spawn((
            Spaceship,
            Transform::from_translation(Vec3::ZERO),
            ExternalForce::default(),
        ));
        // Two equal planets mirrored about the ship cancel exactly.
        app.world_mut()
            .spawn((planet, Transform::from_translation(Vec3::new(150.0, 0.0, 0.0))));
        app.world_mut()
            .spawn((planet, Transform::from_translation(Vec3::new(-150.0, 0.0, 0.0))));
        app.update();
        assert!(ship_force(&mut app).length() < 1e-3);
    }
}
