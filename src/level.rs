//! Level lifecycle: the level table, level entry/reset, win detection, and
//! the two cancellable countdowns (level transition and give-up affordance).
//!
//! A level is described by a [`LevelConfig`] — goal width, fuel rule, planet
//! layout, tutorial text.  Levels 1–3 are authored presets; every level past
//! the table is generated by [`crate::planet::generate_planet_layout`], so
//! the session never runs out of levels.
//!
//! All transitions funnel through the [`BeginLevel`] message: the win
//! countdown, the give-up retry, and the startup level all request entry the
//! same way, and [`enter_level_system`] is the only place that mutates the
//! session into a fresh level.

use crate::arena::Arena;
use crate::audio::{PlaySound, SoundEffect};
use crate::config::GameConfig;
use crate::menu::GameState;
use crate::planet::{generate_planet_layout, spawn_planets, Planet, PlanetSpec};
use crate::ship::{
    apply_push_intent_system, clear_push_outputs_system, launch_position,
    pointer_to_intent_system, FuelState, InputChannels, LaunchState, PressState, PushIntent,
    Spaceship,
};
use crate::simulation::planet_gravity_system;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

// ── Components ────────────────────────────────────────────────────────────────

/// The win region: a thin sensor strip along the top edge of the arena.
#[derive(Component, Debug, Clone, Copy)]
pub struct GoalStrip {
    pub width: f32,
}

/// One of the four arena boundary walls.
#[derive(Component, Debug, Clone, Copy)]
pub struct Wall;

// ── Level table ───────────────────────────────────────────────────────────────

/// Everything that varies from level to level.
#[derive(Debug, Clone)]
pub struct LevelConfig {
    /// 1-based level index.
    pub index: u32,
    pub goal_width: f32,
    /// When false (level 1 only), pushes are free but the launch is a single
    /// shot.
    pub fuel_enabled: bool,
    pub planets: Vec<PlanetSpec>,
    /// One-line instruction shown until the first push.
    pub tutorial: Option<&'static str>,
}

/// The level currently being played.
#[derive(Resource, Debug, Clone)]
pub struct CurrentLevel {
    pub config: LevelConfig,
}

impl Default for CurrentLevel {
    /// Level 1 with compiled defaults; replaced by the first
    /// [`enter_level_system`] run before any gameplay frame.
    fn default() -> Self {
        let arena = Arena::new(crate::constants::ARENA_WIDTH, crate::constants::ARENA_HEIGHT);
        let config = GameConfig::default();
        Self {
            config: level_config(1, &arena, &config, &mut rand::thread_rng()),
        }
    }
}

/// Build the [`LevelConfig`] for a 1-based level index.
///
/// | Level | Goal width | Fuel | Planets                                    |
/// |-------|-----------|------|---------------------------------------------|
/// | 1     | wide      | off  | one large planet at the arena center        |
/// | 2     | narrow    | on   | same planet as level 1                      |
/// | 3     | narrow    | on   | two offset planets flanking the flight path |
/// | ≥ 4   | narrow    | on   | procedurally generated layout               |
pub fn level_config<R: Rng>(
    index: u32,
    arena: &Arena,
    config: &GameConfig,
    rng: &mut R,
) -> LevelConfig {
    let center_planet = PlanetSpec::new(Vec2::new(arena.mid_x(), arena.mid_y()), 70.0, 1.0);
    match index {
        0 | 1 => LevelConfig {
            index: 1,
            goal_width: config.goal_width_level_one,
            fuel_enabled: false,
            planets: vec![center_planet],
            tutorial: Some("Tap anywhere: the ship is pushed away from your finger. One shot!"),
        },
        2 => LevelConfig {
            index: 2,
            goal_width: config.goal_width,
            fuel_enabled: true,
            planets: vec![center_planet],
            tutorial: Some("Taps cost 50 fuel. Press and hold to steer with continuous thrust."),
        },
        3 => LevelConfig {
            index: 3,
            goal_width: config.goal_width,
            fuel_enabled: true,
            planets: vec![
                PlanetSpec::new(Vec2::new(40.0, 500.0), 30.0, 1.0),
                PlanetSpec::new(Vec2::new(335.0, 250.0), 30.0, 1.0),
            ],
            tutorial: Some("Now let's begin our journey."),
        },
        _ => LevelConfig {
            index,
            goal_width: config.goal_width,
            fuel_enabled: true,
            planets: generate_planet_layout(rng, arena, config),
            tutorial: None,
        },
    }
}

// ── Messages / countdown resources ────────────────────────────────────────────

/// Request to (re)enter a level.  The single entry point for all transitions.
#[derive(Message, Debug, Clone, Copy)]
pub struct BeginLevel {
    pub index: u32,
}

/// Seconds until the next level begins after a win.  `None` when no win is
/// pending; cancelled (reset to `None`) by a give-up.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PendingTransition(pub Option<f32>);

/// Seconds until the give-up affordance appears.  Armed by the first push,
/// disarmed by a win.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GiveUpTimer(pub Option<f32>);

/// Whether the give-up affordance is currently on screen.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GiveUpOffered(pub bool);

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn the goal strip: a thin sensor centered along the top edge.
///
/// Being a sensor, it reports contact without deflecting the ship, so a near
/// miss that clips the strip's corner still counts.
pub fn spawn_goal(commands: &mut Commands, arena: &Arena, config: &GameConfig, width: f32) {
    let center = arena.to_world(Vec2::new(arena.mid_x(), config.goal_height / 2.0));
    commands.spawn((
        GoalStrip { width },
        Transform::from_translation(center.extend(0.0)),
        GlobalTransform::default(),
        Visibility::default(),
        RigidBody::Fixed,
        Collider::cuboid(width / 2.0, config.goal_height / 2.0),
        Sensor,
        ActiveEvents::COLLISION_EVENTS,
    ));
}

/// Spawn the four boundary walls just outside the arena edges.
///
/// Fixed bodies with the shared restitution, so the ship bounces off the
/// screen edge exactly like it bounces off a planet.
pub fn spawn_walls(commands: &mut Commands, arena: &Arena, config: &GameConfig) {
    let t = config.wall_thickness;
    let (w, h) = (arena.width, arena.height);
    // Arena-space centers: each wall sits flush against one edge.
    let walls = [
        // left, right
        (Vec2::new(-t / 2.0, arena.mid_y()), t / 2.0, h / 2.0 + t),
        (Vec2::new(w + t / 2.0, arena.mid_y()), t / 2.0, h / 2.0 + t),
        // top, bottom
        (Vec2::new(arena.mid_x(), -t / 2.0), w / 2.0 + t, t / 2.0),
        (Vec2::new(arena.mid_x(), h + t / 2.0), w / 2.0 + t, t / 2.0),
    ];
    for (center, half_x, half_y) in walls {
        commands.spawn((
            Wall,
            Transform::from_translation(arena.to_world(center).extend(0.0)),
            GlobalTransform::default(),
            RigidBody::Fixed,
            Collider::cuboid(half_x, half_y),
            Restitution::coefficient(config.body_restitution),
            ActiveEvents::COLLISION_EVENTS,
        ));
    }
}

// ── Level entry ───────────────────────────────────────────────────────────────

/// Tear down the previous level and build the requested one.
///
/// Consumes [`BeginLevel`] messages (only the last one per frame matters),
/// despawns the old planets and goal, parks the ship back at the launch
/// position with zeroed motion, and resets every per-level resource: fuel,
/// input channels, launch state, both countdowns.
#[allow(clippy::too_many_arguments)]
pub fn enter_level_system(
    mut requests: MessageReader<BeginLevel>,
    mut commands: Commands,
    arena: Res<Arena>,
    config: Res<GameConfig>,
    mut current: ResMut<CurrentLevel>,
    mut fuel: ResMut<FuelState>,
    mut channels: ResMut<InputChannels>,
    mut launch: ResMut<LaunchState>,
    mut pending: ResMut<PendingTransition>,
    mut give_up_timer: ResMut<GiveUpTimer>,
    mut offered: ResMut<GiveUpOffered>,
    planets: Query<Entity, With<Planet>>,
    goals: Query<Entity, With<GoalStrip>>,
    mut ship: Query<
        (
            &mut Transform,
            &mut Velocity,
            &mut ExternalForce,
            &mut ExternalImpulse,
        ),
        With<Spaceship>,
    >,
) {
    let Some(&BeginLevel { index }) = requests.read().last() else {
        return;
    };
    let index = match crate::error::validate_level_index(index) {
        Ok(()) => index,
        Err(e) => {
            warn!("[level] {e}; falling back to level 1");
            1
        }
    };

    for entity in planets.iter().chain(goals.iter()) {
        commands.entity(entity).despawn();
    }

    let mut rng = rand::thread_rng();
    let level = level_config(index, &arena, &config, &mut rng);
    info!(
        "[level] entering level {} ({} planets, goal {} wide)",
        level.index,
        level.planets.len(),
        level.goal_width
    );

    spawn_goal(&mut commands, &arena, &config, level.goal_width);
    spawn_planets(&mut commands, &arena, &config, &level.planets);

    if let Ok((mut transform, mut velocity, mut force, mut impulse)) = ship.single_mut() {
        let world = arena.to_world(launch_position(&arena, &config));
        transform.translation = world.extend(transform.translation.z);
        *velocity = Velocity::zero();
        force.force = Vec2::ZERO;
        force.torque = 0.0;
        impulse.impulse = Vec2::ZERO;
        impulse.torque_impulse = 0.0;
    }

    *fuel = FuelState::full(config.fuel_max);
    *channels = InputChannels::for_level(level.index);
    *launch = LaunchState::default();
    *pending = PendingTransition(None);
    *give_up_timer = GiveUpTimer(None);
    *offered = GiveUpOffered(false);
    current.config = level;
}

// ── Win detection ─────────────────────────────────────────────────────────────

/// Classify collision events involving the ship.
///
/// A contact between the ship and the goal strip is a win: forces freeze, the
/// success sound fires, the give-up countdown disarms, and the transition
/// countdown starts.  Further goal contacts while a transition is already
/// pending are ignored, so a ship that settles onto the strip cannot trigger
/// a second transition.
///
/// A contact between the ship and a planet or wall is a bounce and only emits
/// the collision sound; the physics engine handles the reflection.
#[allow(clippy::too_many_arguments)]
pub fn collision_outcome_system(
    mut collisions: MessageReader<CollisionEvent>,
    ships: Query<Entity, With<Spaceship>>,
    goals: Query<Entity, With<GoalStrip>>,
    obstacles: Query<Entity, Or<(With<Planet>, With<Wall>)>>,
    config: Res<GameConfig>,
    current: Res<CurrentLevel>,
    mut launch: ResMut<LaunchState>,
    mut pending: ResMut<PendingTransition>,
    mut give_up_timer: ResMut<GiveUpTimer>,
    mut sounds: MessageWriter<PlaySound>,
) {
    let Ok(ship) = ships.single() else {
        return;
    };

    for event in collisions.read() {
        let CollisionEvent::Started(e1, e2, _) = event else {
            continue;
        };
        let other = if *e1 == ship {
            *e2
        } else if *e2 == ship {
            *e1
        } else {
            continue;
        };

        if goals.contains(other) {
            if pending.0.is_none() {
                info!("[level] level {} cleared", current.config.index);
                launch.frozen = true;
                give_up_timer.0 = None;
                pending.0 = Some(config.level_transition_delay_secs);
                sounds.write(PlaySound(SoundEffect::Success));
            }
        } else if obstacles.contains(other) {
            sounds.write(PlaySound(SoundEffect::Collision));
        }
    }
}

// ── Countdown ticks ───────────────────────────────────────────────────────────

/// Count down the post-win delay; on expiry, request the next level.
pub fn pending_transition_system(
    time: Res<Time>,
    current: Res<CurrentLevel>,
    mut pending: ResMut<PendingTransition>,
    mut begin: MessageWriter<BeginLevel>,
) {
    if let Some(remaining) = pending.0.as_mut() {
        *remaining -= time.delta_secs();
        if *remaining <= 0.0 {
            pending.0 = None;
            begin.write(BeginLevel {
                index: current.config.index + 1,
            });
        }
    }
}

/// Count down the post-launch delay; on expiry, surface the give-up
/// affordance.
pub fn give_up_timer_system(
    time: Res<Time>,
    mut timer: ResMut<GiveUpTimer>,
    mut offered: ResMut<GiveUpOffered>,
) {
    if let Some(remaining) = timer.0.as_mut() {
        *remaining -= time.delta_secs();
        if *remaining <= 0.0 {
            timer.0 = None;
            offered.0 = true;
        }
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Wires the per-frame gameplay pipeline and the level lifecycle.
///
/// The push pipeline is chained so outputs are cleared before intents are
/// read, and intents are read before they are applied.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BeginLevel>()
            .init_resource::<CurrentLevel>()
            .init_resource::<FuelState>()
            .init_resource::<InputChannels>()
            .init_resource::<PushIntent>()
            .init_resource::<PressState>()
            .init_resource::<LaunchState>()
            .init_resource::<PendingTransition>()
            .init_resource::<GiveUpTimer>()
            .init_resource::<GiveUpOffered>()
            .add_systems(
                Update,
                (
                    clear_push_outputs_system,
                    pointer_to_intent_system,
                    apply_push_intent_system,
                    planet_gravity_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    collision_outcome_system,
                    pending_transition_system,
                    give_up_timer_system,
                )
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, enter_level_system);
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(index: u32) -> LevelConfig {
        let arena = Arena::new(375.0, 668.0);
        let config = GameConfig::default();
        level_config(index, &arena, &config, &mut StdRng::seed_from_u64(5))
    }

    #[test]
    fn level_one_is_a_wide_goal_free_launch() {
        let level = table(1);
        assert_eq!(level.goal_width, 130.0);
        assert!(!level.fuel_enabled);
        assert_eq!(level.planets.len(), 1);
        assert_eq!(level.planets[0].center, Vec2::new(187.5, 334.0));
        assert_eq!(level.planets[0].radius, 70.0);
        assert!(level.tutorial.is_some());
    }

    #[test]
    fn level_two_narrows_the_goal_and_turns_fuel_on() {
        let level = table(2);
        assert_eq!(level.goal_width, 70.0);
        assert!(level.fuel_enabled);
        assert_eq!(level.planets, table(1).planets);
    }

    #[test]
    fn level_three_uses_the_flanking_preset() {
        let level = table(3);
        assert_eq!(level.planets.len(), 2);
        assert_eq!(level.planets[0].center, Vec2::new(40.0, 500.0));
        assert_eq!(level.planets[1].center, Vec2::new(335.0, 250.0));
        assert!(level.planets.iter().all(|p| p.radius == 30.0));
    }

    #[test]
    fn authored_levels_carry_tutorial_text_generated_ones_do_not() {
        for index in 1..=3 {
            assert!(
                table(index).tutorial.is_some(),
                "level {index} must have an instruction line"
            );
        }
        assert!(table(4).tutorial.is_none());
    }

    #[test]
    fn levels_past_the_table_are_generated() {
        let level = table(4);
        assert_eq!(level.index, 4);
        assert!(level.fuel_enabled);
        assert!(!level.planets.is_empty());
        // Generated planets carry the generated density, not the preset one.
        let config = GameConfig::default();
        assert!(level
            .planets
            .iter()
            .all(|p| p.density == config.generated_planet_density));
    }

    // ── Headless session tests ────────────────────────────────────────────────

    fn session_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        app.init_state::<GameState>();
        app.add_message::<BeginLevel>();
        app.add_message::<CollisionEvent>();
        app.add_message::<PlaySound>();

        let arena = Arena::new(375.0, 668.0);
        let config = GameConfig::default();
        let cfg = level_config(1, &arena, &config, &mut StdRng::seed_from_u64(0));
        let fuel_max = config.fuel_max;
        app.insert_resource(arena);
        app.insert_resource(config);
        app.insert_resource(CurrentLevel { config: cfg });
        app.insert_resource(FuelState::full(fuel_max));
        app.insert_resource(InputChannels::for_level(1));
        app.init_resource::<LaunchState>();
        app.init_resource::<PendingTransition>();
        app.init_resource::<GiveUpTimer>();
        app.init_resource::<GiveUpOffered>();
        app
    }

    fn spawn_bare_ship(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                Spaceship,
                Transform::default(),
                Velocity::zero(),
                ExternalForce::default(),
                ExternalImpulse::default(),
            ))
            .id()
    }

    #[test]
    fn ship_goal_contact_starts_a_transition_and_freezes_forces() {
        let mut app = session_app();
        app.add_systems(Update, collision_outcome_system);
        let ship = spawn_bare_ship(&mut app);
        let goal = app.world_mut().spawn(GoalStrip { width: 130.0 }).id();

        app.world_mut().insert_resource(GiveUpTimer(Some(2.0)));
        app.world_mut().write_message(CollisionEvent::Started(
            ship,
            goal,
            bevy_rapier2d::rapier::geometry::CollisionEventFlags::empty(),
        ));
        app.update();

        assert_eq!(app.world().resource::<PendingTransition>().0, Some(3.0));
        assert!(app.world().resource::<LaunchState>().frozen);
        assert_eq!(app.world().resource::<GiveUpTimer>().0, None);
    }

    #[test]
    fn repeated_goal_contacts_do_not_restart_the_countdown() {
        let mut app = session_app();
        app.add_systems(Update, collision_outcome_system);
        let ship = spawn_bare_ship(&mut app);
        let goal = app.world_mut().spawn(GoalStrip { width: 130.0 }).id();

        app.world_mut().insert_resource(PendingTransition(Some(1.25)));
        app.world_mut().write_message(CollisionEvent::Started(
            ship,
            goal,
            bevy_rapier2d::rapier::geometry::CollisionEventFlags::empty(),
        ));
        app.update();

        // The countdown already running is left untouched.
        assert_eq!(app.world().resource::<PendingTransition>().0, Some(1.25));
    }

    #[test]
    fn ship_planet_contact_is_a_bounce_not_a_win() {
        let mut app = session_app();
        app.add_systems(Update, collision_outcome_system);
        let ship = spawn_bare_ship(&mut app);
        let planet = app
            .world_mut()
            .spawn(Planet {
                radius: 70.0,
                density: 1.0,
            })
            .id();

        app.world_mut().write_message(CollisionEvent::Started(
            planet,
            ship,
            bevy_rapier2d::rapier::geometry::CollisionEventFlags::empty(),
        ));
        app.update();

        assert_eq!(app.world().resource::<PendingTransition>().0, None);
        assert!(!app.world().resource::<LaunchState>().frozen);
    }

    #[test]
    fn expired_transition_requests_the_next_level() {
        let mut app = session_app();
        app.add_systems(Update, pending_transition_system);
        app.insert_resource(PendingTransition(Some(0.0)));

        app.update();

        assert_eq!(app.world().resource::<PendingTransition>().0, None);
        let messages = app.world().resource::<Messages<BeginLevel>>();
        let mut cursor = messages.get_cursor();
        let requested: Vec<u32> = cursor.read(messages).map(|m| m.index).collect();
        assert_eq!(requested, vec![2]);
    }

    #[test]
    fn give_up_timer_expiry_surfaces_the_affordance() {
        let mut app = session_app();
        app.add_systems(Update, give_up_timer_system);
        app.insert_resource(GiveUpTimer(Some(0.0)));

        app.update();

        assert_eq!(app.world().resource::<GiveUpTimer>().0, None);
        assert!(app.world().resource::<GiveUpOffered>().0);
    }

    #[test]
    fn entering_a_level_rebuilds_planets_goal_and_resources() {
        let mut app = session_app();
        app.add_systems(Update, enter_level_system);
        spawn_bare_ship(&mut app);

        // Dirty the per-level state as if mid-flight on level 1.
        app.insert_resource(FuelState {
            remaining: 30.0,
            max: 200.0,
        });
        app.insert_resource(LaunchState {
            launched: true,
            frozen: true,
        });
        app.insert_resource(GiveUpOffered(true));

        app.world_mut().write_message(BeginLevel { index: 2 });
        app.update();

        let fuel = app.world().resource::<FuelState>();
        assert_eq!(fuel.remaining, 200.0);
        let launch = app.world().resource::<LaunchState>();
        assert!(!launch.launched);
        assert!(!launch.frozen);
        assert!(!app.world().resource::<GiveUpOffered>().0);
        let channels = app.world().resource::<InputChannels>();
        assert!(channels.tap_enabled);
        assert!(channels.hold_enabled, "level 2 enables holds");
        assert_eq!(app.world().resource::<CurrentLevel>().config.index, 2);

        let mut goals = app.world_mut().query::<&GoalStrip>();
        let widths: Vec<f32> = goals.iter(app.world()).map(|g| g.width).collect();
        assert_eq!(widths, vec![70.0]);
        let mut planets = app.world_mut().query::<&Planet>();
        assert_eq!(planets.iter(app.world()).count(), 1);
    }

    #[test]
    fn reentering_replaces_the_previous_layout() {
        let mut app = session_app();
        app.add_systems(Update, enter_level_system);
        spawn_bare_ship(&mut app);

        app.world_mut().write_message(BeginLevel { index: 3 });
        app.update();
        app.world_mut().write_message(BeginLevel { index: 3 });
        app.update();

        // Exactly one goal and one level-3 planet pair survive.
        let mut goals = app.world_mut().query::<&GoalStrip>();
        assert_eq!(goals.iter(app.world()).count(), 1);
        let mut planets = app.world_mut().query::<&Planet>();
        assert_eq!(planets.iter(app.world()).count(), 2);
    }
}
