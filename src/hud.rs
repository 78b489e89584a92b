//! In-game HUD and entity visuals.
//!
//! ## Layer model
//!
//! | Layer             | Technology | Visible when                        |
//! |-------------------|------------|-------------------------------------|
//! | Planet fills      | `Mesh2d`   | always                              |
//! | Ship fill         | `Mesh2d`   | always                              |
//! | Goal strip fill   | `Mesh2d`   | always                              |
//! | Level label       | Bevy UI    | always                              |
//! | Fuel bar          | Bevy UI    | fuel-enabled levels                 |
//! | Tutorial line     | Bevy UI    | until the first push                |
//! | Give-up button    | Bevy UI    | after the post-launch delay expires |
//!
//! Physics spawning and rendering are deliberately separate: the level module
//! spawns bare physics entities, and the `Added<T>` systems here attach
//! meshes one frame later.  Headless tests exercise whole levels without ever
//! touching the asset system.

use crate::config::GameConfig;
use crate::level::{CurrentLevel, GiveUpOffered, GoalStrip, PendingTransition};
use crate::menu::GameState;
use crate::planet::Planet;
use crate::ship::{FuelState, LaunchState, Spaceship};
use bevy::prelude::*;

// ── Component markers ─────────────────────────────────────────────────────────

/// Marker for the level label node.
#[derive(Component)]
pub struct LevelLabel;

/// Marker for the fuel bar container (border frame).
#[derive(Component)]
pub struct FuelBarFrame;

/// Marker for the inner fill whose height tracks the fuel balance.
#[derive(Component)]
pub struct FuelBarFill;

/// Marker for the tutorial text node.
#[derive(Component)]
pub struct TutorialLabel;

/// Tags the give-up button.
#[derive(Component)]
pub struct GiveUpButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the HUD nodes, their refresh systems, and the mesh attachers.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (
                    level_label_system,
                    fuel_bar_system,
                    tutorial_label_system,
                    give_up_visibility_system,
                    give_up_button_system.run_if(in_state(GameState::Playing)),
                ),
            )
            .add_systems(
                Update,
                (
                    attach_planet_visuals,
                    attach_ship_visuals,
                    attach_goal_visuals,
                ),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn planet_color() -> Color {
    Color::srgb(0.72, 0.54, 0.38)
}
fn ship_color() -> Color {
    Color::srgb(0.85, 0.90, 1.0)
}
fn goal_color() -> Color {
    Color::srgb(0.18, 0.80, 0.35)
}
fn fuel_color() -> Color {
    Color::srgb(0.95, 0.75, 0.20)
}
fn label_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn tutorial_color() -> Color {
    Color::srgb(0.80, 0.80, 0.88)
}
fn give_up_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
fn give_up_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}
fn give_up_text() -> Color {
    Color::srgb(1.0, 0.65, 0.65)
}

// ── Startup: HUD nodes ────────────────────────────────────────────────────────

/// Spawn every HUD node once.  Per-level refreshes only toggle visibility and
/// rewrite text; nothing here is despawned between levels.
pub fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    // Level label, top-left.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            LevelLabel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Level 1"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(label_color()),
            ));
        });

    // Fuel bar, bottom-left: a thin bordered frame with a fill that is one
    // pixel tall per unit of fuel remaining.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(8.0),
                bottom: Val::Px(8.0),
                width: Val::Px(12.0),
                height: Val::Px(config.fuel_max + 4.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::FlexEnd,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BorderColor::all(Color::srgb(0.4, 0.4, 0.5)),
            FuelBarFrame,
            Visibility::Hidden,
        ))
        .with_children(|frame| {
            frame.spawn((
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Px(config.fuel_max),
                    ..default()
                },
                BackgroundColor(fuel_color()),
                FuelBarFill,
            ));
        });

    // Tutorial line, centered near the bottom.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                right: Val::Px(0.0),
                bottom: Val::Px(70.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            TutorialLabel,
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(tutorial_color()),
            ));
        });

    // Give-up button, top-right; hidden until the affordance countdown runs
    // out.
    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(10.0),
                top: Val::Px(10.0),
                width: Val::Px(90.0),
                height: Val::Px(32.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(give_up_bg()),
            BorderColor::all(give_up_border()),
            GiveUpButton,
            Visibility::Hidden,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new("GIVE UP"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(give_up_text()),
            ));
        });

    println!("✓ HUD initialized");
}

// ── Update: HUD refresh ───────────────────────────────────────────────────────

/// Rewrite the level label when the level changes.
pub fn level_label_system(
    current: Res<CurrentLevel>,
    parent_query: Query<&Children, With<LevelLabel>>,
    mut text_query: Query<&mut Text>,
) {
    if !current.is_changed() {
        return;
    }
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(format!("Level {}", current.config.index));
            }
        }
    }
}

/// Track the fuel balance: the fill shrinks one pixel per unit spent, and the
/// whole bar hides on levels where fuel is off.
pub fn fuel_bar_system(
    fuel: Res<FuelState>,
    current: Res<CurrentLevel>,
    mut frame_query: Query<&mut Visibility, With<FuelBarFrame>>,
    mut fill_query: Query<&mut Node, With<FuelBarFill>>,
) {
    if current.is_changed() {
        let vis = if current.config.fuel_enabled {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        for mut v in frame_query.iter_mut() {
            *v = vis;
        }
    }
    if fuel.is_changed() {
        for mut node in fill_query.iter_mut() {
            node.height = Val::Px(fuel.remaining.max(0.0));
        }
    }
}

/// Drive the message line: the level's tutorial text until the first push,
/// nothing in flight, and the success line while the win countdown runs.
///
/// The success branch is last so a win that freezes the launch state in the
/// same frame still shows the line.
pub fn tutorial_label_system(
    current: Res<CurrentLevel>,
    launch: Res<LaunchState>,
    pending: Res<PendingTransition>,
    mut parent_query: Query<(&mut Visibility, &Children), With<TutorialLabel>>,
    mut text_query: Query<&mut Text>,
) {
    if current.is_changed() {
        for (mut vis, children) in parent_query.iter_mut() {
            match current.config.tutorial {
                Some(line) => {
                    *vis = Visibility::Visible;
                    for child in children.iter() {
                        if let Ok(mut text) = text_query.get_mut(child) {
                            *text = Text::new(line);
                        }
                    }
                }
                None => *vis = Visibility::Hidden,
            }
        }
    }
    if launch.is_changed() && launch.launched {
        for (mut vis, _) in parent_query.iter_mut() {
            *vis = Visibility::Hidden;
        }
    }
    if pending.is_changed() && pending.0.is_some() {
        for (mut vis, children) in parent_query.iter_mut() {
            *vis = Visibility::Visible;
            for child in children.iter() {
                if let Ok(mut text) = text_query.get_mut(child) {
                    *text = Text::new("Great! You've reached your goal!");
                }
            }
        }
    }
}

/// Sync the give-up button with [`GiveUpOffered`].
///
/// Only re-runs when the resource is mutated.
pub fn give_up_visibility_system(
    offered: Res<GiveUpOffered>,
    mut query: Query<&mut Visibility, With<GiveUpButton>>,
) {
    if !offered.is_changed() {
        return;
    }
    let vis = if offered.0 {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut v in query.iter_mut() {
        *v = vis;
    }
}

/// Handle the give-up press: freeze forces, cancel any pending win
/// transition, and open the confirmation overlay.
///
/// Cancelling [`PendingTransition`] first means a give-up click that races a
/// goal touch wins — the prompt appears and no level advance fires.
pub fn give_up_button_system(
    query: Query<&Interaction, (Changed<Interaction>, With<GiveUpButton>)>,
    mut launch: ResMut<LaunchState>,
    mut pending: ResMut<PendingTransition>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for interaction in query.iter() {
        if *interaction == Interaction::Pressed {
            launch.frozen = true;
            pending.0 = None;
            next_state.set(GameState::GiveUpPrompt);
        }
    }
}

// ── Update: mesh attachment ───────────────────────────────────────────────────

/// Attach a filled circle to every newly spawned planet.
pub fn attach_planet_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<(Entity, &Planet), Added<Planet>>,
) {
    for (entity, planet) in query.iter() {
        commands.entity(entity).insert((
            Mesh2d(meshes.add(Circle::new(planet.radius))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(planet_color()))),
        ));
    }
}

/// Attach a filled circle to the ship when it spawns.
pub fn attach_ship_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<GameConfig>,
    query: Query<Entity, Added<Spaceship>>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert((
            Mesh2d(meshes.add(Circle::new(config.ship_radius))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(ship_color()))),
        ));
    }
}

/// Attach a filled rectangle to every newly spawned goal strip.
pub fn attach_goal_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<GameConfig>,
    query: Query<(Entity, &GoalStrip), Added<GoalStrip>>,
) {
    for (entity, goal) in query.iter() {
        commands.entity(entity).insert((
            Mesh2d(meshes.add(Rectangle::new(goal.width, config.goal_height))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(goal_color()))),
        ));
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn hud_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.init_resource::<CurrentLevel>();
        app.init_resource::<LaunchState>();
        app.init_resource::<PendingTransition>();
        app.add_systems(Startup, setup_hud);
        app.add_systems(Update, tutorial_label_system);
        app
    }

    fn tutorial_line(app: &mut App) -> (Visibility, String) {
        let mut parents = app
            .world_mut()
            .query_filtered::<(&Visibility, &Children), With<TutorialLabel>>();
        let (vis, children) = parents.single(app.world()).unwrap();
        let (vis, child) = (*vis, children.iter().next().unwrap());
        let text = app.world().get::<Text>(child).unwrap().0.clone();
        (vis, text)
    }

    #[test]
    fn tutorial_shows_on_level_entry() {
        let mut app = hud_app();
        app.update();
        let (vis, text) = tutorial_line(&mut app);
        assert_eq!(vis, Visibility::Visible);
        assert!(text.contains("Tap"), "unexpected tutorial line {text:?}");
    }

    #[test]
    fn first_launch_hides_the_tutorial_line() {
        let mut app = hud_app();
        app.update();
        app.insert_resource(LaunchState {
            launched: true,
            frozen: false,
        });
        app.update();
        let (vis, _) = tutorial_line(&mut app);
        assert_eq!(vis, Visibility::Hidden);
    }

    #[test]
    fn win_countdown_shows_the_success_line() {
        let mut app = hud_app();
        app.update();
        // A win freezes the launch state and arms the countdown in the same
        // frame; the success line must still appear.
        app.insert_resource(LaunchState {
            launched: true,
            frozen: true,
        });
        app.insert_resource(PendingTransition(Some(3.0)));
        app.update();
        let (vis, text) = tutorial_line(&mut app);
        assert_eq!(vis, Visibility::Visible);
        assert_eq!(text, "Great! You've reached your goal!");
    }
}
