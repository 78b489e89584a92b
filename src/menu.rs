//! Give-up confirmation overlay — `GameState` definition and
//! `GiveUpPromptPlugin`.
//!
//! ## States
//!
//! | State          | Description                                        |
//! |----------------|----------------------------------------------------|
//! | `Playing`      | Default; the session is live                       |
//! | `GiveUpPrompt` | Full-screen overlay; gameplay frozen underneath    |
//!
//! ## Systems (registered by `GiveUpPromptPlugin`)
//!
//! | System                    | Schedule                      | Purpose                    |
//! |---------------------------|-------------------------------|----------------------------|
//! | `setup_give_up_prompt`    | `OnEnter(GiveUpPrompt)`       | Spawn the overlay UI       |
//! | `cleanup_give_up_prompt`  | `OnExit(GiveUpPrompt)`        | Despawn overlay entities   |
//! | `prompt_button_system`    | `Update / in GiveUpPrompt`    | Handle the retry click     |

use crate::level::{BeginLevel, CurrentLevel};
use bevy::prelude::*;

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level session state machine.
///
/// Gameplay systems run under `.run_if(in_state(GameState::Playing))`; giving
/// up pauses them all until the player confirms a retry.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Active flight; the default on startup.
    #[default]
    Playing,
    /// The give-up confirmation overlay is on screen.
    GiveUpPrompt,
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the overlay; the whole tree is despawned on
/// `OnExit(GiveUpPrompt)`.
#[derive(Component)]
pub struct GiveUpPromptRoot;

/// Tags the "Try again" button.
#[derive(Component)]
pub struct RetryButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GameState`, the overlay setup/teardown, and the retry handler.
///
/// Must be added before any plugin that calls
/// `.run_if(in_state(GameState::Playing))`, so the state is registered first.
pub struct GiveUpPromptPlugin;

impl Plugin for GiveUpPromptPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::GiveUpPrompt), setup_give_up_prompt)
            .add_systems(OnExit(GameState::GiveUpPrompt), cleanup_give_up_prompt)
            .add_systems(
                Update,
                prompt_button_system.run_if(in_state(GameState::GiveUpPrompt)),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn overlay_bg() -> Color {
    Color::srgba(0.0, 0.0, 0.05, 0.85)
}
fn headline_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn retry_bg() -> Color {
    Color::srgb(0.08, 0.36, 0.14)
}
fn retry_border() -> Color {
    Color::srgb(0.18, 0.72, 0.28)
}
fn retry_text() -> Color {
    Color::srgb(0.75, 1.0, 0.80)
}

// ── OnEnter(GiveUpPrompt): spawn UI ───────────────────────────────────────────

/// Spawn the full-screen give-up overlay.
///
/// Layout:
/// ```text
/// ┌───────────────────────────┐
/// │        So close!          │
/// │                           │
/// │      [ TRY AGAIN ]        │
/// └───────────────────────────┘
/// ```
pub fn setup_give_up_prompt(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(overlay_bg()),
            GiveUpPromptRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("So close!"),
                TextFont {
                    font_size: 42.0,
                    ..default()
                },
                TextColor(headline_color()),
            ));

            spacer(root, 36.0);

            root.spawn((
                Button,
                Node {
                    width: Val::Px(200.0),
                    height: Val::Px(50.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(retry_bg()),
                BorderColor::all(retry_border()),
                RetryButton,
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new("TRY AGAIN"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(retry_text()),
                ));
            });
        });
}

/// Spawn a fixed-height invisible spacer node.
fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

// ── OnExit(GiveUpPrompt): despawn UI ──────────────────────────────────────────

/// Recursively despawn the overlay.
pub fn cleanup_give_up_prompt(mut commands: Commands, query: Query<Entity, With<GiveUpPromptRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update (GiveUpPrompt only): button interaction ────────────────────────────

/// Handle the "Try again" press: request a fresh entry of the current level
/// and return to [`GameState::Playing`].
#[allow(clippy::type_complexity)]
pub fn prompt_button_system(
    retry_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<RetryButton>)>,
    mut btn_text: Query<&mut TextColor>,
    current: Res<CurrentLevel>,
    mut begin: MessageWriter<BeginLevel>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for (interaction, children) in retry_query.iter() {
        match interaction {
            Interaction::Pressed => {
                begin.write(BeginLevel {
                    index: current.config.index,
                });
                next_state.set(GameState::Playing);
            }
            Interaction::Hovered => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(Color::WHITE);
                    }
                }
            }
            Interaction::None => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(retry_text());
                    }
                }
            }
        }
    }
}
