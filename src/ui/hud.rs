use bevy::prelude::*;

use crate::cursor::Cursor;
use crate::score::{KeyLog, PlayTimer, ScoreBoard};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

/// Status, timer, keystrokes and efficiency (top-left).
#[derive(Component)]
pub struct HudStatsText;

/// Half-typed count or `g` prefix (bottom-left, like a Vim command line).
#[derive(Component)]
pub struct HudPendingText;

/// Centre banner for the idle phases.
#[derive(Component)]
pub struct HudBanner;

// ═══════════════════════════════════════════════════════════════════════
// TEXT BUILDERS
// ═══════════════════════════════════════════════════════════════════════

fn distance_label(distance: Option<usize>) -> String {
    match distance {
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

pub fn stats_line(status: GameStatus, timer: &PlayTimer, keystrokes: usize, board: &ScoreBoard) -> String {
    format!(
        "{}  {:.1}s  keys {}  efficiency {}%  to key {}  to exit {}",
        status.as_str(),
        timer.elapsed_secs,
        keystrokes,
        board.efficiency(keystrokes),
        distance_label(board.hero_to_key),
        distance_label(board.hero_to_exit),
    )
}

pub fn banner_text(status: GameStatus, final_score: Option<u32>) -> String {
    match status {
        GameStatus::Waiting => "Press Enter or Space to start".to_string(),
        GameStatus::Paused => "Paused (p to resume)".to_string(),
        GameStatus::GameOver => "Too many keystrokes. Enter for a new maze".to_string(),
        GameStatus::GameWon => match final_score {
            Some(score) => format!("Escaped! Score {}. Enter for a new maze", score),
            None => "Escaped! Enter for a new maze".to_string(),
        },
        GameStatus::Started | GameStatus::HasKey => String::new(),
    }
}

pub fn pending_text(cursor: &Cursor) -> String {
    let mut text = cursor.motions.pending_count().to_string();
    if cursor.motions.is_pending_g() {
        text.push('g');
    }
    text
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(8.0),
                    left: Val::Px(10.0),
                    ..default()
                },
                HudStatsText,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.85, 0.6)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(8.0),
                    left: Val::Px(10.0),
                    ..default()
                },
                HudPendingText,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Percent(45.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                TextLayout::new_with_justify(JustifyText::Center),
                HudBanner,
            ));
        });
}

pub fn update_stats_text(
    state: Res<State<GameStatus>>,
    timer: Res<PlayTimer>,
    log: Res<KeyLog>,
    board: Res<ScoreBoard>,
    mut texts: Query<&mut Text, With<HudStatsText>>,
) {
    for mut text in texts.iter_mut() {
        **text = stats_line(*state.get(), &timer, log.len(), &board);
    }
}

pub fn update_pending_text(cursor: Res<Cursor>, mut texts: Query<&mut Text, With<HudPendingText>>) {
    if !cursor.is_changed() {
        return;
    }
    for mut text in texts.iter_mut() {
        **text = pending_text(&cursor);
    }
}

pub fn update_banner(
    state: Res<State<GameStatus>>,
    board: Res<ScoreBoard>,
    mut texts: Query<&mut Text, With<HudBanner>>,
) {
    if !state.is_changed() && !board.is_changed() {
        return;
    }
    for mut text in texts.iter_mut() {
        **text = banner_text(*state.get(), board.final_score);
    }
}
