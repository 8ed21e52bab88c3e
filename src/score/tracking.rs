//! Passive listeners that keep the score resources current, plus the one
//! game rule the score layer enforces.

use bevy::prelude::*;

use super::{calculate_maze_score, KeyLog, PlayTimer, ScoreBoard};
use crate::config::MazeConfig;
use crate::cursor::is_motion_key;
use crate::maze::ActiveMaze;
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// System: begin_run
// ─────────────────────────────────────────────────────────────────────────────

/// Fresh run: clears the key log, the timer and the last final score.
pub fn begin_run(mut log: ResMut<KeyLog>, mut timer: ResMut<PlayTimer>, mut board: ResMut<ScoreBoard>) {
    log.clear();
    timer.reset();
    board.final_score = None;
    board.hero_to_key = board.entrance_to_key;
    board.hero_to_exit = board.entrance_to_exit;
    info!("[Score] New run, optimal steps {}", board.optimal_steps);
}

// ─────────────────────────────────────────────────────────────────────────────
// System: refresh_optimal_steps
// ─────────────────────────────────────────────────────────────────────────────

/// On `MazeGeneratedEvent`: entrance distances and the optimal step count
/// `dist(entrance, key) + dist(key, exit)`.
pub fn refresh_optimal_steps(
    mut generated: EventReader<MazeGeneratedEvent>,
    maze: Res<ActiveMaze>,
    mut board: ResMut<ScoreBoard>,
) {
    if generated.read().last().is_none() {
        return;
    }

    let generator = &maze.generator;
    board.entrance_to_key = generator.get_distance(PositionTag::Entrance, PositionTag::Key, None);
    board.entrance_to_exit = generator.get_distance(PositionTag::Entrance, PositionTag::Exit, None);
    board.hero_to_key = board.entrance_to_key;
    board.hero_to_exit = board.entrance_to_exit;

    let key_to_exit = generator.get_distance(PositionTag::Key, PositionTag::Exit, None);
    board.optimal_steps = match (board.entrance_to_key, key_to_exit) {
        (Some(to_key), Some(to_exit)) => (to_key + to_exit) as u32,
        _ => {
            warn!("[Score] Key or exit unreachable; efficiency disabled for this maze");
            0
        }
    };
    debug!("[Score] Optimal steps {}", board.optimal_steps);
}

// ─────────────────────────────────────────────────────────────────────────────
// System: record_keys
// ─────────────────────────────────────────────────────────────────────────────

/// Appends every motion key pressed while a run is live (paused included).
pub fn record_keys(
    mut keys: EventReader<KeyPressEvent>,
    state: Res<State<GameStatus>>,
    time: Res<Time>,
    mut log: ResMut<KeyLog>,
) {
    let status = *state.get();
    for press in keys.read() {
        if status.accepts_keys() && is_motion_key(&press.key) {
            log.push(press.key.clone(), time.elapsed_secs_f64());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System: tick_play_timer
// ─────────────────────────────────────────────────────────────────────────────

pub fn tick_play_timer(time: Res<Time>, state: Res<State<GameStatus>>, mut timer: ResMut<PlayTimer>) {
    if state.get().is_live() {
        timer.advance(time.delta_secs_f64());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System: refresh_hero_distances
// ─────────────────────────────────────────────────────────────────────────────

/// Recomputes hero -> key and hero -> exit from the last cell entered.
pub fn refresh_hero_distances(
    mut steps: EventReader<HeroSteppedEvent>,
    maze: Res<ActiveMaze>,
    mut board: ResMut<ScoreBoard>,
) {
    let Some(last) = steps.read().last() else {
        return;
    };
    let generator = &maze.generator;
    board.hero_to_key = generator.get_distance(PositionTag::Hero, PositionTag::Key, Some(last.at));
    board.hero_to_exit = generator.get_distance(PositionTag::Hero, PositionTag::Exit, Some(last.at));
}

// ─────────────────────────────────────────────────────────────────────────────
// System: enforce_efficiency_limit
// ─────────────────────────────────────────────────────────────────────────────

/// Before the key is found, burning more than `efficiency_limit` percent of
/// the optimal keystrokes ends the run.
pub fn enforce_efficiency_limit(
    state: Res<State<GameStatus>>,
    log: Res<KeyLog>,
    board: Res<ScoreBoard>,
    config: Res<MazeConfig>,
    mut commands: EventWriter<StatusCommand>,
) {
    if *state.get() != GameStatus::Started {
        return;
    }
    let efficiency = board.efficiency(log.len());
    if efficiency > config.efficiency_limit {
        info!(
            "[Score] Efficiency {}% over the {}% limit; game over",
            efficiency, config.efficiency_limit
        );
        commands.send(StatusCommand::Set(GameStatus::GameOver));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System: finalize_score
// ─────────────────────────────────────────────────────────────────────────────

pub fn finalize_score(
    timer: Res<PlayTimer>,
    log: Res<KeyLog>,
    maze: Res<ActiveMaze>,
    mut board: ResMut<ScoreBoard>,
) {
    let data = maze.data();
    let score = calculate_maze_score(timer.elapsed_secs, log.len(), data.rows * data.cols);
    board.final_score = Some(score);
    info!(
        "[Score] Maze cleared in {:.1}s with {} keystrokes: {} points",
        timer.elapsed_secs,
        log.len(),
        score
    );
}
