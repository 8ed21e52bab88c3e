//! Scoring arithmetic, kept free of ECS types.

use crate::shared::round_half_up;

/// Boards larger than this many cells earn a size bonus.
pub const SIZE_BONUS_CELLS: f64 = 500.0;
pub const MAX_SCORE: u32 = 1000;

/// `round(keystrokes / optimal * 100)`, or 0 when the optimum is unknown.
pub fn efficiency(keystrokes: usize, optimal_steps: u32) -> u32 {
    if optimal_steps == 0 {
        return 0;
    }
    round_half_up(keystrokes as f64 / optimal_steps as f64 * 100.0).max(0) as u32
}

/// Final score in `0..=1000`: one point lost per ten seconds and per two
/// keystrokes, scaled up on boards larger than 500 cells.
pub fn calculate_maze_score(elapsed_secs: f64, keystrokes: usize, maze_size: usize) -> u32 {
    let time_penalty = elapsed_secs / 10.0;
    let keystroke_penalty = keystrokes as f64 / 2.0;
    let size_multiplier = (maze_size as f64 / SIZE_BONUS_CELLS).max(1.0);

    let base = 1000.0 - time_penalty - keystroke_penalty;
    round_half_up(base * size_multiplier).clamp(0, MAX_SCORE as i64) as u32
}
