//! Score domain plugin.
//!
//! Provides:
//! - Key log and keystroke count for the current run
//! - Optimal step count (entrance -> key -> exit) for the active maze
//! - Efficiency and the efficiency-limit game-over rule
//! - Live hero -> key / hero -> exit distances
//! - Play timer and the final maze score on `game-won`

pub mod formula;
mod tracking;

use bevy::prelude::*;

use crate::config::MazeConfig;
use crate::shared::*;

pub use formula::{calculate_maze_score, efficiency};

pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MazeConfig>();
        app.init_resource::<KeyLog>();
        app.init_resource::<ScoreBoard>();
        app.init_resource::<PlayTimer>();
        app.add_event::<KeyPressEvent>()
            .add_event::<HeroSteppedEvent>()
            .add_event::<MazeGeneratedEvent>()
            .add_event::<StatusCommand>();

        for idle in [GameStatus::Waiting, GameStatus::GameOver, GameStatus::GameWon] {
            app.add_systems(
                OnTransition {
                    exited: idle,
                    entered: GameStatus::Started,
                },
                tracking::begin_run,
            );
        }
        app.add_systems(OnEnter(GameStatus::GameWon), tracking::finalize_score);

        app.add_systems(
            Update,
            (
                tracking::refresh_optimal_steps,
                tracking::record_keys,
                tracking::tick_play_timer,
                tracking::refresh_hero_distances,
                tracking::enforce_efficiency_limit,
            )
                .chain(),
        );
    }
}

/// Every engine key accepted during the current run.
#[derive(Resource, Debug, Clone, Default)]
pub struct KeyLog {
    entries: Vec<KeyLogEntry>,
}

impl KeyLog {
    pub fn push(&mut self, key: impl Into<String>, timestamp: f64) {
        self.entries.push(KeyLogEntry {
            key: key.into(),
            timestamp,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keystrokes so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KeyLogEntry] {
        &self.entries
    }
}

/// Derived numbers for the HUD. Distances are `None` when there is no route
/// (or nothing left to route to, like the key once it is picked up).
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ScoreBoard {
    pub optimal_steps: u32,
    pub entrance_to_key: Option<usize>,
    pub entrance_to_exit: Option<usize>,
    pub hero_to_key: Option<usize>,
    pub hero_to_exit: Option<usize>,
    pub final_score: Option<u32>,
}

impl ScoreBoard {
    pub fn efficiency(&self, keystrokes: usize) -> u32 {
        efficiency(keystrokes, self.optimal_steps)
    }
}

/// Seconds of live play in the current run. Only advances in `started` and
/// `has-key`, so pausing or finishing freezes it.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayTimer {
    pub elapsed_secs: f64,
}

impl PlayTimer {
    pub fn reset(&mut self) {
        self.elapsed_secs = 0.0;
    }

    pub fn advance(&mut self, delta_secs: f64) {
        self.elapsed_secs += delta_secs.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_log_counts_and_clears() {
        let mut log = KeyLog::default();
        assert!(log.is_empty());
        log.push("3", 0.5);
        log.push("j", 0.75);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].key, "j");
        assert_eq!(log.entries()[1].timestamp, 0.75);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn efficiency_follows_the_optimum() {
        let board = ScoreBoard {
            optimal_steps: 40,
            ..default()
        };
        assert_eq!(board.efficiency(60), 150);
        assert_eq!(board.efficiency(61), 153);
        assert_eq!(ScoreBoard::default().efficiency(61), 0);
    }

    #[test]
    fn play_timer_ignores_negative_deltas() {
        let mut timer = PlayTimer::default();
        timer.advance(0.25);
        timer.advance(-1.0);
        assert_eq!(timer.elapsed_secs, 0.25);
        timer.reset();
        assert_eq!(timer.elapsed_secs, 0.0);
    }
}
