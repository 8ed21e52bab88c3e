//! Maze domain plugin.
//!
//! Provides:
//! - Procedural maze generation (recursive partitioning, key placement)
//! - Graph-distance queries between landmarks
//! - The stateless move-legality oracle used by the cursor domain
//! - A fresh maze whenever the game returns to `waiting` or restarts from a
//!   finished run

pub mod generator;
pub mod navigator;

use bevy::prelude::*;

use crate::config::MazeConfig;
use crate::shared::*;

pub use generator::MazeGenerator;
pub use navigator::MazeNavigator;

pub struct MazePlugin;

impl Plugin for MazePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MazeConfig>();
        app.init_resource::<ActiveMaze>();
        app.add_event::<MazeGeneratedEvent>();

        app.add_systems(OnEnter(GameStatus::Waiting), regenerate_maze);
        for finished in [GameStatus::GameOver, GameStatus::GameWon] {
            app.add_systems(
                OnTransition {
                    exited: finished,
                    entered: GameStatus::Started,
                },
                regenerate_maze,
            );
        }
    }
}

/// The maze currently being played. Only the maze domain replaces it; the
/// cursor domain clears the key tag through `MazeData::take_key`.
#[derive(Resource, Debug, Clone)]
pub struct ActiveMaze {
    pub generator: MazeGenerator,
}

impl Default for ActiveMaze {
    /// Doorless placeholder until the first `OnEnter(Waiting)` runs.
    fn default() -> Self {
        Self {
            generator: MazeGenerator::from_data(MazeData::blank(1, 1)),
        }
    }
}

impl ActiveMaze {
    pub fn generate(config: &MazeConfig) -> Self {
        let mut generator = MazeGenerator::new(config.cols, config.rows);
        if generator.place_key().is_none() {
            warn!("[Maze] No reachable cell for the key");
        }
        Self { generator }
    }

    pub fn data(&self) -> &MazeData {
        self.generator.data()
    }

    pub fn data_mut(&mut self) -> &mut MazeData {
        self.generator.data_mut()
    }
}

/// System: build a new maze from the current config and announce it.
pub fn regenerate_maze(
    config: Res<MazeConfig>,
    mut maze: ResMut<ActiveMaze>,
    mut generated: EventWriter<MazeGeneratedEvent>,
) {
    *maze = ActiveMaze::generate(&config);
    let data = maze.data();
    info!(
        "[Maze] Generated {}x{} grid ({} open cells), key score {}",
        data.rows,
        data.cols,
        data.open_cell_count(),
        data.total_steps
    );
    debug!("[Maze] Layout:\n{}", data);
    generated.send(MazeGeneratedEvent);
}
