use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use std::path::Path;

use vimaze::config::{log_config_source, MazeConfig, CONFIG_FILE};
use vimaze::maze::ActiveMaze;
use vimaze::shared::*;
use vimaze::{cursor, input, maze, render, score, status, ui};

fn main() {
    let (config, source) = MazeConfig::load_or_default(Path::new(CONFIG_FILE));

    if std::env::args().any(|arg| arg == "--export-maze") {
        export_maze(&config);
        return;
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vimaze".into(),
                resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
        .insert_resource(config)
        .insert_resource(source)
        .add_systems(Startup, log_config_source)
        // Engine plugins
        .add_plugins(status::StatusPlugin)
        .add_plugins(maze::MazePlugin)
        .add_plugins(cursor::CursorPlugin)
        .add_plugins(score::ScorePlugin)
        // Presentation
        .add_plugins(input::InputPlugin)
        .add_plugins(render::RenderPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}

/// `--export-maze`: print one generated maze as JSON and exit.
fn export_maze(config: &MazeConfig) {
    let maze = ActiveMaze::generate(config);
    match maze.data().to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
