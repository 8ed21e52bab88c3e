//! Render domain plugin (windowed binary only).
//!
//! Paints one sprite per grid cell on every `MazeGeneratedEvent`, keeps a
//! marker on the hero, drops fading trail marks on each step, and flashes
//! the hero red on an invalid move.

use bevy::prelude::*;

use crate::config::MazeConfig;
use crate::cursor::Cursor;
use crate::maze::ActiveMaze;
use crate::shared::*;

const WALL_COLOR: Color = Color::srgb(0.16, 0.17, 0.22);
const FLOOR_COLOR: Color = Color::srgb(0.86, 0.84, 0.78);
const ENTRANCE_COLOR: Color = Color::srgb(0.35, 0.62, 0.86);
const EXIT_COLOR: Color = Color::srgb(0.42, 0.78, 0.45);
const KEY_COLOR: Color = Color::srgb(0.95, 0.78, 0.2);
const HERO_COLOR: Color = Color::srgb(0.85, 0.3, 0.55);
const INVALID_COLOR: Color = Color::srgb(0.9, 0.15, 0.15);
const TRAIL_COLOR: Color = Color::srgba(0.85, 0.3, 0.55, 0.45);

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InvalidFlash>();
        app.add_systems(Startup, spawn_camera);
        app.add_systems(
            Update,
            (
                repaint_maze,
                clear_picked_key,
                spawn_trail_marks,
                fade_trail_marks,
                start_invalid_flash,
                sync_hero_marker,
            )
                .chain(),
        );
    }
}

/// One grid cell's sprite.
#[derive(Component, Debug)]
pub struct MazeTile {
    pub at: Coord,
}

#[derive(Component, Debug)]
pub struct HeroMarker;

#[derive(Component, Debug)]
pub struct TrailMark {
    pub timer: Timer,
}

/// Counts down while the hero is tinted after an invalid move.
#[derive(Resource, Debug, Default)]
pub struct InvalidFlash {
    pub timer: Option<Timer>,
}

/// World-space centre of `at`, with the grid centred on the origin and row 0
/// at the top.
pub fn cell_to_world(at: Coord, maze: &MazeData) -> Vec2 {
    let half_w = (maze.cols as f32 - 1.0) / 2.0;
    let half_h = (maze.rows as f32 - 1.0) / 2.0;
    Vec2::new(
        (at.col as f32 - half_w) * CELL_SIZE,
        (half_h - at.row as f32) * CELL_SIZE,
    )
}

fn cell_color(tags: MazeCell) -> Color {
    if tags.is_wall() {
        WALL_COLOR
    } else if tags.contains(CellTag::Key) {
        KEY_COLOR
    } else if tags.contains(CellTag::Exit) {
        EXIT_COLOR
    } else if tags.contains(CellTag::Entrance) {
        ENTRANCE_COLOR
    } else {
        FLOOR_COLOR
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// System: rebuild every tile sprite when a new maze becomes active.
fn repaint_maze(
    mut commands: Commands,
    mut generated: EventReader<MazeGeneratedEvent>,
    maze: Res<ActiveMaze>,
    tiles: Query<Entity, Or<(With<MazeTile>, With<TrailMark>)>>,
) {
    if generated.read().last().is_none() {
        return;
    }

    for entity in tiles.iter() {
        commands.entity(entity).despawn();
    }

    let data = maze.data();
    for (at, tags) in data.cells() {
        let pos = cell_to_world(at, data);
        commands.spawn((
            Sprite {
                color: cell_color(tags),
                custom_size: Some(Vec2::splat(CELL_SIZE)),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 0.0),
            MazeTile { at },
        ));
    }
}

/// System: the key tile reverts to floor once picked up.
fn clear_picked_key(
    mut picked: EventReader<KeyPickedUpEvent>,
    maze: Res<ActiveMaze>,
    mut tiles: Query<(&MazeTile, &mut Sprite)>,
) {
    for event in picked.read() {
        let Some(tags) = maze.data().cell(event.at) else {
            continue;
        };
        for (tile, mut sprite) in tiles.iter_mut() {
            if tile.at == event.at {
                sprite.color = cell_color(tags);
            }
        }
    }
}

fn spawn_trail_marks(
    mut commands: Commands,
    mut steps: EventReader<HeroSteppedEvent>,
    maze: Res<ActiveMaze>,
    config: Res<MazeConfig>,
) {
    for step in steps.read() {
        let pos = cell_to_world(step.at, maze.data());
        commands.spawn((
            Sprite {
                color: TRAIL_COLOR,
                custom_size: Some(Vec2::splat(CELL_SIZE * 0.5)),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 1.0),
            TrailMark {
                timer: Timer::from_seconds(config.trail_secs, TimerMode::Once),
            },
        ));
    }
}

fn fade_trail_marks(
    mut commands: Commands,
    time: Res<Time>,
    mut marks: Query<(Entity, &mut TrailMark, &mut Sprite)>,
) {
    for (entity, mut mark, mut sprite) in marks.iter_mut() {
        mark.timer.tick(time.delta());
        if mark.timer.finished() {
            commands.entity(entity).despawn();
        } else {
            sprite.color = TRAIL_COLOR.with_alpha(0.45 * mark.timer.fraction_remaining());
        }
    }
}

fn start_invalid_flash(
    mut invalid: EventReader<InvalidMoveEvent>,
    config: Res<MazeConfig>,
    mut flash: ResMut<InvalidFlash>,
) {
    if invalid.read().last().is_some() {
        flash.timer = Some(Timer::from_seconds(config.invalid_flash_secs, TimerMode::Once));
    }
}

/// System: keep exactly one hero marker while the hero is on the board.
fn sync_hero_marker(
    mut commands: Commands,
    time: Res<Time>,
    cursor: Res<Cursor>,
    maze: Res<ActiveMaze>,
    mut flash: ResMut<InvalidFlash>,
    mut markers: Query<(Entity, &mut Transform, &mut Sprite), With<HeroMarker>>,
) {
    let flashing = match flash.timer.as_mut() {
        Some(timer) => {
            timer.tick(time.delta());
            !timer.finished()
        }
        None => false,
    };
    if !flashing {
        flash.timer = None;
    }

    let Some(at) = cursor.hero.position() else {
        for (entity, _, _) in markers.iter() {
            commands.entity(entity).despawn();
        }
        return;
    };

    let pos = cell_to_world(at, maze.data());
    let color = if flashing { INVALID_COLOR } else { HERO_COLOR };
    match markers.get_single_mut() {
        Ok((_, mut transform, mut sprite)) => {
            transform.translation = pos.extend(2.0);
            sprite.color = color;
        }
        Err(_) => {
            commands.spawn((
                Sprite {
                    color,
                    custom_size: Some(Vec2::splat(CELL_SIZE * 0.8)),
                    ..default()
                },
                Transform::from_xyz(pos.x, pos.y, 2.0),
                HeroMarker,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_centred_with_row_zero_on_top() {
        let maze = MazeData::blank(2, 2);
        assert_eq!((maze.cols, maze.rows), (5, 5));
        assert_eq!(cell_to_world(Coord::new(2, 2), &maze), Vec2::ZERO);
        assert_eq!(
            cell_to_world(Coord::new(0, 0), &maze),
            Vec2::new(-2.0 * CELL_SIZE, 2.0 * CELL_SIZE)
        );
    }

    #[test]
    fn key_colour_wins_over_floor() {
        assert_eq!(cell_color(CellTags::of(&[CellTag::Key])), KEY_COLOR);
        assert_eq!(cell_color(CellTags::of(&[CellTag::Wall])), WALL_COLOR);
        assert_eq!(
            cell_color(CellTags::of(&[CellTag::Door, CellTag::Exit])),
            EXIT_COLOR
        );
        assert_eq!(cell_color(CellTags::EMPTY), FLOOR_COLOR);
    }
}
