//! The hero: authoritative avatar position, all-or-nothing move preflight,
//! and arrival interactions (key pickup, exit).
//!
//! Nothing here touches the ECS. Every operation reports what happened by
//! pushing `HeroSignal`s into a caller-owned buffer; the cursor plugin turns
//! those into events and status commands.

use bevy::prelude::*;

use super::animation::AnimationSystem;
use crate::maze::MazeNavigator;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroSignal {
    InvalidMove,
    /// Entered a cell (every logical step, animated or not).
    Stepped(Coord),
    KeyPickedUp(Coord),
    /// The status the game must transition to.
    Status(GameStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped silently: no live run, no hero, or an animation in flight.
    Ignored,
    /// Failed preflight. An invalid-move signal was raised; nothing changed.
    Rejected,
    Moved(Coord),
    /// Validated and handed to the animation system.
    Animating { target: Coord },
}

#[derive(Debug, Clone, Default)]
pub struct Hero {
    position: Option<Coord>,
    mode: CursorMode,
    animation: AnimationSystem,
}

impl Hero {
    pub fn with_animation(animation: AnimationSystem) -> Self {
        Self {
            animation,
            ..default()
        }
    }

    pub fn position(&self) -> Option<Coord> {
        self.position
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    pub fn animation(&self) -> &AnimationSystem {
        &self.animation
    }

    /// Absent -> active: snaps to the bottom-border entrance door. A hero that
    /// is already on the board stays where it is.
    pub fn spawn_at_entrance(&mut self, maze: &MazeData) -> Option<Coord> {
        if self.position.is_some() {
            return self.position;
        }
        let bottom = maze.rows as i32 - 1;
        self.position = (0..maze.cols as i32)
            .map(|c| Coord::new(bottom, c))
            .find(|at| maze.has_tag(*at, CellTag::Entrance));
        self.position
    }

    /// Active -> absent. Any animation in flight is dropped.
    pub fn reset(&mut self) {
        self.animation.cancel_animation();
        self.position = None;
        self.mode = CursorMode::Normal;
    }

    /// Single-cell legality: inside the grid, not a wall, and not the exit
    /// unless the key is held.
    pub fn can_move_to(&self, maze: &MazeData, to: Coord, status: GameStatus) -> bool {
        match maze.cell(to) {
            Some(tags) => {
                !tags.is_wall() && !(tags.contains(CellTag::Exit) && status != GameStatus::HasKey)
            }
            None => false,
        }
    }

    /// Final cell of a fully legal counted move, or `None` if any step fails.
    fn preflight(
        &self,
        maze: &MazeData,
        from: Coord,
        d_row: i32,
        d_col: i32,
        steps: u32,
        status: GameStatus,
    ) -> Option<Coord> {
        if !MazeNavigator::new(maze).validate_path(from, d_row, d_col, steps) {
            return None;
        }
        let mut cells = from.walk(d_row, d_col, steps);
        if cells.any(|at| !self.can_move_to(maze, at, status)) {
            return None;
        }
        from.walk(d_row, d_col, steps).last()
    }

    /// Commits a directional move of `steps` cells. Multi-step moves are
    /// animated; the arrival interaction runs when the animation completes.
    pub fn move_hero(
        &mut self,
        maze: &mut MazeData,
        d_row: i32,
        d_col: i32,
        steps: u32,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> MoveOutcome {
        let Some(from) = self.position else {
            return MoveOutcome::Ignored;
        };
        if !status.is_live() || self.animation.is_animating() || (d_row == 0 && d_col == 0) {
            return MoveOutcome::Ignored;
        }

        let steps = steps.max(1);
        let Some(target) = self.preflight(maze, from, d_row, d_col, steps, status) else {
            debug!(
                "[Hero] Invalid move ({:+}, {:+}) x{} from {}",
                d_row, d_col, steps, from
            );
            signals.push(HeroSignal::InvalidMove);
            return MoveOutcome::Rejected;
        };

        if steps > 1 {
            self.animation.animate_movement(from, target, steps);
            return MoveOutcome::Animating { target };
        }

        self.position = Some(target);
        signals.push(HeroSignal::Stepped(target));
        self.arrive(maze, status, signals);
        MoveOutcome::Moved(target)
    }

    /// Moves in a straight line to `target`. Targets off the hero's row and
    /// column, or the hero's own cell, are invalid.
    pub fn move_to(
        &mut self,
        maze: &mut MazeData,
        target: Coord,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> MoveOutcome {
        let Some(from) = self.position else {
            return MoveOutcome::Ignored;
        };
        if !status.is_live() || self.animation.is_animating() {
            return MoveOutcome::Ignored;
        }

        let (d_row, d_col, steps) = if target.row == from.row && target.col != from.col {
            (0, (target.col - from.col).signum(), target.col.abs_diff(from.col))
        } else if target.col == from.col && target.row != from.row {
            ((target.row - from.row).signum(), 0, target.row.abs_diff(from.row))
        } else {
            signals.push(HeroSignal::InvalidMove);
            return MoveOutcome::Rejected;
        };
        self.move_hero(maze, d_row, d_col, steps, status, signals)
    }

    /// Jumps to the row/column extreme for `anchor`, if the navigator finds one.
    pub fn move_to_anchor(
        &mut self,
        maze: &mut MazeData,
        anchor: Anchor,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> MoveOutcome {
        let Some(from) = self.position else {
            return MoveOutcome::Ignored;
        };
        if !status.is_live() || self.animation.is_animating() {
            return MoveOutcome::Ignored;
        }

        let target = MazeNavigator::new(maze).find_anchor_target(from, anchor);
        match target {
            Some(target) => self.move_to(maze, target, status, signals),
            None => {
                debug!("[Hero] No {:?} anchor from {}", anchor, from);
                signals.push(HeroSignal::InvalidMove);
                MoveOutcome::Rejected
            }
        }
    }

    /// Advances an in-flight animation by one frame. Returns the new drawn
    /// position, or `None` if nothing is animating.
    pub fn tick(
        &mut self,
        maze: &mut MazeData,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> Option<Coord> {
        let frame = self.animation.tick()?;
        signals.extend(frame.traversed.iter().copied().map(HeroSignal::Stepped));
        self.position = Some(frame.position);
        if frame.finished {
            self.arrive(maze, status, signals);
        }
        Some(frame.position)
    }

    /// Interrupt: stops where the last frame left the hero and releases the
    /// single-flight lock.
    pub fn cancel_animation(&mut self) -> bool {
        let cancelled = self.animation.cancel_animation();
        if cancelled {
            if let Some(at) = self.position {
                info!("[Hero] Motion interrupted at {}", at);
            }
        }
        cancelled
    }

    fn arrive(&mut self, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) {
        // Key and exit never share a cell.
        if !self.pickup_key(maze, signals) {
            self.reach_exit(maze, status, signals);
        }
    }

    /// One-shot: clears the key tag under the hero and requests `has-key`.
    pub fn pickup_key(&mut self, maze: &mut MazeData, signals: &mut Vec<HeroSignal>) -> bool {
        let Some(at) = self.position else {
            return false;
        };
        if !maze.take_key(at) {
            return false;
        }
        info!("[Hero] Picked up the key at {}", at);
        signals.push(HeroSignal::KeyPickedUp(at));
        signals.push(HeroSignal::Status(GameStatus::HasKey));
        true
    }

    /// Requests `game-won` when standing on the exit with the key.
    pub fn reach_exit(&self, maze: &MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> bool {
        let Some(at) = self.position else {
            return false;
        };
        if status != GameStatus::HasKey || !maze.has_tag(at, CellTag::Exit) {
            return false;
        }
        info!("[Hero] Reached the exit at {}", at);
        signals.push(HeroSignal::Status(GameStatus::GameWon));
        true
    }
}
