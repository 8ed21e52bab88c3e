//! Stateless move-legality oracle over a maze grid.

use crate::shared::*;

#[derive(Debug, Clone, Copy)]
pub struct MazeNavigator<'a> {
    maze: &'a MazeData,
}

impl<'a> MazeNavigator<'a> {
    pub fn new(maze: &'a MazeData) -> Self {
        Self { maze }
    }

    /// True iff `to` is inside the grid and not a wall. Adjacency of
    /// `from -> to` is the caller's business.
    pub fn is_valid_move(&self, _from: Coord, to: Coord) -> bool {
        !self.maze.is_wall(to)
    }

    /// All-or-nothing preflight for a counted motion: every one of the
    /// `steps` cells along `(d_row, d_col)` must be a legal target.
    pub fn validate_path(&self, from: Coord, d_row: i32, d_col: i32, steps: u32) -> bool {
        from.walk(d_row, d_col, steps)
            .all(|to| self.is_valid_move(from, to))
    }

    /// Far end of the open run from `from` toward `anchor`, but only when that
    /// run reaches the border: the cell after the last open one must be the
    /// border wall itself (or off the grid, past a door). Stopping at an
    /// interior wall, standing on a wall, or not moving at all yields `None`.
    pub fn find_anchor_target(&self, from: Coord, anchor: Anchor) -> Option<Coord> {
        let here = self.maze.cell(from)?;
        if here.is_wall() {
            return None;
        }

        let (d_row, d_col) = anchor.delta();
        let mut last = from;
        let reached_border = loop {
            let next = last.offset(d_row, d_col);
            match self.maze.cell(next) {
                None => break true,
                Some(tags) if tags.is_wall() => break self.is_border(next, anchor),
                Some(_) => last = next,
            }
        };

        (reached_border && last != from).then_some(last)
    }

    fn is_border(&self, at: Coord, anchor: Anchor) -> bool {
        match anchor {
            Anchor::Start => at.col == 0,
            Anchor::End => at.col == self.maze.cols as i32 - 1,
            Anchor::Top => at.row == 0,
            Anchor::Bottom => at.row == self.maze.rows as i32 - 1,
        }
    }
}
