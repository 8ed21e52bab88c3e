//! Procedural maze generation by recursive spatial partitioning.
//!
//! The grid starts as an open lattice of pillars inside a solid border. Each
//! rectangular region is split by one horizontal and one vertical wall line,
//! and three of the four half-lines get a single gap, so the four quadrants
//! stay connected. Regions are processed from an explicit work stack rather
//! than by recursion, so board size is bounded by memory, not stack depth.

use rand::prelude::*;
use std::collections::VecDeque;

use crate::shared::*;

/// Inclusive range of internal wall lines (in block coordinates) that a
/// region spans. Degenerate once either range is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    r1: i64,
    r2: i64,
    c1: i64,
    c2: i64,
}

impl Region {
    fn is_degenerate(&self) -> bool {
        self.r2 < self.r1 || self.c2 < self.c1
    }
}

/// Grid column/row of the passage for logical block `x` (1-based).
fn pos_to_space(x: i64) -> i32 {
    (2 * (x - 1) + 1) as i32
}

/// Grid column/row of the wall line following logical block `x`.
fn pos_to_wall(x: i64) -> i32 {
    (2 * x) as i32
}

/// Uniform integer in `[min, max]`; collapses to `min` when the range is empty.
fn rand_between<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Picks a cut line in `[lo, hi]`, biased toward the band between
/// `lo + span * from` and `lo + span * to` of the interior.
fn pick_cut<R: Rng + ?Sized>(rng: &mut R, lo: i64, hi: i64, from: f64, to: f64) -> i64 {
    if lo == hi {
        return lo;
    }
    let x = (lo + 1) as f64;
    let y = (hi - 1) as f64;
    let start = round_half_up(x + (y - x) * from);
    let end = round_half_up(x + (y - x) * to);
    rand_between(rng, start, end)
}

/// Owns the active maze grid and answers distance queries over it.
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    data: MazeData,
}

impl MazeGenerator {
    /// Builds a maze with uncontrolled randomness. `user_cols`/`user_rows` are
    /// halved into logical blocks (at least one each way).
    pub fn new(user_cols: usize, user_rows: usize) -> Self {
        Self::with_rng(user_cols, user_rows, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(user_cols: usize, user_rows: usize, rng: &mut R) -> Self {
        let width = (user_cols / 2).max(1);
        let height = (user_rows / 2).max(1);
        let mut generator = Self {
            data: MazeData::blank(width, height),
        };
        generator.lay_lattice(rng);
        generator.partition(
            rng,
            Region {
                r1: 1,
                r2: height as i64 - 1,
                c1: 1,
                c2: width as i64 - 1,
            },
        );
        generator
    }

    /// Wraps an existing grid (hand-drawn mazes, imported JSON).
    pub fn from_data(data: MazeData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &MazeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut MazeData {
        &mut self.data
    }

    pub fn into_data(self) -> MazeData {
        self.data
    }

    /// Solid border, pillar lattice, and one door on the top (exit) and
    /// bottom (entrance) border, each on a passage column.
    fn lay_lattice<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let rows = self.data.rows as i32;
        let cols = self.data.cols as i32;
        let wall = CellTags::of(&[CellTag::Wall]);

        for r in 0..rows {
            for c in 0..cols {
                let is_wall = if r == 0 || r == rows - 1 {
                    true
                } else if r % 2 == 1 {
                    c == 0 || c == cols - 1
                } else {
                    c % 2 == 0
                };
                if is_wall {
                    self.data.set_cell(Coord::new(r, c), wall);
                }
            }
        }

        let width = self.data.width as i64;
        let exit_col = pos_to_space(rand_between(rng, 1, width));
        self.data.set_cell(
            Coord::new(0, exit_col),
            CellTags::of(&[CellTag::Door, CellTag::Exit]),
        );
        let entrance_col = pos_to_space(rand_between(rng, 1, width));
        self.data.set_cell(
            Coord::new(rows - 1, entrance_col),
            CellTags::of(&[CellTag::Door, CellTag::Entrance]),
        );
    }

    fn partition<R: Rng + ?Sized>(&mut self, rng: &mut R, root: Region) {
        let wall = CellTags::of(&[CellTag::Wall]);
        let mut stack = vec![root];

        while let Some(region) = stack.pop() {
            if region.is_degenerate() {
                continue;
            }
            let Region { r1, r2, c1, c2 } = region;

            let horiz = pick_cut(rng, r1, r2, 1.0 / 4.0, 3.0 / 4.0);
            let vert = pick_cut(rng, c1, c2, 1.0 / 3.0, 2.0 / 3.0);

            let wall_row = pos_to_wall(horiz);
            let wall_col = pos_to_wall(vert);
            for i in pos_to_wall(r1) - 1..=pos_to_wall(r2) + 1 {
                for j in pos_to_wall(c1) - 1..=pos_to_wall(c2) + 1 {
                    if i == wall_row || j == wall_col {
                        self.data.set_cell(Coord::new(i, j), wall);
                    }
                }
            }

            // Exactly one of the four half-lines stays solid.
            let mut gaps = [true, true, true, false];
            gaps.shuffle(rng);

            if gaps[0] {
                let col = pos_to_space(rand_between(rng, c1, vert));
                self.data.set_cell(Coord::new(wall_row, col), CellTags::EMPTY);
            }
            if gaps[1] {
                let col = pos_to_space(rand_between(rng, vert + 1, c2 + 1));
                self.data.set_cell(Coord::new(wall_row, col), CellTags::EMPTY);
            }
            if gaps[2] {
                let row = pos_to_space(rand_between(rng, r1, horiz));
                self.data.set_cell(Coord::new(row, wall_col), CellTags::EMPTY);
            }
            if gaps[3] {
                let row = pos_to_space(rand_between(rng, horiz + 1, r2 + 1));
                self.data.set_cell(Coord::new(row, wall_col), CellTags::EMPTY);
            }

            // Pushed in reverse so regions pop top-left first.
            stack.push(Region { r1: horiz + 1, r2, c1: vert + 1, c2 });
            stack.push(Region { r1, r2: horiz - 1, c1: vert + 1, c2 });
            stack.push(Region { r1: horiz + 1, r2, c1, c2: vert - 1 });
            stack.push(Region { r1, r2: horiz - 1, c1, c2: vert - 1 });
        }
    }

    /// Step counts from `start` over open and door cells. Cells tagged `stop`
    /// get a distance but are not expanded past.
    fn count_steps(&self, start: Coord, stop: CellTag) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.data.rows * self.data.cols];
        let Some(start_idx) = self.data.index_of(start) else {
            return dist;
        };
        dist[start_idx] = Some(0);

        let mut queue = VecDeque::from([start]);
        while let Some(at) = queue.pop_front() {
            if self.data.has_tag(at, stop) {
                continue;
            }
            let Some(d) = self.data.index_of(at).and_then(|i| dist[i]) else {
                continue;
            };
            for (d_row, d_col) in NEIGHBOURS {
                let next = at.offset(d_row, d_col);
                let Some(i) = self.data.index_of(next) else {
                    continue;
                };
                if dist[i].is_some() {
                    continue;
                }
                let tags = self.data.cell(next).unwrap_or_default();
                if !(tags.is_empty() || tags.contains(CellTag::Door)) {
                    continue;
                }
                dist[i] = Some(d + 1);
                queue.push_back(next);
            }
        }
        dist
    }

    /// The interior cell maximising entrance distance plus exit distance,
    /// with ties going to the last cell in row-major order.
    pub fn key_location(&mut self) -> Option<Coord> {
        let entrance = self.data.entrance_door()?;
        let exit = self.data.exit_door()?;
        let from_entrance = self.count_steps(entrance, CellTag::Exit);
        let from_exit = self.count_steps(exit, CellTag::Entrance);

        let mut best: Option<(Coord, u32)> = None;
        for (i, (at, tags)) in self.data.cells().enumerate() {
            let (Some(de), Some(dx)) = (from_entrance[i], from_exit[i]) else {
                continue;
            };
            if tags.contains(CellTag::Door) {
                continue;
            }
            let sum = de + dx;
            if best.map_or(true, |(_, top)| sum >= top) {
                best = Some((at, sum));
            }
        }

        let (at, sum) = best?;
        self.data.total_steps = sum;
        Some(at)
    }

    /// Places the single key. Any stale key tag is cleared first.
    pub fn place_key(&mut self) -> Option<Coord> {
        while let Some(old) = self.data.find_tag(CellTag::Key) {
            self.data.take_key(old);
        }
        let at = self.key_location()?;
        self.data.set_cell(at, CellTags::of(&[CellTag::Key]));
        Some(at)
    }

    /// 4-directional BFS over non-wall cells. `PositionTag::Hero` resolves to
    /// `live`; every other tag is looked up in the grid. Empty when either
    /// endpoint is missing or no route exists.
    pub fn shortest_path(&self, from: PositionTag, to: PositionTag, live: Option<Coord>) -> Vec<Coord> {
        let start = match (from, live) {
            (PositionTag::Hero, Some(at)) => Some(at),
            _ => self.data.find_tag(from.into()),
        };
        let end = self.data.find_tag(to.into());
        let (Some(start), Some(end)) = (start, end) else {
            return Vec::new();
        };
        let Some(start_idx) = self.data.index_of(start) else {
            return Vec::new();
        };

        let mut prev: Vec<Option<usize>> = vec![None; self.data.rows * self.data.cols];
        let mut visited = vec![false; self.data.rows * self.data.cols];
        visited[start_idx] = true;
        let mut queue = VecDeque::from([start]);

        while let Some(at) = queue.pop_front() {
            if at == end {
                let mut path = vec![at];
                let mut cursor = self.data.index_of(at).and_then(|i| prev[i]);
                while let Some(i) = cursor {
                    path.push(self.data.coord_of(i));
                    cursor = prev[i];
                }
                path.reverse();
                return path;
            }

            let Some(at_idx) = self.data.index_of(at) else {
                continue;
            };
            for (d_row, d_col) in BFS_ORDER {
                let next = at.offset(d_row, d_col);
                let Some(i) = self.data.index_of(next) else {
                    continue;
                };
                if visited[i] || self.data.is_wall(next) {
                    continue;
                }
                visited[i] = true;
                prev[i] = Some(at_idx);
                queue.push_back(next);
            }
        }

        Vec::new()
    }

    pub fn shortest_path_to_key(&self, live: Option<Coord>) -> Vec<Coord> {
        let from = if live.is_some() { PositionTag::Hero } else { PositionTag::Entrance };
        self.shortest_path(from, PositionTag::Key, live)
    }

    pub fn shortest_path_to_exit(&self, live: Option<Coord>) -> Vec<Coord> {
        let from = if live.is_some() { PositionTag::Hero } else { PositionTag::Entrance };
        self.shortest_path(from, PositionTag::Exit, live)
    }

    /// Steps along the shortest path, or `None` when there is no route.
    pub fn get_distance(&self, from: PositionTag, to: PositionTag, live: Option<Coord>) -> Option<usize> {
        let path = self.shortest_path(from, to, live);
        path.len().checked_sub(1)
    }
}

/// Expansion order used by key placement: up, right, down, left.
const NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Expansion order used by shortest-path queries.
const BFS_ORDER: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(cols: usize, rows: usize, seed: u64) -> MazeGenerator {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut maze = MazeGenerator::with_rng(cols, rows, &mut rng);
        maze.place_key();
        maze
    }

    #[test]
    fn grid_is_odd_with_one_door_per_border() {
        for seed in 0..20 {
            let maze = seeded(32, 24, seed);
            let data = maze.data();
            assert_eq!(data.cols, 2 * data.width + 1);
            assert_eq!(data.rows, 2 * data.height + 1);
            assert_eq!((data.width, data.height), (16, 12));

            let top_doors: Vec<Coord> = (0..data.cols as i32)
                .map(|c| Coord::new(0, c))
                .filter(|at| !data.is_wall(*at))
                .collect();
            let bottom_doors: Vec<Coord> = (0..data.cols as i32)
                .map(|c| Coord::new(data.rows as i32 - 1, c))
                .filter(|at| !data.is_wall(*at))
                .collect();
            assert_eq!(top_doors.len(), 1, "seed {seed}: top border doors {top_doors:?}");
            assert_eq!(bottom_doors.len(), 1, "seed {seed}: bottom border doors {bottom_doors:?}");
            assert!(data.has_tag(top_doors[0], CellTag::Exit));
            assert!(data.has_tag(bottom_doors[0], CellTag::Entrance));
            assert_eq!(top_doors[0].col % 2, 1, "door must sit on a passage column");
            assert_eq!(bottom_doors[0].col % 2, 1, "door must sit on a passage column");

            for r in 0..data.rows as i32 {
                assert!(data.is_wall(Coord::new(r, 0)));
                assert!(data.is_wall(Coord::new(r, data.cols as i32 - 1)));
            }
        }
    }

    #[test]
    fn every_open_cell_is_reachable_from_the_entrance() {
        for seed in 0..20 {
            let maze = seeded(30, 20, seed);
            let data = maze.data();
            let entrance = data.entrance_door().unwrap();

            let mut seen = vec![false; data.rows * data.cols];
            let mut queue = VecDeque::from([entrance]);
            seen[data.index_of(entrance).unwrap()] = true;
            while let Some(at) = queue.pop_front() {
                for (d_row, d_col) in BFS_ORDER {
                    let next = at.offset(d_row, d_col);
                    if data.is_wall(next) {
                        continue;
                    }
                    let i = data.index_of(next).unwrap();
                    if !seen[i] {
                        seen[i] = true;
                        queue.push_back(next);
                    }
                }
            }

            for (at, tags) in data.cells() {
                if !tags.is_wall() {
                    assert!(seen[data.index_of(at).unwrap()], "seed {seed}: {at} is isolated\n{data}");
                }
            }
        }
    }

    #[test]
    fn exactly_one_key_reachable_from_both_doors() {
        for seed in 0..20 {
            let maze = seeded(24, 16, seed);
            let data = maze.data();
            let keys = data.cells().filter(|(_, t)| t.contains(CellTag::Key)).count();
            assert_eq!(keys, 1, "seed {seed}");

            let to_key = maze.get_distance(PositionTag::Entrance, PositionTag::Key, None);
            let key_to_exit = maze.get_distance(PositionTag::Key, PositionTag::Exit, None);
            assert!(matches!(to_key, Some(d) if d > 0), "seed {seed}: {to_key:?}");
            assert!(matches!(key_to_exit, Some(d) if d > 0), "seed {seed}: {key_to_exit:?}");
            assert_eq!(
                to_key.unwrap() + key_to_exit.unwrap(),
                data.total_steps as usize,
                "in a perfect maze the key score equals the two path lengths"
            );
        }
    }

    #[test]
    fn key_maximises_the_distance_sum() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut maze = MazeGenerator::with_rng(20, 14, &mut rng);
        let entrance = maze.data().entrance_door().unwrap();
        let exit = maze.data().exit_door().unwrap();
        let from_entrance = maze.count_steps(entrance, CellTag::Exit);
        let from_exit = maze.count_steps(exit, CellTag::Entrance);

        let key = maze.place_key().unwrap();
        let best = maze.data().total_steps;
        let key_idx = maze.data().index_of(key).unwrap();
        assert_eq!(from_entrance[key_idx].unwrap() + from_exit[key_idx].unwrap(), best);

        for (i, (de, dx)) in from_entrance.iter().zip(&from_exit).enumerate() {
            if let (Some(de), Some(dx)) = (de, dx) {
                assert!(de + dx <= best, "cell {i} beats the key: {} > {best}", de + dx);
            }
        }
    }

    #[test]
    fn key_placement_breaks_ties_on_the_last_cell() {
        // Four dead ends share the top sum.
        let data = MazeData::from_ascii(
            "###X###
             #.....#
             ###.###
             #.....#
             ###E###",
        )
        .unwrap();
        let mut maze = MazeGenerator::from_data(data);
        let key = maze.place_key().unwrap();
        assert_eq!(key, Coord::new(3, 5));
        assert_eq!(maze.data().total_steps, 8);
    }

    #[test]
    fn smallest_board_still_gets_a_key() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut maze = MazeGenerator::with_rng(0, 0, &mut rng);
        assert_eq!((maze.data().rows, maze.data().cols), (3, 3));
        assert_eq!(maze.place_key(), Some(Coord::new(1, 1)));
        assert_eq!(maze.get_distance(PositionTag::Entrance, PositionTag::Key, None), Some(1));
    }

    #[test]
    fn distance_is_none_for_missing_or_unreachable_landmarks() {
        let data = MazeData::from_ascii(
            "#X#
             ###
             #K#
             #.#
             #E#",
        )
        .unwrap();
        let mut maze = MazeGenerator::from_data(data);
        assert_eq!(maze.get_distance(PositionTag::Entrance, PositionTag::Key, None), Some(2));
        assert_eq!(maze.get_distance(PositionTag::Entrance, PositionTag::Exit, None), None);

        let key = maze.data().find_tag(CellTag::Key).unwrap();
        maze.data_mut().take_key(key);
        assert!(maze.shortest_path(PositionTag::Entrance, PositionTag::Key, None).is_empty());
        assert_eq!(maze.get_distance(PositionTag::Entrance, PositionTag::Key, None), None);
    }

    #[test]
    fn hero_paths_start_at_the_live_coordinate() {
        let maze = seeded(16, 12, 11);
        let data = maze.data();
        let key = data.find_tag(CellTag::Key).unwrap();
        let path = maze.shortest_path_to_key(Some(key));
        assert_eq!(path, vec![key]);
        assert_eq!(maze.get_distance(PositionTag::Hero, PositionTag::Key, Some(key)), Some(0));

        // Without a live coordinate the hero tag never resolves.
        assert_eq!(maze.get_distance(PositionTag::Hero, PositionTag::Key, None), None);

        let from_entrance = maze.shortest_path_to_exit(None);
        assert_eq!(from_entrance.first().copied(), data.entrance_door());
        assert_eq!(from_entrance.last().copied(), data.exit_door());
        for pair in from_entrance.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
        }
    }

    #[test]
    fn large_boards_do_not_exhaust_the_stack() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut maze = MazeGenerator::with_rng(600, 600, &mut rng);
        assert!(maze.place_key().is_some());
    }
}
