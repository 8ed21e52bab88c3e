//! Shared components, resources, events, and states for the maze engine.
//!
//! This is the type contract. Every domain plugin imports from here, and
//! cross-domain signals are only ever expressed with the events below.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATUS: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// Single source of truth for the game phase. Every domain reads it; only
/// the status plugin writes `NextState<GameStatus>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    #[default]
    Waiting,
    Started,
    HasKey,
    Paused,
    GameOver,
    GameWon,
}

impl GameStatus {
    /// A run is in progress and the hero accepts moves.
    pub fn is_live(self) -> bool {
        matches!(self, GameStatus::Started | GameStatus::HasKey)
    }

    /// Keys are interpreted (and logged) in these phases. Paused still
    /// accepts count prefixes and shell keys; the hero just refuses to move.
    pub fn accepts_keys(self) -> bool {
        matches!(
            self,
            GameStatus::Started | GameStatus::HasKey | GameStatus::Paused
        )
    }

    pub fn is_finished(self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::GameWon)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Started => "started",
            GameStatus::HasKey => "has-key",
            GameStatus::Paused => "paused",
            GameStatus::GameOver => "game-over",
            GameStatus::GameWon => "game-won",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GRID PRIMITIVES
// ═══════════════════════════════════════════════════════════════════════

/// A grid position, 0-indexed and row-major. Signed so that probing one
/// step past the border never needs special casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Every cell visited by walking `steps` unit increments, excluding the
    /// starting cell.
    pub fn walk(self, d_row: i32, d_col: i32, steps: u32) -> impl Iterator<Item = Coord> {
        (1..=steps as i32).map(move |i| self.offset(d_row * i, d_col * i))
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTag {
    Wall,
    Door,
    Entrance,
    Exit,
    Key,
    Hero,
}

impl CellTag {
    pub const ALL: [CellTag; 6] = [
        CellTag::Wall,
        CellTag::Door,
        CellTag::Entrance,
        CellTag::Exit,
        CellTag::Key,
        CellTag::Hero,
    ];

    fn bit(self) -> u8 {
        match self {
            CellTag::Wall => 1 << 0,
            CellTag::Door => 1 << 1,
            CellTag::Entrance => 1 << 2,
            CellTag::Exit => 1 << 3,
            CellTag::Key => 1 << 4,
            CellTag::Hero => 1 << 5,
        }
    }
}

/// Tags that name a single landmark cell and can be used as BFS endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionTag {
    Entrance,
    Exit,
    Key,
    /// Never stored in the grid; resolved from a caller-supplied live coordinate.
    Hero,
}

impl From<PositionTag> for CellTag {
    fn from(tag: PositionTag) -> Self {
        match tag {
            PositionTag::Entrance => CellTag::Entrance,
            PositionTag::Exit => CellTag::Exit,
            PositionTag::Key => CellTag::Key,
            PositionTag::Hero => CellTag::Hero,
        }
    }
}

/// The tag set for one grid position. Order-insensitive, duplicates impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<CellTag>", from = "Vec<CellTag>")]
pub struct CellTags(u8);

pub type MazeCell = CellTags;

impl CellTags {
    pub const EMPTY: CellTags = CellTags(0);

    pub fn of(tags: &[CellTag]) -> Self {
        tags.iter().fold(Self::EMPTY, |set, tag| set.with(*tag))
    }

    pub fn with(mut self, tag: CellTag) -> Self {
        self.insert(tag);
        self
    }

    pub fn contains(self, tag: CellTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn insert(&mut self, tag: CellTag) {
        self.0 |= tag.bit();
    }

    /// Returns true if the tag was present.
    pub fn remove(&mut self, tag: CellTag) -> bool {
        let had = self.contains(tag);
        self.0 &= !tag.bit();
        had
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_wall(self) -> bool {
        self.contains(CellTag::Wall)
    }

    pub fn iter(self) -> impl Iterator<Item = CellTag> {
        CellTag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }
}

impl From<Vec<CellTag>> for CellTags {
    fn from(tags: Vec<CellTag>) -> Self {
        Self::of(&tags)
    }
}

impl From<CellTags> for Vec<CellTag> {
    fn from(tags: CellTags) -> Self {
        tags.iter().collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MAZE DATA
// ═══════════════════════════════════════════════════════════════════════

/// Snapshot of a generated maze. `width`/`height` count logical cell blocks;
/// `cols`/`rows` are the full grid dimensions (`2 * block + 1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeData {
    pub width: usize,
    pub height: usize,
    pub cols: usize,
    pub rows: usize,
    /// Key-placement score: entrance distance plus exit distance of the key cell.
    pub total_steps: u32,
    cells: Vec<MazeCell>,
}

impl MazeData {
    /// An all-open grid sized for `width` x `height` logical blocks.
    pub fn blank(width: usize, height: usize) -> Self {
        let cols = 2 * width + 1;
        let rows = 2 * height + 1;
        Self {
            width,
            height,
            cols,
            rows,
            total_steps: 0,
            cells: vec![CellTags::EMPTY; cols * rows],
        }
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        at.row >= 0 && at.col >= 0 && (at.row as usize) < self.rows && (at.col as usize) < self.cols
    }

    pub fn index_of(&self, at: Coord) -> Option<usize> {
        self.in_bounds(at)
            .then(|| at.row as usize * self.cols + at.col as usize)
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        Coord::new((index / self.cols) as i32, (index % self.cols) as i32)
    }

    /// `None` when `at` lies outside the grid.
    pub fn cell(&self, at: Coord) -> Option<MazeCell> {
        self.index_of(at).map(|i| self.cells[i])
    }

    pub fn set_cell(&mut self, at: Coord, tags: MazeCell) {
        if let Some(i) = self.index_of(at) {
            self.cells[i] = tags;
        }
    }

    /// Out-of-bounds counts as blocked.
    pub fn is_wall(&self, at: Coord) -> bool {
        self.cell(at).map_or(true, CellTags::is_wall)
    }

    pub fn has_tag(&self, at: Coord, tag: CellTag) -> bool {
        self.cell(at).is_some_and(|tags| tags.contains(tag))
    }

    /// Clears a picked-up key. Returns true if a key was there.
    pub fn take_key(&mut self, at: Coord) -> bool {
        match self.index_of(at) {
            Some(i) => self.cells[i].remove(CellTag::Key),
            None => false,
        }
    }

    /// Last cell carrying `tag` in row-major order.
    pub fn find_tag(&self, tag: CellTag) -> Option<Coord> {
        self.cells
            .iter()
            .rposition(|cell| cell.contains(tag))
            .map(|i| self.coord_of(i))
    }

    pub fn entrance_door(&self) -> Option<Coord> {
        self.find_tag(CellTag::Entrance)
    }

    pub fn exit_door(&self) -> Option<Coord> {
        self.find_tag(CellTag::Exit)
    }

    pub fn cells(&self) -> impl Iterator<Item = (Coord, MazeCell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (self.coord_of(i), *cell))
    }

    pub fn open_cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_wall()).count()
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Serialization failed: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let data: MazeData =
            serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))?;
        if data.width == 0 || data.height == 0 {
            return Err(format!(
                "Maze must have at least one block, got {}x{}",
                data.width, data.height
            ));
        }
        let expected = (
            data.width.checked_mul(2).and_then(|c| c.checked_add(1)),
            data.height.checked_mul(2).and_then(|r| r.checked_add(1)),
        );
        if expected != (Some(data.cols), Some(data.rows)) {
            return Err(format!(
                "Grid {}x{} does not fit {}x{} blocks",
                data.cols, data.rows, data.width, data.height
            ));
        }
        if data.rows.checked_mul(data.cols) != Some(data.cells.len()) {
            return Err(format!(
                "Grid has {} cells but {}x{} were declared",
                data.cells.len(),
                data.rows,
                data.cols
            ));
        }
        Ok(data)
    }

    /// Parses the ASCII legend written by `Display`: `#` wall, `.` open,
    /// `E` entrance door, `X` exit door, `D` bare door, `K` key.
    /// Blank lines and surrounding whitespace are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err("Maze text has no rows".to_string());
        };
        let cols = first.chars().count();
        let rows = lines.len();

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(format!(
                    "Row {} has {} columns, expected {}",
                    r,
                    line.chars().count(),
                    cols
                ));
            }
            for (c, ch) in line.chars().enumerate() {
                let tags = match ch {
                    '#' => CellTags::of(&[CellTag::Wall]),
                    '.' => CellTags::EMPTY,
                    'E' => CellTags::of(&[CellTag::Door, CellTag::Entrance]),
                    'X' => CellTags::of(&[CellTag::Door, CellTag::Exit]),
                    'D' => CellTags::of(&[CellTag::Door]),
                    'K' => CellTags::of(&[CellTag::Key]),
                    other => {
                        return Err(format!("Unknown maze glyph '{}' at ({}, {})", other, r, c))
                    }
                };
                cells.push(tags);
            }
        }

        Ok(Self {
            width: cols / 2,
            height: rows / 2,
            cols,
            rows,
            total_steps: 0,
            cells,
        })
    }
}

fn glyph(cell: MazeCell) -> char {
    if cell.is_wall() {
        '#'
    } else if cell.contains(CellTag::Key) {
        'K'
    } else if cell.contains(CellTag::Entrance) {
        'E'
    } else if cell.contains(CellTag::Exit) {
        'X'
    } else if cell.contains(CellTag::Door) {
        'D'
    } else {
        '.'
    }
}

impl fmt::Display for MazeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|cell| glyph(*cell)).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MOTIONS & CURSOR
// ═══════════════════════════════════════════════════════════════════════

/// A directional delta plus repeat count; the unit remembered for `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Motion {
    pub d_row: i32,
    pub d_col: i32,
    pub steps: u32,
}

impl Motion {
    pub fn new(d_row: i32, d_col: i32, steps: u32) -> Self {
        Self {
            d_row,
            d_col,
            steps: steps.max(1),
        }
    }
}

/// Row/column extremes for the jump commands. `Start`/`End` walk the current
/// row (`0 ^` / `$`), `Top`/`Bottom` walk the current column (`gg` / `G`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    Start,
    End,
    Top,
    Bottom,
}

impl Anchor {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Anchor::Start => (0, -1),
            Anchor::End => (0, 1),
            Anchor::Top => (-1, 0),
            Anchor::Bottom => (1, 0),
        }
    }
}

/// Only `Normal` is exercised today; the rest are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorMode {
    #[default]
    Normal,
    Insert,
    Replace,
    Visual,
    VisualLine,
}

/// One engine-relevant keystroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLogEntry {
    pub key: String,
    /// Seconds since app start.
    pub timestamp: f64,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// A raw key identifier from the keyboard source (`"h"`, `"$"`, `"Escape"`).
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct KeyPressEvent {
    pub key: String,
}

impl KeyPressEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// "Invalid move attempted". Informational only.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMoveEvent;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPickedUpEvent {
    pub at: Coord,
}

/// The hero entered a cell (one per logical step, including animated ones).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroSteppedEvent {
    pub at: Coord,
}

/// A fresh maze is active and must be repainted.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeGeneratedEvent;

/// Requests to the status plugin, the only writer of `GameStatus`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCommand {
    Start,
    /// `Some(true)` forces pause, `Some(false)` forces resume, `None` toggles.
    TogglePause(Option<bool>),
    Quit,
    Set(GameStatus),
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const CELL_SIZE: f32 = 20.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 640.0;

/// Rounds half-way values toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
