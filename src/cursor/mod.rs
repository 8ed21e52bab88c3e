//! Cursor domain plugin.
//!
//! Provides:
//! - Vim motion parsing (counts, `hjkl`, `0 ^ $ gg G`, `.` repeat)
//! - The hero avatar with all-or-nothing move validation
//! - Frame-budgeted animation of counted moves, interruptible with Escape
//! - Key pickup and exit detection, reported as status commands

pub mod animation;
pub mod hero;
pub mod motions;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::config::MazeConfig;
use crate::maze::ActiveMaze;
use crate::shared::*;

pub use animation::{AnimationFrame, AnimationSystem};
pub use hero::{Hero, HeroSignal, MoveOutcome};
pub use motions::{is_motion_key, MotionIntent, VimMotions};

pub struct CursorPlugin;

impl Plugin for CursorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Cursor>();
        app.add_event::<KeyPressEvent>()
            .add_event::<InvalidMoveEvent>()
            .add_event::<KeyPickedUpEvent>()
            .add_event::<HeroSteppedEvent>()
            .add_event::<StatusCommand>();

        app.add_systems(OnEnter(GameStatus::Started), spawn_hero);
        for idle in [GameStatus::Waiting, GameStatus::GameOver, GameStatus::GameWon] {
            app.add_systems(OnEnter(idle), clear_hero);
        }

        app.add_systems(
            Update,
            (handle_motion_keys, advance_hero_animation).chain(),
        );
    }
}

/// Motion parser plus the avatar it drives.
#[derive(Resource, Debug, Clone)]
pub struct Cursor {
    pub hero: Hero,
    pub motions: VimMotions,
}

impl FromWorld for Cursor {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<MazeConfig>().cloned().unwrap_or_default();
        Self::new(&config)
    }
}

/// What one key did: how it parsed and, if it was a motion, how the move went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResult {
    pub intent: Option<MotionIntent>,
    pub outcome: Option<MoveOutcome>,
}

impl Cursor {
    pub fn new(config: &MazeConfig) -> Self {
        Self {
            hero: Hero::with_animation(AnimationSystem::with_budget(
                config.animation_budget_ms,
                config.frame_ms,
            )),
            motions: VimMotions::default(),
        }
    }

    /// Parses `key` and executes whatever motion it completes.
    pub fn handle_key(
        &mut self,
        key: &str,
        maze: &mut MazeData,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> KeyResult {
        let remembered = self.motions.repeat_last_motion();
        let intent = self.motions.process_key(key);
        let outcome = match intent {
            Some(MotionIntent::Move(motion)) => {
                let outcome = self.run_motion(motion, maze, status, signals);
                // `.` only repeats motions the hero acted on.
                if outcome == MoveOutcome::Ignored {
                    self.motions.restore_last_motion(remembered);
                }
                Some(outcome)
            }
            Some(MotionIntent::Repeat(motion)) => Some(self.run_motion(motion, maze, status, signals)),
            Some(MotionIntent::Anchor(anchor)) => {
                Some(self.hero.move_to_anchor(maze, anchor, status, signals))
            }
            Some(MotionIntent::Count(_)) | Some(MotionIntent::Pending) | None => None,
        };
        KeyResult { intent, outcome }
    }

    /// Escape: drops the half-typed count and interrupts any animation.
    pub fn cancel(&mut self) -> bool {
        self.motions.reset();
        self.hero.cancel_animation()
    }

    fn run_motion(
        &mut self,
        motion: Motion,
        maze: &mut MazeData,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> MoveOutcome {
        self.hero
            .move_hero(maze, motion.d_row, motion.d_col, motion.steps, status, signals)
    }

    fn directional(
        &mut self,
        d_row: i32,
        d_col: i32,
        count: u32,
        maze: &mut MazeData,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> MoveOutcome {
        let motion = Motion::new(d_row, d_col, count);
        let outcome = self.run_motion(motion, maze, status, signals);
        if outcome != MoveOutcome::Ignored {
            self.motions.set_last_motion(motion);
        }
        outcome
    }

    pub fn move_left(&mut self, count: u32, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.directional(0, -1, count, maze, status, signals)
    }

    pub fn move_right(&mut self, count: u32, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.directional(0, 1, count, maze, status, signals)
    }

    pub fn move_up(&mut self, count: u32, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.directional(-1, 0, count, maze, status, signals)
    }

    pub fn move_down(&mut self, count: u32, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.directional(1, 0, count, maze, status, signals)
    }

    pub fn move_to_start(&mut self, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.hero.move_to_anchor(maze, Anchor::Start, status, signals)
    }

    pub fn move_to_end(&mut self, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.hero.move_to_anchor(maze, Anchor::End, status, signals)
    }

    pub fn move_to_top(&mut self, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.hero.move_to_anchor(maze, Anchor::Top, status, signals)
    }

    pub fn move_to_bottom(&mut self, maze: &mut MazeData, status: GameStatus, signals: &mut Vec<HeroSignal>) -> MoveOutcome {
        self.hero.move_to_anchor(maze, Anchor::Bottom, status, signals)
    }

    /// Re-runs the last directional motion. `None` before the first one.
    pub fn repeat_last_motion(
        &mut self,
        maze: &mut MazeData,
        status: GameStatus,
        signals: &mut Vec<HeroSignal>,
    ) -> Option<MoveOutcome> {
        let motion = self.motions.repeat_last_motion()?;
        Some(self.run_motion(motion, maze, status, signals))
    }
}

/// Event writers the hero's signals are published through.
#[derive(SystemParam)]
pub struct HeroEvents<'w> {
    invalid: EventWriter<'w, InvalidMoveEvent>,
    picked: EventWriter<'w, KeyPickedUpEvent>,
    stepped: EventWriter<'w, HeroSteppedEvent>,
    status: EventWriter<'w, StatusCommand>,
}

impl HeroEvents<'_> {
    /// Publishes and drains `signals`. Status requests also update `status`
    /// so later keys in the same frame see the new phase.
    fn publish(&mut self, signals: &mut Vec<HeroSignal>, status: &mut GameStatus) {
        for signal in signals.drain(..) {
            match signal {
                HeroSignal::InvalidMove => {
                    self.invalid.send(InvalidMoveEvent);
                }
                HeroSignal::Stepped(at) => {
                    self.stepped.send(HeroSteppedEvent { at });
                }
                HeroSignal::KeyPickedUp(at) => {
                    self.picked.send(KeyPickedUpEvent { at });
                }
                HeroSignal::Status(next) => {
                    *status = next;
                    self.status.send(StatusCommand::Set(next));
                }
            }
        }
    }
}

fn spawn_hero(maze: Res<ActiveMaze>, mut cursor: ResMut<Cursor>) {
    let was_absent = cursor.hero.position().is_none();
    match cursor.hero.spawn_at_entrance(maze.data()) {
        Some(at) if was_absent => info!("[Hero] Spawned at entrance {}", at),
        Some(_) => {}
        None => warn!("[Hero] Maze has no entrance door; hero stays absent"),
    }
}

fn clear_hero(mut cursor: ResMut<Cursor>) {
    cursor.hero.reset();
    cursor.motions.reset();
}

/// System: feed key presses to the motion parser while a run is in progress.
pub fn handle_motion_keys(
    mut keys: EventReader<KeyPressEvent>,
    state: Res<State<GameStatus>>,
    mut maze: ResMut<ActiveMaze>,
    mut cursor: ResMut<Cursor>,
    mut events: HeroEvents,
) {
    let mut status = *state.get();
    let mut signals = Vec::new();

    for press in keys.read() {
        if !status.accepts_keys() {
            continue;
        }
        if press.key == "Escape" {
            cursor.cancel();
            continue;
        }
        let result = cursor.handle_key(&press.key, maze.data_mut(), status, &mut signals);
        if let Some(outcome) = result.outcome {
            debug!("[Hero] {:?} -> {:?}", press.key, outcome);
        }
        events.publish(&mut signals, &mut status);
    }
}

/// System: one animation frame per update. Frozen while paused.
pub fn advance_hero_animation(
    state: Res<State<GameStatus>>,
    mut maze: ResMut<ActiveMaze>,
    mut cursor: ResMut<Cursor>,
    mut events: HeroEvents,
) {
    let mut status = *state.get();
    if !status.is_live() || !cursor.hero.is_animating() {
        return;
    }
    let mut signals = Vec::new();
    cursor.hero.tick(maze.data_mut(), status, &mut signals);
    events.publish(&mut signals, &mut status);
}
