//! Status domain plugin: the only writer of `NextState<GameStatus>`.
//!
//! Other domains request transitions with `StatusCommand`s. Commands are
//! folded in order during `PostUpdate` and the result is queued for the
//! next `StateTransition`.

use bevy::prelude::*;

use crate::shared::*;

pub struct StatusPlugin;

impl Plugin for StatusPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameStatus>();
        app.add_event::<StatusCommand>();
        app.add_event::<KeyPressEvent>();
        app.init_resource::<StatusMemory>();

        app.add_systems(Update, handle_shell_keys);
        app.add_systems(PostUpdate, apply_status_commands);
    }
}

/// Where a resume returns to. Pausing from `has-key` must not drop the key.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMemory {
    pub resume_to: GameStatus,
}

impl Default for StatusMemory {
    fn default() -> Self {
        Self {
            resume_to: GameStatus::Started,
        }
    }
}

/// `waiting`, `game-over` or `game-won` -> `started`. A run in progress is
/// left alone.
pub fn start_game(current: GameStatus) -> Option<GameStatus> {
    matches!(
        current,
        GameStatus::Waiting | GameStatus::GameOver | GameStatus::GameWon
    )
    .then_some(GameStatus::Started)
}

/// `force = Some(true)` pauses, `Some(false)` resumes, `None` flips. Only a
/// live run can pause and only a paused one can resume.
pub fn toggle_pause(current: GameStatus, resume_to: GameStatus, force: Option<bool>) -> Option<GameStatus> {
    let pause = force.unwrap_or(current != GameStatus::Paused);
    if pause {
        current.is_live().then_some(GameStatus::Paused)
    } else {
        (current == GameStatus::Paused).then_some(resume_to)
    }
}

pub fn quit_game(current: GameStatus) -> Option<GameStatus> {
    (current != GameStatus::Waiting).then_some(GameStatus::Waiting)
}

/// Run outcomes only land on a live run: a pickup or win needs `started` or
/// `has-key`, a game over needs `started`. Anything else is a no-op there.
pub fn set_game_status(current: GameStatus, next: GameStatus) -> Option<GameStatus> {
    let allowed = match next {
        GameStatus::HasKey | GameStatus::GameWon => current.is_live(),
        GameStatus::GameOver => current == GameStatus::Started,
        _ => true,
    };
    (allowed && current != next).then_some(next)
}

/// Folds one command into `current`, remembering the pre-pause status.
pub fn apply_command(current: GameStatus, memory: &mut StatusMemory, command: StatusCommand) -> Option<GameStatus> {
    let next = match command {
        StatusCommand::Start => start_game(current),
        StatusCommand::TogglePause(force) => toggle_pause(current, memory.resume_to, force),
        StatusCommand::Quit => quit_game(current),
        StatusCommand::Set(next) => set_game_status(current, next),
    }?;
    if next == GameStatus::Paused {
        memory.resume_to = current;
    }
    Some(next)
}

/// System: `Enter` or `Space` starts, `p` toggles pause, `q` quits.
pub fn handle_shell_keys(mut keys: EventReader<KeyPressEvent>, mut commands: EventWriter<StatusCommand>) {
    for press in keys.read() {
        let command = match press.key.as_str() {
            "Enter" | "Space" => StatusCommand::Start,
            "p" => StatusCommand::TogglePause(None),
            "q" => StatusCommand::Quit,
            _ => continue,
        };
        commands.send(command);
    }
}

/// System: the single place status changes are committed.
pub fn apply_status_commands(
    mut commands: EventReader<StatusCommand>,
    state: Res<State<GameStatus>>,
    mut next_state: ResMut<NextState<GameStatus>>,
    mut memory: ResMut<StatusMemory>,
) {
    let before = *state.get();
    let mut current = before;
    for command in commands.read() {
        match apply_command(current, &mut memory, *command) {
            Some(next) => current = next,
            None => debug!("[Status] {:?} ignored in {}", command, current.as_str()),
        }
    }

    if current != before {
        info!("[Status] {} -> {}", before.as_str(), current.as_str());
        next_state.set(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameStatus::*;

    #[test]
    fn start_only_from_an_idle_phase() {
        assert_eq!(start_game(Waiting), Some(Started));
        assert_eq!(start_game(GameOver), Some(Started));
        assert_eq!(start_game(GameWon), Some(Started));
        assert_eq!(start_game(HasKey), None);
        assert_eq!(start_game(Paused), None);
    }

    #[test]
    fn pause_round_trip_keeps_the_key() {
        let mut memory = StatusMemory::default();
        let paused = apply_command(HasKey, &mut memory, StatusCommand::TogglePause(None));
        assert_eq!(paused, Some(Paused));
        assert_eq!(
            apply_command(Paused, &mut memory, StatusCommand::TogglePause(None)),
            Some(HasKey)
        );
    }

    #[test]
    fn forced_pause_and_resume_are_idempotent() {
        assert_eq!(toggle_pause(Started, Started, Some(true)), Some(Paused));
        assert_eq!(toggle_pause(Paused, Started, Some(true)), None);
        assert_eq!(toggle_pause(Started, Started, Some(false)), None);
        assert_eq!(toggle_pause(Paused, HasKey, Some(false)), Some(HasKey));
    }

    #[test]
    fn idle_phases_cannot_pause() {
        for status in [Waiting, GameOver, GameWon] {
            assert_eq!(toggle_pause(status, Started, None), None);
        }
    }

    #[test]
    fn quit_and_set() {
        assert_eq!(quit_game(HasKey), Some(Waiting));
        assert_eq!(quit_game(Waiting), None);
        assert_eq!(set_game_status(Started, HasKey), Some(HasKey));
        assert_eq!(set_game_status(HasKey, HasKey), None);
    }

    #[test]
    fn run_outcomes_need_a_live_run() {
        for idle in [Waiting, Paused, GameOver, GameWon] {
            assert_eq!(set_game_status(idle, HasKey), None);
        }
        assert_eq!(set_game_status(Waiting, GameWon), None);
        assert_eq!(set_game_status(HasKey, GameWon), Some(GameWon));
        assert_eq!(set_game_status(Started, GameOver), Some(GameOver));
        assert_eq!(set_game_status(HasKey, GameOver), None);
        assert_eq!(set_game_status(GameWon, GameOver), None);
    }

    #[test]
    fn quit_in_the_same_frame_as_a_pickup_still_quits() {
        let mut memory = StatusMemory::default();
        let mut current = Started;
        for command in [StatusCommand::Quit, StatusCommand::Set(HasKey)] {
            if let Some(next) = apply_command(current, &mut memory, command) {
                current = next;
            }
        }
        assert_eq!(current, Waiting);

        // A game over is not undone by a pickup folded after it.
        let mut current = Started;
        for command in [StatusCommand::Set(GameOver), StatusCommand::Set(HasKey)] {
            if let Some(next) = apply_command(current, &mut memory, command) {
                current = next;
            }
        }
        assert_eq!(current, GameOver);
    }
}
