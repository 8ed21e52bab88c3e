use bevy::input::InputSystem;
use bevy::prelude::*;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<KeyPressEvent>();
        app.add_systems(PreUpdate, read_keyboard.after(InputSystem));
    }
}

/// The single point where hardware keys become engine key identifiers.
fn read_keyboard(keys: Res<ButtonInput<KeyCode>>, mut presses: EventWriter<KeyPressEvent>) {
    let shifted = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    for code in keys.get_just_pressed() {
        if let Some(key) = key_name(*code, shifted) {
            presses.send(KeyPressEvent::new(key));
        }
    }
}

/// Engine key identifier for a physical key on a US layout. `None` for keys
/// the engine never reads.
pub fn key_name(code: KeyCode, shifted: bool) -> Option<&'static str> {
    let key = match (code, shifted) {
        (KeyCode::Escape, _) => "Escape",
        (KeyCode::Enter | KeyCode::NumpadEnter, _) => "Enter",
        (KeyCode::Space, _) => "Space",

        (KeyCode::KeyH, false) => "h",
        (KeyCode::KeyJ, false) => "j",
        (KeyCode::KeyK, false) => "k",
        (KeyCode::KeyL, false) => "l",
        (KeyCode::KeyH, true) => "H",
        (KeyCode::KeyJ, true) => "J",
        (KeyCode::KeyK, true) => "K",
        (KeyCode::KeyL, true) => "L",
        (KeyCode::KeyG, false) => "g",
        (KeyCode::KeyG, true) => "G",
        (KeyCode::KeyP, false) => "p",
        (KeyCode::KeyQ, false) => "q",
        (KeyCode::Period, false) => ".",

        (KeyCode::Digit4, true) => "$",
        (KeyCode::Digit6, true) => "^",
        (KeyCode::Digit0 | KeyCode::Numpad0, false) => "0",
        (KeyCode::Digit1 | KeyCode::Numpad1, false) => "1",
        (KeyCode::Digit2 | KeyCode::Numpad2, false) => "2",
        (KeyCode::Digit3 | KeyCode::Numpad3, false) => "3",
        (KeyCode::Digit4 | KeyCode::Numpad4, false) => "4",
        (KeyCode::Digit5 | KeyCode::Numpad5, false) => "5",
        (KeyCode::Digit6 | KeyCode::Numpad6, false) => "6",
        (KeyCode::Digit7 | KeyCode::Numpad7, false) => "7",
        (KeyCode::Digit8 | KeyCode::Numpad8, false) => "8",
        (KeyCode::Digit9 | KeyCode::Numpad9, false) => "9",
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_selects_anchors_and_uppercase() {
        assert_eq!(key_name(KeyCode::Digit4, true), Some("$"));
        assert_eq!(key_name(KeyCode::Digit6, true), Some("^"));
        assert_eq!(key_name(KeyCode::KeyG, true), Some("G"));
        assert_eq!(key_name(KeyCode::KeyL, true), Some("L"));
        assert_eq!(key_name(KeyCode::Digit4, false), Some("4"));
    }

    #[test]
    fn shell_keys_and_unknowns() {
        assert_eq!(key_name(KeyCode::Enter, false), Some("Enter"));
        assert_eq!(key_name(KeyCode::Escape, true), Some("Escape"));
        assert_eq!(key_name(KeyCode::Space, false), Some("Space"));
        assert_eq!(key_name(KeyCode::KeyP, false), Some("p"));
        assert_eq!(key_name(KeyCode::KeyX, false), None);
        assert_eq!(key_name(KeyCode::Digit1, true), None);
    }
}
