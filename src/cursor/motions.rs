//! Vim-style motion parsing: count prefixes, directional moves, anchors,
//! the `gg` prefix, and `.` repeat.

use crate::shared::*;

/// Counts are clamped here; nothing on a playable board needs more.
pub const MAX_COUNT: u32 = 9_999;

/// Keys the motion parser understands. Used to decide what goes in the key log.
pub fn is_motion_key(key: &str) -> bool {
    matches!(
        key,
        "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9"
            | "h" | "j" | "k" | "l" | "H" | "J" | "K" | "L"
            | "^" | "$" | "g" | "G" | "."
    )
}

/// What a keypress means to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionIntent {
    /// A digit was appended to the count buffer.
    Count(char),
    /// First `g` of `gg`; waiting for the second.
    Pending,
    Move(Motion),
    Anchor(Anchor),
    Repeat(Motion),
}

#[derive(Debug, Clone, Default)]
pub struct VimMotions {
    count: String,
    last_motion: Option<Motion>,
    pending_g: bool,
}

impl VimMotions {
    /// Classifies one key. `None` means the key is not an engine key and
    /// should be forwarded elsewhere or ignored.
    pub fn process_key(&mut self, key: &str) -> Option<MotionIntent> {
        let was_pending = std::mem::take(&mut self.pending_g);

        match key {
            "g" if was_pending => {
                self.reset_count();
                Some(MotionIntent::Anchor(Anchor::Top))
            }
            "g" => {
                self.reset_count();
                self.pending_g = true;
                Some(MotionIntent::Pending)
            }
            // `0` is a motion only when no count precedes it.
            "0" if self.count.is_empty() => Some(MotionIntent::Anchor(Anchor::Start)),
            "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" => {
                let digit = key.chars().next()?;
                self.push_digit(digit);
                Some(MotionIntent::Count(digit))
            }
            "h" | "H" => Some(MotionIntent::Move(self.commit_motion(0, -1))),
            "j" | "J" => Some(MotionIntent::Move(self.commit_motion(1, 0))),
            "k" | "K" => Some(MotionIntent::Move(self.commit_motion(-1, 0))),
            "l" | "L" => Some(MotionIntent::Move(self.commit_motion(0, 1))),
            "^" => {
                self.reset_count();
                Some(MotionIntent::Anchor(Anchor::Start))
            }
            "$" => {
                self.reset_count();
                Some(MotionIntent::Anchor(Anchor::End))
            }
            "G" => {
                self.reset_count();
                Some(MotionIntent::Anchor(Anchor::Bottom))
            }
            "." => {
                let motion = self.repeat_last_motion()?;
                self.reset_count();
                Some(MotionIntent::Repeat(motion))
            }
            _ => None,
        }
    }

    fn push_digit(&mut self, digit: char) {
        if self.get_count() < MAX_COUNT {
            self.count.push(digit);
        }
    }

    fn commit_motion(&mut self, d_row: i32, d_col: i32) -> Motion {
        let motion = Motion::new(d_row, d_col, self.get_count());
        self.set_last_motion(motion);
        self.reset_count();
        motion
    }

    /// Clears the count buffer and any half-typed `gg`.
    pub fn reset(&mut self) {
        self.reset_count();
        self.pending_g = false;
    }

    pub fn reset_count(&mut self) {
        self.count.clear();
    }

    /// The parsed count, at least 1.
    pub fn get_count(&self) -> u32 {
        self.count
            .parse::<u32>()
            .unwrap_or(1)
            .clamp(1, MAX_COUNT)
    }

    pub fn has_count(&self) -> bool {
        !self.count.is_empty()
    }

    /// The raw digits typed so far, for display.
    pub fn pending_count(&self) -> &str {
        &self.count
    }

    pub fn is_pending_g(&self) -> bool {
        self.pending_g
    }

    pub fn set_last_motion(&mut self, motion: Motion) {
        self.last_motion = Some(motion);
    }

    pub fn repeat_last_motion(&self) -> Option<Motion> {
        self.last_motion
    }

    /// Puts back a remembered motion, undoing the commit of one the hero
    /// never ran.
    pub fn restore_last_motion(&mut self, motion: Option<Motion>) {
        self.last_motion = motion;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(motions: &mut VimMotions, keys: &[&str]) -> Vec<Option<MotionIntent>> {
        keys.iter().map(|key| motions.process_key(key)).collect()
    }

    #[test]
    fn counted_motion_uses_and_clears_the_buffer() {
        let mut motions = VimMotions::default();
        let out = feed(&mut motions, &["1", "2", "j"]);
        assert_eq!(out[0], Some(MotionIntent::Count('1')));
        assert_eq!(out[1], Some(MotionIntent::Count('2')));
        assert_eq!(out[2], Some(MotionIntent::Move(Motion::new(1, 0, 12))));
        assert!(!motions.has_count());

        assert_eq!(motions.process_key("h"), Some(MotionIntent::Move(Motion::new(0, -1, 1))));
    }

    #[test]
    fn zero_is_an_anchor_without_a_count_and_a_digit_with_one() {
        let mut motions = VimMotions::default();
        assert_eq!(motions.process_key("0"), Some(MotionIntent::Anchor(Anchor::Start)));
        assert!(!motions.has_count());

        let out = feed(&mut motions, &["1", "0", "l"]);
        assert_eq!(out[1], Some(MotionIntent::Count('0')));
        assert_eq!(out[2], Some(MotionIntent::Move(Motion::new(0, 1, 10))));
    }

    #[test]
    fn anchors_discard_the_count() {
        let mut motions = VimMotions::default();
        let out = feed(&mut motions, &["5", "$", "k"]);
        assert_eq!(out[1], Some(MotionIntent::Anchor(Anchor::End)));
        assert_eq!(out[2], Some(MotionIntent::Move(Motion::new(-1, 0, 1))));

        let out = feed(&mut motions, &["3", "^", "3", "G"]);
        assert_eq!(out[1], Some(MotionIntent::Anchor(Anchor::Start)));
        assert_eq!(out[3], Some(MotionIntent::Anchor(Anchor::Bottom)));
        assert!(!motions.has_count());
    }

    #[test]
    fn gg_needs_two_presses_in_a_row() {
        let mut motions = VimMotions::default();
        assert_eq!(motions.process_key("g"), Some(MotionIntent::Pending));
        assert!(motions.is_pending_g());
        assert_eq!(motions.process_key("g"), Some(MotionIntent::Anchor(Anchor::Top)));
        assert!(!motions.is_pending_g());

        // Any other key in between cancels the prefix.
        let out = feed(&mut motions, &["g", "x", "g"]);
        assert_eq!(out, vec![Some(MotionIntent::Pending), None, Some(MotionIntent::Pending)]);

        motions.reset();
        assert_eq!(motions.process_key("g"), Some(MotionIntent::Pending));
    }

    #[test]
    fn repeat_returns_the_last_directional_motion() {
        let mut motions = VimMotions::default();
        assert_eq!(motions.process_key("."), None);

        feed(&mut motions, &["3", "j"]);
        assert_eq!(motions.process_key("."), Some(MotionIntent::Repeat(Motion::new(1, 0, 3))));
        // Anchors do not replace the remembered motion.
        feed(&mut motions, &["$"]);
        assert_eq!(motions.process_key("."), Some(MotionIntent::Repeat(Motion::new(1, 0, 3))));
    }

    #[test]
    fn unknown_keys_are_not_engine_keys() {
        let mut motions = VimMotions::default();
        assert_eq!(motions.process_key("x"), None);
        assert_eq!(motions.process_key("Enter"), None);
        assert_eq!(motions.process_key(""), None);
        assert!(!is_motion_key("Enter"));
        assert!(is_motion_key("$"));
    }

    #[test]
    fn huge_counts_are_clamped() {
        let mut motions = VimMotions::default();
        for _ in 0..20 {
            motions.process_key("9");
        }
        assert_eq!(motions.get_count(), MAX_COUNT);
        match motions.process_key("l") {
            Some(MotionIntent::Move(motion)) => assert_eq!(motion.steps, MAX_COUNT),
            other => panic!("expected a move, got {other:?}"),
        }
    }
}
