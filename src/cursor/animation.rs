//! Cooperative, single-flight interpolation of the hero across a counted move.
//!
//! One `tick` is one rendered frame. Long moves advance several logical steps
//! per frame so every animation finishes within a fixed wall-time budget.

use crate::shared::*;

pub const DEFAULT_BUDGET_MS: u32 = 64;
pub const DEFAULT_FRAME_MS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
struct AnimationRun {
    from: Coord,
    d_row: f64,
    d_col: f64,
    steps: u32,
    done: u32,
    steps_per_frame: u32,
}

impl AnimationRun {
    fn position_at(&self, step: u32) -> Coord {
        let i = step as f64;
        Coord::new(
            round_half_up(self.from.row as f64 + self.d_row * i) as i32,
            round_half_up(self.from.col as f64 + self.d_col * i) as i32,
        )
    }
}

/// What one frame produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Where the hero is drawn after this frame.
    pub position: Coord,
    /// Every intermediate cell entered this frame, in order.
    pub traversed: Vec<Coord>,
    /// The last step was taken; the run is over and the lock released.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSystem {
    run: Option<AnimationRun>,
    budget_ms: u32,
    frame_ms: u32,
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::with_budget(DEFAULT_BUDGET_MS, DEFAULT_FRAME_MS)
    }
}

impl AnimationSystem {
    pub fn with_budget(budget_ms: u32, frame_ms: u32) -> Self {
        Self {
            run: None,
            budget_ms: budget_ms.max(1),
            frame_ms: frame_ms.max(1),
        }
    }

    /// Logical steps advanced per frame so `steps` fit in the budget.
    pub fn steps_per_frame(&self, steps: u32) -> u32 {
        let frames_target = round_half_up(self.budget_ms as f64 / self.frame_ms as f64).max(1) as u32;
        steps.div_ceil(frames_target).max(1)
    }

    /// Starts a run from `from` to `to` over `steps` steps. Refused (false)
    /// while another run is in flight or when there is nothing to animate.
    pub fn animate_movement(&mut self, from: Coord, to: Coord, steps: u32) -> bool {
        if self.is_animating() || steps == 0 {
            return false;
        }
        self.run = Some(AnimationRun {
            from,
            d_row: (to.row - from.row) as f64 / steps as f64,
            d_col: (to.col - from.col) as f64 / steps as f64,
            steps,
            done: 0,
            steps_per_frame: self.steps_per_frame(steps),
        });
        true
    }

    /// Advances one frame. `None` when idle.
    pub fn tick(&mut self) -> Option<AnimationFrame> {
        let run = self.run.as_mut()?;

        let mut traversed = Vec::with_capacity(run.steps_per_frame as usize);
        while traversed.len() < run.steps_per_frame as usize && run.done < run.steps {
            run.done += 1;
            traversed.push(run.position_at(run.done));
        }

        let position = run.position_at(run.done);
        let finished = run.done >= run.steps;
        if finished {
            self.run = None;
        }

        Some(AnimationFrame {
            position,
            traversed,
            finished,
        })
    }

    /// Callback form of [`tick`](Self::tick): `on_step` gets the frame's
    /// position, `on_complete` runs once after the final step. Returns
    /// whether a frame was produced.
    pub fn tick_with(&mut self, mut on_step: impl FnMut(Coord), on_complete: impl FnOnce()) -> bool {
        let Some(frame) = self.tick() else {
            return false;
        };
        on_step(frame.position);
        if frame.finished {
            on_complete();
        }
        true
    }

    /// Aborts the run in flight without completing it. Returns whether
    /// there was one.
    pub fn cancel_animation(&mut self) -> bool {
        self.run.take().is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    /// `(steps done, total steps)` of the run in flight.
    pub fn progress(&self) -> Option<(u32, u32)> {
        self.run.map(|run| (run.done, run.steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_batched_to_fit_the_budget() {
        let anim = AnimationSystem::default();
        assert_eq!(anim.steps_per_frame(2), 1);
        assert_eq!(anim.steps_per_frame(4), 1);
        assert_eq!(anim.steps_per_frame(5), 2);
        assert_eq!(anim.steps_per_frame(40), 10);
    }

    #[test]
    fn run_visits_every_cell_and_finishes_once() {
        let mut anim = AnimationSystem::default();
        let from = Coord::new(5, 1);
        assert!(anim.animate_movement(from, Coord::new(5, 6), 5));

        let mut traversed = Vec::new();
        let mut frames = 0;
        while let Some(frame) = anim.tick() {
            frames += 1;
            traversed.extend(frame.traversed);
            if frame.finished {
                assert_eq!(frame.position, Coord::new(5, 6));
            }
        }
        assert_eq!(frames, 3, "5 steps at 2 per frame");
        assert_eq!(traversed, from.walk(0, 1, 5).collect::<Vec<_>>());
        assert!(!anim.is_animating());
    }

    #[test]
    fn second_run_is_refused_while_one_is_in_flight() {
        let mut anim = AnimationSystem::default();
        assert!(anim.animate_movement(Coord::new(0, 0), Coord::new(3, 0), 3));
        assert!(!anim.animate_movement(Coord::new(0, 0), Coord::new(0, 3), 3));
        assert_eq!(anim.progress(), Some((0, 3)));
    }

    #[test]
    fn cancel_stops_at_the_last_frame_without_completing() {
        let mut anim = AnimationSystem::default();
        anim.animate_movement(Coord::new(1, 1), Coord::new(1, 4), 3);

        let mut last = None;
        let mut completed = false;
        assert!(anim.tick_with(|at| last = Some(at), || completed = true));
        assert_eq!(last, Some(Coord::new(1, 2)));

        assert!(anim.cancel_animation());
        assert!(!anim.is_animating());
        assert!(!anim.tick_with(|at| last = Some(at), || completed = true));
        assert!(!completed);
        assert_eq!(last, Some(Coord::new(1, 2)));

        // The lock is released: a new run starts immediately.
        assert!(anim.animate_movement(Coord::new(1, 2), Coord::new(1, 1), 1));
        assert!(anim.is_animating());
    }

    #[test]
    fn zero_step_runs_are_refused() {
        let mut anim = AnimationSystem::default();
        assert!(!anim.animate_movement(Coord::new(0, 0), Coord::new(0, 0), 0));
        assert!(anim.tick().is_none());
    }
}
