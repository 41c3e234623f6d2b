//! Tween specs and the frame-driven value animator.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anchorsheet_core::{FrameCallbackRegistration, FrameClock};

/// Linear interpolation towards a target.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

/// Curve applied to the linear time fraction of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    #[default]
    LinearEasing,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// `cubic-bezier(0.4, 0, 0.2, 1)`, the material standard curve.
    FastOutSlowInEasing,
}

impl Easing {
    pub fn transform(&self, fraction: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            Easing::LinearEasing => fraction,
            Easing::EaseInOut => CubicBezier::new(0.42, 0.0, 0.58, 1.0).solve(fraction),
            Easing::FastOutSlowInEasing => CubicBezier::new(0.4, 0.0, 0.2, 1.0).solve(fraction),
        }
    }
}

/// Bezier from `(0, 0)` to `(1, 1)` with two control points, in polynomial
/// form per axis.
struct CubicBezier {
    x: [f32; 3],
    y: [f32; 3],
}

impl CubicBezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: Self::coefficients(x1, x2),
            y: Self::coefficients(y1, y2),
        }
    }

    fn coefficients(p1: f32, p2: f32) -> [f32; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        [1.0 - c - b, b, c]
    }

    fn sample([a, b, c]: [f32; 3], t: f32) -> f32 {
        ((a * t + b) * t + c) * t
    }

    /// Height of the curve at horizontal position `x`. The x polynomial is
    /// monotone on `[0, 1]`, so bisection always converges.
    fn solve(&self, x: f32) -> f32 {
        if x <= 0.0 || x >= 1.0 {
            return x;
        }
        let (mut low, mut high) = (0.0f32, 1.0f32);
        let mut t = x;
        for _ in 0..24 {
            let error = Self::sample(self.x, t) - x;
            if error.abs() < 1e-6 {
                break;
            }
            if error > 0.0 {
                high = t;
            } else {
                low = t;
            }
            t = (low + high) * 0.5;
        }
        Self::sample(self.y, t)
    }
}

/// Duration, easing and repetition of a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub duration_millis: u64,
    pub easing: Easing,
    /// Extra plays after the first; `0` plays once.
    pub repeat_count: u32,
}

impl AnimationSpec {
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
            repeat_count: 0,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::LinearEasing)
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    /// Eased fraction `elapsed_nanos` into the tween. A zero duration is
    /// complete immediately.
    fn fraction_at(&self, elapsed_nanos: u64) -> f32 {
        let duration_nanos = self.duration_millis.saturating_mul(1_000_000);
        if elapsed_nanos >= duration_nanos {
            return 1.0;
        }
        self.easing
            .transform(elapsed_nanos as f32 / duration_nanos as f32)
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::linear(300)
    }
}

#[derive(Default)]
struct AnimatorState {
    /// Bumped by every start and cancel. A tick whose run is older bails.
    run: Cell<u64>,
    running: Cell<bool>,
    pending_frame: RefCell<Option<FrameCallbackRegistration>>,
}

impl AnimatorState {
    fn is_current(&self, run: u64) -> bool {
        self.run.get() == run
    }
}

/// Drives one tween at a time off a [`FrameClock`].
///
/// Starting a tween supersedes the one in flight, including from inside the
/// old tween's own update callback.
#[derive(Clone)]
pub struct ValueAnimator {
    state: Rc<AnimatorState>,
    frame_clock: FrameClock,
}

impl ValueAnimator {
    pub fn new(frame_clock: FrameClock) -> Self {
        Self {
            state: Rc::default(),
            frame_clock,
        }
    }

    /// Starts a tween. `on_update` gets the eased fraction on every frame,
    /// starting with `0.0` on the first one and ending with exactly `1.0`.
    pub fn start<F>(&self, spec: AnimationSpec, on_update: F)
    where
        F: FnMut(f32) + 'static,
    {
        self.cancel();
        self.state.running.set(true);
        let tween = Tween {
            run: self.state.run.get(),
            spec,
            started_at: None,
            plays_left: spec.repeat_count,
            on_update,
        };
        tween.request_frame(self.state.clone(), self.frame_clock.clone());
    }

    pub fn cancel(&self) {
        self.state.run.set(self.state.run.get() + 1);
        self.state.running.set(false);
        let pending = self.state.pending_frame.borrow_mut().take();
        drop(pending);
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }
}

struct Tween<F> {
    run: u64,
    spec: AnimationSpec,
    started_at: Option<u64>,
    plays_left: u32,
    on_update: F,
}

impl<F> Tween<F>
where
    F: FnMut(f32) + 'static,
{
    fn request_frame(mut self, state: Rc<AnimatorState>, clock: FrameClock) {
        let next_clock = clock.clone();
        let tick_state = state.clone();
        let registration = clock.with_frame_nanos(move |now| {
            if !tick_state.is_current(self.run) {
                return;
            }
            let started_at = *self.started_at.get_or_insert(now);
            let fraction = self.spec.fraction_at(now.saturating_sub(started_at));
            (self.on_update)(fraction);

            if !tick_state.is_current(self.run) {
                return;
            }
            if fraction >= 1.0 && self.plays_left > 0 {
                self.plays_left -= 1;
                self.started_at = Some(now);
                self.request_frame(tick_state, next_clock);
            } else if fraction >= 1.0 {
                tick_state.running.set(false);
                tick_state.pending_frame.borrow_mut().take();
            } else {
                self.request_frame(tick_state, next_clock);
            }
        });
        *state.pending_frame.borrow_mut() = Some(registration);
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
