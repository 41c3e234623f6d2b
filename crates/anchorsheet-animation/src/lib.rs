//! Animation system for the anchor sheet
//!
//! Time-based tweens driven by the frame clock. The sheet's settle motion is
//! a single [`ValueAnimator`] reporting a fraction in `[0, 1]` every frame.

mod animation;

pub use animation::*;

pub mod prelude {
    pub use crate::animation::{AnimationSpec, Easing, Lerp, ValueAnimator};
}
