pub mod drag;

pub use drag::{clamp_magnitude, DragCallback, DragGesture, DragRelease, DragState};
