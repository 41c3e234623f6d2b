//! Foundation elements for the anchor sheet: pointer input, velocity
//! tracking and the drag recognizer.

pub mod gesture_constants;
pub mod nodes;
pub mod velocity_tracker;

pub use nodes::input::gestures::{clamp_magnitude, DragCallback, DragGesture, DragRelease, DragState};
pub use nodes::input::{PointerEvent, PointerEventKind, PointerId, PointerTrack, PointerTracks};
pub use velocity_tracker::{AxisVelocityTracker, VelocityEstimator, VelocityTracker};

pub mod prelude {
    pub use crate::gesture_constants::*;
    pub use crate::nodes::input::gestures::{DragCallback, DragGesture, DragRelease, DragState};
    pub use crate::nodes::input::prelude::*;
    pub use crate::velocity_tracker::{VelocityEstimator, VelocityTracker};
}
