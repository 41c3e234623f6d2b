//! Pure geometry for the anchor sheet crates
//!
//! Points, sizes and rectangles shared by the pointer input layer and the
//! sheet controller. Nothing in here knows about nodes or gestures.

mod geometry;

pub use geometry::*;

pub mod prelude {
    pub use crate::geometry::{Point, Rect, Size};
}
