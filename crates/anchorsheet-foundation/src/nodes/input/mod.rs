pub mod gestures;
pub mod pointer_track;
pub mod types;

pub use pointer_track::{PointerTrack, PointerTracks};
pub use types::{PointerEvent, PointerEventKind, PointerId};

pub mod prelude {
    pub use super::pointer_track::{PointerTrack, PointerTracks};
    pub use super::types::{PointerEvent, PointerEventKind, PointerId};
}
