//! UI layer of the anchor sheet.
//!
//! [`AnchorSheet`] is the entry point: construct it over a container node of
//! the host tree, attach the one child, lay it out, then feed it touch events
//! and drain frames on the runtime that owns its frame clock.

pub mod sheet;

pub use sheet::*;

// Re-export the pieces hosts touch alongside the sheet.
pub use anchorsheet_animation::Easing;
pub use anchorsheet_core::{FrameClock, NodeId, NodeTree, Runtime, SharedNodeTree, SheetError};
pub use anchorsheet_foundation::{DragState, PointerEvent, PointerEventKind};
pub use anchorsheet_ui_graphics::{Point, Rect, Size};

pub mod prelude {
    pub use crate::sheet::{AnchorSheet, GestureOwner, SheetConfig, SheetState};
    pub use anchorsheet_core::prelude::*;
    pub use anchorsheet_foundation::{DragState, PointerEvent, PointerEventKind};
    pub use anchorsheet_ui_graphics::{Point, Size};
}
