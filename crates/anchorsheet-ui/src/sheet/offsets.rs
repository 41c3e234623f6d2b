//! The three resting offsets of the sheet and the geometry derived from them.
//!
//! All offsets are distances from the container's top edge to the child's top
//! edge. For any container height `H` they satisfy
//! `min <= anchor <= max <= H`; in non-degenerate configurations
//! `max == H - peek` and `anchor == max(H * threshold, min)` exactly, and the
//! clamps below only bite when the configuration cannot fit the container.

use crate::sheet::state::SheetState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SheetOffsets {
    pub min: i32,
    pub anchor: i32,
    pub max: i32,
    pub container_height: i32,
}

impl SheetOffsets {
    pub fn compute(
        container_height: i32,
        peek_height: i32,
        min_offset: i32,
        anchor_threshold: f32,
    ) -> Self {
        let height = container_height.max(0);
        let min = min_offset.max(0).min(height);
        let max = (height - peek_height.max(0)).clamp(min, height);
        let anchor = ((height as f32 * anchor_threshold) as i32).max(min).min(max);
        Self {
            min,
            anchor,
            max,
            container_height: height,
        }
    }

    /// Top of the child when resting in `state`; `None` for the transient
    /// states, which have no offset of their own.
    pub fn offset_for(&self, state: SheetState) -> Option<i32> {
        match state {
            SheetState::Expanded => Some(self.min),
            SheetState::Collapsed => Some(self.max),
            SheetState::Anchor => Some(self.anchor),
            SheetState::Hidden | SheetState::ForceHidden => Some(self.container_height),
            SheetState::Dragging | SheetState::Settling => None,
        }
    }

    /// Restricts a dragged top to `[min, H]` when hideable, else `[min, max]`.
    pub fn clamp_vertical(&self, top: i32, hideable: bool) -> i32 {
        let lower_limit = if hideable {
            self.container_height
        } else {
            self.max
        };
        lower_limit.min(self.min.max(top))
    }

    /// Distance the child can travel while dragged.
    pub fn drag_range(&self, hideable: bool) -> i32 {
        if hideable {
            self.container_height - self.min
        } else {
            self.max - self.min
        }
    }

    /// Slide fraction for `top`: 1 at min, 0 at max, -1 at the container
    /// height. Each side of `max` is normalised by its own span.
    pub fn slide_fraction(&self, top: i32) -> f32 {
        let span = if top > self.max {
            self.container_height - self.max
        } else {
            self.max - self.min
        };
        if span <= 0 {
            return 0.0;
        }
        (self.max - top) as f32 / span as f32
    }
}
