use std::cell::RefCell;
use std::rc::Rc;

use anchorsheet_core::{NodeId, Runtime, RuntimeHandle, SheetError};
use anchorsheet_ui::{AnchorSheet, PointerEvent, SheetConfig, SheetState};
use anchorsheet_ui_graphics::{Point, Size};

use crate::node_tree::TestNodeTree;
use crate::robot::GestureRobot;

/// Nanoseconds between frames driven by [`SheetTestRule::advance_frame`].
pub const FRAME_INTERVAL_NANOS: u64 = 16_000_000;

/// Frames [`SheetTestRule::wait_for_idle`] drains before giving up.
const MAX_IDLE_FRAMES: usize = 1_000;

/// Headless harness for exercising an [`AnchorSheet`] in tests.
///
/// The rule owns the runtime whose frame clock drives settles, an in-memory
/// node table holding a container and the sheet's child, and the sheet
/// itself, attached and laid out. Frames are drained on demand with a fixed
/// 16ms step so tests control time completely.
pub struct SheetTestRule {
    runtime: Runtime,
    tree: Rc<RefCell<TestNodeTree>>,
    sheet: AnchorSheet,
    container: NodeId,
    child: NodeId,
    size: Size,
    frame_time_nanos: u64,
}

impl SheetTestRule {
    /// A sheet in a `width` x `height` container whose child fills the
    /// container.
    pub fn new(width: f32, height: f32, config: SheetConfig) -> Result<Self, SheetError> {
        Self::with_content(width, height, config, |_, _| {})
    }

    /// Like [`SheetTestRule::new`], letting `content` populate the child
    /// before the sheet is laid out. `content` receives the tree and the
    /// child's id.
    pub fn with_content(
        width: f32,
        height: f32,
        config: SheetConfig,
        content: impl FnOnce(&mut TestNodeTree, NodeId),
    ) -> Result<Self, SheetError> {
        let size = Size::new(width, height);
        let mut table = TestNodeTree::new();
        let container = table.add_root(size);
        let child = table.add_child(container, Point::ZERO, size);
        content(&mut table, child);
        let tree = table.into_shared();

        let runtime = Runtime::default();
        let sheet = AnchorSheet::new(
            tree.clone(),
            container,
            config,
            runtime.handle().frame_clock(),
        );
        sheet.attach_child(child)?;
        sheet.layout(size);
        Ok(Self {
            runtime,
            tree,
            sheet,
            container,
            child,
            size,
            frame_time_nanos: 0,
        })
    }

    pub fn sheet(&self) -> &AnchorSheet {
        &self.sheet
    }

    pub fn tree(&self) -> Rc<RefCell<TestNodeTree>> {
        self.tree.clone()
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.frame_time_nanos
    }

    /// A robot driving touch sequences into this rule's sheet.
    pub fn robot(&self) -> GestureRobot {
        GestureRobot::new(&self.sheet)
    }

    pub fn send(&self, event: &PointerEvent) -> Result<(), SheetError> {
        self.sheet.process_touch_event(event)
    }

    pub fn set_state(&self, state: SheetState) -> Result<(), SheetError> {
        self.sheet.set_state(state)
    }

    /// Lays the sheet out again at the size it was created with.
    pub fn relayout(&self) {
        self.sheet.layout(self.size);
    }

    /// Moves the clock forward one frame and runs the callbacks waiting on
    /// it.
    pub fn advance_frame(&mut self) {
        self.frame_time_nanos += FRAME_INTERVAL_NANOS;
        self.runtime
            .handle()
            .drain_frame_callbacks(self.frame_time_nanos);
    }

    /// Drains frames until no callback is pending and returns how many were
    /// needed.
    pub fn wait_for_idle(&mut self) -> usize {
        let mut frames = 0;
        while self.runtime.handle().has_frame_callbacks() {
            frames += 1;
            if frames > MAX_IDLE_FRAMES {
                panic!("wait_for_idle looped too many times!");
            }
            self.advance_frame();
        }
        frames
    }

    /// Current top of the child in container coordinates.
    pub fn child_top(&self) -> f32 {
        self.sheet.child_top().unwrap_or(f32::NAN)
    }

    pub fn state(&self) -> SheetState {
        self.sheet.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rule_rests_collapsed_at_the_peek_offset() {
        let rule = SheetTestRule::new(400.0, 1000.0, SheetConfig::default()).expect("rule");
        assert_eq!(rule.state(), SheetState::Collapsed);
        assert_eq!(rule.child_top(), 783.0);
        assert!(!rule.runtime_handle().has_frame_callbacks());
    }

    #[test]
    fn wait_for_idle_drains_a_settle() {
        let mut rule = SheetTestRule::new(400.0, 1000.0, SheetConfig::default()).expect("rule");
        rule.set_state(SheetState::Expanded).expect("expand");

        let frames = rule.wait_for_idle();

        assert!(frames > 1);
        assert_eq!(rule.child_top(), 0.0);
        assert_eq!(rule.frame_time_nanos(), frames as u64 * FRAME_INTERVAL_NANOS);
    }
}
