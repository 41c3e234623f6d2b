//! The host view system, seen through the narrow interface the sheet needs.

use std::cell::RefCell;
use std::rc::Rc;

use anchorsheet_ui_graphics::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::{NodeId, SheetError};

/// Vertical scroll direction queried on scrollable descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Content can move further down (more content above the viewport).
    Down,
    /// Content can move further up (more content below the viewport).
    Up,
}

/// Node geometry and tree traversal provided by the host.
///
/// Positions are the node's content position in its parent's coordinate
/// space. The sheet only ever mutates the position of the one child it hosts.
pub trait NodeTree {
    /// Whether `node` is still alive in the host table.
    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in drawing order (last child is top-most).
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn position(&self, node: NodeId) -> Point;

    fn set_position(&mut self, node: NodeId, position: Point);

    fn size(&self, node: NodeId) -> Size;

    fn can_scroll(&self, node: NodeId, direction: ScrollDirection) -> bool;

    fn bounds(&self, node: NodeId) -> Rect {
        Rect::from_origin_size(self.position(node), self.size(node))
    }

    /// Bounds of `node` in the coordinate space of `ancestor`, accumulating
    /// the positions of every node in between.
    fn bounds_in(&self, node: NodeId, ancestor: NodeId) -> Rect {
        let mut origin = self.position(node);
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                break;
            }
            origin = origin + self.position(parent);
            current = self.parent(parent);
        }
        Rect::from_origin_size(origin, self.size(node))
    }

    /// Walks parents from `node` up to the root looking for `ancestor`.
    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Depth-first search for the roots of scrollable subtrees below `root`.
    ///
    /// A node qualifies when it can scroll in either vertical direction; once
    /// a node qualifies its own descendants are not visited.
    fn find_scrollables(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(root);
        while let Some(node) = stack.pop() {
            if self.can_scroll(node, ScrollDirection::Down) || self.can_scroll(node, ScrollDirection::Up)
            {
                found.push(node);
                continue;
            }
            // Reverse so the first child is visited first.
            stack.extend(self.children(node).into_iter().rev());
        }
        found
    }

    /// Fails with `InvalidArgument` unless `node` lives under `container`.
    fn require_descendant(&self, node: NodeId, container: NodeId) -> Result<(), SheetError> {
        if self.contains(node) && self.is_descendant_of(node, container) {
            Ok(())
        } else {
            Err(SheetError::not_a_child(node, container))
        }
    }
}

/// The host tree shared between the host and the sheet on the UI thread.
pub type SharedNodeTree = Rc<RefCell<dyn NodeTree>>;
