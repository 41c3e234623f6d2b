//! In-memory node table standing in for a host view system.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anchorsheet_core::{NodeId, NodeTree, ScrollDirection};
use anchorsheet_ui_graphics::{Point, Size};

#[derive(Debug, Clone, Default)]
struct TestNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    position: Point,
    size: Size,
    scrolls_down: bool,
    scrolls_up: bool,
}

/// A flat table of nodes with parent links, positions and sizes.
///
/// Ids are handed out sequentially starting at 1 and never reused.
#[derive(Debug, Default)]
pub struct TestNodeTree {
    nodes: HashMap<NodeId, TestNode>,
    next_id: NodeId,
}

impl TestNodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the table for sharing with a sheet.
    pub fn into_shared(self) -> Rc<RefCell<TestNodeTree>> {
        Rc::new(RefCell::new(self))
    }

    pub fn add_root(&mut self, size: Size) -> NodeId {
        self.insert(None, Point::ZERO, size)
    }

    /// Adds `node` as the last child of `parent`. Unknown parents yield a
    /// detached node.
    pub fn add_child(&mut self, parent: NodeId, position: Point, size: Size) -> NodeId {
        let parent = self.nodes.contains_key(&parent).then_some(parent);
        self.insert(parent, position, size)
    }

    fn insert(&mut self, parent: Option<NodeId>, position: Point, size: Size) -> NodeId {
        self.next_id += 1;
        let id = self.next_id;
        self.nodes.insert(
            id,
            TestNode {
                parent,
                position,
                size,
                ..TestNode::default()
            },
        );
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.push(id);
        }
        id
    }

    /// Declares which directions `node` can still scroll in.
    pub fn set_scrollable(&mut self, node: NodeId, down: bool, up: bool) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.scrolls_down = down;
            node.scrolls_up = up;
        }
    }

    pub fn set_size(&mut self, node: NodeId, size: Size) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.size = size;
        }
    }

    /// Removes `node` and its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        let Some(removed) = self.nodes.remove(&node) else {
            return;
        };
        if let Some(parent) = removed.parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != node);
        }
        for child in removed.children {
            self.remove(child);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeTree for TestNodeTree {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|node| node.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn position(&self, node: NodeId) -> Point {
        self.nodes
            .get(&node)
            .map(|node| node.position)
            .unwrap_or_default()
    }

    fn set_position(&mut self, node: NodeId, position: Point) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.position = position;
        }
    }

    fn size(&self, node: NodeId) -> Size {
        self.nodes
            .get(&node)
            .map(|node| node.size)
            .unwrap_or_default()
    }

    fn can_scroll(&self, node: NodeId, direction: ScrollDirection) -> bool {
        self.nodes.get(&node).is_some_and(|node| match direction {
            ScrollDirection::Down => node.scrolls_down,
            ScrollDirection::Up => node.scrolls_up,
        })
    }
}
