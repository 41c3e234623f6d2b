//! Decides, per touch sequence, whether the sheet or a nested scrollable
//! owns the gesture.

use anchorsheet_core::{NodeId, NodeTree, ScrollDirection};
use anchorsheet_foundation::{PointerEvent, PointerEventKind};
use anchorsheet_ui_graphics::Point;
use smallvec::SmallVec;

use crate::sheet::state::SheetState;

/// The roots of the scrollable subtrees inside the sheet's child, in
/// depth-first order.
#[derive(Debug, Default, Clone)]
pub struct ScrollableRegistry {
    nodes: SmallVec<[NodeId; 4]>,
}

impl ScrollableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the registry with the scrollables found under `root`.
    pub fn rebuild(&mut self, tree: &dyn NodeTree, root: NodeId) {
        self.nodes = tree.find_scrollables(root).into_iter().collect();
        log::trace!("scrollables under {root}: {:?}", self.nodes);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First registered scrollable that contains `point`, edges included.
    /// Nodes that left the tree are skipped.
    pub fn scrollable_at(
        &self,
        point: Point,
        tree: &dyn NodeTree,
        container: NodeId,
    ) -> Option<NodeId> {
        self.nodes.iter().copied().find(|&node| {
            tree.contains(node) && tree.bounds_in(node, container).contains(point.x, point.y)
        })
    }
}

/// Who the current touch sequence belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureOwner {
    /// No sequence in progress.
    #[default]
    Unassigned,
    /// Events go to the drag recognizer.
    Sheet,
    /// The sequence started on a scrollable; the first move decides. The
    /// sheet may already be dragging if the scrollable was at its top.
    Tentative(NodeId),
    /// The scrollable keeps the sequence; the sheet sees none of it.
    Scrollable(NodeId),
}

/// What the coordinator does with one event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arbitration {
    Forward,
    /// The sheet just won a tentative sequence: replay the held `Down`, then
    /// forward the event.
    ForwardWithReplay(PointerEvent),
    /// The scrollable won a sequence the sheet had already started: cancel
    /// the sheet's drag with this event, then suppress the rest.
    Yield(PointerEvent),
    Suppress,
}

#[derive(Debug, Default)]
pub struct ScrollArbiter {
    owner: GestureOwner,
    /// The `Down` of a tentative sequence.
    down: Option<PointerEvent>,
    /// Whether that `Down` was kept from the sheet.
    holding: bool,
}

impl ScrollArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> GestureOwner {
        self.owner
    }

    pub fn reset(&mut self) {
        self.owner = GestureOwner::Unassigned;
        self.down = None;
        self.holding = false;
    }

    /// Routes `event`. Arbitration only starts on a `Down` while the sheet is
    /// expanded; every other sequence belongs to the sheet.
    ///
    /// A `Down` on a scrollable that can still scroll down is held back from
    /// the sheet. On one already at its top the sheet gets the `Down` too,
    /// since a downward drag there moves the sheet.
    pub fn arbitrate(
        &mut self,
        event: &PointerEvent,
        state: SheetState,
        registry: &ScrollableRegistry,
        tree: &dyn NodeTree,
        container: NodeId,
    ) -> Arbitration {
        if event.starts_sequence() {
            self.reset();
            if state == SheetState::Expanded {
                if let Some(node) = registry.scrollable_at(event.position, tree, container) {
                    self.owner = GestureOwner::Tentative(node);
                    self.down = Some(*event);
                    self.holding = tree.can_scroll(node, ScrollDirection::Down);
                    log::trace!(
                        "down on scrollable {node} (held: {}): first move decides",
                        self.holding
                    );
                    return if self.holding {
                        Arbitration::Suppress
                    } else {
                        Arbitration::Forward
                    };
                }
            }
            self.owner = GestureOwner::Sheet;
            return Arbitration::Forward;
        }

        let decision = match (self.owner, event.kind) {
            (GestureOwner::Tentative(node), PointerEventKind::Move) => self.resolve(node, event),
            (GestureOwner::Tentative(_), _) if !self.holding => Arbitration::Forward,
            (GestureOwner::Tentative(_) | GestureOwner::Scrollable(_), _) => Arbitration::Suppress,
            (GestureOwner::Sheet | GestureOwner::Unassigned, _) => Arbitration::Forward,
        };
        if event.ends_sequence() {
            self.reset();
        }
        decision
    }

    fn resolve(&mut self, node: NodeId, event: &PointerEvent) -> Arbitration {
        let holding = self.holding;
        let Some(down) = self.down.filter(|down| down.id == event.id) else {
            return if holding {
                Arbitration::Suppress
            } else {
                Arbitration::Forward
            };
        };
        let delta_y = event.position.y - down.position.y;
        self.down = None;
        self.holding = false;
        if delta_y <= 0.0 {
            log::trace!("scrollable {node} keeps the sequence (dy={delta_y})");
            self.owner = GestureOwner::Scrollable(node);
            if holding {
                Arbitration::Suppress
            } else {
                let mut cancel = *event;
                cancel.kind = PointerEventKind::Cancel;
                Arbitration::Yield(cancel)
            }
        } else {
            log::trace!("sheet takes the sequence from scrollable {node} (dy={delta_y})");
            self.owner = GestureOwner::Sheet;
            if holding {
                Arbitration::ForwardWithReplay(down)
            } else {
                Arbitration::Forward
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorsheet_ui_graphics::Size;
    use std::collections::HashMap;

    const CONTAINER: NodeId = 1;
    const CHILD: NodeId = 2;
    const LIST: NodeId = 3;
    const LIST_ITEM: NodeId = 4;
    const HEADER: NodeId = 5;

    /// Child at the container's top; a 400x600 list at (0, 100) inside it.
    struct Tree {
        list_can_scroll_down: bool,
        parents: HashMap<NodeId, NodeId>,
    }

    impl Tree {
        fn new(list_can_scroll_down: bool) -> Self {
            let parents = HashMap::from([
                (CHILD, CONTAINER),
                (HEADER, CHILD),
                (LIST, CHILD),
                (LIST_ITEM, LIST),
            ]);
            Self {
                list_can_scroll_down,
                parents,
            }
        }
    }

    impl NodeTree for Tree {
        fn contains(&self, node: NodeId) -> bool {
            node == CONTAINER || self.parents.contains_key(&node)
        }

        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.parents.get(&node).copied()
        }

        fn children(&self, node: NodeId) -> Vec<NodeId> {
            match node {
                CONTAINER => vec![CHILD],
                CHILD => vec![HEADER, LIST],
                LIST => vec![LIST_ITEM],
                _ => Vec::new(),
            }
        }

        fn position(&self, node: NodeId) -> Point {
            match node {
                LIST => Point::new(0.0, 100.0),
                _ => Point::ZERO,
            }
        }

        fn set_position(&mut self, _node: NodeId, _position: Point) {}

        fn size(&self, node: NodeId) -> Size {
            match node {
                LIST => Size::new(400.0, 600.0),
                HEADER => Size::new(400.0, 100.0),
                _ => Size::new(400.0, 1000.0),
            }
        }

        fn can_scroll(&self, node: NodeId, direction: ScrollDirection) -> bool {
            match (node, direction) {
                (LIST, ScrollDirection::Down) => self.list_can_scroll_down,
                (LIST, ScrollDirection::Up) | (LIST_ITEM, _) => true,
                _ => false,
            }
        }
    }

    fn event(kind: PointerEventKind, y: f32) -> PointerEvent {
        PointerEvent::new(kind, Point::new(50.0, y))
    }

    struct Fixture {
        tree: Tree,
        registry: ScrollableRegistry,
        arbiter: ScrollArbiter,
    }

    impl Fixture {
        fn new(list_can_scroll_down: bool) -> Self {
            let tree = Tree::new(list_can_scroll_down);
            let mut registry = ScrollableRegistry::new();
            registry.rebuild(&tree, CHILD);
            Self {
                tree,
                registry,
                arbiter: ScrollArbiter::new(),
            }
        }

        fn send(&mut self, event: PointerEvent, state: SheetState) -> Arbitration {
            self.arbiter
                .arbitrate(&event, state, &self.registry, &self.tree, CONTAINER)
        }
    }

    #[test]
    fn registry_keeps_only_the_outermost_scrollable() {
        let fixture = Fixture::new(true);
        assert_eq!(fixture.registry.nodes(), &[LIST]);
    }

    #[test]
    fn collapsed_sheet_owns_every_sequence() {
        let mut fixture = Fixture::new(true);
        let down = fixture.send(event(PointerEventKind::Down, 300.0), SheetState::Collapsed);
        assert_eq!(down, Arbitration::Forward);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Sheet);
    }

    #[test]
    fn upward_first_move_hands_the_sequence_to_the_scrollable() {
        let mut fixture = Fixture::new(true);
        let state = SheetState::Expanded;

        let down = fixture.send(event(PointerEventKind::Down, 300.0), state);
        assert_eq!(down, Arbitration::Suppress);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Tentative(LIST));

        let first = fixture.send(event(PointerEventKind::Move, 290.0), state);
        assert_eq!(first, Arbitration::Suppress);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Scrollable(LIST));

        // Later downward moves stay with the scrollable.
        let later = fixture.send(event(PointerEventKind::Move, 400.0), state);
        assert_eq!(later, Arbitration::Suppress);

        let up = fixture.send(event(PointerEventKind::Up, 400.0), state);
        assert_eq!(up, Arbitration::Suppress);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Unassigned);
    }

    #[test]
    fn downward_first_move_returns_the_sequence_to_the_sheet() {
        let mut fixture = Fixture::new(true);
        let state = SheetState::Expanded;
        let down = event(PointerEventKind::Down, 300.0);

        fixture.send(down, state);
        let first = fixture.send(event(PointerEventKind::Move, 320.0), state);
        assert_eq!(first, Arbitration::ForwardWithReplay(down));
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Sheet);

        let up = fixture.send(event(PointerEventKind::Up, 320.0), state);
        assert_eq!(up, Arbitration::Forward);
    }

    #[test]
    fn scrollable_at_its_top_shares_the_down_with_the_sheet() {
        let mut fixture = Fixture::new(false);
        let state = SheetState::Expanded;

        let down = fixture.send(event(PointerEventKind::Down, 300.0), state);
        assert_eq!(down, Arbitration::Forward);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Tentative(LIST));

        let first = fixture.send(event(PointerEventKind::Move, 320.0), state);
        assert_eq!(first, Arbitration::Forward);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Sheet);
    }

    #[test]
    fn upward_swipe_on_a_scrollable_at_its_top_cancels_the_sheet_drag() {
        let mut fixture = Fixture::new(false);
        let state = SheetState::Expanded;

        fixture.send(event(PointerEventKind::Down, 300.0), state);
        let first = fixture.send(event(PointerEventKind::Move, 250.0), state);
        let Arbitration::Yield(cancel) = first else {
            panic!("expected the sheet to yield, got {first:?}");
        };
        assert_eq!(cancel.kind, PointerEventKind::Cancel);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Scrollable(LIST));

        let up = fixture.send(event(PointerEventKind::Up, 200.0), state);
        assert_eq!(up, Arbitration::Suppress);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Unassigned);
    }

    #[test]
    fn tap_on_a_scrollable_at_its_top_reaches_the_sheet() {
        let mut fixture = Fixture::new(false);
        let state = SheetState::Expanded;

        fixture.send(event(PointerEventKind::Down, 300.0), state);
        let up = fixture.send(event(PointerEventKind::Up, 300.0), state);
        assert_eq!(up, Arbitration::Forward);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Unassigned);
    }

    #[test]
    fn down_outside_every_scrollable_goes_to_the_sheet() {
        let mut fixture = Fixture::new(true);

        let header = fixture.send(event(PointerEventKind::Down, 50.0), SheetState::Expanded);
        assert_eq!(header, Arbitration::Forward);
        // The list's far edge counts as inside.
        let edge = fixture.send(event(PointerEventKind::Down, 700.0), SheetState::Expanded);
        assert_eq!(edge, Arbitration::Suppress);
    }

    #[test]
    fn cancel_while_tentative_is_suppressed_and_resets() {
        let mut fixture = Fixture::new(true);
        let state = SheetState::Expanded;

        fixture.send(event(PointerEventKind::Down, 300.0), state);
        let cancel = fixture.send(event(PointerEventKind::Cancel, 300.0), state);
        assert_eq!(cancel, Arbitration::Suppress);
        assert_eq!(fixture.arbiter.owner(), GestureOwner::Unassigned);
    }
}
