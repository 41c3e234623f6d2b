//! The anchor sheet coordinator.
//!
//! [`AnchorSheet`] hosts exactly one child inside a container node of the
//! host tree. Touch events flow through the [`ScrollArbiter`] into the drag
//! recognizer, whose callbacks land in the [`SheetController`]; releases and
//! programmatic [`AnchorSheet::set_state`] calls start a settle on the
//! [`ValueAnimator`], whose ticks move the child until it rests.
//!
//! Observers are notified only after the sheet's own state is consistent and
//! no internal borrow is held, so a handler may call back into the sheet. A
//! call made from inside a handler queues its notifications behind the ones
//! still being delivered.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use anchorsheet_animation::{AnimationSpec, ValueAnimator};
use anchorsheet_core::{FrameClock, NodeId, NodeTree, SharedNodeTree, SheetError};
use anchorsheet_foundation::{DragGesture, DragState, PointerEvent};
use anchorsheet_ui_graphics::{Point, Size};

use crate::sheet::config::SheetConfig;
use crate::sheet::controller::{SettlePlan, SheetController, SheetEvent};
use crate::sheet::scroll_arbiter::{
    Arbitration, GestureOwner, ScrollArbiter, ScrollableRegistry,
};
use crate::sheet::state::SheetState;

type StateChangedHandler = Box<dyn FnMut(NodeId, SheetState)>;
type SlideHandler = Box<dyn FnMut(NodeId, f32)>;

struct SheetInner {
    tree: SharedNodeTree,
    container: NodeId,
    controller: SheetController,
    /// Created by the first layout.
    drag: Option<DragGesture>,
    arbiter: ScrollArbiter,
    registry: ScrollableRegistry,
    animator: ValueAnimator,
}

impl SheetInner {
    /// Feeds one event to the recognizer. Down events the hit-test missed
    /// still capture the child when they land on its bounds.
    fn forward(&mut self, event: &PointerEvent, child: NodeId) {
        let SheetInner {
            tree,
            container,
            controller,
            drag,
            animator,
            ..
        } = self;
        let Some(drag) = drag.as_mut() else {
            return;
        };
        let mut tree = tree.borrow_mut();
        drag.process_event(event, &mut *tree, controller);

        if event.starts_sequence()
            && !drag.is_dragging()
            && controller.state() != SheetState::Dragging
            && tree
                .bounds_in(child, *container)
                .contains(event.position.x, event.position.y)
        {
            if let Err(err) = drag.capture_target(child, &*tree, controller) {
                log::warn!("could not capture the sheet child: {err}");
            }
        }
        if drag.is_dragging() && animator.is_running() {
            log::trace!("drag capture supersedes the running settle");
            animator.cancel();
        }
    }

    /// Puts the child at the offset of the current resting state.
    fn snap_child(&mut self) {
        let Some(child) = self.controller.child() else {
            return;
        };
        let Some(top) = self.controller.offsets().offset_for(self.controller.state()) else {
            return;
        };
        let mut tree = self.tree.borrow_mut();
        if !tree.contains(child) {
            log::warn!("sheet child {child} is no longer in the tree");
            return;
        }
        let left = tree.position(child).x;
        tree.set_position(child, Point::new(left, top as f32));
    }

    fn rebuild_registry(&mut self) {
        if let Some(child) = self.controller.child() {
            let tree = self.tree.borrow();
            self.registry.rebuild(&*tree, child);
        } else {
            self.registry.clear();
        }
    }

    /// Applies one settle frame: moves the child and advances the state.
    /// Returns false when the child is gone and the settle should stop.
    fn apply_settle_tick(&mut self, plan: &SettlePlan, fraction: f32) -> bool {
        let moved_to = {
            let mut tree = self.tree.borrow_mut();
            if !tree.contains(plan.node) {
                log::warn!("settle tick for detached node {}; stopping", plan.node);
                return false;
            }
            let before = tree.position(plan.node);
            let top = plan.top_at(fraction);
            tree.set_position(plan.node, Point::new(before.x, top));
            (top as i32 != before.y as i32).then_some(top as i32)
        };
        self.controller.on_settle_tick(plan.target, fraction, moved_to);
        true
    }
}

/// One handler per event category, plus the queue they drain.
#[derive(Default)]
struct SheetObservers {
    state_changed: RefCell<Option<StateChangedHandler>>,
    slide: RefCell<Option<SlideHandler>>,
    queue: RefCell<VecDeque<(NodeId, SheetEvent)>>,
    dispatching: Cell<bool>,
}

impl SheetObservers {
    fn enqueue(&self, node: Option<NodeId>, events: impl IntoIterator<Item = SheetEvent>) {
        let Some(node) = node else {
            return;
        };
        self.queue
            .borrow_mut()
            .extend(events.into_iter().map(|event| (node, event)));
    }

    /// Delivers queued events unless a delivery is already in progress
    /// further up the stack.
    fn dispatch(&self) {
        if self.dispatching.replace(true) {
            return;
        }
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((node, event)) = next else {
                break;
            };
            match event {
                SheetEvent::StateChanged(state) => {
                    Self::call(&self.state_changed, |handler| handler(node, state))
                }
                SheetEvent::Slide(offset) => {
                    Self::call(&self.slide, |handler| handler(node, offset))
                }
            }
        }
        self.dispatching.set(false);
    }

    /// Calls the handler with its slot vacated, so the handler may replace
    /// itself.
    fn call<H: ?Sized>(slot: &RefCell<Option<Box<H>>>, invoke: impl FnOnce(&mut H)) {
        let taken = slot.borrow_mut().take();
        if let Some(mut handler) = taken {
            invoke(&mut *handler);
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }
}

/// A draggable panel hosting one child node inside a fixed-size container.
///
/// Cloning yields another handle to the same sheet.
#[derive(Clone)]
pub struct AnchorSheet {
    inner: Rc<RefCell<SheetInner>>,
    observers: Rc<SheetObservers>,
}

impl AnchorSheet {
    /// Creates a sheet over `container`. Settles run on `frame_clock`.
    pub fn new(
        tree: SharedNodeTree,
        container: NodeId,
        config: SheetConfig,
        frame_clock: FrameClock,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SheetInner {
                tree,
                container,
                controller: SheetController::new(config),
                drag: None,
                arbiter: ScrollArbiter::new(),
                registry: ScrollableRegistry::new(),
                animator: ValueAnimator::new(frame_clock),
            })),
            observers: Rc::new(SheetObservers::default()),
        }
    }

    /// Attaches the sheet's only child.
    ///
    /// Fails with `InvalidArgument` for a second child or for a node that
    /// does not live under the container; the sheet is left untouched.
    pub fn attach_child(&self, node: NodeId) -> Result<(), SheetError> {
        let mut inner = self.inner.borrow_mut();
        inner.tree.borrow().require_descendant(node, inner.container)?;
        inner.controller.attach_child(node)?;
        log::debug!("attached sheet child {node}");
        if inner.controller.is_laid_out() {
            inner.rebuild_registry();
            inner.snap_child();
        }
        Ok(())
    }

    /// Lays the sheet out in a container of `size`: recomputes the offsets,
    /// rediscovers the child's scrollables and snaps a resting child to its
    /// state's offset.
    pub fn layout(&self, size: Size) {
        let mut inner = self.inner.borrow_mut();
        inner
            .controller
            .apply_layout(size.width as i32, size.height as i32);
        if inner.drag.is_none() {
            let drag = DragGesture::new(inner.container).with_velocity_limits(
                inner.controller.min_velocity(),
                inner.controller.max_velocity(),
            );
            inner.drag = Some(drag);
        }
        inner.rebuild_registry();
        inner.snap_child();
        log::debug!("sheet laid out at {size:?}: {:?}", inner.controller.offsets());
    }

    /// Processes one touch event in the container's coordinate space.
    ///
    /// Fails with `PreconditionViolated` before a child is attached or before
    /// the first layout.
    pub fn process_touch_event(&self, event: &PointerEvent) -> Result<(), SheetError> {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(child) = inner.controller.child() else {
                return Err(SheetError::PreconditionViolated(
                    "touch event before a child is attached",
                ));
            };
            if inner.drag.is_none() {
                return Err(SheetError::PreconditionViolated(
                    "touch event before the first layout",
                ));
            }

            let decision = {
                let SheetInner {
                    tree,
                    container,
                    controller,
                    arbiter,
                    registry,
                    ..
                } = &mut *inner;
                let tree = tree.borrow();
                arbiter.arbitrate(event, controller.state(), registry, &*tree, *container)
            };
            match decision {
                Arbitration::Forward => inner.forward(event, child),
                Arbitration::ForwardWithReplay(down) => {
                    inner.forward(&down, child);
                    inner.forward(event, child);
                }
                Arbitration::Yield(cancel) => inner.forward(&cancel, child),
                Arbitration::Suppress => {}
            }
        }
        self.start_pending_settle();
        self.flush();
        Ok(())
    }

    /// Moves the sheet to `target`, animating when the child is laid out.
    ///
    /// Before that, reachable targets are stored and applied by the next
    /// layout while others are dropped. Once laid out, `Dragging`,
    /// `Settling`, and `Hidden` on a sheet that cannot hide fail with
    /// `InvalidArgument`. Requesting the current state does nothing.
    pub fn set_state(&self, target: SheetState) -> Result<(), SheetError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.controller.state() == target {
                return Ok(());
            }
            let child = match inner.controller.child() {
                Some(child) if inner.controller.is_laid_out() => child,
                _ => {
                    inner.controller.store_deferred_state(target);
                    return Ok(());
                }
            };
            let top = {
                let tree = inner.tree.borrow();
                if !tree.contains(child) {
                    log::warn!("sheet child {child} is no longer in the tree");
                    return Ok(());
                }
                tree.position(child).y as i32
            };
            let plan = inner.controller.plan_settle(child, top, target, 0)?;
            let SheetInner {
                controller, drag, ..
            } = &mut *inner;
            if let Some(drag) = drag.as_mut().filter(|drag| drag.is_dragging()) {
                log::debug!("set_state({target:?}) aborts the active drag");
                drag.abort(controller);
            }
            self.start_settle(&mut inner, plan);
        }
        self.flush();
        Ok(())
    }

    fn start_pending_settle(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Some(plan) = inner.controller.take_settle() {
            self.start_settle(&mut inner, plan);
        }
    }

    fn start_settle(&self, inner: &mut SheetInner, plan: SettlePlan) {
        log::debug!(
            "settling {:?}: {} -> {} over {}ms",
            plan.target,
            plan.from,
            plan.to,
            plan.duration_millis
        );
        let spec = AnimationSpec::tween(plan.duration_millis, inner.controller.settle_easing());
        let weak: Weak<RefCell<SheetInner>> = Rc::downgrade(&self.inner);
        let observers = Rc::clone(&self.observers);
        inner.animator.start(spec, move |fraction| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let events = {
                let mut inner = inner.borrow_mut();
                if !inner.apply_settle_tick(&plan, fraction) {
                    inner.animator.cancel();
                }
                inner.controller.take_events()
            };
            observers.enqueue(Some(plan.node), events);
            observers.dispatch();
        });
    }

    /// Hands queued controller events to the observers.
    fn flush(&self) {
        let (child, events) = {
            let mut inner = self.inner.borrow_mut();
            (inner.controller.child(), inner.controller.take_events())
        };
        self.observers.enqueue(child, events);
        self.observers.dispatch();
    }

    /// Registers the state-change handler, replacing any previous one.
    pub fn on_state_changed(&self, handler: impl FnMut(NodeId, SheetState) + 'static) {
        *self.observers.state_changed.borrow_mut() = Some(Box::new(handler));
    }

    /// Registers the slide handler, replacing any previous one.
    pub fn on_slide(&self, handler: impl FnMut(NodeId, f32) + 'static) {
        *self.observers.slide.borrow_mut() = Some(Box::new(handler));
    }

    pub fn clear_observers(&self) {
        self.observers.state_changed.borrow_mut().take();
        self.observers.slide.borrow_mut().take();
    }

    pub fn state(&self) -> SheetState {
        self.inner.borrow().controller.state()
    }

    pub fn container(&self) -> NodeId {
        self.inner.borrow().container
    }

    pub fn child(&self) -> Option<NodeId> {
        self.inner.borrow().controller.child()
    }

    pub fn peek_height(&self) -> i32 {
        self.inner.borrow().controller.peek_height()
    }

    pub fn set_peek_height(&self, peek_height: i32) {
        self.inner.borrow_mut().controller.set_peek_height(peek_height);
    }

    pub fn min_offset(&self) -> i32 {
        self.inner.borrow().controller.min_offset()
    }

    /// Sets the expanded offset. Negative values are clamped to 0.
    pub fn set_min_offset(&self, min_offset: i32) {
        self.inner.borrow_mut().controller.set_min_offset(min_offset);
    }

    pub fn anchor_threshold(&self) -> f32 {
        self.inner.borrow().controller.anchor_threshold()
    }

    /// Sets the anchor threshold, clamped to `[0, 1]`, and recomputes the
    /// anchor offset.
    pub fn set_anchor_threshold(&self, threshold: f32) {
        self.inner
            .borrow_mut()
            .controller
            .set_anchor_threshold(threshold);
    }

    pub fn is_hideable(&self) -> bool {
        self.inner.borrow().controller.is_hideable()
    }

    pub fn set_hideable(&self, hideable: bool) {
        self.inner.borrow_mut().controller.set_hideable(hideable);
    }

    pub fn skip_collapsed(&self) -> bool {
        self.inner.borrow().controller.skip_collapsed()
    }

    pub fn set_skip_collapsed(&self, skip_collapsed: bool) {
        self.inner
            .borrow_mut()
            .controller
            .set_skip_collapsed(skip_collapsed);
    }

    pub fn anchor_offset(&self) -> i32 {
        self.inner.borrow().controller.offsets().anchor
    }

    pub fn max_offset(&self) -> i32 {
        self.inner.borrow().controller.offsets().max
    }

    pub fn container_height(&self) -> i32 {
        self.inner.borrow().controller.offsets().container_height
    }

    pub fn drag_state(&self) -> DragState {
        self.inner
            .borrow()
            .drag
            .as_ref()
            .map(|drag| drag.drag_state())
            .unwrap_or_default()
    }

    /// True while a settle animation is waiting for or processing frames.
    pub fn is_settling(&self) -> bool {
        self.inner.borrow().animator.is_running()
    }

    /// Who owns the touch sequence in progress.
    pub fn gesture_owner(&self) -> GestureOwner {
        self.inner.borrow().arbiter.owner()
    }

    pub fn scrollables(&self) -> Vec<NodeId> {
        self.inner.borrow().registry.nodes().to_vec()
    }

    /// Current top of the child in container coordinates.
    pub fn child_top(&self) -> Option<f32> {
        let inner = self.inner.borrow();
        let child = inner.controller.child()?;
        let tree = inner.tree.borrow();
        tree.contains(child).then(|| tree.position(child).y)
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
