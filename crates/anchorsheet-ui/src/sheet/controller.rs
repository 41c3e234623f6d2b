//! The sheet's state machine.
//!
//! [`SheetController`] owns the offsets, the current [`SheetState`] and the
//! release decision. It is the [`DragCallback`] of the sheet's drag
//! recognizer, so capture policy and clamping live here too. It never talks
//! to observers or the animator directly: state changes and slides queue up
//! as [`SheetEvent`]s and a release queues a [`SettlePlan`], both collected by
//! the coordinator once the recognizer returns.

use anchorsheet_animation::{Easing, Lerp};
use anchorsheet_core::{NodeId, SheetError};
use anchorsheet_foundation::{DragCallback, DragRelease, DragState, PointerId};
use smallvec::SmallVec;

use crate::sheet::config::{sanitize_threshold, SheetConfig};
use crate::sheet::offsets::SheetOffsets;
use crate::sheet::settle::compute_settle_duration;
use crate::sheet::state::SheetState;

/// Share of the projected travel a fling contributes when deciding to hide.
const HIDE_FRICTION: f32 = 0.1;

/// Projected travel past the collapse line, in peek heights, that hides.
const HIDE_THRESHOLD: f32 = 0.25;

/// Settle fractions at or above this land in the target state.
pub const SETTLE_COMPLETE_FRACTION: f32 = 0.999_999;

/// Something observers should hear about, in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SheetEvent {
    StateChanged(SheetState),
    Slide(f32),
}

/// A settle for the coordinator to animate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettlePlan {
    pub node: NodeId,
    pub target: SheetState,
    pub from: i32,
    pub to: i32,
    pub duration_millis: u64,
}

impl SettlePlan {
    /// Top of the child at `fraction` of the settle.
    pub fn top_at(&self, fraction: f32) -> f32 {
        (self.from as f32).lerp(&(self.to as f32), fraction)
    }
}

pub struct SheetController {
    peek_height: i32,
    min_offset: i32,
    anchor_threshold: f32,
    hideable: bool,
    skip_collapsed: bool,
    min_velocity: f32,
    max_velocity: f32,
    settle_easing: Easing,
    container_width: i32,
    offsets: SheetOffsets,
    laid_out: bool,
    state: SheetState,
    /// Last resting state entered; what an inconclusive tap returns to.
    resting_state: SheetState,
    child: Option<NodeId>,
    events: SmallVec<[SheetEvent; 4]>,
    pending_settle: Option<SettlePlan>,
}

impl SheetController {
    pub fn new(config: SheetConfig) -> Self {
        let config = config.sanitized();
        Self {
            peek_height: config.peek_height,
            min_offset: config.min_offset,
            anchor_threshold: config.anchor_threshold,
            hideable: config.hideable,
            skip_collapsed: config.skip_collapsed,
            min_velocity: config.min_velocity,
            max_velocity: config.max_velocity,
            settle_easing: config.settle_easing,
            container_width: 0,
            offsets: SheetOffsets::default(),
            laid_out: false,
            state: SheetState::default(),
            resting_state: SheetState::default(),
            child: None,
            events: SmallVec::new(),
            pending_settle: None,
        }
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn offsets(&self) -> SheetOffsets {
        self.offsets
    }

    pub fn peek_height(&self) -> i32 {
        self.peek_height
    }

    pub fn min_offset(&self) -> i32 {
        self.min_offset
    }

    pub fn anchor_threshold(&self) -> f32 {
        self.anchor_threshold
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    pub fn skip_collapsed(&self) -> bool {
        self.skip_collapsed
    }

    pub fn min_velocity(&self) -> f32 {
        self.min_velocity
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    pub fn settle_easing(&self) -> Easing {
        self.settle_easing
    }

    pub fn container_width(&self) -> i32 {
        self.container_width
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    pub fn set_peek_height(&mut self, peek_height: i32) {
        self.peek_height = peek_height.max(0);
        self.recompute_offsets();
    }

    /// Negative offsets are clamped to 0.
    pub fn set_min_offset(&mut self, min_offset: i32) {
        self.min_offset = min_offset.max(0);
        self.recompute_offsets();
    }

    pub fn set_anchor_threshold(&mut self, threshold: f32) {
        self.anchor_threshold = sanitize_threshold(threshold);
        self.recompute_offsets();
    }

    pub fn set_hideable(&mut self, hideable: bool) {
        self.hideable = hideable;
    }

    pub fn set_skip_collapsed(&mut self, skip_collapsed: bool) {
        self.skip_collapsed = skip_collapsed;
    }

    /// Records the one child the sheet hosts.
    pub fn attach_child(&mut self, node: NodeId) -> Result<(), SheetError> {
        if let Some(existing) = self.child {
            return Err(SheetError::InvalidArgument(format!(
                "the sheet hosts exactly one child; node {existing} is already attached, \
                 cannot attach node {node}"
            )));
        }
        self.child = Some(node);
        Ok(())
    }

    pub fn apply_layout(&mut self, width: i32, height: i32) {
        self.container_width = width.max(0);
        self.offsets.container_height = height.max(0);
        self.laid_out = true;
        self.recompute_offsets();
    }

    fn recompute_offsets(&mut self) {
        self.offsets = SheetOffsets::compute(
            self.offsets.container_height,
            self.peek_height,
            self.min_offset,
            self.anchor_threshold,
        );
        log::trace!("offsets recomputed: {:?}", self.offsets);
    }

    /// Moves to `state`, queueing a notification; a no-op when unchanged.
    pub(crate) fn set_state_internal(&mut self, state: SheetState) {
        if self.state == state {
            return;
        }
        log::debug!("sheet state {:?} -> {:?}", self.state, state);
        self.state = state;
        if state.is_resting() {
            self.resting_state = state;
        }
        self.events.push(SheetEvent::StateChanged(state));
    }

    /// Stores `target` without animating, for requests made before the
    /// sheet can position its child. Unreachable targets are dropped.
    pub fn store_deferred_state(&mut self, target: SheetState) -> bool {
        let reachable = match target {
            SheetState::Collapsed
            | SheetState::Expanded
            | SheetState::Anchor
            | SheetState::ForceHidden => true,
            SheetState::Hidden => self.hideable,
            SheetState::Dragging | SheetState::Settling => false,
        };
        if reachable {
            log::debug!("stored {target:?} until the child is laid out");
            self.state = target;
            self.resting_state = target;
        } else {
            log::debug!("dropped unreachable deferred state {target:?}");
        }
        reachable
    }

    /// Top the child settles to in `target`.
    pub fn target_offset(&self, target: SheetState) -> Result<i32, SheetError> {
        match target {
            SheetState::Anchor => Ok(self.offsets.anchor),
            SheetState::Collapsed => Ok(self.offsets.max),
            SheetState::Expanded => Ok(self.offsets.min),
            SheetState::Hidden if self.hideable => Ok(self.offsets.container_height),
            SheetState::ForceHidden => Ok(self.offsets.container_height),
            other => Err(SheetError::InvalidArgument(format!(
                "illegal settle target {other:?}"
            ))),
        }
    }

    /// Chooses where a child released at `top` goes.
    ///
    /// A zero velocity picks the nearer of min/anchor, then of anchor/max,
    /// in that order. Otherwise the direction of the last move decides, and
    /// a release that never moved snaps to whichever offset it sits on.
    pub fn release_target(&self, top: i32, y_velocity: f32, dy: i32) -> SheetState {
        let SheetOffsets {
            min, anchor, max, ..
        } = self.offsets;
        if y_velocity == 0.0 {
            if (top - min).abs() < (top - anchor).abs() {
                SheetState::Expanded
            } else if (top - anchor).abs() < (top - max).abs() {
                SheetState::Anchor
            } else {
                SheetState::Collapsed
            }
        } else if dy < 0 {
            if top < anchor {
                SheetState::Expanded
            } else {
                SheetState::Anchor
            }
        } else if dy > 0 {
            if (self.hideable && self.should_hide(top, y_velocity)) || self.skip_collapsed {
                SheetState::Hidden
            } else {
                SheetState::Collapsed
            }
        } else if top == anchor {
            SheetState::Anchor
        } else if top == min {
            SheetState::Expanded
        } else if top == max {
            SheetState::Collapsed
        } else {
            self.resting_state
        }
    }

    /// Whether a downward release at `top` with `y_velocity` should hide.
    pub fn should_hide(&self, top: i32, y_velocity: f32) -> bool {
        if self.skip_collapsed {
            return true;
        }
        let max = self.offsets.max;
        if top < max {
            // Still above the collapse line: collapse, don't hide.
            return false;
        }
        let projected_top = top as f32 + y_velocity * HIDE_FRICTION;
        let overshoot = (projected_top - max as f32).abs();
        if self.peek_height == 0 {
            return overshoot > 0.0;
        }
        overshoot / self.peek_height as f32 > HIDE_THRESHOLD
    }

    /// Plans the settle of `node` from `top` into `target`.
    pub fn plan_settle(
        &self,
        node: NodeId,
        top: i32,
        target: SheetState,
        y_velocity: i32,
    ) -> Result<SettlePlan, SheetError> {
        let to = self.target_offset(target)?;
        let duration_millis = compute_settle_duration(
            top - to,
            y_velocity,
            self.min_velocity,
            self.max_velocity,
            self.offsets.drag_range(self.hideable),
            self.container_width,
        );
        Ok(SettlePlan {
            node,
            target,
            from: top,
            to,
            duration_millis,
        })
    }

    /// Applies one settle tick. `moved_to` is the new top when the tick
    /// moved the child.
    pub fn on_settle_tick(&mut self, target: SheetState, fraction: f32, moved_to: Option<i32>) {
        if let Some(top) = moved_to {
            self.dispatch_slide(top);
        }
        if fraction >= SETTLE_COMPLETE_FRACTION {
            self.set_state_internal(target);
        } else {
            self.set_state_internal(SheetState::Settling);
        }
    }

    fn dispatch_slide(&mut self, top: i32) {
        self.events
            .push(SheetEvent::Slide(self.offsets.slide_fraction(top)));
    }

    /// Drains the queued observer events.
    pub fn take_events(&mut self) -> SmallVec<[SheetEvent; 4]> {
        std::mem::take(&mut self.events)
    }

    /// Takes the settle queued by the last release, if any.
    pub fn take_settle(&mut self) -> Option<SettlePlan> {
        self.pending_settle.take()
    }
}

impl DragCallback for SheetController {
    fn try_capture(&mut self, node: NodeId, pointer: PointerId) -> bool {
        if self.state == SheetState::Dragging {
            log::trace!("pointer {pointer} denied: already dragging");
            return false;
        }
        self.child == Some(node)
    }

    fn clamp_vertical(&mut self, _node: NodeId, top: i32, _dy: i32) -> i32 {
        self.offsets.clamp_vertical(top, self.hideable)
    }

    fn on_drag_state_changed(&mut self, state: DragState) {
        if state == DragState::Dragging {
            self.set_state_internal(SheetState::Dragging);
        }
    }

    fn on_position_changed(&mut self, _node: NodeId, _left: i32, top: i32, _dx: i32, _dy: i32) {
        self.dispatch_slide(top);
    }

    fn on_released(&mut self, release: DragRelease) {
        let mut target = self.release_target(release.top, release.y_velocity, release.dy);
        if target == SheetState::Hidden && !self.hideable {
            // skip_collapsed only matters for hideable sheets.
            target = SheetState::Collapsed;
        }
        log::debug!(
            "released at top {} (v={:.1}, dy={}): settling to {:?}",
            release.top,
            release.y_velocity,
            release.dy,
            target
        );
        if target == self.state {
            return;
        }
        match self.plan_settle(release.node, release.top, target, release.y_velocity as i32) {
            Ok(plan) => self.pending_settle = Some(plan),
            Err(err) => log::warn!("release could not settle: {err}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
