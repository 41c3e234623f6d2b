//! Drag gesture recogniser.
//!
//! Tracks the pointers of a touch sequence, captures one child of the tracked
//! container, moves it as the pointer moves (after the owner clamps the
//! proposed position) and reports the release velocity when the sequence ends.
//! The recogniser knows geometry and velocity only; what a drag means is up to
//! the [`DragCallback`] owner.

use anchorsheet_core::{NodeId, NodeTree, SheetError};
use anchorsheet_ui_graphics::Point;

use crate::gesture_constants::{DEFAULT_MAX_VELOCITY, DEFAULT_MIN_VELOCITY, VELOCITY_UNITS_MS};
use crate::nodes::input::pointer_track::PointerTracks;
use crate::nodes::input::types::{PointerEvent, PointerEventKind, PointerId};
use crate::velocity_tracker::{VelocityEstimator, VelocityTracker};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    /// No child is captured.
    #[default]
    Idle,
    /// A child is captured and follows the pointer.
    Dragging,
}

/// Everything the owner needs to decide where a released child goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragRelease {
    pub node: NodeId,
    /// Top of the child at release, in container coordinates.
    pub top: i32,
    pub x_velocity: f32,
    pub y_velocity: f32,
    /// Last non-zero clamped movement applied during the sequence.
    pub dx: i32,
    pub dy: i32,
}

/// Owner side of the recogniser: capture policy, clamping and event sinks.
pub trait DragCallback {
    /// Whether the pointer may start dragging `node`.
    fn try_capture(&mut self, node: NodeId, pointer: PointerId) -> bool;

    /// Restricts the proposed top; `dy` is the raw proposed change.
    fn clamp_vertical(&mut self, node: NodeId, top: i32, dy: i32) -> i32;

    /// Restricts the proposed left. The default pins the child horizontally.
    fn clamp_horizontal(&mut self, _node: NodeId, left: i32, dx: i32) -> i32 {
        left - dx
    }

    fn on_drag_state_changed(&mut self, _state: DragState) {}

    /// Fired only when the clamped position actually changed.
    fn on_position_changed(&mut self, _node: NodeId, _left: i32, _top: i32, _dx: i32, _dy: i32) {}

    fn on_released(&mut self, release: DragRelease);

    /// Maps a hit-test position to a child index; the last index is top-most.
    fn ordered_child_index(&self, index: usize) -> usize {
        index
    }
}

/// Clamps the magnitude of `value` into `[abs_min, abs_max]`.
///
/// Magnitudes below `abs_min` become zero, magnitudes above `abs_max`
/// saturate; the sign is preserved.
pub fn clamp_magnitude(value: f32, abs_min: f32, abs_max: f32) -> f32 {
    let abs_value = value.abs();
    if abs_value < abs_min {
        0.0
    } else if abs_value > abs_max {
        if value > 0.0 {
            abs_max
        } else {
            -abs_max
        }
    } else {
        value
    }
}

/// Recogniser for vertical drags of one child inside a container.
pub struct DragGesture<V: VelocityEstimator = VelocityTracker> {
    container: NodeId,
    drag_state: DragState,
    tracks: PointerTracks,
    velocity: V,
    active_pointer: Option<PointerId>,
    captured: Option<NodeId>,
    last_delta: (i32, i32),
    min_velocity: f32,
    max_velocity: f32,
}

impl DragGesture<VelocityTracker> {
    pub fn new(container: NodeId) -> Self {
        Self::with_estimator(container, VelocityTracker::new())
    }
}

impl<V: VelocityEstimator> DragGesture<V> {
    pub fn with_estimator(container: NodeId, velocity: V) -> Self {
        Self {
            container,
            drag_state: DragState::Idle,
            tracks: PointerTracks::new(),
            velocity,
            active_pointer: None,
            captured: None,
            last_delta: (0, 0),
            min_velocity: DEFAULT_MIN_VELOCITY,
            max_velocity: DEFAULT_MAX_VELOCITY,
        }
    }

    /// Sets the release velocity clamp. `min` is raised to zero and `max` to
    /// `min` if they arrive out of order.
    pub fn with_velocity_limits(mut self, min: f32, max: f32) -> Self {
        self.min_velocity = min.max(0.0);
        self.max_velocity = max.max(self.min_velocity);
        self
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_state == DragState::Dragging
    }

    pub fn captured(&self) -> Option<NodeId> {
        self.captured
    }

    pub fn min_velocity(&self) -> f32 {
        self.min_velocity
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    pub fn pointers(&self) -> &PointerTracks {
        &self.tracks
    }

    /// Captures `node` for dragging, bypassing the hit-test.
    ///
    /// Fails with `InvalidArgument`, leaving the recogniser untouched, when
    /// `node` does not live under the tracked container.
    pub fn capture_target(
        &mut self,
        node: NodeId,
        tree: &dyn NodeTree,
        callback: &mut dyn DragCallback,
    ) -> Result<(), SheetError> {
        tree.require_descendant(node, self.container)?;
        self.captured = Some(node);
        self.set_drag_state(DragState::Dragging, callback);
        Ok(())
    }

    /// Processes one touch-sequence event, dispatching callbacks as needed
    /// before returning.
    pub fn process_event(
        &mut self,
        event: &PointerEvent,
        tree: &mut dyn NodeTree,
        callback: &mut dyn DragCallback,
    ) {
        if event.starts_sequence() {
            // Reset things for a new event stream.
            self.cancel();
            self.active_pointer = Some(event.id);
        }
        if self.active_pointer == Some(event.id) {
            self.velocity.add_sample(event.uptime_ms, event.position);
        }

        match event.kind {
            PointerEventKind::Down => {
                if !self.tracks.save_initial(event.id, event.position) {
                    return;
                }
                log::trace!("pointer {} down at {:?}", event.id, event.position);
                if event.starts_sequence() {
                    let to_capture = self.find_top_child_under(event.position, tree, callback);
                    if let Some(node) = to_capture {
                        self.try_capture_for_drag(node, event.id, tree, callback);
                    }
                }
            }
            PointerEventKind::Move => {
                if self.is_dragging() && self.active_pointer == Some(event.id) {
                    self.drag_pointer(event, tree, callback);
                }
                self.tracks.save_last(event.id, event.position);
            }
            PointerEventKind::Up if event.ends_sequence() => {
                if self.is_dragging() {
                    self.release_for_pointer_up(tree, callback);
                }
                self.cancel();
            }
            PointerEventKind::Up => {
                log::trace!("pointer {} up", event.id);
                self.tracks.clear_pointer(event.id);
                if self.active_pointer == Some(event.id) {
                    // The next pointer starts its own velocity history.
                    self.active_pointer = self.tracks.first_down();
                    self.velocity.clear();
                }
            }
            PointerEventKind::Cancel => {
                if self.is_dragging() {
                    self.dispatch_released(0.0, 0.0, tree, callback);
                }
                self.cancel();
            }
        }
    }

    /// Drops all per-sequence history. Equivalent to receiving a cancel
    /// without dispatching a release.
    pub fn cancel(&mut self) {
        self.tracks.clear();
        self.velocity.clear();
        self.active_pointer = None;
        self.last_delta = (0, 0);
    }

    /// Stops tracking outright: history is cleared and a capture, if any, is
    /// dropped without a release.
    pub fn abort(&mut self, callback: &mut dyn DragCallback) {
        self.cancel();
        self.set_drag_state(DragState::Idle, callback);
    }

    fn drag_pointer(
        &mut self,
        event: &PointerEvent,
        tree: &mut dyn NodeTree,
        callback: &mut dyn DragCallback,
    ) {
        let Some(node) = self.captured else {
            return;
        };
        let Some(track) = self.tracks.get(event.id).copied() else {
            return;
        };
        if !tree.contains(node) {
            log::warn!("captured node {node} vanished mid-drag; dropping capture");
            self.abort(callback);
            return;
        }
        let dx = (event.position.x - track.last.x) as i32;
        let dy = (event.position.y - track.last.y) as i32;
        self.drag_by(node, dx, dy, tree, callback);
    }

    /// Moves `node` by the raw delta after the owner clamps each axis.
    /// Deltas that clamp away to nothing are absorbed silently.
    fn drag_by(
        &mut self,
        node: NodeId,
        dx: i32,
        dy: i32,
        tree: &mut dyn NodeTree,
        callback: &mut dyn DragCallback,
    ) {
        let origin = tree.position(node);
        let (old_left, old_top) = (origin.x as i32, origin.y as i32);
        let mut clamped_x = old_left;
        let mut clamped_y = old_top;
        if dx != 0 {
            clamped_x = callback.clamp_horizontal(node, old_left + dx, dx);
        }
        if dy != 0 {
            clamped_y = callback.clamp_vertical(node, old_top + dy, dy);
        }

        let clamped_dx = clamped_x - old_left;
        let clamped_dy = clamped_y - old_top;
        if clamped_dx == 0 && clamped_dy == 0 {
            return;
        }
        tree.set_position(node, Point::new(clamped_x as f32, clamped_y as f32));
        self.last_delta = (clamped_dx, clamped_dy);
        log::trace!("drag {node} to ({clamped_x}, {clamped_y}) by ({clamped_dx}, {clamped_dy})");
        callback.on_position_changed(node, clamped_x, clamped_y, clamped_dx, clamped_dy);
    }

    fn release_for_pointer_up(&mut self, tree: &mut dyn NodeTree, callback: &mut dyn DragCallback) {
        self.velocity.compute_current_velocity(VELOCITY_UNITS_MS);
        let x_velocity = clamp_magnitude(
            self.velocity.horizontal_velocity(),
            self.min_velocity,
            self.max_velocity,
        );
        let y_velocity = clamp_magnitude(
            self.velocity.vertical_velocity(),
            self.min_velocity,
            self.max_velocity,
        );
        self.dispatch_released(x_velocity, y_velocity, tree, callback);
    }

    fn dispatch_released(
        &mut self,
        x_velocity: f32,
        y_velocity: f32,
        tree: &mut dyn NodeTree,
        callback: &mut dyn DragCallback,
    ) {
        if let Some(node) = self.captured {
            let release = DragRelease {
                node,
                top: tree.position(node).y as i32,
                x_velocity,
                y_velocity,
                dx: self.last_delta.0,
                dy: self.last_delta.1,
            };
            log::trace!("release {release:?}");
            callback.on_released(release);
        }
        self.set_drag_state(DragState::Idle, callback);
    }

    fn try_capture_for_drag(
        &mut self,
        node: NodeId,
        pointer: PointerId,
        tree: &dyn NodeTree,
        callback: &mut dyn DragCallback,
    ) {
        if !callback.try_capture(node, pointer) {
            log::trace!("capture of {node} by pointer {pointer} refused");
            return;
        }
        if let Err(err) = self.capture_target(node, tree, callback) {
            log::warn!("hit-tested child could not be captured: {err}");
        }
    }

    /// Top-most child of the container whose bounds contain `point`.
    fn find_top_child_under(
        &self,
        point: Point,
        tree: &dyn NodeTree,
        callback: &dyn DragCallback,
    ) -> Option<NodeId> {
        let children = tree.children(self.container);
        (0..children.len()).rev().find_map(|index| {
            let child = *children.get(callback.ordered_child_index(index))?;
            tree.bounds(child)
                .contains_exclusive(point.x, point.y)
                .then_some(child)
        })
    }

    fn set_drag_state(&mut self, state: DragState, callback: &mut dyn DragCallback) {
        if self.drag_state == state {
            return;
        }
        self.drag_state = state;
        callback.on_drag_state_changed(state);
        if state == DragState::Idle {
            self.captured = None;
        }
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
