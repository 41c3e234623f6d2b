//! Scripted touch sequences for black-box sheet tests.

use anchorsheet_core::SheetError;
use anchorsheet_foundation::velocity_tracker::ASSUME_STOPPED_MS;
use anchorsheet_foundation::PointerId;
use anchorsheet_ui::{AnchorSheet, PointerEvent, PointerEventKind};
use anchorsheet_ui_graphics::Point;

/// Default spacing between consecutive events, in milliseconds.
pub const DEFAULT_STEP_MILLIS: i64 = 8;

/// Drives pointer events into an [`AnchorSheet`] on a synthetic clock.
///
/// Every event is stamped `step` milliseconds after the previous one, so
/// release velocities are deterministic: a drag of `d` pixels per step flings
/// at `d * 1000 / step` px/s. Pointers are tracked in press order; the first
/// one pressed is the primary pointer the single-pointer helpers act on.
pub struct GestureRobot {
    sheet: AnchorSheet,
    uptime_ms: i64,
    step_ms: i64,
    pointers: Vec<(PointerId, Point)>,
}

impl GestureRobot {
    pub fn new(sheet: &AnchorSheet) -> Self {
        Self {
            sheet: sheet.clone(),
            uptime_ms: 0,
            step_ms: DEFAULT_STEP_MILLIS,
            pointers: Vec::new(),
        }
    }

    pub fn with_step_millis(mut self, step_ms: i64) -> Self {
        self.step_ms = step_ms.max(1);
        self
    }

    pub fn uptime_ms(&self) -> i64 {
        self.uptime_ms
    }

    /// Position of the primary pointer, if one is down.
    pub fn position(&self) -> Option<Point> {
        self.pointers.first().map(|(_, position)| *position)
    }

    /// Lets time pass without sending anything.
    pub fn hold(&mut self, millis: i64) {
        self.uptime_ms += millis;
    }

    /// Presses the primary pointer at `(x, y)`, starting a new sequence.
    pub fn down(&mut self, x: f32, y: f32) -> Result<(), SheetError> {
        self.pointers.clear();
        self.press(0, x, y)
    }

    /// Moves the primary pointer to `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) -> Result<(), SheetError> {
        let Some(&(id, _)) = self.pointers.first() else {
            return Ok(());
        };
        self.move_pointer(id, x, y)
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) -> Result<(), SheetError> {
        let Some(from) = self.position() else {
            return Ok(());
        };
        self.move_to(from.x + dx, from.y + dy)
    }

    /// Lifts the primary pointer where it is.
    pub fn up(&mut self) -> Result<(), SheetError> {
        let Some(&(id, _)) = self.pointers.first() else {
            return Ok(());
        };
        self.release(id)
    }

    /// Cancels the sequence in progress.
    pub fn cancel(&mut self) -> Result<(), SheetError> {
        let position = self.position().unwrap_or(Point::ZERO);
        let count = self.pointers.len().max(1);
        self.pointers.clear();
        self.send(PointerEventKind::Cancel, 0, 0, count, position)
    }

    /// Presses pointer `id` at `(x, y)`. A press while other pointers are down
    /// is a secondary pointer joining the sequence.
    pub fn press(&mut self, id: PointerId, x: f32, y: f32) -> Result<(), SheetError> {
        let position = Point::new(x, y);
        self.pointers.push((id, position));
        let index = self.pointers.len() - 1;
        let count = self.pointers.len();
        self.send(PointerEventKind::Down, id, index, count, position)
    }

    pub fn move_pointer(&mut self, id: PointerId, x: f32, y: f32) -> Result<(), SheetError> {
        let Some(index) = self.index_of(id) else {
            return Ok(());
        };
        let position = Point::new(x, y);
        self.pointers[index].1 = position;
        let count = self.pointers.len();
        self.send(PointerEventKind::Move, id, index, count, position)
    }

    /// Lifts pointer `id`. Lifting the last pointer ends the sequence.
    pub fn release(&mut self, id: PointerId) -> Result<(), SheetError> {
        let Some(index) = self.index_of(id) else {
            return Ok(());
        };
        let count = self.pointers.len();
        let (_, position) = self.pointers.remove(index);
        self.send(PointerEventKind::Up, id, index, count, position)
    }

    /// Presses at `from` and moves to `to` in `steps` equal moves, leaving
    /// the pointer down.
    pub fn drag(&mut self, from: Point, to: Point, steps: usize) -> Result<(), SheetError> {
        self.down(from.x, from.y)?;
        let steps = steps.max(1);
        let step_x = (to.x - from.x) / steps as f32;
        let step_y = (to.y - from.y) / steps as f32;
        for step in 1..=steps {
            let x = from.x + step_x * step as f32;
            let y = from.y + step_y * step as f32;
            self.move_to(x, y)?;
        }
        Ok(())
    }

    /// Drags, waits until the pointer counts as stopped, then lifts: the
    /// release carries no velocity.
    pub fn drag_and_settle(&mut self, from: Point, to: Point, steps: usize) -> Result<(), SheetError> {
        self.drag(from, to, steps)?;
        self.hold(ASSUME_STOPPED_MS + self.step_ms);
        self.up()
    }

    /// Drags and lifts immediately, releasing at the drag's speed.
    pub fn fling(&mut self, from: Point, to: Point, steps: usize) -> Result<(), SheetError> {
        self.drag(from, to, steps)?;
        self.up()
    }

    /// Presses and lifts at `(x, y)` without moving.
    pub fn tap(&mut self, x: f32, y: f32) -> Result<(), SheetError> {
        self.down(x, y)?;
        self.up()
    }

    fn index_of(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|(pointer, _)| *pointer == id)
    }

    fn send(
        &mut self,
        kind: PointerEventKind,
        id: PointerId,
        index: usize,
        count: usize,
        position: Point,
    ) -> Result<(), SheetError> {
        self.uptime_ms += self.step_ms;
        let event = PointerEvent::new(kind, position)
            .with_pointer(id, index, count)
            .with_uptime(self.uptime_ms);
        self.sheet.process_touch_event(&event)
    }
}
