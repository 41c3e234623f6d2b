use anchorsheet_ui_graphics::Point;
use std::sync::OnceLock;
use web_time::Instant;

pub type PointerId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// One event of a touch sequence, in the container's coordinate space.
///
/// `pointer_count` is the number of pointers down while the event is
/// delivered, including the one going down or up. A `Down` with a count of
/// one starts a new sequence; an `Up` with a count of one ends it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerEventKind,
    pub position: Point,
    /// Index of the changed pointer within the event's pointer list.
    pub index: usize,
    pub pointer_count: usize,
    /// Milliseconds since an arbitrary process-wide epoch.
    pub uptime_ms: i64,
}

impl PointerEvent {
    /// Creates a single-pointer event stamped with the current time.
    pub fn new(kind: PointerEventKind, position: Point) -> Self {
        Self {
            id: 0,
            kind,
            position,
            index: 0,
            pointer_count: 1,
            uptime_ms: uptime_ms(),
        }
    }

    pub fn with_pointer(mut self, id: PointerId, index: usize, pointer_count: usize) -> Self {
        self.id = id;
        self.index = index;
        self.pointer_count = pointer_count;
        self
    }

    pub fn with_uptime(mut self, uptime_ms: i64) -> Self {
        self.uptime_ms = uptime_ms;
        self
    }

    /// True for the `Down` that opens a touch sequence.
    pub fn starts_sequence(&self) -> bool {
        self.kind == PointerEventKind::Down && self.pointer_count <= 1
    }

    /// True for the terminal event of a touch sequence.
    pub fn ends_sequence(&self) -> bool {
        match self.kind {
            PointerEventKind::Up => self.pointer_count <= 1,
            PointerEventKind::Cancel => true,
            _ => false,
        }
    }
}

fn uptime_ms() -> i64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_boundaries_follow_pointer_count() {
        let down = PointerEvent::new(PointerEventKind::Down, Point::ZERO);
        assert!(down.starts_sequence());
        assert!(!down.with_pointer(1, 1, 2).starts_sequence());

        let up = PointerEvent::new(PointerEventKind::Up, Point::ZERO);
        assert!(up.ends_sequence());
        assert!(!up.with_pointer(1, 1, 2).ends_sequence());

        let cancel = PointerEvent::new(PointerEventKind::Cancel, Point::ZERO).with_pointer(0, 0, 3);
        assert!(cancel.ends_sequence());
    }

    #[test]
    fn uptime_is_monotonic() {
        let first = PointerEvent::new(PointerEventKind::Move, Point::ZERO).uptime_ms;
        let second = PointerEvent::new(PointerEventKind::Move, Point::ZERO).uptime_ms;
        assert!(second >= first);
    }
}
