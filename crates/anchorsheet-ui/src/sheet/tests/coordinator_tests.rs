use super::*;
use anchorsheet_core::Runtime;
use anchorsheet_foundation::PointerEventKind;
use anchorsheet_testing::TestNodeTree;

const SIZE: Size = Size::new(400.0, 1000.0);
const FRAME_NANOS: u64 = 16_000_000;

struct Harness {
    runtime: Runtime,
    tree: Rc<RefCell<TestNodeTree>>,
    sheet: AnchorSheet,
    container: NodeId,
    child: NodeId,
    frame_time: u64,
}

impl Harness {
    /// A container with one full-size child; nothing attached or laid out.
    fn new(config: SheetConfig) -> Self {
        let mut table = TestNodeTree::new();
        let container = table.add_root(SIZE);
        let child = table.add_child(container, Point::ZERO, SIZE);
        let tree = table.into_shared();
        let runtime = Runtime::default();
        let sheet = AnchorSheet::new(
            tree.clone(),
            container,
            config,
            runtime.handle().frame_clock(),
        );
        Self {
            runtime,
            tree,
            sheet,
            container,
            child,
            frame_time: 0,
        }
    }

    fn laid_out(config: SheetConfig) -> Self {
        let harness = Self::new(config);
        harness.sheet.attach_child(harness.child).expect("attach");
        harness.sheet.layout(SIZE);
        harness
    }

    fn frame(&mut self) {
        self.frame_time += FRAME_NANOS;
        self.runtime.handle().drain_frame_callbacks(self.frame_time);
    }

    fn pump(&mut self) {
        for _ in 0..1_000 {
            if !self.runtime.handle().has_frame_callbacks() {
                return;
            }
            self.frame();
        }
        panic!("settle never finished");
    }

    fn top(&self) -> f32 {
        self.sheet.child_top().expect("child in tree")
    }

    fn record_states(&self) -> Rc<RefCell<Vec<SheetState>>> {
        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = states.clone();
        self.sheet
            .on_state_changed(move |_, state| sink.borrow_mut().push(state));
        states
    }

    fn down_at(&self, y: f32) -> Result<(), SheetError> {
        let event = PointerEvent::new(PointerEventKind::Down, Point::new(200.0, y)).with_uptime(0);
        self.sheet.process_touch_event(&event)
    }
}

#[test]
fn second_child_is_rejected_and_the_first_keeps_working() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    let other = harness
        .tree
        .borrow_mut()
        .add_child(harness.container, Point::ZERO, SIZE);

    let err = harness.sheet.attach_child(other).unwrap_err();
    assert_eq!(
        err,
        SheetError::InvalidArgument(format!(
            "the sheet hosts exactly one child; node {} is already attached, \
             cannot attach node {other}",
            harness.child
        ))
    );
    assert_eq!(harness.sheet.child(), Some(harness.child));

    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    harness.pump();
    assert_eq!(harness.top(), 0.0);
}

#[test]
fn node_outside_the_container_is_rejected() {
    let harness = Harness::new(SheetConfig::default());
    let stranger = harness.tree.borrow_mut().add_root(SIZE);

    let err = harness.sheet.attach_child(stranger).unwrap_err();
    assert!(matches!(err, SheetError::InvalidArgument(_)));
    assert_eq!(harness.sheet.child(), None);
}

#[test]
fn touch_needs_a_child_and_a_layout() {
    let harness = Harness::new(SheetConfig::default());
    assert!(matches!(
        harness.down_at(900.0),
        Err(SheetError::PreconditionViolated(_))
    ));

    harness.sheet.attach_child(harness.child).expect("attach");
    assert!(matches!(
        harness.down_at(900.0),
        Err(SheetError::PreconditionViolated(_))
    ));

    harness.sheet.layout(SIZE);
    assert_eq!(harness.down_at(900.0), Ok(()));
}

#[test]
fn layout_snaps_the_child_to_its_resting_offset() {
    let harness = Harness::laid_out(SheetConfig::default());
    assert_eq!(harness.sheet.state(), SheetState::Collapsed);
    assert_eq!(harness.top(), 783.0);
    assert_eq!(harness.sheet.anchor_offset(), 500);
    assert_eq!(harness.sheet.max_offset(), 783);
    assert_eq!(harness.sheet.container_height(), 1000);
    assert!(harness.sheet.scrollables().is_empty());
}

#[test]
fn state_requested_before_layout_applies_silently() {
    let harness = Harness::new(SheetConfig::default());
    let states = harness.record_states();
    harness.sheet.attach_child(harness.child).expect("attach");

    harness.sheet.set_state(SheetState::Expanded).expect("deferred");
    assert_eq!(harness.sheet.state(), SheetState::Expanded);

    harness.sheet.layout(SIZE);
    assert_eq!(harness.top(), 0.0);
    assert!(!harness.runtime.handle().has_frame_callbacks());
    assert!(states.borrow().is_empty());
}

#[test]
fn unreachable_states_are_rejected_once_laid_out() {
    let harness = Harness::laid_out(SheetConfig::default().hideable(false));
    for target in [SheetState::Hidden, SheetState::Dragging, SheetState::Settling] {
        let err = harness.sheet.set_state(target).unwrap_err();
        assert!(matches!(err, SheetError::InvalidArgument(_)));
    }
    assert_eq!(harness.sheet.state(), SheetState::Collapsed);
    assert!(!harness.sheet.is_settling());
}

#[test]
fn requesting_the_current_state_does_nothing() {
    let harness = Harness::laid_out(SheetConfig::default());
    let states = harness.record_states();

    harness.sheet.set_state(SheetState::Collapsed).expect("no-op");

    assert!(!harness.runtime.handle().has_frame_callbacks());
    assert!(states.borrow().is_empty());
}

#[test]
fn programmatic_round_trip_settles_through_settling() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    let states = harness.record_states();

    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    assert!(harness.sheet.is_settling());
    harness.pump();
    assert_eq!(harness.top(), 0.0);

    harness.sheet.set_state(SheetState::Collapsed).expect("collapse");
    harness.pump();
    assert_eq!(harness.top(), 783.0);
    assert!(!harness.sheet.is_settling());

    assert_eq!(
        *states.borrow(),
        vec![
            SheetState::Settling,
            SheetState::Expanded,
            SheetState::Settling,
            SheetState::Collapsed,
        ]
    );
}

#[test]
fn slides_are_reported_while_settling() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    let slides = Rc::new(RefCell::new(Vec::new()));
    let sink = slides.clone();
    harness
        .sheet
        .on_slide(move |_, offset| sink.borrow_mut().push(offset));

    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    harness.pump();

    let slides = slides.borrow();
    assert!(!slides.is_empty());
    assert!(slides.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(slides.last().copied(), Some(1.0));
}

#[test]
fn handler_may_call_back_into_the_sheet() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = states.clone();
    let sheet = harness.sheet.clone();
    harness.sheet.on_state_changed(move |_, state| {
        sink.borrow_mut().push(state);
        if state == SheetState::Expanded {
            sheet.set_state(SheetState::Anchor).expect("re-entrant request");
        }
    });

    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    harness.pump();

    assert_eq!(harness.sheet.state(), SheetState::Anchor);
    assert_eq!(harness.top(), 500.0);
    assert_eq!(
        *states.borrow(),
        vec![
            SheetState::Settling,
            SheetState::Expanded,
            SheetState::Settling,
            SheetState::Anchor,
        ]
    );
    harness.sheet.clear_observers();
}

#[test]
fn new_request_supersedes_a_running_settle() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    let states = harness.record_states();

    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    harness.frame();
    harness.frame();
    harness.frame();
    harness.sheet.set_state(SheetState::Anchor).expect("anchor");
    harness.pump();

    assert_eq!(harness.top(), 500.0);
    assert_eq!(
        *states.borrow(),
        vec![SheetState::Settling, SheetState::Anchor]
    );
}

#[test]
fn removed_child_stops_the_settle() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    harness.frame();
    harness.frame();

    harness.tree.borrow_mut().remove(harness.child);
    harness.pump();

    assert!(!harness.sheet.is_settling());
    assert_eq!(harness.sheet.child_top(), None);
    assert_eq!(harness.sheet.state(), SheetState::Settling);
}

#[test]
fn touching_the_child_interrupts_a_settle() {
    let mut harness = Harness::laid_out(SheetConfig::default());
    harness.sheet.set_state(SheetState::Expanded).expect("expand");
    harness.frame();
    harness.frame();
    harness.frame();
    let top = harness.top();
    assert!(top < 783.0);

    harness.down_at(top + 10.0).expect("down");

    assert_eq!(harness.sheet.state(), SheetState::Dragging);
    assert_eq!(harness.sheet.drag_state(), DragState::Dragging);
    assert!(!harness.sheet.is_settling());
    assert!(!harness.runtime.handle().has_frame_callbacks());
    assert_eq!(harness.top(), top);
}

#[test]
fn setters_take_effect_on_the_next_layout() {
    let harness = Harness::laid_out(SheetConfig::default());
    harness.sheet.set_peek_height(300);
    harness.sheet.set_anchor_threshold(-1.0);
    assert_eq!(harness.sheet.max_offset(), 700);
    assert_eq!(harness.sheet.anchor_threshold(), 0.0);
    assert_eq!(harness.sheet.anchor_offset(), 0);

    harness.sheet.layout(SIZE);
    assert_eq!(harness.top(), 700.0);
}

#[test]
fn negative_min_offset_is_clamped_to_zero() {
    let harness = Harness::laid_out(SheetConfig::default().with_min_offset(-40));
    assert_eq!(harness.sheet.min_offset(), 0);

    harness.sheet.set_min_offset(120);
    assert_eq!(harness.sheet.min_offset(), 120);
    harness.sheet.set_min_offset(-5);
    assert_eq!(harness.sheet.min_offset(), 0);
}
