use std::cell::RefCell;
use std::rc::Rc;

use anchorsheet_core::NodeId;
use anchorsheet_ui::{AnchorSheet, SheetState};

/// One observer notification, as delivered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recorded {
    State(NodeId, SheetState),
    Slide(NodeId, f32),
}

/// Records every notification a sheet delivers, in order.
///
/// Attaching replaces whatever handlers the sheet had. Clones share the same
/// log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    log: Rc<RefCell<Vec<Recorded>>>,
}

impl RecordingObserver {
    pub fn attach(sheet: &AnchorSheet) -> Self {
        let observer = Self::default();
        let states = observer.log.clone();
        sheet.on_state_changed(move |node, state| {
            states.borrow_mut().push(Recorded::State(node, state));
        });
        let slides = observer.log.clone();
        sheet.on_slide(move |node, offset| {
            slides.borrow_mut().push(Recorded::Slide(node, offset));
        });
        observer
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.log.borrow().clone()
    }

    /// Reported states, oldest first.
    pub fn states(&self) -> Vec<SheetState> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Recorded::State(_, state) => Some(*state),
                Recorded::Slide(..) => None,
            })
            .collect()
    }

    /// Reported slide offsets, oldest first.
    pub fn slides(&self) -> Vec<f32> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Recorded::Slide(_, offset) => Some(*offset),
                Recorded::State(..) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}
