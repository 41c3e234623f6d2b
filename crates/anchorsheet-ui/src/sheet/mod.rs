//! The anchor sheet: a panel hosting one child that the user drags between
//! expanded, anchor, collapsed and hidden positions.

pub mod config;
pub mod controller;
pub mod coordinator;
pub mod offsets;
pub mod scroll_arbiter;
pub mod settle;
pub mod state;

pub use config::SheetConfig;
pub use controller::{SettlePlan, SheetController, SheetEvent, SETTLE_COMPLETE_FRACTION};
pub use coordinator::AnchorSheet;
pub use offsets::SheetOffsets;
pub use scroll_arbiter::{Arbitration, GestureOwner, ScrollArbiter, ScrollableRegistry};
pub use settle::{compute_axis_duration, compute_settle_duration, MAX_SETTLE_DURATION_MS};
pub use state::SheetState;
