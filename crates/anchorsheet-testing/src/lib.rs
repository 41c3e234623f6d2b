//! Testing utilities and harness for the anchor sheet

pub mod node_tree;
pub mod observer;
pub mod robot;
pub mod testing;

pub use node_tree::*;
pub use observer::*;
pub use robot::*;
pub use testing::*;

pub mod prelude {
    pub use crate::node_tree::TestNodeTree;
    pub use crate::observer::{Recorded, RecordingObserver};
    pub use crate::robot::GestureRobot;
    pub use crate::testing::SheetTestRule;
}
