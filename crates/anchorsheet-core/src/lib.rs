//! Core runtime for the anchor sheet crates.
//!
//! Holds the pieces every other crate leans on: non-owning node handles and
//! the [`NodeTree`] interface the host view system implements, the shared
//! error type, and a single-threaded frame-callback runtime that drives
//! animations.

mod error;
mod frame_clock;
mod node_tree;
mod runtime;

pub use error::SheetError;
pub use frame_clock::{FrameCallbackRegistration, FrameClock};
pub use node_tree::{NodeTree, ScrollDirection, SharedNodeTree};
pub use runtime::{FrameRequestHook, Runtime, RuntimeHandle};

/// Handle into the host's node table. The host owns the node; holding an id
/// never keeps it alive.
pub type NodeId = usize;

pub type FrameCallbackId = u64;

pub mod prelude {
    pub use crate::{
        FrameClock, NodeId, NodeTree, Runtime, RuntimeHandle, ScrollDirection, SharedNodeTree,
        SheetError,
    };
}
