//! Single-threaded frame runtime.
//!
//! The sheet never owns a display link. It posts one-shot callbacks to the
//! [`Runtime`], and the host (or a test harness) drains them once per
//! frame with the frame timestamp.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::frame_clock::FrameClock;
use crate::FrameCallbackId;

type FrameCallback = Box<dyn FnOnce(u64)>;

/// Called the first time a callback is posted after a drain, so the host can
/// request a vsync.
pub type FrameRequestHook = Box<dyn Fn()>;

#[derive(Default)]
struct FrameQueue {
    pending: RefCell<Vec<(FrameCallbackId, FrameCallback)>>,
    last_id: Cell<FrameCallbackId>,
    frame_requested: Cell<bool>,
    on_frame_request: Option<FrameRequestHook>,
}

impl FrameQueue {
    fn post(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        self.pending.borrow_mut().push((id, callback));
        if !self.frame_requested.replace(true) {
            if let Some(hook) = &self.on_frame_request {
                hook();
            }
        }
        id
    }

    fn remove(&self, id: FrameCallbackId) {
        let mut pending = self.pending.borrow_mut();
        pending.retain(|(posted, _)| *posted != id);
        if pending.is_empty() {
            self.frame_requested.set(false);
        }
    }

    /// Runs the callbacks posted before this call. Anything posted from
    /// inside a callback waits for the next drain.
    fn drain(&self, frame_time_nanos: u64) {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        self.frame_requested.set(false);
        log::trace!("frame at {frame_time_nanos}ns: {} callbacks", batch.len());
        for (_, callback) in batch {
            callback(frame_time_nanos);
        }
        if !self.pending.borrow().is_empty() {
            self.frame_requested.set(true);
        }
    }

    fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

/// Owns the frame queue. Keep it alive for as long as any sheet animates.
#[derive(Clone, Default)]
pub struct Runtime {
    queue: Rc<FrameQueue>,
}

impl Runtime {
    /// Runtime that calls `hook` whenever it goes from idle to wanting a
    /// frame.
    pub fn with_frame_request_hook(hook: impl Fn() + 'static) -> Self {
        Self {
            queue: Rc::new(FrameQueue {
                on_frame_request: Some(Box::new(hook)),
                ..FrameQueue::default()
            }),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            queue: Rc::downgrade(&self.queue),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.queue.frame_requested.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

/// Weak handle to a [`Runtime`]. Once the runtime is gone, posting returns
/// `None` and draining does nothing.
#[derive(Clone)]
pub struct RuntimeHandle {
    queue: Weak<FrameQueue>,
}

impl RuntimeHandle {
    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        let queue = self.queue.upgrade()?;
        Some(queue.post(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(queue) = self.queue.upgrade() {
            queue.remove(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(queue) = self.queue.upgrade() {
            queue.drain(frame_time_nanos);
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.queue.upgrade().is_some_and(|queue| !queue.is_empty())
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }
}
