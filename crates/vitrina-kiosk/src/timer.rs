//! Resettable one-shot timers
//!
//! The kiosk keeps two of these armed: the search debounce and the
//! inactivity reload. Arming a slot that is already armed cancels the
//! pending task first, so at most one fire is ever outstanding per slot.

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct TaskSlot {
    handle: Option<JoinHandle<()>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Arm the slot, cancelling whatever was pending
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.handle.replace(handle) {
            previous.abort();
        }
    }

    /// Disarm the slot
    pub fn clear(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
