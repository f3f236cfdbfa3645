//! Render-loop synchronization primitives
//!
//! The render loop and the display driver hand off work through a small
//! set of event bits (mirroring an RTOS event group) plus two atomics
//! that are safe to touch from inside the flush callback while the render
//! pass holds the state lock.

use bitflags::bitflags;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

bitflags! {
    /// Event bits shared between the render loop and its clients
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct SyncBits: u32 {
        /// Render loop must exit
        const SHUTDOWN = 1 << 0;
        /// Display driver finished consuming the flushed band
        const FLUSH_DONE = 1 << 1;
    }
}

/// Condvar-backed event bits with set/clear/wait semantics
pub(crate) struct EventFlags {
    bits: Mutex<SyncBits>,
    cond: Condvar,
}

impl EventFlags {
    pub(crate) fn new() -> Self {
        EventFlags {
            bits: Mutex::new(SyncBits::empty()),
            cond: Condvar::new(),
        }
    }

    /// Set `bits` and wake all waiters
    pub(crate) fn set(&self, bits: SyncBits) {
        let mut current = self.bits.lock();
        current.insert(bits);
        self.cond.notify_all();
    }

    /// Clear `bits` without waking anyone
    pub(crate) fn clear(&self, bits: SyncBits) {
        self.bits.lock().remove(bits);
    }

    /// Test whether any of `bits` is set, clearing the ones that are
    pub(crate) fn take(&self, bits: SyncBits) -> bool {
        let mut current = self.bits.lock();
        let hit = current.intersects(bits);
        current.remove(bits);
        hit
    }

    /// Wait until any of `bits` is set, then clear it
    ///
    /// Returns `false` when the timeout elapsed first.
    pub(crate) fn wait(&self, bits: SyncBits, timeout: Duration) -> bool {
        let mut current = self.bits.lock();
        if !current.intersects(bits) {
            let deadline = std::time::Instant::now() + timeout;
            while !current.intersects(bits) {
                if self.cond.wait_until(&mut current, deadline).timed_out() {
                    break;
                }
            }
        }
        let hit = current.intersects(bits);
        current.remove(bits);
        hit
    }
}

/// Lock-free side of the engine state, shared with the flush callback
pub(crate) struct SyncState {
    /// Event bits
    pub(crate) flags: EventFlags,
    /// Whether the current flush is the final band of the render pass
    pub(crate) flushing_last: AtomicBool,
    /// Whether the display driver requested an active-buffer swap
    pub(crate) swap_requested: AtomicBool,
}

impl SyncState {
    pub(crate) fn new() -> Self {
        SyncState {
            flags: EventFlags::new(),
            flushing_last: AtomicBool::new(false),
            swap_requested: AtomicBool::new(false),
        }
    }
}
