#![forbid(unsafe_code)]

//! Single-slot mailbox holding the next pack buffer for the module.
//!
//! Producers (file picker, prefetch, catalog selection) stage buffers; the
//! module drains the slot with a non-blocking take when it polls. The slot
//! holds at most one buffer: staging over an unconsumed buffer replaces it
//! (last-write-wins, no queueing), and a take consumes the slot, so a second
//! take without a new stage comes back empty. Overwrites are counted.

/// Overwrite-on-stage, consume-on-take mailbox for pack buffers.
#[derive(Debug, Default, Clone)]
pub struct PackMailbox {
    slot: Option<Vec<u8>>,
    staged_total: u64,
    overwrites: u64,
}

impl PackMailbox {
    /// Create an empty mailbox.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: None,
            staged_total: 0,
            overwrites: 0,
        }
    }

    /// Stage a buffer, replacing any unconsumed one.
    pub fn stage(&mut self, bytes: Vec<u8>) {
        self.staged_total += 1;
        if let Some(dropped) = self.slot.replace(bytes) {
            self.overwrites += 1;
            #[cfg(feature = "tracing")]
            tracing::warn!(
                dropped_len = dropped.len(),
                overwrites = self.overwrites,
                "staged over an unconsumed pack buffer"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = dropped;
        }
    }

    /// Take the staged buffer, leaving the slot empty.
    pub fn try_take(&mut self) -> Option<Vec<u8>> {
        self.slot.take()
    }

    /// Borrow the staged buffer without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&[u8]> {
        self.slot.as_deref()
    }

    /// Whether a buffer is currently staged.
    #[must_use]
    pub const fn is_staged(&self) -> bool {
        self.slot.is_some()
    }

    /// Total number of stage calls so far.
    #[must_use]
    pub const fn staged_total(&self) -> u64 {
        self.staged_total
    }

    /// Number of stages that replaced an unconsumed buffer.
    #[must_use]
    pub const fn overwrites(&self) -> u64 {
        self.overwrites
    }
}
