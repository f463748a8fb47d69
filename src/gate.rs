//! Counting admission control for chunk workers.

use std::num::NonZeroUsize;

use crossbeam_channel::{bounded, Receiver, Sender};

/// A counting semaphore over a bounded channel: each in-flight worker holds
/// one queued token. `acquire` blocks while all slots are taken.
pub struct ConcurrencyGate {
    slots: Sender<()>,
    held: Receiver<()>,
}

impl ConcurrencyGate {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let (slots, held) = bounded(capacity.get());
        Self { slots, held }
    }

    pub fn acquire(&self) -> Permit {
        self.slots
            .send(())
            .expect("gate keeps its own receiver alive");
        Permit {
            held: self.held.clone(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity().unwrap_or_default()
    }

    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }
}

/// One admitted slot, released on drop whether the worker succeeded or not.
pub struct Permit {
    held: Receiver<()>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        let _ = self.held.try_recv();
    }
}
