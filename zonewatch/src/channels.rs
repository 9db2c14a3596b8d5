//! Latest-wins channels between the capture, detector, and consumer workers
//!
//! Both channels trade completeness for latency: a producer never blocks
//! (puts evict instead) and a consumer never waits (gets return empty).
//! [`FrameChannel`] is a short bounded ring feeding the detector, with a
//! separate latest-frame slot for the streaming consumer; [`LatestSlot`] is
//! the single-slot overwrite buffer used for detector output and the stream
//! output message.

use crate::types::Frame;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Default ring depth between capture and detector
pub const DEFAULT_FRAME_CAPACITY: usize = 2;

/// Bounded frame ring with drop-oldest-on-full publish.
///
/// `publish` also overwrites the latest-frame slot, so the streaming
/// consumer always sees the freshest frame without competing with the
/// detector for ring entries. Clones share the same underlying channel.
#[derive(Clone)]
pub struct FrameChannel {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
    latest: Arc<Mutex<Option<Frame>>>,
    dropped: Arc<AtomicU64>,
}

impl FrameChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self {
            tx,
            rx,
            latest: Arc::new(Mutex::new(None)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish a frame, evicting the oldest ring entry when full. Never
    /// blocks the producer.
    pub fn publish(&self, frame: Frame) {
        *self.latest.lock().unwrap() = Some(frame.clone());

        if let Err(TrySendError::Full(frame)) = self.tx.try_send(frame) {
            let _ = self.rx.try_recv();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            // A competing consumer can race the freed slot; losing that race
            // drops this frame, which latest-wins semantics permit.
            let _ = self.tx.try_send(frame);
        }
    }

    /// Take the next frame for detection, oldest first. Non-blocking.
    pub fn next_for_detector(&self) -> Option<Frame> {
        self.rx.try_recv().ok()
    }

    /// Clone of the most recently published frame. Non-consuming.
    pub fn latest(&self) -> Option<Frame> {
        self.latest.lock().unwrap().clone()
    }

    /// Frames evicted from the ring so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Single-slot overwrite buffer: a new publish always replaces any
/// unconsumed prior value, and reads are non-consuming clones.
pub struct LatestSlot<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn publish(&self, value: T) {
        *self.slot.lock().unwrap() = Some(value);
    }

    /// Consume the current value, leaving the slot empty
    pub fn take(&self) -> Option<T> {
        self.slot.lock().unwrap().take()
    }
}

impl<T: Clone> LatestSlot<T> {
    /// Clone of the current value without consuming it
    pub fn latest(&self) -> Option<T> {
        self.slot.lock().unwrap().clone()
    }
}
