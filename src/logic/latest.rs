//! Latest Value - atomically swappable shared value
//!
//! Writer publish từ background thread, reader (UI bridge) chỉ thấy giá trị mới nhất.
//! Không có queue: hai lần publish liên tiếp trước khi reader kịp đọc thì
//! reader chỉ quan sát được lần sau cùng (last write wins).

use tokio::sync::watch;

/// Single-slot publish/subscribe cell backed by a `watch` channel.
#[derive(Debug)]
pub struct LatestValue<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> LatestValue<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current value. Never blocks, works with zero subscribers.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Snapshot of the current value
    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Subscribe to changes. The receiver starts with the current value marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}
