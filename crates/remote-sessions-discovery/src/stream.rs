//! Buffered result stream between query workers and the draining consumer.

use std::{collections::VecDeque, sync::Mutex};

use remote_sessions_core::StreamEntry;
use tokio::sync::Notify;

struct Inner {
    entries: VecDeque<StreamEntry>,
    closed: bool,
}

/// Thread-safe, ordered sink decoupling many producers from one consumer.
///
/// Writes hold the internal lock only briefly, so producers never block on a
/// slow or absent consumer. Once closed, further writes are silently dropped
/// to tolerate late-finishing background work during shutdown.
pub struct ResultStream {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl Default for ResultStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStream {
    /// Create an open, empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(16),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Append one entry. No-op if the stream is closed.
    pub fn write(&self, entry: StreamEntry) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.entries.push_back(entry);
        }
        self.notify.notify_waiters();
    }

    /// Remove and return all currently buffered entries without waiting.
    #[must_use]
    pub fn drain_nonblocking(&self) -> Vec<StreamEntry> {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.drain(..).collect()
    }

    /// Wait until entries are available or the stream closes, then drain.
    ///
    /// Returns an empty vector only once the stream is closed and fully
    /// drained.
    pub async fn wait_entries(&self) -> Vec<StreamEntry> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if !inner.entries.is_empty() || inner.closed {
                    return inner.entries.drain(..).collect();
                }
            }
            notified.await;
        }
    }

    /// Signal that no further writes will occur. Idempotent.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.closed = true;
        }
        self.notify.notify_waiters();
    }

    /// Whether the stream has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}
