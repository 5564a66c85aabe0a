//! Stop signalling and connection draining.
//!
//! Both primitives sit on `tokio::sync::watch`, which keeps the latest value
//! around: a waiter that subscribes after the fact still sees it.
//! [`ShutdownSignal`] is the one-way switch behind
//! [`Server::stop`](crate::Server::stop). [`ConnectionTracker`] counts open
//! connections so the accept loop can wait for them to finish.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable, trigger-once stop signal.
///
/// # Example
///
/// ```rust
/// use portico_server::shutdown::ShutdownSignal;
///
/// let signal = ShutdownSignal::new();
/// let observer = signal.clone();
///
/// assert!(signal.trigger());
/// assert!(!signal.trigger());
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    stopped: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            stopped: Arc::new(stopped),
        }
    }

    /// Triggers the signal. Returns `false` if it was already triggered.
    pub fn trigger(&self) -> bool {
        self.stopped.send_if_modified(|stopped| !std::mem::replace(stopped, true))
    }

    /// Returns `true` once [`trigger`](Self::trigger) has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Completes when the signal is triggered, or immediately if it
    /// already was.
    pub async fn recv(&self) {
        let mut stopped = self.stopped.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = stopped.wait_for(|&stopped| stopped).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts open connections.
///
/// ```rust
/// use portico_server::shutdown::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let guard = tracker.track();
/// assert_eq!(tracker.active(), 1);
///
/// drop(guard);
/// assert_eq!(tracker.active(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    count: Arc<watch::Sender<usize>>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// Registers a connection; it counts until the guard is dropped.
    #[must_use]
    pub fn track(&self) -> ConnectionGuard {
        self.count.send_modify(|count| *count += 1);
        ConnectionGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active(&self) -> usize {
        *self.count.borrow()
    }

    /// Completes once no connections are open.
    pub async fn wait_idle(&self) {
        let mut count = self.count.subscribe();
        let _ = count.wait_for(|&count| count == 0).await;
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the lifetime of one connection.
#[derive(Debug)]
pub struct ConnectionGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.count.send_modify(|count| *count = count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_once() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());

        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_clones_observe_trigger() {
        let signal = ShutdownSignal::default();
        let clone = signal.clone();
        clone.trigger();
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_wakes_on_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.recv().await });

        tokio::task::yield_now().await;
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_recv_after_trigger_returns() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(50), signal.recv())
            .await
            .expect("already triggered");
    }

    #[test]
    fn test_guards_are_counted() {
        let tracker = ConnectionTracker::default();
        let a = tracker.track();
        let b = tracker.clone().track();
        assert_eq!(tracker.active(), 2);

        drop(b);
        assert_eq!(tracker.active(), 1);
        drop(a);
        assert_eq!(tracker.active(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_without_connections() {
        let tracker = ConnectionTracker::new();
        tokio::time::timeout(Duration::from_millis(50), tracker.wait_idle())
            .await
            .expect("nothing to wait for");
    }

    #[tokio::test]
    async fn test_wait_idle_after_last_guard() {
        let tracker = ConnectionTracker::new();
        let first = tracker.track();
        let second = tracker.track();

        tokio::spawn(async move {
            drop(first);
            tokio::task::yield_now().await;
            drop(second);
        });

        tokio::time::timeout(Duration::from_secs(1), tracker.wait_idle())
            .await
            .expect("should go idle once both guards drop");
        assert_eq!(tracker.active(), 0);
    }
}
