//! Tracking of in-flight deferred view loads.
//!
//! Each load is tagged with the navigation sequence number that started it.
//! When navigation moves on, loads for routes that are no longer wanted are
//! aborted, and late completions are recognised as stale by their sequence.

use tokio::task::AbortHandle;

/// A handle to a spawned load that can be aborted.
#[derive(Debug)]
pub struct TaskHandle {
    route: String,
    seq: u64,
    abort_handle: AbortHandle,
}

impl TaskHandle {
    pub fn new(route: impl Into<String>, seq: u64, abort_handle: AbortHandle) -> Self {
        Self {
            route: route.into(),
            seq,
            abort_handle,
        }
    }

    /// Abort the task. It is cancelled at its next await point.
    pub fn abort(&self) {
        self.abort_handle.abort();
    }

    /// Check if the task has finished (either completed or aborted).
    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}

/// In-flight loads, aborted together on shutdown.
#[derive(Debug, Default)]
pub struct LoadTracker {
    handles: Vec<TaskHandle>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self { handles: Vec::new() }
    }

    pub fn track(&mut self, handle: TaskHandle) {
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    /// Whether a load for `route` is still running.
    pub fn is_loading(&self, route: &str) -> bool {
        self.handles
            .iter()
            .any(|h| h.route == route && !h.is_finished())
    }

    /// Abort every load not started for `route`.
    pub fn abort_except(&mut self, route: &str) {
        self.handles.retain(|h| {
            if h.route == route {
                true
            } else {
                if !h.is_finished() {
                    tracing::debug!(route = %h.route, seq = h.seq, "aborting superseded load");
                }
                h.abort();
                false
            }
        });
    }

    /// Forget a finished load.
    pub fn complete(&mut self, seq: u64) {
        self.handles.retain(|h| h.seq != seq);
    }

    pub fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for LoadTracker {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    fn pending() -> AbortHandle {
        tokio::spawn(async {
            loop {
                sleep(Duration::from_secs(1)).await;
            }
        })
        .abort_handle()
    }

    #[tokio::test]
    async fn test_task_handle_abort() {
        let handle = TaskHandle::new("Equipment", 1, pending());
        assert!(!handle.is_finished());
        handle.abort();
        sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_abort_except_keeps_current_route() {
        let mut tracker = LoadTracker::new();
        tracker.track(TaskHandle::new("Home", 1, pending()));
        tracker.track(TaskHandle::new("Equipment", 2, pending()));
        tracker.track(TaskHandle::new("Reservations", 3, pending()));
        assert_eq!(tracker.active_count(), 3);

        tracker.abort_except("Equipment");
        sleep(Duration::from_millis(10)).await;

        assert_eq!(tracker.active_count(), 1);
        assert!(tracker.is_loading("Equipment"));
        assert!(!tracker.is_loading("Home"));

        tracker.abort_all();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_forgets_load() {
        let mut tracker = LoadTracker::new();
        tracker.track(TaskHandle::new("Home", 7, pending()));
        tracker.complete(7);
        assert_eq!(tracker.active_count(), 0);
        assert!(!tracker.is_loading("Home"));
    }
}
