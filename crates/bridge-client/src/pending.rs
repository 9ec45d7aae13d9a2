//! Continuation map for in-flight cross-context calls.
//!
//! One entry per outstanding request: created on send, destroyed by the
//! matching response or by timeout cancellation, whichever happens first.

use bridge_protocol::{CorrelationId, ResponseEnvelope};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// One in-flight call waiting for its response.
struct PendingRequest {
    /// Completes the caller's wait.
    sender: oneshot::Sender<ResponseEnvelope>,
    created_at: Instant,
    /// Route label, for logging.
    label: String,
    timeout: Duration,
}

/// Counters over the store's lifetime.
#[derive(Debug, Default)]
pub struct PendingStats {
    pub total_registered: AtomicU64,
    pub total_completed: AtomicU64,
    pub total_expired: AtomicU64,
    pub total_cancelled: AtomicU64,
}

/// Correlation-id-keyed store of pending requests.
///
/// Flow:
/// 1. `register()` creates an entry and hands back the receiver
/// 2. the request envelope goes out on the bus with the same id
/// 3. the response router calls `complete()` when the response arrives
/// 4. the sender awaits the receiver under its own timeout and calls
///    `cancel()` if the timeout wins
///
/// Completion and cancellation both remove the entry, so a late response
/// finds nothing and is dropped.
pub struct PendingRequestStore {
    pending: DashMap<CorrelationId, PendingRequest>,
    default_timeout: Duration,
    stats: Arc<PendingStats>,
}

impl PendingRequestStore {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            default_timeout,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a fresh pending entry.
    ///
    /// Returns the generated correlation id and the receiver the caller
    /// awaits on.
    pub fn register(
        &self,
        label: &str,
        timeout: Option<Duration>,
    ) -> (CorrelationId, oneshot::Receiver<ResponseEnvelope>) {
        let correlation_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            correlation_id,
            PendingRequest {
                sender: tx,
                created_at: Instant::now(),
                label: label.to_string(),
                timeout: timeout.unwrap_or(self.default_timeout),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(correlation_id = %correlation_id, label, "Registered pending request");

        (correlation_id, rx)
    }

    /// Complete the entry matching the response's id.
    ///
    /// Returns `false` when no entry matches (late or unknown response) or
    /// the waiting side already went away; the response is dropped either
    /// way.
    pub fn complete(&self, response: ResponseEnvelope) -> bool {
        let correlation_id = response.id;
        let Some((_, pending)) = self.pending.remove(&correlation_id) else {
            debug!(
                correlation_id = %correlation_id,
                "Dropping response with no pending request"
            );
            return false;
        };

        let waited = pending.created_at.elapsed();
        match pending.sender.send(response) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    label = pending.label,
                    waited_ms = waited.as_millis(),
                    "Completed pending request"
                );
                true
            }
            Err(_) => {
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    label = pending.label,
                    "Receiver gone before completion"
                );
                false
            }
        }
    }

    /// Drop an entry without completing it (the timeout path).
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Sweep entries whose deadline passed without completion.
    ///
    /// Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, request| {
            let elapsed = now.duration_since(request.created_at);
            if elapsed > request.timeout {
                warn!(
                    correlation_id = %id,
                    label = request.label,
                    elapsed_ms = elapsed.as_millis(),
                    "Removing expired pending request"
                );
                self.stats.total_expired.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

/// Periodic sweep of expired entries.
pub async fn cleanup_task(store: Arc<PendingRequestStore>, interval: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed, "Swept expired pending requests");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_for(id: CorrelationId) -> ResponseEnvelope {
        ResponseEnvelope::success(id, json!({"ok": true}))
    }

    #[tokio::test]
    async fn test_register_and_complete() {
        let store = PendingRequestStore::new(Duration::from_secs(10));

        let (id, rx) = store.register("GET /health", None);
        assert!(store.is_pending(&id));
        assert_eq!(store.pending_count(), 1);

        assert!(store.complete(response_for(id)));

        let response = rx.await.unwrap();
        assert_eq!(response.id, id);
        assert!(response.is_success());
        assert_eq!(store.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_response_is_dropped() {
        let store = PendingRequestStore::new(Duration::from_secs(10));
        assert!(!store.complete(response_for(CorrelationId::new())));
    }

    #[tokio::test]
    async fn test_completion_is_at_most_once() {
        let store = PendingRequestStore::new(Duration::from_secs(10));

        let (id, rx) = store.register("POST /api/fs/read", None);
        assert!(store.complete(response_for(id)));
        // Entry is gone; a duplicate response finds nothing.
        assert!(!store.complete(response_for(id)));

        rx.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_then_late_response() {
        let store = PendingRequestStore::new(Duration::from_secs(10));

        let (id, _rx) = store.register("POST /api/fs/read", None);
        assert!(store.cancel(&id));
        assert!(!store.is_pending(&id));

        // The late response is silently dropped.
        assert!(!store.complete(response_for(id)));
        assert!(!store.cancel(&id));
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let store = PendingRequestStore::new(Duration::from_millis(10));

        let (id1, _rx1) = store.register("a", None);
        let (_id2, _rx2) = store.register("b", Some(Duration::from_secs(60)));

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.remove_expired(), 1);
        assert!(!store.is_pending(&id1));
        assert_eq!(store.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = PendingRequestStore::new(Duration::from_secs(10));

        let (id1, _rx1) = store.register("a", None);
        let (id2, _rx2) = store.register("b", None);
        assert_eq!(store.stats().total_registered.load(Ordering::Relaxed), 2);

        store.complete(response_for(id1));
        assert_eq!(store.stats().total_completed.load(Ordering::Relaxed), 1);

        store.cancel(&id2);
        assert_eq!(store.stats().total_cancelled.load(Ordering::Relaxed), 1);
    }
}
