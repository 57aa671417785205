//! At-most-once processing of source messages.
//!
//! A trigger must win `check_and_reserve` before it issues any fetch or post.
//! The reservation is then either committed (output was posted) or released
//! (nothing to post, so the message stays eligible for a later trigger).

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::common::error::GuardError;
use crate::common::MessageKey;

/// Default number of processed messages remembered by the recency window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

#[async_trait]
pub trait ProcessingGuard: Send + Sync {
    /// Atomically reserve `key`. `false` means it is processed or in flight.
    async fn check_and_reserve(&self, key: MessageKey) -> Result<bool, GuardError>;

    /// Mark a reserved message as processed.
    async fn commit(&self, key: MessageKey) -> Result<(), GuardError>;

    /// Drop a reservation without marking the message.
    async fn release(&self, key: MessageKey) -> Result<(), GuardError>;
}

#[derive(Debug, Default)]
struct WindowState {
    in_flight: HashSet<MessageKey>,
    processed: HashSet<MessageKey>,
    order: VecDeque<MessageKey>,
}

/// Bounded in-memory record of recently processed messages.
///
/// Forgets the oldest entries beyond its capacity and everything on restart.
#[derive(Debug)]
pub struct RecencyWindow {
    capacity: usize,
    state: Mutex<WindowState>,
}

impl RecencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(WindowState::default()),
        }
    }

    #[cfg(test)]
    pub async fn processed_count(&self) -> usize {
        self.state.lock().await.processed.len()
    }
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[async_trait]
impl ProcessingGuard for RecencyWindow {
    async fn check_and_reserve(&self, key: MessageKey) -> Result<bool, GuardError> {
        let mut state = self.state.lock().await;
        if state.processed.contains(&key) {
            return Ok(false);
        }
        Ok(state.in_flight.insert(key))
    }

    async fn commit(&self, key: MessageKey) -> Result<(), GuardError> {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&key);

        if state.processed.insert(key) {
            state.order.push_back(key);
        }

        while state.order.len() > self.capacity {
            if let Some(evicted) = state.order.pop_front() {
                state.processed.remove(&evicted);
                debug!("Evicted message {} from processed window", evicted);
            }
        }

        Ok(())
    }

    async fn release(&self, key: MessageKey) -> Result<(), GuardError> {
        self.state.lock().await.in_flight.remove(&key);
        Ok(())
    }
}

/// Durable marker attached to the source message itself.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    /// Whether this process already marked the message.
    async fn has_marker(&self, key: MessageKey) -> Result<bool, GuardError>;

    async fn add_marker(&self, key: MessageKey) -> Result<(), GuardError>;
}

/// Guard backed by an externally visible marker, surviving restarts.
///
/// The in-flight set makes the reservation atomic within this process; the
/// marker records completion.
pub struct MarkerGuard {
    store: Arc<dyn MarkerStore>,
    in_flight: Mutex<HashSet<MessageKey>>,
}

impl MarkerGuard {
    pub fn new(store: Arc<dyn MarkerStore>) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl ProcessingGuard for MarkerGuard {
    async fn check_and_reserve(&self, key: MessageKey) -> Result<bool, GuardError> {
        if !self.in_flight.lock().await.insert(key) {
            return Ok(false);
        }

        match self.store.has_marker(key).await {
            Ok(false) => Ok(true),
            Ok(true) => {
                self.in_flight.lock().await.remove(&key);
                Ok(false)
            }
            Err(e) => {
                self.in_flight.lock().await.remove(&key);
                Err(e)
            }
        }
    }

    async fn commit(&self, key: MessageKey) -> Result<(), GuardError> {
        let result = self.store.add_marker(key).await;
        self.in_flight.lock().await.remove(&key);
        result
    }

    async fn release(&self, key: MessageKey) -> Result<(), GuardError> {
        self.in_flight.lock().await.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// In-memory marker store with a switch to simulate an outage.
    #[derive(Default)]
    pub struct MemoryMarkers {
        pub marked: Mutex<HashSet<MessageKey>>,
        pub unavailable: AtomicBool,
    }

    impl MemoryMarkers {
        fn check_available(&self) -> Result<(), GuardError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(GuardError::Unavailable {
                    message: "marker store offline".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl MarkerStore for MemoryMarkers {
        async fn has_marker(&self, key: MessageKey) -> Result<bool, GuardError> {
            self.check_available()?;
            Ok(self.marked.lock().await.contains(&key))
        }

        async fn add_marker(&self, key: MessageKey) -> Result<(), GuardError> {
            self.check_available()?;
            self.marked.lock().await.insert(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::MemoryMarkers;
    use super::*;

    fn key(id: u64) -> MessageKey {
        MessageKey::new(1, id)
    }

    #[tokio::test]
    async fn test_reserve_commit_blocks_reprocessing() {
        let guard = RecencyWindow::default();
        assert!(guard.check_and_reserve(key(1)).await.unwrap());
        assert!(!guard.check_and_reserve(key(1)).await.unwrap());
        guard.commit(key(1)).await.unwrap();
        assert!(!guard.check_and_reserve(key(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_allows_retry() {
        let guard = RecencyWindow::default();
        assert!(guard.check_and_reserve(key(1)).await.unwrap());
        guard.release(key(1)).await.unwrap();
        assert!(guard.check_and_reserve(key(1)).await.unwrap());
        assert_eq!(guard.processed_count().await, 0);
    }

    #[tokio::test]
    async fn test_window_evicts_oldest() {
        let guard = RecencyWindow::new(2);
        for id in 1..=3 {
            assert!(guard.check_and_reserve(key(id)).await.unwrap());
            guard.commit(key(id)).await.unwrap();
        }

        assert_eq!(guard.processed_count().await, 2);
        // Oldest was forgotten, newer ones are still remembered
        assert!(guard.check_and_reserve(key(1)).await.unwrap());
        assert!(!guard.check_and_reserve(key(3)).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_reserve_has_single_winner() {
        let guard = Arc::new(RecencyWindow::default());

        let attempts = (0..16).map(|_| {
            let guard = guard.clone();
            tokio::spawn(async move { guard.check_and_reserve(key(42)).await.unwrap() })
        });

        let winners = futures::future::join_all(attempts)
            .await
            .into_iter()
            .filter(|won| *won.as_ref().unwrap())
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_marker_guard_lifecycle() {
        let markers = Arc::new(MemoryMarkers::default());
        let guard = MarkerGuard::new(markers.clone());

        assert!(guard.check_and_reserve(key(7)).await.unwrap());
        assert!(!guard.check_and_reserve(key(7)).await.unwrap());
        guard.commit(key(7)).await.unwrap();
        assert!(markers.marked.lock().await.contains(&key(7)));

        // A fresh guard (restart) still sees the marker
        let restarted = MarkerGuard::new(markers);
        assert!(!restarted.check_and_reserve(key(7)).await.unwrap());
    }

    #[tokio::test]
    async fn test_marker_guard_release() {
        let guard = MarkerGuard::new(Arc::new(MemoryMarkers::default()));
        assert!(guard.check_and_reserve(key(8)).await.unwrap());
        guard.release(key(8)).await.unwrap();
        assert!(guard.check_and_reserve(key(8)).await.unwrap());
    }

    #[tokio::test]
    async fn test_marker_guard_concurrent_single_winner() {
        let guard = Arc::new(MarkerGuard::new(Arc::new(MemoryMarkers::default())));

        let attempts = (0..8).map(|_| {
            let guard = guard.clone();
            tokio::spawn(async move { guard.check_and_reserve(key(9)).await.unwrap() })
        });

        let winners = futures::future::join_all(attempts)
            .await
            .into_iter()
            .filter(|won| *won.as_ref().unwrap())
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_marker_store_outage_propagates_and_frees_reservation() {
        let markers = Arc::new(MemoryMarkers::default());
        let guard = MarkerGuard::new(markers.clone());

        markers.unavailable.store(true, Ordering::SeqCst);
        assert!(guard.check_and_reserve(key(10)).await.is_err());

        markers.unavailable.store(false, Ordering::SeqCst);
        assert!(guard.check_and_reserve(key(10)).await.unwrap());
    }
}
