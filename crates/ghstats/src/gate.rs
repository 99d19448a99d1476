//! Admission control for outbound requests.

use std::sync::Arc;

use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Default number of requests allowed in flight at once.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// A counting gate shared by every request issued through a
/// [`Transport`](crate::transport::Transport).
///
/// Cloning the gate shares the underlying slot count. A slot is held for as
/// long as the returned permit lives, so it is released on every exit path.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyGate {
    /// Create a gate admitting at most `capacity` concurrent requests.
    ///
    /// A capacity of zero would deadlock every caller and is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Maximum number of concurrent holders.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot.
    ///
    /// Fails only if the gate has been closed, which this crate never does.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.semaphore.acquire().await
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONNECTIONS)
    }
}
