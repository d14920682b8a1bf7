//! Facility snapshot version feed.
//!
//! Every facility write bumps a monotonically increasing version published
//! through a watch channel. Consumers that hold a receiver are woken on
//! change; HTTP clients compare `GET /api/v1/facilities/version` against
//! their last-seen value and re-fetch the list only when it moved. Polling
//! that endpoint is the documented degradation for clients without a push
//! channel — the interval is theirs to choose, and the payload is one
//! integer either way.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct FacilityFeed {
    tx: Arc<watch::Sender<u64>>,
}

impl FacilityFeed {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Bumps the snapshot version. Called after every facility write.
    pub fn publish(&self) {
        self.tx.send_modify(|version| *version += 1);
    }

    /// The current snapshot version.
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.tx.borrow()
    }

    /// A receiver that wakes on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for FacilityFeed {
    fn default() -> Self {
        Self::new()
    }
}
