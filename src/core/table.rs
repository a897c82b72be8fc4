//! Current and previous rate snapshots

use super::snapshot::RateSnapshot;
use std::sync::Arc;
use tracing::debug;

/// Keeps the latest snapshot and the one it replaced.
///
/// Snapshots are shared by `Arc`, so a reader that took `current()` keeps a
/// stable view even if an update lands right after.
#[derive(Debug, Default, Clone)]
pub struct RateTable {
    current: Option<Arc<RateSnapshot>>,
    previous: Option<Arc<RateSnapshot>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` as current, rotating the old current into previous.
    /// An empty snapshot is ignored and `false` is returned.
    pub fn update(&mut self, snapshot: RateSnapshot) -> bool {
        if snapshot.is_empty() {
            debug!("Ignoring empty rate snapshot");
            return false;
        }
        let incoming = Arc::new(snapshot);
        self.previous = self.current.replace(incoming);
        debug!(
            has_previous = self.previous.is_some(),
            "Rate table updated"
        );
        true
    }

    pub fn has_rates(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<Arc<RateSnapshot>> {
        self.current.clone()
    }

    pub fn previous(&self) -> Option<Arc<RateSnapshot>> {
        self.previous.clone()
    }
}
