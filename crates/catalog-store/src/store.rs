//! Shared catalog state.

use std::sync::Arc;

use scholar_core::Opportunity;
use tokio::sync::watch;

/// Holds the session's opportunity set and notifies subscribers when it is
/// replaced. Snapshots are `Arc`-shared, so readers keep a consistent view
/// even while a replacement lands.
pub struct CatalogStore {
    tx: watch::Sender<Arc<Vec<Opportunity>>>,
}

impl CatalogStore {
    pub fn new(catalog: Vec<Opportunity>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(catalog));
        Self { tx }
    }

    /// Current snapshot. The returned `Arc` stays valid across later
    /// replacements; callers never observe a half-swapped catalog.
    pub fn snapshot(&self) -> Arc<Vec<Opportunity>> {
        self.tx.borrow().clone()
    }

    /// Swap in a freshly loaded catalog. Wholesale replacement is the only
    /// mutation the store supports.
    pub fn replace(&self, catalog: Vec<Opportunity>) {
        tracing::debug!(count = catalog.len(), "catalog replaced");
        self.tx.send_replace(Arc::new(catalog));
    }

    /// Receiver that resolves whenever the catalog is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Opportunity>>> {
        self.tx.subscribe()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
