//! Reactive engine that republishes the match list on input changes.

use std::sync::Arc;

use chrono::Utc;
use scholar_core::{Opportunity, UserProfile};
use tokio::sync::watch;

use crate::policy::select_matches;

/// Watches the catalog and profile and keeps a published match list current.
pub struct MatchEngine {
    catalog_rx: watch::Receiver<Arc<Vec<Opportunity>>>,
    profile_rx: watch::Receiver<Option<UserProfile>>,
    matches_tx: watch::Sender<Arc<Vec<Opportunity>>>,
}

impl MatchEngine {
    /// Build the engine and compute the initial match list from the current
    /// input values.
    pub fn new(
        catalog_rx: watch::Receiver<Arc<Vec<Opportunity>>>,
        profile_rx: watch::Receiver<Option<UserProfile>>,
    ) -> Self {
        let initial = select_matches(
            profile_rx.borrow().as_ref(),
            &catalog_rx.borrow(),
            Utc::now(),
        );
        let (matches_tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            catalog_rx,
            profile_rx,
            matches_tx,
        }
    }

    /// Receiver for the current match list.
    pub fn matches(&self) -> watch::Receiver<Arc<Vec<Opportunity>>> {
        self.matches_tx.subscribe()
    }

    /// Recompute once from the latest inputs.
    pub fn refresh(&mut self) {
        let matched = select_matches(
            self.profile_rx.borrow_and_update().as_ref(),
            &self.catalog_rx.borrow_and_update(),
            Utc::now(),
        );
        tracing::debug!(count = matched.len(), "matches recomputed");
        self.matches_tx.send_replace(Arc::new(matched));
    }

    /// Spawn the reactive loop, returning the matches receiver. The loop
    /// runs until an input store is dropped.
    pub fn spawn(self) -> watch::Receiver<Arc<Vec<Opportunity>>> {
        let rx = self.matches();
        tokio::spawn(self.run());
        rx
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                changed = self.catalog_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.profile_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            self.refresh();
        }
        tracing::debug!("match engine loop ended, input store dropped");
    }
}
