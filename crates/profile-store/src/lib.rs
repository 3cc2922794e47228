//! Current user profile, loaded once at session start and saved on every
//! update.

use std::sync::Arc;

use scholar_core::{ProfileStorage, UserProfile};
use tokio::sync::watch;

/// Owns the session's profile and publishes changes to subscribers.
pub struct ProfileStore {
    tx: watch::Sender<Option<UserProfile>>,
    storage: Arc<dyn ProfileStorage>,
}

impl ProfileStore {
    /// Build the store from whatever the storage has. A missing or
    /// unreadable blob starts the session with no profile.
    pub async fn load(storage: Arc<dyn ProfileStorage>) -> Self {
        let initial = storage.load().await;
        match &initial {
            Some(profile) => tracing::info!(name = %profile.name, "profile loaded"),
            None => tracing::info!("no saved profile, starting fresh"),
        }
        let (tx, _rx) = watch::channel(initial);
        Self { tx, storage }
    }

    pub fn current(&self) -> Option<UserProfile> {
        self.tx.borrow().clone()
    }

    /// Whether the current profile has every field filled in.
    pub fn is_complete(&self) -> bool {
        self.tx
            .borrow()
            .as_ref()
            .map(|p| p.is_complete())
            .unwrap_or(false)
    }

    /// Replace the profile and persist it. Persistence is best-effort; a
    /// failed save keeps the new in-memory value.
    pub async fn update(&self, profile: UserProfile) {
        self.tx.send_replace(Some(profile.clone()));
        if let Err(e) = self.storage.save(&profile).await {
            tracing::warn!(error = %e, "failed to save profile");
        }
    }

    /// Drop the session profile. The saved blob is left alone, so the next
    /// session starts from the last successful save.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Receiver that resolves whenever the profile changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.tx.subscribe()
    }
}
