use async_trait::async_trait;

use crate::{AlertSettings, CatalogError, Opportunity, StorageError, UserProfile};

/// Supplies the full opportunity set at session start as an immutable
/// snapshot (bundled dataset, file, or remote fetch).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the complete catalog snapshot.
    async fn load(&self) -> Result<Vec<Opportunity>, CatalogError>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Loads and saves the user profile as an opaque blob.
///
/// Read/decode failures are never surfaced: implementations degrade to
/// `None` ("no saved data") and log the cause themselves.
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    async fn load(&self) -> Option<UserProfile>;

    async fn save(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

/// Loads and saves alert settings as an opaque blob, with the same
/// degrade-to-`None` read policy as [`ProfileStorage`].
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    async fn load(&self) -> Option<AlertSettings>;

    async fn save(&self, settings: &AlertSettings) -> Result<(), StorageError>;
}
