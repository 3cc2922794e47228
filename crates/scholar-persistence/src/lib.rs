//! JSON blob persistence for the user profile and alert settings.
//!
//! Read or decode failures are non-fatal by policy: they degrade to
//! "no saved data" so in-memory state starts from defaults. Only save
//! failures surface an error, and callers treat those as warnings too.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use scholar_core::{AlertSettings, ProfileStorage, SettingsStorage, StorageError, UserProfile};

/// Stores a single value as JSON at a fixed path.
pub struct JsonFileStorage<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonFileStorage<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the blob; `None` on missing or undecodable data.
    async fn read(&self) -> Option<T> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Failed to decode {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Encode and write the blob, creating parent directories as needed.
    async fn write(&self, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStorage for JsonFileStorage<UserProfile> {
    async fn load(&self) -> Option<UserProfile> {
        self.read().await
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.write(profile).await
    }
}

#[async_trait]
impl SettingsStorage for JsonFileStorage<AlertSettings> {
    async fn load(&self) -> Option<AlertSettings> {
        self.read().await
    }

    async fn save(&self, settings: &AlertSettings) -> Result<(), StorageError> {
        self.write(settings).await
    }
}
