use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    // Catalog source (first set wins: URL, then file, then the bundled seed)
    pub catalog_url: Option<String>,   // SCHOLARIQ_CATALOG_URL
    pub catalog_path: Option<PathBuf>, // SCHOLARIQ_CATALOG_PATH

    // Saved profile and settings blobs live here
    pub data_dir: PathBuf, // SCHOLARIQ_DATA_DIR, default ~/.scholariq
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var("SCHOLARIQ_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .map(|home| home.join(".scholariq"))
                .context("no home directory; set SCHOLARIQ_DATA_DIR")?,
        };

        Ok(Self {
            catalog_url: env::var("SCHOLARIQ_CATALOG_URL").ok(),
            catalog_path: env::var("SCHOLARIQ_CATALOG_PATH").ok().map(PathBuf::from),
            data_dir,
        })
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}
