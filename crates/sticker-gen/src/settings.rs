use crate::export::DEFAULT_BATCH_SIZE;
use crate::series::NumberSeriesConfig;
use crate::types::{Result, StickerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use sticker_layout::{PageConfiguration, StickerDimensions};

/// Persisted configuration. Record collections are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub dimensions: StickerDimensions,
    pub page: PageConfiguration,
    pub series: NumberSeriesConfig,
    pub batch_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dimensions: StickerDimensions::default(),
            page: PageConfiguration::default(),
            series: NumberSeriesConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl AppSettings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings = serde_json::from_slice(&bytes)
            .map_err(|e| StickerError::Config(format!("Failed to parse settings: {}", e)))?;
        Ok(settings)
    }

    /// Save settings as pretty-printed JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.dimensions.validate()?;
        self.page.validate()?;
        if self.batch_size == 0 {
            return Err(StickerError::Config(
                "Batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
