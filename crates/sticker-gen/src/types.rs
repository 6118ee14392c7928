use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StickerError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Layout error: {0}")]
    Layout(#[from] sticker_layout::LayoutError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV is missing a usable header row")]
    MissingHeader,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("QR error: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("Font error: {0}")]
    Font(String),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StickerError>;

/// Encoded logo bytes (PNG, JPEG, GIF or WebP), shared between records.
///
/// Series records clone the base record's logo, so the bytes are reference
/// counted rather than copied per sticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage(Arc<[u8]>);

impl LogoImage {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn shares_bytes_with(&self, other: &LogoImage) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// One sticker's content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StickerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Explicit QR payload. Empty means "derive one".
    #[serde(default)]
    pub qr_data: String,
    #[serde(skip)]
    pub logo: Option<LogoImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_number: Option<String>,
}

impl StickerRecord {
    pub fn website(&self) -> &str {
        self.website.as_deref().unwrap_or("")
    }

    /// The payload encoded into this record's QR code.
    ///
    /// Falls back from the explicit payload to the website, the phone number
    /// and finally the series number. `None` means the QR region is drawn as a
    /// placeholder.
    pub fn resolved_qr_payload(&self) -> Option<String> {
        [self.qr_data.as_str(), self.website(), self.phone.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(str::to_string)
            .or_else(|| self.number.map(|n| n.to_string()))
    }
}

/// The design used when nothing has been imported yet.
pub fn default_base_record() -> StickerRecord {
    StickerRecord {
        id: "single".to_string(),
        name: "Your Business".to_string(),
        phone: "+1 555 010 0200".to_string(),
        email: "contact@example.com".to_string(),
        website: Some("https://example.com".to_string()),
        qr_data: "https://example.com".to_string(),
        ..Default::default()
    }
}
