use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod handlers;
mod worker;

pub use worker::worker_task;

// Re-export types from library crates
pub use sticker_gen::{
    AppSettings, ExportOutcome, NumberSeriesConfig, PdfExportOptions, PngExportOptions,
    StickerRecord,
};
pub use sticker_layout::{PageConfiguration, StickerDimensions};

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum StickerCommand {
    LoadCsv {
        input_path: PathBuf,
    },
    WriteCsvTemplate {
        output_path: PathBuf,
    },
    GenerateSeries {
        config: NumberSeriesConfig,
        base: StickerRecord,
    },
    /// Render one sticker to a PNG file
    RenderSticker {
        record: StickerRecord,
        dimensions: StickerDimensions,
        output_path: PathBuf,
    },
    /// Rasterize one page of the print grid (only the newest queued request runs)
    RenderPagePreview {
        page: PageConfiguration,
        dimensions: StickerDimensions,
        sample: Option<StickerRecord>,
    },
    ExportPng {
        records: Arc<[StickerRecord]>,
        dimensions: StickerDimensions,
        options: PngExportOptions,
        cancel: CancellationToken,
    },
    ExportPdf {
        records: Arc<[StickerRecord]>,
        dimensions: StickerDimensions,
        options: PdfExportOptions,
        cancel: CancellationToken,
    },
    LoadSettings {
        path: PathBuf,
    },
    SaveSettings {
        settings: AppSettings,
        path: PathBuf,
    },
}

/// Updates sent from the worker to a front end
#[derive(Debug, Clone)]
pub enum StickerUpdate {
    Status {
        message: String,
    },
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    CsvLoaded {
        records: Vec<StickerRecord>,
    },
    TemplateWritten {
        path: PathBuf,
    },
    SeriesGenerated {
        records: Vec<StickerRecord>,
    },
    StickerRendered {
        path: PathBuf,
    },
    PagePreviewRendered {
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    },
    ExportFinished {
        outcome: ExportOutcome,
    },
    SettingsLoaded {
        settings: AppSettings,
    },
    SettingsSaved {
        path: PathBuf,
    },
    Error {
        message: String,
    },
}
