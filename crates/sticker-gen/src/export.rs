use crate::fonts::FontSet;
use crate::pdf::{PdfMetadata, PdfPaginator};
use crate::raster::StickerRenderer;
use crate::types::{Result, StickerError, StickerRecord};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use sticker_layout::{PageConfiguration, Quality, StickerDimensions, compute_page_grid};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Running,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    Png,
    Pdf,
}

/// Progress of the current (or most recent) export run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub mode: Option<ExportMode>,
    pub state: ExportState,
    pub total: usize,
    pub completed: usize,
    /// Records per batch (PNG) or stickers per page (PDF)
    pub batch_size: usize,
    /// 1-based batch or page number, 0 before the first one starts
    pub current_batch: usize,
    pub total_batches: usize,
    /// Percentage in `0.0..=100.0`, never decreasing within a run
    pub progress: f32,
    pub status: String,
}

impl Default for ExportJob {
    fn default() -> Self {
        Self {
            mode: None,
            state: ExportState::Idle,
            total: 0,
            completed: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            current_batch: 0,
            total_batches: 0,
            progress: 0.0,
            status: String::new(),
        }
    }
}

impl ExportJob {
    fn start(mode: ExportMode, total: usize, batch_size: usize) -> Self {
        Self {
            mode: Some(mode),
            state: ExportState::Running,
            total,
            batch_size,
            total_batches: total.div_ceil(batch_size),
            ..Default::default()
        }
    }
}

/// Notifications emitted while an export runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Status {
        message: String,
    },
    Progress {
        completed: usize,
        total: usize,
        percent: f32,
    },
    FileWritten {
        path: PathBuf,
    },
    Finished {
        outcome: ExportOutcome,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// `output` is the PNG directory or the PDF file.
    Completed { exported: usize, output: PathBuf },
    /// `exported` counts files already written. A cancelled PDF writes nothing.
    Cancelled { exported: usize },
}

impl ExportOutcome {
    pub fn exported(&self) -> usize {
        match self {
            ExportOutcome::Completed { exported, .. } | ExportOutcome::Cancelled { exported } => {
                *exported
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportOutcome::Cancelled { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PngExportOptions {
    pub output_dir: PathBuf,
    pub batch_size: usize,
    /// Pause after each file
    pub item_delay: Duration,
    /// Pause between batches
    pub batch_delay: Duration,
    pub quality: Quality,
}

impl PngExportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            item_delay: DEFAULT_ITEM_DELAY,
            batch_delay: DEFAULT_BATCH_DELAY,
            quality: Quality::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(StickerError::Config(
                "Batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfExportOptions {
    pub output_path: PathBuf,
    pub page: PageConfiguration,
}

/// Deterministic PNG file name for the record at `position` in the run.
pub fn png_file_name(record: &StickerRecord, position: usize) -> String {
    let stem = match (record.formatted_number.as_deref(), record.number) {
        (Some(formatted), _) if !formatted.is_empty() => formatted.replace(is_path_hostile, "_"),
        (_, Some(number)) => number.to_string(),
        _ => format!(
            "{}-{}",
            position + 1,
            record.name.replace(|c: char| !c.is_ascii_alphanumeric(), "_")
        ),
    };
    format!("sticker-{stem}.png")
}

fn is_path_hostile(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// Sleep unless cancellation arrives first.
async fn pause(duration: Duration, cancel: &CancellationToken) {
    if duration.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = cancel.cancelled() => {}
    }
}

/// Runs PNG batch and PDF exports for one set of sticker dimensions.
///
/// Only one run happens at a time; starting a run replaces the previous
/// run's [`ExportJob`]. Cancellation is checked before every batch and every
/// record, so a sticker already being rendered is still finished.
#[derive(Debug)]
pub struct ExportController {
    dimensions: StickerDimensions,
    renderer: StickerRenderer,
    job: ExportJob,
    events: Option<mpsc::UnboundedSender<ExportEvent>>,
}

impl ExportController {
    pub fn new(dimensions: StickerDimensions, fonts: Arc<FontSet>) -> Result<Self> {
        let renderer = StickerRenderer::new(&dimensions, fonts)?;
        Ok(Self {
            dimensions,
            renderer,
            job: ExportJob::default(),
            events: None,
        })
    }

    /// Send [`ExportEvent`]s to `events` while running.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<ExportEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn dimensions(&self) -> &StickerDimensions {
        &self.dimensions
    }

    pub fn job(&self) -> &ExportJob {
        &self.job
    }

    pub fn state(&self) -> ExportState {
        self.job.state
    }

    pub fn progress(&self) -> f32 {
        self.job.progress
    }

    pub fn status(&self) -> &str {
        &self.job.status
    }

    /// Write one PNG per record into `options.output_dir`, in batches.
    pub async fn export_png(
        &mut self,
        records: Arc<[StickerRecord]>,
        options: &PngExportOptions,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        options.validate()?;
        if records.is_empty() {
            return Err(StickerError::Config("No stickers to export".to_string()));
        }

        tokio::fs::create_dir_all(&options.output_dir).await?;
        self.job = ExportJob::start(ExportMode::Png, records.len(), options.batch_size);
        log::info!(
            "Exporting {} stickers as PNG in {} batches to {}",
            records.len(),
            self.job.total_batches,
            options.output_dir.display()
        );

        let result = self.run_png(&records, options, cancel).await;
        self.conclude(result)
    }

    async fn run_png(
        &mut self,
        records: &[StickerRecord],
        options: &PngExportOptions,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        let total_batches = self.job.total_batches;
        let mut exported = 0;

        for (batch_index, batch) in records.chunks(options.batch_size).enumerate() {
            if cancel.is_cancelled() {
                return Ok(ExportOutcome::Cancelled { exported });
            }

            let batch_number = batch_index + 1;
            self.job.current_batch = batch_number;
            self.set_status(format!("Processing batch {batch_number} of {total_batches}"));

            for (i, record) in batch.iter().enumerate() {
                if cancel.is_cancelled() {
                    return Ok(ExportOutcome::Cancelled { exported });
                }

                self.set_status(format!(
                    "Batch {batch_number}: Generating sticker {}/{}",
                    i + 1,
                    batch.len()
                ));

                let position = batch_index * options.batch_size + i;
                let png = self.renderer.render_png(record, options.quality).await?;
                let path = options.output_dir.join(png_file_name(record, position));
                tokio::fs::write(&path, png).await?;
                log::debug!("Wrote {}", path.display());

                exported += 1;
                self.emit(ExportEvent::FileWritten { path });
                self.advance(exported);

                pause(options.item_delay, cancel).await;
            }

            if batch_number < total_batches {
                self.set_status(format!(
                    "Completed batch {batch_number}. Preparing next batch..."
                ));
                pause(options.batch_delay, cancel).await;
            }
        }

        Ok(ExportOutcome::Completed {
            exported,
            output: options.output_dir.clone(),
        })
    }

    /// Lay every record out on grid pages and write a single PDF.
    ///
    /// Nothing is written when the run is cancelled.
    pub async fn export_pdf(
        &mut self,
        records: Arc<[StickerRecord]>,
        options: &PdfExportOptions,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        if records.is_empty() {
            return Err(StickerError::Config("No stickers to export".to_string()));
        }
        let grid = compute_page_grid(&options.page, self.dimensions.sticker)?;

        self.job = ExportJob::start(ExportMode::Pdf, records.len(), grid.stickers_per_page());
        log::info!(
            "Exporting {} stickers to {} ({} per page, {} pages)",
            records.len(),
            options.output_path.display(),
            grid.stickers_per_page(),
            grid.page_count(records.len())
        );

        let paginator = PdfPaginator::new(grid, &options.page);
        let result = self.run_pdf(&records, paginator, options, cancel).await;
        self.conclude(result)
    }

    async fn run_pdf(
        &mut self,
        records: &[StickerRecord],
        mut paginator: PdfPaginator,
        options: &PdfExportOptions,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        let total = records.len();

        for (index, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(ExportOutcome::Cancelled { exported: 0 });
            }

            self.set_status(format!("Processing sticker {} of {total}", index + 1));
            let image = self.renderer.render(record).await;
            let placement = paginator.place(&image)?;
            self.job.current_batch = placement.page + 1;
            self.advance(index + 1);

            tokio::task::yield_now().await;
        }

        self.set_status("Finalizing PDF...".to_string());
        let metadata = PdfMetadata::for_batch(&self.dimensions, total);
        let bytes = paginator.finish(metadata).await?;
        tokio::fs::write(&options.output_path, bytes).await?;

        Ok(ExportOutcome::Completed {
            exported: total,
            output: options.output_path.clone(),
        })
    }

    /// Move the job to its terminal state for `result`.
    fn conclude(&mut self, result: Result<ExportOutcome>) -> Result<ExportOutcome> {
        match &result {
            Ok(ExportOutcome::Completed { exported, output }) => {
                self.job.state = ExportState::Idle;
                let message = match self.job.mode {
                    Some(ExportMode::Pdf) => {
                        format!("PDF export completed! {exported} stickers exported.")
                    }
                    _ => format!("Export completed! {exported} stickers exported."),
                };
                self.set_status(message);
                log::info!("Export finished: {}", output.display());
            }
            Ok(ExportOutcome::Cancelled { exported }) => {
                self.job.state = ExportState::Cancelled;
                self.set_status("Export cancelled".to_string());
                log::info!("Export cancelled after {exported} stickers");
            }
            Err(e) => {
                self.job.state = ExportState::Idle;
                self.set_status(format!("Export failed: {e}"));
                log::error!("Export failed: {e}");
            }
        }

        if let Ok(outcome) = &result {
            self.emit(ExportEvent::Finished {
                outcome: outcome.clone(),
            });
        }
        result
    }

    fn advance(&mut self, completed: usize) {
        let percent = completed as f32 / self.job.total as f32 * 100.0;
        self.job.completed = completed;
        self.job.progress = self.job.progress.max(percent);
        self.emit(ExportEvent::Progress {
            completed,
            total: self.job.total,
            percent: self.job.progress,
        });
    }

    fn set_status(&mut self, message: String) {
        log::debug!("{message}");
        self.job.status = message.clone();
        self.emit(ExportEvent::Status { message });
    }

    fn emit(&self, event: ExportEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
