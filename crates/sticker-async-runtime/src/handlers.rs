use crate::StickerUpdate;
use std::path::PathBuf;
use std::sync::Arc;
use sticker_gen::{
    AppSettings, ExportController, ExportEvent, FontSet, NumberSeriesConfig, PdfExportOptions,
    PngExportOptions, PreviewOptions, StickerRecord, StickerRenderer, generate_series,
    load_from_csv, render_page_preview, write_template,
};
use sticker_layout::{PageConfiguration, Quality, StickerDimensions, compute_page_grid};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const EXPORT_OPERATION: &str = "Exporting stickers";

fn send_error(update_tx: &mpsc::UnboundedSender<StickerUpdate>, message: String) {
    log::error!("{message}");
    let _ = update_tx.send(StickerUpdate::Error { message });
}

pub async fn handle_load_csv(input_path: PathBuf, update_tx: &mpsc::UnboundedSender<StickerUpdate>) {
    match load_from_csv(&input_path).await {
        Ok(records) => {
            let _ = update_tx.send(StickerUpdate::CsvLoaded { records });
        }
        Err(e) => send_error(update_tx, format!("Failed to load CSV: {e}")),
    }
}

pub async fn handle_write_template(
    output_path: PathBuf,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    match write_template(&output_path).await {
        Ok(()) => {
            let _ = update_tx.send(StickerUpdate::TemplateWritten { path: output_path });
        }
        Err(e) => send_error(update_tx, format!("Failed to write CSV template: {e}")),
    }
}

pub fn handle_generate_series(
    config: &NumberSeriesConfig,
    base: &StickerRecord,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    let records = generate_series(config, base);
    let _ = update_tx.send(StickerUpdate::SeriesGenerated { records });
}

pub async fn handle_render_sticker(
    record: &StickerRecord,
    dimensions: &StickerDimensions,
    output_path: PathBuf,
    fonts: &Arc<FontSet>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    let result = async {
        let mut renderer = StickerRenderer::new(dimensions, Arc::clone(fonts))?;
        let png = renderer.render_png(record, Quality::default()).await?;
        tokio::fs::write(&output_path, png).await?;
        Ok::<_, sticker_gen::StickerError>(())
    }
    .await;

    match result {
        Ok(()) => {
            let _ = update_tx.send(StickerUpdate::StickerRendered { path: output_path });
        }
        Err(e) => send_error(update_tx, format!("Failed to render sticker: {e}")),
    }
}

pub async fn handle_page_preview(
    page: &PageConfiguration,
    dimensions: &StickerDimensions,
    sample: Option<&StickerRecord>,
    fonts: &Arc<FontSet>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    let result = async {
        let grid = compute_page_grid(page, dimensions.sticker)?;
        let sample_image = match sample {
            Some(record) => {
                let mut renderer = StickerRenderer::new(dimensions, Arc::clone(fonts))?;
                Some(renderer.render(record).await)
            }
            None => None,
        };
        Ok::<_, sticker_gen::StickerError>(render_page_preview(
            &grid,
            &PreviewOptions::default(),
            sample_image.as_ref(),
        ))
    }
    .await;

    match result {
        Ok(image) => {
            let _ = update_tx.send(StickerUpdate::PagePreviewRendered {
                width: image.width(),
                height: image.height(),
                rgba_data: image.into_raw(),
            });
        }
        Err(e) => send_error(update_tx, format!("Failed to render page preview: {e}")),
    }
}

/// Relay controller events as updates until the controller is dropped.
fn forward_events(
    mut events: mpsc::UnboundedReceiver<ExportEvent>,
    update_tx: mpsc::UnboundedSender<StickerUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let update = match event {
                ExportEvent::Status { message } => StickerUpdate::Status { message },
                ExportEvent::Progress {
                    completed, total, ..
                } => StickerUpdate::Progress {
                    operation: EXPORT_OPERATION.to_string(),
                    current: completed,
                    total,
                },
                ExportEvent::FileWritten { path } => {
                    log::debug!("Exported {}", path.display());
                    continue;
                }
                ExportEvent::Finished { .. } => continue,
            };
            let _ = update_tx.send(update);
        }
    })
}

pub async fn handle_export_png(
    records: Arc<[StickerRecord]>,
    dimensions: StickerDimensions,
    options: PngExportOptions,
    cancel: CancellationToken,
    fonts: &Arc<FontSet>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let forwarder = forward_events(event_rx, update_tx.clone());

    // The event sender lives inside this future, so the forwarder ends with it
    let result = async move {
        let mut controller =
            ExportController::new(dimensions, Arc::clone(fonts))?.with_events(event_tx);
        controller.export_png(records, &options, &cancel).await
    }
    .await;
    finish_export(result, forwarder, update_tx).await;
}

pub async fn handle_export_pdf(
    records: Arc<[StickerRecord]>,
    dimensions: StickerDimensions,
    options: PdfExportOptions,
    cancel: CancellationToken,
    fonts: &Arc<FontSet>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let forwarder = forward_events(event_rx, update_tx.clone());

    // The event sender lives inside this future, so the forwarder ends with it
    let result = async move {
        let mut controller =
            ExportController::new(dimensions, Arc::clone(fonts))?.with_events(event_tx);
        controller.export_pdf(records, &options, &cancel).await
    }
    .await;
    finish_export(result, forwarder, update_tx).await;
}

async fn finish_export(
    result: sticker_gen::Result<sticker_gen::ExportOutcome>,
    forwarder: JoinHandle<()>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    if let Err(e) = forwarder.await {
        log::warn!("Event forwarder failed: {e}");
    }

    match result {
        Ok(outcome) => {
            let _ = update_tx.send(StickerUpdate::ExportFinished { outcome });
        }
        Err(e) => send_error(update_tx, format!("Export failed: {e}")),
    }
}

pub async fn handle_load_settings(path: PathBuf, update_tx: &mpsc::UnboundedSender<StickerUpdate>) {
    match AppSettings::load(&path).await {
        Ok(settings) => {
            let _ = update_tx.send(StickerUpdate::SettingsLoaded { settings });
        }
        Err(e) => send_error(update_tx, format!("Failed to load settings: {e}")),
    }
}

pub async fn handle_save_settings(
    settings: AppSettings,
    path: PathBuf,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    let result = match settings.validate() {
        Ok(()) => settings.save(&path).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            let _ = update_tx.send(StickerUpdate::SettingsSaved { path });
        }
        Err(e) => send_error(update_tx, format!("Failed to save settings: {e}")),
    }
}
