use crate::handlers;
use crate::{StickerCommand, StickerUpdate};
use std::sync::Arc;
use sticker_gen::FontSet;
use tokio::sync::mpsc;

/// Async worker task that processes sticker commands one at a time and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<StickerCommand>,
    update_tx: mpsc::UnboundedSender<StickerUpdate>,
) {
    let fonts = match FontSet::embedded() {
        Ok(fonts) => Some(Arc::new(fonts)),
        Err(e) => {
            let _ = update_tx.send(StickerUpdate::Error {
                message: format!("Failed to load fonts: {e}"),
            });
            None
        }
    };

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, fonts.as_ref(), &mut command_rx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

fn require_fonts<'a>(
    fonts: Option<&'a Arc<FontSet>>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) -> Option<&'a Arc<FontSet>> {
    if fonts.is_none() {
        let _ = update_tx.send(StickerUpdate::Error {
            message: "Fonts not loaded, cannot render stickers".to_string(),
        });
    }
    fonts
}

async fn process_command(
    cmd: StickerCommand,
    fonts: Option<&Arc<FontSet>>,
    command_rx: &mut mpsc::UnboundedReceiver<StickerCommand>,
    update_tx: &mpsc::UnboundedSender<StickerUpdate>,
) {
    match cmd {
        StickerCommand::LoadCsv { input_path } => {
            handlers::handle_load_csv(input_path, update_tx).await;
        }
        StickerCommand::WriteCsvTemplate { output_path } => {
            handlers::handle_write_template(output_path, update_tx).await;
        }
        StickerCommand::GenerateSeries { config, base } => {
            handlers::handle_generate_series(&config, &base, update_tx);
        }
        StickerCommand::RenderSticker {
            record,
            dimensions,
            output_path,
        } => {
            let Some(fonts) = require_fonts(fonts, update_tx) else {
                return;
            };
            handlers::handle_render_sticker(&record, &dimensions, output_path, fonts, update_tx)
                .await;
        }
        StickerCommand::RenderPagePreview {
            mut page,
            mut dimensions,
            mut sample,
        } => {
            // Drain any queued preview commands, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let StickerCommand::RenderPagePreview {
                    page: new_page,
                    dimensions: new_dimensions,
                    sample: new_sample,
                } = next_cmd
                {
                    log::debug!("Discarding queued page preview, using newer request");
                    page = new_page;
                    dimensions = new_dimensions;
                    sample = new_sample;
                } else {
                    // Non-preview command found, need to process it next
                    // Since we can't put it back, process it now before the preview
                    Box::pin(process_command(next_cmd, fonts, command_rx, update_tx)).await;
                }
            }

            let Some(fonts) = require_fonts(fonts, update_tx) else {
                return;
            };
            handlers::handle_page_preview(&page, &dimensions, sample.as_ref(), fonts, update_tx)
                .await;
        }
        StickerCommand::ExportPng {
            records,
            dimensions,
            options,
            cancel,
        } => {
            let Some(fonts) = require_fonts(fonts, update_tx) else {
                return;
            };
            handlers::handle_export_png(records, dimensions, options, cancel, fonts, update_tx)
                .await;
        }
        StickerCommand::ExportPdf {
            records,
            dimensions,
            options,
            cancel,
        } => {
            let Some(fonts) = require_fonts(fonts, update_tx) else {
                return;
            };
            handlers::handle_export_pdf(records, dimensions, options, cancel, fonts, update_tx)
                .await;
        }
        StickerCommand::LoadSettings { path } => {
            handlers::handle_load_settings(path, update_tx).await;
        }
        StickerCommand::SaveSettings { settings, path } => {
            handlers::handle_save_settings(settings, path, update_tx).await;
        }
    }
}
