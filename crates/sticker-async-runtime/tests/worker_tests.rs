use std::time::Duration;
use sticker_async_runtime::*;
use sticker_gen::sticker_layout::{BoxSize, Spacing};
use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn spawn_worker() -> (
    mpsc::UnboundedSender<StickerCommand>,
    mpsc::UnboundedReceiver<StickerUpdate>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    tokio::spawn(worker_task(command_rx, update_tx));
    (command_tx, update_rx)
}

fn small_dimensions() -> StickerDimensions {
    StickerDimensions {
        sticker: BoxSize::new(1.0, 1.5),
        logo: BoxSize::new(0.8, 0.4),
        qr: BoxSize::new(0.6, 0.6),
        contact: BoxSize::new(0.8, 0.3),
        spacing: Spacing {
            top: 0.05,
            middle: 0.05,
            bottom: 0.05,
        },
    }
}

/// Wait for the first update that is not a status or progress report.
async fn next_result(rx: &mut mpsc::UnboundedReceiver<StickerUpdate>) -> StickerUpdate {
    loop {
        match rx.recv().await {
            Some(StickerUpdate::Status { .. }) | Some(StickerUpdate::Progress { .. }) => continue,
            Some(update) => return update,
            None => panic!("worker stopped"),
        }
    }
}

#[tokio::test]
async fn test_generate_series_command() {
    let (tx, mut rx) = spawn_worker();
    let config = NumberSeriesConfig {
        start_number: 1,
        end_number: 4,
        ..Default::default()
    };
    tx.send(StickerCommand::GenerateSeries {
        config,
        base: StickerRecord::default(),
    })
    .unwrap();

    match next_result(&mut rx).await {
        StickerUpdate::SeriesGenerated { records } => assert_eq!(records.len(), 4),
        other => panic!("unexpected update: {other:?}"),
    }
}

#[tokio::test]
async fn test_export_png_command_reports_progress() {
    let dir = tempdir().unwrap();
    let (tx, mut rx) = spawn_worker();

    let records: Vec<_> = (1..=3)
        .map(|i| StickerRecord {
            id: i.to_string(),
            name: format!("Shop {i}"),
            phone: "555".into(),
            ..Default::default()
        })
        .collect();
    let options = PngExportOptions {
        item_delay: Duration::ZERO,
        batch_delay: Duration::ZERO,
        ..PngExportOptions::new(dir.path())
    };
    tx.send(StickerCommand::ExportPng {
        records: records.into(),
        dimensions: small_dimensions(),
        options,
        cancel: CancellationToken::new(),
    })
    .unwrap();

    let mut last_progress = 0;
    loop {
        match rx.recv().await.unwrap() {
            StickerUpdate::Progress { current, total, .. } => {
                assert_eq!(total, 3);
                assert!(current > last_progress);
                last_progress = current;
            }
            StickerUpdate::Status { .. } => {}
            StickerUpdate::ExportFinished { outcome } => {
                assert_eq!(outcome.exported(), 3);
                break;
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }
    assert_eq!(last_progress, 3);
    assert!(dir.path().join("sticker-1-Shop_1.png").exists());
}

#[tokio::test]
async fn test_page_preview_command() {
    let (tx, mut rx) = spawn_worker();
    tx.send(StickerCommand::RenderPagePreview {
        page: PageConfiguration::default(),
        dimensions: StickerDimensions::default(),
        sample: None,
    })
    .unwrap();

    match next_result(&mut rx).await {
        StickerUpdate::PagePreviewRendered {
            width,
            height,
            rgba_data,
        } => {
            assert_eq!(rgba_data.len(), (width * height * 4) as usize);
            assert!(width <= 400 && height <= 600);
        }
        other => panic!("unexpected update: {other:?}"),
    }
}

#[tokio::test]
async fn test_settings_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let (tx, mut rx) = spawn_worker();

    let settings = AppSettings {
        batch_size: 42,
        ..Default::default()
    };
    tx.send(StickerCommand::SaveSettings {
        settings: settings.clone(),
        path: path.clone(),
    })
    .unwrap();
    assert!(matches!(
        next_result(&mut rx).await,
        StickerUpdate::SettingsSaved { .. }
    ));

    tx.send(StickerCommand::LoadSettings { path }).unwrap();
    match next_result(&mut rx).await {
        StickerUpdate::SettingsLoaded { settings: loaded } => assert_eq!(loaded, settings),
        other => panic!("unexpected update: {other:?}"),
    }
}

#[tokio::test]
async fn test_csv_error_reported() {
    let dir = tempdir().unwrap();
    let (tx, mut rx) = spawn_worker();
    tx.send(StickerCommand::LoadCsv {
        input_path: dir.path().join("missing.csv"),
    })
    .unwrap();

    match next_result(&mut rx).await {
        StickerUpdate::Error { message } => assert!(message.contains("Failed to load CSV")),
        other => panic!("unexpected update: {other:?}"),
    }
}
