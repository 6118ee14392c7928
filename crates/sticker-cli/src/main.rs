use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use sticker_gen::{
    AppSettings, AppState, ExportController, ExportEvent, ExportOutcome, FontSet, LogoImage,
    PdfExportOptions, PngExportOptions, PreviewOptions, StickerRecord, StickerRenderer,
    load_from_csv, pdf_file_name, preview_numbers, qr_preview, render_page_preview,
    write_template,
};
use sticker_layout::{
    Orientation, PageConfiguration, PageMargins, PaperSize, Quality, StickerGaps,
    compute_page_grid, compute_sticker_layout,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "stkr", about = "Sticker sheet generator", version)]
struct Cli {
    /// Settings file (JSON). Missing file means defaults.
    #[arg(long, global = true, default_value = "stickers.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one sticker to a PNG file
    Render {
        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        sticker: StickerArgs,

        #[command(flatten)]
        size: SizeArgs,
    },

    /// Export one PNG per sticker, in batches
    Png {
        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        sticker: StickerArgs,

        #[command(flatten)]
        size: SizeArgs,

        /// Stickers per batch (defaults to the saved batch size)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Pause after each file, in milliseconds
        #[arg(long, default_value = "50")]
        item_delay_ms: u64,

        /// Pause between batches, in milliseconds
        #[arg(long, default_value = "1000")]
        batch_delay_ms: u64,

        /// PNG compression
        #[arg(long, value_enum)]
        quality: Option<QualityArg>,
    },

    /// Export every sticker into a single PDF
    Pdf {
        /// Output PDF file (defaults to stickers-batch-<size>-<count>items.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        sticker: StickerArgs,

        #[command(flatten)]
        size: SizeArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Print the sticker regions and the page grid
    Layout {
        #[command(flatten)]
        size: SizeArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Render a preview image of one page
    Preview {
        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Fill every slot with the rendered sticker instead of a sketch
        #[arg(long)]
        sample: bool,

        #[command(flatten)]
        sticker: StickerArgs,

        #[command(flatten)]
        size: SizeArgs,

        #[command(flatten)]
        page: PageArgs,

        /// Maximum preview width in pixels
        #[arg(long, default_value = "400")]
        max_width: u32,

        /// Maximum preview height in pixels
        #[arg(long, default_value = "600")]
        max_height: u32,
    },

    /// Show what a numbered series would produce
    Series {
        #[command(flatten)]
        series: SeriesArgs,

        #[command(flatten)]
        sticker: StickerArgs,

        /// Save the series settings
        #[arg(long)]
        save: bool,
    },

    /// Write a CSV template with example rows
    Template {
        /// Output CSV file
        #[arg(short, long, default_value = "sticker-template.csv")]
        output: PathBuf,
    },

    /// Show or reset saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings as JSON
    Show,
    /// Write default settings
    Reset,
}

/// Content of the base sticker design
#[derive(Args)]
struct StickerArgs {
    /// Business name
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    website: Option<String>,

    /// Explicit QR payload
    #[arg(long)]
    qr_data: Option<String>,

    /// Logo image file (PNG, JPEG, GIF or WebP)
    #[arg(long)]
    logo: Option<PathBuf>,
}

/// Where the exported records come from
#[derive(Args)]
struct SourceArgs {
    /// Import stickers from a CSV file
    #[arg(short, long, conflicts_with = "series")]
    input: Option<PathBuf>,

    /// Expand the saved numbered series from the base design
    #[arg(long)]
    series: bool,
}

#[derive(Args)]
struct SizeArgs {
    /// Sticker width in cm
    #[arg(long)]
    width_cm: Option<f32>,

    /// Sticker height in cm
    #[arg(long)]
    height_cm: Option<f32>,

    /// QR code side in cm
    #[arg(long)]
    qr_cm: Option<f32>,
}

#[derive(Args)]
struct PageArgs {
    /// Paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Custom paper width in mm (with --paper custom)
    #[arg(long, requires = "paper_height_mm")]
    paper_width_mm: Option<f32>,

    /// Custom paper height in mm (with --paper custom)
    #[arg(long, requires = "paper_width_mm")]
    paper_height_mm: Option<f32>,

    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Page margin in mm (uniform on all sides)
    #[arg(long)]
    margin: Option<f32>,

    /// Gap between stickers in mm
    #[arg(long)]
    gap: Option<f32>,

    /// Sticker scale factor
    #[arg(long)]
    scale: Option<f32>,

    /// Resolution of embedded sticker images
    #[arg(long)]
    dpi: Option<u32>,

    #[arg(long, value_enum)]
    quality: Option<QualityArg>,
}

#[derive(Args)]
struct SeriesArgs {
    #[arg(long)]
    start: Option<i64>,

    #[arg(long)]
    end: Option<i64>,

    #[arg(long)]
    prefix: Option<String>,

    #[arg(long)]
    suffix: Option<String>,

    /// Zero-pad width (0 = none)
    #[arg(long)]
    padding: Option<usize>,

    /// Encode only the bare number in the QR code
    #[arg(long)]
    qr_number_only: Option<bool>,

    /// Append ?id=<number> to the base QR payload
    #[arg(long)]
    include_in_qr: Option<bool>,

    /// Append #<number> to the name
    #[arg(long)]
    include_in_name: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Custom,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Draft,
    Normal,
    High,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Draft => Self::Draft,
            QualityArg::Normal => Self::Normal,
            QualityArg::High => Self::High,
        }
    }
}

impl PaperArg {
    fn to_paper_size(self, width_mm: Option<f32>, height_mm: Option<f32>) -> Result<PaperSize> {
        Ok(match self {
            PaperArg::A3 => PaperSize::A3,
            PaperArg::A4 => PaperSize::A4,
            PaperArg::A5 => PaperSize::A5,
            PaperArg::Letter => PaperSize::Letter,
            PaperArg::Legal => PaperSize::Legal,
            PaperArg::Custom => match (width_mm, height_mm) {
                (Some(width_mm), Some(height_mm)) => PaperSize::Custom {
                    width_mm,
                    height_mm,
                },
                _ => bail!("--paper custom needs --paper-width-mm and --paper-height-mm"),
            },
        })
    }
}

impl StickerArgs {
    async fn apply(&self, base: &StickerRecord) -> Result<StickerRecord> {
        let mut record = base.clone();
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            record.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        if let Some(website) = &self.website {
            record.website = Some(website.clone());
        }
        if let Some(qr_data) = &self.qr_data {
            record.qr_data = qr_data.clone();
        }
        if let Some(logo) = &self.logo {
            let image = LogoImage::load(logo)
                .await
                .with_context(|| format!("Failed to read logo {}", logo.display()))?;
            record.logo = Some(image);
        }
        Ok(record)
    }
}

impl SizeArgs {
    fn apply(&self, settings: &mut AppSettings) {
        let dims = &mut settings.dimensions;
        if let Some(width) = self.width_cm {
            dims.sticker.width = width;
        }
        if let Some(height) = self.height_cm {
            dims.sticker.height = height;
        }
        if let Some(qr) = self.qr_cm {
            dims.set_qr_width(qr);
        }
    }
}

impl PageArgs {
    fn apply(&self, page: &mut PageConfiguration) -> Result<()> {
        if let Some(paper) = self.paper {
            page.paper_size = paper.to_paper_size(self.paper_width_mm, self.paper_height_mm)?;
        }
        if let Some(orientation) = self.orientation {
            page.orientation = orientation.into();
        }
        if let Some(margin) = self.margin {
            page.margins = PageMargins::uniform(margin);
        }
        if let Some(gap) = self.gap {
            page.gaps = StickerGaps::uniform(gap);
        }
        if let Some(scale) = self.scale {
            page.sticker_scale = scale;
        }
        if let Some(dpi) = self.dpi {
            page.dpi = dpi;
        }
        if let Some(quality) = self.quality {
            page.quality = quality.into();
        }
        Ok(())
    }
}

impl SeriesArgs {
    fn apply(&self, settings: &mut AppSettings) {
        let series = &mut settings.series;
        if let Some(start) = self.start {
            series.start_number = start;
        }
        if let Some(end) = self.end {
            series.end_number = end;
        }
        if let Some(prefix) = &self.prefix {
            series.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            series.suffix = suffix.clone();
        }
        if let Some(padding) = self.padding {
            series.padding_length = padding;
        }
        if let Some(value) = self.qr_number_only {
            series.qr_number_only = value;
        }
        if let Some(value) = self.include_in_qr {
            series.include_in_qr = value;
        }
        if let Some(value) = self.include_in_name {
            series.include_in_name = value;
        }
    }
}

/// Build the application state and pick the data source.
async fn load_state(
    settings: AppSettings,
    sticker: &StickerArgs,
    source: Option<&SourceArgs>,
) -> Result<AppState> {
    let mut state = AppState::new(settings);
    let base = sticker.apply(state.base()).await?;
    state.set_base(base);

    match source {
        Some(SourceArgs {
            input: Some(input), ..
        }) => {
            let records = load_from_csv(input)
                .await
                .with_context(|| format!("Failed to import {}", input.display()))?;
            state.select_bulk(records);
        }
        Some(SourceArgs { series: true, .. }) => {
            state.select_series();
        }
        _ => state.select_single(),
    }

    if state.source().is_empty() {
        bail!("{} has no stickers to export", state.source().label());
    }
    log::info!(
        "Data source: {} ({} stickers)",
        state.source().label(),
        state.source().len()
    );
    Ok(state)
}

/// Cancel `token` on Ctrl+C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Stop requested, finishing the current sticker");
            token.cancel();
        }
    });
}

/// Log controller events until the controller is dropped.
fn log_events(mut events: mpsc::UnboundedReceiver<ExportEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ExportEvent::Status { message } => log::info!("{message}"),
                ExportEvent::Progress {
                    completed,
                    total,
                    percent,
                } => log::debug!("{completed}/{total} ({percent:.1}%)"),
                ExportEvent::FileWritten { path } => log::debug!("Wrote {}", path.display()),
                ExportEvent::Finished { .. } => {}
            }
        }
    })
}

fn report(outcome: &ExportOutcome) {
    match outcome {
        ExportOutcome::Completed { exported, output } => {
            println!("Exported {} stickers → {}", exported, output.display());
        }
        ExportOutcome::Cancelled { exported } => {
            println!("Export cancelled after {} stickers", exported);
        }
    }
}

async fn write_png(image: &image::RgbaImage, quality: Quality, path: &Path) -> Result<()> {
    let bytes = sticker_gen::encode_png(image, quality)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = AppSettings::load(&cli.settings)
        .await
        .with_context(|| format!("Failed to load settings from {}", cli.settings.display()))?;

    match cli.command {
        Commands::Render {
            output,
            sticker,
            size,
        } => {
            size.apply(&mut settings);
            let state = load_state(settings, &sticker, None).await?;
            let fonts = Arc::new(FontSet::embedded()?);
            let mut renderer = StickerRenderer::new(&state.settings.dimensions, fonts)?;
            let image = renderer.render(state.base()).await;
            write_png(&image, state.settings.page.quality, &output).await?;
            println!(
                "Rendered {}x{} sticker → {}",
                image.width(),
                image.height(),
                output.display()
            );
        }

        Commands::Png {
            output_dir,
            source,
            sticker,
            size,
            batch_size,
            item_delay_ms,
            batch_delay_ms,
            quality,
        } => {
            size.apply(&mut settings);
            let state = load_state(settings, &sticker, Some(&source)).await?;
            let options = PngExportOptions {
                batch_size: batch_size.unwrap_or(state.settings.batch_size),
                item_delay: Duration::from_millis(item_delay_ms),
                batch_delay: Duration::from_millis(batch_delay_ms),
                quality: quality.map(Into::into).unwrap_or(state.settings.page.quality),
                ..PngExportOptions::new(output_dir)
            };

            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            let logger = log_events(event_rx);

            let fonts = Arc::new(FontSet::embedded()?);
            let mut controller =
                ExportController::new(state.settings.dimensions, fonts)?.with_events(event_tx);
            let outcome = controller
                .export_png(state.export_snapshot(), &options, &cancel)
                .await?;
            drop(controller);
            logger.await?;
            report(&outcome);
        }

        Commands::Pdf {
            output,
            source,
            sticker,
            size,
            page,
        } => {
            size.apply(&mut settings);
            page.apply(&mut settings.page)?;
            let state = load_state(settings, &sticker, Some(&source)).await?;
            let records = state.export_snapshot();
            let output = output.unwrap_or_else(|| {
                PathBuf::from(pdf_file_name(&state.settings.dimensions, records.len()))
            });
            let options = PdfExportOptions {
                output_path: output,
                page: state.settings.page,
            };

            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            let logger = log_events(event_rx);

            let fonts = Arc::new(FontSet::embedded()?);
            let mut controller =
                ExportController::new(state.settings.dimensions, fonts)?.with_events(event_tx);
            let outcome = controller.export_pdf(records, &options, &cancel).await?;
            drop(controller);
            logger.await?;
            report(&outcome);
        }

        Commands::Layout { size, page } => {
            size.apply(&mut settings);
            page.apply(&mut settings.page)?;
            settings.validate()?;

            let dims = &settings.dimensions;
            let layout = compute_sticker_layout(dims);
            let (canvas_w, canvas_h) = layout.canvas_pixels();
            println!("Sticker {} ({}x{} px)", dims.size_label(), canvas_w, canvas_h);
            for (label, rect) in ["Logo", "QR", "Contact"].iter().zip(layout.regions()) {
                println!(
                    "  {:<8} x={:.1} y={:.1} w={:.1} h={:.1}",
                    label, rect.x, rect.y, rect.width, rect.height
                );
            }
            if layout.is_clipped() {
                println!("  Warning: content is taller than the sticker");
            }

            let grid = compute_page_grid(&settings.page, dims.sticker)?;
            println!(
                "Page {} {:.1}x{:.1} mm",
                settings.page.paper_size.name(),
                grid.page_width_mm,
                grid.page_height_mm
            );
            println!(
                "  {} x {} grid, {} stickers/page",
                grid.stickers_per_row,
                grid.stickers_per_col,
                grid.stickers_per_page()
            );
            if grid.fit_scale < 1.0 {
                println!("  Stickers shrunk to {:.0}% to fit", grid.fit_scale * 100.0);
            }
        }

        Commands::Preview {
            output,
            sample,
            sticker,
            size,
            page,
            max_width,
            max_height,
        } => {
            size.apply(&mut settings);
            page.apply(&mut settings.page)?;
            let state = load_state(settings, &sticker, None).await?;
            let grid = compute_page_grid(&state.settings.page, state.settings.dimensions.sticker)?;

            let sample_image = if sample {
                let fonts = Arc::new(FontSet::embedded()?);
                let mut renderer = StickerRenderer::new(&state.settings.dimensions, fonts)?;
                Some(renderer.render(state.base()).await)
            } else {
                None
            };

            let options = PreviewOptions {
                max_width_px: max_width,
                max_height_px: max_height,
            };
            let image = render_page_preview(&grid, &options, sample_image.as_ref());
            write_png(&image, Quality::Normal, &output).await?;
            println!(
                "{} stickers/page preview → {}",
                grid.stickers_per_page(),
                output.display()
            );
        }

        Commands::Series {
            series,
            sticker,
            save,
        } => {
            series.apply(&mut settings);
            if save {
                settings.save(&cli.settings).await?;
                println!("Saved series settings → {}", cli.settings.display());
            }

            let config = &settings.series;
            let count = sticker_gen::series_count(config);
            if count == 0 {
                println!("Invalid range: no stickers");
                return Ok(());
            }
            let base = sticker.apply(&sticker_gen::default_base_record()).await?;
            println!("{} stickers", count);
            println!("  {}", preview_numbers(config).join(", "));
            if let Some(line) = qr_preview(config, &base) {
                println!("  First QR: {}", line);
            }
        }

        Commands::Template { output } => {
            write_template(&output).await?;
            println!("CSV template → {}", output.display());
        }

        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            SettingsAction::Reset => {
                AppSettings::default().save(&cli.settings).await?;
                println!("Default settings → {}", cli.settings.display());
            }
        },
    }

    Ok(())
}
