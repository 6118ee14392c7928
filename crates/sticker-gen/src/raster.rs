use crate::draw::{draw_text_centered, fill_rect, rgb, stroke_rect};
use crate::fonts::FontSet;
use crate::qr::render_qr;
use crate::types::{LogoImage, Result, StickerRecord};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::sync::Arc;
use sticker_layout::{Quality, Rect, StickerDimensions, StickerLayout, compute_sticker_layout};

const BACKGROUND: Rgba<u8> = rgb(0xFFFFFF);
const BORDER: Rgba<u8> = rgb(0xE5E7EB);
const BORDER_WIDTH: f32 = 2.0;
const PLACEHOLDER_FILL: Rgba<u8> = rgb(0xF3F4F6);
const PLACEHOLDER_INK: Rgba<u8> = rgb(0x9CA3AF);
const PRIMARY_TEXT: Rgba<u8> = rgb(0x1F2937);
const MUTED_TEXT: Rgba<u8> = rgb(0x6B7280);

const MAX_FONT_PX: f32 = 32.0;
const LOGO_LABEL: &str = "LOGO";

/// Decode logo bytes on the blocking pool.
pub async fn decode_image(logo: LogoImage) -> Result<DynamicImage> {
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(logo.bytes())).await??;
    Ok(image)
}

/// Encode a canvas as PNG. Quality only selects the compression level.
pub fn encode_png(image: &RgbaImage, quality: Quality) -> Result<Vec<u8>> {
    let compression = match quality {
        Quality::Draft => CompressionType::Fast,
        Quality::Normal => CompressionType::Default,
        Quality::High => CompressionType::Best,
    };

    let mut bytes = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut bytes, compression, PngFilter::Adaptive);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// A line of contact text relative to the top of the contact region.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactLine {
    pub text: String,
    pub font_px: f32,
    pub baseline_offset: f32,
    pub bold: bool,
    pub muted: bool,
}

/// Phone, email and (space permitting) website lines for a contact region
/// `height` pixels tall.
pub fn contact_lines(record: &StickerRecord, height: f32) -> Vec<ContactLine> {
    let base = (height / 3.0).min(MAX_FONT_PX);
    if base <= 0.0 {
        return Vec::new();
    }

    let mut lines = vec![
        ContactLine {
            text: record.phone.clone(),
            font_px: base,
            baseline_offset: base,
            bold: true,
            muted: false,
        },
        ContactLine {
            text: record.email.clone(),
            font_px: base * 0.8,
            baseline_offset: base * 2.2,
            bold: false,
            muted: false,
        },
    ];

    let website = record.website();
    if !website.is_empty() && height > base * 2.5 {
        lines.push(ContactLine {
            text: website.to_string(),
            font_px: base * 0.7,
            baseline_offset: base * 3.2,
            bold: false,
            muted: true,
        });
    }
    lines
}

fn pixel_size(rect: &Rect) -> (u32, u32) {
    (
        rect.width.round().max(0.0) as u32,
        rect.height.round().max(0.0) as u32,
    )
}

/// Rasterizes records for one set of sticker dimensions.
///
/// The most recently decoded logo is kept (already stretched to the logo
/// region), so a series sharing one logo decodes it once.
pub struct StickerRenderer {
    layout: StickerLayout,
    fonts: Arc<FontSet>,
    logo_cache: Option<(LogoImage, Option<Arc<RgbaImage>>)>,
}

impl StickerRenderer {
    pub fn new(dimensions: &StickerDimensions, fonts: Arc<FontSet>) -> Result<Self> {
        dimensions.validate()?;
        let layout = compute_sticker_layout(dimensions);
        if layout.is_clipped() {
            log::warn!(
                "Sticker content is taller than the {} canvas and will be clipped",
                dimensions.size_label()
            );
        }

        Ok(Self {
            layout,
            fonts,
            logo_cache: None,
        })
    }

    pub fn layout(&self) -> &StickerLayout {
        &self.layout
    }

    /// Render one record. Rendering problems degrade to placeholders and never fail.
    pub async fn render(&mut self, record: &StickerRecord) -> RgbaImage {
        let logo = match &record.logo {
            Some(logo) => self.prepared_logo(logo).await,
            None => None,
        };
        self.compose(record, logo.as_deref())
    }

    /// Render one record and encode it as PNG.
    pub async fn render_png(&mut self, record: &StickerRecord, quality: Quality) -> Result<Vec<u8>> {
        let image = self.render(record).await;

        // PNG encoding is CPU-bound, spawn blocking
        let bytes = tokio::task::spawn_blocking(move || encode_png(&image, quality)).await??;
        Ok(bytes)
    }

    async fn prepared_logo(&mut self, logo: &LogoImage) -> Option<Arc<RgbaImage>> {
        if let Some((cached, prepared)) = &self.logo_cache {
            if cached.shares_bytes_with(logo) {
                return prepared.clone();
            }
        }

        let (width, height) = pixel_size(&self.layout.logo);
        let prepared = if width == 0 || height == 0 {
            None
        } else {
            match decode_image(logo.clone()).await {
                Ok(image) => Some(Arc::new(
                    image
                        .resize_exact(width, height, FilterType::Triangle)
                        .to_rgba8(),
                )),
                Err(e) => {
                    log::warn!("Failed to decode logo, drawing placeholder instead: {e}");
                    None
                }
            }
        };

        self.logo_cache = Some((logo.clone(), prepared.clone()));
        prepared
    }

    /// Draw a record onto a fresh canvas. `logo` must already match the logo
    /// region's pixel size.
    pub fn compose(&self, record: &StickerRecord, logo: Option<&RgbaImage>) -> RgbaImage {
        let (width, height) = self.layout.canvas_pixels();
        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
        let frame = Rect::new(0.0, 0.0, width as f32, height as f32);
        stroke_rect(&mut canvas, &frame, BORDER, BORDER_WIDTH);

        self.draw_logo(&mut canvas, logo);
        self.draw_qr(&mut canvas, record);
        self.draw_contact(&mut canvas, record);
        canvas
    }

    fn draw_logo(&self, canvas: &mut RgbaImage, logo: Option<&RgbaImage>) {
        let rect = self.layout.logo;
        if let Some(logo) = logo {
            imageops::overlay(canvas, logo, rect.x.round() as i64, rect.y.round() as i64);
            return;
        }

        fill_rect(canvas, &rect, PLACEHOLDER_FILL);
        let font_px = (rect.width / 8.0).min(MAX_FONT_PX);
        draw_text_centered(
            canvas,
            &self.fonts.regular,
            font_px,
            rect.center_x(),
            rect.center_y() + font_px * 0.35,
            PLACEHOLDER_INK,
            LOGO_LABEL,
        );
    }

    fn draw_qr(&self, canvas: &mut RgbaImage, record: &StickerRecord) {
        let rect = self.layout.qr;
        let (side, _) = pixel_size(&rect);
        if side == 0 {
            return;
        }

        let symbol = match record.resolved_qr_payload() {
            Some(payload) => match render_qr(&payload, side) {
                Ok(symbol) => Some(symbol),
                Err(e) => {
                    log::warn!("QR generation failed for sticker {}: {e}", record.id);
                    None
                }
            },
            None => {
                log::debug!("Sticker {} has no QR payload", record.id);
                None
            }
        };

        match symbol {
            Some(symbol) => {
                imageops::overlay(canvas, &symbol, rect.x.round() as i64, rect.y.round() as i64)
            }
            None => {
                fill_rect(canvas, &rect, PLACEHOLDER_FILL);
                stroke_rect(canvas, &rect, PLACEHOLDER_INK, BORDER_WIDTH);
            }
        }
    }

    fn draw_contact(&self, canvas: &mut RgbaImage, record: &StickerRecord) {
        let rect = self.layout.contact;
        for line in contact_lines(record, rect.height) {
            if line.text.is_empty() {
                continue;
            }
            let font = if line.bold {
                &self.fonts.bold
            } else {
                &self.fonts.regular
            };
            let color = if line.muted { MUTED_TEXT } else { PRIMARY_TEXT };
            draw_text_centered(
                canvas,
                font,
                line.font_px,
                rect.center_x(),
                rect.y + line.baseline_offset,
                color,
                &line.text,
            );
        }
    }
}

impl std::fmt::Debug for StickerRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickerRenderer")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StickerRecord {
        StickerRecord {
            id: "1".into(),
            name: "Shop".into(),
            phone: "+1 555 0100".into(),
            email: "shop@example.com".into(),
            website: Some("https://shop.example".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_contact_lines_sizes() {
        let lines = contact_lines(&record(), 60.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].font_px, 20.0);
        assert!(lines[0].bold);
        assert!((lines[1].font_px - 16.0).abs() < 1e-4);
        assert!((lines[1].baseline_offset - 44.0).abs() < 1e-4);
        assert!(lines[2].muted);
    }

    #[test]
    fn test_contact_font_capped() {
        let lines = contact_lines(&record(), 300.0);
        assert_eq!(lines[0].font_px, MAX_FONT_PX);
    }

    #[test]
    fn test_contact_without_website() {
        let r = StickerRecord {
            website: None,
            ..record()
        };
        let lines = contact_lines(&r, 118.0);
        assert_eq!(lines.len(), 2);
        assert!(contact_lines(&r, 0.0).is_empty());
    }

    #[test]
    fn test_logo_placeholder_label_is_regular_weight() {
        let fonts = Arc::new(FontSet::embedded().unwrap());
        let renderer =
            StickerRenderer::new(&StickerDimensions::default(), Arc::clone(&fonts)).unwrap();
        let rendered = renderer.compose(&record(), None);

        let rect = renderer.layout().logo;
        let font_px = (rect.width / 8.0).min(MAX_FONT_PX);
        let relabel = |font: &rusttype::Font<'static>| {
            let mut img = rendered.clone();
            fill_rect(&mut img, &rect, PLACEHOLDER_FILL);
            draw_text_centered(
                &mut img,
                font,
                font_px,
                rect.center_x(),
                rect.center_y() + font_px * 0.35,
                PLACEHOLDER_INK,
                LOGO_LABEL,
            );
            img
        };

        assert!(rendered == relabel(&fonts.regular));
        assert!(rendered != relabel(&fonts.bold));
    }

    #[test]
    fn test_encode_png_signature() {
        let img = RgbaImage::from_pixel(4, 3, BACKGROUND);
        for quality in [Quality::Draft, Quality::Normal, Quality::High] {
            let bytes = encode_png(&img, quality).unwrap();
            assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        }
    }
}
