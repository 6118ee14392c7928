use crate::raster::encode_png;
use crate::types::{Result, StickerError};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use printpdf::image::RawImage;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{Mm, OffsetDateTime, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, XObjectId};
use sticker_layout::{
    PageConfiguration, PageGrid, Quality, Rect, SlotPlacement, StickerDimensions, mm_to_pt,
};

const MM_PER_INCH: f32 = 25.4;

/// Document info attached when the PDF is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: String,
    pub subject: String,
    pub creator: String,
}

impl PdfMetadata {
    pub fn for_batch(dimensions: &StickerDimensions, count: usize) -> Self {
        Self {
            title: format!("Stickers Batch - {}", dimensions.size_label()),
            subject: format!("{count} stickers exported"),
            creator: "Sticker Generator Pro".to_string(),
        }
    }
}

/// Default file name for a PDF of `count` stickers.
pub fn pdf_file_name(dimensions: &StickerDimensions, count: usize) -> String {
    format!("stickers-batch-{}-{count}items.pdf", dimensions.size_label())
}

#[derive(Debug)]
struct PlacedSticker {
    png: Vec<u8>,
    rect: Rect,
}

/// Places sticker rasters onto grid slots, one page at a time, in input order.
///
/// Stickers are held as encoded PNGs until [`finish`](Self::finish) builds the
/// document, so nothing is written for a run that is abandoned.
#[derive(Debug)]
pub struct PdfPaginator {
    grid: PageGrid,
    quality: Quality,
    dpi: u32,
    pages: Vec<Vec<PlacedSticker>>,
    placed: usize,
}

impl PdfPaginator {
    pub fn new(grid: PageGrid, config: &PageConfiguration) -> Self {
        Self {
            grid,
            quality: config.quality,
            dpi: config.dpi,
            pages: Vec::new(),
            placed: 0,
        }
    }

    pub fn grid(&self) -> &PageGrid {
        &self.grid
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Place the next sticker, starting a new page when the current one is full.
    pub fn place(&mut self, image: &RgbaImage) -> Result<SlotPlacement> {
        let placement = self.grid.placement(self.placed);
        if placement.page >= self.pages.len() {
            log::debug!("Starting page {}", placement.page + 1);
            self.pages.push(Vec::new());
        }

        let png = match self.target_pixels(&placement.rect, image) {
            Some((width, height)) => {
                let resampled = imageops::resize(image, width, height, FilterType::Triangle);
                encode_png(&resampled, self.quality)?
            }
            None => encode_png(image, self.quality)?,
        };

        if let Some(page) = self.pages.last_mut() {
            page.push(PlacedSticker {
                png,
                rect: placement.rect,
            });
        }
        self.placed += 1;
        Ok(placement)
    }

    /// Smaller pixel size when the configured DPI needs fewer pixels than the raster has.
    fn target_pixels(&self, rect: &Rect, image: &RgbaImage) -> Option<(u32, u32)> {
        let dpi = self.dpi as f32;
        let width = ((rect.width / MM_PER_INCH * dpi).round() as u32).max(1);
        let height = ((rect.height / MM_PER_INCH * dpi).round() as u32).max(1);
        (width < image.width() && height < image.height()).then_some((width, height))
    }

    /// Build and serialize the document.
    pub async fn finish(self, metadata: PdfMetadata) -> Result<Vec<u8>> {
        // PDF generation is CPU-bound, spawn blocking
        let bytes = tokio::task::spawn_blocking(move || self.build(&metadata)).await??;
        Ok(bytes)
    }

    fn build(self, metadata: &PdfMetadata) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new(&metadata.title);
        doc.metadata.info.subject = metadata.subject.clone();
        doc.metadata.info.creator = metadata.creator.clone();
        let now = OffsetDateTime::now_utc();
        doc.metadata.info.creation_date = now;
        doc.metadata.info.modification_date = now;
        doc.metadata.info.metadata_date = now;

        let page_width = self.grid.page_width_mm;
        let page_height = self.grid.page_height_mm;
        let page_height_pt = mm_to_pt(page_height);

        let mut pages = Vec::with_capacity(self.pages.len().max(1));
        for stickers in self.pages {
            let mut ops = Vec::with_capacity(stickers.len());
            for sticker in stickers {
                let mut warnings = Vec::new();
                let raw_image = RawImage::decode_from_bytes(&sticker.png, &mut warnings)
                    .map_err(|e| StickerError::Pdf(format!("Failed to embed sticker: {e}")))?;
                let (img_w, img_h) = (raw_image.width as f32, raw_image.height as f32);

                let xobj_id = XObjectId::new();
                doc.resources
                    .xobjects
                    .map
                    .insert(xobj_id.clone(), XObject::Image(raw_image));

                let rect = sticker.rect;
                let transform = XObjectTransform {
                    translate_x: Some(Pt(mm_to_pt(rect.x))),
                    translate_y: Some(Pt(page_height_pt - mm_to_pt(rect.bottom()))),
                    scale_x: Some(mm_to_pt(rect.width) / img_w),
                    scale_y: Some(mm_to_pt(rect.height) / img_h),
                    rotate: None,
                    dpi: Some(72.0),
                };
                ops.push(Op::UseXobject {
                    id: xobj_id,
                    transform,
                });
            }
            pages.push(PdfPage::new(Mm(page_width), Mm(page_height), ops));
        }

        if pages.is_empty() {
            pages.push(PdfPage::new(Mm(page_width), Mm(page_height), Vec::new()));
        }

        doc.pages = pages;
        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticker_layout::{BoxSize, compute_page_grid};

    fn paginator(dpi: u32) -> PdfPaginator {
        let config = PageConfiguration {
            dpi,
            ..Default::default()
        };
        let grid = compute_page_grid(&config, BoxSize::new(5.0, 8.0)).unwrap();
        PdfPaginator::new(grid, &config)
    }

    #[test]
    fn test_metadata_and_file_name() {
        let dims = StickerDimensions::default();
        let meta = PdfMetadata::for_batch(&dims, 12);
        assert_eq!(meta.title, "Stickers Batch - 5x8cm");
        assert_eq!(meta.subject, "12 stickers exported");
        assert_eq!(meta.creator, "Sticker Generator Pro");
        assert_eq!(pdf_file_name(&dims, 12), "stickers-batch-5x8cm-12items.pdf");
    }

    #[test]
    fn test_pages_follow_grid() {
        let mut pdf = paginator(300);
        let image = RgbaImage::from_pixel(20, 32, image::Rgba([255, 255, 255, 255]));
        let placements: Vec<_> = (0..10).map(|_| pdf.place(&image).unwrap()).collect();

        assert_eq!(pdf.placed(), 10);
        assert_eq!(pdf.page_count(), 2);
        assert_eq!(placements[8].page, 0);
        assert_eq!(placements[9].page, 1);
        assert_eq!(placements[9].rect, placements[0].rect);
    }

    #[test]
    fn test_document_info_is_dated() {
        let mut pdf = paginator(300);
        let image = RgbaImage::from_pixel(20, 32, image::Rgba([255, 255, 255, 255]));
        pdf.place(&image).unwrap();
        let meta = PdfMetadata::for_batch(&StickerDimensions::default(), 1);
        let bytes = pdf.build(&meta).unwrap();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let info = doc
            .trailer
            .get(b"Info")
            .and_then(|obj| obj.as_reference())
            .and_then(|id| doc.get_dictionary(id))
            .unwrap();
        for key in [&b"CreationDate"[..], b"ModDate"] {
            let date = info.get(key).and_then(|obj| obj.as_str()).unwrap();
            assert!(date.starts_with(b"D:"));
            assert!(!date.starts_with(b"D:1970"), "{}", String::from_utf8_lossy(date));
        }
        assert_eq!(
            info.get(b"Subject").and_then(|obj| obj.as_str()).unwrap(),
            b"1 stickers exported"
        );
    }

    #[test]
    fn test_downsample_for_low_dpi() {
        let pdf = paginator(72);
        let rect = Rect::new(0.0, 0.0, 50.0, 80.0);
        let image = RgbaImage::new(591, 945);
        // 50mm at 72dpi is about 142px
        assert_eq!(pdf.target_pixels(&rect, &image), Some((142, 227)));

        let pdf = paginator(300);
        assert_eq!(pdf.target_pixels(&rect, &image), None);
    }
}
