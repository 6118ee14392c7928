//! Page preview rasterization.
//!
//! Slots come from [`PageGrid::page_slots`], the same geometry the PDF
//! paginator places stickers with.

use crate::draw::{fill_rect, rgb, stroke_rect, stroke_rect_dashed};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use sticker_layout::{PageGrid, Rect};

const PAGE: Rgba<u8> = rgb(0xFFFFFF);
const PAGE_BORDER: Rgba<u8> = rgb(0xE5E7EB);
const MARGIN_TINT: Rgba<u8> = rgb(0xF9FAFB);
const PRINT_AREA: Rgba<u8> = rgb(0x3B82F6);
const SLOT_BORDER: Rgba<u8> = rgb(0x6B7280);
const SLOT_LOGO: Rgba<u8> = rgb(0xE5E7EB);
const SLOT_QR: Rgba<u8> = rgb(0x000000);
const SLOT_TEXT: Rgba<u8> = rgb(0x6B7280);

/// Preview canvas bounds in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    pub max_width_px: u32,
    pub max_height_px: u32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_width_px: 400,
            max_height_px: 600,
        }
    }
}

impl PreviewOptions {
    /// Pixels per millimeter so the whole page fits the bounds.
    pub fn scale_for(&self, grid: &PageGrid) -> f32 {
        (self.max_width_px as f32 / grid.page_width_mm)
            .min(self.max_height_px as f32 / grid.page_height_mm)
    }
}

/// Sticker slots of one page in preview pixels.
pub fn preview_slots(grid: &PageGrid, scale: f32) -> Vec<Rect> {
    grid.page_slots()
        .iter()
        .map(|slot| slot.scaled(scale))
        .collect()
}

/// Rasterize one page of the grid.
///
/// Every slot shows `sample` stretched to the slot when given, otherwise a
/// simplified sticker sketch.
pub fn render_page_preview(
    grid: &PageGrid,
    options: &PreviewOptions,
    sample: Option<&RgbaImage>,
) -> RgbaImage {
    let scale = options.scale_for(grid);
    let width = ((grid.page_width_mm * scale).round() as u32).max(1);
    let height = ((grid.page_height_mm * scale).round() as u32).max(1);

    let mut canvas = RgbaImage::from_pixel(width, height, MARGIN_TINT);
    let page = Rect::new(0.0, 0.0, width as f32, height as f32);
    let usable = grid.usable_rect().scaled(scale);

    fill_rect(&mut canvas, &usable, PAGE);
    stroke_rect(&mut canvas, &page, PAGE_BORDER, 1.0);
    stroke_rect_dashed(&mut canvas, &usable, PRINT_AREA, 5);

    let slots = preview_slots(grid, scale);
    let resized = sample.zip(slots.first()).and_then(|(sample, slot)| {
        let w = slot.width.round() as u32;
        let h = slot.height.round() as u32;
        (w > 0 && h > 0).then(|| imageops::resize(sample, w, h, FilterType::Triangle))
    });

    for slot in &slots {
        fill_rect(&mut canvas, slot, PAGE);
        match &resized {
            Some(sticker) => imageops::overlay(
                &mut canvas,
                sticker,
                slot.x.round() as i64,
                slot.y.round() as i64,
            ),
            None => sketch_sticker(&mut canvas, slot),
        }
        stroke_rect(&mut canvas, slot, SLOT_BORDER, 1.0);
    }

    canvas
}

fn sketch_sticker(canvas: &mut RgbaImage, slot: &Rect) {
    let Rect {
        x,
        y,
        width,
        height,
    } = *slot;
    let center_x = slot.center_x();

    fill_rect(
        canvas,
        &Rect::new(center_x - width * 0.4, y + height * 0.1, width * 0.8, height * 0.3),
        SLOT_LOGO,
    );

    let qr = width.min(height) * 0.25;
    fill_rect(
        canvas,
        &Rect::new(center_x - qr / 2.0, slot.center_y() - qr / 2.0, qr, qr),
        SLOT_QR,
    );

    let text_y = y + height * 0.8;
    fill_rect(
        canvas,
        &Rect::new(center_x - width * 0.35, text_y, width * 0.7, height * 0.05),
        SLOT_TEXT,
    );
    fill_rect(
        canvas,
        &Rect::new(x + width * 0.2, text_y + height * 0.07, width * 0.6, height * 0.04),
        SLOT_TEXT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticker_layout::{BoxSize, PageConfiguration, compute_page_grid};

    fn grid() -> PageGrid {
        compute_page_grid(&PageConfiguration::default(), BoxSize::new(5.0, 8.0)).unwrap()
    }

    #[test]
    fn test_preview_fits_bounds() {
        let grid = grid();
        let img = render_page_preview(&grid, &PreviewOptions::default(), None);
        assert!(img.width() <= 400);
        assert!(img.height() <= 600);
        // A4 portrait is width-bound at 400px
        assert_eq!(img.width(), 400);
    }

    #[test]
    fn test_preview_slots_match_grid() {
        let grid = grid();
        let scale = PreviewOptions::default().scale_for(&grid);
        let slots = preview_slots(&grid, scale);
        assert_eq!(slots.len(), grid.stickers_per_page());
        for (k, slot) in slots.iter().enumerate() {
            let expected = grid.placement(k).rect.scaled(scale);
            assert_eq!(*slot, expected);
        }
    }

    #[test]
    fn test_preview_draws_sample() {
        let grid = grid();
        let sample = RgbaImage::from_pixel(10, 16, Rgba([255, 0, 0, 255]));
        let options = PreviewOptions::default();
        let img = render_page_preview(&grid, &options, Some(&sample));
        let slot = preview_slots(&grid, options.scale_for(&grid))[0];
        let center = img.get_pixel(slot.center_x() as u32, slot.center_y() as u32);
        assert_eq!(*center, Rgba([255, 0, 0, 255]));
    }
}
