//! Region layout inside one sticker canvas
//!
//! Logo, QR code and contact text are stacked top to bottom and centered
//! horizontally. Each region starts below the previous region's bottom edge
//! plus its trailing spacing, so regions cannot overlap for non-negative input.

use crate::dimensions::{BoxSize, PixelDimensions, StickerDimensions};
use crate::types::Rect;

/// Pixel rectangles for every region of a sticker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickerLayout {
    /// Full canvas size in pixels
    pub canvas: BoxSize,
    pub logo: Rect,
    /// Always square
    pub qr: Rect,
    pub contact: Rect,
}

impl StickerLayout {
    /// Canvas size rounded to whole pixels (at least 1x1)
    pub fn canvas_pixels(&self) -> (u32, u32) {
        (
            (self.canvas.width.round() as u32).max(1),
            (self.canvas.height.round() as u32).max(1),
        )
    }

    /// The regions in drawing order
    pub fn regions(&self) -> [Rect; 3] {
        [self.logo, self.qr, self.contact]
    }

    /// Whether the stacked regions run past the bottom of the canvas
    pub fn is_clipped(&self) -> bool {
        self.contact.bottom() > self.canvas.height
    }
}

/// Compute the layout for physical dimensions (centimeters)
pub fn compute_sticker_layout(dimensions: &StickerDimensions) -> StickerLayout {
    layout_from_pixels(&dimensions.to_pixels())
}

/// Compute the layout for dimensions already converted to pixels
pub fn layout_from_pixels(px: &PixelDimensions) -> StickerLayout {
    let canvas_width = px.sticker.width;
    let centered = |width: f32| (canvas_width - width) / 2.0;

    let mut cursor = px.spacing.top;

    let logo = Rect::new(centered(px.logo.width), cursor, px.logo.width, px.logo.height);
    cursor += px.logo.height + px.spacing.middle;

    let qr_side = px.qr.width;
    let qr = Rect::new(centered(qr_side), cursor, qr_side, qr_side);
    cursor += qr_side + px.spacing.bottom;

    let contact = Rect::new(
        centered(px.contact.width),
        cursor,
        px.contact.width,
        px.contact.height,
    );

    StickerLayout {
        canvas: px.sticker,
        logo,
        qr,
        contact,
    }
}
