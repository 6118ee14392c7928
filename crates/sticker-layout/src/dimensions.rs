use crate::constants::cm_to_pixels;
use crate::types::{LayoutError, Result};

/// Width and height of one box, in centimeters or pixels depending on context
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

impl BoxSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Vertical gaps: above the logo, between logo and QR, between QR and contact text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing {
    pub top: f32,
    pub middle: f32,
    pub bottom: f32,
}

/// Physical sticker configuration, all values in centimeters.
///
/// The QR box is square: use [`StickerDimensions::set_qr_width`] or
/// [`StickerDimensions::set_qr_height`] to edit it, the last edit wins for both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StickerDimensions {
    pub sticker: BoxSize,
    pub logo: BoxSize,
    pub qr: BoxSize,
    pub contact: BoxSize,
    pub spacing: Spacing,
}

impl Default for StickerDimensions {
    fn default() -> Self {
        Self {
            sticker: BoxSize::new(5.0, 8.0),
            logo: BoxSize::new(3.8, 2.6),
            qr: BoxSize::new(3.1, 3.1),
            contact: BoxSize::new(3.8, 1.0),
            spacing: Spacing {
                top: 0.3,
                middle: 0.3,
                bottom: 0.3,
            },
        }
    }
}

impl StickerDimensions {
    pub fn set_qr_width(&mut self, width: f32) {
        self.qr = BoxSize::new(width, width);
    }

    pub fn set_qr_height(&mut self, height: f32) {
        self.qr = BoxSize::new(height, height);
    }

    /// Side length of the (square) QR box
    pub fn qr_side(&self) -> f32 {
        self.qr.width
    }

    /// Total height the stacked regions need, spacing included.
    ///
    /// Exceeding the sticker height is allowed; the overflow is clipped when drawn.
    pub fn content_height(&self) -> f32 {
        self.spacing.top
            + self.logo.height
            + self.spacing.middle
            + self.qr_side()
            + self.spacing.bottom
            + self.contact.height
    }

    pub fn fits_vertically(&self) -> bool {
        self.content_height() <= self.sticker.height
    }

    /// Human readable size, e.g. `5x8cm`
    pub fn size_label(&self) -> String {
        format!("{}x{}cm", self.sticker.width, self.sticker.height)
    }

    /// Convert every value to pixels at 300 DPI
    pub fn to_pixels(&self) -> PixelDimensions {
        let px = |b: BoxSize| BoxSize::new(cm_to_pixels(b.width), cm_to_pixels(b.height));
        let side = cm_to_pixels(self.qr_side());
        PixelDimensions {
            sticker: px(self.sticker),
            logo: px(self.logo),
            qr: BoxSize::new(side, side),
            contact: px(self.contact),
            spacing: Spacing {
                top: cm_to_pixels(self.spacing.top),
                middle: cm_to_pixels(self.spacing.middle),
                bottom: cm_to_pixels(self.spacing.bottom),
            },
        }
    }

    /// Validate the dimensions
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("sticker width", self.sticker.width),
            ("sticker height", self.sticker.height),
            ("logo width", self.logo.width),
            ("logo height", self.logo.height),
            ("QR size", self.qr.width),
            ("contact width", self.contact.width),
            ("contact height", self.contact.height),
            ("top spacing", self.spacing.top),
            ("middle spacing", self.spacing.middle),
            ("bottom spacing", self.spacing.bottom),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.sticker.width <= 0.0 || self.sticker.height <= 0.0 {
            return Err(LayoutError::Config(
                "Sticker width and height must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// [`StickerDimensions`] converted to pixels. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelDimensions {
    pub sticker: BoxSize,
    pub logo: BoxSize,
    pub qr: BoxSize,
    pub contact: BoxSize,
    pub spacing: Spacing,
}
