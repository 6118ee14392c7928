//! Shared constants and unit conversion
//!
//! Stickers are designed in centimeters, rasterized at 300 DPI and placed on
//! PDF pages measured in millimeters.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Pixels per centimeter at 300 DPI (300 / 2.54, rounded the way the designer tooling does)
pub const CM_TO_PIXELS: f32 = 118.11;

/// Millimeters per centimeter
pub const MM_PER_CM: f32 = 10.0;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert a physical length in centimeters to pixels at 300 DPI
#[inline]
pub fn cm_to_pixels(cm: f32) -> f32 {
    cm * CM_TO_PIXELS
}

/// Convert centimeters to millimeters (PDF page units)
#[inline]
pub fn cm_to_millimeters(cm: f32) -> f32 {
    cm * MM_PER_CM
}

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Page Defaults
// =============================================================================

/// Default page margin on every side (mm)
pub const DEFAULT_PAGE_MARGIN_MM: f32 = 10.0;

/// Default gap between neighbouring stickers (mm)
pub const DEFAULT_STICKER_GAP_MM: f32 = 5.0;

/// Default raster resolution for exported documents
pub const DEFAULT_DPI: u32 = 300;
