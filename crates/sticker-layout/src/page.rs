use crate::constants::{DEFAULT_DPI, DEFAULT_PAGE_MARGIN_MM, DEFAULT_STICKER_GAP_MM};
use crate::types::*;

/// Page margins - keeps stickers inside the printer-safe area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageMargins {
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::uniform(DEFAULT_PAGE_MARGIN_MM)
    }
}

impl PageMargins {
    /// Create uniform margins on all sides
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            top_mm: margin_mm,
            bottom_mm: margin_mm,
            left_mm: margin_mm,
            right_mm: margin_mm,
        }
    }
}

/// Space left between neighbouring stickers on a page
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StickerGaps {
    pub horizontal_mm: f32,
    pub vertical_mm: f32,
}

impl Default for StickerGaps {
    fn default() -> Self {
        Self::uniform(DEFAULT_STICKER_GAP_MM)
    }
}

impl StickerGaps {
    pub fn uniform(gap_mm: f32) -> Self {
        Self {
            horizontal_mm: gap_mm,
            vertical_mm: gap_mm,
        }
    }
}

/// Output quality. Only affects image compression, never the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quality {
    Draft,
    #[default]
    Normal,
    High,
}

impl Quality {
    pub fn name(self) -> &'static str {
        match self {
            Quality::Draft => "draft",
            Quality::Normal => "normal",
            Quality::High => "high",
        }
    }
}

/// Page setup for printing stickers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageConfiguration {
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub margins: PageMargins,
    pub gaps: StickerGaps,
    /// Multiplies the sticker's physical size before layout
    pub sticker_scale: f32,
    pub dpi: u32,
    pub quality: Quality,
}

impl Default for PageConfiguration {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            margins: PageMargins::default(),
            gaps: StickerGaps::default(),
            sticker_scale: 1.0,
            dpi: DEFAULT_DPI,
            quality: Quality::Normal,
        }
    }
}

impl PageConfiguration {
    /// Page size after the orientation swap
    pub fn page_dimensions_mm(&self) -> (f32, f32) {
        self.paper_size.dimensions_with_orientation(self.orientation)
    }

    /// Page area inside the margins
    pub fn usable_area_mm(&self) -> (f32, f32) {
        let (width, height) = self.page_dimensions_mm();
        (
            width - self.margins.left_mm - self.margins.right_mm,
            height - self.margins.top_mm - self.margins.bottom_mm,
        )
    }

    /// Validate the page geometry
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.page_dimensions_mm();
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(LayoutError::Config(format!(
                "Page dimensions must be positive, got {width}x{height}mm"
            )));
        }

        let lengths = [
            ("top margin", self.margins.top_mm),
            ("bottom margin", self.margins.bottom_mm),
            ("left margin", self.margins.left_mm),
            ("right margin", self.margins.right_mm),
            ("horizontal gap", self.gaps.horizontal_mm),
            ("vertical gap", self.gaps.vertical_mm),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let (usable_width, usable_height) = self.usable_area_mm();
        if usable_width <= 0.0 || usable_height <= 0.0 {
            return Err(LayoutError::Config(
                "Margins leave no printable area on the page".to_string(),
            ));
        }

        if !self.sticker_scale.is_finite() || self.sticker_scale <= 0.0 {
            return Err(LayoutError::Config(format!(
                "Sticker scale must be greater than zero, got {}",
                self.sticker_scale
            )));
        }

        if self.dpi == 0 {
            return Err(LayoutError::Config("DPI must be greater than zero".to_string()));
        }

        Ok(())
    }
}
