//! Page grid calculation
//!
//! Tiles stickers row by row on a page. The same grid drives the on-screen
//! page preview and the PDF paginator, so both agree slot for slot.

use crate::constants::cm_to_millimeters;
use crate::dimensions::BoxSize;
use crate::page::PageConfiguration;
use crate::types::{LayoutError, Rect, Result};

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Sticker grid for one page, all lengths in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGrid {
    /// Page width after orientation
    pub page_width_mm: f32,
    /// Page height after orientation
    pub page_height_mm: f32,
    pub usable_width_mm: f32,
    pub usable_height_mm: f32,
    pub margin_left_mm: f32,
    pub margin_top_mm: f32,
    pub gap_horizontal_mm: f32,
    pub gap_vertical_mm: f32,
    /// Sticker width on the page (scaled, and shrunk to fit if needed)
    pub sticker_width_mm: f32,
    pub sticker_height_mm: f32,
    /// Extra factor applied when the scaled sticker did not fit the usable area (1.0 otherwise)
    pub fit_scale: f32,
    pub stickers_per_row: usize,
    pub stickers_per_col: usize,
}

/// A sticker's place in a paginated run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPlacement {
    /// Global index of the sticker in the run
    pub index: usize,
    /// Zero-based page number
    pub page: usize,
    pub position: GridPosition,
    /// Slot bounds in millimeters from the page's top-left corner
    pub rect: Rect,
}

impl PageGrid {
    /// Number of sticker slots on one page (at least 1)
    pub fn stickers_per_page(&self) -> usize {
        (self.stickers_per_row * self.stickers_per_col).max(1)
    }

    /// Pages needed for `total` stickers
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.stickers_per_page())
    }

    /// Grid position of the k-th slot on a page
    pub fn slot_position(&self, k: usize) -> GridPosition {
        GridPosition::new(k / self.stickers_per_row, k % self.stickers_per_row)
    }

    /// Bounds of the k-th slot on a page (0-based index within the page)
    pub fn slot(&self, k: usize) -> Rect {
        let pos = self.slot_position(k);
        Rect::new(
            self.margin_left_mm + pos.col as f32 * (self.sticker_width_mm + self.gap_horizontal_mm),
            self.margin_top_mm + pos.row as f32 * (self.sticker_height_mm + self.gap_vertical_mm),
            self.sticker_width_mm,
            self.sticker_height_mm,
        )
    }

    /// Every slot of one page, in fill order
    pub fn page_slots(&self) -> Vec<Rect> {
        (0..self.stickers_per_page()).map(|k| self.slot(k)).collect()
    }

    /// Placement of the sticker at global index `index`
    pub fn placement(&self, index: usize) -> SlotPlacement {
        let per_page = self.stickers_per_page();
        let k = index % per_page;
        SlotPlacement {
            index,
            page: index / per_page,
            position: self.slot_position(k),
            rect: self.slot(k),
        }
    }

    /// Placements for a run of `total` stickers, in input order
    pub fn placements(&self, total: usize) -> impl Iterator<Item = SlotPlacement> + '_ {
        (0..total).map(|index| self.placement(index))
    }

    /// Printable area inside the margins
    pub fn usable_rect(&self) -> Rect {
        Rect::new(
            self.margin_left_mm,
            self.margin_top_mm,
            self.usable_width_mm,
            self.usable_height_mm,
        )
    }
}

/// Compute the page grid for a sticker of the given physical size (centimeters).
///
/// The sticker is scaled by `config.sticker_scale`. If it still does not fit the
/// usable area, it is shrunk uniformly by the largest factor that makes both
/// sides fit, so every page holds at least one sticker.
pub fn compute_page_grid(config: &PageConfiguration, sticker_cm: BoxSize) -> Result<PageGrid> {
    config.validate()?;

    if !(sticker_cm.width > 0.0 && sticker_cm.height > 0.0) {
        return Err(LayoutError::Config(format!(
            "Sticker size must be positive, got {}x{}cm",
            sticker_cm.width, sticker_cm.height
        )));
    }

    let (page_width_mm, page_height_mm) = config.page_dimensions_mm();
    let (usable_width_mm, usable_height_mm) = config.usable_area_mm();

    let scaled_width = cm_to_millimeters(sticker_cm.width) * config.sticker_scale;
    let scaled_height = cm_to_millimeters(sticker_cm.height) * config.sticker_scale;

    let fit_scale = if scaled_width > usable_width_mm || scaled_height > usable_height_mm {
        (usable_width_mm / scaled_width).min(usable_height_mm / scaled_height)
    } else {
        1.0
    };

    let sticker_width_mm = scaled_width * fit_scale;
    let sticker_height_mm = scaled_height * fit_scale;

    let gap_h = config.gaps.horizontal_mm;
    let gap_v = config.gaps.vertical_mm;

    let stickers_per_row = fit_count(usable_width_mm, sticker_width_mm, gap_h);
    let stickers_per_col = fit_count(usable_height_mm, sticker_height_mm, gap_v);

    Ok(PageGrid {
        page_width_mm,
        page_height_mm,
        usable_width_mm,
        usable_height_mm,
        margin_left_mm: config.margins.left_mm,
        margin_top_mm: config.margins.top_mm,
        gap_horizontal_mm: gap_h,
        gap_vertical_mm: gap_v,
        sticker_width_mm,
        sticker_height_mm,
        fit_scale,
        stickers_per_row,
        stickers_per_col,
    })
}

/// How many items of `size` separated by `gap` fit in `available` (at least 1)
fn fit_count(available: f32, size: f32, gap: f32) -> usize {
    // Guards against float noise when a sticker fits exactly
    const EPSILON: f32 = 1e-4;
    let count = ((available + gap) / (size + gap) + EPSILON).floor();
    if count.is_finite() && count >= 1.0 {
        count as usize
    } else {
        1
    }
}
