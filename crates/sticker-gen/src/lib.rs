//! Sticker generation: data sources, rasterization, and export.
//!
//! Records come from a single design, a CSV import, or a numbered series.
//! [`StickerRenderer`] turns a record into a raster using the geometry from
//! `sticker-layout`, and [`ExportController`] drives batched PNG export or
//! paginated PDF export with cooperative cancellation.

mod draw;
mod export;
mod fonts;
mod import;
mod pdf;
mod preview;
mod qr;
mod raster;
mod series;
mod settings;
mod state;
mod types;

pub use export::*;
pub use fonts::*;
pub use import::*;
pub use pdf::*;
pub use preview::*;
pub use qr::*;
pub use raster::*;
pub use series::*;
pub use settings::*;
pub use state::*;
pub use types::*;

pub use sticker_layout;
