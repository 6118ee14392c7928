//! Geometry for sticker sheets: unit conversion, the region layout inside a
//! single sticker, and the tiling of stickers onto printed pages.

pub mod constants;
mod dimensions;
mod grid;
mod page;
mod sticker;
mod types;

pub use constants::{cm_to_millimeters, cm_to_pixels, mm_to_pt};
pub use dimensions::*;
pub use grid::*;
pub use page::*;
pub use sticker::*;
pub use types::*;
