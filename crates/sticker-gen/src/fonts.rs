use crate::types::{Result, StickerError};
use rusttype::Font;

static REGULAR_TTF: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");
static BOLD_TTF: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");

/// Regular and bold faces used for sticker text.
#[derive(Clone)]
pub struct FontSet {
    pub regular: Font<'static>,
    pub bold: Font<'static>,
}

impl FontSet {
    /// The DejaVu Sans faces bundled with the crate.
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            regular: parse(REGULAR_TTF, "DejaVuSans")?,
            bold: parse(BOLD_TTF, "DejaVuSans-Bold")?,
        })
    }

    /// Load faces from TTF/OTF bytes.
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Result<Self> {
        let regular = Font::try_from_vec(regular)
            .ok_or_else(|| StickerError::Font("Failed to parse regular font".to_string()))?;
        let bold = Font::try_from_vec(bold)
            .ok_or_else(|| StickerError::Font("Failed to parse bold font".to_string()))?;
        Ok(Self { regular, bold })
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("glyphs", &self.regular.glyph_count())
            .finish_non_exhaustive()
    }
}

fn parse(bytes: &'static [u8], name: &str) -> Result<Font<'static>> {
    Font::try_from_bytes(bytes).ok_or_else(|| StickerError::Font(format!("Failed to parse {name}")))
}
