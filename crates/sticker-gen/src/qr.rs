use crate::types::Result;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use qrcode::QrCode;

/// Quiet zone around the symbol, in modules.
const QR_MARGIN_MODULES: u32 = 1;

/// Render `payload` as a black-on-white QR symbol exactly `side` pixels square.
pub fn render_qr(payload: &str, side: u32) -> Result<RgbaImage> {
    let code = QrCode::new(payload.as_bytes())?;
    let modules = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(1, 1)
        .build();

    let framed_side = modules.width() + 2 * QR_MARGIN_MODULES;
    let mut framed = GrayImage::from_pixel(framed_side, framed_side, Luma([255]));
    imageops::overlay(
        &mut framed,
        &modules,
        QR_MARGIN_MODULES as i64,
        QR_MARGIN_MODULES as i64,
    );

    let side = side.max(1);
    let scaled = imageops::resize(&framed, side, side, FilterType::Nearest);
    Ok(DynamicImage::ImageLuma8(scaled).to_rgba8())
}
