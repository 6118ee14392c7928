use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use sticker_gen::sticker_layout::{Rect, StickerDimensions};
use sticker_gen::*;

const PLACEHOLDER_FILL: Rgba<u8> = Rgba([0xF3, 0xF4, 0xF6, 255]);
const PLACEHOLDER_INK: Rgba<u8> = Rgba([0x9C, 0xA3, 0xAF, 255]);

fn renderer() -> StickerRenderer {
    let fonts = Arc::new(FontSet::embedded().unwrap());
    StickerRenderer::new(&StickerDimensions::default(), fonts).unwrap()
}

fn record() -> StickerRecord {
    StickerRecord {
        id: "1".into(),
        name: "Shop".into(),
        phone: "+1 555 0100".into(),
        email: "shop@example.com".into(),
        website: Some("https://shop.example".into()),
        qr_data: "https://shop.example".into(),
        ..Default::default()
    }
}

fn dark_pixels(img: &RgbaImage, rect: &Rect) -> usize {
    let mut count = 0;
    for y in rect.y.ceil() as u32..rect.bottom().floor() as u32 {
        for x in rect.x.ceil() as u32..rect.right().floor() as u32 {
            if img.get_pixel(x, y).0[0] < 64 {
                count += 1;
            }
        }
    }
    count
}

fn solid_png(color: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(10, 10, color);
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[tokio::test]
async fn test_canvas_matches_layout() {
    let mut renderer = renderer();
    let img = renderer.render(&record()).await;
    assert_eq!(img.dimensions(), (591, 945));
    assert_eq!(img.dimensions(), renderer.layout().canvas_pixels());
}

#[tokio::test]
async fn test_qr_drawn_from_fallback() {
    let mut renderer = renderer();
    let qr = renderer.layout().qr;

    let from_phone = StickerRecord {
        qr_data: String::new(),
        website: None,
        ..record()
    };
    let img = renderer.render(&from_phone).await;
    assert!(dark_pixels(&img, &qr) > 0);
}

#[tokio::test]
async fn test_qr_placeholder_without_payload() {
    let mut renderer = renderer();
    let qr = renderer.layout().qr;

    let empty = StickerRecord {
        id: "empty".into(),
        ..Default::default()
    };
    let img = renderer.render(&empty).await;
    assert_eq!(dark_pixels(&img, &qr), 0);
    let center = img.get_pixel(qr.center_x() as u32, qr.center_y() as u32);
    assert_eq!(*center, PLACEHOLDER_FILL);
}

#[tokio::test]
async fn test_unencodable_qr_draws_bordered_placeholder() {
    let mut renderer = renderer();
    let qr = renderer.layout().qr;

    let oversized = StickerRecord {
        qr_data: "x".repeat(8000),
        ..record()
    };
    let img = renderer.render(&oversized).await;

    assert_eq!(img.dimensions(), renderer.layout().canvas_pixels());
    assert_eq!(dark_pixels(&img, &qr), 0);
    let center_y = qr.center_y() as u32;
    assert_eq!(*img.get_pixel(qr.center_x() as u32, center_y), PLACEHOLDER_FILL);
    assert_eq!(*img.get_pixel(qr.x.round() as u32, center_y), PLACEHOLDER_INK);
    assert_eq!(
        *img.get_pixel(qr.right().round() as u32 - 1, center_y),
        PLACEHOLDER_INK
    );
}

#[tokio::test]
async fn test_logo_stretched_into_region() {
    let mut renderer = renderer();
    let logo_rect = renderer.layout().logo;
    let red = Rgba([255, 0, 0, 255]);

    let with_logo = StickerRecord {
        logo: Some(LogoImage::from_bytes(solid_png(red))),
        ..record()
    };
    let img = renderer.render(&with_logo).await;

    let inset = 4.0;
    let corners = [
        (logo_rect.x + inset, logo_rect.y + inset),
        (logo_rect.right() - inset, logo_rect.bottom() - inset),
        (logo_rect.center_x(), logo_rect.center_y()),
    ];
    for (x, y) in corners {
        assert_eq!(*img.get_pixel(x as u32, y as u32), red);
    }
}

#[tokio::test]
async fn test_broken_logo_falls_back_to_placeholder() {
    let mut renderer = renderer();
    let logo_rect = renderer.layout().logo;

    let broken = StickerRecord {
        logo: Some(LogoImage::from_bytes(b"not an image".to_vec())),
        ..record()
    };
    let img = renderer.render(&broken).await;
    let corner = img.get_pixel(logo_rect.x as u32 + 4, logo_rect.y as u32 + 4);
    assert_eq!(*corner, PLACEHOLDER_FILL);

    let absent = renderer.render(&record()).await;
    assert_eq!(img, absent);
}

#[tokio::test]
async fn test_decode_image_errors() {
    let result = decode_image(LogoImage::from_bytes(vec![0u8; 8])).await;
    assert!(matches!(result, Err(StickerError::Image(_))));
}

#[tokio::test]
async fn test_render_png_decodes() {
    let mut renderer = renderer();
    let bytes = renderer
        .render_png(&record(), sticker_gen::sticker_layout::Quality::Draft)
        .await
        .unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (591, 945));
}

#[test]
fn test_invalid_dimensions_rejected() {
    let fonts = Arc::new(FontSet::embedded().unwrap());
    let mut dims = StickerDimensions::default();
    dims.sticker.width = 0.0;
    assert!(matches!(
        StickerRenderer::new(&dims, fonts),
        Err(StickerError::Layout(_))
    ));
}
