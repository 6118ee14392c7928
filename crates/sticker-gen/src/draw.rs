//! Pixel-level drawing on RGBA canvases.

use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use sticker_layout::Rect;

pub(crate) const fn rgb(hex: u32) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255])
}

/// Integer pixel bounds of `rect` clipped to the image, as `(x0, y0, x1, y1)`.
fn clip(img: &RgbaImage, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x.round().max(0.0) as u32;
    let y0 = rect.y.round().max(0.0) as u32;
    let x1 = (rect.right().round().max(0.0) as u32).min(img.width());
    let y1 = (rect.bottom().round().max(0.0) as u32).min(img.height());
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

pub(crate) fn fill_rect(img: &mut RgbaImage, rect: &Rect, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = clip(img, rect) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Outline drawn inside `rect`.
pub(crate) fn stroke_rect(img: &mut RgbaImage, rect: &Rect, color: Rgba<u8>, thickness: f32) {
    let t = thickness.min(rect.width / 2.0).min(rect.height / 2.0);
    if t <= 0.0 {
        return;
    }
    let Rect { x, y, width, height } = *rect;
    fill_rect(img, &Rect::new(x, y, width, t), color);
    fill_rect(img, &Rect::new(x, y + height - t, width, t), color);
    fill_rect(img, &Rect::new(x, y, t, height), color);
    fill_rect(img, &Rect::new(x + width - t, y, t, height), color);
}

/// One-pixel dashed outline.
pub(crate) fn stroke_rect_dashed(img: &mut RgbaImage, rect: &Rect, color: Rgba<u8>, dash: u32) {
    let Some((x0, y0, x1, y1)) = clip(img, rect) else {
        return;
    };
    let dash = dash.max(1);
    let on = |offset: u32| (offset / dash) % 2 == 0;

    for x in x0..x1 {
        if on(x - x0) {
            img.put_pixel(x, y0, color);
            img.put_pixel(x, y1 - 1, color);
        }
    }
    for y in y0..y1 {
        if on(y - y0) {
            img.put_pixel(x0, y, color);
            img.put_pixel(x1 - 1, y, color);
        }
    }
}

pub(crate) fn text_width(font: &Font<'static>, px: f32, text: &str) -> f32 {
    let scale = Scale::uniform(px);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Draw `text` with its baseline at `baseline_y`, alpha blended over the canvas.
pub(crate) fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    if px <= 0.0 {
        return;
    }
    let scale = Scale::uniform(px);

    for glyph in font.layout(text, scale, point(x, baseline_y)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 {
                return;
            }
            let (px, py) = (px as u32, py as u32);
            if px >= img.width() || py >= img.height() {
                return;
            }
            let sa = v.clamp(0.0, 1.0);
            if sa <= 0.0 {
                return;
            }
            let inv = 1.0 - sa;
            let dst = img.get_pixel_mut(px, py);
            for channel in 0..3 {
                dst.0[channel] =
                    (color.0[channel] as f32 * sa + dst.0[channel] as f32 * inv).round() as u8;
            }
            dst.0[3] = 255;
        });
    }
}

/// Draw `text` horizontally centered on `center_x`.
pub(crate) fn draw_text_centered(
    img: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    center_x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    let width = text_width(font, px, text);
    draw_text(img, font, px, center_x - width / 2.0, baseline_y, color, text);
}
