//! Raster preview of a cut document.
//!
//! Draws the source image with the cut paths stroked on top via
//! tiny-skia, so the margin can be checked without an SVG viewer.

use std::path::Path;

use image::DynamicImage;
use kurbo::{BezPath, PathEl};

use crate::error::CutpathError;
use crate::output;
use crate::svg::CutDocument;

/// Checkerboard cell size behind transparent pixels.
const CHECKER: u32 = 8;

/// Convert a kurbo `BezPath` to a `tiny_skia::Path`.
fn kurbo_to_tinyskia(bezpath: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for el in bezpath.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Named stroke colors understood by the preview.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// Parse an SVG stroke color: a basic name, `#rgb` or `#rrggbb`.
fn parse_color(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let digit = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).ok();
        return match hex.len() {
            3 => Some([digit(0, 1)? * 17, digit(1, 1)? * 17, digit(2, 1)? * 17]),
            6 => Some([digit(0, 2)?, digit(2, 2)?, digit(4, 2)?]),
            _ => None,
        };
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|&(_, rgb)| rgb)
}

/// Encode a pixmap to PNG bytes (straight alpha).
fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, CutpathError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| CutpathError::Encode(e.to_string()))?;
    writer
        .write_image_data(&rgba)
        .map_err(|e| CutpathError::Encode(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| CutpathError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Render the source image with every cut path stroked in the document's
/// stroke color. Colors the preview cannot parse are drawn red.
///
/// Transparent areas are shown over a light checkerboard. The canvas is
/// the document's size; paths are drawn 1:1 in image pixels.
pub fn render_preview(
    source: &DynamicImage,
    document: &CutDocument,
) -> Result<tiny_skia::Pixmap, CutpathError> {
    let (w, h) = (document.width, document.height);
    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| CutpathError::Encode(format!("cannot allocate {}x{} preview", w, h)))?;

    let rgba = source.to_rgba8();
    for (i, px) in pixmap.pixels_mut().iter_mut().enumerate() {
        let x = i as u32 % w;
        let y = i as u32 / w;
        let bg: u32 = if (x / CHECKER + y / CHECKER) % 2 == 0 { 255 } else { 220 };
        let [r, g, b, a] = rgba
            .get_pixel_checked(x, y)
            .map(|p| p.0)
            .unwrap_or([0, 0, 0, 0]);
        let a = a as u32;
        let over = |c: u8| ((c as u32 * a + bg * (255 - a)) / 255) as u8;
        *px = tiny_skia::ColorU8::from_rgba(over(r), over(g), over(b), 255).premultiply();
    }

    let [r, g, b] = parse_color(&document.stroke.color).unwrap_or([255, 0, 0]);
    let mut paint = tiny_skia::Paint::default();
    paint.set_color(tiny_skia::Color::from_rgba8(r, g, b, 255));
    paint.anti_alias = true;
    let stroke = tiny_skia::Stroke {
        width: document.stroke.width.max(1.0) as f32,
        ..tiny_skia::Stroke::default()
    };

    for path in &document.paths {
        if let Some(sk_path) = kurbo_to_tinyskia(&path.to_bezpath()) {
            pixmap.stroke_path(
                &sk_path,
                &paint,
                &stroke,
                tiny_skia::Transform::identity(),
                None,
            );
        }
    }

    Ok(pixmap)
}

/// Render a preview and save it as PNG.
pub fn write_preview(
    source: &DynamicImage,
    document: &CutDocument,
    output_path: &Path,
) -> Result<(), CutpathError> {
    let pixmap = render_preview(source, document)?;
    let png_data = encode_png(&pixmap)?;
    output::write_atomically(output_path, &png_data)?;
    Ok(())
}
