//! SVG output: reference raster plus stroked cut paths.

use std::fmt::Write as _;
use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use kurbo::{BezPath, PathEl, Point, Rect};

use crate::config::StrokeStyle;
use crate::error::CutpathError;
use crate::fit;
use crate::geom;
use crate::output;
use crate::trace::Contour;

/// Samples per cubic when measuring curved paths.
const BOUNDS_SAMPLES: usize = 16;

/// Opaque encoded image embedded for visual reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedRaster {
    /// MIME type of `data`, e.g. `image/png`.
    pub mime: String,
    pub data: Vec<u8>,
}

impl EmbeddedRaster {
    /// Re-encode a decoded image as PNG.
    pub fn png(image: &DynamicImage) -> Result<Self, CutpathError> {
        let mut data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .map_err(|e| CutpathError::Encode(e.to_string()))?;
        Ok(EmbeddedRaster {
            mime: "image/png".to_string(),
            data,
        })
    }

    /// `data:` URI with base64 payload.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// One closed cut outline.
#[derive(Debug, Clone, PartialEq)]
pub enum CutPath {
    /// Straight segments through every vertex.
    Polyline(Contour),
    /// Cubic segments from [`fit::smooth`].
    Bezier(BezPath),
}

impl CutPath {
    /// Path data in the form `M x,y L x,y ... Z` or `M x,y C x,y x,y x,y ... Z`.
    pub fn svg_data(&self) -> String {
        match self {
            CutPath::Polyline(contour) => {
                let mut d = String::new();
                for (i, p) in contour.points.iter().enumerate() {
                    if i > 0 {
                        d.push_str(" L ");
                    } else {
                        d.push_str("M ");
                    }
                    push_point(&mut d, *p);
                }
                if !contour.points.is_empty() {
                    d.push_str(" Z");
                }
                d
            }
            CutPath::Bezier(path) => bezpath_data(path),
        }
    }

    /// The outline as a kurbo path.
    pub fn to_bezpath(&self) -> BezPath {
        match self {
            CutPath::Polyline(contour) => fit::polyline(contour),
            CutPath::Bezier(path) => path.clone(),
        }
    }

    /// Extent of the drawn outline. Curves are sampled, not solved.
    pub fn bounds(&self) -> Rect {
        match self {
            CutPath::Polyline(contour) => contour.bounds(),
            CutPath::Bezier(path) => geom::bounds(&fit::flatten(path, BOUNDS_SAMPLES)),
        }
    }

    pub fn is_curved(&self) -> bool {
        matches!(self, CutPath::Bezier(_))
    }
}

/// The finished cut file.
#[derive(Debug, Clone)]
pub struct CutDocument {
    /// Canvas width in pixels (equals the source raster width).
    pub width: u32,
    /// Canvas height in pixels (equals the source raster height).
    pub height: u32,
    pub reference: EmbeddedRaster,
    /// Outlines in the order they were traced.
    pub paths: Vec<CutPath>,
    pub stroke: StrokeStyle,
}

impl CutDocument {
    pub fn new(width: u32, height: u32, reference: EmbeddedRaster, stroke: StrokeStyle) -> Self {
        CutDocument {
            width,
            height,
            reference,
            paths: Vec::new(),
            stroke,
        }
    }

    pub fn push(&mut self, path: CutPath) {
        self.paths.push(path);
    }

    /// Union of all path bounds, `None` when there are no paths.
    pub fn outline_bounds(&self) -> Option<Rect> {
        self.paths
            .iter()
            .map(CutPath::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Serialize to an SVG string.
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(svg, r#"<?xml version="1.0" encoding="utf-8" ?>"#);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="{w}px" height="{h}px" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <image x="0" y="0" width="{w}px" height="{h}px" xlink:href="{}"/>"#,
            escape_attr(&self.reference.data_uri())
        );
        let color = escape_attr(&self.stroke.color);
        for path in &self.paths {
            let _ = writeln!(
                svg,
                r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                path.svg_data(),
                color,
                self.stroke.width
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the SVG to `path`. On failure no file appears at `path`.
    pub fn write_svg(&self, path: &Path) -> Result<(), CutpathError> {
        output::write_atomically(path, self.to_svg().as_bytes())?;
        Ok(())
    }
}

fn bezpath_data(path: &BezPath) -> String {
    let mut parts: Vec<String> = Vec::new();
    for el in path.elements() {
        let mut part = String::new();
        match *el {
            PathEl::MoveTo(p) => {
                part.push_str("M ");
                push_point(&mut part, p);
            }
            PathEl::LineTo(p) => {
                part.push_str("L ");
                push_point(&mut part, p);
            }
            PathEl::QuadTo(c, p) => {
                part.push_str("Q ");
                push_point(&mut part, c);
                part.push(' ');
                push_point(&mut part, p);
            }
            PathEl::CurveTo(c1, c2, p) => {
                part.push_str("C ");
                push_point(&mut part, c1);
                part.push(' ');
                push_point(&mut part, c2);
                part.push(' ');
                push_point(&mut part, p);
            }
            PathEl::ClosePath => part.push('Z'),
        }
        parts.push(part);
    }
    parts.join(" ")
}

/// Full precision: `Display` for f64 is the shortest exact round-trip form.
fn push_point(out: &mut String, p: Point) {
    let _ = write!(out, "{},{}", p.x, p.y);
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn reference() -> EmbeddedRaster {
        EmbeddedRaster::png(&DynamicImage::ImageRgba8(RgbaImage::new(2, 2))).unwrap()
    }

    fn square() -> Contour {
        Contour {
            points: vec![
                Point::new(35.0, 35.0),
                Point::new(35.0, 65.0),
                Point::new(65.0, 65.0),
                Point::new(65.0, 35.0),
            ],
        }
    }

    #[test]
    fn polyline_data_format() {
        let d = CutPath::Polyline(square()).svg_data();
        assert_eq!(d, "M 35,35 L 35,65 L 65,65 L 65,35 Z");
    }

    #[test]
    fn bezier_data_format() {
        let path = fit::smooth(&square()).unwrap();
        let d = CutPath::Bezier(path).svg_data();
        assert_eq!(d, "M 35,35 C 35,65 65,65 65,35 Z");
    }

    #[test]
    fn fractional_coordinates_keep_precision() {
        let c = Contour {
            points: vec![Point::new(0.1, 2.25), Point::new(1.0 / 3.0, 4.0)],
        };
        let d = CutPath::Polyline(c).svg_data();
        assert_eq!(d, "M 0.1,2.25 L 0.3333333333333333,4 Z");
    }

    #[test]
    fn data_uri_is_png_base64() {
        let r = reference();
        assert!(r.data.starts_with(&[0x89, b'P', b'N', b'G']));
        let uri = r.data_uri();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
        let decoded = STANDARD.decode(uri.trim_start_matches("data:image/png;base64,")).unwrap();
        assert_eq!(decoded, r.data);
    }

    #[test]
    fn document_structure() {
        let mut doc = CutDocument::new(100, 80, reference(), StrokeStyle::default());
        doc.push(CutPath::Polyline(square()));
        let svg = doc.to_svg();
        assert!(svg.contains(r#"width="100px" height="80px" viewBox="0 0 100 80""#));
        assert_eq!(svg.matches("<image ").count(), 1);
        assert_eq!(svg.matches("<path ").count(), 1);
        assert!(svg.contains(r#"fill="none" stroke="red" stroke-width="1""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn empty_document_has_only_the_image() {
        let doc = CutDocument::new(50, 50, reference(), StrokeStyle::default());
        let svg = doc.to_svg();
        assert_eq!(svg.matches("<image ").count(), 1);
        assert_eq!(svg.matches("<path ").count(), 0);
        assert_eq!(doc.outline_bounds(), None);
    }

    #[test]
    fn stroke_color_is_escaped() {
        let stroke = StrokeStyle {
            color: "a\"b".to_string(),
            width: 0.5,
        };
        let mut doc = CutDocument::new(10, 10, reference(), stroke);
        doc.push(CutPath::Polyline(square()));
        let svg = doc.to_svg();
        assert!(svg.contains(r#"stroke="a&quot;b" stroke-width="0.5""#));
    }

    #[test]
    fn curved_bounds_are_sampled() {
        let path = fit::smooth(&square()).unwrap();
        let bounds = CutPath::Bezier(path).bounds();
        // The single cubic bulges toward y = 65 but never reaches it.
        assert_eq!(bounds.x0, 35.0);
        assert_eq!(bounds.x1, 65.0);
        assert!(bounds.y1 > 55.0 && bounds.y1 < 65.0, "{:?}", bounds);
    }
}
