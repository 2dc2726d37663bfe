//! cutpath: transparent raster → offset cut outline SVG.
//!
//! Extracts the visible silhouette of an image, grows it by a cut margin,
//! traces the grown outline and writes it as stroked SVG paths over an
//! embedded copy of the source, ready for a laser or vinyl cutter.
//!
//! # Example
//!
//! ```no_run
//! use cutpath::{trace_file, CutpathConfig};
//! use std::path::Path;
//!
//! let config = CutpathConfig { offset: 8, ..CutpathConfig::default() };
//! let result = trace_file(Path::new("sticker.png"), &config)?;
//! result.document.write_svg(Path::new("sticker.svg"))?;
//! # Ok::<(), cutpath::CutpathError>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod config;
mod geom;

pub mod error;
pub mod fit;
pub mod offset;
pub mod output;
pub mod render;
pub mod svg;
pub mod trace;

// Re-export kurbo so downstream users get the same version
// used by CutPath::Bezier.
pub use kurbo;

pub use bitmap::{extract, load, Mask, MaskSource};
pub use config::{CutpathConfig, StrokeStyle};
pub use error::CutpathError;
pub use svg::{CutDocument, CutPath, EmbeddedRaster};
pub use trace::Contour;

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;

/// Non-fatal findings from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No pixel passed the occupancy test. The document has no paths.
    EmptySilhouette,
    /// An outline too short to smooth was kept as straight segments.
    DegenerateContourSkipped { index: usize, points: usize },
}

/// The result of a run: the document plus what happened on the way.
#[derive(Debug, Clone)]
pub struct CutResult {
    pub document: CutDocument,
    /// Which channel the silhouette came from.
    pub mask_source: MaskSource,
    /// Separate islands in the silhouette before offsetting.
    pub islands: usize,
    /// Occupied pixels before offsetting.
    pub occupied_before: usize,
    /// Occupied pixels after offsetting.
    pub occupied_after: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Full pipeline: decoded image → cut document.
///
/// Stages run strictly in sequence: mask → dilate → trace → smooth →
/// assemble. Fails only on unusable input; an empty silhouette still
/// produces a document containing just the reference image.
pub fn generate_cutpath(
    image: &DynamicImage,
    config: &CutpathConfig,
) -> Result<CutResult, CutpathError> {
    let t_start = Instant::now();

    // ── Mask ──────────────────────────────────────────────
    let (mask, mask_source) = bitmap::extract(image, config)?;
    let (w, h) = mask.dimensions();
    let occupied_before = mask.count_occupied();
    let source_name = match mask_source {
        MaskSource::Alpha => "alpha".to_string(),
        MaskSource::Luminance => "luminance (no alpha channel)".to_string(),
    };
    eprintln!(
        "  Load        {}x{} px, {} > {}, {} px occupied",
        w, h, source_name, config.threshold, occupied_before
    );

    let mut diagnostics = Vec::new();
    if occupied_before == 0 {
        diagnostics.push(Diagnostic::EmptySilhouette);
    }
    let islands = trace::outer_contours(&mask).len();
    eprintln!("  Silhouette  {} island(s)", islands);

    // ── Offset ────────────────────────────────────────────
    let dilated = offset::dilate(&mask, config.offset);
    let occupied_after = dilated.count_occupied();
    let side = offset::kernel_side(config.offset);
    eprintln!(
        "  Offset      r={} px (kernel {}x{}), {} \u{2192} {} px",
        config.offset,
        side,
        side,
        occupied_before,
        occupied_after,
    );

    if std::env::var("CUTPATH_DEBUG_MASK").is_ok() {
        mask.to_gray().save("debug_mask.png").ok();
        dilated.to_gray().save("debug_dilated.png").ok();
        eprintln!("  Debug       saved debug_mask.png, debug_dilated.png");
    }
    drop(mask);

    // ── Trace ─────────────────────────────────────────────
    let contours = trace::outer_contours(&dilated);
    drop(dilated);
    let total_points: usize = contours.iter().map(Contour::len).sum();
    let total_area: f64 = contours
        .iter()
        .map(|c| geom::polygon_area(&c.points).abs())
        .sum();
    eprintln!(
        "  Trace       {} contour(s), {} points, {:.0} px\u{00b2} enclosed",
        contours.len(),
        total_points,
        total_area,
    );

    // ── Smooth ────────────────────────────────────────────
    let paths = build_paths(contours, config.smooth, &mut diagnostics);
    if config.smooth {
        let curved = paths.iter().filter(|p| p.is_curved()).count();
        eprintln!(
            "  Smooth      {} curved \u{00b7} {} straight",
            curved,
            paths.len() - curved
        );
    }

    // ── Assemble ──────────────────────────────────────────
    let reference = EmbeddedRaster::png(image)?;
    let mut document = CutDocument::new(w, h, reference, config.stroke.clone());
    for path in paths {
        document.push(path);
    }

    let bounds = match document.outline_bounds() {
        Some(b) => format!("({:.0},{:.0})-({:.0},{:.0})", b.x0, b.y0, b.x1, b.y1),
        None => "none".to_string(),
    };
    eprintln!(
        "  Result      {} path(s) \u{00b7} bounds {} \u{00b7} {} KiB reference  ({}ms)",
        document.paths.len(),
        bounds,
        document.reference.data.len() / 1024,
        t_start.elapsed().as_millis(),
    );

    Ok(CutResult {
        document,
        mask_source,
        islands,
        occupied_before,
        occupied_after,
        diagnostics,
    })
}

/// Turn traced outlines into cut paths, smoothing where possible.
fn build_paths(
    contours: Vec<Contour>,
    smooth: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<CutPath> {
    contours
        .into_iter()
        .enumerate()
        .map(|(index, contour)| {
            if !smooth {
                return CutPath::Polyline(contour);
            }
            match fit::smooth(&contour) {
                Some(path) => CutPath::Bezier(path),
                None => {
                    diagnostics.push(Diagnostic::DegenerateContourSkipped {
                        index,
                        points: contour.len(),
                    });
                    CutPath::Polyline(contour)
                }
            }
        })
        .collect()
}

/// Decode an image file and run [`generate_cutpath`] on it.
pub fn trace_file(image_path: &Path, config: &CutpathConfig) -> Result<CutResult, CutpathError> {
    let image = bitmap::load(image_path)?;
    generate_cutpath(&image, config)
}

/// Convenience: trace an image file and write the SVG.
///
/// Nothing is written at `svg_path` unless the whole run succeeds.
pub fn trace_into_svg(
    image_path: &Path,
    svg_path: &Path,
    config: &CutpathConfig,
) -> Result<CutResult, CutpathError> {
    let result = trace_file(image_path, config)?;
    result.document.write_svg(svg_path)?;
    Ok(result)
}
