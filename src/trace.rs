//! Outer boundary extraction on the pixel-corner grid.
//!
//! Contours run between pixels rather than through pixel centers, so a
//! block of pixels covering columns `x0..x1` and rows `y0..y1` is outlined
//! by corners `(x0, y0)` to `(x1, y1)`. Straight runs are compressed to
//! their end vertices. Foreground is 4-connected: pixels touching only at
//! a corner are separate islands.

use kurbo::{Point, Rect};

use crate::bitmap::Mask;
use crate::geom;

/// A closed outline in image coordinates (x = column, y = row, y down).
///
/// The edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Too short to be smoothed into cubic segments.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 4
    }

    /// Axis-aligned bounds of the vertices.
    pub fn bounds(&self) -> Rect {
        geom::bounds(&self.points)
    }
}

/// Trace the outer boundary of every island in the mask.
///
/// Islands are discovered in row-major order of their top-left pixel.
/// Once an outline is traced, everything it encloses (holes and islands
/// inside holes) is removed from the working copy, so only outermost
/// boundaries come back. An empty mask gives an empty Vec.
pub fn outer_contours(mask: &Mask) -> Vec<Contour> {
    let mut work = mask.clone();
    let (w, h) = mask.dimensions();
    let mut contours = Vec::new();

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            if !work.get(x, y) {
                continue;
            }
            let vertices = follow_boundary(&work, x, y);
            clear_enclosed(&mut work, &vertices);
            // Grid corners are already (column, row); this is the only
            // place they become floating-point points.
            let points = vertices
                .iter()
                .map(|&(cx, cy)| Point::new(cx as f64, cy as f64))
                .collect();
            contours.push(Contour { points });
        }
    }

    contours
}

/// Walk one boundary starting at the top-left corner of pixel (x0, y0).
///
/// Keeps the foreground on the left. Only corners where the heading
/// changes are recorded.
fn follow_boundary(bm: &Mask, x0: i32, y0: i32) -> Vec<(i32, i32)> {
    let mut vertices = Vec::new();
    let (mut x, mut y) = (x0, y0);
    // Down the left side of the seed pixel. Its left, top and top-left
    // neighbours are background, so the start is always a convex corner.
    let (mut dx, mut dy): (i32, i32) = (0, 1);
    let mut heading: Option<(i32, i32)> = None;

    loop {
        // The two pixels flanking the edge ahead of corner (x, y):
        //
        //   heading       │ left pixel   right pixel
        //   ──────────────┼─────────────────────────
        //   down  ( 0, 1) │ (x,   y)     (x-1, y)
        //   right ( 1, 0) │ (x,   y-1)   (x,   y)
        //   up    ( 0,-1) │ (x-1, y-1)   (x,   y-1)
        //   left  (-1, 0) │ (x-1, y)     (x-1, y-1)
        let left = bm.get(x + (dx + dy - 1) / 2, y + (dy - dx - 1) / 2);
        let right = bm.get(x + (dx - dy - 1) / 2, y + (dy + dx - 1) / 2);

        //   left right │ action
        //   ───────────┼───────────────────────────────────────
        //    1    0    │ straight
        //    1    1    │ turn right (foreground bends across the path)
        //    0    *    │ turn left (diagonal pixels stay separate)
        if left && right {
            (dx, dy) = (-dy, dx);
        } else if !left {
            (dx, dy) = (dy, -dx);
        }

        if heading != Some((dx, dy)) {
            vertices.push((x, y));
            heading = Some((dx, dy));
        }

        x += dx;
        y += dy;

        if x == x0 && y == y0 {
            break;
        }
    }

    vertices
}

/// Remove every pixel enclosed by a traced outline from the working mask.
///
/// Each vertical edge crosses its rows once. Sorted by (row, column), the
/// crossings of a row pair up into inside spans, so the work stays
/// proportional to the outline and its interior rather than the image.
fn clear_enclosed(work: &mut Mask, vertices: &[(i32, i32)]) {
    let n = vertices.len();
    let mut crossings: Vec<(i32, i32)> = Vec::new();
    for k in 0..n {
        let (xa, ya) = vertices[k];
        let (xb, yb) = vertices[(k + 1) % n];
        if xa != xb {
            continue;
        }
        crossings.extend((ya.min(yb)..ya.max(yb)).map(|row| (row, xa)));
    }
    crossings.sort_unstable();

    // A closed outline crosses every row an even number of times.
    for pair in crossings.chunks_exact(2) {
        let ((row, x0), (_, x1)) = (pair[0], pair[1]);
        work.clear_span(row, x0, x1);
    }
}
