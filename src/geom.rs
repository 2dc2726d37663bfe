//! Shared geometry utilities.

use kurbo::{Point, Rect};

/// Signed area of a closed polygon via the shoelace formula.
///
/// In image coordinates (y down) a positive value means clockwise on screen.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i].x * points[j].y - points[j].x * points[i].y
        })
        .sum::<f64>()
        / 2.0
}

/// Axis-aligned bounds of a point set. Empty input gives `Rect::ZERO`.
pub fn bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}
