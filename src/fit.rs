//! Curve fitting: traced outlines → cubic BezPaths.
//!
//! This is resampling, not least-squares fitting. The outline vertices
//! are taken four at a time, stepping by three: the first and last of
//! each group become on-curve anchors and the middle two become control
//! points. The curve passes through every third vertex and is only pulled
//! toward the others, so accuracy depends on how dense the outline is.

use kurbo::{BezPath, PathEl, Point};

use crate::trace::Contour;

/// Fewest vertices that can form one cubic segment.
pub const MIN_CURVE_POINTS: usize = 4;

/// Convert a closed outline into cubic segments.
///
/// Groups use indices `i, i+1, i+2, i+3` (mod n) for `i = 0, 3, 6, ...`
/// while `i + 1 < n`, so a 4-point outline gives exactly one cubic and
/// longer outlines wrap back through the start. Returns `None` for
/// outlines shorter than [`MIN_CURVE_POINTS`]; the caller keeps those as
/// straight segments.
pub fn smooth(contour: &Contour) -> Option<BezPath> {
    let points = &contour.points;
    let n = points.len();
    if n < MIN_CURVE_POINTS {
        return None;
    }

    let mut path = BezPath::new();
    path.move_to(points[0]);
    let mut i = 0;
    while i + 1 < n {
        path.curve_to(points[(i + 1) % n], points[(i + 2) % n], points[(i + 3) % n]);
        i += 3;
    }
    path.close_path();
    Some(path)
}

/// Closed straight-segment path through every outline vertex.
pub fn polyline(contour: &Contour) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = contour.points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

// ── Bernstein evaluation ─────────────────────────────────

/// Binomial coefficient `n choose k` as a float.
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, j| acc * (n - j) as f64 / (j + 1) as f64)
}

/// Bernstein basis polynomial `b_{i,n}(t)`.
pub fn bernstein(i: u32, n: u32, t: f64) -> f64 {
    binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i.min(n)) as i32)
}

/// Evaluate a Bézier curve of any degree at `t` from its control points.
pub fn eval(controls: &[Point], t: f64) -> Point {
    let Some(degree) = controls.len().checked_sub(1) else {
        return Point::ZERO;
    };
    let degree = degree as u32;
    controls
        .iter()
        .enumerate()
        .fold(Point::ZERO, |acc, (i, p)| {
            let b = bernstein(i as u32, degree, t);
            Point::new(acc.x + b * p.x, acc.y + b * p.y)
        })
}

/// Sample a path into a polyline, `steps` samples per curve segment.
///
/// Line segments contribute their end point only.
pub fn flatten(path: &BezPath, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    let mut out = Vec::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
                out.push(p);
            }
            PathEl::LineTo(p) => {
                current = p;
                out.push(p);
            }
            PathEl::QuadTo(c, p) => {
                let controls = [current, c, p];
                out.extend((1..=steps).map(|s| eval(&controls, s as f64 / steps as f64)));
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                let controls = [current, c1, c2, p];
                out.extend((1..=steps).map(|s| eval(&controls, s as f64 / steps as f64)));
                current = p;
            }
            PathEl::ClosePath => {
                current = start;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{CubicBez, ParamCurve};

    fn contour(n: usize) -> Contour {
        Contour {
            points: (0..n)
                .map(|i| {
                    let a = i as f64 / n as f64 * std::f64::consts::TAU;
                    Point::new(50.0 + 20.0 * a.cos(), 50.0 + 20.0 * a.sin())
                })
                .collect(),
        }
    }

    fn count_curves(path: &BezPath) -> usize {
        path.elements()
            .iter()
            .filter(|el| matches!(el, PathEl::CurveTo(..)))
            .count()
    }

    #[test]
    fn four_points_make_one_cubic() {
        let c = contour(4);
        let path = smooth(&c).unwrap();
        let els = path.elements();
        assert_eq!(els.len(), 3);
        assert_eq!(els[0], PathEl::MoveTo(c.points[0]));
        assert_eq!(els[1], PathEl::CurveTo(c.points[1], c.points[2], c.points[3]));
        assert_eq!(els[2], PathEl::ClosePath);
    }

    #[test]
    fn short_outlines_are_not_applicable() {
        assert!(smooth(&contour(3)).is_none());
        assert!(smooth(&contour(0)).is_none());
    }

    #[test]
    fn wrap_around_stays_in_bounds() {
        for n in 4..40 {
            let c = contour(n);
            let path = smooth(&c).unwrap();
            assert_eq!(count_curves(&path), (n - 1).div_ceil(3), "n = {}", n);
            assert_eq!(path.elements().last(), Some(&PathEl::ClosePath));
        }
    }

    #[test]
    fn five_points_wrap_through_start() {
        let c = contour(5);
        let path = smooth(&c).unwrap();
        let p = &c.points;
        assert_eq!(path.elements()[2], PathEl::CurveTo(p[4], p[0], p[1]));
    }

    #[test]
    fn anchors_are_every_third_vertex() {
        let c = contour(10);
        let path = smooth(&c).unwrap();
        let anchors: Vec<Point> = path
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::CurveTo(_, _, p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(anchors, vec![c.points[3], c.points[6], c.points[9]]);
    }

    #[test]
    fn coordinates_are_not_rounded() {
        let c = Contour {
            points: vec![
                Point::new(0.125, 0.5),
                Point::new(10.333, 0.0),
                Point::new(10.0, 10.75),
                Point::new(0.0, 9.999),
            ],
        };
        let path = smooth(&c).unwrap();
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::new(0.125, 0.5)));
    }

    #[test]
    fn polyline_visits_every_vertex() {
        let c = contour(3);
        let path = polyline(&c);
        assert_eq!(path.elements().len(), 4);
        assert!(polyline(&Contour { points: vec![] }).elements().is_empty());
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(3, 0), 1.0);
        assert_eq!(binomial(3, 1), 3.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(10, 10), 1.0);
        assert_eq!(binomial(2, 3), 0.0);
    }

    #[test]
    fn bernstein_basis_sums_to_one() {
        for t in [0.0, 0.2, 0.5, 0.9, 1.0] {
            let sum: f64 = (0..=3).map(|i| bernstein(i, 3, t)).sum();
            assert!((sum - 1.0).abs() < 1e-12, "t = {}", t);
        }
    }

    #[test]
    fn eval_agrees_with_kurbo() {
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(10.0, 30.0),
            Point::new(40.0, -5.0),
            Point::new(50.0, 20.0),
        );
        let cubic = CubicBez::new(p0, p1, p2, p3);
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let ours = eval(&[p0, p1, p2, p3], t);
            let theirs = cubic.eval(t);
            assert!(ours.distance(theirs) < 1e-9, "t = {}: {:?} vs {:?}", t, ours, theirs);
        }
    }

    #[test]
    fn flatten_ends_on_anchors() {
        let c = contour(7);
        let path = smooth(&c).unwrap();
        let samples = flatten(&path, 8);
        assert_eq!(samples.len(), 1 + 2 * 8);
        assert!(samples[8].distance(c.points[3]) < 1e-9);
        assert!(samples[16].distance(c.points[6]) < 1e-9);
    }
}
