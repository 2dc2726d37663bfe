//! Cut margin by binary dilation with a disk.
//!
//! Approximates offsetting the silhouette outline outward by `radius`
//! pixels. Pixels outside the image count as background.

use crate::bitmap::Mask;

/// Side length of the square that bounds a disk of `radius`.
///
/// Computed in `u64` so every `u32` radius is representable.
pub fn kernel_side(radius: u32) -> u64 {
    2 * u64::from(radius) + 1
}

/// Disk-shaped structuring element of side `2 * radius + 1`.
///
/// Cell `(dx, dy)` is set iff `dx² + dy² <= radius²`. Stored as one
/// half-width per row, since every row of a disk is a single span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    radius: u32,
    half_widths: Vec<u32>,
}

impl Disk {
    pub fn new(radius: u32) -> Self {
        let r = radius as i64;
        let half_widths = (-r..=r)
            .map(|dy| {
                // i64 squares overflow past radius 2^31.5.
                let rem = (r as i128).pow(2) - (dy as i128).pow(2);
                let mut hw = (rem as f64).sqrt() as i128;
                while hw * hw > rem {
                    hw -= 1;
                }
                while (hw + 1) * (hw + 1) <= rem {
                    hw += 1;
                }
                hw as u32
            })
            .collect();
        Disk { radius, half_widths }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Bounding box side length.
    pub fn side(&self) -> u64 {
        kernel_side(self.radius)
    }

    /// Half-width of the span in row `dy` (relative to the center),
    /// or `None` outside the bounding box.
    pub fn half_width(&self, dy: i32) -> Option<u32> {
        let r = self.radius as i64;
        let dy = dy as i64;
        if dy < -r || dy > r {
            return None;
        }
        Some(self.half_widths[(dy + r) as usize])
    }

    /// Whether cell `(dx, dy)` relative to the center is part of the disk.
    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        self.half_width(dy)
            .is_some_and(|hw| (dx as i64).unsigned_abs() <= hw as u64)
    }
}

/// Grow the occupied region of `mask` by `radius` pixels.
///
/// An output pixel is occupied iff some occupied input pixel lies under
/// the disk centered on it. Single iteration. `radius = 0` returns a mask
/// equal to the input.
///
/// A radius past the image diagonal reaches every pixel already, so it is
/// clamped there before the disk is built.
pub fn dilate(mask: &Mask, radius: u32) -> Mask {
    let (w, h) = mask.dimensions();
    let radius = radius.min(diagonal(w, h));
    let disk = Disk::new(radius);
    let r = radius as i64;

    // Per-row prefix counts turn "any occupied pixel in [a, b]" into O(1).
    let prefix: Vec<Vec<u32>> = (0..h)
        .map(|y| {
            let mut counts = Vec::with_capacity(w as usize + 1);
            counts.push(0u32);
            let mut total = 0u32;
            for &set in mask.row(y) {
                total += set as u32;
                counts.push(total);
            }
            counts
        })
        .collect();

    let mut out = Mask::new(w, h);
    for y in 0..h as i64 {
        for dy in -r..=r {
            let sy = y + dy;
            if sy < 0 || sy >= h as i64 {
                continue;
            }
            let counts = &prefix[sy as usize];
            if counts[w as usize] == 0 {
                continue;
            }
            let hw = disk.half_widths[(dy + r) as usize] as i64;
            for x in 0..w as i64 {
                let lo = (x - hw).max(0) as usize;
                let hi = (x + hw + 1).min(w as i64) as usize;
                if counts[hi] > counts[lo] {
                    out.set(x as i32, y as i32, true);
                }
            }
        }
    }
    out
}

/// Smallest whole radius covering the distance between any two pixels.
fn diagonal(w: u32, h: u32) -> u32 {
    ((u64::from(w).pow(2) + u64::from(h).pow(2)) as f64).sqrt() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speckle(w: u32, h: u32) -> Mask {
        Mask::from_fn(w, h, |x, y| (x * 7 + y * 3) % 17 == 0 || (x / 5 + y / 4) % 6 == 0)
    }

    #[test]
    fn disk_shape() {
        let disk = Disk::new(2);
        assert_eq!(disk.side(), 5);
        assert_eq!(disk.half_width(0), Some(2));
        assert_eq!(disk.half_width(-1), Some(1));
        assert_eq!(disk.half_width(2), Some(0));
        assert_eq!(disk.half_width(3), None);
        assert!(disk.contains(0, -2));
        assert!(!disk.contains(2, 1));
        assert_eq!(Disk::new(0).half_width(0), Some(0));
    }

    #[test]
    fn disk_matches_circle_inequality() {
        let disk = Disk::new(7);
        for dy in -8..=8 {
            for dx in -8..=8 {
                assert_eq!(disk.contains(dx, dy), dx * dx + dy * dy <= 49, "({}, {})", dx, dy);
            }
        }
    }

    #[test]
    fn zero_radius_is_identity() {
        let mask = speckle(23, 17);
        assert_eq!(dilate(&mask, 0), mask);
        let empty = Mask::new(5, 5);
        assert_eq!(dilate(&empty, 0), empty);
    }

    #[test]
    fn output_contains_input() {
        let mask = speckle(31, 19);
        for radius in [0, 1, 2, 5, 12] {
            assert!(dilate(&mask, radius).contains(&mask), "radius {}", radius);
        }
    }

    #[test]
    fn single_pixel_grows_into_disk() {
        let mut mask = Mask::new(11, 11);
        mask.set(5, 5, true);
        let grown = dilate(&mask, 3);
        let disk = Disk::new(3);
        for y in 0..11 {
            for x in 0..11 {
                assert_eq!(grown.get(x, y), disk.contains(x - 5, y - 5), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn growth_is_clipped_at_image_border() {
        let mut mask = Mask::new(4, 4);
        mask.set(0, 0, true);
        let grown = dilate(&mask, 10);
        assert_eq!(grown.count_occupied(), 16);
    }

    #[test]
    fn dilation_is_deterministic() {
        let mask = speckle(40, 25);
        assert_eq!(dilate(&mask, 4), dilate(&mask, 4));
    }

    #[test]
    fn empty_mask_stays_empty() {
        assert!(dilate(&Mask::new(9, 9), 3).is_empty());
    }

    #[test]
    fn kernel_side_does_not_overflow() {
        assert_eq!(kernel_side(0), 1);
        assert_eq!(kernel_side(10), 21);
        assert_eq!(kernel_side(u32::MAX), 2 * u32::MAX as u64 + 1);
        assert_eq!(Disk::new(3).side(), kernel_side(3));
    }

    #[test]
    fn huge_radius_fills_the_image() {
        let mut mask = Mask::new(9, 6);
        mask.set(8, 0, true);
        let grown = dilate(&mask, u32::MAX);
        assert_eq!(grown.count_occupied(), 9 * 6);
        assert_eq!(dilate(&mask, diagonal(9, 6)), grown);
        assert!(dilate(&Mask::new(9, 6), u32::MAX).is_empty());
    }
}
