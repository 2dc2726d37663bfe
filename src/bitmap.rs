use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader, Luma};

use crate::config::CutpathConfig;
use crate::error::CutpathError;

/// Binary occupancy grid, row-major, `true` = part of the silhouette.
///
/// Indexed by `(x, y)` = (column, row) with y growing downward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<bool>,
    width: u32,
    height: u32,
}

impl Mask {
    /// An all-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Mask {
            data: vec![false; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Mask {
            data,
            width,
            height,
        }
    }

    /// Create from a grayscale image (non-zero = occupied).
    pub fn from_gray(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self::from_fn(w, h, |x, y| img.get_pixel(x, y).0[0] > 0)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel at (x, y). Out-of-bounds = background.
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.data[i])
    }

    /// Pixel at (x, y), or `None` when outside the grid.
    pub fn get_checked(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Set pixel at (x, y). Writes outside the grid are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = value;
        }
    }

    /// One row of pixels. Panics if `y` is outside the grid.
    pub fn row(&self, y: u32) -> &[bool] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Number of occupied pixels.
    pub fn count_occupied(&self) -> usize {
        self.data.iter().filter(|&&set| set).count()
    }

    /// True when no pixel is occupied.
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&set| set)
    }

    /// True when every occupied pixel of `other` is also occupied here.
    pub fn contains(&self, other: &Mask) -> bool {
        self.dimensions() == other.dimensions()
            && self.data.iter().zip(&other.data).all(|(&a, &b)| a || !b)
    }

    /// Render as a 0/255 grayscale image.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let set = self.data[y as usize * self.width as usize + x as usize];
            Luma([if set { 255 } else { 0 }])
        })
    }

    /// Clear row y over columns `x0..x1`, clipped to the mask.
    pub(crate) fn clear_span(&mut self, y: i32, x0: i32, x1: i32) {
        if y < 0 || y as u32 >= self.height {
            return;
        }
        let start = y as usize * self.width as usize;
        let a = x0.clamp(0, self.width as i32) as usize;
        let b = x1.clamp(0, self.width as i32) as usize;
        if a < b {
            self.data[start + a..start + b].fill(false);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

/// How the silhouette was separated from the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskSource {
    /// Alpha channel thresholded.
    Alpha,
    /// No alpha channel: luminance thresholded, so near-black reads as background.
    Luminance,
}

/// Decode an image file.
pub fn load(path: &Path) -> Result<DynamicImage, CutpathError> {
    ImageReader::open(path)
        .map_err(|e| CutpathError::InvalidImage(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| CutpathError::InvalidImage(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| CutpathError::InvalidImage(format!("{}: {}", path.display(), e)))
}

/// Extract the silhouette of a decoded image as a binary mask.
///
/// With an alpha channel a pixel is occupied iff `alpha > threshold`.
/// Without one, luminance is tested against the same threshold instead.
/// That fallback cannot see transparency and misreads dark subjects as
/// background.
pub fn extract(
    image: &DynamicImage,
    config: &CutpathConfig,
) -> Result<(Mask, MaskSource), CutpathError> {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
        return Err(CutpathError::InvalidImage(format!("zero-sized image ({}x{})", w, h)));
    }
    let channels = image.color().channel_count();
    if channels < 3 {
        return Err(CutpathError::InvalidImage(format!(
            "unsupported channel count {} (need 3 or 4)",
            channels
        )));
    }

    let threshold = config.threshold;
    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        let mask = Mask::from_fn(w, h, |x, y| rgba.get_pixel(x, y).0[3] > threshold);
        Ok((mask, MaskSource::Alpha))
    } else {
        let luma = image.to_luma8();
        let mask = Mask::from_fn(w, h, |x, y| luma.get_pixel(x, y).0[0] > threshold);
        Ok((mask, MaskSource::Luminance))
    }
}
