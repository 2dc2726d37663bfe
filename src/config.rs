/// All cut-path parameters in one struct.
#[derive(Debug, Clone)]
pub struct CutpathConfig {
    // -- Mask stage --
    /// Occupancy threshold on the 0-255 scale. A pixel is part of the
    /// silhouette when its alpha (or luminance, for images without an
    /// alpha channel) is strictly greater than this.
    pub threshold: u8,

    // -- Offset stage --
    /// Cut margin in pixels. Radius of the disk used to dilate the
    /// silhouette. Kernel cost grows with the square of this value.
    pub offset: u32,

    // -- Curve stage --
    /// Convert each traced outline into cubic segments.
    /// Outlines with fewer than 4 points stay straight.
    pub smooth: bool,

    // -- Output --
    /// Stroke applied to every cut path.
    pub stroke: StrokeStyle,
}

/// Stroke attributes written on each `<path>`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Any SVG color value.
    pub color: String,
    /// Stroke width in canvas pixels.
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            width: 1.0,
        }
    }
}

impl Default for CutpathConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            offset: 10,
            smooth: true,
            stroke: StrokeStyle::default(),
        }
    }
}
