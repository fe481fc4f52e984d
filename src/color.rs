use crate::raster::{Color, Raster};
use crate::shape::Shape;

/// Returned when a shape covers no pixel at all.
pub const FALLBACK_COLOR: Color = [255, 255, 255];

/// Fill color chosen for a shape, with the pixel count it was averaged over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorEstimate {
    pub color: Color,
    pub covered: u64,
}

impl ColorEstimate {
    /// True when no pixel was covered and `color` is the fallback.
    pub fn is_degenerate(&self) -> bool {
        self.covered == 0
    }
}

/// Picks the fill color that minimizes squared error over a shape's coverage.
///
/// Implementations must be pure: the same shape and raster always give the
/// same estimate, and zero coverage yields [`FALLBACK_COLOR`].
pub trait ColorEstimator: Send + Sync {
    fn estimate(&self, shape: &Shape, raster: &Raster) -> ColorEstimate;
}

/// CPU estimator: the rounded per-channel mean of covered pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanColor;

impl ColorEstimator for MeanColor {
    fn estimate(&self, shape: &Shape, raster: &Raster) -> ColorEstimate {
        let (mut sr, mut sg, mut sb, mut count) = (0u64, 0u64, 0u64, 0u64);
        shape.for_each_covered(raster.width(), raster.height(), |x, y| {
            let [r, g, b] = raster.get(x, y);
            sr += r as u64;
            sg += g as u64;
            sb += b as u64;
            count += 1;
        });
        if count == 0 {
            return ColorEstimate {
                color: FALLBACK_COLOR,
                covered: 0,
            };
        }
        let mean = |sum: u64| ((sum + count / 2) / count) as u8;
        ColorEstimate {
            color: [mean(sr), mean(sg), mean(sb)],
            covered: count,
        }
    }
}
