use rand::Rng;

use crate::error::{Error, Result};
use crate::shape::{Rect, Shape, ShapeKind, Triangle};

/// Upper bound on resampling before a batch slot is given up.
pub const MAX_SAMPLE_ATTEMPTS: u32 = 64;

/// Draws random shapes inside a fixed raster.
#[derive(Clone, Copy, Debug)]
pub struct ShapeSampler {
    pub kind: ShapeKind,
    pub width: u32,
    pub height: u32,
    /// Smallest rectangle side; also the margin kept from the right/bottom edge.
    pub min_size: u32,
}

impl ShapeSampler {
    pub fn new(kind: ShapeKind, width: u32, height: u32, min_size: u32) -> Result<Self> {
        if width <= min_size || height <= min_size {
            return Err(Error::RasterTooSmall {
                width,
                height,
                min_size,
            });
        }
        Ok(Self {
            kind,
            width,
            height,
            min_size,
        })
    }

    /// Returns a valid shape whose extent fits within `cap` on both axes.
    ///
    /// Degenerate or empty draws are resampled up to [`MAX_SAMPLE_ATTEMPTS`]
    /// times before failing with [`Error::ShapeGenerationFailed`].
    pub fn sample<R: Rng>(&self, cap: u32, rng: &mut R) -> Result<Shape> {
        retry_bounded(|| {
            let shape = match self.kind {
                ShapeKind::Rect => Shape::Rect(self.rect(cap, rng)),
                ShapeKind::Triangle => Shape::Triangle(self.triangle(cap, rng)),
            };
            self.accept(shape).then_some(shape)
        })
    }

    fn accept(&self, shape: Shape) -> bool {
        if shape.validate(self.width, self.height).is_err() {
            return false;
        }
        match shape {
            Shape::Rect(_) => true,
            Shape::Triangle(_) => shape.covered_count(self.width, self.height) > 0,
        }
    }

    fn rect<R: Rng>(&self, cap: u32, rng: &mut R) -> Rect {
        let m = self.min_size;
        let x = rng.random_range(0..self.width - m);
        let y = rng.random_range(0..self.height - m);
        let span = |dim: u32, origin: u32| (dim - origin - m).min(cap.saturating_sub(m)).max(m);
        let width = rng.random_range(m..=span(self.width, x));
        let height = rng.random_range(m..=span(self.height, y));
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    fn triangle<R: Rng>(&self, cap: u32, rng: &mut R) -> Triangle {
        let (w, h) = (self.width as f32, self.height as f32);
        let side_x = (cap as f32).min(w);
        let side_y = (cap as f32).min(h);
        let ox = rng.random_range(0.0..=w - side_x);
        let oy = rng.random_range(0.0..=h - side_y);
        let mut vertex = || {
            [
                (ox + rng.random_range(0.0..=side_x)).min(w),
                (oy + rng.random_range(0.0..=side_y)).min(h),
            ]
        };
        Triangle::new(vertex(), vertex(), vertex())
    }
}

fn retry_bounded<F: FnMut() -> Option<Shape>>(mut draw: F) -> Result<Shape> {
    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        if let Some(shape) = draw() {
            return Ok(shape);
        }
    }
    Err(Error::ShapeGenerationFailed {
        attempts: MAX_SAMPLE_ATTEMPTS,
    })
}
