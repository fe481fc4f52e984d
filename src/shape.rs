use std::fmt;

use clap::ValueEnum;

use crate::error::{Error, Result};

/// Barycentric denominators at or below this are treated as zero-area triangles.
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Which primitive the sampler draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ShapeKind {
    #[default]
    Rect,
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [[f32; 2]; 3],
}

/// Half-open pixel window `[x0, x1) × [y0, y1)`, already clipped to a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Triangle(Triangle),
}

impl Shape {
    /// Checks the geometric invariants against a `width × height` raster.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        match self {
            Shape::Rect(r) => {
                if r.width == 0 || r.height == 0 {
                    return Err(Error::InvalidShape(format!("zero-size rectangle {r:?}")));
                }
                let fits_x = r.x.checked_add(r.width).is_some_and(|x1| x1 <= width);
                let fits_y = r.y.checked_add(r.height).is_some_and(|y1| y1 <= height);
                if !fits_x || !fits_y {
                    return Err(Error::InvalidShape(format!(
                        "rectangle {r:?} exceeds {width}x{height}"
                    )));
                }
            }
            Shape::Triangle(t) => {
                let in_bounds = t.vertices.iter().all(|&[x, y]| {
                    x.is_finite()
                        && y.is_finite()
                        && (0.0..=width as f32).contains(&x)
                        && (0.0..=height as f32).contains(&y)
                });
                if !in_bounds {
                    return Err(Error::InvalidShape(format!(
                        "triangle {t:?} exceeds {width}x{height}"
                    )));
                }
                if t.is_degenerate() {
                    return Err(Error::InvalidShape(format!("degenerate triangle {t:?}")));
                }
            }
        }
        Ok(())
    }

    /// Width and height of the shape's bounding box in raster units.
    pub fn extent(&self) -> (f32, f32) {
        match self {
            Shape::Rect(r) => (r.width as f32, r.height as f32),
            Shape::Triangle(t) => {
                let (min, max) = t.min_max();
                (max[0] - min[0], max[1] - min[1])
            }
        }
    }

    /// Pixels that may be covered, clipped to the raster.
    pub fn bounds(&self, width: u32, height: u32) -> PixelBounds {
        match self {
            Shape::Rect(r) => PixelBounds {
                x0: r.x.min(width),
                y0: r.y.min(height),
                x1: r.x.saturating_add(r.width).min(width),
                y1: r.y.saturating_add(r.height).min(height),
            },
            Shape::Triangle(t) => {
                let (min, max) = t.min_max();
                let clip = |v: f32, limit: u32| (v.max(0.0) as u32).min(limit);
                PixelBounds {
                    x0: clip(min[0].floor(), width),
                    y0: clip(min[1].floor(), height),
                    x1: clip(max[0].ceil(), width),
                    y1: clip(max[1].ceil(), height),
                }
            }
        }
    }

    /// Calls `f` for every covered pixel, in row-major order.
    ///
    /// This is the single coverage definition used by color estimation,
    /// fitness evaluation and commit. A triangle covers a pixel when the
    /// pixel's center passes the barycentric inclusion test.
    pub fn for_each_covered<F: FnMut(u32, u32)>(&self, width: u32, height: u32, mut f: F) {
        let b = self.bounds(width, height);
        if b.is_empty() {
            return;
        }
        match self {
            Shape::Rect(_) => {
                for y in b.y0..b.y1 {
                    for x in b.x0..b.x1 {
                        f(x, y);
                    }
                }
            }
            Shape::Triangle(t) => {
                let Some(bary) = Barycentric::new(t) else {
                    return;
                };
                for y in b.y0..b.y1 {
                    for x in b.x0..b.x1 {
                        if bary.contains(x as f64 + 0.5, y as f64 + 0.5) {
                            f(x, y);
                        }
                    }
                }
            }
        }
    }

    pub fn covered_count(&self, width: u32, height: u32) -> u64 {
        let mut n = 0u64;
        self.for_each_covered(width, height, |_, _| n += 1);
        n
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Rect(r) => write!(f, "rect {}x{} at ({}, {})", r.width, r.height, r.x, r.y),
            Shape::Triangle(t) => {
                let [a, b, c] = t.vertices;
                write!(
                    f,
                    "triangle ({:.1}, {:.1}) ({:.1}, {:.1}) ({:.1}, {:.1})",
                    a[0], a[1], b[0], b[1], c[0], c[1]
                )
            }
        }
    }
}

impl Triangle {
    pub fn new(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    fn min_max(&self) -> ([f32; 2], [f32; 2]) {
        let [a, b, c] = self.vertices;
        (
            [a[0].min(b[0]).min(c[0]), a[1].min(b[1]).min(c[1])],
            [a[0].max(b[0]).max(c[0]), a[1].max(b[1]).max(c[1])],
        )
    }

    pub fn is_degenerate(&self) -> bool {
        Barycentric::new(self).is_none()
    }
}

/// Precomputed dot products for the point-in-triangle test.
struct Barycentric {
    origin: [f64; 2],
    v0: [f64; 2],
    v1: [f64; 2],
    d00: f64,
    d01: f64,
    d11: f64,
    denom: f64,
}

impl Barycentric {
    fn new(t: &Triangle) -> Option<Self> {
        let p = t.vertices.map(|[x, y]| [x as f64, y as f64]);
        let v0 = [p[2][0] - p[0][0], p[2][1] - p[0][1]];
        let v1 = [p[1][0] - p[0][0], p[1][1] - p[0][1]];
        let d00 = dot(v0, v0);
        let d01 = dot(v0, v1);
        let d11 = dot(v1, v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.is_nan() || denom <= DEGENERATE_EPSILON {
            return None;
        }
        Some(Self {
            origin: p[0],
            v0,
            v1,
            d00,
            d01,
            d11,
            denom,
        })
    }

    #[inline]
    fn contains(&self, px: f64, py: f64) -> bool {
        let v2 = [px - self.origin[0], py - self.origin[1]];
        let d20 = dot(v2, self.v0);
        let d21 = dot(v2, self.v1);
        let v = (self.d11 * d20 - self.d01 * d21) / self.denom;
        let w = (self.d00 * d21 - self.d01 * d20) / self.denom;
        let u = 1.0 - v - w;
        u >= 0.0 && v >= 0.0 && w >= 0.0
    }
}

#[inline]
fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}
