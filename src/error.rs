use thiserror::Error;

/// Errors surfaced by the painting engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    #[error("raster {width}x{height} is too small for a minimum shape size of {min_size}")]
    RasterTooSmall { width: u32, height: u32, min_size: u32 },

    #[error("raster dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("no valid shape after {attempts} attempts")]
    ShapeGenerationFailed { attempts: u32 },

    #[error("iteration {iteration} produced no candidate")]
    IterationExhausted { iteration: usize },

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
