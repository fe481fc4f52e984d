//! Approximates an image by greedily painting rectangles or triangles.
//!
//! Each iteration samples a batch of random shapes across a worker pool,
//! fills each with the mean target color under it, scores the error
//! reduction against the current canvas, and paints the best one.
//! Shape size shrinks over the run on a cubic annealing schedule.

pub mod anneal;
pub mod color;
pub mod commit;
pub mod config;
pub mod error;
pub mod fitness;
pub mod optimizer;
pub mod raster;
pub mod sampler;
pub mod search;
pub mod shape;

pub use anneal::AnnealingSchedule;
pub use color::{ColorEstimate, ColorEstimator, FALLBACK_COLOR, MeanColor};
pub use config::{CommitPolicy, RunConfig};
pub use error::{Error, Result};
pub use fitness::{Candidate, FitnessPolicy};
pub use optimizer::{IterationReport, LoopState, Optimizer, StepOutcome};
pub use raster::{Color, Raster};
pub use sampler::ShapeSampler;
pub use shape::{Rect, Shape, ShapeKind, Triangle};
