use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::fitness::FitnessPolicy;
use crate::raster::Color;
use crate::shape::ShapeKind;

/// When the iteration's winner is written to the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CommitPolicy {
    /// Greedy: always paint the best candidate, even if it adds error.
    #[default]
    Always,
    /// Paint only candidates with positive fitness.
    StrictImprovement,
}

/// Static parameters of one painting run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub iterations: usize,
    pub batch_size: usize,
    /// Ceiling on worker threads; `None` uses all available parallelism.
    pub max_workers: Option<usize>,
    pub max_start_size: u32,
    pub min_end_size: u32,
    pub shape: ShapeKind,
    pub fitness_policy: FitnessPolicy,
    pub commit_policy: CommitPolicy,
    /// Run seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub background: Color,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            batch_size: 100,
            max_workers: None,
            max_start_size: 200,
            min_end_size: 1,
            shape: ShapeKind::Rect,
            fitness_policy: FitnessPolicy::Total,
            commit_policy: CommitPolicy::Always,
            seed: None,
            background: [0, 0, 0],
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidConfig(msg));
        if self.iterations == 0 {
            return fail("iterations must be at least 1".into());
        }
        if self.batch_size == 0 {
            return fail("batch size must be at least 1".into());
        }
        if self.max_workers == Some(0) {
            return fail("worker ceiling must be at least 1".into());
        }
        if self.min_end_size == 0 {
            return fail("minimum end size must be at least 1".into());
        }
        if self.max_start_size <= self.min_end_size {
            return fail(format!(
                "maximum start size {} must exceed minimum end size {}",
                self.max_start_size, self.min_end_size
            ));
        }
        Ok(())
    }

    /// Worker count for this machine: the ceiling bounded by available
    /// parallelism and by the batch size, never below one.
    pub fn worker_count(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.max_workers
            .map_or(available, |ceiling| ceiling.min(available))
            .min(self.batch_size)
            .max(1)
    }
}
