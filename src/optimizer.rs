use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::anneal::AnnealingSchedule;
use crate::color::{ColorEstimator, MeanColor};
use crate::commit::commit;
use crate::config::{CommitPolicy, RunConfig};
use crate::error::{Error, Result};
use crate::fitness::Candidate;
use crate::raster::Raster;
use crate::sampler::ShapeSampler;
use crate::search::{self, BatchResult, SearchContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Done,
}

/// What one step did, handed to the display host.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    pub max_size: u32,
    /// Shape and color to draw.
    pub winner: Candidate,
    /// False when the commit policy held the winner back.
    pub committed: bool,
    pub failed_slots: usize,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Iteration(IterationReport),
    Done,
}

/// Greedy shape painter: one batch search and at most one commit per step.
pub struct Optimizer {
    config: RunConfig,
    seed: u64,
    target: Raster,
    canvas: Raster,
    schedule: AnnealingSchedule,
    sampler: ShapeSampler,
    estimator: Box<dyn ColorEstimator>,
    pool: ThreadPool,
    workers: usize,
    iteration: usize,
    state: LoopState,
}

impl Optimizer {
    pub fn new(config: RunConfig, target: Raster) -> Result<Self> {
        Self::with_estimator(config, target, Box::new(MeanColor))
    }

    /// Same as [`Optimizer::new`] but with a substitute color estimator.
    pub fn with_estimator(
        config: RunConfig,
        target: Raster,
        estimator: Box<dyn ColorEstimator>,
    ) -> Result<Self> {
        config.validate()?;
        let (width, height) = target.dimensions();
        let sampler = ShapeSampler::new(config.shape, width, height, config.min_end_size)?;
        let schedule = AnnealingSchedule::new(
            config.iterations,
            config.max_start_size,
            config.min_end_size,
        );
        let workers = config.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("painter-{i}"))
            .build()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let canvas = Raster::new(width, height, config.background);
        Ok(Self {
            config,
            seed,
            target,
            canvas,
            schedule,
            sampler,
            estimator,
            pool,
            workers,
            iteration: 0,
            state: LoopState::Idle,
        })
    }

    /// Starts from `canvas` instead of a blank background. Only allowed
    /// before the first step.
    pub fn with_canvas(mut self, canvas: Raster) -> Result<Self> {
        if canvas.dimensions() != self.target.dimensions() {
            return Err(Error::DimensionMismatch {
                left: canvas.dimensions(),
                right: self.target.dimensions(),
            });
        }
        if self.state != LoopState::Idle {
            return Err(Error::InvalidConfig(
                "canvas can only be replaced before the run starts".into(),
            ));
        }
        self.canvas = canvas;
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn canvas(&self) -> &Raster {
        &self.canvas
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Total squared error between canvas and target.
    pub fn total_error(&self) -> Result<u64> {
        self.canvas.squared_error(&self.target)
    }

    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            log::info!(
                "painting {}x{} with {:?}, {} iterations of {} candidates on {} workers (seed {})",
                self.target.width(),
                self.target.height(),
                self.config.shape,
                self.config.iterations,
                self.config.batch_size,
                self.workers,
                self.seed
            );
            self.iteration = 0;
            self.state = LoopState::Running;
        }
    }

    fn search(&self, cap: u32, attempt: u64) -> BatchResult {
        let ctx = SearchContext {
            target: &self.target,
            canvas: &self.canvas,
            sampler: &self.sampler,
            estimator: self.estimator.as_ref(),
            policy: self.config.fitness_policy,
        };
        let batch_seed = search::mix_seed(
            self.seed ^ search::mix_seed(((self.iteration as u64) << 1) | attempt),
        );
        search::run_batch(
            &ctx,
            &self.pool,
            self.config.batch_size,
            self.workers,
            cap,
            batch_seed,
        )
    }

    /// Runs one iteration. Once the budget is spent this is a no-op that
    /// returns [`StepOutcome::Done`].
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.step_with(|opt, cap, attempt| opt.search(cap, attempt))
    }

    /// One iteration with `search` producing the batch for a given size cap
    /// and attempt number. An empty batch is retried once before the run is
    /// abandoned.
    fn step_with<S>(&mut self, mut search: S) -> Result<StepOutcome>
    where
        S: FnMut(&Self, u32, u64) -> BatchResult,
    {
        match self.state {
            LoopState::Done => return Ok(StepOutcome::Done),
            LoopState::Idle => self.start(),
            LoopState::Running => {}
        }

        let started = Instant::now();
        let cap = self.schedule.max_size(self.iteration);
        let mut batch = search(self, cap, 0);
        if batch.winner.is_none() {
            log::warn!(
                "iteration {}: all {} slots failed, retrying",
                self.iteration,
                batch.failed
            );
            batch = search(self, cap, 1);
        }
        let Some(winner) = batch.winner else {
            self.state = LoopState::Done;
            return Err(Error::IterationExhausted {
                iteration: self.iteration,
            });
        };

        // Zero-coverage winners come from a degenerate estimate and paint nothing.
        let committed = winner.covered > 0
            && match self.config.commit_policy {
                CommitPolicy::Always => true,
                CommitPolicy::StrictImprovement => winner.fitness > 0.0,
            };
        if committed {
            commit(&mut self.canvas, &winner);
        }
        log::debug!(
            "iteration {}: cap {cap}, {} {:?} fitness {:.1}{}",
            self.iteration,
            winner.shape,
            winner.color,
            winner.fitness,
            if committed { "" } else { " (held back)" }
        );

        let report = IterationReport {
            iteration: self.iteration,
            max_size: cap,
            winner,
            committed,
            failed_slots: batch.failed,
            elapsed: started.elapsed(),
        };
        self.iteration += 1;
        if self.iteration >= self.config.iterations {
            self.state = LoopState::Done;
            log::info!("finished {} iterations", self.iteration);
        }
        Ok(StepOutcome::Iteration(report))
    }

    /// Steps until done, handing each report and the updated canvas to `observer`.
    pub fn run<F>(&mut self, mut observer: F) -> Result<()>
    where
        F: FnMut(&IterationReport, &Raster),
    {
        while let StepOutcome::Iteration(report) = self.step()? {
            observer(&report, &self.canvas);
        }
        Ok(())
    }
}
