use std::ops::Range;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::color::ColorEstimator;
use crate::fitness::{self, Candidate, FitnessPolicy};
use crate::raster::Raster;
use crate::sampler::ShapeSampler;

/// Read-only view of everything a worker needs during generation.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub target: &'a Raster,
    pub canvas: &'a Raster,
    pub sampler: &'a ShapeSampler,
    pub estimator: &'a dyn ColorEstimator,
    pub policy: FitnessPolicy,
}

/// Outcome of one batch: the best candidate, if any slot produced one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchResult {
    pub winner: Option<Candidate>,
    /// Slots skipped because the sampler gave up.
    pub failed: usize,
}

/// Splits `[0, batch)` into `workers` contiguous shards; the last one takes
/// the remainder.
pub fn shard_ranges(batch: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, batch.max(1));
    let per = batch / workers;
    (0..workers)
        .map(|i| {
            let start = i * per;
            let end = if i + 1 == workers { batch } else { start + per };
            start..end
        })
        .collect()
}

/// Highest fitness wins; equal fitness goes to the lower batch index.
pub fn select_best<I: IntoIterator<Item = Candidate>>(candidates: I) -> Option<Candidate> {
    candidates.into_iter().fold(None, |best, c| match best {
        Some(b) if b.fitness > c.fitness || (b.fitness == c.fitness && b.index <= c.index) => {
            Some(b)
        }
        _ => Some(c),
    })
}

/// SplitMix64 finalizer, used to derive independent per-slot seeds.
pub fn mix_seed(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one batch slot. Depends only on the slot index, so the shard
/// layout never changes what a slot draws.
pub fn slot_seed(batch_seed: u64, index: usize) -> u64 {
    mix_seed(batch_seed ^ mix_seed(index as u64))
}

fn score_shard(
    ctx: &SearchContext<'_>,
    slots: Range<usize>,
    cap: u32,
    batch_seed: u64,
) -> BatchResult {
    let mut failed = 0;
    let mut best = None;
    for index in slots {
        let mut rng = StdRng::seed_from_u64(slot_seed(batch_seed, index));
        let shape = match ctx.sampler.sample(cap, &mut rng) {
            Ok(shape) => shape,
            Err(err) => {
                log::debug!("slot {index} skipped: {err}");
                failed += 1;
                continue;
            }
        };
        let estimate = ctx.estimator.estimate(&shape, ctx.target);
        let candidate = fitness::score_estimate(
            shape,
            estimate,
            index,
            ctx.canvas,
            ctx.target,
            ctx.policy,
        );
        best = select_best(best.into_iter().chain(Some(candidate)));
    }
    BatchResult {
        winner: best,
        failed,
    }
}

/// Samples and scores `batch` candidates across `workers` shards on `pool`,
/// then reduces the shard winners on the calling thread.
///
/// Every shard reads the same canvas snapshot. Each slot gets its own RNG
/// seeded from `batch_seed` and the slot index, so the result does not
/// depend on `workers`.
pub fn run_batch(
    ctx: &SearchContext<'_>,
    pool: &ThreadPool,
    batch: usize,
    workers: usize,
    cap: u32,
    batch_seed: u64,
) -> BatchResult {
    let shards = shard_ranges(batch, workers);
    let results: Vec<BatchResult> = pool.install(|| {
        shards
            .into_par_iter()
            .map(|slots| score_shard(ctx, slots, cap, batch_seed))
            .collect()
    });
    let failed = results.iter().map(|r| r.failed).sum();
    BatchResult {
        winner: select_best(results.into_iter().filter_map(|r| r.winner)),
        failed,
    }
}
