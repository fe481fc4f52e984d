use clap::ValueEnum;

use crate::color::ColorEstimate;
use crate::raster::{Color, Raster, squared_dist};
use crate::shape::Shape;

/// How error reduction is turned into a comparable score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FitnessPolicy {
    /// Total squared-error reduction over the covered pixels.
    #[default]
    Total,
    /// Total reduction divided by the number of covered pixels.
    AreaNormalized,
}

/// A scored shape proposed during one iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub shape: Shape,
    pub color: Color,
    /// Higher is better; negative means painting would add error.
    pub fitness: f64,
    pub covered: u64,
    /// Position in the iteration's batch, used to break ties.
    pub index: usize,
}

/// Raw error reduction and coverage of painting `color` over `shape`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delta {
    pub reduction: i64,
    pub covered: u64,
}

pub fn error_delta(shape: &Shape, color: Color, canvas: &Raster, target: &Raster) -> Delta {
    debug_assert_eq!(canvas.dimensions(), target.dimensions());
    let mut reduction = 0i64;
    let mut covered = 0u64;
    shape.for_each_covered(target.width(), target.height(), |x, y| {
        let t = target.get(x, y);
        reduction += squared_dist(canvas.get(x, y), t) - squared_dist(color, t);
        covered += 1;
    });
    Delta { reduction, covered }
}

impl FitnessPolicy {
    pub fn score(self, delta: Delta) -> f64 {
        if delta.covered == 0 {
            return 0.0;
        }
        match self {
            FitnessPolicy::Total => delta.reduction as f64,
            FitnessPolicy::AreaNormalized => delta.reduction as f64 / delta.covered as f64,
        }
    }
}

/// Scores `shape` filled with `color` against the current canvas.
pub fn evaluate(
    shape: Shape,
    color: Color,
    index: usize,
    canvas: &Raster,
    target: &Raster,
    policy: FitnessPolicy,
) -> Candidate {
    let delta = error_delta(&shape, color, canvas, target);
    Candidate {
        shape,
        color,
        fitness: policy.score(delta),
        covered: delta.covered,
        index,
    }
}

/// Scores an estimator's output. A zero-coverage estimate is kept as a
/// zero-fitness candidate with `covered == 0`, which is never painted.
pub fn score_estimate(
    shape: Shape,
    estimate: ColorEstimate,
    index: usize,
    canvas: &Raster,
    target: &Raster,
    policy: FitnessPolicy,
) -> Candidate {
    if estimate.is_degenerate() {
        return Candidate {
            shape,
            color: estimate.color,
            fitness: 0.0,
            covered: 0,
            index,
        };
    }
    evaluate(shape, estimate.color, index, canvas, target, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Rect, Triangle};

    fn whole(w: u32, h: u32) -> Shape {
        Shape::Rect(Rect {
            x: 0,
            y: 0,
            width: w,
            height: h,
        })
    }

    #[test]
    fn reduction_matches_definition() {
        let target = Raster::from_pixels(2, 1, vec![[10, 0, 0], [0, 0, 0]]).unwrap();
        let canvas = Raster::new(2, 1, [0, 0, 0]);
        let c = evaluate(whole(2, 1), [5, 0, 0], 0, &canvas, &target, FitnessPolicy::Total);
        // before: 100 + 0, after: 25 + 25
        assert_eq!(c.fitness, 50.0);
        assert_eq!(c.covered, 2);
    }

    #[test]
    fn area_normalized_divides_by_coverage() {
        let target = Raster::from_pixels(2, 1, vec![[10, 0, 0], [0, 0, 0]]).unwrap();
        let canvas = Raster::new(2, 1, [0, 0, 0]);
        let c = evaluate(
            whole(2, 1),
            [5, 0, 0],
            0,
            &canvas,
            &target,
            FitnessPolicy::AreaNormalized,
        );
        assert_eq!(c.fitness, 25.0);
    }

    #[test]
    fn negative_when_painting_hurts() {
        let target = Raster::new(2, 2, [100, 100, 100]);
        let canvas = target.clone();
        let c = evaluate(whole(2, 2), [0, 0, 0], 0, &canvas, &target, FitnessPolicy::Total);
        assert!(c.fitness < 0.0);
    }

    #[test]
    fn zero_coverage_scores_zero() {
        let target = Raster::new(4, 4, [200, 0, 0]);
        let canvas = Raster::new(4, 4, [0, 0, 0]);
        let s = Shape::Triangle(Triangle::new([0.0, 0.0], [0.1, 0.0], [0.0, 0.1]));
        for policy in [FitnessPolicy::Total, FitnessPolicy::AreaNormalized] {
            let c = evaluate(s, [200, 0, 0], 0, &canvas, &target, policy);
            assert_eq!(c.fitness, 0.0);
            assert_eq!(c.covered, 0);
        }
    }

    #[test]
    fn degenerate_estimate_scores_zero_even_over_covered_pixels() {
        let target = Raster::new(2, 2, [0, 0, 0]);
        let canvas = Raster::new(2, 2, [255, 255, 255]);
        let estimate = ColorEstimate {
            color: crate::color::FALLBACK_COLOR,
            covered: 0,
        };
        let c = score_estimate(whole(2, 2), estimate, 4, &canvas, &target, FitnessPolicy::Total);
        assert_eq!(c.fitness, 0.0);
        assert_eq!(c.covered, 0);
        assert_eq!(c.color, crate::color::FALLBACK_COLOR);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let target = Raster::from_pixels(2, 1, vec![[1, 2, 3], [4, 5, 6]]).unwrap();
        let canvas = Raster::new(2, 1, [9, 9, 9]);
        let a = evaluate(whole(2, 1), [3, 3, 3], 7, &canvas, &target, FitnessPolicy::Total);
        let b = evaluate(whole(2, 1), [3, 3, 3], 7, &canvas, &target, FitnessPolicy::Total);
        assert_eq!(a, b);
    }
}
