use shape_painter::fitness::evaluate;
use shape_painter::{
    AnnealingSchedule, ColorEstimator, CommitPolicy, FitnessPolicy, MeanColor, Optimizer, Raster,
    Rect, RunConfig, Shape, ShapeKind, StepOutcome,
};

fn one_black_three_white() -> Raster {
    Raster::from_pixels(
        2,
        2,
        vec![[0, 0, 0], [255, 255, 255], [255, 255, 255], [255, 255, 255]],
    )
    .unwrap()
}

fn rect(x: u32, y: u32, width: u32, height: u32) -> Shape {
    Shape::Rect(Rect {
        x,
        y,
        width,
        height,
    })
}

fn noisy(w: u32, h: u32, salt: u32) -> Raster {
    let pixels = (0..w * h)
        .map(|i| {
            let v = i.wrapping_mul(2_654_435_761).wrapping_add(salt);
            [(v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8]
        })
        .collect();
    Raster::from_pixels(w, h, pixels).unwrap()
}

fn small_run(iterations: usize, shape: ShapeKind, commit_policy: CommitPolicy) -> RunConfig {
    RunConfig {
        iterations,
        batch_size: 24,
        max_workers: Some(3),
        max_start_size: 10,
        min_end_size: 1,
        shape,
        commit_policy,
        seed: Some(7),
        ..Default::default()
    }
}

#[test]
fn whole_raster_rect_estimates_rounded_mean() {
    let target = one_black_three_white();
    let est = MeanColor.estimate(&rect(0, 0, 2, 2), &target);
    assert_eq!(est.color, [191, 191, 191]);
    assert_eq!(est.covered, 4);
}

#[test]
fn single_pixel_candidate_scores_higher_per_pixel() {
    let target = one_black_three_white();
    let canvas = Raster::new(2, 2, [255, 255, 255]);

    let single = rect(0, 0, 1, 1);
    let whole = rect(0, 0, 2, 2);
    let single_color = MeanColor.estimate(&single, &target).color;
    let whole_color = MeanColor.estimate(&whole, &target).color;

    let a = evaluate(single, single_color, 0, &canvas, &target, FitnessPolicy::Total);
    let b = evaluate(whole, whole_color, 1, &canvas, &target, FitnessPolicy::Total);
    // The single-pixel candidate removes all error on the black pixel.
    assert_eq!(a.fitness, (3 * 255 * 255) as f64);
    assert!(a.fitness / a.covered as f64 > b.fitness / b.covered as f64);

    let a = evaluate(single, single_color, 0, &canvas, &target, FitnessPolicy::AreaNormalized);
    let b = evaluate(whole, whole_color, 1, &canvas, &target, FitnessPolicy::AreaNormalized);
    assert!(a.fitness > b.fitness);
}

#[test]
fn cubic_schedule_endpoints() {
    let s = AnnealingSchedule::new(100, 100, 1);
    assert_eq!(s.max_size(0), 100);
    assert_eq!(s.max_size(100), 2);
    for i in 0..100 {
        assert!(s.max_size(i) >= s.max_size(i + 1));
    }
}

#[test]
fn converged_canvas_stays_put_under_strict_improvement() {
    let target = noisy(16, 12, 3);
    for shape in [ShapeKind::Rect, ShapeKind::Triangle] {
        let cfg = small_run(30, shape, CommitPolicy::StrictImprovement);
        let mut opt = Optimizer::new(cfg, target.clone())
            .unwrap()
            .with_canvas(target.clone())
            .unwrap();
        opt.run(|report, canvas| {
            assert!(report.winner.fitness <= 0.0);
            assert!(!report.committed);
            assert_eq!(canvas, &target);
        })
        .unwrap();
        assert_eq!(opt.total_error().unwrap(), 0);
    }
}

#[test]
fn converged_canvas_only_gets_worse_when_always_committing() {
    // With 2x2 as the smallest rectangle, no candidate can match the noisy
    // target exactly, so every winner has negative fitness.
    let target = noisy(16, 12, 5);
    let cfg = RunConfig {
        min_end_size: 2,
        ..small_run(10, ShapeKind::Rect, CommitPolicy::Always)
    };
    let mut opt = Optimizer::new(cfg, target.clone())
        .unwrap()
        .with_canvas(target.clone())
        .unwrap();
    let mut added = 0.0;
    let mut commits = 0;
    opt.run(|report, _| {
        assert!(report.winner.fitness < 0.0);
        assert!(report.committed);
        added -= report.winner.fitness;
        commits += 1;
    })
    .unwrap();
    assert_eq!(commits, 10);
    assert!(added > 0.0);
    assert_eq!(opt.total_error().unwrap() as f64, added);
}

#[test]
fn strict_improvement_never_increases_error() {
    for shape in [ShapeKind::Rect, ShapeKind::Triangle] {
        let cfg = small_run(60, shape, CommitPolicy::StrictImprovement);
        let mut opt = Optimizer::new(cfg, noisy(20, 14, 11)).unwrap();
        let mut last = opt.total_error().unwrap();
        while let StepOutcome::Iteration(report) = opt.step().unwrap() {
            let now = opt.total_error().unwrap();
            assert!(now <= last, "error rose at iteration {}", report.iteration);
            assert_eq!(report.committed, report.winner.fitness > 0.0);
            last = now;
        }
    }
}

#[test]
fn always_commit_changes_error_by_exactly_the_fitness() {
    for shape in [ShapeKind::Rect, ShapeKind::Triangle] {
        let cfg = small_run(60, shape, CommitPolicy::Always);
        let mut opt = Optimizer::new(cfg, noisy(20, 14, 13)).unwrap();
        let mut last = opt.total_error().unwrap() as i64;
        while let StepOutcome::Iteration(report) = opt.step().unwrap() {
            let now = opt.total_error().unwrap() as i64;
            assert!(report.committed);
            assert_eq!(last - now, report.winner.fitness as i64);
            if report.winner.fitness >= 0.0 {
                assert!(now <= last);
            }
            last = now;
        }
    }
}

#[test]
fn painting_reduces_error_on_a_real_run() {
    let target = noisy(24, 16, 17);
    let cfg = small_run(40, ShapeKind::Rect, CommitPolicy::Always);
    let mut opt = Optimizer::new(cfg, target).unwrap();
    let start = opt.total_error().unwrap();
    opt.run(|_, _| {}).unwrap();
    assert!(opt.total_error().unwrap() < start);
}

#[test]
fn winner_beats_every_candidate_it_was_drawn_against() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shape_painter::ShapeSampler;
    use shape_painter::search::select_best;

    let target = noisy(16, 16, 19);
    let canvas = Raster::new(16, 16, [0, 0, 0]);
    let sampler = ShapeSampler::new(ShapeKind::Triangle, 16, 16, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let batch: Vec<_> = (0..64)
        .map(|i| {
            let shape = sampler.sample(12, &mut rng).unwrap();
            let color = MeanColor.estimate(&shape, &target).color;
            evaluate(shape, color, i, &canvas, &target, FitnessPolicy::Total)
        })
        .collect();
    let best = select_best(batch.iter().copied()).unwrap();
    assert!(batch.iter().all(|c| best.fitness >= c.fitness));
    let first_max = batch.iter().find(|c| c.fitness == best.fitness).unwrap();
    assert_eq!(best.index, first_max.index);
}
