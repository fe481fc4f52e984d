/// Cubic ease-in shrink of the maximum shape size over a run.
///
/// Early iterations allow shapes up to `max_start_size`; the cap decays
/// exponentially toward `min_end_size + 1` as `(i / budget)³` approaches 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnealingSchedule {
    budget: usize,
    max_start_size: u32,
    min_end_size: u32,
}

impl AnnealingSchedule {
    /// Callers guarantee `budget ≥ 1`, `min_end_size ≥ 1` and
    /// `max_start_size > min_end_size`; see `RunConfig::validate`.
    pub fn new(budget: usize, max_start_size: u32, min_end_size: u32) -> Self {
        Self {
            budget,
            max_start_size,
            min_end_size,
        }
    }

    pub fn floor(&self) -> u32 {
        self.min_end_size + 1
    }

    pub fn max_size(&self, iteration: usize) -> u32 {
        let t = (iteration as f64 / self.budget.max(1) as f64).clamp(0.0, 1.0);
        let progress = t * t * t;
        let ratio = self.min_end_size as f64 / self.max_start_size as f64;
        let cap = (self.max_start_size as f64 * ratio.powf(progress)).round() as u32;
        cap.clamp(self.floor(), self.max_start_size.max(self.floor()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        let s = AnnealingSchedule::new(100, 100, 1);
        assert_eq!(s.max_size(0), 100);
        assert_eq!(s.max_size(100), 2);
        assert_eq!(s.max_size(1_000), 2);
    }

    #[test]
    fn non_increasing() {
        let s = AnnealingSchedule::new(1_000, 200, 1);
        let caps: Vec<u32> = (0..=1_000).map(|i| s.max_size(i)).collect();
        assert!(caps.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn midpoint_follows_cubic_ease() {
        let s = AnnealingSchedule::new(100, 100, 1);
        // t = 0.5, progress = 0.125, 100 * 0.01^0.125 ≈ 56.23
        assert_eq!(s.max_size(50), 56);
    }
}
