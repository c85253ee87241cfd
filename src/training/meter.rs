// ============================================================
// Layer 5 — Metric Accumulator
// ============================================================
// Running weighted mean of a scalar metric over one epoch.
// Each batch contributes (value, batch_size); the average is
// sum(value * weight) / sum(weight).
//
// A running f64 sum keeps the mean exact to well below display
// precision for the ~400 batches of a CIFAR epoch, and for tens of
// thousands of updates.

/// Weighted running average (the classic "AverageMeter").
#[derive(Debug, Clone, Default)]
pub struct MetricAccumulator {
    last: f64,
    sum: f64,
    count: usize,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation of `value` carrying `weight` samples.
    pub fn update(&mut self, value: f64, weight: usize) {
        self.last = value;
        self.sum += value * weight as f64;
        self.count += weight;
    }

    /// Weighted mean so far, or `0.0` if nothing has been folded in.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Most recent observation.
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Total weight seen (number of samples).
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weighted_mean_of_batches() {
        let mut m = MetricAccumulator::new();
        m.update(2.0, 128);
        m.update(4.0, 128);
        m.update(1.0, 64);
        // (256 + 512 + 64) / 320
        assert_relative_eq!(m.average(), 2.6, epsilon = 1e-12);
        assert_eq!(m.count(), 320);
        assert_eq!(m.last(), 1.0);
    }

    #[test]
    fn empty_average_is_zero() {
        let m = MetricAccumulator::new();
        assert_eq!(m.average(), 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = MetricAccumulator::new();
        m.update(9.0, 10);
        m.reset();
        assert_eq!(m.average(), 0.0);
        assert_eq!(m.count(), 0);
    }

    #[test]
    fn stable_over_many_updates() {
        let mut m = MetricAccumulator::new();
        for i in 0..50_000 {
            // alternate 0.1 and 0.3 so the true mean is 0.2
            let v = if i % 2 == 0 { 0.1 } else { 0.3 };
            m.update(v, 128);
        }
        assert_relative_eq!(m.average(), 0.2, epsilon = 1e-9);
    }
}
