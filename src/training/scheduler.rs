// ============================================================
// Layer 5 — Learning Rate Scheduler (step decay)
// ============================================================
// The rate is multiplied by `gamma` at the start of every epoch
// listed in the schedule, e.g. [80, 150] with gamma = 0.1:
//
//   epochs   0..80   → lr
//   epochs  80..150  → lr * 0.1
//   epochs 150..     → lr * 0.01
//
// The rate is always derived from the epoch index
// (lr * gamma^k, k = schedule points <= epoch) rather than by
// repeatedly multiplying the current rate. Calling `maybe_decay`
// twice for the same epoch, or resuming mid-run, therefore never
// decays twice.

use crate::domain::error::TrainError;

#[derive(Debug, Clone)]
pub struct LearningRateScheduler {
    base_lr: f64,
    schedule: Vec<usize>,
    gamma: f64,
    current: f64,
}

impl LearningRateScheduler {
    pub fn new(base_lr: f64, schedule: Vec<usize>, gamma: f64) -> Result<Self, TrainError> {
        if !(base_lr.is_finite() && base_lr > 0.0) {
            return Err(TrainError::config(format!("learning rate must be positive, got {base_lr}")));
        }
        if !(gamma > 0.0 && gamma <= 1.0) {
            return Err(TrainError::config(format!("gamma must be in (0, 1], got {gamma}")));
        }
        if schedule.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TrainError::config(format!(
                "schedule epochs must be strictly ascending, got {schedule:?}"
            )));
        }
        Ok(Self { base_lr, schedule, gamma, current: base_lr })
    }

    /// Learning rate in effect during `epoch`.
    pub fn rate_at(&self, epoch: usize) -> f64 {
        let decays = self.schedule.iter().take_while(|&&e| e <= epoch).count();
        self.base_lr * self.gamma.powi(decays as i32)
    }

    /// Move to `epoch` and return its rate.
    pub fn maybe_decay(&mut self, epoch: usize) -> f64 {
        let rate = self.rate_at(epoch);
        if rate != self.current {
            tracing::debug!("Learning rate {:.6} -> {:.6} at epoch {}", self.current, rate, epoch);
        }
        self.current = rate;
        rate
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cifar_schedule() -> LearningRateScheduler {
        LearningRateScheduler::new(0.1, vec![80, 150], 0.1).unwrap()
    }

    #[test]
    fn decays_exactly_at_schedule_epochs() {
        let mut s = cifar_schedule();
        for epoch in 0..200 {
            let lr = s.maybe_decay(epoch);
            let expected = match epoch {
                0..=79 => 0.1,
                80..=149 => 0.01,
                _ => 0.001,
            };
            assert_relative_eq!(lr, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn repeated_calls_do_not_double_decay() {
        let mut s = cifar_schedule();
        s.maybe_decay(80);
        let lr = s.maybe_decay(80);
        assert_relative_eq!(lr, 0.01, max_relative = 1e-12);
    }

    #[test]
    fn resume_past_a_schedule_point_recovers_rate() {
        // fresh scheduler jumping straight to epoch 101
        let mut s = cifar_schedule();
        assert_relative_eq!(s.maybe_decay(101), 0.01, max_relative = 1e-12);
        assert_relative_eq!(s.current(), 0.01, max_relative = 1e-12);
    }

    #[test]
    fn empty_schedule_is_constant() {
        let s = LearningRateScheduler::new(0.05, vec![], 0.1).unwrap();
        assert_eq!(s.rate_at(0), 0.05);
        assert_eq!(s.rate_at(1000), 0.05);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(LearningRateScheduler::new(0.1, vec![150, 80], 0.1).is_err());
        assert!(LearningRateScheduler::new(0.1, vec![80, 80], 0.1).is_err());
        assert!(LearningRateScheduler::new(0.1, vec![80], 0.0).is_err());
        assert!(LearningRateScheduler::new(0.1, vec![80], 1.5).is_err());
        assert!(LearningRateScheduler::new(-0.1, vec![80], 0.1).is_err());
    }
}
