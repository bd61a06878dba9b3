use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Times(u32),
    Forever,
}

/// Linear interpolation of one scalar between `from` and `to`.
///
/// The tween owns its clock: callers feed frame deltas through `advance`
/// and read the value back. Each repeat restarts at `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    repeat: Repeat,
    elapsed: Duration,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, repeat: Repeat) -> Self {
        Self {
            from,
            to,
            duration,
            repeat,
            elapsed: Duration::ZERO,
        }
    }

    /// One full turn per `period`, looping forever.
    pub fn spin(period: Duration) -> Self {
        Self::new(0.0, std::f32::consts::TAU, period, Repeat::Forever)
    }

    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.value()
    }

    pub fn is_finished(&self) -> bool {
        match self.repeat {
            Repeat::Forever => false,
            Repeat::Once => self.elapsed >= self.duration,
            // A total run too long to represent never ends.
            Repeat::Times(n) => n
                .checked_add(1)
                .and_then(|runs| self.duration.checked_mul(runs))
                .is_some_and(|total| self.elapsed >= total),
        }
    }

    pub fn value(&self) -> f32 {
        if self.duration.is_zero() || self.is_finished() {
            return self.to;
        }
        let total = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let progress = total.fract() as f32;
        self.from + (self.to - self.from) * progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_spin_is_constant_speed() {
        let mut spin = Tween::spin(Duration::from_secs(20));
        assert_eq!(spin.value(), 0.0);
        assert!((spin.advance(Duration::from_secs(5)) - PI / 2.0).abs() < 1e-5);
        assert!((spin.advance(Duration::from_secs(5)) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_spin_loops_forever() {
        let mut spin = Tween::spin(Duration::from_secs(20));
        let angle = spin.advance(Duration::from_secs(20 * 1000 + 10));
        assert!((angle - PI).abs() < 1e-4);
        assert!(!spin.is_finished());
        assert!(angle < TAU);
    }

    #[test]
    fn test_finite_repeat_settles_on_target() {
        let mut tween = Tween::new(1.0, 3.0, Duration::from_secs(2), Repeat::Times(1));
        assert!((tween.advance(Duration::from_secs(1)) - 2.0).abs() < 1e-6);
        assert!((tween.advance(Duration::from_secs(2)) - 2.0).abs() < 1e-6);
        assert_eq!(tween.advance(Duration::from_secs(1)), 3.0);
        assert!(tween.is_finished());

        let once = Tween::new(0.0, 1.0, Duration::from_secs(1), Repeat::Once);
        assert!(!once.is_finished());
    }

    #[test]
    fn test_huge_repeat_count_never_finishes() {
        let mut tween = Tween::new(0.0, 1.0, Duration::from_secs(1), Repeat::Times(u32::MAX));
        assert!((tween.advance(Duration::from_millis(500)) - 0.5).abs() < 1e-6);
        assert!(!tween.is_finished());

        let mut long = Tween::new(0.0, 1.0, Duration::MAX / 2, Repeat::Times(4));
        long.advance(Duration::MAX);
        assert!(!long.is_finished());
    }
}
