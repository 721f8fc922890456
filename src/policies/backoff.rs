//! # Back-off policy for crash restarts.
//!
//! [`BackoffPolicy`] controls how the minimum delay between consecutive
//! restart attempts of the same process grows with its crash count.
//!
//! The delay for crash `n` (0-indexed) is `first × factor^n`, clamped to
//! `max`, with jitter applied last. The base is derived purely from the
//! crash count, so jitter output never feeds back into later delays.

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart back-off policy.
///
/// - [`BackoffPolicy::first`] — delay after the first crash;
/// - [`BackoffPolicy::factor`] — multiplicative growth per further crash;
/// - [`BackoffPolicy::max`] — cap on the delay;
/// - [`BackoffPolicy::jitter`] — randomization applied to the clamped base.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay applied after the first crash.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with `first = 100ms`, `max = 30s`, `factor = 2.0`,
    /// no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the minimum restart delay for the given crash count
    /// (0-indexed: the first crash uses `first`).
    ///
    /// The base is `first × factor^crashes`, clamped to [`BackoffPolicy::max`];
    /// non-finite or negative intermediates clamp to `max` as well.
    pub fn next(&self, crashes: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = crashes.min(i32::MAX as u32) as i32;
        let raw_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !raw_secs.is_finite() || raw_secs < 0.0 || raw_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(raw_secs)
        };

        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_crash_uses_first_delay() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(0), Duration::from_millis(100));
    }

    #[test]
    fn grows_exponentially_without_jitter() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(2), Duration::from_millis(400));
        assert_eq!(policy.next(3), Duration::from_millis(800));
    }

    #[test]
    fn constant_factor_stays_flat() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        for crashes in 0..10 {
            assert_eq!(policy.next(crashes), Duration::from_millis(500));
        }
    }

    #[test]
    fn clamps_to_max() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(20), Duration::from_secs(1));
    }

    #[test]
    fn first_exceeding_max_is_clamped() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn full_jitter_never_exceeds_base() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::Full,
        };
        for crashes in 0..12 {
            let base = policy.first.as_secs_f64() * policy.factor.powi(crashes as i32);
            let base = Duration::from_secs_f64(base.min(policy.max.as_secs_f64()));
            assert!(policy.next(crashes) <= base, "crash {crashes}");
        }
    }
}
