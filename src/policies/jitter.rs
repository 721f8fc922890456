//! # Jitter for restart delays.
//!
//! [`JitterPolicy`] randomizes back-off delays so that several processes
//! crashing together do not hammer the system with synchronized restarts.
//!
//! - [`JitterPolicy::None`] — exact delay, predictable (default)
//! - [`JitterPolicy::Full`] — random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] — `delay/2 + random[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of restart delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact back-off delay.
    None,
    /// Random delay in `[0, delay]`; most aggressive spreading.
    Full,
    /// `delay/2 + random[0, delay/2]`; preserves most of the delay while
    /// still de-synchronizing restarts.
    Equal,
}

impl Default for JitterPolicy {
    fn default() -> Self {
        JitterPolicy::None
    }
}

impl JitterPolicy {
    /// Applies this jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => {
                let mut rng = rand::rng();
                Duration::from_millis(rng.random_range(0..=ms))
            }
            JitterPolicy::Equal => {
                let half = ms / 2;
                if half == 0 {
                    return delay;
                }
                let mut rng = rand::rng();
                Duration::from_millis(half + rng.random_range(0..=half))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(700);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn full_stays_within_bounds() {
        let d = Duration::from_millis(1000);
        for _ in 0..100 {
            let j = JitterPolicy::Full.apply(d);
            assert!(j <= d);
        }
    }

    #[test]
    fn equal_keeps_at_least_half() {
        let d = Duration::from_millis(1000);
        for _ in 0..100 {
            let j = JitterPolicy::Equal.apply(d);
            assert!(j >= d / 2 && j <= d);
        }
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
    }
}
