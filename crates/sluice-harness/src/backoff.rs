//! Interval-bounded exponential backoff for lease retries.
//!
//! A coordinator that is briefly unreachable, or that simply has no work
//! to hand out, is an expected condition. The policy therefore never says
//! "stop retrying": the retry count is unbounded and only the interval is
//! bounded. Jitter spreads out workers that fail in lockstep so they do
//! not retry in lockstep.

use std::time::Duration;

use rand::Rng;

/// Default initial backoff interval.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(5);

/// Default maximum backoff interval.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(300);

/// Default growth factor applied after each failed attempt.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Default symmetric randomization factor (±50%).
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;

/// Per-worker exponential backoff state.
///
/// Owned exclusively by one worker loop; never shared across slots, so one
/// slot's failure history cannot affect another's retry cadence.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    randomization_factor: f64,
    current_interval: Duration,
    attempts: u64,
}

impl ExponentialBackoff {
    /// Creates a backoff policy growing from `initial_interval` up to
    /// `max_interval` with the default multiplier and jitter.
    #[must_use]
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            max_interval,
            multiplier: DEFAULT_MULTIPLIER,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
            current_interval: initial_interval,
            attempts: 0,
        }
    }

    /// Overrides the growth factor.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Overrides the randomization factor (0.0 disables jitter).
    #[must_use]
    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor;
        self
    }

    /// Returns the number of failed attempts since the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Returns the next delay to wait before retrying.
    ///
    /// The undecorated interval grows by the multiplier on each call and is
    /// capped at the maximum; the returned value widens the capped interval
    /// by a uniformly random factor in `[1 - r, 1 + r]`. The result never
    /// exceeds `max_interval * (1 + r)`.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current_interval.min(self.max_interval);

        let next = base.mul_f64(self.multiplier);
        self.current_interval = next.min(self.max_interval);
        self.attempts = self.attempts.saturating_add(1);

        self.jittered(base)
    }

    /// Clears accumulated state back to the initial interval.
    ///
    /// Called after any successful attempt so that the next failure starts
    /// a fresh growth sequence.
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
        self.attempts = 0;
    }

    fn jittered(&self, base: Duration) -> Duration {
        if self.randomization_factor <= 0.0 {
            return base;
        }
        let r = self.randomization_factor;
        let factor = rand::thread_rng().gen_range(1.0 - r..=1.0 + r);
        base.mul_f64(factor)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> ExponentialBackoff {
        ExponentialBackoff::new(Duration::from_millis(100), Duration::from_millis(800))
            .with_randomization_factor(0.0)
    }

    #[test]
    fn grows_by_multiplier_until_capped() {
        let mut backoff = no_jitter().with_multiplier(2.0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
        // Capped: stays at the maximum from here on.
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
    }

    #[test]
    fn reset_restarts_from_initial_interval() {
        let mut backoff = no_jitter().with_multiplier(2.0);
        for _ in 0..10 {
            backoff.next_delay();
        }
        assert_eq!(backoff.attempts(), 10);

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn delay_never_exceeds_widened_maximum() {
        let max = Duration::from_millis(500);
        let mut backoff = ExponentialBackoff::new(Duration::from_millis(50), max);
        let bound = max.mul_f64(1.0 + DEFAULT_RANDOMIZATION_FACTOR);
        for _ in 0..2000 {
            assert!(backoff.next_delay() <= bound);
        }
    }

    #[test]
    fn jitter_stays_within_symmetric_bounds() {
        let initial = Duration::from_millis(1000);
        for _ in 0..1000 {
            let mut backoff = ExponentialBackoff::new(initial, Duration::from_secs(10));
            let delay = backoff.next_delay();
            assert!(delay >= initial.mul_f64(1.0 - DEFAULT_RANDOMIZATION_FACTOR));
            assert!(delay <= initial.mul_f64(1.0 + DEFAULT_RANDOMIZATION_FACTOR));
        }
    }

    #[test]
    fn retry_count_is_unbounded() {
        let mut backoff = no_jitter();
        for _ in 0..10_000 {
            let delay = backoff.next_delay();
            assert!(delay > Duration::ZERO);
            assert!(delay <= Duration::from_millis(800));
        }
        assert_eq!(backoff.attempts(), 10_000);
    }
}
