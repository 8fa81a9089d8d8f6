//! # Parking Console Testing
//!
//! Testing utilities and helpers for the parking console.
//!
//! This crate provides:
//! - Deterministic implementations of the Environment traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use parking_console_testing::{SequentialIdGenerator, test_clock};
//!
//! #[test]
//! fn test_ticket_flow() {
//!     let env = ConsoleEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()));
//!     let mut store = Store::new(ConsoleState::default(), ConsoleReducer::new(), env);
//!     store.send(ConsoleAction::Session(SessionAction::Login)).unwrap();
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use parking_console_core::environment::{Clock, IdGenerator, TOKEN_LEN};

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, IdGenerator, TOKEN_LEN, Utc};
    use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

    /// Controllable clock for deterministic tests
    ///
    /// Returns the same instant until it is explicitly moved with
    /// [`FixedClock::set`] or [`FixedClock::advance`].
    ///
    /// # Example
    ///
    /// ```
    /// use parking_console_testing::mocks::FixedClock;
    /// use parking_console_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::days(1));
    /// assert_eq!(clock.now() - time1, Duration::days(1));
    /// ```
    #[derive(Debug)]
    pub struct FixedClock {
        millis: AtomicI64,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                millis: AtomicI64::new(time.timestamp_millis()),
            }
        }

        /// Move the clock to `time`
        pub fn set(&self, time: DateTime<Utc>) {
            self.millis.store(time.timestamp_millis(), Ordering::SeqCst);
        }

        /// Move the clock forward by `by`
        pub fn advance(&self, by: Duration) {
            self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::<Utc>::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable token generator: `000000001`, `000000002`, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Creates a generator whose first token is `000000001`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(1),
            }
        }

        /// Creates a generator whose first token encodes `start`
        #[must_use]
        pub const fn starting_at(start: u64) -> Self {
            Self {
                next: AtomicU64::new(start),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_token(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{n:0width$}", width = TOKEN_LEN)
        }
    }

    /// Token generator that always returns the same token
    ///
    /// Useful for exercising collision handling in callers.
    #[derive(Debug, Clone)]
    pub struct RepeatingIdGenerator {
        token: String,
    }

    impl RepeatingIdGenerator {
        /// Creates a generator that always yields `token`
        #[must_use]
        pub fn new(token: impl Into<String>) -> Self {
            Self {
                token: token.into(),
            }
        }
    }

    impl IdGenerator for RepeatingIdGenerator {
        fn next_token(&self) -> String {
            self.token.clone()
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a test-friendly tracing subscriber.
    ///
    /// Output goes through the test harness capture. Honors `RUST_LOG`.
    /// Calling it more than once is harmless.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, RepeatingIdGenerator, SequentialIdGenerator, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use parking_console_core::environment::is_token;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_fixed_clock_moves_only_when_told() {
        let clock = test_clock();
        let start = clock.now();
        clock.advance(Duration::hours(3));
        assert_eq!(clock.now() - start, Duration::hours(3));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_sequential_ids_are_tokens() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_token(), "000000001");
        assert_eq!(ids.next_token(), "000000002");
        assert!(is_token(&ids.next_token()));

        let ids = SequentialIdGenerator::starting_at(42);
        assert_eq!(ids.next_token(), "000000042");
    }

    #[test]
    fn test_repeating_ids() {
        let ids = RepeatingIdGenerator::new("AAAAAAAAA");
        assert_eq!(ids.next_token(), ids.next_token());
    }
}
