//! # Parking Console Core
//!
//! Core traits and types for the parking console.
//!
//! The console is built with the Reducer pattern: every user action is a value
//! fed into a reducer together with the current state and an environment of
//! injected dependencies. The reducer validates the action, mutates state in
//! place, and returns descriptions of follow-up work ([`effect::Effect`]) that
//! the runtime executes.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by the store
//! - **Action**: All possible inputs to a reducer (user commands and follow-ups)
//! - **Reducer**: `(State, Action, Environment) → Result<Effects, Error>`
//! - **Effect**: Follow-up descriptions (not execution)
//! - **Environment**: Injected dependencies (`Clock`, `IdGenerator`)
//!
//! Everything here is synchronous. A reducer runs to completion and never
//! blocks; there is no I/O anywhere in the core.
//!
//! ## Example
//!
//! ```
//! use parking_console_core::reducer::{Effects, Reducer};
//! use parking_console_core::SmallVec;
//!
//! struct Counter;
//!
//! impl Reducer for Counter {
//!     type State = u32;
//!     type Action = u32;
//!     type Environment = ();
//!     type Error = std::convert::Infallible;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut u32,
//!         action: u32,
//!         _env: &(),
//!     ) -> Result<Effects<u32>, Self::Error> {
//!         *state += action;
//!         Ok(SmallVec::new())
//!     }
//! }
//!
//! let mut state = 0;
//! let effects = Counter.reduce(&mut state, 2, &()).unwrap_or_default();
//! assert_eq!(state, 2);
//! assert!(effects.is_empty());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for business logic
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Effects returned by a single reducer invocation.
    ///
    /// Most actions produce zero or one follow-up, so four inline slots avoid
    /// heap allocation in practice.
    pub type Effects<A> = SmallVec<[Effect<A>; 4]>;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Error`: Why an action was rejected
    ///
    /// # Contract
    ///
    /// A reducer that returns `Err` must leave `state` untouched. Validation
    /// therefore happens before the first write.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// The rejection type
        type Error;

        /// Reduce an action into state changes and effects
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is rejected. State is
        /// unchanged in that case.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<Effects<Self::Action>, Self::Error>;
    }
}

/// Effect module - Follow-up descriptions
///
/// Effects are values, not execution. The runtime store drains them after the
/// reducer returns, inside the same user action.
pub mod effect {
    /// Effect type - describes follow-up work to be executed by the store
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// Feed an action back into the reducer
        Send(Action),

        /// Run effects in order
        Sequential(Vec<Effect<Action>>),
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Returns true when this effect schedules nothing (an empty chain)
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::Send(_) => false,
                Effect::Sequential(effects) => effects.iter().all(Effect::is_none),
            }
        }

        /// Flattens the effect tree into the actions it dispatches, in order
        #[must_use]
        pub fn into_actions(self) -> Vec<Action> {
            let mut actions = Vec::new();
            self.collect_into(&mut actions);
            actions
        }

        fn collect_into(self, out: &mut Vec<Action>) {
            match self {
                Effect::Send(action) => out.push(action),
                Effect::Sequential(effects) => {
                    for effect in effects {
                        effect.collect_into(out);
                    }
                },
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All non-deterministic inputs (time, randomness) are abstracted behind
/// traits and injected via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, NaiveDate, Utc};
    use rand::Rng;

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Get the current calendar date (UTC)
        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Length of the tokens produced by an [`IdGenerator`]
    pub const TOKEN_LEN: usize = 9;

    const TOKEN_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Produces short tokens used as entity identifiers.
    ///
    /// Implementations return [`TOKEN_LEN`] uppercase alphanumeric characters.
    /// Uniqueness is not the generator's job; callers that need it check the
    /// token against their own collection.
    pub trait IdGenerator: Send + Sync {
        /// Returns the next token
        fn next_token(&self) -> String;
    }

    /// Random token generator using the thread-local RNG
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIdGenerator;

    impl IdGenerator for RandomIdGenerator {
        fn next_token(&self) -> String {
            let mut rng = rand::thread_rng();
            (0..TOKEN_LEN)
                .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
                .collect()
        }
    }

    /// Returns true if `s` has the shape of a generated token
    #[must_use]
    pub fn is_token(s: &str) -> bool {
        s.len() == TOKEN_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock, is_token};

    #[test]
    fn random_tokens_have_expected_shape() {
        let ids = RandomIdGenerator;
        for _ in 0..100 {
            let token = ids.next_token();
            assert!(is_token(&token), "unexpected token {token}");
        }
    }

    #[test]
    fn is_token_rejects_lowercase_and_wrong_length() {
        assert!(is_token("ABC123XYZ"));
        assert!(!is_token("abc123xyz"));
        assert!(!is_token("ABC123"));
        assert!(!is_token("ABC-23XYZ"));
    }

    #[test]
    fn system_clock_today_matches_now() {
        let clock = SystemClock;
        let today = clock.today();
        assert!(today <= clock.now().date_naive());
    }

    #[test]
    fn effects_flatten_in_order() {
        let effect = Effect::chain(vec![
            Effect::Send(1),
            Effect::chain(vec![]),
            Effect::chain(vec![Effect::Send(2), Effect::Send(3)]),
        ]);
        assert!(!effect.is_none());
        assert_eq!(effect.into_actions(), vec![1, 2, 3]);
    }

    #[test]
    fn nested_empty_chains_are_none() {
        let effect: Effect<u8> = Effect::chain(vec![Effect::chain(vec![]), Effect::chain(vec![])]);
        assert!(effect.is_none());
        assert!(effect.into_actions().is_empty());
    }
}
