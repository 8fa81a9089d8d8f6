//! # Parking Console Runtime
//!
//! Runtime implementation for the parking console.
//!
//! This crate provides the [`Store`]: the single owner of application state.
//! It coordinates reducer execution and drains the follow-up actions that a
//! reducer dispatches through [`Effect::Send`](parking_console_core::effect::Effect).
//!
//! ## Execution model
//!
//! The console is single-threaded and event-driven. One user action is handled
//! to completion before the next is dispatched, so [`Store::send`] takes
//! `&mut self` and never blocks.
//!
//! A send is transactional: the action and every follow-up it triggers run
//! against a working copy of the state. The copy replaces the committed state
//! only when the whole cascade succeeds. A rejection anywhere in the cascade
//! leaves the committed state exactly as it was.
//!
//! ## Example
//!
//! ```ignore
//! use parking_console_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use parking_console_core::reducer::Reducer;
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

/// Metric names and registration for the store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors returned by [`Store::send`](crate::Store::send)
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError<E> {
        /// The reducer rejected an action; nothing was committed
        #[error("{0}")]
        Rejected(E),

        /// A send produced more follow-up actions than the configured limit
        ///
        /// This guards against reducers that feed actions back into
        /// themselves forever. Nothing was committed.
        #[error("dispatch limit of {limit} follow-up actions exceeded")]
        DispatchLimitExceeded {
            /// Configured limit
            limit: usize,
        },
    }

    impl<E> StoreError<E> {
        /// Returns the reducer error, if this is a rejection
        #[must_use]
        pub fn into_rejection(self) -> Option<E> {
            match self {
                Self::Rejected(error) => Some(error),
                Self::DispatchLimitExceeded { .. } => None,
            }
        }
    }
}

pub use error::StoreError;

/// Configuration for Store instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of follow-up actions a single send may dispatch
    pub max_dispatch_depth: usize,
}

impl StoreConfig {
    /// Creates a config with the given dispatch limit
    #[must_use]
    pub const fn new(max_dispatch_depth: usize) -> Self {
        Self { max_dispatch_depth }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(16)
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The Store owns:
/// 1. State (committed after every successful send)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer type
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    config: StoreConfig,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: Clone,
    A: fmt::Debug,
    R::Error: fmt::Display,
{
    /// Create a new store with the default configuration
    #[must_use]
    pub fn new(state: S, reducer: R, environment: E) -> Self {
        Self::with_config(state, reducer, environment, StoreConfig::default())
    }

    /// Create a new store with an explicit configuration
    #[must_use]
    pub fn with_config(state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        metrics::register_metrics();
        Self {
            state,
            reducer,
            environment,
            config,
        }
    }

    /// Send an action through the reducer and drain its follow-ups.
    ///
    /// Follow-up actions are processed first-in first-out after the action
    /// that dispatched them.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Rejected`] if the reducer rejects any action of the
    ///   cascade
    /// - [`StoreError::DispatchLimitExceeded`] if the cascade dispatches more
    ///   follow-ups than [`StoreConfig::max_dispatch_depth`]
    ///
    /// In both cases the committed state is unchanged.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub fn send(&mut self, action: A) -> Result<(), StoreError<R::Error>> {
        let mut working = self.state.clone();
        let mut queue = VecDeque::from([action]);
        let mut applied: usize = 0;

        while let Some(action) = queue.pop_front() {
            if applied > self.config.max_dispatch_depth {
                tracing::warn!(
                    limit = self.config.max_dispatch_depth,
                    "Rejected send: dispatch limit exceeded"
                );
                metrics::counter!(metrics::ACTIONS_REJECTED).increment(1);
                return Err(StoreError::DispatchLimitExceeded {
                    limit: self.config.max_dispatch_depth,
                });
            }

            tracing::debug!(action = ?action, "Processing action");
            let started = Instant::now();
            let result = {
                let _span = tracing::debug_span!("reducer_execution").entered();
                self.reducer.reduce(&mut working, action, &self.environment)
            };
            metrics::histogram!(metrics::REDUCER_DURATION)
                .record(started.elapsed().as_secs_f64());

            match result {
                Ok(effects) => {
                    tracing::trace!("Reducer completed, returned {} effects", effects.len());
                    for effect in effects {
                        queue.extend(effect.into_actions());
                    }
                },
                Err(error) => {
                    tracing::warn!(error = %error, "Action rejected, rolling back send");
                    metrics::counter!(metrics::ACTIONS_REJECTED).increment(1);
                    return Err(StoreError::Rejected(error));
                },
            }
            applied += 1;
        }

        self.state = working;
        metrics::counter!(metrics::ACTIONS_APPLIED).increment(applied as u64);
        tracing::debug!(applied, "Send committed");
        Ok(())
    }

    /// Read state through a projection function
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state)
    }

    /// Borrow the committed state
    #[must_use]
    pub const fn snapshot(&self) -> &S {
        &self.state
    }

    /// Borrow the environment
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// The store configuration
    #[must_use]
    pub const fn config(&self) -> StoreConfig {
        self.config
    }
}

impl<S, A, E, R> fmt::Debug for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
