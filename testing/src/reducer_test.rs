//! Given-When-Then harness for synchronous reducers.
//!
//! A [`ReducerTest`] runs one action against one state and checks the outcome:
//! the mutated state, and either the returned effects or the rejection.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use parking_console_core::{effect::Effect, reducer::Reducer};

/// Check run against the state after the reducer returns
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Check run against the effects of an accepted action
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Check run against the error of a rejected action
type ErrorAssertion<Err> = Box<dyn FnOnce(&Err)>;

/// Single-action reducer test built as Given-When-Then
///
/// A test either expects the action to be accepted (`then_effects`) or
/// rejected (`then_error`). State assertions run in both cases, which is how
/// tests check that a rejected action left state untouched.
///
/// # Example
///
/// ```ignore
/// use parking_console_testing::ReducerTest;
///
/// ReducerTest::new(ConsoleReducer::new())
///     .with_env(test_environment())
///     .given_state(signed_in_state())
///     .when_action(ConsoleAction::Ticket(TicketAction::Delete { id }))
///     .then_state(|state| {
///         assert!(state.tickets.is_empty());
///     })
///     .then_effects(|effects| {
///         assert_eq!(effects.len(), 1);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
    error_assertions: Vec<ErrorAssertion<R::Error>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    R::Error: std::fmt::Debug,
    A: std::fmt::Debug,
{
    /// Starts a test around `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
            error_assertions: Vec::new(),
        }
    }

    /// Environment handed to the reducer
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Given: the state before the action
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// When: the action under test
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Then: check the state after the action
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Then: check the returned effects
    ///
    /// Implies the action is expected to be accepted.
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Then: check the rejection
    ///
    /// Implies the action is expected to be rejected.
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::Error) + 'static,
    {
        self.error_assertions.push(Box::new(assertion));
        self
    }

    /// Runs the reducer once, then every registered assertion
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set, if the
    /// outcome (accepted or rejected) does not match the assertions that were
    /// registered, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("given_state() was not called");

        let action = self.action.expect("when_action() was not called");

        let env = self
            .environment
            .expect("with_env() was not called");

        let outcome = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }

        match outcome {
            Ok(effects) => {
                assert!(
                    self.error_assertions.is_empty(),
                    "Expected the action to be rejected, but it was accepted with effects {effects:?}"
                );
                for assertion in self.effect_assertions {
                    assertion(&effects);
                }
            },
            Err(error) => {
                assert!(
                    self.effect_assertions.is_empty(),
                    "Expected the action to be accepted, but it was rejected: {error:?}"
                );
                for assertion in self.error_assertions {
                    assertion(&error);
                }
            },
        }
    }
}

/// Effect checks for use inside `then_effects`
pub mod assertions {
    use parking_console_core::effect::Effect;

    /// Assert that no effect dispatches anything
    ///
    /// # Panics
    ///
    /// Panics if any effect schedules work.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no follow-up actions, got {effects:?}"
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Effect count mismatch: {effects_len} returned, {expected} expected",
            effects_len = effects.len()
        );
    }

    /// Collect every action dispatched by `effects`, in order
    #[must_use]
    pub fn dispatched<A: Clone>(effects: &[Effect<A>]) -> Vec<A> {
        effects
            .iter()
            .cloned()
            .flat_map(Effect::into_actions)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_console_core::effect::Effect;
    use parking_console_core::reducer::{Effects, Reducer};
    use parking_console_core::smallvec;

    /// Outstanding balance in cents
    #[derive(Clone, Debug)]
    struct Balance {
        cents: u64,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum LedgerAction {
        Fine(u64),
        Pay(u64),
        FineWithSurcharge(u64),
    }

    struct Ledger;

    /// Surcharge added by `FineWithSurcharge`
    struct Fees {
        surcharge: u64,
    }

    impl Reducer for Ledger {
        type State = Balance;
        type Action = LedgerAction;
        type Environment = Fees;
        type Error = String;

        fn reduce(
            &self,
            state: &mut Balance,
            action: LedgerAction,
            env: &Fees,
        ) -> Result<Effects<LedgerAction>, String> {
            match action {
                LedgerAction::Fine(cents) => {
                    state.cents += cents;
                    Ok(smallvec![])
                },
                LedgerAction::Pay(cents) if cents > state.cents => {
                    Err(format!("overpayment of {} cents", cents - state.cents))
                },
                LedgerAction::Pay(cents) => {
                    state.cents -= cents;
                    Ok(smallvec![])
                },
                LedgerAction::FineWithSurcharge(cents) => Ok(smallvec![Effect::chain(vec![
                    Effect::Send(LedgerAction::Fine(cents)),
                    Effect::Send(LedgerAction::Fine(env.surcharge)),
                ])]),
            }
        }
    }

    fn fees() -> Fees {
        Fees { surcharge: 500 }
    }

    #[test]
    fn accepted_action_updates_state() {
        ReducerTest::new(Ledger)
            .with_env(fees())
            .given_state(Balance { cents: 0 })
            .when_action(LedgerAction::Fine(7500))
            .then_state(|state| assert_eq!(state.cents, 7500))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn rejected_action_leaves_state_alone() {
        ReducerTest::new(Ledger)
            .with_env(fees())
            .given_state(Balance { cents: 100 })
            .when_action(LedgerAction::Pay(250))
            .then_state(|state| assert_eq!(state.cents, 100))
            .then_error(|error| assert_eq!(error, "overpayment of 150 cents"))
            .run();
    }

    #[test]
    fn follow_ups_are_listed_in_order() {
        ReducerTest::new(Ledger)
            .with_env(fees())
            .given_state(Balance { cents: 0 })
            .when_action(LedgerAction::FineWithSurcharge(4000))
            .then_state(|state| assert_eq!(state.cents, 0))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert_eq!(
                    assertions::dispatched(effects),
                    vec![LedgerAction::Fine(4000), LedgerAction::Fine(500)]
                );
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "Expected the action to be accepted")]
    fn unexpected_rejection_panics() {
        ReducerTest::new(Ledger)
            .with_env(fees())
            .given_state(Balance { cents: 0 })
            .when_action(LedgerAction::Pay(1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    #[should_panic(expected = "Expected the action to be rejected")]
    fn unexpected_acceptance_panics() {
        ReducerTest::new(Ledger)
            .with_env(fees())
            .given_state(Balance { cents: 0 })
            .when_action(LedgerAction::Fine(1))
            .then_error(|_| {})
            .run();
    }
}
