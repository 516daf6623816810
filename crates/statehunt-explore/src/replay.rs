//! Replay engine: restores a target to the state reached by a history.
//!
//! There is no snapshot/restore primitive on a [`Target`]. Every restore is
//! a `reset()` followed by stepping each symbol of the history in order.
//! Because targets are deterministic this lands in the same state every
//! time; if a step that succeeded when the history was built now fails,
//! the restore reports [`ReplayError::Divergence`] and the caller abandons
//! that branch.

use crate::catalog::BugRecord;
use crate::history::History;
use log::trace;
use statehunt_target::{Outcome, StateKey, Target, TargetError};
use thiserror::Error;

/// Errors that can occur during replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A step that succeeded when the history was recorded failed on replay.
    #[error("Replay diverged at step {index} of {history}: {message}")]
    Divergence {
        history: String,
        index: usize,
        message: String,
    },

    #[error("Target error: {0}")]
    Target(#[from] TargetError),
}

/// Every outcome observed while replaying a history, plus where it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayTrace {
    /// One outcome per executed step. Stops at the first failure.
    pub outcomes: Vec<Outcome>,
    /// Fingerprint of the state after the last executed step.
    pub final_key: StateKey,
}

impl ReplayTrace {
    /// The failure that ended the trace, if any.
    pub fn failure(&self) -> Option<&str> {
        self.outcomes.last().and_then(Outcome::failure_message)
    }
}

/// Owns a target and rebuilds its states from histories.
pub struct ReplayEngine<T: Target> {
    target: T,
    /// Number of resets performed.
    restores: u64,
    /// Number of `step` calls issued, replay and probe steps alike.
    steps: u64,
}

impl<T: Target> ReplayEngine<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            restores: 0,
            steps: 0,
        }
    }

    /// Reset the target and replay `history`.
    ///
    /// On success the target is in the state reached by the history. Any
    /// [`Outcome::Failure`] along the way is a divergence.
    pub fn restore_to(&mut self, history: &History<T::Symbol>) -> Result<(), ReplayError> {
        self.reset()?;
        for (index, symbol) in history.iter().enumerate() {
            if let Outcome::Failure(message) = self.step(symbol)? {
                return Err(ReplayError::Divergence {
                    history: history.to_string(),
                    index,
                    message,
                });
            }
        }
        trace!("Restored {} ({})", history, self.target.fingerprint());
        Ok(())
    }

    /// Reset the target and replay `history`, recording every outcome.
    ///
    /// Unlike [`restore_to`](Self::restore_to) a failure is not an error:
    /// it is recorded as the last outcome and the trace stops there.
    pub fn trace(&mut self, history: &History<T::Symbol>) -> Result<ReplayTrace, ReplayError> {
        self.reset()?;
        let mut outcomes = Vec::with_capacity(history.len());
        for symbol in history {
            let outcome = self.step(symbol)?;
            let failed = outcome.is_failure();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        Ok(ReplayTrace {
            outcomes,
            final_key: self.target.fingerprint(),
        })
    }

    /// Replay a catalogued crash path and check it still ends in the same
    /// failure, after exactly the recorded number of steps.
    pub fn reproduce(&mut self, bug: &BugRecord<T::Symbol>) -> Result<bool, ReplayError> {
        let trace = self.trace(&bug.crash_path)?;
        Ok(trace.outcomes.len() == bug.crash_path.len()
            && trace.failure() == Some(bug.message.as_str()))
    }

    /// Reset the target to its initial state.
    pub fn reset(&mut self) -> Result<(), TargetError> {
        self.restores += 1;
        self.target.reset()
    }

    /// Step the target once from wherever it currently is.
    pub fn step(&mut self, symbol: &T::Symbol) -> Result<Outcome, TargetError> {
        self.steps += 1;
        self.target.step(symbol)
    }

    pub fn fingerprint(&self) -> StateKey {
        self.target.fingerprint()
    }

    pub fn describe(&self) -> String {
        self.target.describe()
    }

    pub fn restores(&self) -> u64 {
        self.restores
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statehunt_target::{Granularity, RersMachine};

    /// Succeeds on even symbols, fails on odd ones. The failure on `7`
    /// only happens on every second call, which makes it diverge.
    struct Flaky {
        total: i64,
        sevens: u32,
    }

    impl Target for Flaky {
        type Symbol = i64;

        fn reset(&mut self) -> Result<(), TargetError> {
            self.total = 0;
            Ok(())
        }

        fn step(&mut self, symbol: &i64) -> Result<Outcome, TargetError> {
            if *symbol == 7 {
                self.sevens += 1;
                if self.sevens % 2 == 0 {
                    return Ok(Outcome::failure("second seven"));
                }
            } else if symbol % 2 != 0 {
                return Ok(Outcome::failure("odd"));
            }
            self.total += symbol;
            Ok(Outcome::Value(self.total))
        }

        fn fingerprint(&self) -> StateKey {
            StateKey::new(vec![self.total])
        }
    }

    #[test]
    fn test_restore_reaches_history_state() {
        let mut engine = ReplayEngine::new(RersMachine::new(Granularity::Full));
        engine
            .restore_to(&History::from_symbols(vec![6, 5]))
            .unwrap();
        assert_eq!(engine.fingerprint(), StateKey::new(vec![1, 10, 20]));
        assert_eq!(engine.restores(), 1);
        assert_eq!(engine.steps(), 2);
    }

    #[test]
    fn test_restore_empty_history_is_initial_state() {
        let mut engine = ReplayEngine::new(RersMachine::new(Granularity::Full));
        engine.restore_to(&History::from_symbols(vec![6])).unwrap();
        engine.restore_to(&History::empty()).unwrap();
        assert_eq!(engine.fingerprint(), StateKey::new(vec![0, 9, 23]));
    }

    #[test]
    fn test_restore_reports_divergence() {
        let mut engine = ReplayEngine::new(Flaky {
            total: 0,
            sevens: 0,
        });
        let history = History::from_symbols(vec![2, 7]);

        engine.restore_to(&history).unwrap();
        match engine.restore_to(&history) {
            Err(ReplayError::Divergence { index, message, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(message, "second seven");
            }
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_stops_at_first_failure() {
        let mut engine = ReplayEngine::new(Flaky {
            total: 0,
            sevens: 0,
        });
        let trace = engine
            .trace(&History::from_symbols(vec![2, 3, 4]))
            .unwrap();
        assert_eq!(
            trace.outcomes,
            vec![Outcome::Value(2), Outcome::failure("odd")]
        );
        assert_eq!(trace.failure(), Some("odd"));
        assert_eq!(trace.final_key, StateKey::new(vec![2]));
    }

    #[test]
    fn test_trace_is_repeatable() {
        let mut engine = ReplayEngine::new(RersMachine::new(Granularity::Full));
        let history = History::from_symbols(vec![4, 6, 2, 6, 5]);
        let first = engine.trace(&history).unwrap();
        let second = engine.trace(&history).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.outcomes.len(), 5);
        assert_eq!(first.failure(), None);
    }

    #[test]
    fn test_reproduce_checks_message_and_length() {
        let mut engine = ReplayEngine::new(RersMachine::new(Granularity::Full));
        let bug = BugRecord {
            bug_id: 0,
            message: "error_0".to_string(),
            crash_path: History::from_symbols(vec![6, 3]),
            terminal_state: String::new(),
            depth: 2,
        };
        assert!(engine.reproduce(&bug).unwrap());

        let wrong_message = BugRecord {
            message: "error_1".to_string(),
            ..bug.clone()
        };
        assert!(!engine.reproduce(&wrong_message).unwrap());

        // Fails one step early, before the recorded end of the path.
        let too_long = BugRecord {
            crash_path: History::from_symbols(vec![6, 3, 6]),
            ..bug
        };
        assert!(!engine.reproduce(&too_long).unwrap());
    }
}
