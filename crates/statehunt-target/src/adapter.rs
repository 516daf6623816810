//! Target adapter contract: the only surface the explorer sees of a system
//! under test.
//!
//! A target is a single mutable state machine. The explorer drives it
//! through three operations:
//!
//! - [`Target::reset`] puts the state back to its fixed initial value.
//! - [`Target::step`] feeds one input symbol and reports an [`Outcome`].
//! - [`Target::fingerprint`] summarises the current state as a [`StateKey`].
//!
//! `step` must be deterministic: the same sequence of symbols applied after
//! a `reset` always produces the same outcomes and the same final state.
//! Replay-based state restoration depends on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Adapter plumbing failures.
///
/// These are not the failures the explorer is hunting for (those come back
/// as [`Outcome::Failure`]); they mean the adapter itself could not honour
/// its contract and the run cannot continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("Reset failed: {0}")]
    Reset(String),

    #[error("Step failed: {0}")]
    Step(String),
}

/// Result of feeding one input symbol to the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The step completed and produced an output value.
    Value(i64),
    /// The target signalled a failure. The message identifies the violated
    /// condition and doubles as the bug signature.
    Failure(String),
}

impl Outcome {
    /// Shorthand for building a failure outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(message.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The output value, if the step succeeded.
    pub fn value(&self) -> Option<i64> {
        match self {
            Outcome::Value(v) => Some(*v),
            Outcome::Failure(_) => None,
        }
    }

    /// The failure message, if the step failed.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Failure(msg) => Some(msg),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "value {v}"),
            Outcome::Failure(msg) => write!(f, "failure \"{msg}\""),
        }
    }
}

/// Deduplication key summarising a target state.
///
/// An ordered list of integer components. Two states with the same key are
/// treated as the same state by the explorer, so a target may leave
/// components out on purpose to keep the visited set small.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey(Vec<i64>);

impl StateKey {
    pub fn new(components: Vec<i64>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[i64] {
        &self.0
    }

    /// Component at `index`, or `None` past the end.
    pub fn component(&self, index: usize) -> Option<i64> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i64>> for StateKey {
    fn from(components: Vec<i64>) -> Self {
        Self(components)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// A stateful computation the explorer can reset, step and fingerprint.
pub trait Target {
    /// One input symbol from the target's finite alphabet.
    type Symbol: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Restore the fixed initial state.
    fn reset(&mut self) -> Result<(), TargetError>;

    /// Consume one input symbol, mutating the state.
    fn step(&mut self, symbol: &Self::Symbol) -> Result<Outcome, TargetError>;

    /// Summarise the current state. Must not mutate anything.
    fn fingerprint(&self) -> StateKey;

    /// Human-readable description of the current state, used in bug
    /// records. Defaults to the fingerprint.
    fn describe(&self) -> String {
        self.fingerprint().to_string()
    }
}

/// Lets callers hand the explorer a borrowed target and keep using it
/// afterwards.
impl<T: Target + ?Sized> Target for &mut T {
    type Symbol = T::Symbol;

    fn reset(&mut self) -> Result<(), TargetError> {
        (**self).reset()
    }

    fn step(&mut self, symbol: &Self::Symbol) -> Result<Outcome, TargetError> {
        (**self).step(symbol)
    }

    fn fingerprint(&self) -> StateKey {
        (**self).fingerprint()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
