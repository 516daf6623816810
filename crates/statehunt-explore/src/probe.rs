//! Targeted probes: pin the outcome of one specific step.
//!
//! A probe restores a fixed history, steps one symbol and compares the
//! outcome, and optionally some fingerprint components, against expected
//! values. Mismatches come back as [`ProbeError`] so a probe can be used
//! directly as a test assertion.

use crate::history::History;
use crate::replay::{ReplayEngine, ReplayError};
use statehunt_target::{Outcome, StateKey, Target, TargetError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Probe '{probe}' could not restore its history: {source}")]
    Replay {
        probe: String,
        #[source]
        source: ReplayError,
    },

    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    #[error("Probe '{probe}': expected {expected}, got {actual}")]
    OutcomeMismatch {
        probe: String,
        expected: Outcome,
        actual: Outcome,
    },

    #[error("Probe '{probe}': expected component {index} = {expected}, key is {actual}")]
    FingerprintMismatch {
        probe: String,
        index: usize,
        expected: i64,
        actual: StateKey,
    },
}

/// What a probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub outcome: Outcome,
    pub key: StateKey,
}

/// A fixed history, one symbol, and what must happen.
#[derive(Debug, Clone)]
pub struct TargetedProbe<S> {
    pub name: String,
    pub history: History<S>,
    pub symbol: S,
    pub expected_outcome: Option<Outcome>,
    /// `(component index, value)` pairs the post-step key must match.
    pub expected_components: Vec<(usize, i64)>,
}

impl<S> TargetedProbe<S> {
    /// A probe with no expectations; add them with the `expect_*` methods.
    pub fn new(name: impl Into<String>, history: History<S>, symbol: S) -> Self {
        Self {
            name: name.into(),
            history,
            symbol,
            expected_outcome: None,
            expected_components: Vec::new(),
        }
    }

    pub fn expect_outcome(mut self, outcome: Outcome) -> Self {
        self.expected_outcome = Some(outcome);
        self
    }

    pub fn expect_component(mut self, index: usize, value: i64) -> Self {
        self.expected_components.push((index, value));
        self
    }

    /// Run the probe and check every expectation.
    pub fn run<T>(&self, replay: &mut ReplayEngine<T>) -> Result<ProbeResult, ProbeError>
    where
        T: Target<Symbol = S>,
    {
        replay
            .restore_to(&self.history)
            .map_err(|source| ProbeError::Replay {
                probe: self.name.clone(),
                source,
            })?;
        let outcome = replay.step(&self.symbol)?;
        let key = replay.fingerprint();

        if let Some(expected) = &self.expected_outcome {
            if *expected != outcome {
                return Err(ProbeError::OutcomeMismatch {
                    probe: self.name.clone(),
                    expected: expected.clone(),
                    actual: outcome,
                });
            }
        }
        for &(index, expected) in &self.expected_components {
            if key.component(index) != Some(expected) {
                return Err(ProbeError::FingerprintMismatch {
                    probe: self.name.clone(),
                    index,
                    expected,
                    actual: key,
                });
            }
        }

        Ok(ProbeResult { outcome, key })
    }
}

/// Step `symbol` once from the initial state and report what happened.
pub fn smoke_check<T: Target>(
    replay: &mut ReplayEngine<T>,
    symbol: &T::Symbol,
) -> Result<Outcome, TargetError> {
    replay.reset()?;
    replay.step(symbol)
}
