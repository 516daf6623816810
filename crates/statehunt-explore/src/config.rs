//! Run configuration shared by the explorer and the fuzzer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use statehunt_target::rers::INPUTS;
use statehunt_target::Granularity;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 15;
pub const DEFAULT_MAX_STATES: usize = 50_000;
pub const DEFAULT_FUZZ_ROUNDS: u64 = 100;
pub const DEFAULT_FUZZ_STEPS_PER_ROUND: u64 = 50;
pub const DEFAULT_FUZZ_SEED: u64 = 42;

/// Invalid run configuration. Raised before any target call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Input alphabet is empty")]
    EmptyAlphabet,

    #[error("Input alphabet lists symbol {0} more than once")]
    DuplicateSymbol(String),

    #[error("max_states must be at least 1")]
    ZeroStateCap,

    #[error("fuzz_steps_per_round must be at least 1 when fuzz_rounds is {0}")]
    ZeroFuzzSteps(u64),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Options recognised by a run. Only `input_alphabet` is required in a
/// config file; every other field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig<S> {
    /// Symbols tried from every state, in this order.
    pub input_alphabet: Vec<S>,
    /// Histories longer than this are not expanded.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Upper bound on distinct visited fingerprints.
    #[serde(default = "default_max_states")]
    pub max_states: usize,
    #[serde(default = "default_fuzz_rounds")]
    pub fuzz_rounds: u64,
    #[serde(default = "default_fuzz_steps_per_round")]
    pub fuzz_steps_per_round: u64,
    #[serde(default = "default_fuzz_seed")]
    pub fuzz_seed: u64,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_states() -> usize {
    DEFAULT_MAX_STATES
}

fn default_fuzz_rounds() -> u64 {
    DEFAULT_FUZZ_ROUNDS
}

fn default_fuzz_steps_per_round() -> u64 {
    DEFAULT_FUZZ_STEPS_PER_ROUND
}

fn default_fuzz_seed() -> u64 {
    DEFAULT_FUZZ_SEED
}

impl<S> RunConfig<S> {
    /// A config over `input_alphabet` with every other option at its default.
    pub fn new(input_alphabet: Vec<S>) -> Self {
        Self {
            input_alphabet,
            max_depth: DEFAULT_MAX_DEPTH,
            max_states: DEFAULT_MAX_STATES,
            fuzz_rounds: DEFAULT_FUZZ_ROUNDS,
            fuzz_steps_per_round: DEFAULT_FUZZ_STEPS_PER_ROUND,
            fuzz_seed: DEFAULT_FUZZ_SEED,
        }
    }
}

impl<S: Eq + Hash + Debug> RunConfig<S> {
    /// Reject configurations the explorer or fuzzer cannot run with.
    ///
    /// `max_depth = 0` is allowed: only the initial state is expanded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        let mut seen = HashSet::with_capacity(self.input_alphabet.len());
        for symbol in &self.input_alphabet {
            if !seen.insert(symbol) {
                return Err(ConfigError::DuplicateSymbol(format!("{:?}", symbol)));
            }
        }
        if self.max_states == 0 {
            return Err(ConfigError::ZeroStateCap);
        }
        if self.fuzz_rounds > 0 && self.fuzz_steps_per_round == 0 {
            return Err(ConfigError::ZeroFuzzSteps(self.fuzz_rounds));
        }
        Ok(())
    }
}

impl<S: DeserializeOwned> RunConfig<S> {
    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path)
    }
}

/// The sample target's alphabet with the stock limits.
impl Default for RunConfig<i32> {
    fn default() -> Self {
        Self::new(INPUTS.to_vec())
    }
}

/// Run options for the sample target: the generic options plus the
/// fingerprint granularity of the `RersMachine` under test.
///
/// ```json
/// { "input_alphabet": [2, 3, 4, 5, 6], "max_depth": 10, "granularity": "coarse" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRunConfig {
    #[serde(flatten)]
    pub run: RunConfig<i32>,
    #[serde(default)]
    pub granularity: Granularity,
}

impl SampleRunConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path)
    }
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
