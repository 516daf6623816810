//! Random-walk fuzzer: a robustness smoke test, not a bug hunter.
//!
//! Each round resets the target and feeds it up to `steps_per_round`
//! symbols drawn uniformly from the alphabet. A failure outcome ends the
//! round and is counted, never propagated and never catalogued. Only an
//! adapter error stops the fuzzer.
//!
//! The RNG is a [`ChaCha8Rng`] seeded from `seed`, so a given seed always
//! produces the same walks.

use crate::config::RunConfig;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use statehunt_target::{Outcome, Target, TargetError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuzzError {
    #[error("Target error in fuzz round {round}: {source}")]
    Target {
        round: u64,
        #[source]
        source: TargetError,
    },

    #[error("Cannot fuzz with an empty input alphabet")]
    EmptyAlphabet,
}

/// Summary of a fuzzing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FuzzReport {
    pub seed: u64,
    pub rounds_requested: u64,
    pub rounds_completed: u64,
    pub steps_executed: u64,
    /// Rounds that ended early on a failure outcome.
    pub failures_seen: u64,
    /// Longest run of successful steps in any round.
    pub longest_walk: u64,
}

impl FuzzReport {
    /// Every requested round ran without an adapter error.
    pub fn completed_all_rounds(&self) -> bool {
        self.rounds_completed == self.rounds_requested
    }
}

/// Seeded random-walk driver.
pub struct RandomWalkFuzzer {
    rng: ChaCha8Rng,
    seed: u64,
    rounds: u64,
    steps_per_round: u64,
}

impl RandomWalkFuzzer {
    pub fn new(seed: u64, rounds: u64, steps_per_round: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            rounds,
            steps_per_round,
        }
    }

    pub fn from_config<S>(config: &RunConfig<S>) -> Self {
        Self::new(
            config.fuzz_seed,
            config.fuzz_rounds,
            config.fuzz_steps_per_round,
        )
    }

    /// Run every round against `target`.
    pub fn run<T: Target>(
        &mut self,
        target: &mut T,
        alphabet: &[T::Symbol],
    ) -> Result<FuzzReport, FuzzError> {
        if alphabet.is_empty() {
            return Err(FuzzError::EmptyAlphabet);
        }

        info!(
            "Starting random walk: seed {}, {} rounds x {} steps",
            self.seed, self.rounds, self.steps_per_round
        );

        let mut report = FuzzReport {
            seed: self.seed,
            rounds_requested: self.rounds,
            ..FuzzReport::default()
        };

        for round in 0..self.rounds {
            target
                .reset()
                .map_err(|source| FuzzError::Target { round, source })?;

            let mut walked = 0;
            for _ in 0..self.steps_per_round {
                let symbol = &alphabet[self.rng.gen_range(0..alphabet.len())];
                let outcome = target
                    .step(symbol)
                    .map_err(|source| FuzzError::Target { round, source })?;
                report.steps_executed += 1;

                if let Outcome::Failure(message) = outcome {
                    debug!(
                        "Round {}: {} after {} steps on input {}",
                        round, message, walked, symbol
                    );
                    report.failures_seen += 1;
                    break;
                }
                walked += 1;
            }

            report.longest_walk = report.longest_walk.max(walked);
            report.rounds_completed += 1;
        }

        info!(
            "Random walk finished: {} rounds, {} steps, {} failures",
            report.rounds_completed, report.steps_executed, report.failures_seen
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statehunt_target::rers::INPUTS;
    use statehunt_target::{RersMachine, StateKey};

    #[test]
    fn test_completes_every_round() {
        let mut machine = RersMachine::default();
        let report = RandomWalkFuzzer::new(42, 100, 50)
            .run(&mut machine, &INPUTS)
            .unwrap();
        assert_eq!(report.rounds_completed, 100);
        assert!(report.completed_all_rounds());
        assert!(report.steps_executed >= 100);
        assert!(report.steps_executed <= 100 * 50);
    }

    #[test]
    fn test_same_seed_same_walks() {
        let mut a = RersMachine::default();
        let mut b = RersMachine::default();
        let first = RandomWalkFuzzer::new(7, 20, 30).run(&mut a, &INPUTS).unwrap();
        let second = RandomWalkFuzzer::new(7, 20, 30).run(&mut b, &INPUTS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failures_end_rounds_without_error() {
        // Input 3 has no transition from the initial state, so every round
        // fails on its first step.
        let mut machine = RersMachine::default();
        let report = RandomWalkFuzzer::new(1, 10, 50)
            .run(&mut machine, &[3])
            .unwrap();
        assert_eq!(report.failures_seen, 10);
        assert_eq!(report.steps_executed, 10);
        assert_eq!(report.longest_walk, 0);
        assert!(report.completed_all_rounds());
    }

    #[test]
    fn test_zero_rounds() {
        let mut machine = RersMachine::default();
        let report = RandomWalkFuzzer::new(42, 0, 50)
            .run(&mut machine, &INPUTS)
            .unwrap();
        assert_eq!(report.rounds_completed, 0);
        assert_eq!(report.steps_executed, 0);
        assert!(report.completed_all_rounds());
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let mut machine = RersMachine::default();
        let result = RandomWalkFuzzer::new(42, 1, 1).run(&mut machine, &[]);
        assert!(matches!(result, Err(FuzzError::EmptyAlphabet)));
    }

    #[test]
    fn test_from_config() {
        let config = RunConfig {
            fuzz_rounds: 3,
            fuzz_steps_per_round: 4,
            fuzz_seed: 9,
            ..RunConfig::<i32>::default()
        };
        let mut machine = RersMachine::default();
        let report = RandomWalkFuzzer::from_config(&config)
            .run(&mut machine, &config.input_alphabet)
            .unwrap();
        assert_eq!(report.seed, 9);
        assert_eq!(report.rounds_requested, 3);
        assert!(report.steps_executed <= 12);
    }

    struct StepFails;

    impl Target for StepFails {
        type Symbol = i32;

        fn reset(&mut self) -> Result<(), TargetError> {
            Ok(())
        }

        fn step(&mut self, _symbol: &i32) -> Result<Outcome, TargetError> {
            Err(TargetError::Step("wire unplugged".to_string()))
        }

        fn fingerprint(&self) -> StateKey {
            StateKey::new(Vec::new())
        }
    }

    #[test]
    fn test_adapter_error_is_fatal() {
        let result = RandomWalkFuzzer::new(42, 5, 5).run(&mut StepFails, &[1, 2]);
        match result {
            Err(FuzzError::Target { round, source }) => {
                assert_eq!(round, 0);
                assert_eq!(source, TargetError::Step("wire unplugged".to_string()));
            }
            other => panic!("expected target error, got {:?}", other),
        }
    }
}
