//! A full hunting session: breadth-first exploration followed by the
//! random-walk fuzzer, summarised as pass/fail properties.

use crate::config::RunConfig;
use crate::explorer::{ExplorationReport, ExploreError, Explorer};
use crate::fuzz::{FuzzReport, RandomWalkFuzzer};
use log::warn;
use serde::Serialize;
use statehunt_target::Target;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Exploration failed: {0}")]
    Explore(#[from] ExploreError),
}

/// One pass/fail line of a session report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyVerdict {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

pub const PROPERTY_BFS_FOUND_BUGS: &str = "bfs-found-bugs";
pub const PROPERTY_FUZZ_SURVIVED: &str = "fuzz-survived";

/// Everything a session produced.
///
/// A fuzzing run that hit an adapter error leaves `fuzz` empty and the error
/// text in `fuzz_error`; the exploration results are kept either way.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<S> {
    pub exploration: ExplorationReport<S>,
    pub fuzz: Option<FuzzReport>,
    pub fuzz_error: Option<String>,
    pub properties: Vec<PropertyVerdict>,
}

impl<S> SessionReport<S> {
    pub fn unique_bugs(&self) -> usize {
        self.exploration.unique_bugs()
    }

    /// True when every property passed.
    pub fn all_passed(&self) -> bool {
        self.properties.iter().all(|p| p.passed)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyVerdict> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// True if the fuzzer stopped on an adapter error.
    pub fn fuzz_aborted(&self) -> bool {
        self.fuzz_error.is_some()
    }
}

/// Explore `target` breadth-first, then fuzz it, using the same config.
///
/// The target is borrowed so the caller can inspect it afterwards. An
/// adapter error during exploration is returned as an error; one during
/// fuzzing fails the fuzz-survived property instead, so the bugs already
/// catalogued are not lost.
pub fn run_session<T: Target>(
    target: &mut T,
    config: &RunConfig<T::Symbol>,
) -> Result<SessionReport<T::Symbol>, SessionError> {
    let exploration = Explorer::new(&mut *target, config.clone())?.run()?;

    let (fuzz, fuzz_error) =
        match RandomWalkFuzzer::from_config(config).run(target, &config.input_alphabet) {
            Ok(report) => (Some(report), None),
            Err(e) => {
                warn!("Fuzzing aborted after exploration: {}", e);
                (None, Some(e.to_string()))
            }
        };

    let fuzz_verdict = match (&fuzz, &fuzz_error) {
        (Some(fuzz), _) => PropertyVerdict {
            name: PROPERTY_FUZZ_SURVIVED.to_string(),
            passed: fuzz.completed_all_rounds(),
            detail: format!(
                "{}/{} rounds, {} steps, {} failures absorbed",
                fuzz.rounds_completed,
                fuzz.rounds_requested,
                fuzz.steps_executed,
                fuzz.failures_seen
            ),
        },
        (None, error) => PropertyVerdict {
            name: PROPERTY_FUZZ_SURVIVED.to_string(),
            passed: false,
            detail: error.clone().unwrap_or_default(),
        },
    };

    let properties = vec![
        PropertyVerdict {
            name: PROPERTY_BFS_FOUND_BUGS.to_string(),
            passed: exploration.found_bugs(),
            detail: format!(
                "{} unique bug(s) in {} visited states",
                exploration.unique_bugs(),
                exploration.states_visited
            ),
        },
        fuzz_verdict,
    ];

    Ok(SessionReport {
        exploration,
        fuzz,
        fuzz_error,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use statehunt_target::{Granularity, Outcome, RersMachine, StateKey, TargetError};

    #[test]
    fn test_session_passes_on_sample_target() {
        let mut machine = RersMachine::new(Granularity::Full);
        let report = run_session(&mut machine, &RunConfig::default()).unwrap();

        assert_eq!(report.unique_bugs(), 6);
        assert!(report.all_passed());
        assert!(report.property(PROPERTY_BFS_FOUND_BUGS).unwrap().passed);
        assert!(report.property(PROPERTY_FUZZ_SURVIVED).unwrap().passed);
        assert_eq!(report.fuzz.as_ref().unwrap().rounds_completed, 100);
        assert!(!report.fuzz_aborted());
    }

    #[test]
    fn test_session_without_bugs_fails_property() {
        // Input 4 from the initial state only bumps a1.
        let config = RunConfig {
            max_depth: 0,
            fuzz_rounds: 2,
            fuzz_steps_per_round: 5,
            ..RunConfig::new(vec![4])
        };
        let mut machine = RersMachine::default();
        let report = run_session(&mut machine, &config).unwrap();

        assert_eq!(report.unique_bugs(), 0);
        assert!(!report.property(PROPERTY_BFS_FOUND_BUGS).unwrap().passed);
        assert!(report.property(PROPERTY_FUZZ_SURVIVED).unwrap().passed);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_session_rejects_bad_config() {
        let config = RunConfig {
            max_states: 0,
            ..RunConfig::default()
        };
        let mut machine = RersMachine::default();
        assert!(matches!(
            run_session(&mut machine, &config),
            Err(SessionError::Explore(ExploreError::Config(_)))
        ));
    }

    #[test]
    fn test_session_report_serializes() {
        let config = RunConfig {
            fuzz_rounds: 1,
            ..RunConfig::default()
        };
        let mut machine = RersMachine::new(Granularity::Coarse);
        let report = run_session(&mut machine, &config).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["exploration"]["bugs"].as_array().unwrap().len(), 4);
        assert_eq!(json["exploration"]["stop_reason"], "FrontierExhausted");
        assert_eq!(json["properties"][0]["name"], PROPERTY_BFS_FOUND_BUGS);
    }

    /// Sample machine whose adapter dies once `step` has been called more
    /// than `step_budget` times.
    struct DiesDuringFuzz {
        inner: RersMachine,
        steps: u64,
        step_budget: u64,
    }

    impl Target for DiesDuringFuzz {
        type Symbol = i32;

        fn reset(&mut self) -> Result<(), TargetError> {
            self.inner.reset()
        }

        fn step(&mut self, symbol: &i32) -> Result<Outcome, TargetError> {
            self.steps += 1;
            if self.steps > self.step_budget {
                return Err(TargetError::Step("connection lost".to_string()));
            }
            self.inner.step(symbol)
        }

        fn fingerprint(&self) -> StateKey {
            self.inner.fingerprint()
        }
    }

    #[test]
    fn test_fuzz_adapter_error_keeps_exploration() {
        // Measure the exploration's step count, then let the adapter die a
        // few steps into fuzzing.
        let bfs_steps = Explorer::new(RersMachine::default(), RunConfig::default())
            .unwrap()
            .run()
            .unwrap()
            .stats
            .steps_executed;

        let mut target = DiesDuringFuzz {
            inner: RersMachine::default(),
            steps: 0,
            step_budget: bfs_steps + 3,
        };
        let report = run_session(&mut target, &RunConfig::default()).unwrap();

        assert_eq!(report.unique_bugs(), 6);
        assert!(report.property(PROPERTY_BFS_FOUND_BUGS).unwrap().passed);
        assert!(report.fuzz.is_none());
        assert!(report.fuzz_aborted());

        let verdict = report.property(PROPERTY_FUZZ_SURVIVED).unwrap();
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("connection lost"));
        assert!(!report.all_passed());
    }
}
