//! The exploration driver: breadth-first search over input histories.
//!
//! ```text
//! seed []
//! while frontier non-empty and visited < max_states:
//!     h = dequeue()
//!     |h| > max_depth?        → skip
//!     restore_to(h) diverged? → warn, skip
//!     for s in alphabet:
//!         restore_to(h); step(s)
//!         Value   → try_enqueue(h + [s], fingerprint())
//!         Failure → catalog.record(msg, h + [s], describe())
//! ```
//!
//! Every symbol is tried from a fresh restore, so a step never observes
//! state left behind by a sibling. The cost is one full replay per
//! (history, symbol) pair, which is acceptable for the small alphabets and
//! shallow depths this engine targets.

use crate::catalog::{BugCatalog, BugRecord};
use crate::config::{ConfigError, RunConfig};
use crate::frontier::{Admission, Frontier};
use crate::history::History;
use crate::replay::{ReplayEngine, ReplayError};
use log::{debug, info, warn};
use serde::Serialize;
use statehunt_target::{Outcome, Target, TargetError};
use thiserror::Error;

/// Errors from the exploration engine.
#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    #[error("Exploration already finished; create a new explorer to run again")]
    AlreadyFinished,
}

/// Lifecycle of an [`Explorer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Constructed, not yet run.
    Idle,
    /// Dequeuing and expanding histories.
    Running,
    /// A stop condition was met; the report is being assembled. Only held
    /// inside [`Explorer::run`], so callers see `Running` or `Done`.
    Draining,
    /// Finished. Terminal.
    Done,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Every admitted history was dequeued.
    FrontierExhausted,
    /// The visited set reached `max_states`.
    StateCapReached,
}

/// Counters accumulated during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExplorationStats {
    /// Histories restored and expanded with every symbol.
    pub histories_expanded: u64,
    /// Histories dequeued but longer than `max_depth`.
    pub skipped_too_deep: u64,
    /// Branches abandoned because replay diverged.
    pub diverged: u64,
    /// Successors admitted to the frontier.
    pub successors_added: u64,
    /// Successors whose fingerprint was already visited.
    pub duplicates: u64,
    /// Successors refused because the state cap was reached.
    pub refused_at_cap: u64,
    /// Failure outcomes observed, including repeats of known bugs.
    pub failures_observed: u64,
    /// Calls to `step`, replay steps included.
    pub steps_executed: u64,
    /// Length of the longest expanded history.
    pub deepest_expanded: usize,
}

/// Final exploration report.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport<S> {
    /// Catalogued bugs in discovery order.
    pub bugs: Vec<BugRecord<S>>,
    pub stop_reason: StopReason,
    pub states_visited: usize,
    /// Histories still queued when the run stopped.
    pub frontier_remaining: usize,
    pub stats: ExplorationStats,
}

impl<S> ExplorationReport<S> {
    /// Number of distinct failure messages found.
    pub fn unique_bugs(&self) -> usize {
        self.bugs.len()
    }

    pub fn found_bugs(&self) -> bool {
        !self.bugs.is_empty()
    }
}

/// Breadth-first explorer over one target.
pub struct Explorer<T: Target> {
    config: RunConfig<T::Symbol>,
    replay: ReplayEngine<T>,
    frontier: Frontier<T::Symbol>,
    catalog: BugCatalog<T::Symbol>,
    phase: Phase,
    stats: ExplorationStats,
}

impl<T: Target> Explorer<T> {
    /// Create an explorer. The config is validated here, before any target
    /// call is made.
    pub fn new(target: T, config: RunConfig<T::Symbol>) -> Result<Self, ExploreError> {
        config.validate()?;
        let frontier = Frontier::new(config.max_depth, config.max_states);
        Ok(Self {
            config,
            replay: ReplayEngine::new(target),
            frontier,
            catalog: BugCatalog::new(),
            phase: Phase::Idle,
            stats: ExplorationStats::default(),
        })
    }

    /// Run the search to completion.
    ///
    /// Can be called once. An adapter error ends the run with that error;
    /// the explorer is `Done` either way.
    pub fn run(&mut self) -> Result<ExplorationReport<T::Symbol>, ExploreError> {
        if self.phase != Phase::Idle {
            return Err(ExploreError::AlreadyFinished);
        }

        info!(
            "Starting exploration: {} symbols, max depth {}, max states {}",
            self.config.input_alphabet.len(),
            self.config.max_depth,
            self.config.max_states
        );
        self.enter(Phase::Running);

        let result = self.search();
        self.stats.steps_executed = self.replay.steps();
        let outcome = match result {
            Ok(stop_reason) => {
                self.enter(Phase::Draining);
                info!(
                    "Exploration stopped ({:?}): {} states visited, {} histories expanded, {} bugs",
                    stop_reason,
                    self.frontier.visited_count(),
                    self.stats.histories_expanded,
                    self.catalog.size()
                );
                Ok(self.generate_report(stop_reason))
            }
            Err(e) => Err(e),
        };
        self.enter(Phase::Done);
        outcome
    }

    fn enter(&mut self, phase: Phase) {
        debug!("Explorer phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn search(&mut self) -> Result<StopReason, ExploreError> {
        let alphabet = self.config.input_alphabet.clone();
        self.frontier.seed();

        loop {
            if self.frontier.is_saturated() {
                return Ok(StopReason::StateCapReached);
            }
            let Some(history) = self.frontier.dequeue() else {
                return Ok(StopReason::FrontierExhausted);
            };
            if self.frontier.exceeds_depth(&history) {
                self.stats.skipped_too_deep += 1;
                continue;
            }
            self.expand(&history, &alphabet)?;
        }
    }

    /// Try every symbol from the state reached by `history`.
    fn expand(
        &mut self,
        history: &History<T::Symbol>,
        alphabet: &[T::Symbol],
    ) -> Result<(), ExploreError> {
        if !self.restore(history)? {
            return Ok(());
        }
        debug!(
            "Expanding {} at {} (frontier: {})",
            history,
            self.replay.fingerprint(),
            self.frontier.len()
        );
        self.stats.histories_expanded += 1;
        self.stats.deepest_expanded = self.stats.deepest_expanded.max(history.len());

        for symbol in alphabet {
            if !self.restore(history)? {
                return Ok(());
            }
            match self.replay.step(symbol)? {
                Outcome::Value(_) => {
                    let key = self.replay.fingerprint();
                    match self.frontier.try_enqueue(history.extended(symbol.clone()), key) {
                        Admission::Added => self.stats.successors_added += 1,
                        Admission::Duplicate => self.stats.duplicates += 1,
                        Admission::Saturated => self.stats.refused_at_cap += 1,
                    }
                }
                Outcome::Failure(message) => {
                    self.stats.failures_observed += 1;
                    let crash_path = history.extended(symbol.clone());
                    let terminal_state = self.replay.describe();
                    if !self.catalog.contains(&message) {
                        info!(
                            "Bug #{}: {} via {} ({})",
                            self.catalog.size(),
                            message,
                            crash_path,
                            terminal_state
                        );
                    }
                    self.catalog.record(message, crash_path, terminal_state);
                }
            }
        }
        Ok(())
    }

    /// Restore `history`. Returns `false` if replay diverged and the branch
    /// should be dropped.
    fn restore(&mut self, history: &History<T::Symbol>) -> Result<bool, ExploreError> {
        match self.replay.restore_to(history) {
            Ok(()) => Ok(true),
            Err(ReplayError::Divergence {
                history,
                index,
                message,
            }) => {
                warn!(
                    "Replay of {} diverged at step {} ({}), abandoning branch",
                    history, index, message
                );
                self.stats.diverged += 1;
                Ok(false)
            }
            Err(ReplayError::Target(e)) => Err(e.into()),
        }
    }

    fn generate_report(&self, stop_reason: StopReason) -> ExplorationReport<T::Symbol> {
        ExplorationReport {
            bugs: self.catalog.all().to_vec(),
            stop_reason,
            states_visited: self.frontier.visited_count(),
            frontier_remaining: self.frontier.len(),
            stats: self.stats.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn catalog(&self) -> &BugCatalog<T::Symbol> {
        &self.catalog
    }

    pub fn frontier(&self) -> &Frontier<T::Symbol> {
        &self.frontier
    }

    pub fn stats(&self) -> &ExplorationStats {
        &self.stats
    }

    pub fn config(&self) -> &RunConfig<T::Symbol> {
        &self.config
    }

    /// The replay engine, for reproducing catalogued bugs after a run.
    pub fn replay_mut(&mut self) -> &mut ReplayEngine<T> {
        &mut self.replay
    }

    pub fn into_target(self) -> T {
        self.replay.into_target()
    }
}
