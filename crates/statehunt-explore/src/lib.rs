//! Breadth-first state-space exploration for statehunt.
//!
//! This crate searches the state space of a [`Target`](statehunt_target::Target)
//! for input sequences that make it fail:
//!
//! 1. **Replay-based restore**: a state is an input history; reaching it
//!    means `reset()` plus replaying the history
//! 2. **Fingerprint deduplication**: successors whose
//!    [`StateKey`](statehunt_target::StateKey) was already seen are dropped
//! 3. **Failure cataloguing**: one record per distinct failure message, with
//!    the shortest crash path breadth-first order can find
//!
//! A seeded random-walk fuzzer and single-step targeted probes complement
//! the search.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ dequeue  ┌──────────┐ restore_to ┌──────────────┐ reset/step ┌────────┐
//! │ Frontier │ ───────→ │ Explorer │ ─────────→ │ ReplayEngine │ ─────────→ │ Target │
//! └──────────┘          └──────────┘            └──────────────┘            └────────┘
//!      ↑ try_enqueue(h+[s], key)  │ Failure(msg)
//!      └──────────────────────────┤
//!                                 ↓
//!                           ┌────────────┐
//!                           │ BugCatalog │
//!                           └────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use statehunt_explore::config::RunConfig;
//! use statehunt_explore::report::format_report;
//! use statehunt_explore::session::run_session;
//! use statehunt_target::{Granularity, RersMachine};
//!
//! let mut machine = RersMachine::new(Granularity::Full);
//! let report = run_session(&mut machine, &RunConfig::default()).unwrap();
//! println!("{}", format_report(&report));
//! ```

pub mod catalog;
pub mod config;
pub mod explorer;
pub mod frontier;
pub mod fuzz;
pub mod history;
pub mod probe;
pub mod replay;
pub mod report;
pub mod session;

pub use catalog::{BugCatalog, BugRecord};
pub use config::{ConfigError, RunConfig, SampleRunConfig};
pub use explorer::{ExplorationReport, ExplorationStats, ExploreError, Explorer, Phase, StopReason};
pub use frontier::{Admission, Frontier};
pub use fuzz::{FuzzError, FuzzReport, RandomWalkFuzzer};
pub use history::History;
pub use probe::{smoke_check, ProbeError, ProbeResult, TargetedProbe};
pub use replay::{ReplayEngine, ReplayError, ReplayTrace};
pub use session::{run_session, PropertyVerdict, SessionError, SessionReport};
