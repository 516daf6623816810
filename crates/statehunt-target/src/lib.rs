//! Target side of statehunt.
//!
//! This crate provides two components:
//!
//! 1. **[`adapter`]**: the contract every system under test implements:
//!    [`Target`] with `reset`, `step` and `fingerprint`, plus the
//!    [`Outcome`] and [`StateKey`] values it produces
//! 2. **[`rers`]**: a sample RERS-style reactive machine used by the
//!    explorer's tests and the demo CLI
//!
//! # Architecture
//!
//! ```text
//! Explorer                 Target adapter            Target state
//! ────────                 ──────────────            ────────────
//! replay(history) ──→ reset() + step(s)... ──→ RersState::INITIAL, ...
//! probe symbol    ──→ step(s)              ──→ Outcome::{Value, Failure}
//! dedup           ──→ fingerprint()        ──→ StateKey
//! ```

pub mod adapter;
pub mod rers;

pub use adapter::{Outcome, StateKey, Target, TargetError};
pub use rers::{Granularity, RersMachine, RersState};
