//! Sample RERS-style reactive machine.
//!
//! Mirrors the shape of the RERS challenge problems: a handful of integer
//! state variables, one `calculate_output(input)` entry point, labelled
//! error checks evaluated before the ordinary transitions, and a fallback
//! failure when no transition matches.
//!
//! State variables:
//!
//! | Field | Role                  | Initial |
//! |-------|-----------------------|---------|
//! | `a10` | main FSM              | 0       |
//! | `a19` | secondary FSM         | 9       |
//! | `a1`  | arithmetic accumulator| 23      |
//! | `a4`  | phase marker          | 14      |
//! | `a12` | latch                 | 0       |
//!
//! The reachable error labels sit at increasing depths (`error_0` needs two
//! inputs, `error_4` needs nine), which makes the machine a useful fixture
//! for breadth-first search.

use crate::adapter::{Outcome, StateKey, Target, TargetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Legal inputs accepted by the machine.
pub const INPUTS: [i32; 5] = [2, 3, 4, 5, 6];

/// Output returned for an input outside [`INPUTS`].
pub const INVALID_INPUT: i64 = -2;

/// Failure message when the current state has no transition for the input.
pub const NO_TRANSITION: &str = "no transition for this input";

/// Explicit machine state. `reset` assigns [`RersState::INITIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RersState {
    pub a1: i32,
    pub a4: i32,
    pub a10: i32,
    pub a12: i32,
    pub a19: i32,
}

impl RersState {
    pub const INITIAL: RersState = RersState {
        a1: 23,
        a4: 14,
        a10: 0,
        a12: 0,
        a19: 9,
    };
}

impl Default for RersState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Which state variables go into the fingerprint.
///
/// `Full` is `(a10, a19, a1)`. `Coarse` drops the accumulator and keeps
/// the visited set tiny, at the price of merging states that differ only
/// in `a1` (deep errors that depend on `a1`, `a4` or `a12` become
/// unreachable). `Extended` adds `a4` and `a12` so nothing is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Full,
    Coarse,
    Extended,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Granularity::Full),
            "coarse" => Ok(Granularity::Coarse),
            "extended" => Ok(Granularity::Extended),
            other => Err(format!(
                "unknown granularity '{}'. Use 'full', 'coarse' or 'extended'.",
                other
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Full => "full",
            Granularity::Coarse => "coarse",
            Granularity::Extended => "extended",
        };
        f.write_str(name)
    }
}

/// The sample target.
#[derive(Debug, Clone)]
pub struct RersMachine {
    state: RersState,
    granularity: Granularity,
}

impl RersMachine {
    /// A machine in its initial state, fingerprinting at `granularity`.
    pub fn new(granularity: Granularity) -> Self {
        Self {
            state: RersState::INITIAL,
            granularity,
        }
    }

    pub fn state(&self) -> &RersState {
        &self.state
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Feed one input. Error checks run before transitions; the first
    /// matching rule wins.
    pub fn calculate_output(&mut self, input: i32) -> Outcome {
        if !INPUTS.contains(&input) {
            return Outcome::Value(INVALID_INPUT);
        }

        let s = &mut self.state;

        if s.a10 == 1 && s.a19 == 9 && s.a12 == 0 && input == 3 {
            return Outcome::failure("error_0");
        }
        if s.a10 == 2 && s.a19 == 10 && input == 5 {
            return Outcome::failure("error_1");
        }
        if s.a10 == 3 && s.a12 == 1 && input == 6 {
            return Outcome::failure("error_2");
        }
        if s.a10 == 1 && s.a12 == 1 && s.a4 == 15 && input == 4 {
            return Outcome::failure("error_3");
        }
        if s.a10 == 0 && s.a19 == 9 && s.a1 > 60 && input == 4 {
            return Outcome::failure("error_4");
        }

        if s.a10 == 0 && s.a19 == 9 && input == 4 {
            s.a1 = s.a1.wrapping_add(5);
            return Outcome::Value(22);
        }
        if s.a10 == 0 && s.a19 == 9 && input == 6 {
            s.a1 = s.a1.wrapping_sub(3);
            s.a10 = 1;
            return Outcome::Value(25);
        }
        if s.a10 == 1 && input == 2 {
            s.a1 = s.a1.wrapping_add(1);
            s.a10 = 0;
            return Outcome::Value(23);
        }
        if s.a10 == 1 && s.a19 == 9 && input == 5 {
            s.a19 = 10;
            return Outcome::Value(21);
        }
        if s.a10 == 1 && s.a19 == 10 && input == 6 {
            s.a10 = 2;
            return Outcome::Value(24);
        }
        if s.a10 == 2 && input == 4 {
            s.a12 = 1;
            s.a10 = 3;
            return Outcome::Value(26);
        }
        if s.a10 == 3 && input == 3 {
            s.a19 = 9;
            s.a10 = 0;
            s.a4 = 15;
            return Outcome::Value(20);
        }

        Outcome::failure(NO_TRANSITION)
    }
}

impl Default for RersMachine {
    fn default() -> Self {
        Self::new(Granularity::default())
    }
}

impl Target for RersMachine {
    type Symbol = i32;

    fn reset(&mut self) -> Result<(), TargetError> {
        self.state = RersState::INITIAL;
        Ok(())
    }

    fn step(&mut self, symbol: &i32) -> Result<Outcome, TargetError> {
        let outcome = self.calculate_output(*symbol);
        if let Outcome::Failure(ref msg) = outcome {
            log::trace!("input {} failed in state {:?}: {}", symbol, self.state, msg);
        }
        Ok(outcome)
    }

    fn fingerprint(&self) -> StateKey {
        let s = &self.state;
        let components = match self.granularity {
            Granularity::Full => vec![s.a10, s.a19, s.a1],
            Granularity::Coarse => vec![s.a10, s.a19],
            Granularity::Extended => vec![s.a10, s.a19, s.a1, s.a4, s.a12],
        };
        StateKey::new(components.into_iter().map(i64::from).collect())
    }

    fn describe(&self) -> String {
        format!(
            "a1={}, a10={}, a19={}",
            self.state.a1, self.state.a10, self.state.a19
        )
    }
}
