//! History: the input sequence that leads from the initial state to a
//! target state.
//!
//! Histories are the only thing the frontier stores. A state is never
//! snapshotted; it is rebuilt by resetting the target and replaying its
//! history. Extending a history produces a new value and leaves the parent
//! untouched, so siblings can share a prefix without aliasing.

use serde::Serialize;
use std::fmt;

/// An ordered, immutable list of input symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct History<S> {
    symbols: Vec<S>,
}

impl<S> History<S> {
    /// The empty history, which denotes the initial state.
    pub fn empty() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    pub fn from_symbols(symbols: Vec<S>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    /// Number of symbols, which is also the BFS depth of the state.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.symbols.iter()
    }
}

impl<S: Clone> History<S> {
    /// A new history with `symbol` appended.
    pub fn extended(&self, symbol: S) -> Self {
        let mut symbols = Vec::with_capacity(self.symbols.len() + 1);
        symbols.extend_from_slice(&self.symbols);
        symbols.push(symbol);
        Self { symbols }
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> From<Vec<S>> for History<S> {
    fn from(symbols: Vec<S>) -> Self {
        Self::from_symbols(symbols)
    }
}

impl<'a, S> IntoIterator for &'a History<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

impl<S: fmt::Display> fmt::Display for History<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, s) in self.symbols.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{s}")?;
        }
        f.write_str("]")
    }
}
