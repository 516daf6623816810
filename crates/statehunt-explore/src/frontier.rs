//! Frontier: FIFO queue of histories awaiting expansion, plus the visited
//! set that deduplicates them by [`StateKey`].
//!
//! Admission is decided by the successor's fingerprint, not its history:
//! the first history to reach a key wins and every later history reaching
//! the same key is dropped. Since the queue is FIFO, the winner is always
//! one of the shortest.
//!
//! Two caps bound the search:
//!
//! - `max_depth`: histories longer than this are handed out by
//!   [`Frontier::dequeue`] but must not be expanded
//!   ([`Frontier::exceeds_depth`]).
//! - `max_states`: once the visited set holds this many keys, nothing new is
//!   admitted and [`Frontier::is_saturated`] tells the driver to stop.

use crate::history::History;
use log::debug;
use statehunt_target::StateKey;
use std::collections::{HashSet, VecDeque};

/// What [`Frontier::try_enqueue`] did with a successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New key: marked visited and queued.
    Added,
    /// The key was already visited.
    Duplicate,
    /// The visited set is at `max_states`.
    Saturated,
}

impl Admission {
    pub fn is_added(self) -> bool {
        self == Admission::Added
    }
}

/// FIFO work queue with a visited set.
#[derive(Debug, Clone)]
pub struct Frontier<S> {
    queue: VecDeque<History<S>>,
    visited: HashSet<StateKey>,
    max_depth: usize,
    max_states: usize,
}

impl<S: Clone> Frontier<S> {
    pub fn new(max_depth: usize, max_states: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
            max_states,
        }
    }

    /// Queue the empty history.
    ///
    /// The initial state's key is not marked visited, so a history that
    /// returns to the initial state is admitted once as a successor.
    pub fn seed(&mut self) {
        self.queue.push_back(History::empty());
    }

    /// Pop the oldest queued history.
    pub fn dequeue(&mut self) -> Option<History<S>> {
        self.queue.pop_front()
    }

    /// Admit `history` if `key` is new and the state cap allows it.
    pub fn try_enqueue(&mut self, history: History<S>, key: StateKey) -> Admission {
        if self.visited.contains(&key) {
            return Admission::Duplicate;
        }
        if self.is_saturated() {
            return Admission::Saturated;
        }

        self.visited.insert(key);
        self.queue.push_back(history);

        if self.is_saturated() {
            debug!(
                "Visited-state cap of {} reached with {} histories queued",
                self.max_states,
                self.queue.len()
            );
        }
        Admission::Added
    }

    /// True if `history` is longer than the depth cap.
    pub fn exceeds_depth(&self, history: &History<S>) -> bool {
        history.len() > self.max_depth
    }

    /// True once the visited set holds `max_states` keys.
    pub fn is_saturated(&self) -> bool {
        self.visited.len() >= self.max_states
    }

    /// Number of queued histories.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(parts: &[i64]) -> StateKey {
        StateKey::new(parts.to_vec())
    }

    #[test]
    fn test_seed_queues_empty_history() {
        let mut frontier: Frontier<i32> = Frontier::new(15, 100);
        assert!(frontier.is_empty());

        frontier.seed();
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.visited_count(), 0);
        assert_eq!(frontier.dequeue(), Some(History::empty()));
        assert_eq!(frontier.dequeue(), None);
    }

    #[test]
    fn test_dequeue_is_fifo() {
        let mut frontier = Frontier::new(15, 100);
        frontier.try_enqueue(History::from_symbols(vec![6]), key(&[1]));
        frontier.try_enqueue(History::from_symbols(vec![4]), key(&[2]));
        frontier.try_enqueue(History::from_symbols(vec![6, 5]), key(&[3]));

        let order: Vec<History<i32>> = std::iter::from_fn(|| frontier.dequeue()).collect();
        assert_eq!(
            order,
            vec![
                History::from_symbols(vec![6]),
                History::from_symbols(vec![4]),
                History::from_symbols(vec![6, 5]),
            ]
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut frontier = Frontier::new(15, 100);
        assert_eq!(
            frontier.try_enqueue(History::from_symbols(vec![6]), key(&[1, 9])),
            Admission::Added
        );
        assert_eq!(
            frontier.try_enqueue(History::from_symbols(vec![4, 6]), key(&[1, 9])),
            Admission::Duplicate
        );
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_state_cap_rejects_new_keys() {
        let mut frontier = Frontier::new(15, 2);
        assert!(frontier
            .try_enqueue(History::from_symbols(vec![2]), key(&[1]))
            .is_added());
        assert!(!frontier.is_saturated());
        assert!(frontier
            .try_enqueue(History::from_symbols(vec![3]), key(&[2]))
            .is_added());
        assert!(frontier.is_saturated());

        assert_eq!(
            frontier.try_enqueue(History::from_symbols(vec![4]), key(&[3])),
            Admission::Saturated
        );
        // A known key is still reported as a duplicate, not as saturation.
        assert_eq!(
            frontier.try_enqueue(History::from_symbols(vec![5]), key(&[1])),
            Admission::Duplicate
        );
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_exceeds_depth() {
        let frontier: Frontier<i32> = Frontier::new(2, 100);
        assert!(!frontier.exceeds_depth(&History::empty()));
        assert!(!frontier.exceeds_depth(&History::from_symbols(vec![1, 2])));
        assert!(frontier.exceeds_depth(&History::from_symbols(vec![1, 2, 3])));
    }
}
