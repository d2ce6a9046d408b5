//! Epoch-ordered record of sampled states

use crate::errors::{KeplerError, Result};
use crate::state::State;

/// States keyed by epoch (seconds from the series start time origin)
///
/// Epochs are kept strictly ascending. Reading never creates entries; an
/// absent epoch is reported as [`KeplerError::UnknownEpoch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationHistory {
    samples: Vec<(f64, State)>,
}

impl PropagationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PropagationHistory {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Record `state` at `epoch`, returning the state it replaces if any
    ///
    /// Epochs must be finite and non-negative.
    pub fn insert(&mut self, epoch: f64, state: State) -> Result<Option<State>> {
        if !(epoch.is_finite() && epoch >= 0.0) {
            return Err(KeplerError::Configuration(format!(
                "history epochs must be finite and non-negative, got {epoch}"
            )));
        }

        match self.search(epoch) {
            Ok(index) => Ok(Some(std::mem::replace(&mut self.samples[index].1, state))),
            Err(index) => {
                self.samples.insert(index, (epoch, state));
                Ok(None)
            }
        }
    }

    pub fn get(&self, epoch: f64) -> Option<&State> {
        self.search(epoch).ok().map(|index| &self.samples[index].1)
    }

    /// Like [`get`](Self::get) but fails with [`KeplerError::UnknownEpoch`]
    pub fn state_at(&self, epoch: f64) -> Result<&State> {
        self.get(epoch).ok_or(KeplerError::UnknownEpoch(epoch))
    }

    pub fn contains_epoch(&self, epoch: f64) -> bool {
        self.search(epoch).is_ok()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<(f64, &State)> {
        self.samples.first().map(|(t, s)| (*t, s))
    }

    pub fn last(&self) -> Option<(f64, &State)> {
        self.samples.last().map(|(t, s)| (*t, s))
    }

    pub fn epochs(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|(t, _)| *t)
    }

    /// Samples in ascending epoch order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.samples.iter().map(|(t, s)| (*t, s))
    }

    /// Same epochs, every state transformed by `f`
    pub fn map_states<F>(&self, mut f: F) -> PropagationHistory
    where
        F: FnMut(&State) -> State,
    {
        PropagationHistory {
            samples: self.samples.iter().map(|(t, s)| (*t, f(s))).collect(),
        }
    }

    fn search(&self, epoch: f64) -> std::result::Result<usize, usize> {
        self.samples
            .binary_search_by(|(t, _)| t.total_cmp(&epoch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(x: f64) -> State {
        State::new(x, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    #[test]
    fn test_insert_keeps_epochs_sorted() {
        let mut history = PropagationHistory::new();
        history.insert(7200.0, state(3.0)).unwrap();
        history.insert(0.0, state(1.0)).unwrap();
        history.insert(3600.0, state(2.0)).unwrap();

        let epochs: Vec<f64> = history.epochs().collect();
        assert_eq!(epochs, vec![0.0, 3600.0, 7200.0]);
        assert_eq!(history.first().unwrap().0, 0.0);
        assert_eq!(history.last().unwrap().1.x(), 3.0);
    }

    #[test]
    fn test_insert_overwrites_existing_epoch() {
        let mut history = PropagationHistory::new();
        assert_eq!(history.insert(60.0, state(1.0)).unwrap(), None);
        let old = history.insert(60.0, state(2.0)).unwrap();
        assert_eq!(old, Some(state(1.0)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(60.0), Some(&state(2.0)));
    }

    #[test]
    fn test_read_does_not_create_entries() {
        let history = PropagationHistory::new();
        assert!(history.get(10.0).is_none());
        assert!(matches!(
            history.state_at(10.0),
            Err(KeplerError::UnknownEpoch(t)) if t == 10.0
        ));
        assert!(history.is_empty());
    }

    #[test]
    fn test_rejects_invalid_epochs() {
        let mut history = PropagationHistory::new();
        assert!(history.insert(-1.0, state(0.0)).is_err());
        assert!(history.insert(f64::NAN, state(0.0)).is_err());
        assert!(history.insert(f64::INFINITY, state(0.0)).is_err());
        assert!(history.is_empty());
    }

    #[test]
    fn test_map_states_preserves_epochs() {
        let mut history = PropagationHistory::with_capacity(2);
        history.insert(0.0, state(1.0)).unwrap();
        history.insert(10.0, state(2.0)).unwrap();

        let doubled = history.map_states(|s| State::from(s.as_vector() * 2.0));
        assert_eq!(doubled.len(), 2);
        assert_eq!(doubled.state_at(10.0).unwrap().x(), 4.0);
        assert!(doubled.contains_epoch(0.0));
        assert!(!doubled.contains_epoch(5.0));
    }
}
