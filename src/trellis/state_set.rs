//!
//! Set of active states
//!
use crate::common::StateIndex;
use fixedbitset::FixedBitSet;

///
/// Collection of state indices backed by a bit set.
///
/// The capacity is the number of states of the model and grows on insert
/// if a larger index is given.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSet(FixedBitSet);

impl StateSet {
    ///
    /// Empty set that can hold states `0..n_states`.
    ///
    pub fn new(n_states: usize) -> StateSet {
        StateSet(FixedBitSet::with_capacity(n_states))
    }
    ///
    /// Set containing all states `0..n_states`.
    ///
    pub fn all(n_states: usize) -> StateSet {
        let mut set = FixedBitSet::with_capacity(n_states);
        set.insert_range(..);
        StateSet(set)
    }
    ///
    /// Create from an iterator of states.
    ///
    pub fn from_states<I: IntoIterator<Item = StateIndex>>(n_states: usize, states: I) -> StateSet {
        let mut set = StateSet::new(n_states);
        for state in states {
            set.insert(state);
        }
        set
    }
    pub fn insert(&mut self, state: StateIndex) {
        self.0.grow(state.index() + 1);
        self.0.insert(state.index());
    }
    pub fn contains(&self, state: StateIndex) -> bool {
        self.0.contains(state.index())
    }
    ///
    /// `self = self ∪ other`
    ///
    pub fn union_with(&mut self, other: &StateSet) {
        self.0.union_with(&other.0);
    }
    pub fn clear(&mut self) {
        self.0.clear();
    }
    pub fn len(&self) -> usize {
        self.0.count_ones(..)
    }
    pub fn is_empty(&self) -> bool {
        self.0.count_ones(..) == 0
    }
    ///
    /// Iterator of states in ascending index order
    ///
    pub fn iter(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.0.ones().map(StateIndex::new)
    }
}

impl std::fmt::Display for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let states: Vec<String> = self.iter().map(|s| s.index().to_string()).collect();
        write!(f, "{{{}}}", states.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::si;

    #[test]
    fn state_set_ops() {
        let mut a = StateSet::from_states(5, vec![si(0), si(3)]);
        let b = StateSet::from_states(5, vec![si(3), si(4)]);
        assert_eq!(a.len(), 2);
        assert!(a.contains(si(3)));
        assert!(!a.contains(si(4)));
        a.union_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![si(0), si(3), si(4)]);
        assert_eq!(a.to_string(), "{0,3,4}");
        a.clear();
        assert!(a.is_empty());
        assert_eq!(StateSet::all(3).len(), 3);
    }
    #[test]
    fn state_set_grows() {
        let mut a = StateSet::new(2);
        a.insert(si(10));
        assert!(a.contains(si(10)));
        // out of capacity is just not contained
        assert!(!a.contains(si(100)));
        let mut b = StateSet::new(1);
        b.union_with(&a);
        assert!(b.contains(si(10)));
    }
}
