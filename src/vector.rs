//!
//! `Vector` Wrapper of fixed size table
//!
//!
use crate::error::{Result, TrellisError};
use std::ops::{Index, IndexMut};
pub mod dense;
pub mod index;
pub use dense::DenseStorage;
pub use index::Indexable;
use std::marker::PhantomData;

/// Backend storage of `Vector`
/// an abstruction of a vec with fixed size that is readable/writable
/// by index.
///
/// * `try_new`
///     create storage with fixed size and filled with the default value,
///     reporting allocation failure instead of aborting
/// * `size`
///     get the fixed size
/// * `get`
///     get the reference to the value in the index
/// * `get_mut`
///     get the mutable reference to the value in the index
/// * `fill`
///     overwrite all values with the given value
///
pub trait Storage: Clone + Sized {
    /// Item type that this storage stores.
    ///
    type Item: Copy + PartialEq;
    ///
    /// Create a new storage with fixed size and filled with the default value
    fn try_new(size: usize, default_value: Self::Item) -> Result<Self>;
    ///
    /// Get the size of this storage
    fn size(&self) -> usize;
    ///
    /// Get the reference to the value at the given index
    fn get(&self, index: usize) -> &Self::Item;
    ///
    /// Get the mutable reference to the given index
    fn get_mut(&mut self, index: usize) -> &mut Self::Item;
    ///
    /// Overwrite all elements
    fn fill(&mut self, value: Self::Item);
    ///
    /// Slice view of the elements in index order
    fn as_slice(&self) -> &[Self::Item];
    ///
    /// Mutable slice view of the elements in index order
    fn as_mut_slice(&mut self) -> &mut [Self::Item];
}

/// `Vector` struct
///
/// It generalized of
///
/// 1. item type `Storage::Item`
/// 2. backend storage `S: Storage`
/// 3. index type `Ix: Indexable`
///
#[derive(Clone, Debug)]
pub struct Vector<S: Storage, Ix: Indexable = usize> {
    /// Backend storage of the Vector
    storage: S,
    /// Hidden marker of index type
    ty: PhantomData<Ix>,
}

/// Vector indexed by the state of the model
pub type StateVec<S> = Vector<S, crate::common::StateIndex>;

impl<S: Storage, Ix: Indexable> Vector<S, Ix> {
    /// Create a new Vector, with fixed size and filled by default_value.
    ///
    /// Fails with `TrellisError::OutOfMemory` if the allocation is refused.
    pub fn try_new(size: usize, default_value: S::Item) -> Result<Vector<S, Ix>> {
        Ok(Vector {
            storage: S::try_new(size, default_value)?,
            ty: PhantomData,
        })
    }
    /// Get an (virtual) size of the storage
    pub fn len(&self) -> usize {
        self.storage.size()
    }
    /// Is the vector of size zero?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Get an iterator on (index, item).
    pub fn iter<'a>(&'a self) -> impl 'a + Iterator<Item = (Ix, S::Item)> {
        self.storage
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &v)| (Ix::new(i), v))
    }
    /// Overwrite all elements by the value
    pub fn fill(&mut self, value: S::Item) {
        self.storage.fill(value)
    }
    /// Slice of all elements in index order
    pub fn as_slice(&self) -> &[S::Item] {
        self.storage.as_slice()
    }
    /// Mutable slice of all elements in index order
    pub fn as_mut_slice(&mut self) -> &mut [S::Item] {
        self.storage.as_mut_slice()
    }
}

/// Implement index access, vec[i]
impl<S: Storage, Ix: Indexable> Index<Ix> for Vector<S, Ix> {
    type Output = S::Item;
    fn index(&self, index: Ix) -> &Self::Output {
        self.storage.get(index.index())
    }
}

/// Implement index write access, vec[i] = 10
impl<S: Storage, Ix: Indexable> IndexMut<Ix> for Vector<S, Ix> {
    fn index_mut(&mut self, index: Ix) -> &mut Self::Output {
        self.storage.get_mut(index.index())
    }
}

///
/// Allocate a `Vec` with exactly `n` capacity, or report the failure
///
pub fn try_alloc<T>(what: &'static str, n: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|_| TrellisError::out_of_memory(what, n))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::si;
    use crate::prob::{p, Prob};

    #[test]
    fn state_vec_index() {
        let mut v: StateVec<DenseStorage<Prob>> = StateVec::try_new(4, Prob::zero()).unwrap();
        assert_eq!(v.len(), 4);
        v[si(2)] = p(0.5);
        assert_eq!(v[si(2)], p(0.5));
        assert!(v[si(0)].is_zero());
        let nonzero: Vec<_> = v.iter().filter(|(_, x)| !x.is_zero()).collect();
        assert_eq!(nonzero, vec![(si(2), p(0.5))]);
        v.fill(Prob::zero());
        assert!(v.iter().all(|(_, x)| x.is_zero()));
    }
    #[test]
    fn try_alloc_huge_fails() {
        let r: Result<Vec<u64>> = try_alloc("huge", usize::MAX / 2);
        assert!(matches!(r, Err(TrellisError::OutOfMemory { .. })));
    }
}
