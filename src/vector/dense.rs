//!
//! Dense storage that uses `std::Vec`
//!
use super::{try_alloc, Storage};
use crate::error::Result;

/// Dense storage powered by `std::Vec`
#[derive(Debug, Clone)]
pub struct DenseStorage<T>(Vec<T>);

impl<T> Storage for DenseStorage<T>
where
    T: Copy + PartialEq,
{
    type Item = T;
    fn try_new(size: usize, default_value: T) -> Result<DenseStorage<T>> {
        let mut v = try_alloc("dense storage", size)?;
        v.resize(size, default_value);
        Ok(DenseStorage(v))
    }
    #[inline]
    fn size(&self) -> usize {
        self.0.len()
    }
    #[inline]
    fn get(&self, index: usize) -> &T {
        &self.0[index]
    }
    #[inline]
    fn get_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
    fn fill(&mut self, value: T) {
        for x in self.0.iter_mut() {
            *x = value;
        }
    }
    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.0
    }
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_storage() {
        // u32
        let mut s: DenseStorage<u32> = DenseStorage::try_new(10, 0).unwrap();
        *s.get_mut(5) = 111;
        *s.get_mut(3) = 22;
        assert_eq!(*s.get(0), 0);
        assert_eq!(*s.get(3), 22);
        assert_eq!(*s.get(5), 111);
        assert_eq!(s.size(), 10);

        // clone
        let mut s2 = s.clone();
        assert_eq!(*s2.get(3), 22);
        *s2.get_mut(3) = 21;
        assert_eq!(*s2.get(3), 21);
        assert_eq!(*s.get(3), 22);

        s.fill(7);
        assert!(s.as_slice().iter().all(|&x| x == 7));
    }
}
