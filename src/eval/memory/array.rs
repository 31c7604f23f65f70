//! A simple growable stack of handles
//!
//! Frames, the collector's gray worklist, the frame stack and the
//! master object list all need a crude vector with an explicit
//! doubling growth policy. `Stack` stores bare copies of whatever it
//! is given and owns none of the objects they might designate.
//!
//! Entries may be nulled in place (see [`Stack::take`]) and compacted
//! away later with [`Stack::remove_nulls`].

use std::fmt::Debug;

use thiserror::Error;

/// Failure to obtain memory for a container or object
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
    /// Requested size cannot be represented
    #[error("bad allocation request")]
    BadRequest,
    /// Allocator refused the request
    #[error("out of memory")]
    OOM,
}

/// Growable stack with doubling growth
///
/// Growth failure is reported as an [`AllocError`] and leaves the
/// stack exactly as it was before the push.
#[derive(Clone)]
pub struct Stack<T> {
    /// Logical capacity, doubled on overflow
    capacity: usize,
    /// Entries, `None` where nulled
    data: Vec<Option<T>>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Stack::with_capacity(1)
    }
}

impl<T> Stack<T> {
    /// New empty stack with a logical capacity of `capacity` entries
    /// (at least one)
    ///
    /// Storage is reserved as entries arrive, so an oversized capacity
    /// costs nothing until it is used.
    pub fn with_capacity(capacity: usize) -> Self {
        Stack {
            capacity: capacity.max(1),
            data: Vec::new(),
        }
    }

    /// Number of entries, including nulled entries not yet compacted
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add an item at the end, doubling capacity if full
    pub fn push(&mut self, item: T) -> Result<(), AllocError> {
        if self.data.len() == self.capacity {
            self.grow()?;
        }
        if self.data.len() == self.data.capacity() {
            self.data.try_reserve(1).map_err(|_| AllocError::OOM)?;
        }
        self.data.push(Some(item));
        Ok(())
    }

    /// Remove and return the final item (if any)
    ///
    /// A nulled final entry is popped and reported as `None`.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop().flatten()
    }

    /// Return the final item
    pub fn top(&self) -> Option<&T> {
        self.data.last().and_then(Option::as_ref)
    }

    /// Return item at index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index).and_then(Option::as_ref)
    }

    /// Return item at index mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    /// Null out the entry at index, returning what was there
    pub fn take(&mut self, index: usize) -> Option<T> {
        self.data.get_mut(index).and_then(Option::take)
    }

    /// Iterate over non-null entries in order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter().flatten()
    }

    /// Compact the stack, dropping null entries and preserving the
    /// relative order of the remainder
    pub fn remove_nulls(&mut self) {
        self.data.retain(Option::is_some);
    }

    fn grow(&mut self) -> Result<(), AllocError> {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .ok_or(AllocError::BadRequest)?;
        self.data
            .try_reserve_exact(new_capacity - self.data.len())
            .map_err(|_| AllocError::OOM)?;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T: Copy> Stack<T> {
    /// Copy out the item at index
    pub fn at(&self, index: usize) -> Option<T> {
        self.get(index).copied()
    }
}

impl<T: Debug> Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

#[cfg(test)]
pub mod tests {

    use super::*;

    #[test]
    pub fn test_simple_stack_ops() {
        let mut stack = Stack::with_capacity(8);
        for i in 0..128 {
            stack.push(i).unwrap();
        }
        assert_eq!(stack.len(), 128);
        assert_eq!(stack.capacity(), 128);

        for _i in 0..64 {
            stack.pop();
        }
        assert_eq!(stack.top(), Some(&63));
    }

    #[test]
    pub fn test_capacity_doubles_on_overflow() {
        let mut stack = Stack::with_capacity(1);
        stack.push('a').unwrap();
        assert_eq!(stack.capacity(), 1);
        stack.push('b').unwrap();
        assert_eq!(stack.capacity(), 2);
        stack.push('c').unwrap();
        assert_eq!(stack.capacity(), 4);
    }

    #[test]
    pub fn test_zero_capacity_is_clamped() {
        let stack: Stack<u8> = Stack::with_capacity(0);
        assert_eq!(stack.capacity(), 1);
    }

    #[test]
    pub fn test_pop_empty() {
        let mut stack: Stack<u32> = Stack::with_capacity(4);
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    pub fn test_remove_nulls_preserves_order() {
        let mut stack = Stack::with_capacity(2);
        for i in 0..10 {
            stack.push(i).unwrap();
        }
        for i in (0..10).step_by(3) {
            assert_eq!(stack.take(i), Some(i));
        }
        assert_eq!(stack.len(), 10);
        assert_eq!(stack.take(0), None);

        stack.remove_nulls();
        assert_eq!(stack.len(), 6);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5, 7, 8]);
    }

    #[test]
    pub fn test_iter_skips_nulls() {
        let mut stack = Stack::with_capacity(4);
        stack.push("x").unwrap();
        stack.push("y").unwrap();
        stack.take(0);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![&"y"]);
        assert_eq!(stack.at(0), None);
        assert_eq!(stack.at(1), Some("y"));
    }

    #[test]
    pub fn test_oversized_capacity_reserves_lazily() {
        let mut stack = Stack::with_capacity(usize::MAX / 4);
        stack.push(1u64).unwrap();
        stack.push(2u64).unwrap();
        assert_eq!(stack.capacity(), usize::MAX / 4);
        assert_eq!(stack.pop(), Some(2));
    }

    #[test]
    pub fn test_unrepresentable_growth_is_bad_request() {
        let mut stack = Stack::with_capacity(1);
        stack.push(7u32).unwrap();
        stack.capacity = usize::MAX / 2 + 1;

        assert_eq!(stack.grow(), Err(AllocError::BadRequest));
        assert_eq!(stack.capacity(), usize::MAX / 2 + 1);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    pub fn test_refused_growth_is_oom() {
        let mut stack = Stack::with_capacity(1);
        stack.push(7u32).unwrap();
        stack.capacity = usize::MAX / 4;

        assert_eq!(stack.grow(), Err(AllocError::OOM));
        assert_eq!(stack.capacity(), usize::MAX / 4);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top(), Some(&7));
    }
}
