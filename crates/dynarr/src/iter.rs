//! Owning iterator over a [`DynArray`](crate::DynArray).

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use crate::raw::RawBlock;

/// Yields the elements of a [`DynArray`](crate::DynArray) by value.
///
/// Slots `[head, tail)` of the block are still live. Elements that are
/// never yielded are dropped with the iterator, then the block is released.
pub struct IntoIter<T> {
    storage: RawBlock<T>,
    head: usize,
    tail: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(storage: RawBlock<T>, len: usize) -> Self {
        debug_assert!(len <= storage.capacity());
        Self {
            storage,
            head: 0,
            tail: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[head, tail)` is live and within the block.
        unsafe { slice::from_raw_parts(self.storage.offset(self.head), self.tail - self.head) }
    }

    /// The elements not yet yielded, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`; `&mut self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.storage.offset(self.head), self.tail - self.head) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        // SAFETY: `head < tail`, so the slot is live; advancing `head`
        // moves it out of the live range before anything else can read it.
        let value = unsafe { self.storage.slot(self.head).read() };
        self.head += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tail - self.head;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        // SAFETY: slot `tail` was the last live one and is now outside the range.
        Some(unsafe { self.storage.slot(self.tail).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        self.head = self.tail;
        // SAFETY: the remaining live elements are dropped once; the range is
        // emptied first so a panicking destructor cannot repeat a drop.
        unsafe { ptr::drop_in_place(remaining) };
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
