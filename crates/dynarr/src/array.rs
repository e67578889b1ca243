//! The growable array built on [`RawBlock`].
//!
//! A [`DynArray`] is a block of raw storage plus a length. Slots
//! `[0, len)` are live, slots `[len, capacity)` are uninitialised. Every
//! mutating operation either commits fully or leaves the array untouched:
//! user code that can panic (element closures, `Default`, `Clone`) always
//! runs before the first element is relocated or storage is swapped.
//!
//! Relocating a live element is a bitwise move and cannot fail, so growth
//! never needs a clone fallback.

#![allow(unsafe_code)]

use std::borrow::{Borrow, BorrowMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use crate::error::StorageError;
use crate::guard::construct_n;
use crate::iter::IntoIter;
use crate::raw::RawBlock;

/// A contiguous, growable array of `T`.
///
/// Indexing, slicing and borrowing iteration come from `Deref<Target = [T]>`.
pub struct DynArray<T> {
    storage: RawBlock<T>,
    len: usize,
}

#[cold]
#[track_caller]
fn index_out_of_bounds(op: &str, index: usize, bound: &str, len: usize) -> ! {
    panic!("{op} index (is {index}) should be {bound} len (is {len})");
}

impl<T> DynArray<T> {
    /// Capacity of the first allocation made by a push into an empty array.
    pub const MIN_NON_ZERO_CAPACITY: usize = 1;

    /// Capacity multiplier applied when a push finds the array full.
    pub const GROWTH_FACTOR: usize = 2;

    /// An empty array. Does not allocate.
    pub const fn new() -> Self {
        Self {
            storage: RawBlock::new(),
            len: 0,
        }
    }

    /// An empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|e| e.escalate())
    }

    /// Fallible [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        Ok(Self {
            storage: RawBlock::allocate(capacity)?,
            len: 0,
        })
    }

    /// An array of `len` elements where element `i` is `f(i)`.
    ///
    /// Capacity is exactly `len`. If `f` panics, the elements built so far
    /// are dropped and the block is released before the panic propagates.
    pub fn from_fn<F>(len: usize, f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        let storage: RawBlock<T> = RawBlock::allocate(len).unwrap_or_else(|e| e.escalate());
        // SAFETY: the fresh block has `len` uninitialised slots.
        unsafe { construct_n(storage.offset(0), len, f) };
        Self { storage, len }
    }

    /// An array of `len` default-constructed elements.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_fn(len, |_| T::default())
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Pointer to the first element. Dangling when nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Mutable pointer to the first element.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is live and the base is aligned and non-null.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`, and `&mut self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Grow capacity to exactly `new_capacity` if it is currently smaller.
    ///
    /// Live elements are relocated into the new block; the old block is
    /// released. A no-op when `new_capacity <= capacity()`.
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(e) = self.try_reserve(new_capacity) {
            e.escalate();
        }
    }

    /// Fallible [`reserve`](Self::reserve). On error nothing changes.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), StorageError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let fresh = RawBlock::allocate(new_capacity)?;
        self.relocate_into(fresh);
        Ok(())
    }

    /// Relocate `[0, len)` into the front of `fresh` and adopt it as storage.
    fn relocate_into(&mut self, mut fresh: RawBlock<T>) {
        debug_assert!(fresh.capacity() >= self.len);
        // SAFETY: `fresh` is a distinct allocation with room for every live
        // element. The old slots become logically uninitialised and are
        // released below without being dropped.
        unsafe {
            ptr::copy_nonoverlapping(self.storage.as_ptr(), fresh.offset(0), self.len);
        }
        self.storage.swap(&mut fresh);
    }

    /// Set the length to `new_len`.
    ///
    /// Shrinking drops the trailing elements. Growing appends values from
    /// `f`; if `f` panics, the values appended so far are dropped and the
    /// array (length, capacity and contents) is left as it was.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        let len = self.len;
        let extra = new_len - len;
        if new_len > self.capacity() {
            let fresh: RawBlock<T> = RawBlock::allocate(new_len).unwrap_or_else(|e| e.escalate());
            // SAFETY: `[len, new_len)` of the fresh block is uninitialised.
            // A panic releases `fresh` and never touches `self`.
            unsafe { construct_n(fresh.offset(len), extra, |_| f()) };
            self.relocate_into(fresh);
        } else {
            // SAFETY: `[len, new_len)` is uninitialised spare capacity.
            unsafe { construct_n(self.storage.offset(len), extra, |_| f()) };
        }
        self.len = new_len;
    }

    /// Set the length to `new_len`, appending default values when growing.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Drop every element at or after `new_len`. Capacity is kept.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        // SAFETY: `[new_len, len)` is live. The length is lowered first so a
        // panicking destructor cannot lead to a second drop.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.storage.offset(new_len), self.len - new_len);
            self.len = new_len;
            ptr::drop_in_place(tail);
        }
    }

    /// Drop every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Construct a value from `f` at `index`, shifting later elements right.
    ///
    /// Returns the new element. When the array is full, capacity becomes
    /// twice the current length (or [`MIN_NON_ZERO_CAPACITY`] when empty).
    /// If `f` panics, the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// [`MIN_NON_ZERO_CAPACITY`]: Self::MIN_NON_ZERO_CAPACITY
    #[track_caller]
    pub fn emplace<F>(&mut self, index: usize, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        match self.try_emplace(index, f) {
            Ok(slot) => slot,
            Err(e) => e.escalate(),
        }
    }

    /// Fallible [`emplace`](Self::emplace). On error `f` is not called and
    /// nothing changes.
    #[track_caller]
    pub fn try_emplace<F>(&mut self, index: usize, f: F) -> Result<&mut T, StorageError>
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        if index > len {
            index_out_of_bounds("emplace", index, "<=", len);
        }
        if len == self.capacity() {
            self.emplace_grow(index, f)?;
        } else if index == len {
            let value = f();
            // SAFETY: `len < capacity`, so slot `len` is spare.
            unsafe { self.storage.slot(len).write(value) };
        } else {
            // Build first: if `f` panics no element has moved yet.
            let value = f();
            // SAFETY: `len < capacity`, so shifting `[index, len)` up by one
            // stays in bounds. Slot `index` is then a stale duplicate that
            // is overwritten without being dropped.
            unsafe {
                let at = self.storage.slot(index);
                ptr::copy(at, at.add(1), len - index);
                at.write(value);
            }
        }
        self.len += 1;
        // SAFETY: `index < len` now, and the slot is live.
        Ok(unsafe { &mut *self.storage.slot(index) })
    }

    /// Full-array emplace: build the new element in a fresh block, then
    /// relocate the prefix and suffix around it.
    ///
    /// Only the first stage runs user code. If it panics `fresh` is dropped,
    /// which releases the block; the old block was never touched.
    fn emplace_grow<F>(&mut self, index: usize, f: F) -> Result<(), StorageError>
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        let mut fresh: RawBlock<T> = RawBlock::allocate(self.grown_capacity()?)?;
        let value = f();
        // SAFETY: `index <= len < fresh.capacity()`. The prefix `[0, index)`
        // and suffix `[index, len)` land on either side of the new element,
        // in a block distinct from the old one.
        unsafe {
            fresh.slot(index).write(value);
            let old = self.storage.as_ptr();
            ptr::copy_nonoverlapping(old, fresh.offset(0), index);
            ptr::copy_nonoverlapping(old.add(index), fresh.offset(index + 1), len - index);
        }
        self.storage.swap(&mut fresh);
        Ok(())
    }

    fn grown_capacity(&self) -> Result<usize, StorageError> {
        if self.len == 0 {
            return Ok(Self::MIN_NON_ZERO_CAPACITY);
        }
        self.len
            .checked_mul(Self::GROWTH_FACTOR)
            .ok_or(StorageError::CapacityOverflow {
                requested: self.len,
            })
    }

    /// Insert `value` at `index`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, || value)
    }

    /// Construct a value from `f` at the end.
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        self.emplace(len, f)
    }

    /// Append `value`.
    pub fn push_back(&mut self, value: T) {
        self.emplace_back(|| value);
    }

    /// Fallible [`push_back`](Self::push_back). On error `value` is dropped
    /// and the array is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<(), StorageError> {
        let len = self.len;
        self.try_emplace(len, || value).map(|_| ())
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was the last live element and is now outside
        // the live range, so it is read exactly once.
        Some(unsafe { self.storage.slot(self.len).read() })
    }

    /// Remove and return the element at `index`, shifting later elements
    /// left. Never reallocates.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> T {
        let len = self.len;
        if index >= len {
            index_out_of_bounds("erase", index, "<", len);
        }
        // SAFETY: `index < len`. The value is read out, then `(index, len)`
        // slides down over it; the old last slot is left as a stale copy
        // outside the new live range.
        unsafe {
            let at = self.storage.slot(index);
            let value = at.read();
            ptr::copy(at.add(1), at, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Exchange contents (storage and length) with `other`. O(1).
    pub fn swap(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // SAFETY: drops each live element exactly once; `storage` then
        // releases the block in its own `Drop`.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynArray<T> {
    /// Deep copy with capacity equal to the source length.
    fn clone(&self) -> Self {
        let source = self.as_slice();
        Self::from_fn(source.len(), |i| source[i].clone())
    }

    /// Copy `source` into `self`, reusing the existing block when it is
    /// large enough.
    ///
    /// When `source` does not fit, a full copy is built aside and swapped
    /// in, so a panicking `clone` leaves `self` untouched. Otherwise live
    /// elements are overwritten with `clone_from` and the remainder is
    /// either dropped or cloned into spare slots.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap(&mut copy);
            return;
        }
        if source.len <= self.len {
            self.as_mut_slice()[..source.len].clone_from_slice(source);
            self.truncate(source.len);
            return;
        }
        let (head, tail) = source.split_at(self.len);
        // SAFETY: `[len, source.len)` is spare capacity, checked above.
        unsafe { construct_n(self.storage.offset(self.len), tail.len(), |i| tail[i].clone()) };
        self.len = source.len;
        self.as_mut_slice()[..head.len()].clone_from_slice(head);
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U> PartialEq<DynArray<U>> for DynArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U> PartialEq<[U]> for DynArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for DynArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: Hash> Hash for DynArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for DynArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T> Borrow<[T]> for DynArray<T> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T> BorrowMut<[T]> for DynArray<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let needed = self.len.saturating_add(lower);
        if needed > self.capacity() {
            let grown = self.grown_capacity().unwrap_or(needed);
            self.reserve(needed.max(grown));
        }
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(source: &[T]) -> Self {
        Self::from_fn(source.len(), |i| source[i].clone())
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(source: [T; N]) -> Self {
        source.into_iter().collect()
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let storage = mem::take(&mut self.storage);
        let len = mem::replace(&mut self.len, 0);
        IntoIter::new(storage, len)
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.iter_mut()
    }
}
