//! Raw, uninitialised element storage.
//!
//! [`RawBlock`] owns one contiguous allocation sized for a fixed number of
//! `T` slots. It never tracks which slots hold live values: constructing,
//! relocating and dropping elements is the owner's job. Dropping a block
//! releases the memory and nothing else.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::error::StorageError;

/// A fixed-capacity block of uninitialised `T` slots.
///
/// Movable but not clonable: copying the bytes without knowing which slots
/// are live would duplicate ownership. The empty block (capacity 0) holds a
/// dangling pointer and owns no allocation.
///
/// Zero-sized `T` never allocates, but the requested capacity is still
/// recorded so growth bookkeeping behaves the same as for sized types.
pub struct RawBlock<T> {
    base: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

// SAFETY: the block is a unique owner of its slots, exactly like `Box<[T]>`.
unsafe impl<T: Send> Send for RawBlock<T> {}
// SAFETY: shared access to the block only hands out raw pointers.
unsafe impl<T: Sync> Sync for RawBlock<T> {}

impl<T> RawBlock<T> {
    /// The empty block. Does not allocate.
    pub const fn new() -> Self {
        Self {
            base: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate uninitialised storage for `capacity` elements.
    ///
    /// `capacity == 0` returns the empty block. Memory is never initialised.
    pub fn allocate(capacity: usize) -> Result<Self, StorageError> {
        if capacity == 0 {
            return Ok(Self::new());
        }
        let layout = Self::layout_for(capacity)?;
        if layout.size() == 0 {
            return Ok(Self {
                base: NonNull::dangling(),
                capacity,
                _owns: PhantomData,
            });
        }
        // SAFETY: `layout` has non-zero size.
        let ptr = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(ptr.cast::<T>()).ok_or(StorageError::alloc_failed(layout))?;
        Ok(Self {
            base,
            capacity,
            _owns: PhantomData,
        })
    }

    fn layout_for(capacity: usize) -> Result<Layout, StorageError> {
        Layout::array::<T>(capacity).map_err(|_| StorageError::CapacityOverflow {
            requested: capacity,
        })
    }

    /// Number of slots, live or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Base address of the block. Dangling (but aligned) when empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.base.as_ptr()
    }

    /// Mutable base address of the block.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.base.as_ptr()
    }

    /// Pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index < self.capacity()`. Checked in debug builds only.
    #[inline]
    pub unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(
            index < self.capacity,
            "slot {index} out of range for capacity {}",
            self.capacity
        );
        // SAFETY: in bounds of the allocation per the caller's contract.
        unsafe { self.base.as_ptr().add(index) }
    }

    /// Pointer `n` slots past the base. `n == capacity` yields the
    /// one-past-the-end address.
    ///
    /// # Safety
    ///
    /// `n <= self.capacity()`. Checked in debug builds only.
    #[inline]
    pub unsafe fn offset(&self, n: usize) -> *mut T {
        debug_assert!(
            n <= self.capacity,
            "offset {n} out of range for capacity {}",
            self.capacity
        );
        // SAFETY: at most one past the end of the allocation.
        unsafe { self.base.as_ptr().add(n) }
    }

    /// Exchange allocations and capacities with `other`. O(1); no slot is read.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T> Default for RawBlock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawBlock<T> {
    fn drop(&mut self) {
        if self.capacity == 0 || mem::size_of::<T>() == 0 {
            return;
        }
        if let Ok(layout) = Self::layout_for(self.capacity) {
            // SAFETY: `base` came from `alloc::alloc` with this same layout.
            unsafe { alloc::dealloc(self.base.as_ptr().cast::<u8>(), layout) };
        }
    }
}

impl<T> fmt::Debug for RawBlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBlock")
            .field("base", &self.base)
            .field("capacity", &self.capacity)
            .finish()
    }
}
