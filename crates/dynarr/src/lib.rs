//! A contiguous growable array built directly on raw memory.
//!
//! Provides [`DynArray`], an owning sequence with amortised O(1) append,
//! O(1) indexing and O(n) insertion and removal at arbitrary positions,
//! on top of [`RawBlock`], an uninitialised fixed-capacity allocation.
//!
//! # Architecture
//!
//! ```text
//! DynArray<T>
//! ├── RawBlock<T>   (capacity slots, owns the allocation, never drops elements)
//! └── len           (slots [0, len) live, [len, capacity) uninitialised)
//! ```
//!
//! # Panic safety
//!
//! Element construction is user code (`Default`, `Clone`, closures passed
//! to [`DynArray::emplace`] and friends) and may panic. Every growing
//! operation builds into fresh or spare slots under a rollback guard and
//! only then relocates existing elements or swaps storage, so a panic
//! leaves the array's length, capacity and contents as they were. No
//! element is ever dropped twice or leaked.
//!
//! # Unsafe code
//!
//! Denied crate-wide. `raw`, `guard`, `array` and `iter` opt back in; each
//! `unsafe` block states its invariant in a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array;
pub mod error;
mod guard;
pub mod iter;
pub mod raw;

// Public re-exports for the primary API surface.
pub use array::DynArray;
pub use error::StorageError;
pub use iter::IntoIter;
pub use raw::RawBlock;
