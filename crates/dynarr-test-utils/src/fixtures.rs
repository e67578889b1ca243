//! Instrumented element type and panic helpers.
//!
//! The ledger is thread-local: libtest runs each test on its own thread,
//! so tests never see each other's counts. Call [`reset`] at the start of
//! a test (and of each proptest case).

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

struct Ledger {
    constructed: Cell<usize>,
    cloned: Cell<usize>,
    dropped: Cell<usize>,
    /// Constructions left before the armed one panics.
    fuse: Cell<Option<usize>>,
}

thread_local! {
    static LEDGER: Ledger = const {
        Ledger {
            constructed: Cell::new(0),
            cloned: Cell::new(0),
            dropped: Cell::new(0),
            fuse: Cell::new(None),
        }
    };
}

/// Snapshot of the current thread's ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    /// Successful constructions, clones included.
    pub constructed: usize,
    /// Successful clones.
    pub cloned: usize,
    /// Drops.
    pub dropped: usize,
}

impl Counts {
    /// Values constructed and not yet dropped.
    pub fn live(&self) -> usize {
        self.constructed - self.dropped
    }
}

/// Zero the ledger and disarm any pending panic.
pub fn reset() {
    LEDGER.with(|l| {
        l.constructed.set(0);
        l.cloned.set(0);
        l.dropped.set(0);
        l.fuse.set(None);
    });
}

/// Read the ledger.
pub fn counts() -> Counts {
    LEDGER.with(|l| Counts {
        constructed: l.constructed.get(),
        cloned: l.cloned.get(),
        dropped: l.dropped.get(),
    })
}

/// Make the `k`-th construction from now (1-based, clones included) panic.
///
/// The panicking construction does not produce a value and is not counted.
pub fn panic_on_construction(k: usize) {
    assert!(k >= 1, "construction index is 1-based");
    LEDGER.with(|l| l.fuse.set(Some(k)));
}

/// Cancel a pending [`panic_on_construction`].
pub fn disarm() {
    LEDGER.with(|l| l.fuse.set(None));
}

fn record_construction(is_clone: bool) {
    LEDGER.with(|l| {
        match l.fuse.get() {
            Some(1) => {
                l.fuse.set(None);
                panic!("Tracked: armed construction panicked");
            }
            Some(n) => l.fuse.set(Some(n - 1)),
            None => {}
        }
        l.constructed.set(l.constructed.get() + 1);
        if is_clone {
            l.cloned.set(l.cloned.get() + 1);
        }
    });
}

/// An element that reports its lifecycle to the thread's ledger.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tracked {
    value: i64,
}

impl Tracked {
    /// Construct a value. Panics if the ledger is armed for this construction.
    pub fn new(value: i64) -> Self {
        record_construction(false);
        Self { value }
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        record_construction(true);
        Self { value: self.value }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LEDGER.with(|l| l.dropped.set(l.dropped.get() + 1));
    }
}

/// Run `f`, returning `true` if it panicked.
pub fn panics<R>(f: impl FnOnce() -> R) -> bool {
    catch_unwind(AssertUnwindSafe(f)).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_counts_lifecycle() {
        reset();
        let a = Tracked::new(1);
        let b = a.clone();
        drop(a);
        assert_eq!(
            counts(),
            Counts {
                constructed: 2,
                cloned: 1,
                dropped: 1
            }
        );
        assert_eq!(counts().live(), 1);
        assert_eq!(b.value(), 1);
    }

    #[test]
    fn armed_construction_panics_once() {
        reset();
        panic_on_construction(2);
        let first = Tracked::new(1);
        assert!(panics(|| Tracked::new(2)));
        let third = Tracked::new(3);
        assert_eq!(counts().constructed, 2);
        drop((first, third));
        assert_eq!(counts().live(), 0);
    }

    #[test]
    fn disarm_cancels_fuse() {
        reset();
        panic_on_construction(1);
        disarm();
        assert!(!panics(|| Tracked::new(0)));
    }
}
