//! Rollback guard for runs of in-place construction.
//!
//! [`InitGuard`] records how many slots of a run have been constructed so
//! far. If user code panics before [`InitGuard::commit`], unwinding drops
//! exactly those slots and nothing else, leaving the run uninitialised
//! again. The caller decides what the committed run means (a new length,
//! a block ready to swap in).

#![allow(unsafe_code)]

use std::mem;
use std::ptr;

/// Tracks a run of slots being constructed left to right.
pub(crate) struct InitGuard<T> {
    start: *mut T,
    reserved: usize,
    initialized: usize,
}

impl<T> InitGuard<T> {
    /// Start a run of up to `reserved` slots at `start`.
    ///
    /// # Safety
    ///
    /// `start` must be valid for writes of `reserved` consecutive `T`, and
    /// those slots must be uninitialised and not otherwise accessed while
    /// the guard lives.
    pub(crate) unsafe fn new(start: *mut T, reserved: usize) -> Self {
        Self {
            start,
            reserved,
            initialized: 0,
        }
    }

    /// Construct the next slot of the run.
    pub(crate) fn push(&mut self, value: T) {
        assert!(self.initialized < self.reserved, "construction run overflow");
        // SAFETY: in bounds and uninitialised per `new`.
        unsafe { self.start.add(self.initialized).write(value) };
        self.initialized += 1;
    }

    /// Keep the constructed slots and return how many there are.
    pub(crate) fn commit(self) -> usize {
        let count = self.initialized;
        mem::forget(self);
        count
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        let built = ptr::slice_from_raw_parts_mut(self.start, self.initialized);
        // SAFETY: exactly the first `initialized` slots are live.
        unsafe { ptr::drop_in_place(built) };
    }
}

/// Construct `count` elements starting at `dst`, element `i` from `f(i)`.
///
/// If `f` panics, every element built by this call is dropped before the
/// panic propagates and the slots are uninitialised again.
///
/// # Safety
///
/// Same contract as [`InitGuard::new`] with `reserved = count`.
pub(crate) unsafe fn construct_n<T, F>(dst: *mut T, count: usize, mut f: F)
where
    F: FnMut(usize) -> T,
{
    // SAFETY: forwarded from the caller.
    let mut guard = unsafe { InitGuard::new(dst, count) };
    for i in 0..count {
        guard.push(f(i));
    }
    guard.commit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::MaybeUninit;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;

    #[test]
    fn committed_run_stays_live() {
        let mut buf: [MaybeUninit<String>; 3] = [const { MaybeUninit::uninit() }; 3];
        let dst = buf.as_mut_ptr().cast::<String>();
        unsafe { construct_n(dst, 3, |i| i.to_string()) };
        let values: Vec<String> = buf
            .iter()
            .map(|slot| unsafe { slot.assume_init_read() })
            .collect();
        assert_eq!(values, ["0", "1", "2"]);
    }

    #[test]
    fn panic_drops_exactly_the_constructed_prefix() {
        let witness = Rc::new(());
        let mut buf: [MaybeUninit<Rc<()>>; 4] = [const { MaybeUninit::uninit() }; 4];
        let dst = buf.as_mut_ptr().cast::<Rc<()>>();

        let result = catch_unwind(AssertUnwindSafe(|| unsafe {
            construct_n(dst, 4, |i| {
                if i == 2 {
                    panic!("third construction fails");
                }
                Rc::clone(&witness)
            })
        }));

        assert!(result.is_err());
        // Both clones built before the panic were dropped by the guard.
        assert_eq!(Rc::strong_count(&witness), 1);
    }

    #[test]
    #[should_panic(expected = "construction run overflow")]
    fn pushing_past_reservation_panics() {
        let mut buf: [MaybeUninit<u8>; 1] = [MaybeUninit::uninit()];
        let mut guard = unsafe { InitGuard::new(buf.as_mut_ptr().cast::<u8>(), 1) };
        guard.push(1);
        guard.push(2);
    }
}
