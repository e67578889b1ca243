//! Benchmark workloads for the dynarr growable array.
//!
//! Provides deterministic operation scripts and a [`Sequence`] adapter so
//! the same workload runs against [`DynArray`], `Vec` and `SmallVec`:
//!
//! - [`script`]: seeded mix of push, insert, erase and pop steps
//! - [`run_script`]: replays a script and returns a checksum

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dynarr::DynArray;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

/// One step of a benchmark script.
///
/// Positions are raw draws, reduced modulo the live length at replay time
/// so every script is valid for every container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    PushBack(u64),
    Insert { at: u32, value: u64 },
    Erase { at: u32 },
    PopBack,
}

/// Build a deterministic script of `len` steps.
///
/// Weights: 50% push, 20% insert, 20% erase, 10% pop. Erase and pop on an
/// empty container are skipped at replay time.
pub fn script(seed: u64, len: usize) -> Vec<Step> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let roll = rng.next_u32() % 10;
            match roll {
                0..=4 => Step::PushBack(rng.next_u64()),
                5 | 6 => Step::Insert {
                    at: rng.next_u32(),
                    value: rng.next_u64(),
                },
                7 | 8 => Step::Erase { at: rng.next_u32() },
                _ => Step::PopBack,
            }
        })
        .collect()
}

/// The operations a benchmark script needs from a container.
pub trait Sequence: Default {
    fn len(&self) -> usize;
    fn push_back(&mut self, value: u64);
    fn insert(&mut self, index: usize, value: u64);
    fn erase(&mut self, index: usize) -> u64;
    fn pop_back(&mut self) -> Option<u64>;
}

impl Sequence for DynArray<u64> {
    fn len(&self) -> usize {
        DynArray::len(self)
    }

    fn push_back(&mut self, value: u64) {
        DynArray::push_back(self, value);
    }

    fn insert(&mut self, index: usize, value: u64) {
        DynArray::insert(self, index, value);
    }

    fn erase(&mut self, index: usize) -> u64 {
        DynArray::erase(self, index)
    }

    fn pop_back(&mut self) -> Option<u64> {
        DynArray::pop_back(self)
    }
}

impl Sequence for Vec<u64> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn push_back(&mut self, value: u64) {
        self.push(value);
    }

    fn insert(&mut self, index: usize, value: u64) {
        Vec::insert(self, index, value);
    }

    fn erase(&mut self, index: usize) -> u64 {
        self.remove(index)
    }

    fn pop_back(&mut self) -> Option<u64> {
        self.pop()
    }
}

impl Sequence for SmallVec<[u64; 16]> {
    fn len(&self) -> usize {
        SmallVec::len(self)
    }

    fn push_back(&mut self, value: u64) {
        self.push(value);
    }

    fn insert(&mut self, index: usize, value: u64) {
        SmallVec::insert(self, index, value);
    }

    fn erase(&mut self, index: usize) -> u64 {
        self.remove(index)
    }

    fn pop_back(&mut self) -> Option<u64> {
        self.pop()
    }
}

/// Replay `steps` against a fresh `S` and return a checksum of everything
/// removed plus the final length.
pub fn run_script<S: Sequence>(steps: &[Step]) -> u64 {
    let mut seq = S::default();
    let mut checksum = 0u64;
    for &step in steps {
        match step {
            Step::PushBack(value) => seq.push_back(value),
            Step::Insert { at, value } => {
                let index = at as usize % (seq.len() + 1);
                seq.insert(index, value);
            }
            Step::Erase { at } => {
                if seq.len() > 0 {
                    let index = at as usize % seq.len();
                    checksum = checksum.wrapping_add(seq.erase(index));
                }
            }
            Step::PopBack => {
                if let Some(value) = seq.pop_back() {
                    checksum = checksum.wrapping_add(value);
                }
            }
        }
    }
    checksum.wrapping_add(seq.len() as u64)
}
