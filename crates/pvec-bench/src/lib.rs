//! Workload builders shared by the pvec benchmarks.
//!
//! - [`filled`]: a container of `n` sequential integers built by appending
//! - [`Payload`]: a heap-owning element whose clone is not a bitwise copy

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use pvec::GrowVec;

/// Element counts every benchmark is run at.
pub const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// A container holding `0..n`, grown one append at a time.
pub fn filled(n: usize) -> GrowVec<u64> {
    let mut v = GrowVec::new();
    for i in 0..n as u64 {
        v.push(i).unwrap();
    }
    v
}

/// Element with an owned buffer, so copies allocate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    /// Identifier copied into every clone.
    pub id: u64,
    /// Owned bytes.
    pub bytes: Vec<u8>,
}

impl Payload {
    /// A payload with `len` bytes of deterministic content.
    pub fn new(id: u64, len: usize) -> Self {
        Self {
            id,
            bytes: (0..len).map(|i| (id as usize + i) as u8).collect(),
        }
    }
}
