use serde::{Deserialize, Serialize};

/// Default maximum nesting of runtime calls, matching CPython's default recursion limit.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Default ceiling on the size of an integer produced by `pow()`: 8 Mbit, i.e. 1 MiB.
pub const DEFAULT_MAX_INT_BITS: u64 = 8 * 1024 * 1024;

/// Limits enforced by a [`Runtime`](crate::Runtime).
///
/// Exceeding `max_recursion_depth` raises `RecursionError`; an integer power whose estimated
/// result exceeds `max_int_bits` raises `MemoryError` before any work is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_recursion_depth: usize,
    pub max_int_bits: u64,
}

impl ResourceLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[must_use]
    pub fn max_int_bits(mut self, bits: u64) -> Self {
        self.max_int_bits = bits;
        self
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_int_bits: DEFAULT_MAX_INT_BITS,
        }
    }
}
