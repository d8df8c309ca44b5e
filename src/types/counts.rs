//! Memory-traffic accounting.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Number of whole-array reads and writes performed by an operation.
///
/// Counts are at array granularity: reading one variable of a grid field
/// over the full domain counts as one read. They are additive across
/// sub-operations and used only for performance instrumentation, never for
/// control flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessCounts {
    /// Array reads.
    pub reads: usize,
    /// Array writes.
    pub writes: usize,
}

impl AccessCounts {
    /// Create counts from explicit values.
    #[inline]
    pub const fn new(reads: usize, writes: usize) -> Self {
        Self { reads, writes }
    }

    /// No traffic.
    pub const ZERO: Self = Self::new(0, 0);

    /// Counts for copying `n` arrays (one read and one write each).
    #[inline]
    pub const fn copy(n: usize) -> Self {
        Self::new(n, n)
    }
}

impl Add for AccessCounts {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.reads + rhs.reads, self.writes + rhs.writes)
    }
}

impl AddAssign for AccessCounts {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.reads += rhs.reads;
        self.writes += rhs.writes;
    }
}

impl Sum for AccessCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_are_additive() {
        let a = AccessCounts::new(3, 1);
        let b = AccessCounts::copy(2);
        let total = a + b;
        assert_eq!(total, AccessCounts::new(5, 3));

        let summed: AccessCounts = [a, b, AccessCounts::ZERO].into_iter().sum();
        assert_eq!(summed, total);
    }
}
