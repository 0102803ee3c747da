//! Coverage reports produced by [`crate::Machine::run_with_coverage`]
//! (spec.md §4.4 "Coverage Mode").

use crate::error::Error;

/// One bit per instruction index, set when that instruction was
/// dispatched during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    bits: Vec<bool>,
}

impl CoverageReport {
    pub fn new(bits: Vec<bool>) -> CoverageReport {
        CoverageReport { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether `instruction` was dispatched, or `IndexError` if it is not
    /// a valid instruction index into the program this report was built
    /// against (spec.md §7 / SPEC_FULL.md §8).
    pub fn is_covered(&self, instruction: usize) -> Result<bool, Error> {
        self.bits.get(instruction).copied().ok_or(Error::IndexError {
            index: instruction,
            len: self.bits.len(),
        })
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn covered(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &hit)| hit)
            .map(|(i, _)| i)
    }

    pub fn uncovered(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &hit)| !hit)
            .map(|(i, _)| i)
    }

    pub fn is_fully_covered(&self) -> bool {
        self.bits.iter().all(|&hit| hit)
    }

    /// OR another report of the same length into this one, accumulating
    /// coverage across a whole test suite (spec.md §8: "for a program
    /// where every instruction is reachable, an exhaustive test suite can
    /// drive the tuple to all-true" — which only happens if results from
    /// separate test cases get combined).
    pub fn merge(&mut self, other: &CoverageReport) {
        assert_eq!(
            self.bits.len(),
            other.bits.len(),
            "coverage reports must cover the same instruction stream"
        );
        for (a, &b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ors_bits() {
        let mut a = CoverageReport::new(vec![true, false, false]);
        let b = CoverageReport::new(vec![false, true, false]);
        a.merge(&b);
        assert_eq!(a.as_slice(), &[true, true, false]);
        assert!(!a.is_fully_covered());
    }

    #[test]
    fn covered_and_uncovered_partition_indices() {
        let report = CoverageReport::new(vec![true, false, true]);
        assert_eq!(report.covered().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(report.uncovered().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn is_covered_reports_hit_and_miss() {
        let report = CoverageReport::new(vec![true, false]);
        assert_eq!(report.is_covered(0), Ok(true));
        assert_eq!(report.is_covered(1), Ok(false));
    }

    #[test]
    fn is_covered_out_of_range_is_an_index_error() {
        let report = CoverageReport::new(vec![true, false]);
        assert_eq!(
            report.is_covered(2),
            Err(Error::IndexError { index: 2, len: 2 })
        );
    }
}
