//! Half-open integer ranges and the canonical sets built from them
//! (spec.md §3, component A).

use crate::types::Array;
use std::cmp::Ordering;

/// A half-open interval `[lo, hi)` over non-negative integers (code points
/// plus synthetic ids for end-of-input, end-of-guard, etc).
///
/// Ranges are totally ordered by `lo`; two ranges with the same `lo` never
/// coexist inside a canonical [`SymbolSet`], so that tie never needs
/// breaking in practice, but `Ord` still falls back to `hi` to keep the
/// derive total.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SymbolRange {
  pub lo: u32,
  pub hi: u32,
}

impl SymbolRange {
  pub fn new(lo: u32, hi: u32) -> Self {
    debug_assert!(lo < hi, "symbol range must be non-empty: [{lo}, {hi})");
    Self { lo, hi }
  }

  pub fn single(value: u32) -> Self {
    Self::new(value, value + 1)
  }

  pub fn len(&self) -> u32 {
    self.hi - self.lo
  }

  pub fn contains(&self, value: u32) -> bool {
    value >= self.lo && value < self.hi
  }

  pub fn overlaps(&self, other: &Self) -> bool {
    self.lo < other.hi && other.lo < self.hi
  }

  /// Two ranges that don't overlap but sit edge-to-edge (`[0,5)` and
  /// `[5,9)`) are adjacent: unioning them can't introduce a gap, so a
  /// canonical [`SymbolSet`] merges them into one range.
  pub fn adjacent(&self, other: &Self) -> bool {
    self.hi == other.lo || other.hi == self.lo
  }
}

impl PartialOrd for SymbolRange {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for SymbolRange {
  fn cmp(&self, other: &Self) -> Ordering {
    self.lo.cmp(&other.lo).then(self.hi.cmp(&other.hi))
  }
}

/// An ordered sequence of pairwise-disjoint, non-adjacent ranges.
///
/// Invariant: no two stored ranges touch or overlap, and the ranges are
/// kept in ascending order of `lo`. Every public constructor and mutator
/// restores this invariant before returning.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SymbolSet {
  ranges: Array<SymbolRange>,
}

impl SymbolSet {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn single(value: u32) -> Self {
    Self { ranges: vec![SymbolRange::single(value)] }
  }

  pub fn from_range(lo: u32, hi: u32) -> Self {
    Self { ranges: vec![SymbolRange::new(lo, hi)] }
  }

  /// Builds a canonical set from arbitrary, possibly-overlapping ranges.
  pub fn from_ranges(ranges: impl IntoIterator<Item = SymbolRange>) -> Self {
    let mut set = Self::empty();
    for r in ranges {
      set = set.union(&Self { ranges: vec![r] });
    }
    set
  }

  pub fn is_empty(&self) -> bool {
    self.ranges.is_empty()
  }

  pub fn ranges(&self) -> &[SymbolRange] {
    &self.ranges
  }

  pub fn contains(&self, value: u32) -> bool {
    self.find_range(value).is_some()
  }

  /// Binary search on range lower bounds, per spec.md §4.A.
  fn find_range(&self, value: u32) -> Option<usize> {
    match self.ranges.binary_search_by(|r| if value < r.lo { Ordering::Greater } else if value >= r.hi { Ordering::Less } else { Ordering::Equal }) {
      Ok(idx) => Some(idx),
      Err(_) => None,
    }
  }

  /// Linear-in-the-number-of-ranges union that always produces canonical
  /// form (sorted, merged, non-adjacent).
  pub fn union(&self, other: &Self) -> Self {
    let mut merged: Array<SymbolRange> = Array::with_capacity(self.ranges.len() + other.ranges.len());
    let mut a = self.ranges.iter().peekable();
    let mut b = other.ranges.iter().peekable();

    let mut push_sorted = |merged: &mut Array<SymbolRange>, r: SymbolRange| {
      if let Some(last) = merged.last_mut() {
        if r.lo <= last.hi {
          last.hi = last.hi.max(r.hi);
          return;
        }
      }
      merged.push(r);
    };

    loop {
      match (a.peek(), b.peek()) {
        (Some(&&ra), Some(&&rb)) => {
          if ra.lo <= rb.lo {
            push_sorted(&mut merged, ra);
            a.next();
          } else {
            push_sorted(&mut merged, rb);
            b.next();
          }
        }
        (Some(&&ra), None) => {
          push_sorted(&mut merged, ra);
          a.next();
        }
        (None, Some(&&rb)) => {
          push_sorted(&mut merged, rb);
          b.next();
        }
        (None, None) => break,
      }
    }

    Self { ranges: merged }
  }

  pub fn intersection(&self, other: &Self) -> Self {
    let mut out = Array::new();
    let (mut i, mut j) = (0, 0);
    while i < self.ranges.len() && j < other.ranges.len() {
      let a = self.ranges[i];
      let b = other.ranges[j];
      let lo = a.lo.max(b.lo);
      let hi = a.hi.min(b.hi);
      if lo < hi {
        out.push(SymbolRange::new(lo, hi));
      }
      if a.hi <= b.hi {
        i += 1;
      } else {
        j += 1;
      }
    }
    Self { ranges: out }
  }

  /// `self \ other`.
  pub fn difference(&self, other: &Self) -> Self {
    let mut out = Array::new();
    let mut j = 0;
    for &a in &self.ranges {
      let mut lo = a.lo;
      while j < other.ranges.len() && other.ranges[j].hi <= lo {
        j += 1;
      }
      let mut k = j;
      while k < other.ranges.len() && other.ranges[k].lo < a.hi {
        let b = other.ranges[k];
        if b.lo > lo {
          out.push(SymbolRange::new(lo, b.lo));
        }
        lo = lo.max(b.hi);
        if b.hi >= a.hi {
          break;
        }
        k += 1;
      }
      if lo < a.hi {
        out.push(SymbolRange::new(lo, a.hi));
      }
    }
    Self { ranges: out }
  }

  /// The complement of this set within `[0, upper_bound)`.
  pub fn complement_within(&self, upper_bound: u32) -> Self {
    Self::from_range(0, upper_bound).difference(self)
  }
}

impl std::fmt::Display for SymbolSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let parts: Array<String> = self.ranges.iter().map(|r| if r.len() == 1 { format!("{}", r.lo) } else { format!("[{},{})", r.lo, r.hi) }).collect();
    write!(f, "{{{}}}", parts.join(","))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn union_merges_adjacent_and_overlapping() {
    let a = SymbolSet::from_ranges([SymbolRange::new(0, 5), SymbolRange::new(10, 15)]);
    let b = SymbolSet::from_ranges([SymbolRange::new(5, 10), SymbolRange::new(20, 25)]);
    let u = a.union(&b);
    assert_eq!(u.ranges(), &[SymbolRange::new(0, 15), SymbolRange::new(20, 25)]);
  }

  #[test]
  fn intersection_basic() {
    let a = SymbolSet::from_range(0, 10);
    let b = SymbolSet::from_range(5, 20);
    assert_eq!(a.intersection(&b).ranges(), &[SymbolRange::new(5, 10)]);
  }

  #[test]
  fn difference_splits_a_range() {
    let a = SymbolSet::from_range(0, 10);
    let b = SymbolSet::from_range(3, 6);
    assert_eq!(a.difference(&b).ranges(), &[SymbolRange::new(0, 3), SymbolRange::new(6, 10)]);
  }

  #[test]
  fn membership_is_binary_search() {
    let a = SymbolSet::from_ranges([SymbolRange::new(0, 5), SymbolRange::new(100, 200)]);
    assert!(a.contains(4));
    assert!(!a.contains(5));
    assert!(a.contains(150));
    assert!(!a.contains(200));
  }

  #[test]
  fn complement_within_bound() {
    let a = SymbolSet::from_range(2, 5);
    assert_eq!(a.complement_within(10).ranges(), &[SymbolRange::new(0, 2), SymbolRange::new(5, 10)]);
  }
}
