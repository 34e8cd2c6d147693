//! Partition of the input alphabet into disjoint classes (spec.md §3/§4.A,
//! component B).

use super::{SymbolRange, SymbolSet};
use crate::types::{Array, ClassId, OrderedMap, EPSILON_CLASS};

/// Maps symbol sets to integer class ids such that the stored sets
/// partition the alphabet: two distinct symbol values belong to the same
/// class iff every regex that accepts one accepts the other.
#[derive(Clone, Debug, Default)]
pub struct SymbolMap {
  cells: OrderedMap<ClassId, SymbolSet>,
  next:  u32,
}

impl SymbolMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the class id for an existing partition cell equal to `set`,
  /// or inserts a new one and returns its freshly minted id.
  pub fn identifier_for(&mut self, set: SymbolSet) -> ClassId {
    if let Some((id, _)) = self.cells.iter().find(|(_, s)| **s == set) {
      return *id;
    }
    let id = ClassId(self.next);
    self.next += 1;
    self.cells.insert(id, set);
    id
  }

  pub fn set_for(&self, class: ClassId) -> Option<&SymbolSet> {
    if class == EPSILON_CLASS {
      return None;
    }
    self.cells.get(&class)
  }

  pub fn cells(&self) -> impl Iterator<Item = (ClassId, &SymbolSet)> {
    self.cells.iter().map(|(k, v)| (*k, v))
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  /// Produces a new map whose stored cells are pairwise disjoint, such
  /// that the union of the original cells is preserved.
  ///
  /// This is the operation that turns an NFA's overlapping symbol classes
  /// into a canonical alphabet over which subset construction (component
  /// D) is efficient: without it, two classes that merely *overlap*
  /// (rather than coincide) would force the subset construction to treat
  /// every combination of overlapping ranges as its own transition.
  ///
  /// Implementation walks every boundary implied by the source ranges,
  /// splitting on each one, then coalesces the resulting elementary
  /// intervals that are covered by exactly the same set of source cell
  /// ids back into larger ranges (TameParse `remapped_symbol_map::deduplicate`).
  pub fn deduplicate(source: &SymbolMap) -> SymbolMap {
    let mut boundaries: Array<u32> = Array::new();
    for (_, set) in source.cells() {
      for r in set.ranges() {
        boundaries.push(r.lo);
        boundaries.push(r.hi);
      }
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    if boundaries.is_empty() {
      return SymbolMap::new();
    }

    // Elementary intervals are the gaps between consecutive boundaries;
    // no source range straddles an interval boundary by construction, so
    // "does this source cell cover the interval" is well-defined and
    // constant across the whole interval.
    let mut by_active_set: OrderedMap<Array<ClassId>, SymbolSet> = OrderedMap::new();
    for window in boundaries.windows(2) {
      let (lo, hi) = (window[0], window[1]);
      let mut active: Array<ClassId> = source.cells().filter(|(_, set)| set.contains(lo)).map(|(id, _)| id).collect();
      active.sort_unstable();
      if active.is_empty() {
        continue;
      }
      let entry = by_active_set.entry(active).or_insert_with(SymbolSet::empty);
      *entry = entry.union(&SymbolSet::from_range(lo, hi));
    }

    let mut result = SymbolMap::new();
    for (_, set) in by_active_set {
      result.identifier_for(set);
    }
    result
  }
}

/// Expands a pattern range through an upper/lower case-folding table,
/// returning the union of the original range with its folded counterpart.
/// Used by the NFA builder (component C) to realise case-insensitive
/// literals and classes without carrying a case bit through the alphabet:
/// the folded alternatives are baked directly into the range set.
pub fn fold_case(range: SymbolRange, fold: &dyn Fn(u32) -> Option<u32>) -> SymbolSet {
  let mut set = SymbolSet::from_range(range.lo, range.hi);
  for v in range.lo..range.hi {
    if let Some(folded) = fold(v) {
      set = set.union(&SymbolSet::single(folded));
    }
  }
  set
}
