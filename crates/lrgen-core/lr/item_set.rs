//! LR(0)/LR(1) items and the item sets (states) built from them
//! (spec.md §3/§4.F, component F).

use crate::grammar::Item;
use crate::types::{Array, OrderedSet, RuleId};
use std::cmp::Ordering;

/// `(rule, dot)`: a rule together with a cursor position in `0..=|rhs|`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Lr0Item {
  pub rule: RuleId,
  pub dot:  usize,
}

impl PartialOrd for Lr0Item {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Lr0Item {
  fn cmp(&self, other: &Self) -> Ordering {
    self.rule.cmp(&other.rule).then(self.dot.cmp(&other.dot))
  }
}

/// An [`Lr0Item`] plus a lookahead set of terminals (and possibly
/// `end_of_input`/`end_of_guard`). Two items with equal kernels are
/// "mergeable": the merge is the union of their lookaheads, with kernel
/// identity preserved (spec.md §3).
#[derive(Clone, Debug)]
pub struct Lr1Item {
  pub kernel:    Lr0Item,
  pub lookahead: OrderedSet<Item>,
}

impl Lr1Item {
  pub fn new(rule: RuleId, dot: usize, lookahead: OrderedSet<Item>) -> Self {
    Self { kernel: Lr0Item { rule, dot }, lookahead }
  }
}

/// An LR state: an ordered set of [`Lr1Item`]s, merged by kernel so that
/// LALR construction collapses what would otherwise be distinct LR(1)
/// states differing only in lookahead.
///
/// Kept as a flat, kernel-sorted vector rather than a generic set type:
/// insertion has to *merge* on kernel collision rather than reject the
/// duplicate outright, which `OrderedSet`'s `insert` cannot express.
#[derive(Clone, Debug, Default)]
pub struct ItemSet {
  items: Array<Lr1Item>,
}

impl ItemSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn items(&self) -> &[Lr1Item] {
    &self.items
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  /// Inserts `item`, merging into an existing entry with the same kernel
  /// by lookahead union. Returns whether the set changed — grew by a new
  /// kernel, or an existing kernel's lookahead grew — which is exactly
  /// the boolean the worklist fixpoint loops in `lalr.rs` need to decide
  /// whether to keep iterating (spec.md §4.F).
  pub fn insert(&mut self, item: Lr1Item) -> bool {
    if let Some(existing) = self.items.iter_mut().find(|i| i.kernel == item.kernel) {
      let before = existing.lookahead.len();
      existing.lookahead.extend(item.lookahead);
      existing.lookahead.len() != before
    } else {
      let pos = self.items.binary_search_by(|i| i.kernel.cmp(&item.kernel)).unwrap_or_else(|p| p);
      self.items.insert(pos, item);
      true
    }
  }

  /// The kernel-only view of this set: the sorted list of `(rule, dot)`
  /// pairs, ignoring lookaheads. Two states with an identical kernel
  /// view but different lookaheads are the same LALR state by
  /// definition — this is the key used to detect "already visited"
  /// during canonical collection construction.
  pub fn kernel_signature(&self) -> Array<Lr0Item> {
    self.items.iter().map(|i| i.kernel).collect()
  }
}
