//! Grammar symbols, rules, and the total orders they carry (spec.md §3,
//! component E).

use crate::types::{Array, NonTermId, RuleId, TermId};
use std::cmp::Ordering;

/// One grammar symbol, in the tagged-variant shape spec.md §9 calls for
/// in place of a class hierarchy: `first`, closure, and comparison all
/// dispatch on this tag rather than on virtual dispatch.
#[derive(Clone, Debug)]
pub enum Item {
  Terminal(TermId),
  NonTerminal(NonTermId),
  /// The empty-string symbol. A single variant value, not a nullable
  /// pointer to a shared singleton (spec.md §9's "global empty
  /// singleton" redesign flag).
  Empty,
  EndOfInput,
  EndOfGuard,
  /// `a|b|c` as a single RHS position.
  Alt(Array<Item>),
  /// `a?`.
  Opt(Box<Item>),
  /// `a*` (`min == 0`) or `a+` (`min == 1`).
  Repeat { child: Box<Item>, min: u8 },
  /// `[=> rule]`: a guard pseudo-terminal whose acceptance runs the
  /// named rule as an auxiliary parse (spec.md §4.I).
  Guard { rule: RuleId, priority: i32 },
}

/// Stable rank used for the "first by variant tag" half of [`Item`]'s
/// total order. Declared once, rather than relying on enum discriminant
/// order, so that reordering the variants above (e.g. to add a doc
/// comment) can never silently change generated table byte order.
fn tag_rank(item: &Item) -> u8 {
  match item {
    Item::Terminal(_) => 0,
    Item::NonTerminal(_) => 1,
    Item::Empty => 2,
    Item::EndOfInput => 3,
    Item::EndOfGuard => 4,
    Item::Alt(_) => 5,
    Item::Opt(_) => 6,
    Item::Repeat { .. } => 7,
    Item::Guard { .. } => 8,
  }
}

impl PartialEq for Item {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Item {}

impl PartialOrd for Item {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Item {
  fn cmp(&self, other: &Self) -> Ordering {
    tag_rank(self).cmp(&tag_rank(other)).then_with(|| match (self, other) {
      (Item::Terminal(a), Item::Terminal(b)) => a.cmp(b),
      (Item::NonTerminal(a), Item::NonTerminal(b)) => a.cmp(b),
      (Item::Empty, Item::Empty) => Ordering::Equal,
      (Item::EndOfInput, Item::EndOfInput) => Ordering::Equal,
      (Item::EndOfGuard, Item::EndOfGuard) => Ordering::Equal,
      (Item::Alt(a), Item::Alt(b)) => a.cmp(b),
      (Item::Opt(a), Item::Opt(b)) => a.cmp(b),
      (Item::Repeat { child: ca, min: ma }, Item::Repeat { child: cb, min: mb }) => ca.cmp(cb).then(ma.cmp(mb)),
      (Item::Guard { rule: ra, priority: pa }, Item::Guard { rule: rb, priority: pb }) => ra.cmp(rb).then(pa.cmp(pb)),
      _ => unreachable!("tag_rank already separated differing variants"),
    })
  }
}

impl Item {
  /// `true` for items that admit an LR transition (spec.md §4.G: "items
  /// whose `generate_transition()` is true; `empty` never does").
  pub fn generates_transition(&self) -> bool {
    !matches!(self, Item::Empty)
  }

  /// `true` if this is the `empty` symbol itself, i.e. a rule whose RHS
  /// is exactly `[Item::Empty]` matches nothing and its single item is
  /// always at the reduce point (spec.md §8: "a rule with empty RHS
  /// produces one reduction ... without looping" — since `empty` never
  /// generates a transition, dot can never legitimately advance past it,
  /// so the item is complete the moment it's produced).
  pub fn is_empty_symbol(&self) -> bool {
    matches!(self, Item::Empty)
  }

  pub fn as_terminal(&self) -> Option<TermId> {
    match self {
      Item::Terminal(t) => Some(*t),
      _ => None,
    }
  }

  pub fn as_nonterminal(&self) -> Option<NonTermId> {
    match self {
      Item::NonTerminal(n) => Some(*n),
      _ => None,
    }
  }
}

/// A non-terminal's left-hand side plus an ordered right-hand side.
///
/// Ordered by `(|RHS|, LHS, RHS lexicographic)` — a full lexicographic
/// fallback, not the source's partial `size`/`nonterminal`-only
/// comparison (spec.md §9's open question; see `DESIGN.md`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
  pub lhs: NonTermId,
  pub rhs: Array<Item>,
}

impl Rule {
  pub fn new(lhs: NonTermId, rhs: Array<Item>) -> Self {
    Self { lhs, rhs }
  }

  /// `true` if an item `(self, dot)` is at its reduce point: either the
  /// dot has walked off the end, or the symbol under it is `empty`
  /// (which never shifts, so such an item is complete on arrival).
  pub fn is_complete_at(&self, dot: usize) -> bool {
    dot >= self.rhs.len() || self.rhs[dot].is_empty_symbol()
  }
}

impl PartialOrd for Rule {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Rule {
  fn cmp(&self, other: &Self) -> Ordering {
    self.rhs.len().cmp(&other.rhs.len()).then_with(|| self.lhs.cmp(&other.lhs)).then_with(|| self.rhs.cmp(&other.rhs))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn order_is_tag_first_then_payload() {
    let t = Item::Terminal(TermId::from(5u32));
    let n = Item::NonTerminal(NonTermId::from(0u32));
    assert!(t < n, "Terminal must sort before NonTerminal regardless of payload");
  }

  #[test]
  fn rule_order_prefers_shorter_rhs_first() {
    let short = Rule::new(NonTermId::from(0u32), vec![Item::Terminal(TermId::from(0u32))]);
    let long = Rule::new(NonTermId::from(0u32), vec![Item::Terminal(TermId::from(0u32)), Item::Terminal(TermId::from(1u32))]);
    assert!(short < long);
  }

  #[test]
  fn rule_order_falls_back_to_full_lexicographic_rhs() {
    let a = Rule::new(NonTermId::from(0u32), vec![Item::Terminal(TermId::from(0u32)), Item::Terminal(TermId::from(9u32))]);
    let b = Rule::new(NonTermId::from(0u32), vec![Item::Terminal(TermId::from(0u32)), Item::Terminal(TermId::from(1u32))]);
    // Same length, same LHS: must compare element-by-element, not bail
    // out after the first equal item the way the source's partial
    // comparison did.
    assert!(b < a);
  }

  #[test]
  fn empty_item_never_generates_a_transition() {
    assert!(!Item::Empty.generates_transition());
    assert!(Item::Terminal(TermId::from(0u32)).generates_transition());
  }
}
