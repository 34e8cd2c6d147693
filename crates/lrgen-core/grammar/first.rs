//! FIRST-set computation (spec.md §4.E).

use super::grammar::Grammar;
use super::item::Item;
use crate::types::{NonTermId, OrderedMap, OrderedSet};

/// `FIRST(X)` is a set of the four primitive items a derivation can
/// actually begin with: a terminal, `empty`, `end_of_input`, or
/// `end_of_guard`. Nonterminal and EBNF items never appear *inside* a
/// FIRST set — only as the `X` a FIRST set is computed *for*.
pub type FirstSet = OrderedSet<Item>;

/// Precomputed `FIRST(N)` for every non-terminal `N`, built once by
/// iterative fixpoint over the whole grammar (handles left recursion;
/// spec.md §4.E).
#[derive(Clone, Debug, Default)]
pub struct FirstSets {
  nonterminal: OrderedMap<NonTermId, FirstSet>,
}

impl FirstSets {
  /// Runs the fixpoint: start every non-terminal's FIRST at ∅ and
  /// repeatedly fold in `first_seq` of each of its rules' RHS until a
  /// full pass adds nothing.
  pub fn compute(grammar: &Grammar) -> Self {
    let mut sets = FirstSets::default();
    for n in grammar.nonterminals() {
      sets.nonterminal.insert(n, FirstSet::new());
    }

    loop {
      let mut grew = false;
      for n in grammar.nonterminals() {
        let mut merged = sets.nonterminal.get(&n).cloned().unwrap_or_default();
        for &rule_id in grammar.rules_of(n) {
          let rule = grammar.rule(rule_id);
          let seq = first_seq(&rule.rhs, grammar, &sets);
          let before = merged.len();
          merged.extend(seq);
          if merged.len() != before {
            grew = true;
          }
        }
        sets.nonterminal.insert(n, merged);
      }
      if !grew {
        break;
      }
    }
    sets
  }

  pub fn of_nonterminal(&self, n: NonTermId) -> FirstSet {
    self.nonterminal.get(&n).cloned().unwrap_or_default()
  }
}

/// `first(X, G)` for a single item, per spec.md §4.E.
pub fn first(item: &Item, grammar: &Grammar, sets: &FirstSets) -> FirstSet {
  match item {
    Item::Terminal(_) | Item::Empty | Item::EndOfInput | Item::EndOfGuard => {
      let mut s = FirstSet::new();
      s.insert(item.clone());
      s
    }
    Item::NonTerminal(n) => sets.of_nonterminal(*n),
    Item::Alt(children) => {
      let mut s = FirstSet::new();
      for c in children {
        s.extend(first(c, grammar, sets));
      }
      s
    }
    Item::Opt(child) => {
      let mut s = first(child, grammar, sets);
      s.insert(Item::Empty);
      s
    }
    Item::Repeat { child, min } => {
      let mut s = first(child, grammar, sets);
      if *min == 0 {
        s.insert(Item::Empty);
      }
      s
    }
    Item::Guard { rule, .. } => first_seq(&grammar.rule(*rule).rhs, grammar, sets),
  }
}

/// `first_seq(items)`: FIRST of a whole RHS, walked left to right.
/// Accumulates `first(item) \ {empty}` and stops at the first item whose
/// FIRST lacks `empty`; if every item in the sequence can derive empty,
/// `empty` itself is included in the result (spec.md §4.E).
pub fn first_seq(items: &[Item], grammar: &Grammar, sets: &FirstSets) -> FirstSet {
  let mut result = FirstSet::new();
  for item in items {
    let f = first(item, grammar, sets);
    let nullable = f.contains(&Item::Empty);
    result.extend(f.into_iter().filter(|i| *i != Item::Empty));
    if !nullable {
      return result;
    }
  }
  result.insert(Item::Empty);
  result
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::GrammarBuilder;

  #[test]
  fn first_of_terminal_is_itself() {
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let a = b.declare_terminal("a");
    b.add_rule(s, vec![Item::Terminal(a)]).unwrap();
    let g = b.finish(s).unwrap();
    let sets = FirstSets::compute(&g);
    let f = first(&Item::Terminal(a), &g, &sets);
    assert!(f.contains(&Item::Terminal(a)));
  }

  #[test]
  fn nullable_nonterminal_propagates_empty() {
    // A -> ε | c ; S -> a A b
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let big_a = b.declare_nonterminal("A");
    let a = b.declare_terminal("a");
    let bb = b.declare_terminal("b");
    let c = b.declare_terminal("c");
    b.add_rule(big_a, vec![Item::Empty]).unwrap();
    b.add_rule(big_a, vec![Item::Terminal(c)]).unwrap();
    b.add_rule(s, vec![Item::Terminal(a), Item::NonTerminal(big_a), Item::Terminal(bb)]).unwrap();
    let g = b.finish(s).unwrap();
    let sets = FirstSets::compute(&g);

    let first_a = sets.of_nonterminal(big_a);
    assert!(first_a.contains(&Item::Terminal(c)));
    assert!(first_a.contains(&Item::Empty));

    let seq = first_seq(&[Item::NonTerminal(big_a), Item::Terminal(bb)], &g, &sets);
    assert!(seq.contains(&Item::Terminal(c)));
    assert!(seq.contains(&Item::Terminal(bb)));
    assert!(!seq.contains(&Item::Empty), "A b is not nullable even though A is");
  }

  #[test]
  fn left_recursive_nonterminal_reaches_fixpoint() {
    // S -> S a | b  (left recursive; FIRST(S) must still resolve to {b})
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let a = b.declare_terminal("a");
    let bb = b.declare_terminal("b");
    b.add_rule(s, vec![Item::NonTerminal(s), Item::Terminal(a)]).unwrap();
    b.add_rule(s, vec![Item::Terminal(bb)]).unwrap();
    let g = b.finish(s).unwrap();
    let sets = FirstSets::compute(&g);
    let first_s = sets.of_nonterminal(s);
    assert!(first_s.contains(&Item::Terminal(bb)));
    assert!(!first_s.contains(&Item::Terminal(a)));
  }
}
