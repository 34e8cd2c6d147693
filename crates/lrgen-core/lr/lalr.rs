//! Canonical LR(0) collection construction and DeRemer/Pennello LALR(1)
//! lookahead propagation (spec.md §4.G, component G).

use super::item_set::{ItemSet, Lr0Item, Lr1Item};
use crate::grammar::{first_seq, FirstSets, Grammar, Item};
use crate::types::{Array, OrderedMap, OrderedSet, RuleId, StateId, TermId};

/// A placeholder lookahead used only during spontaneous/propagate
/// discovery (DeRemer/Pennello's `#`). It is never a real grammar
/// terminal — it borrows the reserved "unset" sentinel id so it can
/// never collide with a declared terminal.
fn sentinel() -> Item {
  Item::Terminal(TermId(u32::MAX - 1))
}

/// One state of the LALR machine: its canonical kernel, the fully
/// closed item set used for action synthesis, its outgoing transitions,
/// and the guard rules its closure activated (spec.md §4.I).
#[derive(Clone, Debug)]
pub struct LrState {
  pub kernel:      Array<Lr0Item>,
  pub items:       ItemSet,
  pub transitions: OrderedMap<Item, StateId>,
  pub guard_rules: OrderedSet<RuleId>,
}

#[derive(Clone, Debug)]
pub struct LalrMachine {
  pub states:     Array<LrState>,
  pub start_rule: RuleId,
}

/// Builds the canonical LR(0) collection and then propagates LALR(1)
/// lookaheads to fixpoint. `start_rule` must already be the augmented
/// rule `S' -> S` with dot 0 as the single kernel item of state 0.
pub fn build(grammar: &Grammar, firsts: &FirstSets, start_rule: RuleId) -> LalrMachine {
  let (kernels, transitions, _) = build_lr0_collection(grammar, firsts, start_rule);
  let lookaheads = propagate_lookaheads(grammar, firsts, start_rule, &kernels, &transitions);

  let mut states = Array::with_capacity(kernels.len());
  for (state_id, kernel) in kernels.iter().enumerate() {
    let seed: Array<Lr1Item> = kernel
      .iter()
      .map(|k| {
        let la = lookaheads.get(&(StateId::from(state_id), *k)).cloned().unwrap_or_default();
        Lr1Item::new(k.rule, k.dot, la)
      })
      .collect();
    let (items, guard_rules) = closure(&seed, grammar, firsts);
    states.push(LrState { kernel: kernel.clone(), items, transitions: transitions[state_id].clone(), guard_rules });
  }

  LalrMachine { states, start_rule }
}

/// Phase 1: discover states and transitions from kernel structure alone
/// (lookahead content doesn't affect which rules/dots a closure adds,
/// only what lookahead they carry, so an empty-lookahead closure already
/// reveals the full canonical collection).
fn build_lr0_collection(grammar: &Grammar, firsts: &FirstSets, start_rule: RuleId) -> (Array<Array<Lr0Item>>, Array<OrderedMap<Item, StateId>>, Array<OrderedSet<RuleId>>) {
  let start_kernel = vec![Lr0Item { rule: start_rule, dot: 0 }];
  let mut kernel_ids: OrderedMap<Array<Lr0Item>, StateId> = OrderedMap::new();
  kernel_ids.insert(start_kernel.clone(), StateId::from(0u32));

  let mut kernels = vec![start_kernel.clone()];
  let mut transitions: Array<OrderedMap<Item, StateId>> = vec![OrderedMap::new()];
  let mut guard_rules: Array<OrderedSet<RuleId>> = vec![OrderedSet::new()];
  let mut worklist = vec![start_kernel];

  while let Some(kernel) = worklist.pop() {
    let state_id = *kernel_ids.get(&kernel).unwrap();
    let seed: Array<Lr1Item> = kernel.iter().map(|k| Lr1Item::new(k.rule, k.dot, OrderedSet::new())).collect();
    let (closed, guards) = closure(&seed, grammar, firsts);
    guard_rules[state_id.index()] = guards;

    for symbol in dot_symbols(&closed, grammar) {
      let next_kernel = goto_kernel(&closed, &symbol, grammar);
      if next_kernel.is_empty() {
        continue;
      }
      let target = *kernel_ids.entry(next_kernel.clone()).or_insert_with(|| {
        kernels.push(next_kernel.clone());
        transitions.push(OrderedMap::new());
        guard_rules.push(OrderedSet::new());
        worklist.push(next_kernel.clone());
        StateId::from(kernels.len() - 1)
      });
      transitions[state_id.index()].insert(symbol, target);
    }
  }

  (kernels, transitions, guard_rules)
}

/// Phase 2: spontaneous-generation + propagation-edge worklist, to
/// fixpoint (DeRemer/Pennello).
fn propagate_lookaheads(
  grammar: &Grammar,
  firsts: &FirstSets,
  start_rule: RuleId,
  kernels: &[Array<Lr0Item>],
  transitions: &[OrderedMap<Item, StateId>],
) -> OrderedMap<(StateId, Lr0Item), OrderedSet<Item>> {
  let mut table: OrderedMap<(StateId, Lr0Item), OrderedSet<Item>> = OrderedMap::new();
  let start_key = (StateId::from(0u32), Lr0Item { rule: start_rule, dot: 0 });
  table.entry(start_key).or_default().insert(Item::EndOfInput);

  let mut edges: Array<((StateId, Lr0Item), (StateId, Lr0Item))> = Array::new();

  for (state_idx, kernel) in kernels.iter().enumerate() {
    let state_id = StateId::from(state_idx);
    for &k in kernel {
      let seed = vec![Lr1Item::new(k.rule, k.dot, {
        let mut s = OrderedSet::new();
        s.insert(sentinel());
        s
      })];
      let (closed, _) = closure(&seed, grammar, firsts);
      for item in closed.items() {
        let rule = grammar.rule(item.kernel.rule);
        if rule.is_complete_at(item.kernel.dot) {
          continue;
        }
        let symbol = rule.rhs[item.kernel.dot].clone();
        let Some(&target) = transitions[state_idx].get(&symbol) else { continue };
        let shifted = Lr0Item { rule: item.kernel.rule, dot: item.kernel.dot + 1 };
        for la in item.lookahead.iter() {
          if *la == sentinel() {
            edges.push(((state_id, k), (target, shifted)));
          } else {
            table.entry((target, shifted)).or_default().insert(la.clone());
          }
        }
      }
    }
  }

  loop {
    let mut changed = false;
    for &(from, to) in &edges {
      let from_set = table.get(&from).cloned().unwrap_or_default();
      let entry = table.entry(to).or_default();
      let before = entry.len();
      entry.extend(from_set);
      if entry.len() != before {
        changed = true;
      }
    }
    if !changed {
      break;
    }
  }

  table
}

/// Closes a seed of LR(1) items under the rules in §4.G: non-terminal
/// dot-symbols add every one of their rules with a FIRST-derived
/// lookahead; guard dot-symbols do the same for the guard's single rule
/// and are additionally recorded so the owning state knows it's
/// guard-active.
pub fn closure(seed: &[Lr1Item], grammar: &Grammar, firsts: &FirstSets) -> (ItemSet, OrderedSet<RuleId>) {
  let mut set = ItemSet::new();
  for item in seed {
    set.insert(item.clone());
  }
  let mut guard_rules = OrderedSet::new();

  let mut i = 0;
  while i < set.items().len() {
    let current = set.items()[i].clone();
    i += 1;
    let rule = grammar.rule(current.kernel.rule);
    if current.kernel.dot >= rule.rhs.len() {
      continue;
    }
    let beta: Array<Item> = rule.rhs[current.kernel.dot + 1..].to_vec();
    match &rule.rhs[current.kernel.dot] {
      Item::NonTerminal(n) => {
        let new_la = lookahead_after(&beta, &current.lookahead, grammar, firsts);
        for &rid in grammar.rules_of(*n) {
          set.insert(Lr1Item::new(rid, 0, new_la.clone()));
        }
      }
      Item::Guard { rule: guard_rule, .. } => {
        guard_rules.insert(*guard_rule);
        let new_la = lookahead_after(&beta, &current.lookahead, grammar, firsts);
        set.insert(Lr1Item::new(*guard_rule, 0, new_la));
      }
      _ => {}
    }
  }

  (set, guard_rules)
}

fn lookahead_after(beta: &[Item], inherited: &OrderedSet<Item>, grammar: &Grammar, firsts: &FirstSets) -> OrderedSet<Item> {
  let mut result = OrderedSet::new();
  for la in inherited {
    let mut seq = beta.to_vec();
    seq.push(la.clone());
    let computed = first_seq(&seq, grammar, firsts);
    result.extend(computed.into_iter().filter(|x| *x != Item::Empty));
  }
  result
}

/// Every distinct dot-symbol among `items` that admits a transition
/// (`empty` never does, per spec.md §4.G).
fn dot_symbols(items: &ItemSet, grammar: &Grammar) -> OrderedSet<Item> {
  let mut out = OrderedSet::new();
  for item in items.items() {
    let rule = grammar.rule(item.kernel.rule);
    if item.kernel.dot < rule.rhs.len() {
      let symbol = &rule.rhs[item.kernel.dot];
      if symbol.generates_transition() {
        out.insert(symbol.clone());
      }
    }
  }
  out
}

/// `Goto(S, X)`'s kernel: every item in `S` whose dot-symbol is `X`,
/// with the dot advanced by one.
fn goto_kernel(items: &ItemSet, symbol: &Item, grammar: &Grammar) -> Array<Lr0Item> {
  let mut kernel: Array<Lr0Item> = Array::new();
  for item in items.items() {
    let rule = grammar.rule(item.kernel.rule);
    if item.kernel.dot < rule.rhs.len() && rule.rhs[item.kernel.dot] == *symbol {
      let shifted = Lr0Item { rule: item.kernel.rule, dot: item.kernel.dot + 1 };
      if !kernel.contains(&shifted) {
        kernel.push(shifted);
      }
    }
  }
  kernel.sort();
  kernel
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::GrammarBuilder;

  /// spec.md §8 seed scenario 1: `S -> aS | b` over alphabet `{a,b}`.
  #[test]
  fn classic_right_recursive_grammar_has_no_conflicts() {
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let s_prime = b.declare_nonterminal("S'");
    let a = b.declare_terminal("a");
    let bb = b.declare_terminal("b");
    b.add_rule(s, vec![Item::Terminal(a), Item::NonTerminal(s)]).unwrap();
    b.add_rule(s, vec![Item::Terminal(bb)]).unwrap();
    let start_rule = b.add_rule(s_prime, vec![Item::NonTerminal(s)]).unwrap();
    let grammar = b.finish(s_prime).unwrap();
    let firsts = FirstSets::compute(&grammar);

    let machine = build(&grammar, &firsts, start_rule);
    // 5 states reachable from this tiny grammar: start (state0), after-a
    // (state1, self-loop on `a`, goto to after-b and after-aS), after-b
    // (state2, reduces), the accept state after S (state3), and the
    // reduce state after `aS` (state4) — state3's kernel is `[S'->S.]`
    // and state4's is `[S->aS.]`, distinct rules so they never merge.
    assert_eq!(machine.states.len(), 5);

    let start = &machine.states[0];
    assert!(start.transitions.contains_key(&Item::Terminal(a)));
    assert!(start.transitions.contains_key(&Item::Terminal(bb)));
    assert!(start.transitions.contains_key(&Item::NonTerminal(s)));
  }

  /// spec.md §8 seed scenario 6: `S -> aAb; A -> ε | c`.
  #[test]
  fn nullable_nonterminal_produces_reduce_and_shift_without_conflict() {
    let mut b = GrammarBuilder::new();
    let s = b.declare_nonterminal("S");
    let s_prime = b.declare_nonterminal("S'");
    let big_a = b.declare_nonterminal("A");
    let a = b.declare_terminal("a");
    let bb = b.declare_terminal("b");
    let c = b.declare_terminal("c");
    b.add_rule(s, vec![Item::Terminal(a), Item::NonTerminal(big_a), Item::Terminal(bb)]).unwrap();
    b.add_rule(big_a, vec![Item::Empty]).unwrap();
    b.add_rule(big_a, vec![Item::Terminal(c)]).unwrap();
    let start_rule = b.add_rule(s_prime, vec![Item::NonTerminal(s)]).unwrap();
    let grammar = b.finish(s_prime).unwrap();
    let firsts = FirstSets::compute(&grammar);

    let machine = build(&grammar, &firsts, start_rule);
    let state_after_a = machine.states[0].transitions[&Item::Terminal(a)];
    let state = &machine.states[state_after_a.index()];

    let has_reduce_on_b = state.items.items().iter().any(|i| {
      let rule = grammar.rule(i.kernel.rule);
      rule.is_complete_at(i.kernel.dot) && rule.lhs == big_a && i.lookahead.contains(&Item::Terminal(bb))
    });
    assert!(has_reduce_on_b);
    assert!(state.transitions.contains_key(&Item::Terminal(c)));
  }
}
