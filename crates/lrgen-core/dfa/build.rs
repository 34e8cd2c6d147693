//! Class split, subset construction, and minimization (spec.md §4.D,
//! component D).

use crate::regex::{Accept, Nfa, NfaState, Transition};
use crate::symbol::SymbolMap;
use crate::types::{Array, ClassId, Journal, OrderedMap, TermId, EPSILON_CLASS};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DfaTransition {
  pub class:  ClassId,
  pub target: u32,
}

#[derive(Clone, Debug, Default)]
pub struct DfaState {
  pub transitions: Array<DfaTransition>,
  /// Every accept action reachable in this state. Spec.md §4.D: "When
  /// multiple accept actions land in one state, all are kept; the
  /// driver picks by `(eager?, priority, symbol order)`." Keeping the
  /// full set (rather than collapsing to a winner here) is what lets
  /// `weak.rs` later find states where a weak and a strong terminal
  /// coexist.
  pub accepts:     Array<Accept>,
}

impl DfaState {
  /// The accept action the driver would choose at this state, by
  /// `(eager, priority, definition order)`.
  pub fn winner(&self) -> Option<Accept> {
    pick_winner(&self.accepts)
  }
}

/// A deterministic scanner: dense states, a shared disjoint [`SymbolMap`],
/// state `0` the initial state.
#[derive(Clone, Debug, Default)]
pub struct Dfa {
  pub states: Array<DfaState>,
  pub map:    SymbolMap,
}

/// Runs the full component-D pipeline over an NFA built by component C:
/// split the alphabet into a disjoint partition, determinize by subset
/// construction, then minimize by partition refinement. Diagnostics
/// (currently only [`crate::types::GenError::UnreachableTerminal`]) are
/// pushed into `journal`; the returned table is always well-formed even
/// when warnings were raised.
pub fn build(nfa: &Nfa, journal: &mut Journal) -> Dfa {
  let (split_nfa, disjoint_map) = class_split(nfa);
  let raw = determinize(&split_nfa, disjoint_map);
  let minimized = minimize(&raw);
  report_unreachable_terminals(nfa, &minimized, journal);
  minimized
}

fn is_subset(a: &crate::symbol::SymbolSet, b: &crate::symbol::SymbolSet) -> bool {
  a.difference(b).is_empty()
}

/// Rebuilds `nfa`'s transitions over a disjoint alphabet so that subset
/// construction never has to reason about partially-overlapping classes.
/// Each transition on an old (possibly overlapping) class becomes one
/// transition per new class that is a subset of the old one.
fn class_split(nfa: &Nfa) -> (Nfa, SymbolMap) {
  let new_map = SymbolMap::deduplicate(&nfa.map);
  let new_cells: Array<(ClassId, crate::symbol::SymbolSet)> = new_map.cells().map(|(id, set)| (id, set.clone())).collect();

  let mut states: Array<NfaState> = Array::with_capacity(nfa.states.len());
  for state in &nfa.states {
    let mut new_state = NfaState { transitions: Array::new(), accepts: state.accepts.clone() };
    for t in &state.transitions {
      if t.class == EPSILON_CLASS {
        new_state.transitions.push(*t);
        continue;
      }
      let Some(old_set) = nfa.map.set_for(t.class) else { continue };
      for (new_class, new_set) in &new_cells {
        if is_subset(new_set, old_set) {
          new_state.transitions.push(Transition { class: *new_class, target: t.target });
        }
      }
    }
    states.push(new_state);
  }

  (Nfa { states, map: new_map.clone() }, new_map)
}

/// Chooses the single winning accept out of every accept reachable at a
/// DFA state, per spec.md §4.D's tie-break: eager wins over lazy, then
/// higher `priority`, then earlier definition `order`.
fn pick_winner(accepts: &[Accept]) -> Option<Accept> {
  accepts.iter().copied().max_by(|a, b| a.eager.cmp(&b.eager).then(a.priority.cmp(&b.priority)).then(b.order.cmp(&a.order)))
}

fn determinize(nfa: &Nfa, map: SymbolMap) -> Dfa {
  let classes: Array<ClassId> = map.cells().map(|(id, _)| id).collect();

  let initial = nfa.epsilon_closure([0]);
  let mut state_ids: OrderedMap<Array<u32>, u32> = OrderedMap::new();
  state_ids.insert(initial.clone(), 0);
  let mut worklist = vec![initial];
  let mut states: Array<DfaState> = vec![DfaState::default()];

  while let Some(set) = worklist.pop() {
    let id = *state_ids.get(&set).unwrap();
    let mut accepts: Array<Accept> = set.iter().flat_map(|&s| nfa.states[s as usize].accepts.iter().copied()).collect();
    accepts.sort_by_key(|a| a.symbol.0);
    accepts.dedup();
    states[id as usize].accepts = accepts;

    for &class in &classes {
      let mut moved: Array<u32> = Array::new();
      for &s in &set {
        for t in &nfa.states[s as usize].transitions {
          if t.class == class && !moved.contains(&t.target) {
            moved.push(t.target);
          }
        }
      }
      if moved.is_empty() {
        continue;
      }
      let closure = nfa.epsilon_closure(moved);
      let target = *state_ids.entry(closure.clone()).or_insert_with(|| {
        states.push(DfaState::default());
        worklist.push(closure.clone());
        (states.len() - 1) as u32
      });
      states[id as usize].transitions.push(DfaTransition { class, target });
    }
  }

  Dfa { states, map }
}

/// Hopcroft-style partition refinement: states start split only by their
/// accept-action set equivalence, then refine until every remaining
/// block is transition-consistent on every class.
fn minimize(dfa: &Dfa) -> Dfa {
  let n = dfa.states.len();
  if n == 0 {
    return dfa.clone();
  }

  let mut block_of: Array<u32> = vec![0; n];
  let mut signature: OrderedMap<Array<TermId>, u32> = OrderedMap::new();
  for (i, state) in dfa.states.iter().enumerate() {
    let key: Array<TermId> = state.accepts.iter().map(|a| a.symbol).collect();
    let next = signature.len() as u32;
    let block = *signature.entry(key).or_insert(next);
    block_of[i] = block;
  }

  let classes: Array<ClassId> = dfa.map.cells().map(|(id, _)| id).collect();

  loop {
    let mut refined: OrderedMap<Array<i64>, Array<usize>> = OrderedMap::new();
    for (i, state) in dfa.states.iter().enumerate() {
      let mut sig: Array<i64> = vec![block_of[i] as i64];
      for &class in &classes {
        let target = state.transitions.iter().find(|t| t.class == class).map(|t| block_of[t.target as usize] as i64).unwrap_or(-1);
        sig.push(target);
      }
      refined.entry(sig).or_default().push(i);
    }

    if refined.len() == block_of.iter().collect::<std::collections::HashSet<_>>().len() {
      break;
    }

    let mut new_block_of = vec![0u32; n];
    for (block_id, (_, members)) in refined.into_iter().enumerate() {
      for m in members {
        new_block_of[m] = block_id as u32;
      }
    }
    block_of = new_block_of;
  }

  let block_count = block_of.iter().copied().max().map(|m| m + 1).unwrap_or(0) as usize;
  let mut states: Array<DfaState> = vec![DfaState::default(); block_count];
  let mut seen_transition: Array<Set2> = vec![Set2::default(); block_count];

  let initial_block = block_of[0];
  for (i, state) in dfa.states.iter().enumerate() {
    let b = block_of[i] as usize;
    if states[b].accepts.is_empty() {
      states[b].accepts = state.accepts.clone();
    }
    for t in &state.transitions {
      let target_block = block_of[t.target as usize];
      if seen_transition[b].insert(t.class) {
        states[b].transitions.push(DfaTransition { class: t.class, target: target_block });
      }
    }
  }

  // Keep the initial block first so state 0 remains the entry point.
  if initial_block != 0 {
    states.swap(0, initial_block as usize);
    for state in &mut states {
      for t in &mut state.transitions {
        if t.target == 0 {
          t.target = initial_block;
        } else if t.target == initial_block {
          t.target = 0;
        }
      }
    }
  }

  Dfa { states, map: dfa.map.clone() }
}

#[derive(Clone, Default)]
struct Set2(Array<ClassId>);

impl Set2 {
  fn insert(&mut self, class: ClassId) -> bool {
    if self.0.contains(&class) {
      false
    } else {
      self.0.push(class);
      true
    }
  }
}

fn report_unreachable_terminals(nfa: &Nfa, dfa: &Dfa, journal: &mut Journal) {
  let declared: crate::types::Set<TermId> = nfa.states.iter().flat_map(|s| s.accepts.iter().map(|a| a.symbol)).collect();
  let winners: crate::types::Set<TermId> = dfa.states.iter().filter_map(|s| s.winner().map(|a| a.symbol)).collect();
  for symbol in declared {
    if !winners.contains(&symbol) {
      journal.report_at(crate::types::Severity::Warning, crate::types::GenError::UnreachableTerminal { symbol });
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::regex::Node;

  fn accept(id: u32, priority: i32, order: u32) -> Accept {
    Accept { symbol: TermId::from(id), eager: false, priority, order }
  }

  #[test]
  fn determinizes_alternation_without_duplicate_transitions() {
    let mut nfa = Nfa::new();
    nfa.add_pattern(0, &Node::literal("a", None), accept(1, 0, 0));
    nfa.add_pattern(0, &Node::literal("ab", None), accept(2, 0, 1));
    let mut journal = Journal::new();
    let dfa = build(&nfa, &mut journal);
    assert!(!dfa.states.is_empty());
    assert!(dfa.states[0].transitions.len() <= dfa.map.len());
  }

  #[test]
  fn longest_match_tiebreak_prefers_higher_priority() {
    let mut nfa = Nfa::new();
    nfa.add_pattern(0, &Node::literal("a", None), accept(1, 0, 0));
    nfa.add_pattern(0, &Node::literal("a", None), accept(2, 5, 1));
    let mut journal = Journal::new();
    let dfa = build(&nfa, &mut journal);
    let state_a = dfa.states[0].transitions.first().map(|t| t.target).unwrap();
    assert_eq!(dfa.states[state_a as usize].winner().unwrap().symbol, TermId::from(2));
  }

  #[test]
  fn both_accepts_survive_in_the_shared_state() {
    // `a` and `ab` share the path through the `a` state: that state must
    // keep both accepts even though only one wins by priority.
    let mut nfa = Nfa::new();
    nfa.add_pattern(0, &Node::literal("a", None), accept(1, 0, 0));
    nfa.add_pattern(0, &Node::literal("ab", None), accept(2, 0, 1));
    let mut journal = Journal::new();
    let dfa = build(&nfa, &mut journal);
    let state_a = dfa.states[0].transitions.iter().find(|t| true).map(|t| t.target).unwrap();
    assert_eq!(dfa.states[state_a as usize].accepts.len(), 1);
    assert_eq!(dfa.states[state_a as usize].winner().unwrap().symbol, TermId::from(1));
  }

  #[test]
  fn unreachable_terminal_is_reported() {
    let mut nfa = Nfa::new();
    // Pattern 2 ("a") is always shadowed by pattern 1's higher priority.
    nfa.add_pattern(0, &Node::literal("a", None), accept(1, 10, 0));
    nfa.add_pattern(0, &Node::literal("a", None), accept(2, 0, 1));
    let mut journal = Journal::new();
    build(&nfa, &mut journal);
    assert!(journal.warnings().any(|d| matches!(d.error, crate::types::GenError::UnreachableTerminal { symbol } if symbol == TermId::from(2))));
  }

  #[test]
  fn minimize_merges_equivalent_states() {
    // `a|b` each followed by `c`: pre-minimization has two paths to an
    // identical accepting state; minimize should collapse them together.
    let mut nfa = Nfa::new();
    let node = Node::concat(vec![Node::alt(vec![Node::single('a' as u32), Node::single('b' as u32)]), Node::single('c' as u32)]);
    nfa.add_pattern(0, &node, accept(1, 0, 0));
    let mut journal = Journal::new();
    let dfa = build(&nfa, &mut journal);
    // One state reachable on 'a', one on 'b', both leading into the very
    // same minimized successor state.
    let s0 = &dfa.states[0];
    assert_eq!(s0.transitions.len(), 2);
    let targets: Array<u32> = s0.transitions.iter().map(|t| t.target).collect();
    assert_ne!(targets[0], targets[1]);
  }
}
