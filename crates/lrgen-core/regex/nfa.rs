//! NFA construction from a parsed [`Node`] tree (spec.md §3/§4.C,
//! component C).

use super::ast::Node;
use crate::symbol::SymbolMap;
use crate::types::{Array, ClassId, TermId, EPSILON_CLASS};

/// One accept action attached to an NFA state: reaching this state means
/// `symbol` has matched, with ties among simultaneously-reachable accepts
/// broken by `eager` first, then `priority` descending, then definition
/// order (spec.md §4.D).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Accept {
  pub symbol:   TermId,
  pub eager:    bool,
  pub priority: i32,
  /// Definition order of the owning rule; the final tie-break.
  pub order:    u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Transition {
  pub class:  ClassId,
  pub target: u32,
}

#[derive(Clone, Debug, Default)]
pub struct NfaState {
  pub transitions: Array<Transition>,
  pub accepts:     Array<Accept>,
}

/// A nondeterministic finite automaton over a shared [`SymbolMap`].
///
/// States are dense integers; state `0` is always the initial state.
/// Multiple transitions on the same class out of one state are allowed —
/// that's what makes it an NFA rather than a DFA — and are resolved by
/// the subset construction in `dfa::build` (component D).
#[derive(Clone, Debug, Default)]
pub struct Nfa {
  pub states: Array<NfaState>,
  pub map:    SymbolMap,
}

impl Nfa {
  pub fn new() -> Self {
    let mut nfa = Self { states: Array::new(), map: SymbolMap::new() };
    nfa.new_state();
    nfa
  }

  pub fn new_state(&mut self) -> u32 {
    self.states.push(NfaState::default());
    (self.states.len() - 1) as u32
  }

  pub fn add_transition(&mut self, from: u32, class: ClassId, to: u32) {
    self.states[from as usize].transitions.push(Transition { class, target: to });
  }

  pub fn add_epsilon(&mut self, from: u32, to: u32) {
    self.add_transition(from, EPSILON_CLASS, to);
  }

  pub fn add_accept(&mut self, state: u32, accept: Accept) {
    self.states[state as usize].accepts.push(accept);
  }

  /// Splices the pattern for one terminal's definition into this NFA,
  /// wiring its start from `entry` (normally state 0) through an
  /// epsilon-transition to a fresh subgraph, and marking the subgraph's
  /// exit state with `accept`.
  ///
  /// Building one shared NFA across every terminal definition (rather
  /// than one NFA per terminal run independently) is what lets the
  /// scanner recognize all of a grammar's terminals in a single pass —
  /// component C's NFA is the union of every terminal's pattern.
  pub fn add_pattern(&mut self, entry: u32, node: &Node, accept: Accept) {
    let start = self.new_state();
    self.add_epsilon(entry, start);
    let end = self.build(node, start);
    self.add_accept(end, accept);
  }

  /// Recursively lowers `node` into states reachable from `from`,
  /// returning the single state at which the subpattern has just
  /// finished matching (Thompson construction, generalized to the
  /// n-ary [`Node::Concat`]/[`Node::Alt`] shapes and to bounded
  /// [`Node::Repeat`]).
  fn build(&mut self, node: &Node, from: u32) -> u32 {
    match node {
      Node::Class(set) => {
        if set.is_empty() {
          // Matches nothing; dead end with no outgoing transition.
          return self.new_state();
        }
        let class = self.map.identifier_for(set.clone());
        let to = self.new_state();
        self.add_transition(from, class, to);
        to
      }
      Node::Concat(parts) => {
        let mut cur = from;
        for part in parts {
          cur = self.build(part, cur);
        }
        cur
      }
      Node::Alt(branches) => {
        let join = self.new_state();
        for branch in branches {
          let end = self.build(branch, from);
          self.add_epsilon(end, join);
        }
        join
      }
      Node::Repeat { child, min, max } => self.build_repeat(child, *min, *max, from),
    }
  }

  fn build_repeat(&mut self, child: &Node, min: u32, max: Option<u32>, from: u32) -> u32 {
    match max {
      // Unbounded: mandatory `min` copies, then a Kleene loop.
      None => {
        let mut cur = from;
        for _ in 0..min {
          cur = self.build(child, cur);
        }
        let loop_start = cur;
        let body_end = self.build(child, loop_start);
        self.add_epsilon(body_end, loop_start);
        let join = self.new_state();
        self.add_epsilon(loop_start, join);
        self.add_epsilon(body_end, join);
        join
      }
      // Bounded: `min` mandatory copies, then `max - min` optional ones,
      // each able to skip straight to the join.
      Some(max) => {
        let mut cur = from;
        for _ in 0..min {
          cur = self.build(child, cur);
        }
        let join = self.new_state();
        self.add_epsilon(cur, join);
        for _ in min..max {
          let next = self.build(child, cur);
          self.add_epsilon(next, join);
          cur = next;
        }
        join
      }
    }
  }

  /// The epsilon-closure of a set of states (repeated application of
  /// [`EPSILON_CLASS`] transitions until no new state is reachable).
  pub fn epsilon_closure(&self, seeds: impl IntoIterator<Item = u32>) -> Array<u32> {
    let mut stack: Array<u32> = seeds.into_iter().collect();
    let mut seen: Array<u32> = stack.clone();
    while let Some(s) = stack.pop() {
      for t in &self.states[s as usize].transitions {
        if t.class == EPSILON_CLASS && !seen.contains(&t.target) {
          seen.push(t.target);
          stack.push(t.target);
        }
      }
    }
    seen.sort_unstable();
    seen
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn accept(id: u32) -> Accept {
    Accept { symbol: TermId::from(id), eager: false, priority: 0, order: id }
  }

  #[test]
  fn literal_pattern_has_one_accept_path() {
    let mut nfa = Nfa::new();
    let node = Node::literal("ab", None);
    nfa.add_pattern(0, &node, accept(1));
    // start -ε-> s0 -a-> s1 -b-> s2(accept)
    let closure = nfa.epsilon_closure([0]);
    assert!(closure.len() >= 2);
  }

  #[test]
  fn star_allows_zero_repetitions() {
    let mut nfa = Nfa::new();
    let node = Node::star(Node::single('a' as u32));
    nfa.add_pattern(0, &node, accept(1));
    let closure = nfa.epsilon_closure([0]);
    let reaches_accept = closure.iter().any(|&s| !nfa.states[s as usize].accepts.is_empty());
    assert!(reaches_accept, "zero repetitions must reach the accept state via epsilon-closure");
  }

  #[test]
  fn alternation_keeps_both_branches_reachable() {
    let mut nfa = Nfa::new();
    let node = Node::alt(vec![Node::single('a' as u32), Node::single('b' as u32)]);
    nfa.add_pattern(0, &node, accept(1));
    let closure = nfa.epsilon_closure([0]);
    let classes: Array<ClassId> = closure.iter().flat_map(|&s| nfa.states[s as usize].transitions.iter().map(|t| t.class)).collect();
    assert_eq!(classes.len(), 2);
  }

  #[test]
  fn bounded_repeat_caps_the_match_count() {
    let mut nfa = Nfa::new();
    let node = Node::bounded(Node::single('a' as u32), 1, Some(2));
    nfa.add_pattern(0, &node, accept(1));
    // Reachability through at most two `a` transitions should terminate;
    // the graph must not contain a cycle introduced by the bound.
    let start_closure = nfa.epsilon_closure([0]);
    assert!(!start_closure.is_empty());
  }
}
