//! Action synthesis and the rewriters that resolve conflicts
//! (spec.md §4.G "Action synthesis"/§4.H, components G/H).

use super::lalr::LalrMachine;
use crate::grammar::{first, FirstSets, Grammar, Item};
use crate::types::{Array, GenError, Journal, NonTermId, OrderedMap, OrderedSet, RuleId, StateId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActionKind {
  Shift,
  ShiftStrong,
  Ignore,
  Reduce,
  WeakReduce,
  Accept,
  Goto,
  Divert,
  Guard,
}

impl ActionKind {
  /// Ordering priority within one `(state, symbol)` run: `guard` first,
  /// then `weakreduce`, then `reduce`, then the shift family — so a
  /// driver scanning forward always tries the conditional actions
  /// before the unconditional ones (spec.md §4.H).
  pub fn priority(self) -> u8 {
    match self {
      ActionKind::Guard => 0,
      ActionKind::WeakReduce => 1,
      ActionKind::Reduce => 2,
      ActionKind::Ignore => 3,
      ActionKind::Shift | ActionKind::ShiftStrong | ActionKind::Divert | ActionKind::Accept => 4,
      ActionKind::Goto => 5,
    }
  }
}

#[derive(Clone, Copy, Debug)]
pub enum ActionTarget {
  State(StateId),
  Rule(RuleId),
}

#[derive(Clone, Debug)]
pub struct Action {
  pub kind:   ActionKind,
  pub symbol: Item,
  pub target: ActionTarget,
}

#[derive(Clone, Debug, Default)]
pub struct StateActions {
  pub actions: Array<Action>,
}

impl StateActions {
  /// The terminal-keyed run spec.md §4.H assembles: entries on
  /// `Item::Terminal` symbols, ordered by `(symbol_id, action-kind
  /// priority)` so a driver scanning forward meets `guard` before
  /// `weakreduce` before `reduce` before the shift family.
  pub fn terminal_run(&self) -> Array<&Action> {
    let mut run: Array<&Action> = self.actions.iter().filter(|a| matches!(a.symbol, Item::Terminal(_))).collect();
    run.sort_by_key(|a| {
      let Item::Terminal(t) = &a.symbol else { unreachable!() };
      (t.0, a.kind.priority())
    });
    run
  }

  /// The non-terminal-keyed run: `goto` entries, ordered by symbol id.
  pub fn nonterminal_run(&self) -> Array<&Action> {
    let mut run: Array<&Action> = self.actions.iter().filter(|a| matches!(a.symbol, Item::NonTerminal(_))).collect();
    run.sort_by_key(|a| {
      let Item::NonTerminal(n) = &a.symbol else { unreachable!() };
      n.0
    });
    run
  }
}

#[derive(Clone, Debug)]
pub struct ActionTable {
  pub states: Array<StateActions>,
}

/// Runs action synthesis for every state, then the conflict-resolution
/// and LR(1) demotion rewriters, in the order spec.md §4.G lists them
/// (the weak-symbol rewriter runs afterward, in `weak.rs`, since it
/// needs the weak/strong terminal map that only the grammar front-end
/// supplies).
pub fn assemble(grammar: &Grammar, firsts: &FirstSets, machine: &LalrMachine, journal: &mut Journal) -> ActionTable {
  let mut states: Array<StateActions> = machine.states.iter().map(|s| StateActions { actions: synthesize(s, grammar, firsts, machine.start_rule) }).collect();
  demote_conflicts(&mut states, grammar, machine);
  report_unresolved_conflicts(&states, journal);
  ActionTable { states }
}

fn synthesize(state: &super::lalr::LrState, grammar: &Grammar, firsts: &FirstSets, start_rule: RuleId) -> Array<Action> {
  let mut actions = Array::new();

  for item in state.items.items() {
    let rule = grammar.rule(item.kernel.rule);
    if !rule.is_complete_at(item.kernel.dot) {
      match &rule.rhs[item.kernel.dot] {
        Item::Terminal(_) => {
          let symbol = rule.rhs[item.kernel.dot].clone();
          if let Some(&target) = state.transitions.get(&symbol) {
            actions.push(Action { kind: ActionKind::Shift, symbol, target: ActionTarget::State(target) });
          }
        }
        Item::NonTerminal(_) => {
          let symbol = rule.rhs[item.kernel.dot].clone();
          if let Some(&target) = state.transitions.get(&symbol) {
            actions.push(Action { kind: ActionKind::Goto, symbol, target: ActionTarget::State(target) });
          }
        }
        Item::Guard { rule: guard_rule, .. } => {
          let symbol = rule.rhs[item.kernel.dot].clone();
          let Some(&target) = state.transitions.get(&symbol) else { continue };
          let first_set = first(&symbol, grammar, firsts);
          let triggers: Array<Item> = first_set.into_iter().filter(|x| *x != Item::Empty).collect();
          if triggers.len() == 1 {
            actions.push(Action { kind: ActionKind::Divert, symbol: triggers[0].clone(), target: ActionTarget::State(target) });
          } else {
            for trigger in triggers {
              actions.push(Action { kind: ActionKind::Guard, symbol: trigger, target: ActionTarget::Rule(*guard_rule) });
            }
          }
        }
        Item::Empty | Item::Alt(_) | Item::Opt(_) | Item::Repeat { .. } => {}
        Item::EndOfInput | Item::EndOfGuard => {}
      }
    } else {
      let kind = if item.kernel.rule == start_rule { ActionKind::Accept } else { ActionKind::Reduce };
      for la in item.lookahead.iter() {
        actions.push(Action { kind, symbol: la.clone(), target: ActionTarget::Rule(item.kernel.rule) });
      }
    }
  }

  actions
}

/// LR(1) demotion rewriter (spec.md §4.G rewriter 2), simplified: rather
/// than simulating the exact parse-stack pop for each conflicting
/// reduction, it asks whether *any* goto edge on the reducing rule's LHS
/// lands in a state that shifts the conflicted symbol. Exactly one
/// candidate answering yes demotes the others to `weakreduce`.
fn demote_conflicts(states: &mut [StateActions], grammar: &Grammar, machine: &LalrMachine) {
  let shifts_after_goto = index_shifts_after_goto(states, machine);

  for state in states.iter_mut() {
    let mut by_symbol: OrderedMap<Item, Array<usize>> = OrderedMap::new();
    for (i, action) in state.actions.iter().enumerate() {
      by_symbol.entry(action.symbol.clone()).or_default().push(i);
    }

    for (symbol, indices) in by_symbol {
      let reduce_indices: Array<usize> = indices.iter().copied().filter(|&i| matches!(state.actions[i].kind, ActionKind::Reduce)).collect();
      let has_shift_family = indices.iter().any(|&i| matches!(state.actions[i].kind, ActionKind::Shift | ActionKind::ShiftStrong | ActionKind::Divert | ActionKind::Accept));

      if reduce_indices.len() < 2 && !(reduce_indices.len() == 1 && has_shift_family) {
        continue;
      }

      let would_shift: Array<usize> = reduce_indices
        .iter()
        .copied()
        .filter(|&i| {
          let ActionTarget::Rule(rule_id) = state.actions[i].target else { return false };
          let lhs = grammar.rule(rule_id).lhs;
          shifts_after_goto.get(&lhs).is_some_and(|syms| syms.contains(&symbol))
        })
        .collect();

      // Demote every candidate except a single one that would shift —
      // that one keeps its strong `reduce`.
      if would_shift.len() == 1 {
        for &i in &reduce_indices {
          if !would_shift.contains(&i) {
            state.actions[i].kind = ActionKind::WeakReduce;
          }
        }
      } else if has_shift_family && reduce_indices.len() == 1 && would_shift.is_empty() {
        state.actions[reduce_indices[0]].kind = ActionKind::WeakReduce;
      }
    }
  }
}

/// For each non-terminal `N`, the set of symbols shiftable immediately
/// after some goto edge labelled `N`.
fn index_shifts_after_goto(states: &[StateActions], machine: &LalrMachine) -> OrderedMap<NonTermId, OrderedSet<Item>> {
  let mut index: OrderedMap<NonTermId, OrderedSet<Item>> = OrderedMap::new();
  for lr_state in &machine.states {
    for (symbol, target) in &lr_state.transitions {
      if let Item::NonTerminal(n) = symbol {
        let target_actions = &states[target.index()].actions;
        let entry = index.entry(*n).or_default();
        for a in &target_actions.actions {
          if matches!(a.kind, ActionKind::Shift | ActionKind::ShiftStrong | ActionKind::Divert | ActionKind::Accept) {
            entry.insert(a.symbol.clone());
          }
        }
      }
    }
  }
  index
}

/// Conflict-resolution rewriter (spec.md §4.G rewriter 3): anything
/// still ambiguous after demotion is reported. This implementation has
/// no user-supplied disambiguation priority to consult (that's a
/// surface-grammar concern), so every retained conflict is simply
/// diagnosed.
fn report_unresolved_conflicts(states: &[StateActions], journal: &mut Journal) {
  for (state_idx, state) in states.iter().enumerate() {
    let mut by_symbol: OrderedMap<Item, Array<&Action>> = OrderedMap::new();
    for action in &state.actions {
      by_symbol.entry(action.symbol.clone()).or_default().push(action);
    }
    for (symbol, actions) in by_symbol {
      let Item::Terminal(term) = symbol else { continue };
      let reduces: Array<RuleId> = actions
        .iter()
        .filter(|a| matches!(a.kind, ActionKind::Reduce))
        .filter_map(|a| match a.target {
          ActionTarget::Rule(r) => Some(r),
          _ => None,
        })
        .collect();
      let has_shift = actions.iter().any(|a| matches!(a.kind, ActionKind::Shift | ActionKind::ShiftStrong | ActionKind::Divert));

      if reduces.len() > 1 {
        journal.report(GenError::ReduceReduceConflict { state: StateId::from(state_idx), symbol: term, rules: reduces });
      } else if reduces.len() == 1 && has_shift {
        journal.report(GenError::ShiftReduceConflict { state: StateId::from(state_idx), symbol: term, candidates: reduces });
      }
    }
  }
}

