//! Weak/strong terminal DFA splitting and the weak-symbol action
//! rewriter (spec.md §4.I, component I). Guard embedding itself — the
//! guard rule as a first-class nonterminal, and the `guard`/`divert`
//! actions it produces — already happens during closure and synthesis
//! (`lr::lalr::closure`, `lr::action::synthesize`); this module covers
//! the other half of component I: resolving the lexical ambiguity a
//! weak terminal introduces.

use crate::dfa::{Dfa, DfaState};
use crate::grammar::Item;
use crate::lr::{Action, ActionKind, ActionTable, StateActions};
use crate::types::{Array, TermId};

/// A weak terminal and the strong terminal it's promoted to when both
/// are legal. Declared by the grammar front-end; this crate only acts
/// on the pairing, it never discovers it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WeakPair {
  pub weak:   TermId,
  pub strong: TermId,
}

/// One row of the weak→strong map spec.md §4.H/§6 says the assembler
/// emits, keyed on the minted `w_under_s` id rather than the original
/// weak id — the scanner never produces plain `w` once it has a strong
/// counterpart in scope for that accepting state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WeakStrongEntry {
  pub weak:   TermId,
  pub strong: TermId,
}

/// Splits every DFA accepting state whose accepts contain both sides of
/// some [`WeakPair`]: a fresh terminal id `w_under_s` is minted (ids
/// allocated from `next_terminal_id` upward) and substituted for the
/// weak accept in that state only. States where `w` is reachable
/// without a competing `s` keep plain `w` — the ambiguity, and so the
/// need for a split identity, only exists where both are legal.
///
/// Returns the rewritten table and the weak→strong map entries, sorted
/// by weak id per spec.md §6.
pub fn split(dfa: &Dfa, pairs: &[WeakPair], next_terminal_id: u32) -> (Dfa, Array<WeakStrongEntry>) {
  let mut states: Array<DfaState> = dfa.states.clone();
  let mut entries: Array<WeakStrongEntry> = Array::new();
  let mut next_id = next_terminal_id;

  for state in &mut states {
    for pair in pairs {
      let has_weak_idx = state.accepts.iter().position(|a| a.symbol == pair.weak);
      let has_strong = state.accepts.iter().any(|a| a.symbol == pair.strong);
      let Some(weak_idx) = has_weak_idx else { continue };
      if !has_strong {
        continue;
      }
      let minted = TermId::from(next_id);
      next_id += 1;
      state.accepts[weak_idx].symbol = minted;
      entries.push(WeakStrongEntry { weak: minted, strong: pair.strong });
    }
  }

  entries.sort_by_key(|e| e.weak.0);
  (Dfa { states, map: dfa.map.clone() }, entries)
}

/// Weak-symbol rewriter (spec.md §4.G rewriter 1 / §4.I): where a state
/// has a shift-family action on `strong` but none on `weak`, duplicate
/// that action as `shiftstrong(weak)` so the driver promotes a weak
/// match to the strong role. Where both already have actions, `weak`'s
/// own action is left untouched — it already wins by virtue of running
/// first in the sorted run (spec.md §4.H orders `shiftstrong` alongside
/// the rest of the shift family, but `weak`'s own entry, if any, was
/// produced directly by synthesis and is never removed here).
pub fn rewrite_actions(table: &mut ActionTable, entries: &[WeakStrongEntry]) {
  for state in &mut table.states {
    for entry in entries {
      let strong_action = state
        .actions
        .iter()
        .find(|a| a.symbol == Item::Terminal(entry.strong) && is_shift_family(a.kind))
        .cloned();
      let Some(strong_action) = strong_action else { continue };

      let has_weak = state.actions.iter().any(|a| a.symbol == Item::Terminal(entry.weak));
      if !has_weak {
        state.actions.push(Action { kind: ActionKind::ShiftStrong, symbol: Item::Terminal(entry.weak), target: strong_action.target });
      }
    }
  }
}

fn is_shift_family(kind: ActionKind) -> bool {
  matches!(kind, ActionKind::Shift | ActionKind::ShiftStrong | ActionKind::Divert | ActionKind::Accept)
}

/// Runs both halves of component I and leaves `table`'s per-state runs
/// ready for `tables.rs` to flatten: splits the DFA, then rewrites
/// actions against the resulting map.
pub fn integrate(dfa: &Dfa, table: &mut ActionTable, pairs: &[WeakPair], next_terminal_id: u32) -> (Dfa, Array<WeakStrongEntry>) {
  let (split_dfa, entries) = split(dfa, pairs, next_terminal_id);
  rewrite_actions(table, &entries);
  (split_dfa, entries)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::lr::ActionTarget;
  use crate::regex::Accept;
  use crate::types::StateId;

  fn accept(id: u32) -> Accept {
    Accept { symbol: TermId::from(id), eager: false, priority: 0, order: id }
  }

  fn dfa_with_competing_accepts(weak: u32, strong: u32) -> Dfa {
    Dfa {
      states: vec![DfaState { transitions: Array::new(), accepts: vec![accept(weak), accept(strong)] }],
      map: crate::symbol::SymbolMap::new(),
    }
  }

  #[test]
  fn splits_state_with_both_weak_and_strong_accepts() {
    let dfa = dfa_with_competing_accepts(10, 20);
    let pair = WeakPair { weak: TermId::from(10u32), strong: TermId::from(20u32) };
    let (split_dfa, entries) = split(&dfa, &[pair], 100);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].strong, TermId::from(20u32));
    assert_eq!(entries[0].weak, TermId::from(100u32));
    assert!(split_dfa.states[0].accepts.iter().any(|a| a.symbol == entries[0].weak));
    assert!(!split_dfa.states[0].accepts.iter().any(|a| a.symbol == TermId::from(10u32)));
  }

  #[test]
  fn leaves_non_competing_state_untouched() {
    let dfa = Dfa {
      states: vec![DfaState { transitions: Array::new(), accepts: vec![accept(10)] }],
      map: crate::symbol::SymbolMap::new(),
    };
    let pair = WeakPair { weak: TermId::from(10u32), strong: TermId::from(20u32) };
    let (split_dfa, entries) = split(&dfa, &[pair], 100);
    assert!(entries.is_empty());
    assert_eq!(split_dfa.states[0].accepts[0].symbol, TermId::from(10u32));
  }

  #[test]
  fn rewriter_adds_shiftstrong_where_only_strong_has_an_action() {
    let mut table = ActionTable {
      states: vec![StateActions {
        actions: vec![Action { kind: ActionKind::Shift, symbol: Item::Terminal(TermId::from(20u32)), target: ActionTarget::State(StateId::from(7u32)) }],
      }],
    };
    let entries = [WeakStrongEntry { weak: TermId::from(100u32), strong: TermId::from(20u32) }];
    rewrite_actions(&mut table, &entries);

    let added = table.states[0].actions.iter().find(|a| a.symbol == Item::Terminal(TermId::from(100u32))).unwrap();
    assert_eq!(added.kind, ActionKind::ShiftStrong);
  }

  #[test]
  fn rewriter_leaves_weaks_own_action_when_both_present() {
    let mut table = ActionTable {
      states: vec![StateActions {
        actions: vec![
          Action { kind: ActionKind::Shift, symbol: Item::Terminal(TermId::from(20u32)), target: ActionTarget::State(StateId::from(7u32)) },
          Action { kind: ActionKind::Shift, symbol: Item::Terminal(TermId::from(100u32)), target: ActionTarget::State(StateId::from(9u32)) },
        ],
      }],
    };
    let entries = [WeakStrongEntry { weak: TermId::from(100u32), strong: TermId::from(20u32) }];
    rewrite_actions(&mut table, &entries);

    let weak_actions: Array<&Action> = table.states[0].actions.iter().filter(|a| a.symbol == Item::Terminal(TermId::from(100u32))).collect();
    assert_eq!(weak_actions.len(), 1, "no duplicate shiftstrong when weak already has its own action");
    assert_eq!(weak_actions[0].kind, ActionKind::Shift);
  }
}
