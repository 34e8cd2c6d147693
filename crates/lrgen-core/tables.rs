//! Binary wire format for the generated table (spec.md §6): header,
//! state-offset table, action region, rule table, weak→strong map, DFA
//! table, symbol-class table. The driver loop that consumes this is out
//! of scope; this module only has to produce bytes the protocol
//! described in §6 agrees with and read them back unchanged (spec.md §8:
//! "serialising a table and parsing it back produces an equal table").

use crate::dfa::Dfa;
use crate::grammar::Grammar;
use crate::lr::{ActionKind, ActionTable, ActionTarget};
use crate::types::{Array, GenError, GenResult, StateId};
use crate::weak::WeakStrongEntry;

pub const MAGIC: u32 = 0x4C52_4731; // "LRG1"
pub const VERSION: u32 = 1;

/// Reserved lexical ids (spec.md §6), for callers wiring this table to a
/// driver. Not produced by anything in this crate.
pub const NO_MATCH: i32 = -1;
pub const END_OF_INPUT: i32 = -2;
pub const INVALID: i32 = -3;

fn kind_to_wire(kind: ActionKind) -> u8 {
  match kind {
    ActionKind::Shift => 0,
    ActionKind::ShiftStrong => 1,
    ActionKind::Ignore => 2,
    ActionKind::Reduce => 3,
    ActionKind::WeakReduce => 4,
    ActionKind::Accept => 5,
    ActionKind::Goto => 6,
    ActionKind::Divert => 7,
    ActionKind::Guard => 8,
  }
}

fn kind_from_wire(byte: u8) -> GenResult<ActionKind> {
  match byte {
    0 => Ok(ActionKind::Shift),
    1 => Ok(ActionKind::ShiftStrong),
    2 => Ok(ActionKind::Ignore),
    3 => Ok(ActionKind::Reduce),
    4 => Ok(ActionKind::WeakReduce),
    5 => Ok(ActionKind::Accept),
    6 => Ok(ActionKind::Goto),
    7 => Ok(ActionKind::Divert),
    8 => Ok(ActionKind::Guard),
    other => Err(GenError::Invariant { message: format!("unknown action kind byte {other}") }),
  }
}

/// One `(symbol_id, kind, target)` triple, already in the integer shape
/// the wire format and the round-trip comparison both use.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireAction {
  pub symbol: i32,
  pub kind:   u8,
  pub target: i32,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct WireState {
  pub terminal_actions:    Array<WireAction>,
  pub nonterminal_actions: Array<WireAction>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireRule {
  pub lhs:        i32,
  pub rhs_length: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireWeakStrong {
  pub weak:   i32,
  pub strong: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireTransition {
  pub class:  i32,
  pub target: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireAccept {
  pub terminal: i32,
  pub eager:    u8,
  pub priority: i32,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct WireDfaState {
  pub transitions: Array<WireTransition>,
  pub accepts:     Array<WireAccept>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireClassRange {
  pub lo:    i32,
  pub hi:    i32,
  pub class: i32,
}

/// The full generated table, already in wire shape. Produced by
/// [`assemble`]; [`write`]/[`read`] move it to and from bytes.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct BuiltTable {
  pub terminal_count:    i32,
  pub nonterminal_count: i32,
  pub end_of_input:      i32,
  pub end_of_guard:      i32,
  pub initial_states:    Array<i32>,
  pub states:            Array<WireState>,
  pub rules:             Array<WireRule>,
  pub weak_to_strong:    Array<WireWeakStrong>,
  pub dfa_states:        Array<WireDfaState>,
  pub classes:           Array<WireClassRange>,
}

fn target_to_wire(target: ActionTarget) -> i32 {
  match target {
    ActionTarget::State(s) => s.0 as i32,
    ActionTarget::Rule(r) => r.0 as i32,
  }
}

/// Flattens every built phase into the wire shape spec.md §6 describes.
/// `end_of_input`/`end_of_guard` and `initial_states` are the ids the
/// grammar front-end assigned its reserved symbols and start rules;
/// this crate only carries them through to the header.
pub fn assemble(
  grammar: &Grammar,
  dfa: &Dfa,
  table: &ActionTable,
  weak_entries: &[WeakStrongEntry],
  end_of_input: i32,
  end_of_guard: i32,
  initial_states: &[StateId],
) -> BuiltTable {
  let states: Array<WireState> = table
    .states
    .iter()
    .map(|s| {
      let terminal_actions = s.terminal_run().iter().map(|a| WireAction { symbol: terminal_symbol_id(a), kind: kind_to_wire(a.kind), target: target_to_wire(a.target) }).collect();
      let nonterminal_actions = s.nonterminal_run().iter().map(|a| WireAction { symbol: nonterminal_symbol_id(a), kind: kind_to_wire(a.kind), target: target_to_wire(a.target) }).collect();
      WireState { terminal_actions, nonterminal_actions }
    })
    .collect();

  let rules: Array<WireRule> = grammar.rules().map(|(_, r)| WireRule { lhs: r.lhs.0 as i32, rhs_length: r.rhs.len() as i32 }).collect();

  let mut weak_to_strong: Array<WireWeakStrong> = weak_entries.iter().map(|e| WireWeakStrong { weak: e.weak.0 as i32, strong: e.strong.0 as i32 }).collect();
  weak_to_strong.sort_by_key(|e| e.weak);

  let dfa_states: Array<WireDfaState> = dfa
    .states
    .iter()
    .map(|s| {
      let mut transitions: Array<WireTransition> = s.transitions.iter().map(|t| WireTransition { class: t.class.0 as i32, target: t.target as i32 }).collect();
      transitions.sort_by_key(|t| t.class);
      let accepts: Array<WireAccept> = s.accepts.iter().map(|a| WireAccept { terminal: a.symbol.0 as i32, eager: a.eager as u8, priority: a.priority }).collect();
      WireDfaState { transitions, accepts }
    })
    .collect();

  let mut classes: Array<WireClassRange> = dfa.map.cells().flat_map(|(id, set)| set.ranges().iter().map(move |r| WireClassRange { lo: r.lo as i32, hi: r.hi as i32, class: id.0 as i32 })).collect();
  classes.sort_by_key(|c| c.lo);

  BuiltTable {
    terminal_count: dfa.map.len() as i32,
    nonterminal_count: grammar.nonterminals().count() as i32,
    end_of_input,
    end_of_guard,
    initial_states: initial_states.iter().map(|s| s.0 as i32).collect(),
    states,
    rules,
    weak_to_strong,
    dfa_states,
    classes,
  }
}

fn terminal_symbol_id(a: &crate::lr::Action) -> i32 {
  a.symbol.as_terminal().map(|t| t.0 as i32).unwrap_or(INVALID)
}

fn nonterminal_symbol_id(a: &crate::lr::Action) -> i32 {
  a.symbol.as_nonterminal().map(|n| n.0 as i32).unwrap_or(INVALID)
}

fn push_i32(out: &mut Array<u8>, v: i32) {
  out.extend_from_slice(&v.to_ne_bytes());
}

fn push_u32(out: &mut Array<u8>, v: u32) {
  out.extend_from_slice(&v.to_ne_bytes());
}

fn push_u8(out: &mut Array<u8>, v: u8) {
  out.push(v);
}

/// Serialises a [`BuiltTable`] to the layout spec.md §6 lays out: header,
/// state-offset table, action region, rule table, weak→strong map, DFA
/// table, symbol-class table.
pub fn write(table: &BuiltTable) -> Array<u8> {
  let mut out = Array::new();

  push_u32(&mut out, MAGIC);
  push_u32(&mut out, VERSION);
  push_u32(&mut out, table.states.len() as u32);
  push_i32(&mut out, table.terminal_count);
  push_i32(&mut out, table.nonterminal_count);
  push_i32(&mut out, table.end_of_input);
  push_i32(&mut out, table.end_of_guard);
  push_u32(&mut out, table.initial_states.len() as u32);
  for &s in &table.initial_states {
    push_i32(&mut out, s);
  }

  // State-offset table: state_count+1 offsets into the action region,
  // measured in actions (terminal run then nonterminal run) rather than
  // bytes — the reader reconstructs byte offsets itself, since every
  // action is fixed-width.
  let mut offset = 0u32;
  let mut offsets: Array<u32> = Array::with_capacity(table.states.len() + 1);
  for state in &table.states {
    offsets.push(offset);
    offset += (state.terminal_actions.len() + state.nonterminal_actions.len()) as u32;
  }
  offsets.push(offset);
  for o in &offsets {
    push_u32(&mut out, *o);
  }

  for state in &table.states {
    push_u32(&mut out, state.terminal_actions.len() as u32);
    for a in &state.terminal_actions {
      push_i32(&mut out, a.symbol);
      push_u8(&mut out, a.kind);
      push_i32(&mut out, a.target);
    }
    push_u32(&mut out, state.nonterminal_actions.len() as u32);
    for a in &state.nonterminal_actions {
      push_i32(&mut out, a.symbol);
      push_u8(&mut out, a.kind);
      push_i32(&mut out, a.target);
    }
  }

  push_u32(&mut out, table.rules.len() as u32);
  for r in &table.rules {
    push_i32(&mut out, r.lhs);
    push_i32(&mut out, r.rhs_length);
  }

  push_u32(&mut out, table.weak_to_strong.len() as u32);
  for e in &table.weak_to_strong {
    push_i32(&mut out, e.weak);
    push_i32(&mut out, e.strong);
  }

  push_u32(&mut out, table.dfa_states.len() as u32);
  for s in &table.dfa_states {
    push_u32(&mut out, s.transitions.len() as u32);
    for t in &s.transitions {
      push_i32(&mut out, t.class);
      push_i32(&mut out, t.target);
    }
    push_u32(&mut out, s.accepts.len() as u32);
    for a in &s.accepts {
      push_i32(&mut out, a.terminal);
      push_u8(&mut out, a.eager);
      push_i32(&mut out, a.priority);
    }
  }

  push_u32(&mut out, table.classes.len() as u32);
  for c in &table.classes {
    push_i32(&mut out, c.lo);
    push_i32(&mut out, c.hi);
    push_i32(&mut out, c.class);
  }

  out
}

struct Reader<'a> {
  bytes: &'a [u8],
  pos:   usize,
}

impl<'a> Reader<'a> {
  fn new(bytes: &'a [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  fn u32(&mut self) -> GenResult<u32> {
    let end = self.pos + 4;
    let slice = self.bytes.get(self.pos..end).ok_or_else(truncated)?;
    self.pos = end;
    Ok(u32::from_ne_bytes(slice.try_into().unwrap()))
  }

  fn i32(&mut self) -> GenResult<i32> {
    Ok(self.u32()? as i32)
  }

  fn u8(&mut self) -> GenResult<u8> {
    let b = *self.bytes.get(self.pos).ok_or_else(truncated)?;
    self.pos += 1;
    Ok(b)
  }
}

fn truncated() -> GenError {
  GenError::Invariant { message: "table bytes truncated".to_string() }
}

/// Parses bytes produced by [`write`] back into a [`BuiltTable`]. The
/// state-offset table is read but not retained — `states` is
/// reconstructed directly from the action region, which already carries
/// each state's boundaries via its own counts — since nothing downstream
/// of this crate needs random access into the action region by byte
/// offset.
pub fn read(bytes: &[u8]) -> GenResult<BuiltTable> {
  let mut r = Reader::new(bytes);

  let magic = r.u32()?;
  if magic != MAGIC {
    return Err(GenError::Invariant { message: format!("bad magic {magic:#x}") });
  }
  let version = r.u32()?;
  if version != VERSION {
    return Err(GenError::Invariant { message: format!("unsupported table version {version}") });
  }

  let state_count = r.u32()?;
  let terminal_count = r.i32()?;
  let nonterminal_count = r.i32()?;
  let end_of_input = r.i32()?;
  let end_of_guard = r.i32()?;
  let initial_count = r.u32()?;
  let mut initial_states = Array::with_capacity(initial_count as usize);
  for _ in 0..initial_count {
    initial_states.push(r.i32()?);
  }

  for _ in 0..=state_count {
    r.u32()?; // state-offset table entry, skipped: see doc comment above.
  }

  let mut states = Array::with_capacity(state_count as usize);
  for _ in 0..state_count {
    let terminal_count = r.u32()?;
    let mut terminal_actions = Array::with_capacity(terminal_count as usize);
    for _ in 0..terminal_count {
      let symbol = r.i32()?;
      let kind = r.u8()?;
      kind_from_wire(kind)?;
      let target = r.i32()?;
      terminal_actions.push(WireAction { symbol, kind, target });
    }
    let nonterminal_count = r.u32()?;
    let mut nonterminal_actions = Array::with_capacity(nonterminal_count as usize);
    for _ in 0..nonterminal_count {
      let symbol = r.i32()?;
      let kind = r.u8()?;
      kind_from_wire(kind)?;
      let target = r.i32()?;
      nonterminal_actions.push(WireAction { symbol, kind, target });
    }
    states.push(WireState { terminal_actions, nonterminal_actions });
  }

  let rule_count = r.u32()?;
  let mut rules = Array::with_capacity(rule_count as usize);
  for _ in 0..rule_count {
    let lhs = r.i32()?;
    let rhs_length = r.i32()?;
    rules.push(WireRule { lhs, rhs_length });
  }

  let weak_count = r.u32()?;
  let mut weak_to_strong = Array::with_capacity(weak_count as usize);
  for _ in 0..weak_count {
    let weak = r.i32()?;
    let strong = r.i32()?;
    weak_to_strong.push(WireWeakStrong { weak, strong });
  }

  let dfa_state_count = r.u32()?;
  let mut dfa_states = Array::with_capacity(dfa_state_count as usize);
  for _ in 0..dfa_state_count {
    let transition_count = r.u32()?;
    let mut transitions = Array::with_capacity(transition_count as usize);
    for _ in 0..transition_count {
      let class = r.i32()?;
      let target = r.i32()?;
      transitions.push(WireTransition { class, target });
    }
    let accept_count = r.u32()?;
    let mut accepts = Array::with_capacity(accept_count as usize);
    for _ in 0..accept_count {
      let terminal = r.i32()?;
      let eager = r.u8()?;
      let priority = r.i32()?;
      accepts.push(WireAccept { terminal, eager, priority });
    }
    dfa_states.push(WireDfaState { transitions, accepts });
  }

  let class_count = r.u32()?;
  let mut classes = Array::with_capacity(class_count as usize);
  for _ in 0..class_count {
    let lo = r.i32()?;
    let hi = r.i32()?;
    let class = r.i32()?;
    classes.push(WireClassRange { lo, hi, class });
  }

  Ok(BuiltTable { terminal_count, nonterminal_count, end_of_input, end_of_guard, initial_states, states, rules, weak_to_strong, dfa_states, classes })
}

#[cfg(test)]
mod test {
  use super::*;

  fn sample() -> BuiltTable {
    BuiltTable {
      terminal_count: 2,
      nonterminal_count: 1,
      end_of_input: END_OF_INPUT,
      end_of_guard: -4,
      initial_states: vec![0],
      states: vec![
        WireState {
          terminal_actions: vec![WireAction { symbol: 0, kind: 0, target: 1 }, WireAction { symbol: 1, kind: 3, target: 0 }],
          nonterminal_actions: vec![WireAction { symbol: 0, kind: 6, target: 2 }],
        },
        WireState { terminal_actions: Array::new(), nonterminal_actions: Array::new() },
      ],
      rules: vec![WireRule { lhs: 0, rhs_length: 2 }],
      weak_to_strong: vec![WireWeakStrong { weak: 5, strong: 1 }],
      dfa_states: vec![WireDfaState { transitions: vec![WireTransition { class: 0, target: 1 }], accepts: vec![WireAccept { terminal: 1, eager: 0, priority: 0 }] }],
      classes: vec![WireClassRange { lo: 0, hi: 10, class: 0 }],
    }
  }

  #[test]
  fn round_trip_is_structurally_equal() {
    let table = sample();
    let bytes = write(&table);
    let parsed = read(&bytes).unwrap();
    assert_eq!(table, parsed);
  }

  #[test]
  fn rejects_bad_magic() {
    let mut bytes = write(&sample());
    bytes[0] ^= 0xFF;
    let err = read(&bytes).unwrap_err();
    assert!(matches!(err, GenError::Invariant { .. }));
  }

  #[test]
  fn rejects_truncated_input() {
    let bytes = write(&sample());
    let err = read(&bytes[..bytes.len() - 4]).unwrap_err();
    assert!(matches!(err, GenError::Invariant { .. }));
  }
}
