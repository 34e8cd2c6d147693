//! Error taxonomy for the builder pipeline (spec.md §7).

use crate::types::{ClassId, NonTermId, RuleId, StateId, TermId};

#[bitmask_enum::bitmask]
/// Severity of a single diagnostic. A `Detail` is attached to a preceding
/// diagnostic rather than standing alone, so it's a bit rather than a
/// variant: a diagnostic can be `Error | Detail` when it elaborates on the
/// error immediately before it in the journal.
pub enum Severity {
  Detail  = 0b1000,
  Warning = 0b0100,
  Error   = 0b0010,
  Bug     = 0b0001,
}

/// A single point of failure raised by some phase of the builder.
///
/// Every variant carries the state it was raised from where one exists, so
/// a caller can correlate it back to a specific LR state, DFA state, or
/// rule without re-deriving it from a message string.
#[derive(Clone, Debug)]
pub enum GenError {
  /// A regular expression failed to parse. `pos` is the byte offset into
  /// the pattern source where the parser gave up.
  RegexParse { pos: usize, message: String },
  /// An escape sequence in a regular expression is not recognised.
  RegexEscape { ch: char },
  /// A rule's RHS references a terminal that was never declared.
  UnknownTerminal { name: String },
  /// A rule's RHS (or the grammar's start symbol) references a
  /// non-terminal that has no rules.
  UnknownNonterminal { name: String },
  /// The same `(lhs, rhs)` pair was declared more than once.
  DuplicateRule { nonterm: NonTermId },
  /// A grammar has no rules at all.
  EmptyGrammar,
  /// A state admits both a shift and one or more reduces on the same
  /// lookahead, and no rewriter resolved it.
  ShiftReduceConflict { state: StateId, symbol: TermId, candidates: Vec<RuleId> },
  /// A state admits two or more reduces on the same lookahead, and no
  /// rewriter resolved it.
  ReduceReduceConflict { state: StateId, symbol: TermId, rules: Vec<RuleId> },
  /// A guard's own LALR construction is itself ambiguous.
  GuardAmbiguity { rule: RuleId },
  /// An alphabet class was referenced that no symbol map entry produced.
  UnknownClass { class: ClassId },
  /// A terminal's accept action never wins a tie-break in any DFA state,
  /// so the scanner can never actually produce it. Raised as a warning,
  /// not an error: the table is still well-formed.
  UnreachableTerminal { symbol: TermId },
  /// An internal invariant failed. Always `Severity::Bug`; the phase that
  /// raised it discards its partial output.
  Invariant { message: String },
}

impl GenError {
  /// The severity this error is always raised at. Warnings are
  /// constructed directly as [`crate::types::Diagnostic`]s rather than
  /// through this enum, since they never block emission and most have no
  /// natural "error" reading.
  pub fn severity(&self) -> Severity {
    match self {
      GenError::Invariant { .. } => Severity::Bug,
      GenError::UnreachableTerminal { .. } => Severity::Warning,
      _ => Severity::Error,
    }
  }
}

impl std::fmt::Display for GenError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      GenError::RegexParse { pos, message } => write!(f, "regex parse error at byte {pos}: {message}"),
      GenError::RegexEscape { ch } => write!(f, "unsupported escape sequence '\\{ch}'"),
      GenError::UnknownTerminal { name } => write!(f, "reference to undeclared terminal '{name}'"),
      GenError::UnknownNonterminal { name } => write!(f, "reference to undefined non-terminal '{name}'"),
      GenError::DuplicateRule { nonterm } => write!(f, "duplicate rule for non-terminal {}", nonterm.0),
      GenError::EmptyGrammar => write!(f, "grammar has no rules"),
      GenError::ShiftReduceConflict { state, symbol, candidates } => {
        write!(f, "shift/reduce conflict in state {} on symbol {}: {} candidate reductions", state.0, symbol.0, candidates.len())
      }
      GenError::ReduceReduceConflict { state, symbol, rules } => {
        write!(f, "reduce/reduce conflict in state {} on symbol {}: rules {:?}", state.0, symbol.0, rules)
      }
      GenError::GuardAmbiguity { rule } => write!(f, "guard rule {} is itself ambiguous", rule.0),
      GenError::UnknownClass { class } => write!(f, "reference to undefined symbol class {}", class.0),
      GenError::UnreachableTerminal { symbol } => write!(f, "terminal {} is never the winning accept in any scanner state", symbol.0),
      GenError::Invariant { message } => write!(f, "internal invariant violated: {message}"),
    }
  }
}

impl std::error::Error for GenError {}

/// Result alias for single-cause, fatal failures. Most of the pipeline
/// instead accumulates diagnostics into a [`crate::types::Journal`] and
/// keeps going; this alias is for the handful of calls (e.g. parsing one
/// regex pattern) that must stop immediately and hand the caller a cause.
pub type GenResult<T> = Result<T, GenError>;
