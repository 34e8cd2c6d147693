//! Opaque, dense integer ids for the handful of things the pipeline needs to
//! name: terminals, non-terminals, rules, LR states, DFA symbol classes, and
//! the flattened item index used by [`crate::grammar::Grammar`]'s item
//! cache.
//!
//! Each id is a thin newtype over `u32` rather than a raw index so that a
//! `TermId` can never be passed where a `RuleId` is expected. `u32::MAX` is
//! reserved as the default/"unset" sentinel, matching the convention
//! radlr-core uses for its `DBRuleKey`/`DBNonTermKey` keys.

macro_rules! indexed_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
    pub struct $name(pub u32);

    impl $name {
      /// Returns the raw index backing this id.
      pub fn index(&self) -> usize {
        self.0 as usize
      }
    }

    impl From<u32> for $name {
      fn from(value: u32) -> Self {
        Self(value)
      }
    }

    impl From<usize> for $name {
      fn from(value: usize) -> Self {
        Self(value as u32)
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self(u32::MAX)
      }
    }
  };
}

indexed_id!(
  /// Identifies a terminal symbol (a declared lexical token).
  TermId
);

indexed_id!(
  /// Identifies a non-terminal symbol.
  NonTermId
);

indexed_id!(
  /// Identifies a grammar rule.
  RuleId
);

indexed_id!(
  /// Identifies a state in the LALR machine.
  StateId
);

indexed_id!(
  /// Identifies a symbol-map class (a partition cell of the input alphabet).
  ClassId
);

indexed_id!(
  /// Identifies a flattened `(rule, dot)` pair inside an item closure cache.
  ItemIndex
);

/// The symbol-map class id reserved for ε (no symbol consumed). Kept
/// distinct from every class produced by [`crate::symbol::SymbolMap`] so
/// that ε-transitions are never confused with an ordinary class.
pub const EPSILON_CLASS: ClassId = ClassId(u32::MAX - 1);
