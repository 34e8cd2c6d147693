//! The regular-expression AST accepted by the NFA builder (component C).
//!
//! Deliberately small: character classes, repetition, alternation,
//! grouping and anchored literals only, per spec.md's Non-goals. There is
//! no AST node for lookaround, backreferences, or any other feature a
//! general-purpose regex engine might carry.

use crate::symbol::SymbolSet;
use crate::types::Array;

/// One node of a parsed pattern.
#[derive(Clone, Debug)]
pub enum Node {
  /// A literal set of code points, e.g. a single char, an escape, or a
  /// bracketed class `[a-z0-9]` (already unioned into one set; negation
  /// is resolved at parse time via [`SymbolSet::complement_within`]).
  Class(SymbolSet),
  /// `ab` — match `a` immediately followed by `b`.
  Concat(Array<Node>),
  /// `a|b|c` — match any one alternative.
  Alt(Array<Node>),
  /// `a*`, `a+`, `a?`, `a{n,m}` — repeat `child` between `min` and `max`
  /// (inclusive) times. `max = None` means unbounded.
  Repeat { child: Box<Node>, min: u32, max: Option<u32> },
}

impl Node {
  pub fn single(cp: u32) -> Self {
    Node::Class(SymbolSet::single(cp))
  }

  pub fn concat(parts: Array<Node>) -> Self {
    if parts.len() == 1 {
      parts.into_iter().next().unwrap()
    } else {
      Node::Concat(parts)
    }
  }

  pub fn alt(parts: Array<Node>) -> Self {
    if parts.len() == 1 {
      parts.into_iter().next().unwrap()
    } else {
      Node::Alt(parts)
    }
  }

  pub fn star(child: Node) -> Self {
    Node::Repeat { child: Box::new(child), min: 0, max: None }
  }

  pub fn plus(child: Node) -> Self {
    Node::Repeat { child: Box::new(child), min: 1, max: None }
  }

  pub fn optional(child: Node) -> Self {
    Node::Repeat { child: Box::new(child), min: 0, max: Some(1) }
  }

  pub fn bounded(child: Node, min: u32, max: Option<u32>) -> Self {
    Node::Repeat { child: Box::new(child), min, max }
  }

  /// Builds the node for a literal string, optionally expanding every
  /// character through a case-folding function (§4.C: "the resulting NFA
  /// has no case bit — the alphabet alone carries it").
  pub fn literal(text: &str, fold: Option<&dyn Fn(u32) -> Option<u32>>) -> Self {
    let parts: Array<Node> = text
      .chars()
      .map(|c| {
        let cp = c as u32;
        let mut set = SymbolSet::single(cp);
        if let Some(fold) = fold {
          if let Some(other) = fold(cp) {
            set = set.union(&SymbolSet::single(other));
          }
        }
        Node::Class(set)
      })
      .collect();
    Node::concat(parts)
  }
}
