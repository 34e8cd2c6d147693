//! lrgen-core: regex-to-minimized-DFA compilation and LALR(1) action-table
//! construction, with the weak-reduction, guard-symbol, and weak-lexical-
//! symbol extensions a surface parser-generator needs on top of plain
//! LALR(1).
//!
//! This crate is the construction core only. It has no opinion on grammar
//! file syntax, CLI options, code emission, or the runtime driver loop
//! that consumes its tables — those are front-end and back-end concerns
//! layered on top.
//!
//! Pipeline, in dependency order:
//! - [`symbol`] (A/B): symbol ranges, sets, and the disjoint class map.
//! - [`regex`] (C): regex parsing and NFA construction.
//! - [`dfa`] (D): subset construction and minimization.
//! - [`grammar`] (E): the grammar data model, EBNF desugaring, FIRST sets.
//! - [`lr`] (F/G/H): LR items, the LALR(1) builder, action synthesis.
//! - [`weak`] (I): weak/strong terminal splitting and the weak-symbol
//!   rewriter.
//! - [`tables`]: the binary wire format a runtime driver reads.
//! - [`config`]: build-time configuration and reported metrics.

mod config;
mod dfa;
mod grammar;
mod lr;
mod regex;
mod symbol;
mod tables;
mod types;
mod weak;

pub use config::{BuildClassification, BuildConfig, BuildMetrics};
pub use dfa::{build as build_dfa, Dfa, DfaState, DfaTransition};
pub use grammar::{first, first_seq, FirstSet, FirstSets, Grammar, GrammarBuilder, Item, Rule};
pub use lr::{assemble as assemble_actions, build_lalr, closure as lalr_closure, Action, ActionKind, ActionTable, ActionTarget, ItemSet, LalrMachine, Lr0Item, Lr1Item, LrState, StateActions};
pub use regex::{parse as parse_regex, Accept, Nfa, NfaState, Node, Transition as NfaTransition};
pub use symbol::{fold_case, SymbolMap, SymbolRange, SymbolSet};
pub use tables::{assemble as assemble_table, read as read_table, write as write_table, BuiltTable, WireAccept, WireAction, WireClassRange, WireDfaState, WireRule, WireState, WireTransition, WireWeakStrong};
pub use types::{Array, ClassId, Diagnostic, GenError, GenResult, ItemIndex, Journal, NonTermId, OrderedMap, OrderedSet, RuleId, Set, Severity, StateId, TermId};
pub use weak::{integrate as integrate_weak_symbols, rewrite_actions as rewrite_weak_actions, split as split_weak_dfa, WeakPair, WeakStrongEntry};
