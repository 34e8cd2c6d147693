//! LR item sets, the LALR(1) builder, and action-table assembly
//! (spec.md §4.F/§4.G/§4.H, components F/G/H).

mod action;
mod item_set;
mod lalr;

pub use action::{assemble, Action, ActionKind, ActionTable, ActionTarget, StateActions};
pub use item_set::{ItemSet, Lr0Item, Lr1Item};
pub use lalr::{build as build_lalr, closure, LalrMachine, LrState};
