//! The deterministic scanner table (spec.md §4.D, component D).

mod build;

pub use build::{build, Dfa, DfaState, DfaTransition};
