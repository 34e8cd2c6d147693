//! Symbol-range sets and the symbol map built from them (spec.md §3/§4.A).

mod map;
mod range;

pub use map::{fold_case, SymbolMap};
pub use range::{SymbolRange, SymbolSet};
