//! Common aliases and id types shared across every compilation phase.

mod error;
mod ids;
mod journal;

pub use error::{GenError, GenResult, Severity};
pub use ids::{ClassId, ItemIndex, NonTermId, RuleId, StateId, TermId, EPSILON_CLASS};
pub use journal::{Diagnostic, Journal};

/// Growable, insertion-ordered collection. Aliased so call sites read the
/// way the rest of the pipeline's data model (spec: "Array") does, rather
/// than forcing every signature to spell out `Vec`.
pub type Array<T> = Vec<T>;

/// A map whose iteration order is the order of first insertion. Backed by
/// `BTreeMap` so that iteration is also deterministic across runs for any
/// `Ord` key (ids in this crate are `Ord` integers), which is required by
/// the reproducibility guarantee in spec.md §5.
pub type OrderedMap<K, V> = std::collections::BTreeMap<K, V>;

/// Canonically-ordered set, see [`OrderedMap`].
pub type OrderedSet<T> = std::collections::BTreeSet<T>;

/// An unordered set used only where iteration order never escapes to
/// generated output.
pub type Set<T> = std::collections::HashSet<T>;
