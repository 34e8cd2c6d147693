//! Accumulating diagnostics collector.
//!
//! The builder does not throw on the first problem (spec.md §7): every
//! phase keeps a `&mut Journal` and pushes diagnostics into it as it goes,
//! so a single run can report many unrelated problems at once. Only after
//! a phase completes does its caller decide, based on [`Journal::has_errors`],
//! whether to continue to the next phase or discard the partial output.

use super::{GenError, Severity};

/// One entry in the journal: a severity tag plus the error payload that
/// explains it. `NonterminalNeverReduced`-style warnings that have no
/// natural [`GenError`] reading are represented as `Invariant`-shaped
/// messages with `Severity::Warning`.
#[derive(Clone, Debug)]
pub struct Diagnostic {
  pub severity: Severity,
  pub error:    GenError,
}

/// Accumulates diagnostics across one compilation run.
///
/// A `bug`-severity diagnostic aborts the *current phase*: the phase
/// constructor that observes one should stop doing further work and return
/// its partial state for discarding, rather than trying to keep building on
/// top of a broken invariant. The journal itself never panics or unwinds.
#[derive(Clone, Debug, Default)]
pub struct Journal {
  diagnostics: Vec<Diagnostic>,
}

impl Journal {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records a diagnostic at the severity its [`GenError`] variant implies.
  pub fn report(&mut self, error: GenError) {
    let severity = error.severity();
    self.diagnostics.push(Diagnostic { severity, error });
  }

  /// Records a diagnostic at an explicit severity, for warnings that carry
  /// a [`GenError`] payload but aren't themselves fatal (e.g. a shadowed
  /// terminal reported via [`GenError::UnknownClass`]-shaped data).
  pub fn report_at(&mut self, severity: Severity, error: GenError) {
    self.diagnostics.push(Diagnostic { severity, error });
  }

  /// `true` if emission of the table under construction should be
  /// suppressed: any `Error` or `Bug` severity diagnostic is present.
  /// Warnings alone never suppress emission.
  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(|d| d.severity.contains(Severity::Error) || d.severity.contains(Severity::Bug))
  }

  /// `true` if any diagnostic was raised at `Severity::Bug`, meaning the
  /// phase that raised it should discard its partial output rather than
  /// merely suppress emission at the end of the pipeline.
  pub fn has_bug(&self) -> bool {
    self.diagnostics.iter().any(|d| d.severity.contains(Severity::Bug))
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
    self.diagnostics.iter().filter(|d| d.severity.contains(Severity::Warning) && !d.severity.contains(Severity::Error))
  }

  pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
    self.diagnostics.iter().filter(|d| d.severity.contains(Severity::Error) || d.severity.contains(Severity::Bug))
  }

  /// Merges diagnostics from a sub-phase (e.g. a guard's own sub-grammar
  /// build) into this journal.
  pub fn absorb(&mut self, mut other: Journal) {
    self.diagnostics.append(&mut other.diagnostics);
  }
}
