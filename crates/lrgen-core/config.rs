//! Build-time configuration and the metrics/classification reported
//! alongside a generated table, modeled on radlr-core's
//! `ParserConfig`/`ParserClassification` (spec.md §5's "state count and
//! alphabet size... are measured and logged").

#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct BuildConfig {
  /// When disabled, a weak terminal sharing a strong terminal's lexical
  /// shape is rejected at grammar-freeze time instead of triggering the
  /// DFA split described in spec.md §4.I.
  pub ALLOW_WEAK_SYMBOLS: bool,
  /// When disabled, `Item::Guard` items are rejected instead of being
  /// embedded as a first-class nonterminal.
  pub ALLOW_GUARDS: bool,
  /// Regex literals and classes are case-sensitive unless a terminal's
  /// own declaration overrides this.
  pub CASE_SENSITIVE_BY_DEFAULT: bool,
  /// Retained conflicts are reported as `Severity::Error` (suppressing
  /// table emission) rather than `Severity::Warning`.
  pub TREAT_CONFLICTS_AS_ERRORS: bool,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self { ALLOW_WEAK_SYMBOLS: true, ALLOW_GUARDS: true, CASE_SENSITIVE_BY_DEFAULT: true, TREAT_CONFLICTS_AS_ERRORS: true }
  }
}

impl BuildConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn use_weak_symbols(mut self, enable: bool) -> Self {
    self.ALLOW_WEAK_SYMBOLS = enable;
    self
  }

  pub fn use_guards(mut self, enable: bool) -> Self {
    self.ALLOW_GUARDS = enable;
    self
  }

  pub fn case_sensitive_by_default(mut self, enable: bool) -> Self {
    self.CASE_SENSITIVE_BY_DEFAULT = enable;
    self
  }

  /// A permissive configuration that never suppresses emission: retained
  /// conflicts and unreachable terminals are reported only as warnings.
  pub fn lenient(mut self) -> Self {
    self.TREAT_CONFLICTS_AS_ERRORS = false;
    self
  }
}

/// Sizing measured at the end of a build (spec.md §5: "Memory is bounded
/// by the product of state count and alphabet size; both are measured
/// and logged").
#[derive(Default, Clone, Copy, Debug)]
pub struct BuildMetrics {
  pub rule_count:       usize,
  pub lr_state_count:    usize,
  pub dfa_state_count:   usize,
  pub alphabet_size:     usize,
  pub weak_split_count:  usize,
}

/// Which of the table's optional extensions actually fired, analogous to
/// `ParserClassification::to_string`.
#[derive(Default, Clone, Copy, Debug)]
pub struct BuildClassification {
  pub weak_symbols_used: bool,
  pub guards_used:       bool,
  pub conflicts_demoted: bool,
}

impl BuildClassification {
  /// Renders e.g. `"LALR+weak+guard"` or plain `"LALR"` when neither
  /// extension fired.
  pub fn to_label(&self) -> String {
    let mut label = String::from("LALR");
    if self.weak_symbols_used {
      label.push_str("+weak");
    }
    if self.guards_used {
      label.push_str("+guard");
    }
    if self.conflicts_demoted {
      label.push_str("+demoted");
    }
    label
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_config_allows_every_extension() {
    let cfg = BuildConfig::new();
    assert!(cfg.ALLOW_WEAK_SYMBOLS);
    assert!(cfg.ALLOW_GUARDS);
    assert!(cfg.TREAT_CONFLICTS_AS_ERRORS);
  }

  #[test]
  fn lenient_disables_conflict_errors_only() {
    let cfg = BuildConfig::new().lenient();
    assert!(!cfg.TREAT_CONFLICTS_AS_ERRORS);
    assert!(cfg.ALLOW_WEAK_SYMBOLS);
  }

  #[test]
  fn classification_label_reflects_used_extensions() {
    let plain = BuildClassification::default();
    assert_eq!(plain.to_label(), "LALR");

    let full = BuildClassification { weak_symbols_used: true, guards_used: true, conflicts_demoted: true };
    assert_eq!(full.to_label(), "LALR+weak+guard+demoted");
  }
}
