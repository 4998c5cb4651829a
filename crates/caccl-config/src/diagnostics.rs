// crates/caccl-config/src/diagnostics.rs
// ============================================================================
// Module: Diagnostic Sink
// Description: Append-only trace of per-option resolution decisions.
// Purpose: Explain every decision to operators without steering resolution.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The resolver appends one [`Diagnostic`] per option as it goes. The trace
//! is returned on success and on failure, so callers can show how far
//! resolution got before an inconsistency stopped it. Nothing in the
//! resolver reads the trace back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::options::FeatureGroup;
use crate::options::OptionId;

// ============================================================================
// SECTION: Diagnostic Types
// ============================================================================

/// How an option obtained its final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// The caller supplied the value and it was accepted.
    Explicit,
    /// The registry default was applied.
    Defaulted,
    /// The option does not apply; any supplied value was dropped.
    Ignored,
}

impl ResolutionKind {
    /// Returns the kind label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Defaulted => "defaulted",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected outcome.
    Info,
    /// Outcome the operator should look at.
    Warning,
}

impl Severity {
    /// Returns the severity label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One resolution decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Option the decision concerns.
    pub option: OptionId,
    /// Group that owns the option.
    pub group: FeatureGroup,
    /// Resolution kind.
    pub kind: ResolutionKind,
    /// Severity.
    pub severity: Severity,
    /// Human-readable rationale.
    pub rationale: String,
}

// ============================================================================
// SECTION: Trace
// ============================================================================

/// Ordered, append-only list of diagnostics for one resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticTrace {
    /// Recorded decisions in resolution order.
    entries: Vec<Diagnostic>,
}

impl DiagnosticTrace {
    /// Appends a decision.
    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns every recorded decision in order.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Returns the decision recorded for an option.
    #[must_use]
    pub fn get(&self, option: OptionId) -> Option<&Diagnostic> {
        self.entries.iter().find(|entry| entry.option == option)
    }

    /// Returns the number of recorded decisions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over warning-level decisions.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|entry| entry.severity == Severity::Warning)
    }

    /// Renders the trace as an aligned text report.
    #[must_use]
    pub fn render_text(&self) -> String {
        let width = self
            .entries
            .iter()
            .map(|entry| entry.group.name().len() + entry.option.name().len() + 1)
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        for entry in &self.entries {
            let label = format!("{}.{}", entry.group, entry.option);
            let _ = writeln!(
                out,
                "[{:<7}] {label:<width$}  {:<9}  {}",
                entry.severity.name(),
                entry.kind.name(),
                entry.rationale,
            );
        }
        out
    }

    /// Converts the trace to a JSON array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl<'a> IntoIterator for &'a DiagnosticTrace {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
