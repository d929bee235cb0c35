//! Findings produced by analyses and the set that accumulates them

use indexmap::IndexSet;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Listing output, never fails a run
    Info,
    /// Suspicious, fails a run unless warnings are allowed
    Warning,
    /// Always fails a run
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        };
        f.write_str(tag)
    }
}

/// A single analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    /// Severity
    pub severity: Severity,
    /// One-line description
    pub message: String,
    /// Supporting lines (URLs, origins)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Finding {
    /// Create a finding without details.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// An error-level finding.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// A warning-level finding.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// An info-level finding.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Attach detail lines.
    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details = details.into_iter().map(Into::into).collect();
        self
    }
}

/// Insertion-ordered, deduplicating finding accumulator.
///
/// Safe for concurrent insertion from sibling branches of a traversal.
/// Identical findings reached through different paths collapse into one.
#[derive(Debug)]
pub struct FindingSet {
    findings: Mutex<IndexSet<Finding>>,
    threshold: Severity,
}

impl Default for FindingSet {
    fn default() -> Self {
        Self::with_threshold(Severity::Warning)
    }
}

impl FindingSet {
    /// Create a set that treats warnings as failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set whose failures start at `threshold`.
    ///
    /// Info findings never count as failures, whatever the threshold.
    pub fn with_threshold(threshold: Severity) -> Self {
        Self {
            findings: Mutex::new(IndexSet::new()),
            threshold: threshold.max(Severity::Warning),
        }
    }

    /// Create a set from the `fail-on-warnings` setting.
    pub fn from_fail_on_warnings(fail_on_warnings: bool) -> Self {
        if fail_on_warnings {
            Self::with_threshold(Severity::Warning)
        } else {
            Self::with_threshold(Severity::Error)
        }
    }

    /// Record a finding. Returns false if an identical one was already present.
    pub fn insert(&self, finding: Finding) -> bool {
        self.findings.lock().insert(finding)
    }

    /// Copy of the findings in insertion order.
    pub fn snapshot(&self) -> Vec<Finding> {
        self.findings.lock().iter().cloned().collect()
    }

    /// Number of distinct findings.
    pub fn len(&self) -> usize {
        self.findings.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.findings.lock().is_empty()
    }

    /// Whether any finding is at or above the failure threshold.
    pub fn has_failures(&self) -> bool {
        self.findings
            .lock()
            .iter()
            .any(|finding| finding.severity >= self.threshold)
    }
}
