//! Lint findings as reported to formatters
//!
//! Rules emit [`Report`]s against source spans; [`Diagnostic::from_report`]
//! places them in a document and attaches the rule's metadata.

use crate::plugin::Document;
use crate::rule::{Report, Rule};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How serious a finding is
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    /// Default for both attribute rules
    #[default]
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Where a finding sits in a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Length of the underlined attribute value in bytes
    pub length: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            length: 0,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

/// A finding in one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule id, or `parse-error` / `file-read-error`
    pub rule_id: String,
    pub severity: Severity,
    /// e.g. `Attribute "title" of component "Button" has a hard-coded string literal`
    pub message: String,
    pub location: Location,
    /// The line holding the attribute, for the text formatter
    pub source_line: Option<String>,
    /// The rule description
    pub help: Option<String>,
}

impl Diagnostic {
    /// Place a rule report in a document
    ///
    /// The location covers the reported attribute value, the help text is the
    /// rule description and the source line is copied from the document.
    pub fn from_report(rule: &Rule, report: &Report, document: &dyn Document) -> Self {
        let location = document.location(report.span);
        let line = location.line;
        let diag = Self::new(&rule.id, rule.severity, &report.message, location)
            .with_help(&rule.description);
        match document.get_source_line(line) {
            Some(source) => diag.with_source_line(source),
            None => diag,
        }
    }

    pub fn new(rule_id: &str, severity: Severity, message: &str, location: Location) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.to_string(),
            location,
            source_line: None,
            help: None,
        }
    }

    pub fn with_source_line(mut self, line: &str) -> Self {
        self.source_line = Some(line.to_string());
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}
