//! Plugin system for format-specific parsing

use crate::ast::{OpeningElement, Span};
use crate::diagnostic::Location;
use std::path::Path;
use thiserror::Error;

/// Error during parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed document
pub trait Document: Send + Sync {
    /// Opening elements in document order
    fn elements(&self) -> &[OpeningElement];

    /// Map a source range to a file location
    fn location(&self, span: Span) -> Location;

    /// Get source line at line number (1-based)
    fn get_source_line(&self, line: usize) -> Option<&str>;

    /// Check if a rule is disabled at a line by an inline comment
    fn is_rule_disabled(&self, _rule_id: &str, _line: usize) -> bool {
        false
    }
}

/// Plugin trait for format-specific parsing
pub trait Plugin: Send + Sync {
    /// Plugin identifier (e.g., "jsx")
    fn id(&self) -> &str;

    /// Plugin version
    fn version(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// File extensions this plugin handles (without dot, e.g., "jsx", "tsx")
    fn extensions(&self) -> &[&str];

    /// Parse file content into a document
    fn parse(&self, content: &str, path: &Path) -> Result<Box<dyn Document>, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::Syntax {
            line: 10,
            column: 4,
            message: "unterminated string".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Syntax error at line 10, column 4: unterminated string"
        );
    }
}
