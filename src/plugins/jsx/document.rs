//! JSX document implementation

use super::parser;
use crate::ast::{OpeningElement, Span};
use crate::diagnostic::Location;
use crate::plugin::{Document, ParseError};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// `attrlint-disable`, `attrlint-disable-next-line` and `attrlint-disable-file`
/// followed by a comma-separated list of rule ids or `all`
///
/// Only matched against comment text; strings and JSX text never disable rules.
fn disable_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"attrlint-disable(-next-line|-file)?\s+([\w-]+(?:\s*,\s*[\w-]+)*)")
            .expect("disable comment regex is valid")
    })
}

/// A parsed JSX/TSX source file
pub struct JsxDocument {
    file: PathBuf,
    elements: Vec<OpeningElement>,
    source_lines: Vec<String>,
    /// Byte offset of the first character of each line
    line_starts: Vec<usize>,
    source: String,
    disabled_lines: HashMap<String, HashSet<usize>>,
    disabled_file_rules: HashSet<String>,
}

impl JsxDocument {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ParseError> {
        let line_starts = line_starts(content);

        let module = parser::parse_module(content).map_err(|err| {
            let (line, column) = line_column(content, &line_starts, err.offset);
            ParseError::Syntax {
                line,
                column,
                message: err.message,
            }
        })?;

        let source_lines: Vec<String> = content.lines().map(String::from).collect();
        let (disabled_lines, disabled_file_rules) =
            Self::parse_disable_comments(content, &line_starts, &module.comments);

        Ok(Self {
            file: path.to_path_buf(),
            elements: module.elements,
            source_lines,
            line_starts,
            source: content.to_string(),
            disabled_lines,
            disabled_file_rules,
        })
    }

    /// Collect disable directives from comments
    ///
    /// A plain directive covers the line its comment starts on and
    /// `-next-line` covers the line after the one its comment ends on.
    fn parse_disable_comments(
        content: &str,
        line_starts: &[usize],
        comments: &[Span],
    ) -> (HashMap<String, HashSet<usize>>, HashSet<String>) {
        let mut disabled_lines: HashMap<String, HashSet<usize>> = HashMap::new();
        let mut disabled_file_rules = HashSet::new();
        let line_of = |offset: usize| line_column(content, line_starts, offset).0;

        for span in comments {
            let Some(text) = content.get(span.start..span.end) else {
                continue;
            };
            for cap in disable_regex().captures_iter(text) {
                let rule_ids = cap[2].split(',').map(|id| id.trim().to_string());
                let line = match cap.get(1).map(|m| m.as_str()) {
                    Some("-file") => {
                        disabled_file_rules.extend(rule_ids);
                        continue;
                    }
                    Some(_) => line_of(span.end.saturating_sub(1)) + 1,
                    None => line_of(span.start),
                };
                for id in rule_ids {
                    disabled_lines.entry(id).or_default().insert(line);
                }
            }
        }

        (disabled_lines, disabled_file_rules)
    }

    /// Source text of a span
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }
}

fn line_starts(content: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// 1-based line and character column of a byte offset
fn line_column(content: &str, line_starts: &[usize], offset: usize) -> (usize, usize) {
    let line = line_starts.partition_point(|&start| start <= offset).max(1);
    let start = line_starts[line - 1];
    let column = content
        .get(start..offset.min(content.len()))
        .map_or(0, |prefix| prefix.chars().count());
    (line, column + 1)
}

impl Document for JsxDocument {
    fn elements(&self) -> &[OpeningElement] {
        &self.elements
    }

    fn location(&self, span: Span) -> Location {
        let (line, column) = line_column(&self.source, &self.line_starts, span.start);
        Location::new(self.file.clone(), line, column).with_length(span.len())
    }

    fn get_source_line(&self, line: usize) -> Option<&str> {
        if line > 0 && line <= self.source_lines.len() {
            Some(&self.source_lines[line - 1])
        } else {
            None
        }
    }

    fn is_rule_disabled(&self, rule_id: &str, line: usize) -> bool {
        if self.disabled_file_rules.contains("all") || self.disabled_file_rules.contains(rule_id) {
            return true;
        }
        ["all", rule_id].iter().any(|id| {
            self.disabled_lines
                .get(*id)
                .is_some_and(|lines| lines.contains(&line))
        })
    }
}
