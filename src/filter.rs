//! Filter expressions over attribute descriptors
//!
//! A filter is a small boolean tree:
//!
//! ```text
//! And([..]) | Or([..]) | Not(..) | Predicate { attributes, attributePatterns,
//!                                              components, componentPatterns,
//!                                              values, valuePatterns }
//! ```
//!
//! An absent filter (`None`) matches nothing. A filter with no populated
//! predicate anywhere is *vacuous*: it imposes no constraint. `And` and `Or`
//! drop vacuous children before combining, so an all-vacuous `And` matches
//! everything while an all-vacuous `Or` matches nothing. `Not` does not filter
//! its child, so negating an empty predicate matches everything.

use crate::descriptor::AttributeDescriptor;
use regex::RegexBuilder;
use std::fmt;

/// A case-insensitive regular expression that remembers its source
///
/// Patterns follow ECMAScript conventions: `\w`, `\W`, `\d` and `\D` are
/// ASCII-only, and lookaround and backreferences are accepted. Patterns the
/// `regex` crate can run are compiled with it; the rest go through
/// `fancy_regex`.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    matcher: Matcher,
}

#[derive(Clone)]
enum Matcher {
    Plain(regex::Regex),
    Backtracking(fancy_regex::Regex),
}

impl Pattern {
    /// Compile a pattern (case-insensitive, unanchored)
    pub fn new(source: &str) -> Result<Self, fancy_regex::Error> {
        let translated = ascii_classes(source);
        let matcher = match RegexBuilder::new(&translated).case_insensitive(true).build() {
            Ok(regex) => Matcher::Plain(regex),
            Err(_) => Matcher::Backtracking(
                fancy_regex::RegexBuilder::new(&translated)
                    .case_insensitive(true)
                    .build()?,
            ),
        };
        Ok(Self {
            source: source.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Search for the pattern anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Plain(regex) => regex.is_match(text),
            Matcher::Backtracking(regex) => regex.is_match(text).unwrap_or_else(|e| {
                log::debug!("pattern '{}' gave up on {:?}: {}", self.source, text, e);
                false
            }),
        }
    }
}

/// Rewrite `\w`, `\W`, `\d` and `\D` as ASCII classes
///
/// Inside a bracket class only the positive forms are expanded.
fn ascii_classes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_class = false;
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push(c);
                    break;
                };
                let replacement = match (next, in_class) {
                    ('w', false) => Some("[0-9A-Za-z_]"),
                    ('W', false) => Some("[^0-9A-Za-z_]"),
                    ('d', false) => Some("[0-9]"),
                    ('D', false) => Some("[^0-9]"),
                    ('w', true) => Some("0-9A-Za-z_"),
                    ('d', true) => Some("0-9"),
                    _ => None,
                };
                match replacement {
                    Some(r) => out.push_str(r),
                    None => {
                        out.push(c);
                        out.push(next);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                // `]` right after `[` or `[^` is a literal member
                if chars.clone().next() == Some('^') {
                    out.push('^');
                    chars.next();
                }
                if chars.clone().next() == Some(']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// Leaf of a filter tree. Matches when any populated field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    /// Exact attribute names
    pub attributes: Vec<String>,
    /// Patterns searched in attribute names
    pub attribute_patterns: Vec<Pattern>,
    /// Exact literal values
    pub values: Vec<String>,
    /// Patterns searched in literal values
    pub value_patterns: Vec<Pattern>,
    /// Exact component names
    pub components: Vec<String>,
    /// Patterns searched in component names
    pub component_patterns: Vec<Pattern>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes.extend(attributes.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values.extend(values.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_components(mut self, components: &[&str]) -> Self {
        self.components.extend(components.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_attribute_pattern(mut self, pattern: Pattern) -> Self {
        self.attribute_patterns.push(pattern);
        self
    }

    pub fn with_value_pattern(mut self, pattern: Pattern) -> Self {
        self.value_patterns.push(pattern);
        self
    }

    pub fn with_component_pattern(mut self, pattern: Pattern) -> Self {
        self.component_patterns.push(pattern);
        self
    }

    /// True when no field is populated
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.attribute_patterns.is_empty()
            && self.values.is_empty()
            && self.value_patterns.is_empty()
            && self.components.is_empty()
            && self.component_patterns.is_empty()
    }

    pub fn matches(&self, d: &AttributeDescriptor) -> bool {
        if self.attributes.iter().any(|name| *name == d.name) {
            return true;
        }
        if self.attribute_patterns.iter().any(|p| p.is_match(&d.name)) {
            return true;
        }

        if self.components.iter().any(|comp| *comp == d.component) {
            return true;
        }
        if self.component_patterns.iter().any(|p| p.is_match(&d.component)) {
            return true;
        }

        if self.values.iter().any(|value| *value == d.value) {
            return true;
        }
        self.value_patterns.iter().any(|p| p.is_match(&d.value))
    }
}

/// Boolean filter tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    Predicate(Predicate),
}

impl FilterExpr {
    pub fn not(inner: FilterExpr) -> Self {
        FilterExpr::Not(Box::new(inner))
    }

    /// Evaluate against a descriptor
    pub fn matches(&self, d: &AttributeDescriptor) -> bool {
        match self {
            FilterExpr::And(children) => children
                .iter()
                .filter(|child| !child.is_vacuous())
                .all(|child| child.matches(d)),
            FilterExpr::Or(children) => children
                .iter()
                .filter(|child| !child.is_vacuous())
                .any(|child| child.matches(d)),
            FilterExpr::Not(inner) => !inner.matches(d),
            FilterExpr::Predicate(predicate) => predicate.matches(d),
        }
    }

    /// True when the tree contains no populated predicate
    pub fn is_vacuous(&self) -> bool {
        match self {
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                children.iter().all(FilterExpr::is_vacuous)
            }
            FilterExpr::Not(inner) => inner.is_vacuous(),
            FilterExpr::Predicate(predicate) => predicate.is_empty(),
        }
    }
}

impl From<Predicate> for FilterExpr {
    fn from(predicate: Predicate) -> Self {
        FilterExpr::Predicate(predicate)
    }
}

/// Evaluate a possibly absent filter; an absent filter matches nothing
pub fn evaluate(expr: Option<&FilterExpr>, d: &AttributeDescriptor) -> bool {
    expr.is_some_and(|e| e.matches(d))
}

/// An absent filter is vacuous
pub fn is_vacuous(expr: Option<&FilterExpr>) -> bool {
    expr.is_none_or(FilterExpr::is_vacuous)
}
