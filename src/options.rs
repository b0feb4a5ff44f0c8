//! Rule options as written in configuration files
//!
//! ```yaml
//! ignores:
//!   - attributes: [title]
//!   - and:
//!       - components: [Button]
//!       - attributes: [as]
//! only:
//!   componentPatterns: ["^Ui\\."]
//! mode: extend
//! ```
//!
//! `ignores` and `only` accept one filter object or a list of them; a list is
//! shorthand for an `or` of its elements. Unknown fields are rejected.

use crate::filter::{FilterExpr, Pattern, Predicate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error converting options into filter trees
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },
}

/// How user filters combine with a rule's built-in defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Intersect inclusions, union exclusions
    #[default]
    Extend,
    /// Replace the defaults entirely
    Override,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Extend => write!(f, "extend"),
            Mode::Override => write!(f, "override"),
        }
    }
}

/// Options accepted by both attribute literal rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOptions {
    /// Attributes matching this filter are never reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignores: Option<FilterOption>,

    /// When present, only attributes matching this filter are considered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<FilterOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignores(mut self, ignores: impl Into<FilterOption>) -> Self {
        self.ignores = Some(ignores.into());
        self
    }

    pub fn with_only(mut self, only: impl Into<FilterOption>) -> Self {
        self.only = Some(only.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Effective mode (`extend` unless stated otherwise)
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }
}

/// One filter object, or a list of them meaning "any of"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterOption {
    Many(Vec<FilterLiteral>),
    One(FilterLiteral),
}

impl FilterOption {
    /// Convert into a filter tree, compiling every pattern
    pub fn to_expr(&self) -> Result<FilterExpr, OptionsError> {
        match self {
            FilterOption::One(literal) => literal.to_expr(),
            FilterOption::Many(literals) => Ok(FilterExpr::Or(
                literals
                    .iter()
                    .map(FilterLiteral::to_expr)
                    .collect::<Result<_, _>>()?,
            )),
        }
    }
}

impl From<FilterLiteral> for FilterOption {
    fn from(literal: FilterLiteral) -> Self {
        FilterOption::One(literal)
    }
}

impl From<PredicateLiteral> for FilterOption {
    fn from(predicate: PredicateLiteral) -> Self {
        FilterOption::One(FilterLiteral::Predicate(predicate))
    }
}

impl From<Vec<FilterLiteral>> for FilterOption {
    fn from(literals: Vec<FilterLiteral>) -> Self {
        FilterOption::Many(literals)
    }
}

/// A single filter object
///
/// Variants are tried in order; each rejects fields it does not own, so
/// `{and: [...], attributes: [...]}` is an error rather than an `and`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterLiteral {
    And(AndLiteral),
    Or(OrLiteral),
    Not(NotLiteral),
    Predicate(PredicateLiteral),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndLiteral {
    pub and: Vec<FilterLiteral>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrLiteral {
    pub or: Vec<FilterLiteral>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotLiteral {
    pub not: Box<FilterLiteral>,
}

/// Leaf filter object; field names follow the camelCase option schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PredicateLiteral {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_patterns: Option<Vec<String>>,
}

impl FilterLiteral {
    pub fn and(children: Vec<FilterLiteral>) -> Self {
        FilterLiteral::And(AndLiteral { and: children })
    }

    pub fn or(children: Vec<FilterLiteral>) -> Self {
        FilterLiteral::Or(OrLiteral { or: children })
    }

    pub fn not(inner: FilterLiteral) -> Self {
        FilterLiteral::Not(NotLiteral {
            not: Box::new(inner),
        })
    }

    /// Convert into a filter tree, compiling every pattern
    pub fn to_expr(&self) -> Result<FilterExpr, OptionsError> {
        match self {
            FilterLiteral::And(AndLiteral { and }) => Ok(FilterExpr::And(
                and.iter().map(FilterLiteral::to_expr).collect::<Result<_, _>>()?,
            )),
            FilterLiteral::Or(OrLiteral { or }) => Ok(FilterExpr::Or(
                or.iter().map(FilterLiteral::to_expr).collect::<Result<_, _>>()?,
            )),
            FilterLiteral::Not(NotLiteral { not }) => Ok(FilterExpr::not(not.to_expr()?)),
            FilterLiteral::Predicate(predicate) => Ok(FilterExpr::Predicate(predicate.to_predicate()?)),
        }
    }
}

impl From<PredicateLiteral> for FilterLiteral {
    fn from(predicate: PredicateLiteral) -> Self {
        FilterLiteral::Predicate(predicate)
    }
}

impl PredicateLiteral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(mut self, names: &[&str]) -> Self {
        self.attributes = Some(to_strings(names));
        self
    }

    pub fn attribute_patterns(mut self, patterns: &[&str]) -> Self {
        self.attribute_patterns = Some(to_strings(patterns));
        self
    }

    pub fn values(mut self, values: &[&str]) -> Self {
        self.values = Some(to_strings(values));
        self
    }

    pub fn value_patterns(mut self, patterns: &[&str]) -> Self {
        self.value_patterns = Some(to_strings(patterns));
        self
    }

    pub fn components(mut self, names: &[&str]) -> Self {
        self.components = Some(to_strings(names));
        self
    }

    pub fn component_patterns(mut self, patterns: &[&str]) -> Self {
        self.component_patterns = Some(to_strings(patterns));
        self
    }

    fn to_predicate(&self) -> Result<Predicate, OptionsError> {
        Ok(Predicate {
            attributes: self.attributes.clone().unwrap_or_default(),
            attribute_patterns: compile(self.attribute_patterns.as_deref())?,
            values: self.values.clone().unwrap_or_default(),
            value_patterns: compile(self.value_patterns.as_deref())?,
            components: self.components.clone().unwrap_or_default(),
            component_patterns: compile(self.component_patterns.as_deref())?,
        })
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn compile(patterns: Option<&[String]>) -> Result<Vec<Pattern>, OptionsError> {
    patterns
        .unwrap_or_default()
        .iter()
        .map(|source| {
            Pattern::new(source).map_err(|source_err| OptionsError::InvalidPattern {
                pattern: source.clone(),
                source: source_err,
            })
        })
        .collect()
}
