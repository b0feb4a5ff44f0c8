//! Built-in filters shipped with each rule

use crate::options::{FilterOption, PredicateLiteral};
use serde::Serialize;

/// Default `only` / `ignores` pair of a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only: Option<FilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignores: Option<FilterOption>,
}

impl RuleDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_only(mut self, only: impl Into<FilterOption>) -> Self {
        self.only = Some(only.into());
        self
    }

    pub fn with_ignores(mut self, ignores: impl Into<FilterOption>) -> Self {
        self.ignores = Some(ignores.into());
        self
    }
}

/// Attributes whose values are identifiers, not text shown to people
const MACHINE_ATTRIBUTES: &[&str] = &[
    "id",
    "key",
    "className",
    "class",
    "style",
    "type",
    "role",
    "name",
    "src",
    "rel",
    "target",
    "method",
    "htmlFor",
    "lang",
    "dir",
    "xmlns",
    "viewBox",
    "d",
    "fill",
    "stroke",
    "width",
    "height",
    "autoComplete",
    "inputMode",
    "aria-hidden",
    "aria-live",
    "aria-current",
    "aria-haspopup",
    "aria-controls",
    "aria-describedby",
    "aria-labelledby",
    "aria-owns",
];

const NON_TEXT_VALUES: &[&str] = &[
    // whitespace only
    r"^\s*$",
    // css colours
    r"^#(?:[0-9a-f]{3,4}|[0-9a-f]{6}|[0-9a-f]{8})$",
    // numbers and dimensions
    r"^-?\d+(?:\.\d+)?(?:px|em|rem|%|vh|vw|ms|s)?$",
];

/// Defaults for `no-attribute-string-literals`
pub fn string_literals() -> RuleDefaults {
    RuleDefaults::new().with_ignores(
        PredicateLiteral::new()
            .attributes(MACHINE_ATTRIBUTES)
            .attribute_patterns(&["^data-"])
            .value_patterns(NON_TEXT_VALUES),
    )
}

/// Defaults for `no-attribute-template-literals`
pub fn template_literals() -> RuleDefaults {
    RuleDefaults::new().with_ignores(
        PredicateLiteral::new()
            .attributes(&["className", "class", "style", "key", "id", "href", "src", "to"])
            .attribute_patterns(&["^data-"]),
    )
}
