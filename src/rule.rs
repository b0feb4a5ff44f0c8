//! Rule definitions
//!
//! Both built-in rules share one driver: extract descriptors from every
//! attribute of an element with the rule's [`ExtractionPolicy`], keep those
//! selected by the rule's [`RuleConfiguration`], and report each survivor in
//! source order.

use crate::ast::{OpeningElement, Span};
use crate::defaults::{self, RuleDefaults};
use crate::descriptor::{AttributeDescriptor, ExtractionPolicy};
use crate::diagnostic::Severity;
use crate::options::{OptionsError, RuleOptions};
use crate::resolve::RuleConfiguration;

pub const STRING_LITERALS: &str = "no-attribute-string-literals";
pub const TEMPLATE_LITERALS: &str = "no-attribute-template-literals";

/// Ids of all built-in rules
pub const RULE_IDS: &[&str] = &[STRING_LITERALS, TEMPLATE_LITERALS];

/// A finding produced by a rule, before it is placed in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub span: Span,
    pub message: String,
}

/// Sink for rule findings
pub trait Reporter {
    fn report(&mut self, span: Span, message: String);
}

impl Reporter for Vec<Report> {
    fn report(&mut self, span: Span, message: String) {
        self.push(Report { span, message });
    }
}

/// A configured rule instance
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique rule identifier (e.g., "no-attribute-string-literals")
    pub id: String,

    /// Detailed description
    pub description: String,

    /// Severity level
    pub severity: Severity,

    /// Rationale explaining why this rule exists
    pub rationale: String,

    /// Example of code that violates this rule
    pub example_bad: String,

    /// Example of correct code
    pub example_good: String,

    policy: ExtractionPolicy,

    /// What a finding is called in messages ("string literal")
    noun: &'static str,

    defaults: RuleDefaults,

    configuration: RuleConfiguration,
}

impl Rule {
    /// Flag plain string literals in attributes
    pub fn no_attribute_string_literals(options: &RuleOptions) -> Result<Self, OptionsError> {
        let defaults = defaults::string_literals();
        let configuration = RuleConfiguration::from_options(options, &defaults)?;
        Ok(Self {
            id: STRING_LITERALS.to_string(),
            description: "Disallow hard-coded string literals in JSX attributes".to_string(),
            severity: Severity::Warning,
            rationale: "Text passed to components through attributes ends up in front of users \
                        and must go through translation. Literal values such as identifiers, \
                        class names or sizes are ignored by default; anything else should come \
                        from a translation function."
                .to_string(),
            example_bad: r#"<Button title="Save changes" />"#.to_string(),
            example_good: r#"<Button title={t("save-changes")} />"#.to_string(),
            policy: ExtractionPolicy::StringLiterals,
            noun: "string literal",
            defaults,
            configuration,
        })
    }

    /// Flag the static text of interpolated template literals in attributes
    pub fn no_attribute_template_literals(options: &RuleOptions) -> Result<Self, OptionsError> {
        let defaults = defaults::template_literals();
        let configuration = RuleConfiguration::from_options(options, &defaults)?;
        Ok(Self {
            id: TEMPLATE_LITERALS.to_string(),
            description: "Disallow untranslated text in JSX attribute template literals"
                .to_string(),
            severity: Severity::Warning,
            rationale: "Building a sentence by interpolating values into a template literal \
                        hard-codes its text and its word order. Use a translation with \
                        placeholders instead."
                .to_string(),
            example_bad: r#"<Avatar alt={`Profile picture of ${name}`} />"#.to_string(),
            example_good: r#"<Avatar alt={t("avatar-alt", { name })} />"#.to_string(),
            policy: ExtractionPolicy::TemplateElements,
            noun: "template element",
            defaults,
            configuration,
        })
    }

    /// Build a built-in rule by id; `None` for unknown ids
    pub fn builtin(id: &str, options: &RuleOptions) -> Option<Result<Self, OptionsError>> {
        match id {
            STRING_LITERALS => Some(Self::no_attribute_string_literals(options)),
            TEMPLATE_LITERALS => Some(Self::no_attribute_template_literals(options)),
            _ => None,
        }
    }

    /// Set the severity level
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn policy(&self) -> ExtractionPolicy {
        self.policy
    }

    /// Filters the rule ships with
    pub fn defaults(&self) -> &RuleDefaults {
        &self.defaults
    }

    /// Effective filters after merging user options
    pub fn configuration(&self) -> &RuleConfiguration {
        &self.configuration
    }

    pub fn message(&self, d: &AttributeDescriptor) -> String {
        format!(
            "Attribute `{}` on component `{}` has invalid {} `{}`.",
            d.name, d.component, self.noun, d.value
        )
    }

    /// Report every selected descriptor of an element
    pub fn check(&self, element: &OpeningElement, reporter: &mut dyn Reporter) {
        for d in self.policy.element_descriptors(element) {
            if self.configuration.selects(&d) {
                reporter.report(d.span, self.message(&d));
            }
        }
    }
}

/// All built-in rules with default options
pub fn builtin_rules() -> Result<Vec<Rule>, OptionsError> {
    let options = RuleOptions::default();
    RULE_IDS
        .iter()
        .filter_map(|id| Rule::builtin(id, &options))
        .collect()
}
