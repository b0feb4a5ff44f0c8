//! Attribute descriptors and literal extraction
//!
//! A descriptor is one candidate literal found in an attribute value, tagged
//! with the owning component and attribute names. Two extraction policies
//! exist, one per rule:
//!
//! - [`ExtractionPolicy::StringLiterals`] collects plain string literals and
//!   static single-chunk template literals.
//! - [`ExtractionPolicy::TemplateElements`] collects every static chunk of
//!   template literals that contain at least one interpolation.
//!
//! Both descend through both branches of conditional expressions and both
//! operands of logical expressions, regardless of which branch could run.

use crate::ast::{Attribute, AttributeValue, Expression, OpeningElement, Span, TemplateLiteral};
use crate::names::{attribute_name, component_name};

/// One literal value an attribute could hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Component name (`Button`, `Some.Provider`, `Button:namespace`)
    pub component: String,
    /// Attribute name (`title`, `xlink:href`)
    pub name: String,
    /// Literal text being tested
    pub value: String,
    /// Source range of the literal, used only for reporting
    pub span: Span,
}

impl AttributeDescriptor {
    pub fn new(component: &str, name: &str, value: &str, span: Span) -> Self {
        Self {
            component: component.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            span,
        }
    }
}

/// A literal found during traversal, before it is tagged with names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate<'a> {
    /// `None` when the literal has no string value
    value: Option<&'a str>,
    span: Span,
}

/// How literal values are pulled out of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionPolicy {
    StringLiterals,
    TemplateElements,
}

impl ExtractionPolicy {
    /// Extract descriptors from every attribute of an element, in source order
    pub fn element_descriptors(&self, element: &OpeningElement) -> Vec<AttributeDescriptor> {
        let component = component_name(&element.name);
        element
            .attributes()
            .flat_map(|attribute| self.descriptors(&component, attribute))
            .collect()
    }

    /// Extract descriptors from a single attribute
    pub fn descriptors(&self, component: &str, attribute: &Attribute) -> Vec<AttributeDescriptor> {
        let Some(value) = &attribute.value else {
            return Vec::new();
        };

        let candidates = match self {
            ExtractionPolicy::StringLiterals => attribute_string_literals(value),
            ExtractionPolicy::TemplateElements => attribute_template_elements(value),
        };

        let name = attribute_name(attribute);
        candidates
            .into_iter()
            .filter_map(|candidate| {
                let value = candidate.value?;
                // Empty chunks sit between adjacent interpolations
                if *self == ExtractionPolicy::TemplateElements && value.is_empty() {
                    return None;
                }
                Some(AttributeDescriptor::new(component, &name, value, candidate.span))
            })
            .collect()
    }
}

fn attribute_string_literals(value: &AttributeValue) -> Vec<Candidate<'_>> {
    match value {
        AttributeValue::String(lit) => vec![Candidate {
            value: Some(&lit.value),
            span: lit.span,
        }],
        AttributeValue::Container(expression) => {
            let mut out = Vec::new();
            string_literals(expression, &mut out);
            out
        }
        AttributeValue::Element(_) => Vec::new(),
    }
}

/// Collect string literals and static templates reachable through
/// conditional and logical expressions
fn string_literals<'a>(expression: &'a Expression, out: &mut Vec<Candidate<'a>>) {
    match expression {
        Expression::Conditional {
            consequent,
            alternate,
            ..
        } => {
            string_literals(consequent, out);
            string_literals(alternate, out);
        }
        Expression::Logical { left, right, .. } => {
            string_literals(left, out);
            string_literals(right, out);
        }
        Expression::Template(template) => {
            if !template.expressions.is_empty() || template.quasis.len() != 1 {
                return;
            }
            out.push(Candidate {
                value: template.quasis[0].cooked.as_deref(),
                span: template.span,
            });
        }
        Expression::Literal(literal) => {
            if let Some(value) = literal.as_str() {
                out.push(Candidate {
                    value: Some(value),
                    span: literal.span,
                });
            }
        }
        Expression::Empty(_) | Expression::Other(_) => {}
    }
}

fn attribute_template_elements(value: &AttributeValue) -> Vec<Candidate<'_>> {
    match value {
        AttributeValue::Container(expression) => {
            let mut templates = Vec::new();
            interpolated_templates(expression, &mut templates);
            templates
                .into_iter()
                .flat_map(|template| {
                    template.quasis.iter().map(|quasi| Candidate {
                        value: quasi.cooked.as_deref(),
                        span: quasi.span,
                    })
                })
                .collect()
        }
        AttributeValue::String(_) | AttributeValue::Element(_) => Vec::new(),
    }
}

/// Collect templates with at least one interpolation; static templates belong
/// to the string-literal policy
fn interpolated_templates<'a>(expression: &'a Expression, out: &mut Vec<&'a TemplateLiteral>) {
    match expression {
        Expression::Conditional {
            consequent,
            alternate,
            ..
        } => {
            interpolated_templates(consequent, out);
            interpolated_templates(alternate, out);
        }
        Expression::Logical { left, right, .. } => {
            interpolated_templates(left, out);
            interpolated_templates(right, out);
        }
        Expression::Template(template) if !template.expressions.is_empty() => out.push(template),
        _ => {}
    }
}
