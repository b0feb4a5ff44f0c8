//! Markup tree consumed by the rules
//!
//! This is the closed subset of a JSX syntax tree the rules read: opening
//! elements, their attributes, and the handful of expression kinds literal
//! extraction descends into. Everything else a parser may see is folded into
//! [`Expression::Other`] so rules treat it as "no literal here".

/// Byte range in the source text (start inclusive, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tag name of an element: `Button`, `Some.Provider`, `svg:path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementName {
    Identifier(String),
    Member {
        object: Box<ElementName>,
        property: String,
    },
    Namespaced {
        namespace: String,
        name: String,
    },
}

/// Attribute name: `title` or `xlink:href`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeName {
    Plain(String),
    Namespaced { namespace: String, name: String },
}

/// A string literal with its decoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

/// Value carried by a literal expression
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    /// Numeric literal, kept as written
    Number(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

impl Literal {
    /// The literal's text when it is a string
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One static chunk of a template literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateElement {
    /// Text as written in the source
    pub raw: String,
    /// Text after escape processing; `None` when the chunk holds an invalid escape
    pub cooked: Option<String>,
    pub span: Span,
}

/// A template literal: `quasis.len() == expressions.len() + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    NullishCoalescing,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::NullishCoalescing => "??",
        }
    }
}

/// Expression kinds literal extraction understands
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Template(TemplateLiteral),
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        span: Span,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    /// `{}` or `{/* comment */}`
    Empty(Span),
    /// Any other expression (identifiers, calls, arrows, JSX, ...)
    Other(Span),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(lit) => lit.span,
            Expression::Template(tpl) => tpl.span,
            Expression::Conditional { span, .. }
            | Expression::Logical { span, .. }
            | Expression::Empty(span)
            | Expression::Other(span) => *span,
        }
    }
}

/// Value side of `name=value`
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// `name="text"`
    String(StringLiteral),
    /// `name={expression}`
    Container(Expression),
    /// `name=<Element />`
    Element(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: AttributeName,
    /// `None` for boolean shorthand (`<input disabled />`)
    pub value: Option<AttributeValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeItem {
    Attribute(Attribute),
    /// `{...props}`
    Spread(Span),
}

/// `<Name attr=... >` or `<Name attr=... />`
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningElement {
    pub name: ElementName,
    pub attributes: Vec<AttributeItem>,
    pub self_closing: bool,
    pub span: Span,
}

impl OpeningElement {
    /// Named attributes in source order, skipping spreads
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter_map(|item| match item {
            AttributeItem::Attribute(attr) => Some(attr),
            AttributeItem::Spread(_) => None,
        })
    }
}
