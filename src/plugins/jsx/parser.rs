//! JSX scanner
//!
//! Finds JSX elements in JavaScript/TypeScript source and builds the
//! [`crate::ast`] tree for their opening tags. Code outside JSX is only
//! tokenised far enough to skip strings, templates, comments and regular
//! expressions, and to tell a JSX `<` (expression position) from a
//! comparison or a generic argument list.
//!
//! Attribute expressions go through a small precedence-climbing parser that
//! models literals, templates, conditional and logical expressions. Anything
//! else it recognises (calls, members, operators, arrows, objects...) becomes
//! [`Expression::Other`], and anything it does not understand degrades to
//! `Other` for the whole attribute.

use crate::ast::{
    Attribute, AttributeItem, AttributeName, AttributeValue, ElementName, Expression, Literal,
    LiteralValue, LogicalOperator, OpeningElement, Span, StringLiteral, TemplateElement,
    TemplateLiteral,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Scanner error with the byte offset it was detected at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (byte {offset})")]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Elements and comments found in one source file
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Opening elements in document order
    pub elements: Vec<OpeningElement>,
    /// `//` and `/* */` comments in document order, delimiters included
    pub comments: Vec<Span>,
}

/// Parse source text into its opening elements and comments
pub fn parse_module(source: &str) -> Result<Module, SyntaxError> {
    let mut parser = Parser::new(source);
    parser.scan_code(None)?;
    Ok(Module {
        elements: parser.elements.into_values().collect(),
        comments: parser
            .comments
            .into_iter()
            .map(|(start, end)| Span::new(start, end))
            .collect(),
    })
}

/// Parse source text and return every opening element in document order
pub fn parse(source: &str) -> Result<Vec<OpeningElement>, SyntaxError> {
    parse_module(source).map(|module| module.elements)
}

/// Keywords after which an expression (and so JSX or a regex) may start
const OPERAND_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await", "instanceof", "default",
];

/// Keywords whose parenthesised head is followed by a statement, not a value
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Binary operators by precedence; longest spelling first
const BINARY_OPERATORS: &[(&str, u8)] = &[
    (">>>", 8),
    ("===", 6),
    ("!==", 6),
    ("**", 11),
    ("??", 1),
    ("||", 1),
    ("&&", 2),
    ("==", 6),
    ("!=", 6),
    ("<=", 7),
    (">=", 7),
    ("<<", 8),
    (">>", 8),
    ("|", 3),
    ("^", 4),
    ("&", 5),
    ("<", 7),
    (">", 7),
    ("+", 9),
    ("-", 9),
    ("*", 10),
    ("/", 10),
    ("%", 10),
];

/// Word operators; `as` and `satisfies` are followed by a type
const WORD_OPERATORS: &[(&str, u8)] = &[
    ("instanceof", 7),
    ("in", 7),
    ("as", 7),
    ("satisfies", 7),
];

/// Operators that already end in `=` and are not assignments
const COMPARISONS: &[&str] = &["===", "!==", "==", "!=", "<=", ">="];

const ASSIGNMENT_OPERATORS: &[&str] = &[
    ">>>=", "**=", "<<=", ">>=", "&&=", "||=", "??=", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=",
];

/// What the previous significant token was, for `<` and `/` disambiguation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Operator,
    Keyword,
    Value,
}

impl Prev {
    fn expects_operand(self) -> bool {
        !matches!(self, Prev::Value)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// End of the region currently being parsed
    limit: usize,
    /// Opening elements keyed by the offset of their `<`
    elements: BTreeMap<usize, OpeningElement>,
    /// End offset of each whole element (children and closing tag included)
    element_ends: BTreeMap<usize, usize>,
    /// Comment end keyed by comment start; rescans land on the same key
    comments: BTreeMap<usize, usize>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            limit: src.len(),
            elements: BTreeMap::new(),
            element_ends: BTreeMap::new(),
            comments: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        (self.pos < self.limit).then(|| self.bytes[self.pos])
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        let at = self.pos + n;
        (at < self.limit).then(|| self.bytes[at])
    }

    fn starts_with(&self, s: &str) -> bool {
        self.pos <= self.limit && self.bytes[self.pos..self.limit].starts_with(s.as_bytes())
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.src.get(start..end).unwrap_or_default()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.limit);
    }

    fn expect(&mut self, b: u8) -> Result<(), SyntaxError> {
        self.skip_trivia();
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(SyntaxError::new(self.pos, format!("expected '{}'", b as char)))
        }
    }

    // ---- code scanning -------------------------------------------------

    /// Skip JavaScript until end of input, or until the `close` byte that
    /// balances an already consumed `open` byte (left at `self.pos`)
    fn scan_code(&mut self, group: Option<(u8, u8)>) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut prev = Prev::Start;
        // One entry per open `(`: whether it holds a control statement head
        let mut parens: Vec<bool> = Vec::new();
        let mut after_control = false;

        while let Some(b) = self.peek() {
            match b {
                b'\'' | b'"' => {
                    self.skip_string(b)?;
                    prev = Prev::Value;
                }
                b'`' => {
                    self.parse_template()?;
                    prev = Prev::Value;
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    self.skip_line_comment();
                    continue;
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    self.skip_block_comment()?;
                    continue;
                }
                b'/' if prev.expects_operand() => {
                    self.skip_regex()?;
                    prev = Prev::Value;
                }
                b'<' if prev.expects_operand() && self.at_element_start() => {
                    self.try_element();
                    prev = Prev::Value;
                }
                b if is_ident_start(b) => {
                    let word = self.read_word();
                    prev = if OPERAND_KEYWORDS.contains(&word) {
                        Prev::Keyword
                    } else {
                        Prev::Value
                    };
                    after_control = CONTROL_KEYWORDS.contains(&word);
                    continue;
                }
                b if b.is_ascii_digit() => {
                    self.read_number();
                    prev = Prev::Value;
                }
                b if b.is_ascii_whitespace() => {
                    self.pos += 1;
                    continue;
                }
                _ => {
                    if let Some((open, close)) = group {
                        if b == close {
                            if depth == 0 {
                                return Ok(());
                            }
                            depth -= 1;
                        } else if b == open {
                            depth += 1;
                        }
                    }
                    self.pos += 1;
                    prev = match b {
                        b'(' => {
                            parens.push(after_control);
                            Prev::Operator
                        }
                        // `if (x) /re/.test(s)`: a statement starts after the head
                        b')' if parens.pop().unwrap_or(false) => Prev::Operator,
                        b')' | b']' => Prev::Value,
                        _ => Prev::Operator,
                    };
                }
            }
            after_control = false;
        }

        match group {
            Some((_, close)) => Err(SyntaxError::new(
                start,
                format!("expected closing '{}'", close as char),
            )),
            None => Ok(()),
        }
    }

    /// Consume `open ... close`, starting at `open`
    fn skip_group(&mut self, open: u8, close: u8) -> Result<(), SyntaxError> {
        self.pos += 1;
        self.scan_code(Some((open, close)))?;
        self.pos += 1;
        Ok(())
    }

    fn skip_string(&mut self, quote: u8) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => self.advance(2),
                b'\n' => break,
                _ if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        Err(SyntaxError::new(start, "unterminated string literal"))
    }

    fn skip_line_comment(&mut self) {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
        self.comments.insert(start, self.pos);
    }

    fn skip_block_comment(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.pos += 2;
        while self.peek().is_some() {
            if self.starts_with("*/") {
                self.pos += 2;
                self.comments.insert(start, self.pos);
                return Ok(());
            }
            self.pos += 1;
        }
        Err(SyntaxError::new(start, "unterminated comment"))
    }

    fn skip_regex(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(SyntaxError::new(start, "unterminated regular expression"))
                }
                Some(b'\\') => self.advance(2),
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        // flags
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Ok(())
    }

    /// Whitespace and comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    if self.skip_block_comment().is_err() {
                        self.pos = self.limit;
                    }
                }
                _ => break,
            }
        }
    }

    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    fn read_number(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
        {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    fn read_identifier(&mut self) -> Result<&'a str, SyntaxError> {
        match self.peek() {
            Some(b) if is_ident_start(b) => Ok(self.read_word()),
            _ => Err(SyntaxError::new(self.pos, "expected identifier")),
        }
    }

    fn at_keyword(&self, word: &str) -> bool {
        self.starts_with(word)
            && !self
                .bytes
                .get(self.pos + word.len())
                .is_some_and(|b| self.pos + word.len() < self.limit && is_ident_char(*b))
    }

    // ---- JSX -----------------------------------------------------------

    fn at_element_start(&self) -> bool {
        self.peek() == Some(b'<')
            && self
                .peek_at(1)
                .is_some_and(|b| b == b'>' || is_ident_start(b))
    }

    /// Parse an element at `<`, or skip the `<` when it is not valid JSX
    fn try_element(&mut self) {
        let start = self.pos;
        if let Some(&end) = self.element_ends.get(&start) {
            self.pos = end;
            return;
        }
        if let Err(err) = self.parse_element() {
            log::debug!("skipping malformed element at byte {}: {}", start, err);
            self.elements.split_off(&start);
            self.element_ends.split_off(&start);
            self.comments.split_off(&start);
            self.pos = start + 1;
        }
    }

    fn parse_element(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        self.skip_trivia();

        // fragment
        if self.peek() == Some(b'>') {
            self.pos += 1;
            self.parse_children()?;
            self.element_ends.insert(start, self.pos);
            return Ok(());
        }

        let name = self.parse_element_name()?;
        let mut attributes = Vec::new();
        let self_closing = loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'/') if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    break true;
                }
                Some(b'>') => {
                    self.pos += 1;
                    break false;
                }
                Some(b'{') => attributes.push(self.parse_spread()?),
                Some(b) if is_ident_start(b) => {
                    attributes.push(AttributeItem::Attribute(self.parse_attribute()?))
                }
                Some(b) => {
                    return Err(SyntaxError::new(
                        self.pos,
                        format!("unexpected '{}' in element", b as char),
                    ))
                }
                None => return Err(SyntaxError::new(start, "unterminated element")),
            }
        };

        self.elements.insert(
            start,
            OpeningElement {
                name,
                attributes,
                self_closing,
                span: Span::new(start, self.pos),
            },
        );

        if !self_closing {
            self.parse_children()?;
        }
        self.element_ends.insert(start, self.pos);
        Ok(())
    }

    /// JSX identifiers may contain `-`
    fn read_jsx_identifier(&mut self) -> Result<String, SyntaxError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if is_ident_start(b) => {}
            _ => return Err(SyntaxError::new(start, "expected JSX identifier")),
        }
        while self.peek().is_some_and(|b| is_ident_char(b) || b == b'-') {
            self.pos += 1;
        }
        Ok(self.slice(start, self.pos).to_string())
    }

    fn parse_element_name(&mut self) -> Result<ElementName, SyntaxError> {
        let first = self.read_jsx_identifier()?;
        self.skip_trivia();

        if self.peek() == Some(b':') {
            self.pos += 1;
            self.skip_trivia();
            let name = self.read_jsx_identifier()?;
            return Ok(ElementName::Namespaced {
                namespace: first,
                name,
            });
        }

        let mut name = ElementName::Identifier(first);
        while self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_trivia();
            let property = self.read_jsx_identifier()?;
            name = ElementName::Member {
                object: Box::new(name),
                property,
            };
            self.skip_trivia();
        }
        Ok(name)
    }

    fn parse_spread(&mut self) -> Result<AttributeItem, SyntaxError> {
        let start = self.pos;
        self.skip_group(b'{', b'}')?;
        Ok(AttributeItem::Spread(Span::new(start, self.pos)))
    }

    fn parse_attribute(&mut self) -> Result<Attribute, SyntaxError> {
        let start = self.pos;
        let first = self.read_jsx_identifier()?;
        let name = if self.peek() == Some(b':') {
            self.pos += 1;
            AttributeName::Namespaced {
                namespace: first,
                name: self.read_jsx_identifier()?,
            }
        } else {
            AttributeName::Plain(first)
        };
        let name_end = self.pos;

        self.skip_trivia();
        if self.peek() != Some(b'=') {
            return Ok(Attribute {
                name,
                value: None,
                span: Span::new(start, name_end),
            });
        }
        self.pos += 1;
        self.skip_trivia();

        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => AttributeValue::String(self.parse_jsx_string(quote)?),
            Some(b'{') => AttributeValue::Container(self.parse_container()?),
            Some(b'<') if self.at_element_start() => {
                let element_start = self.pos;
                self.parse_element()?;
                AttributeValue::Element(Span::new(element_start, self.pos))
            }
            _ => return Err(SyntaxError::new(self.pos, "expected attribute value")),
        };

        Ok(Attribute {
            name,
            value: Some(value),
            span: Span::new(start, self.pos),
        })
    }

    /// JSX attribute strings have no escapes, only character references
    fn parse_jsx_string(&mut self, quote: u8) -> Result<StringLiteral, SyntaxError> {
        let start = self.pos;
        let end = self.bytes[start + 1..self.limit]
            .iter()
            .position(|&b| b == quote)
            .map(|i| start + 1 + i)
            .ok_or_else(|| SyntaxError::new(start, "unterminated attribute string"))?;
        self.pos = end + 1;
        Ok(StringLiteral {
            value: decode_entities(self.slice(start + 1, end)),
            span: Span::new(start, self.pos),
        })
    }

    fn parse_container(&mut self) -> Result<Expression, SyntaxError> {
        self.pos += 1;
        let inner_start = self.pos;
        self.scan_code(Some((b'{', b'}')))?;
        let inner_end = self.pos;
        self.pos += 1;
        Ok(self.parse_expression_slice(inner_start, inner_end))
    }

    fn parse_children(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(SyntaxError::new(start, "unterminated element children")),
                Some(b'<') if self.peek_at(1) == Some(b'/') => {
                    self.pos += 2;
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b'>' {
                            return Ok(());
                        }
                    }
                    return Err(SyntaxError::new(start, "unterminated closing tag"));
                }
                Some(b'<') => self.parse_element()?,
                Some(b'{') => self.skip_group(b'{', b'}')?,
                Some(_) => self.pos += 1,
            }
        }
    }

    // ---- expressions ---------------------------------------------------

    /// Parse `start..end` as one expression; unparseable input becomes `Other`
    fn parse_expression_slice(&mut self, start: usize, end: usize) -> Expression {
        let saved_pos = self.pos;
        let saved_limit = self.limit;
        self.pos = start;
        self.limit = end;

        self.skip_trivia();
        let expression = if self.pos >= end {
            Expression::Empty(Span::new(start, end))
        } else {
            let expr_start = self.pos;
            match self.parse_expression() {
                Ok(expr) => {
                    self.skip_trivia();
                    if self.pos == end {
                        expr
                    } else {
                        Expression::Other(Span::new(expr_start, end))
                    }
                }
                Err(err) => {
                    log::trace!("unmodelled expression at byte {}: {}", expr_start, err);
                    Expression::Other(Span::new(expr_start, end))
                }
            }
        };

        self.pos = saved_pos;
        self.limit = saved_limit;
        expression
    }

    fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.pos;
        let expr = self.parse_assignment()?;
        self.skip_trivia();
        if self.peek() != Some(b',') {
            return Ok(expr);
        }
        while self.peek() == Some(b',') {
            self.pos += 1;
            self.parse_assignment()?;
            self.skip_trivia();
        }
        Ok(Expression::Other(Span::new(start, self.pos)))
    }

    fn parse_assignment(&mut self) -> Result<Expression, SyntaxError> {
        self.skip_trivia();
        let start = self.pos;
        let expr = self.parse_conditional()?;
        self.skip_trivia();

        if self.starts_with("=>") {
            self.pos += 2;
            self.skip_trivia();
            if self.peek() == Some(b'{') {
                self.skip_group(b'{', b'}')?;
            } else {
                self.parse_assignment()?;
            }
            return Ok(Expression::Other(Span::new(start, self.pos)));
        }

        let assignment = ASSIGNMENT_OPERATORS
            .iter()
            .find(|op| self.starts_with(op))
            .map(|op| op.len())
            .or_else(|| {
                (self.peek() == Some(b'=') && !matches!(self.peek_at(1), Some(b'=') | Some(b'>')))
                    .then_some(1)
            });
        if let Some(len) = assignment {
            self.pos += len;
            self.parse_assignment()?;
            return Ok(Expression::Other(Span::new(start, self.pos)));
        }

        Ok(expr)
    }

    fn parse_conditional(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.pos;
        let test = self.parse_binary(0)?;
        self.skip_trivia();

        if self.peek() == Some(b'?') && self.peek_at(1) != Some(b'?') {
            self.pos += 1;
            let consequent = self.parse_assignment()?;
            self.expect(b':')?;
            let alternate = self.parse_assignment()?;
            return Ok(Expression::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
                span: Span::new(start, self.pos),
            });
        }

        Ok(test)
    }

    fn peek_binary_operator(&self) -> Option<(&'static str, u8)> {
        if let Some(&(op, prec)) = WORD_OPERATORS.iter().find(|(op, _)| self.at_keyword(op)) {
            return Some((op, prec));
        }

        let &(op, prec) = BINARY_OPERATORS.iter().find(|(op, _)| self.starts_with(op))?;
        // `+=`, `??=`, ... are assignments
        let followed_by_eq = self.bytes.get(self.pos + op.len()) == Some(&b'=');
        if followed_by_eq && !COMPARISONS.contains(&op) {
            return None;
        }
        Some((op, prec))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expression, SyntaxError> {
        self.skip_trivia();
        let start = self.pos;
        let mut left = self.parse_unary()?;

        loop {
            self.skip_trivia();
            let Some((op, prec)) = self.peek_binary_operator() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.pos += op.len();

            if op == "as" || op == "satisfies" {
                self.skip_type()?;
                left = Expression::Other(Span::new(start, self.pos));
                continue;
            }

            let right = self.parse_binary(prec + 1)?;
            let span = Span::new(start, self.pos);
            let operator = match op {
                "&&" => Some(LogicalOperator::And),
                "||" => Some(LogicalOperator::Or),
                "??" => Some(LogicalOperator::NullishCoalescing),
                _ => None,
            };
            left = match operator {
                Some(operator) => Expression::Logical {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                },
                None => Expression::Other(span),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        self.skip_trivia();
        let start = self.pos;

        if let Some(b @ (b'!' | b'~' | b'+' | b'-')) = self.peek() {
            let len = if matches!(b, b'+' | b'-') && self.peek_at(1) == Some(b) {
                2
            } else {
                1
            };
            self.pos += len;
            self.parse_unary()?;
            return Ok(Expression::Other(Span::new(start, self.pos)));
        }

        for keyword in ["typeof", "void", "delete", "await", "new"] {
            if self.at_keyword(keyword) {
                self.pos += keyword.len();
                self.parse_unary()?;
                return Ok(Expression::Other(Span::new(start, self.pos)));
            }
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.pos;
        let mut expr = self.parse_primary()?;

        loop {
            self.skip_trivia();
            match (self.peek(), self.peek_at(1)) {
                (Some(b'.'), next) if next != Some(b'.') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.peek() == Some(b'#') {
                        self.pos += 1;
                    }
                    self.read_identifier()?;
                }
                (Some(b'?'), Some(b'.'))
                    if !self.peek_at(2).is_some_and(|b| b.is_ascii_digit()) =>
                {
                    self.pos += 2;
                    self.skip_trivia();
                    match self.peek() {
                        Some(b'(') => self.skip_group(b'(', b')')?,
                        Some(b'[') => self.skip_group(b'[', b']')?,
                        _ => {
                            self.read_identifier()?;
                        }
                    }
                }
                (Some(b'['), _) => self.skip_group(b'[', b']')?,
                (Some(b'('), _) => self.skip_group(b'(', b')')?,
                (Some(b'`'), _) => {
                    self.parse_template()?;
                }
                (Some(b'!'), next) if next != Some(b'=') => self.pos += 1,
                (Some(b'+'), Some(b'+')) | (Some(b'-'), Some(b'-')) => self.pos += 2,
                _ => break,
            }
            expr = Expression::Other(Span::new(start, self.pos));
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        self.skip_trivia();
        let start = self.pos;

        match self.peek() {
            None => Err(SyntaxError::new(start, "unexpected end of expression")),
            Some(quote @ (b'"' | b'\'')) => self.parse_string_literal(quote).map(Expression::Literal),
            Some(b'`') => self.parse_template().map(Expression::Template),
            Some(b) if b.is_ascii_digit()
                || (b == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let raw = self.read_number();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::Number(raw.to_string()),
                    span: Span::new(start, self.pos),
                }))
            }
            Some(b'(') => self.parse_parenthesized(),
            Some(b'[') => {
                self.skip_group(b'[', b']')?;
                Ok(Expression::Other(Span::new(start, self.pos)))
            }
            Some(b'{') => {
                self.skip_group(b'{', b'}')?;
                Ok(Expression::Other(Span::new(start, self.pos)))
            }
            Some(b'<') => {
                if let Some(&end) = self.element_ends.get(&start) {
                    self.pos = end;
                } else if self.at_element_start() {
                    self.parse_element()?;
                } else {
                    return Err(SyntaxError::new(start, "unexpected '<'"));
                }
                Ok(Expression::Other(Span::new(start, self.pos)))
            }
            Some(b'/') => {
                self.skip_regex()?;
                Ok(Expression::Other(Span::new(start, self.pos)))
            }
            Some(b) if is_ident_start(b) => {
                let word = self.read_word();
                let value = match word {
                    "true" => LiteralValue::Boolean(true),
                    "false" => LiteralValue::Boolean(false),
                    "null" => LiteralValue::Null,
                    "function" | "class" => {
                        self.skip_declaration()?;
                        return Ok(Expression::Other(Span::new(start, self.pos)));
                    }
                    _ => return Ok(Expression::Other(Span::new(start, self.pos))),
                };
                Ok(Expression::Literal(Literal {
                    value,
                    span: Span::new(start, self.pos),
                }))
            }
            Some(b) => Err(SyntaxError::new(
                start,
                format!("unexpected '{}' in expression", b as char),
            )),
        }
    }

    /// Parentheses are transparent: `(a ? "x" : "y")` is the conditional
    fn parse_parenthesized(&mut self) -> Result<Expression, SyntaxError> {
        let open = self.pos;
        self.skip_group(b'(', b')')?;
        let after = self.pos;
        let close = after - 1;

        let saved_limit = self.limit;
        self.pos = open + 1;
        self.limit = close;
        let inner = match self.parse_expression() {
            Ok(expr) => {
                self.skip_trivia();
                if self.pos == close {
                    expr
                } else {
                    Expression::Other(Span::new(open, after))
                }
            }
            // `()` of an arrow, typed parameters, ...
            Err(_) => Expression::Other(Span::new(open, after)),
        };
        self.pos = after;
        self.limit = saved_limit;
        Ok(inner)
    }

    /// Skip the rest of a `function` or `class` expression
    fn skip_declaration(&mut self) -> Result<(), SyntaxError> {
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'{') => return self.skip_group(b'{', b'}'),
                Some(b'(') => self.skip_group(b'(', b')')?,
                Some(_) => self.pos += 1,
                None => return Err(SyntaxError::new(self.pos, "unterminated declaration")),
            }
        }
    }

    /// Skip a TypeScript type after `as` / `satisfies`
    fn skip_type(&mut self) -> Result<(), SyntaxError> {
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b) if is_ident_start(b) => {
                    self.read_word();
                }
                Some(quote @ (b'"' | b'\'')) => self.skip_string(quote)?,
                Some(b'{') => self.skip_group(b'{', b'}')?,
                Some(b'(') => self.skip_group(b'(', b')')?,
                Some(b'[') => self.skip_group(b'[', b']')?,
                _ => return Err(SyntaxError::new(self.pos, "expected type")),
            }

            loop {
                self.skip_trivia();
                match (self.peek(), self.peek_at(1)) {
                    (Some(b'<'), _) => self.skip_type_arguments()?,
                    (Some(b'['), Some(b']')) => self.pos += 2,
                    (Some(b'.'), _) => {
                        self.pos += 1;
                        self.read_identifier()?;
                    }
                    _ => break,
                }
            }

            match (self.peek(), self.peek_at(1)) {
                (Some(b'|'), next) if next != Some(b'|') => self.pos += 1,
                (Some(b'&'), next) if next != Some(b'&') => self.pos += 1,
                _ => return Ok(()),
            }
        }
    }

    fn skip_type_arguments(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(SyntaxError::new(start, "unterminated type arguments"))
    }

    fn parse_string_literal(&mut self, quote: u8) -> Result<Literal, SyntaxError> {
        let start = self.pos;
        self.skip_string(quote)?;
        let raw = self.slice(start + 1, self.pos - 1);
        let value = cook(raw, false)
            .ok_or_else(|| SyntaxError::new(start, "invalid escape sequence"))?;
        Ok(Literal {
            value: LiteralValue::String(value),
            span: Span::new(start, self.pos),
        })
    }

    fn parse_template(&mut self) -> Result<TemplateLiteral, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut chunk_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(SyntaxError::new(start, "unterminated template literal")),
                Some(b'\\') => self.advance(2),
                Some(b'`') => {
                    quasis.push(self.template_element(chunk_start, self.pos));
                    self.pos += 1;
                    return Ok(TemplateLiteral {
                        quasis,
                        expressions,
                        span: Span::new(start, self.pos),
                    });
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    quasis.push(self.template_element(chunk_start, self.pos));
                    self.pos += 2;
                    let inner_start = self.pos;
                    self.scan_code(Some((b'{', b'}')))?;
                    let inner_end = self.pos;
                    self.pos += 1;
                    expressions.push(self.parse_expression_slice(inner_start, inner_end));
                    chunk_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn template_element(&self, start: usize, end: usize) -> TemplateElement {
        let raw = self.slice(start, end);
        TemplateElement {
            raw: raw.to_string(),
            cooked: cook(raw, true),
            span: Span::new(start, end),
        }
    }
}

/// Process escape sequences of a string (`template == false`) or template
/// chunk. Returns `None` for escapes that have no cooked value.
fn cook(raw: &str, template: bool) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' && template {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
            continue;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }

        let escaped = chars.next()?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            '0'..='7' => {
                // legacy octal, strings only
                if template {
                    return None;
                }
                let mut value = escaped.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) if value * 8 + d <= 0o377 => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            '8' | '9' if template => return None,
            'x' => {
                let value = take_hex(&mut chars, 2)?;
                out.push(char::from_u32(value)?);
            }
            'u' => out.push(unicode_escape(&mut chars)?),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    Some(out)
}

fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// `\uXXXX`, `\u{X...}`, and surrogate pairs written as two escapes
fn unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    if chars.peek() == Some(&'{') {
        chars.next();
        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            let c = chars.next()?;
            if c == '}' {
                break;
            }
            value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            digits += 1;
        }
        if digits == 0 {
            return None;
        }
        return char::from_u32(value);
    }

    let high = take_hex(chars, 4)?;
    if !(0xD800..=0xDBFF).contains(&high) {
        return char::from_u32(high);
    }

    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        if let Some(low) = take_hex(&mut lookahead, 4) {
            if (0xDC00..=0xDFFF).contains(&low) {
                *chars = lookahead;
                return char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
            }
        }
    }
    // lone surrogate
    Some(char::REPLACEMENT_CHARACTER)
}

/// Decode XML character references in JSX attribute strings
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let value = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(value);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
