//! attrlint - JSX attribute literal linter
//!
//! Flags hard-coded, user-visible text passed to components through JSX
//! attributes, so that it can be routed through translation.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> Plugin (jsx) -> Document -> Rule -> Diagnostic
//! ```
//!
//! Each rule extracts [`AttributeDescriptor`]s from an element's attributes,
//! then keeps those selected by its [`RuleConfiguration`]: a pair of filter
//! trees (`only` and `ignores`) resolved from the user's options and the
//! rule's built-in defaults.
//!
//! ```yaml
//! rules:
//!   options:
//!     no-attribute-string-literals:
//!       mode: extend
//!       ignores:
//!         or:
//!           - attributes: [variant, size]
//!           - components: [Icon]
//! ```

pub mod ast;
pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod diagnostic;
pub mod engine;
pub mod filter;
pub mod names;
pub mod options;
pub mod output;
pub mod plugin;
pub mod resolve;
pub mod rule;

/// Built-in plugins
pub mod plugins {
    pub mod jsx;
}

// Re-export main types
pub use config::{Config, ConfigError};
pub use descriptor::{AttributeDescriptor, ExtractionPolicy};
pub use diagnostic::{Diagnostic, Location, Severity};
pub use engine::{Engine, LintResult, RuleTiming};
pub use filter::{evaluate, is_vacuous, FilterExpr, Pattern, Predicate};
pub use options::{FilterLiteral, FilterOption, Mode, OptionsError, PredicateLiteral, RuleOptions};
pub use output::{CompactFormatter, JsonFormatter, OutputFormatter, TextFormatter};
pub use plugin::{Document, ParseError, Plugin};
pub use resolve::RuleConfiguration;
pub use rule::{Report, Reporter, Rule};
