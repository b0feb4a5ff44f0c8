//! Effective filters for a rule instance

use crate::defaults::RuleDefaults;
use crate::descriptor::AttributeDescriptor;
use crate::filter::{evaluate, is_vacuous, FilterExpr};
use crate::options::{FilterOption, Mode, OptionsError, RuleOptions};

/// The two filters a rule evaluates, built once per rule instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleConfiguration {
    /// Inclusion filter; vacuous means "consider everything"
    pub only: Option<FilterExpr>,
    /// Exclusion filter
    pub ignores: Option<FilterExpr>,
}

impl RuleConfiguration {
    /// Combine user filters with the rule defaults
    ///
    /// `override` discards the defaults. `extend` requires both inclusion
    /// filters to hold and lets either exclusion filter exclude.
    pub fn resolve(
        user_only: Option<FilterExpr>,
        user_ignores: Option<FilterExpr>,
        default_only: Option<FilterExpr>,
        default_ignores: Option<FilterExpr>,
        mode: Mode,
    ) -> Self {
        match mode {
            Mode::Override => Self {
                only: user_only,
                ignores: user_ignores,
            },
            Mode::Extend => Self {
                only: Some(FilterExpr::And(
                    [user_only, default_only].into_iter().flatten().collect(),
                )),
                ignores: Some(FilterExpr::Or(
                    [user_ignores, default_ignores].into_iter().flatten().collect(),
                )),
            },
        }
    }

    /// Compile user options and rule defaults into effective filters
    pub fn from_options(options: &RuleOptions, defaults: &RuleDefaults) -> Result<Self, OptionsError> {
        Ok(Self::resolve(
            compile(options.only.as_ref())?,
            compile(options.ignores.as_ref())?,
            compile(defaults.only.as_ref())?,
            compile(defaults.ignores.as_ref())?,
            options.mode(),
        ))
    }

    /// Whether a descriptor survives both filters
    pub fn selects(&self, d: &AttributeDescriptor) -> bool {
        let only = self.only.as_ref();
        (is_vacuous(only) || evaluate(only, d)) && !evaluate(self.ignores.as_ref(), d)
    }
}

fn compile(option: Option<&FilterOption>) -> Result<Option<FilterExpr>, OptionsError> {
    option.map(FilterOption::to_expr).transpose()
}
