//! Lookup of built-in rules by name or code.

use crate::CtorParamPerLine;
use ctor_lint_core::{Config, Rule, RuleBox};

/// Returns every built-in rule with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    configured_rules(&Config::default())
}

/// Returns every built-in rule configured from `config`.
///
/// Disabled rules are still returned; the analyzer skips them.
#[must_use]
pub fn configured_rules(config: &Config) -> Vec<RuleBox> {
    vec![Box::new(CtorParamPerLine::from_config(config))]
}

/// Finds a built-in rule by name (`ctor-param-per-line`) or code (`CL001`).
#[must_use]
pub fn rule_by_name(name: &str, config: &Config) -> Option<RuleBox> {
    configured_rules(config)
        .into_iter()
        .find(|rule| rule.name() == name || rule.code().eq_ignore_ascii_case(name))
}
