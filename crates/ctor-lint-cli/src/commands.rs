//! Subcommand implementations.

pub mod check;
pub mod fix;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::{Context, Result};
use ctor_lint_core::{Analyzer, Config, RuleBox};
use std::path::Path;

/// Builds an analyzer for `path` with the selected rules.
///
/// `rules_filter` is a comma-separated list of rule names or codes; without
/// it every built-in rule runs.
pub fn build_analyzer(
    path: &Path,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    config: Config,
) -> Result<Analyzer> {
    let rules = match rules_filter {
        Some(filter) => select_rules(&filter, &config),
        None => ctor_lint_rules::configured_rules(&config),
    };

    let mut builder = Analyzer::builder().root(path).excludes(exclude);
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    builder
        .config(config)
        .build()
        .context("Failed to build analyzer")
}

fn select_rules(filter: &str, config: &Config) -> Vec<RuleBox> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let rule = ctor_lint_rules::rule_by_name(name, config);
            if rule.is_none() {
                tracing::warn!("Unknown rule: {}", name);
            }
            rule
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_rules_by_name_and_code() {
        let config = Config::default();
        assert_eq!(select_rules("ctor-param-per-line", &config).len(), 1);
        assert_eq!(select_rules(" CL001 ,", &config).len(), 1);
        assert!(select_rules("no-such-rule", &config).is_empty());
    }
}
