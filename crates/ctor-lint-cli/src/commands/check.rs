//! Check command implementation.

use anyhow::{Context, Result};
use ctor_lint_core::{Config, Severity};
use std::path::Path;

use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `false` if a violation at or above the failure threshold was
/// found. The threshold is `--fail-on`, then `fail_on` from the config, then
/// warning.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    fail_on: Option<Severity>,
    config: Config,
) -> Result<bool> {
    let threshold = fail_on.or(config.fail_on).unwrap_or(Severity::Warning);
    let analyzer = super::build_analyzer(path, rules_filter, exclude, config)?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    Ok(!result.has_violations_at(threshold))
}
