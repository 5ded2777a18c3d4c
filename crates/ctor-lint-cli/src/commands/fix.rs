//! Fix command implementation.

use anyhow::{Context, Result};
use ctor_lint_core::{Config, FixReport};
use std::path::Path;

/// Runs the fix command.
pub fn run(
    path: &Path,
    dry_run: bool,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    config: Config,
) -> Result<()> {
    let analyzer = super::build_analyzer(path, rules_filter, exclude, config)?;

    let report = analyzer.fix(!dry_run).context("Fix failed")?;
    print!("{}", summary(&report, dry_run));

    Ok(())
}

fn summary(report: &FixReport, dry_run: bool) -> String {
    use std::fmt::Write;

    let verb = if dry_run { "Would fix" } else { "Fixed" };
    let mut out = String::new();
    for file in &report.files {
        let _ = writeln!(out, "{verb} {} ({} fix(es))", file.file.display(), file.fixes);
    }
    let _ = writeln!(
        out,
        "{verb} {} issue(s) in {} of {} file(s)",
        report.total_fixes(),
        report.files.len(),
        report.files_checked
    );
    out
}
