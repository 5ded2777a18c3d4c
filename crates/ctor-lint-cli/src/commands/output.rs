//! Shared output formatting for lint results.

use anyhow::Result;
use ctor_lint_core::{LintResult, Severity, Violation, ViolationDiagnostic};
use miette::NamedSource;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is used to read sources for the pretty format.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        if let Some(suggestion) = &violation.suggestion {
            let fixable = if suggestion.replacement.is_some() {
                " (fixable)"
            } else {
                ""
            };
            println!("  = help: {}{fixable}", suggestion.message);
        }
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );

    let fixable = result.fixable_count();
    if fixable > 0 {
        println!("{fixable} issue(s) can be fixed with `ctor-lint fix`");
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        println!("{:?}", report(violation, root));
    }
    print_summary(result);
}

/// Renders a violation with its source snippet; falls back to the plain
/// diagnostic when the file cannot be read.
fn report(violation: &Violation, root: &Path) -> miette::Report {
    let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation));
    let name = violation.location.file.display().to_string();

    match std::fs::read_to_string(root.join(&violation.location.file)) {
        Ok(content) => diagnostic.with_source_code(NamedSource::new(name, content)),
        Err(e) => {
            tracing::debug!("Cannot read {} for display: {}", name, e);
            diagnostic
        }
    }
}
