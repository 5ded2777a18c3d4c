//! # ctor-lint-core
//!
//! Core framework for linting the layout of constructor parameter lists.
//!
//! This crate provides:
//!
//! - [`layout`]: an immutable layout tree (parameters, trivia, positions)
//!   built from `syn` spans and the original text
//! - [`syntax`]: the adapter that finds constructors in a `syn::File`
//! - [`Normalizer`] for re-indenting rewritten nodes
//! - [`Rule`] trait for per-file rules and [`Analyzer`] for running them
//! - [`Fixer`] for applying fixes until a file is clean
//!
//! ## Example
//!
//! ```ignore
//! use ctor_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod fix;
mod normalize;
mod rule;
mod types;

pub mod layout;
pub mod syntax;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, CancellationToken};
pub use config::{AnalyzerConfig, Config, ConfigError, FixConfig, RuleConfig};
pub use context::FileContext;
pub use fix::{apply_replacements, FileFix, FixError, FixOutcome, FixReport, Fixer};
pub use normalize::{IndentNormalizer, Normalizer, DEFAULT_INDENT};
pub use rule::{Rule, RuleBox};
pub use types::{
    LintResult, Location, ParseSeverityError, Replacement, Severity, Suggestion, Violation,
    ViolationDiagnostic,
};
pub use utils::allowance::{AllowCheck, AllowDirective};
