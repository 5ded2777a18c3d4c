//! # ctor-lint-rules
//!
//! Built-in lint rules for ctor-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description | Fixable |
//! |------|------|-------------|---------|
//! | CL001 | `ctor-param-per-line` | Requires constructor parameters to each be on their own line | yes |
//!
//! ## Usage
//!
//! ```ignore
//! use ctor_lint_core::Analyzer;
//! use ctor_lint_rules::CtorParamPerLine;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(CtorParamPerLine::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ctor_param_per_line;
mod registry;

pub use ctor_param_per_line::{evaluate, rewrite, CtorParamPerLine, LayoutDiagnostic};
pub use registry::{all_rules, configured_rules, rule_by_name};

/// Re-export core types for convenience.
pub use ctor_lint_core::{Rule, Severity, Violation};
