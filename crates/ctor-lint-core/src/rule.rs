//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::types::{Severity, Violation};

/// A per-file lint rule based on `syn` AST analysis.
///
/// Implement this trait to create rules that analyze individual source files.
/// Rules receive the parsed AST; constructor rules usually hand it to
/// [`crate::syntax::constructors`] and inspect the layout trees it returns.
///
/// # Example
///
/// ```ignore
/// use ctor_lint_core::{FileContext, Rule, Violation};
/// use ctor_lint_core::syntax::{constructors, LineIndex};
///
/// pub struct NoEmptyConstructors;
///
/// impl Rule for NoEmptyConstructors {
///     fn name(&self) -> &'static str { "no-empty-constructors" }
///     fn code(&self) -> &'static str { "CL100" }
///
///     fn check(&self, ctx: &FileContext, ast: &syn::File) -> Vec<Violation> {
///         let index = LineIndex::new(ctx.content);
///         constructors(ast, &index)
///             .into_iter()
///             .filter(|site| site.decl.parameters().is_empty())
///             .map(|site| /* build a Violation */)
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "ctor-param-per-line").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "CL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether violations from this rule carry automatic fixes.
    fn fixable(&self) -> bool {
        false
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    /// Override this to customize the requirement.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Checks a single file and returns any violations found.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context about the file being checked
    /// * `ast` - The parsed syntax tree of the file
    ///
    /// # Returns
    ///
    /// A vector of violations found in this file.
    fn check(&self, ctx: &FileContext, ast: &syn::File) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
