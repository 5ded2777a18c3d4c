//! Rule requiring constructor parameters to sit on separate lines.
//!
//! # Rationale
//!
//! A constructor with several parameters reads like a field list. Putting
//! each parameter on its own line keeps diffs small and makes the mapping
//! from argument to field easy to scan.
//!
//! # Detected Patterns
//!
//! Associated functions returning `Self` (or the impl's type, possibly as
//! `Result<Self, E>`, `Option<Self>`, ...) with at least three parameters,
//! where a parameter ends on the same line as the one before it:
//!
//! ```ignore
//! impl Rgb {
//!     fn new(r: u8, g: u8, b: u8) -> Self { ... }
//! }
//! ```
//!
//! # Fix
//!
//! The whitespace in front of every colliding parameter is replaced by a line
//! break; comments in that whitespace are kept. The normalizer then indents
//! the moved parameters one level deeper than the signature:
//!
//! ```ignore
//! impl Rgb {
//!     fn new(r: u8,
//!         g: u8,
//!         b: u8) -> Self { ... }
//! }
//! ```

use ctor_lint_core::layout::{ConstructorDecl, Parameter, TextSpan};
use ctor_lint_core::syntax::{constructors, ConstructorSite, LineIndex};
use ctor_lint_core::utils::check_allow_at;
use ctor_lint_core::{
    Config, FileContext, IndentNormalizer, Location, Normalizer, Replacement, Rule, Severity,
    Suggestion, Violation,
};
use std::sync::Arc;
use tracing::debug;

/// Rule code for ctor-param-per-line.
pub const CODE: &str = "CL001";

/// Rule name for ctor-param-per-line.
pub const NAME: &str = "ctor-param-per-line";

/// Diagnostic message.
pub const MESSAGE: &str = "Constructor parameters should each be on their own line";

/// Title of the automatic fix.
pub const FIX_TITLE: &str = "Place each constructor parameter on its own line";

/// Constructors with fewer parameters than this are never reported.
pub const DEFAULT_MIN_PARAMS: usize = 3;

/// A layout violation in one constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDiagnostic {
    /// Name of the rule that produced the diagnostic.
    pub rule: &'static str,
    /// Human-readable message.
    pub message: &'static str,
    /// Index of the offending parameter.
    pub parameter: usize,
    /// Source span of the offending parameter.
    pub span: TextSpan,
}

/// Indices of parameters that end on the same line as their predecessor.
fn collisions(params: &[Arc<Parameter>]) -> impl Iterator<Item = usize> + '_ {
    params
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].end_line() == pair[1].end_line())
        .map(|(i, _)| i + 1)
}

/// Checks the parameter layout of `decl`.
///
/// Reports the first parameter that ends on the same line as the one before
/// it. Lists shorter than `min_params` are never reported.
#[must_use]
pub fn evaluate(decl: &ConstructorDecl, min_params: usize) -> Option<LayoutDiagnostic> {
    let params = decl.parameters().parameters();
    if params.len() < min_params {
        return None;
    }

    collisions(params).next().map(|index| LayoutDiagnostic {
        rule: NAME,
        message: MESSAGE,
        parameter: index,
        span: params[index].span(),
    })
}

/// Moves every colliding parameter of `decl` onto a new line.
///
/// The result has the same parameters in the same order; only their leading
/// trivia differ. It is flagged as needing formatting and is expected to go
/// through a [`Normalizer`] before it is rendered.
#[must_use]
pub fn rewrite(decl: &ConstructorDecl) -> ConstructorDecl {
    let params = decl.parameters().parameters();
    let mut rewritten: Vec<Arc<Parameter>> = params.to_vec();

    for index in collisions(params) {
        let param = &params[index];
        let leading = param.leading().broken_before(decl.line_ending());
        rewritten[index] = Arc::new(param.with_leading(leading));
    }

    decl.with_parameters(rewritten).mark_needs_format()
}

/// Requires each constructor parameter to be on its own line.
#[derive(Debug, Clone)]
pub struct CtorParamPerLine {
    /// Severity level.
    pub severity: Severity,
    /// Minimum number of parameters before the layout is checked.
    pub min_params: usize,
    /// Whether violations carry an automatic fix.
    pub autofix: bool,
    normalizer: IndentNormalizer,
}

impl Default for CtorParamPerLine {
    fn default() -> Self {
        Self::new()
    }
}

impl CtorParamPerLine {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
            min_params: DEFAULT_MIN_PARAMS,
            autofix: true,
            normalizer: IndentNormalizer::new(),
        }
    }

    /// Creates the rule from `[rules.ctor-param-per-line]` and `[fix]`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut rule = Self::new().indent(config.fix.indent.clone());

        if let Some(rule_config) = config.rule(NAME) {
            if let Some(severity) = rule_config.severity {
                rule = rule.severity(severity);
            }
            let default_min = i64::try_from(DEFAULT_MIN_PARAMS).unwrap_or(i64::MAX);
            let min_params = rule_config.get_int("min_params", default_min);
            rule = rule
                .min_params(usize::try_from(min_params).unwrap_or(DEFAULT_MIN_PARAMS))
                .autofix(rule_config.get_bool("autofix", true));
        }

        rule
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the minimum parameter count.
    #[must_use]
    pub fn min_params(mut self, min_params: usize) -> Self {
        self.min_params = min_params;
        self
    }

    /// Enables or disables the automatic fix.
    #[must_use]
    pub fn autofix(mut self, autofix: bool) -> Self {
        self.autofix = autofix;
        self
    }

    /// Sets the indentation unit used for moved parameters.
    #[must_use]
    pub fn indent(mut self, unit: impl Into<String>) -> Self {
        self.normalizer = IndentNormalizer::with_unit(unit);
        self
    }

    /// Builds the replacement for the whole parameter list of `decl`.
    fn fix_for(&self, ctx: &FileContext, decl: &ConstructorDecl) -> Replacement {
        let fixed = self.normalizer.normalize(rewrite(decl));
        let list = decl.parameters();
        let range = list.source_range();
        let start = list.start();

        let location = Location::new(ctx.relative_path.clone(), start.line, start.column + 1)
            .with_span(range.start, range.len());
        Replacement::new(location, fixed.parameters().render())
    }

    fn check_site(&self, ctx: &FileContext, site: &ConstructorSite) -> Option<Violation> {
        let diagnostic = evaluate(&site.decl, self.min_params)?;
        let location = Location::from_span(ctx.relative_path.clone(), diagnostic.span);

        let allow_check = check_allow_at(ctx.content, &[site.item_line, site.fn_line], NAME);
        if allow_check.is_allowed() {
            if self.requires_allow_reason() && allow_check.reason().is_none() {
                return Some(
                    Violation::new(
                        CODE,
                        NAME,
                        Severity::Warning,
                        location,
                        format!("Allow directive for '{NAME}' is missing required reason"),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
            return None;
        }

        debug!(
            "{}::{} has parameter `{}` on a shared line",
            site.decl.owner(),
            site.decl.name(),
            site.decl.parameters().parameters()[diagnostic.parameter].name()
        );

        let suggestion = if self.autofix {
            Suggestion::with_fix(FIX_TITLE, self.fix_for(ctx, &site.decl))
        } else {
            Suggestion::new(FIX_TITLE)
        };

        Some(
            Violation::new(CODE, NAME, self.severity, location, diagnostic.message)
                .with_suggestion(suggestion),
        )
    }
}

impl Rule for CtorParamPerLine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires constructor parameters to each be on their own line"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn fixable(&self) -> bool {
        self.autofix
    }

    fn check(&self, ctx: &FileContext, ast: &syn::File) -> Vec<Violation> {
        let index = LineIndex::new(ctx.content);
        constructors(ast, &index)
            .iter()
            .filter_map(|site| self.check_site(ctx, site))
            .collect()
    }
}
