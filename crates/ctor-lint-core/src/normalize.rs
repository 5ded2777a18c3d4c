//! Indentation normalization for rewritten layout trees.
//!
//! Rewrites only decide where line breaks go. A [`Normalizer`] runs
//! afterwards on nodes flagged with [`ConstructorDecl::needs_format`] and
//! computes the whitespace that follows those breaks.

use crate::layout::ConstructorDecl;

use std::sync::Arc;

/// Default indentation unit.
pub const DEFAULT_INDENT: &str = "    ";

/// Computes final whitespace for nodes that need formatting.
pub trait Normalizer: Send + Sync {
    /// Normalizes `decl`, returning a node that no longer needs formatting.
    ///
    /// Nodes that are not flagged must be returned unchanged.
    fn normalize(&self, decl: ConstructorDecl) -> ConstructorDecl;
}

/// Indents parameters moved to their own line one unit deeper than the
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentNormalizer {
    unit: String,
}

impl Default for IndentNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentNormalizer {
    /// Creates a normalizer indenting by four spaces.
    #[must_use]
    pub fn new() -> Self {
        Self::with_unit(DEFAULT_INDENT)
    }

    /// Creates a normalizer with a custom indentation unit (e.g. `"\t"`).
    #[must_use]
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    /// The indentation unit.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl Normalizer for IndentNormalizer {
    fn normalize(&self, decl: ConstructorDecl) -> ConstructorDecl {
        if !decl.needs_format() {
            return decl;
        }

        let indent = format!("{}{}", decl.indent(), self.unit);
        let parameters = decl
            .parameters()
            .parameters()
            .iter()
            .map(|param| {
                if param.leading().needs_indent() {
                    Arc::new(param.with_leading(param.leading().indented(&indent)))
                } else {
                    Arc::clone(param)
                }
            })
            .collect();

        decl.with_parameters(parameters).formatted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Parameter, ParameterList, TextPos, TextSpan, Trivia};

    fn decl(leadings: &[&str]) -> ConstructorDecl {
        let parameters = leadings
            .iter()
            .enumerate()
            .map(|(i, leading)| {
                Arc::new(Parameter::new(
                    format!("p{i}"),
                    Trivia::parse(leading),
                    format!("p{i}: u8"),
                    ",",
                    TextSpan::default(),
                ))
            })
            .collect();
        let list = ParameterList::new(0..0, TextPos::new(1, 0, 0), parameters, Trivia::default());
        ConstructorDecl::new("T", "new", "    ", list)
    }

    #[test]
    fn test_unflagged_node_is_untouched() {
        let original = decl(&["", "\n"]);
        let normalized = IndentNormalizer::new().normalize(original.clone());
        assert_eq!(normalized, original);
    }

    #[test]
    fn test_indents_bare_line_breaks() {
        let flagged = decl(&["", "\n", "\n  "]).mark_needs_format();
        let normalized = IndentNormalizer::new().normalize(flagged);

        assert!(!normalized.needs_format());
        assert_eq!(
            normalized.parameters().render(),
            "p0: u8,\n        p1: u8,\n  p2: u8,"
        );
        assert_eq!(normalized.parameters().parameters()[1].span().start.column, 8);
    }

    #[test]
    fn test_custom_unit() {
        let flagged = decl(&["", "\n"]).mark_needs_format();
        let normalized = IndentNormalizer::with_unit("\t").normalize(flagged);
        assert_eq!(normalized.parameters().render(), "p0: u8,\n    \tp1: u8,");
    }
}
