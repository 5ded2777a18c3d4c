//! Comment-based allowance directives.
//!
//! A directive on a constructor's line, or on the line above it, silences a
//! rule for that constructor:
//!
//! ```text
//! // ctor-lint: allow(ctor-param-per-line) reason="mirrors the FFI signature"
//! ```
//!
//! `allow(all)` silences every rule.

use std::collections::BTreeSet;

const DIRECTIVE_PREFIX: &str = "ctor-lint:";

/// Result of looking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// No directive applies.
    Denied,
    /// A directive allows the rule.
    Allowed {
        /// The reason given with the directive, if any.
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// A parsed `ctor-lint: allow(...)` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule names listed in the directive.
    pub rules: BTreeSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Parses a directive from one source line.
    ///
    /// The directive may follow code on the same line (`fn new( // ctor-lint: ...`).
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let comment = &line[line.find("//")?..];
        let body = comment.trim_start_matches('/').trim();
        let rest = body.strip_prefix(DIRECTIVE_PREFIX)?.trim_start();
        let rest = rest.strip_prefix("allow(")?;

        let close = rest.find(')')?;
        let rules: BTreeSet<String> = rest[..close]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if rules.is_empty() {
            return None;
        }

        let reason = rest[close + 1..]
            .trim()
            .strip_prefix("reason=")
            .and_then(|r| r.trim().strip_prefix('"'))
            .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

        Some(Self { rules, reason })
    }

    /// Returns true if the directive covers `rule_name`.
    #[must_use]
    pub fn covers(&self, rule_name: &str) -> bool {
        self.rules.contains(rule_name) || self.rules.contains("all")
    }
}

/// Looks for a directive covering `rule_name` on any of `lines` or the line
/// just above each of them.
///
/// Lines are 1-indexed; out-of-range lines are ignored.
#[must_use]
pub fn check_allow_at(content: &str, lines: &[usize], rule_name: &str) -> AllowCheck {
    let source: Vec<&str> = content.lines().collect();

    let candidates = lines
        .iter()
        .flat_map(|&line| [line.saturating_sub(1), line])
        .filter(|&line| line > 0)
        .filter_map(|line| source.get(line - 1));

    for text in candidates {
        if let Some(directive) = AllowDirective::parse(text) {
            if directive.covers(rule_name) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = "ctor-param-per-line";

    #[test]
    fn test_parse_plain_directive() {
        let directive = AllowDirective::parse("    // ctor-lint: allow(ctor-param-per-line)").unwrap();
        assert!(directive.covers(RULE));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_reason_and_multiple_rules() {
        let directive =
            AllowDirective::parse(r#"/// ctor-lint: allow(rule-a, rule-b) reason="generated code""#)
                .unwrap();
        assert!(directive.covers("rule-a"));
        assert!(directive.covers("rule-b"));
        assert!(!directive.covers(RULE));
        assert_eq!(directive.reason.as_deref(), Some("generated code"));
    }

    #[test]
    fn test_parse_trailing_comment_and_all() {
        let directive = AllowDirective::parse("fn new( // ctor-lint: allow(all)").unwrap();
        assert!(directive.covers(RULE));
    }

    #[test]
    fn test_parse_rejects_other_comments() {
        assert!(AllowDirective::parse("// just a comment").is_none());
        assert!(AllowDirective::parse("// ctor-lint: allow()").is_none());
        assert!(AllowDirective::parse("let x = 1;").is_none());
    }

    #[test]
    fn test_check_allow_on_line_above() {
        let content = r#"impl Rgb {
    // ctor-lint: allow(ctor-param-per-line) reason="matches the C struct"
    fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}"#;

        let result = check_allow_at(content, &[3], RULE);
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("matches the C struct"));
        assert!(!check_allow_at(content, &[3], "other-rule").is_allowed());
    }

    #[test]
    fn test_check_allow_above_attributes() {
        let content = r"impl Rgb {
    // ctor-lint: allow(ctor-param-per-line)
    #[must_use]
    fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}";

        assert!(!check_allow_at(content, &[4], RULE).is_allowed());
        let result = check_allow_at(content, &[3, 4], RULE);
        assert!(result.is_allowed());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_check_allow_denied_and_out_of_range() {
        let content = "impl Rgb {\n    fn new(r: u8, g: u8, b: u8) -> Self { todo!() }\n}";
        assert_eq!(check_allow_at(content, &[2], RULE), AllowCheck::Denied);
        assert_eq!(check_allow_at(content, &[0, 99], RULE), AllowCheck::Denied);
    }
}
