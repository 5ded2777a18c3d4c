//! Configuration types for ctor-lint.

use crate::normalize::DEFAULT_INDENT;
use crate::Severity;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for ctor-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Severity threshold for a failing `check` (default: warning).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Fixer configuration.
    #[serde(default)]
    pub fix: FixConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration for a rule, if any.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of files analyzed in parallel (default: one per core).
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/target/**".to_string(), "**/vendor/**".to_string()],
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Fixer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixConfig {
    /// Upper bound on fix-and-recheck passes per file.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,

    /// Indentation unit used when parameters are moved to their own line.
    #[serde(default = "default_indent")]
    pub indent: String,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            indent: default_indent(),
        }
    }
}

fn default_max_passes() -> usize {
    100
}

fn default_indent() -> String {
    DEFAULT_INDENT.to_string()
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.rules.is_empty());
        assert_eq!(config.fix.max_passes, 100);
        assert_eq!(config.fix.indent, "    ");
        assert!(config.fail_on.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
fail_on = "error"

[analyzer]
root = "./src"
exclude = ["**/generated/**"]
parallelism = 2

[fix]
indent = "\t"

[rules.ctor-param-per-line]
enabled = true
severity = "error"
min_params = 4
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.fail_on, Some(Severity::Error));
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert_eq!(config.fix.indent, "\t");
        assert_eq!(config.fix.max_passes, 100);
        assert!(config.is_rule_enabled("ctor-param-per-line"));
        assert_eq!(
            config.rule_severity("ctor-param-per-line"),
            Some(Severity::Error)
        );

        let rule_config = config.rule("ctor-param-per-line").unwrap();
        assert_eq!(rule_config.get_int("min_params", 3), 4);
        assert!(rule_config.get_bool("missing", true));
    }

    #[test]
    fn test_disabled_rule() {
        let config = Config::parse("[rules.ctor-param-per-line]\nenabled = false\n")
            .expect("Failed to parse");
        assert!(!config.is_rule_enabled("ctor-param-per-line"));
        assert!(config.is_rule_enabled("other-rule"));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("fail_on = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
