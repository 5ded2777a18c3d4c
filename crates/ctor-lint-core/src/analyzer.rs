//! Core analyzer for orchestrating lint execution.

use crate::config::Config;
use crate::context::FileContext;
use crate::fix::{FileFix, FixError, FixReport, Fixer};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing Rust source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Analysis was cancelled through a [`CancellationToken`].
    #[error("Analysis cancelled")]
    Cancelled,

    /// Applying fixes failed.
    #[error(transparent)]
    Fix(#[from] FixError),
}

/// Cooperative cancellation flag shared between a caller and an analyzer.
///
/// The analyzer checks the token before each file.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    parallelism: Option<usize>,
    cancellation: Option<CancellationToken>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Limits the number of files analyzed in parallel.
    ///
    /// Overrides `analyzer.parallelism` from the configuration.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Sets the token used to cancel a running analysis.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude_patterns,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
            config,
            cancellation: self.cancellation.unwrap_or_default(),
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    parallelism: Option<usize>,
    config: Config,
    cancellation: CancellationToken,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the token that cancels this analyzer.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, the analysis is cancelled,
    /// or a file fails to parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let outcomes: Vec<_> = self.in_pool(|| {
            files
                .par_iter()
                .map(|path| self.analyze_file(path))
                .collect()
        })?;

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                Ok(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                Err(e) => self.tolerate_parse_error(e)?,
            }
        }

        result.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes in-memory source, e.g. read from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse.
    pub fn analyze_source(
        &self,
        name: &Path,
        content: &str,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        let ast = parse(name, content)?;
        let ctx = FileContext::for_source(name, content);
        Ok(self.run_rules(&ctx, &ast))
    }

    /// Applies every available fix to the analyzed files.
    ///
    /// Files are only written when `write` is true; otherwise the report
    /// lists what would change. Nothing is written unless every file was
    /// fixed successfully.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, the run is cancelled, a file
    /// cannot be written, or a fix does not converge.
    pub fn fix(&self, write: bool) -> Result<FixReport, AnalyzerError> {
        info!("Fixing files at {:?}", self.root);

        let rules: Vec<&dyn Rule> = self
            .enabled_rules()
            .filter(|rule| rule.fixable())
            .collect();
        let fixer = Fixer::new(rules).max_passes(self.config.fix.max_passes);
        let files = self.discover_files()?;

        let outcomes: Vec<_> = self.in_pool(|| {
            files
                .par_iter()
                .map(|path| self.fix_file(&fixer, path))
                .collect()
        })?;

        let mut report = FixReport::default();
        let mut fixed_files = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(fixed) => {
                    report.files_checked += 1;
                    fixed_files.extend(fixed);
                }
                Err(e) => self.tolerate_parse_error(e)?,
            }
        }

        for fixed in fixed_files {
            if write {
                debug!("Writing: {}", fixed.path.display());
                std::fs::write(&fixed.path, &fixed.source)?;
            }
            report.files.push(fixed.summary);
        }
        report.files.sort_by(|a, b| a.file.cmp(&b.file));

        info!(
            "Fix complete: {} fixes in {} files",
            report.total_fixes(),
            report.files.len()
        );

        Ok(report)
    }

    fn fix_file(
        &self,
        fixer: &Fixer<'_>,
        path: &Path,
    ) -> Result<Option<FixedFile>, AnalyzerError> {
        self.ensure_not_cancelled()?;
        debug!("Fixing: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let outcome = fixer
            .fix(path, &content, &self.root)
            .map_err(|e| match e {
                FixError::Parse { path, message } => AnalyzerError::Parse { path, message },
                other => AnalyzerError::Fix(other),
            })?;

        if !outcome.changed() {
            return Ok(None);
        }

        let summary = FileFix {
            file: FileContext::new(path, &content, &self.root).relative_path,
            fixes: outcome.applied,
        };
        Ok(Some(FixedFile {
            path: path.to_path_buf(),
            source: outcome.source,
            summary,
        }))
    }

    /// Analyzes a single file and returns violations.
    fn analyze_file(&self, path: &Path) -> Result<Vec<Violation>, AnalyzerError> {
        self.ensure_not_cancelled()?;
        debug!("Analyzing: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let ast = parse(path, &content)?;
        let ctx = FileContext::new(path, &content, &self.root);

        Ok(self.run_rules(&ctx, &ast))
    }

    fn run_rules(&self, ctx: &FileContext<'_>, ast: &syn::File) -> Vec<Violation> {
        self.enabled_rules()
            .flat_map(|rule| {
                let violations = rule.check(ctx, ast);
                self.apply_severity_override(rule.name(), violations)
            })
            .collect()
    }

    fn enabled_rules(&self) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .map(|rule| &**rule as &dyn Rule)
    }

    /// Logs and swallows parse errors unless `fail_on_parse_error` is set.
    fn tolerate_parse_error(&self, error: AnalyzerError) -> Result<(), AnalyzerError> {
        match error {
            AnalyzerError::Parse { path, message } if !self.fail_on_parse_error => {
                warn!("Failed to parse {}: {}", path.display(), message);
                Ok(())
            }
            other => Err(other),
        }
    }

    fn ensure_not_cancelled(&self) -> Result<(), AnalyzerError> {
        if self.cancellation.is_cancelled() {
            Err(AnalyzerError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs `op` on a dedicated pool when parallelism is limited.
    fn in_pool<T, F>(&self, op: F) -> Result<T, AnalyzerError>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.parallelism {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all Rust source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let pattern = format!("{}/**/*.rs", self.root.display());
        let mut files = Vec::new();

        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| AnalyzerError::Io(e.into_error()))?;

            if self.should_exclude(&path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path);
        }

        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.exclude_patterns.iter().any(|pattern| {
            if glob::Pattern::new(pattern).is_ok_and(|p| p.matches(&path_str)) {
                return true;
            }

            // "**/target/**" also matches as the substring "/target/"
            let fragment = pattern.replace("**", "");
            !fragment.is_empty() && fragment != "/" && path_str.contains(&fragment)
        })
    }
}

/// Fixed source of one file, not yet written.
struct FixedFile {
    path: PathBuf,
    source: String,
    summary: FileFix,
}

fn parse(path: &Path, content: &str) -> Result<syn::File, AnalyzerError> {
    syn::parse_file(content).map_err(|e| AnalyzerError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
