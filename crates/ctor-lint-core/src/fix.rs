//! Applying automatic fixes.
//!
//! Each pass applies every non-overlapping fix found by one check. After the
//! pass the file is parsed and checked again, so a fix is always computed
//! against the current text and never from spans that an earlier edit has
//! moved.

use crate::context::FileContext;
use crate::rule::Rule;
use crate::types::Replacement;

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fixing a file.
#[derive(Debug, Error)]
pub enum FixError {
    /// The file could not be parsed before any fix was applied.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// A fix produced source that no longer parses.
    #[error("Fix for [{code}] broke {path}: {message}")]
    BrokenEdit {
        /// Path to the file being fixed.
        path: PathBuf,
        /// Code of the rule whose fix was applied last.
        code: String,
        /// Parse error message.
        message: String,
    },

    /// A replacement does not fit the text it is applied to.
    #[error("Invalid replacement range {start}..{end} for text length {len}")]
    InvalidRange {
        /// Start of the replaced range.
        start: usize,
        /// End of the replaced range.
        end: usize,
        /// Length of the text.
        len: usize,
    },

    /// Fixes kept producing new violations.
    #[error("No fixed point for {path} after {passes} passes")]
    NoFixedPoint {
        /// Path to the file being fixed.
        path: PathBuf,
        /// Number of passes made.
        passes: usize,
    },
}

/// Applies non-overlapping replacements to `text`.
///
/// Replacements are applied in offset order; one that overlaps an earlier
/// replacement is skipped. Returns the new text and the number applied.
///
/// # Errors
///
/// Returns [`FixError::InvalidRange`] if a replacement lies outside `text`
/// or splits a character.
pub fn apply_replacements(
    text: &str,
    mut replacements: Vec<Replacement>,
) -> Result<(String, usize), FixError> {
    replacements.sort_by_key(|r| (r.location.offset, r.location.length));

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0_usize;
    let mut applied = 0_usize;

    for replacement in &replacements {
        let range = replacement.range();
        if range.start < cursor {
            continue;
        }
        let Some(kept) = text.get(cursor..range.start) else {
            return Err(invalid_range(text, &range));
        };
        if text.get(range.clone()).is_none() {
            return Err(invalid_range(text, &range));
        }

        output.push_str(kept);
        output.push_str(&replacement.new_text);
        cursor = range.end;
        applied += 1;
    }

    output.push_str(&text[cursor..]);
    Ok((output, applied))
}

fn invalid_range(text: &str, range: &std::ops::Range<usize>) -> FixError {
    FixError::InvalidRange {
        start: range.start,
        end: range.end,
        len: text.len(),
    }
}

/// Outcome of fixing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The fixed source text.
    pub source: String,
    /// Number of fixes applied.
    pub applied: usize,
}

impl FixOutcome {
    /// Returns true if any fix was applied.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Repeatedly applies available fixes until none remain.
pub struct Fixer<'a> {
    rules: Vec<&'a dyn Rule>,
    max_passes: usize,
}

impl<'a> Fixer<'a> {
    /// Creates a fixer over the given rules.
    #[must_use]
    pub fn new(rules: Vec<&'a dyn Rule>) -> Self {
        Self {
            rules,
            max_passes: 100,
        }
    }

    /// Sets the maximum number of fix passes.
    #[must_use]
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Fixes `content` of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse, a fix breaks it, or no
    /// fixed point is reached within the configured number of passes.
    pub fn fix(&self, path: &Path, content: &str, root: &Path) -> Result<FixOutcome, FixError> {
        let mut source = content.to_string();
        let mut applied = 0_usize;
        let mut last_code: Option<String> = None;

        for pass in 0..=self.max_passes {
            let ast = syn::parse_file(&source).map_err(|e| match last_code.take() {
                None => FixError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
                Some(code) => FixError::BrokenEdit {
                    path: path.to_path_buf(),
                    code,
                    message: e.to_string(),
                },
            })?;

            let ctx = FileContext::new(path, &source, root);
            let (codes, replacements): (Vec<String>, Vec<Replacement>) =
                self.fixes(&ctx, &ast).into_iter().unzip();
            if replacements.is_empty() {
                return Ok(FixOutcome { source, applied });
            }
            if pass == self.max_passes {
                break;
            }

            let (fixed, count) = apply_replacements(&source, replacements)?;
            debug!(
                "Pass {}: applied {} fix(es) to {}",
                pass + 1,
                count,
                path.display()
            );
            if fixed == source {
                return Err(FixError::NoFixedPoint {
                    path: path.to_path_buf(),
                    passes: pass + 1,
                });
            }

            source = fixed;
            applied += count;
            last_code = codes.into_iter().next();
        }

        Err(FixError::NoFixedPoint {
            path: path.to_path_buf(),
            passes: self.max_passes,
        })
    }

    /// Collects the fixes of all rules in source order.
    fn fixes(&self, ctx: &FileContext, ast: &syn::File) -> Vec<(String, Replacement)> {
        let mut fixes: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(ctx, ast))
            .filter_map(|v| v.fix().cloned().map(|r| (v.code, r)))
            .collect();
        fixes.sort_by_key(|(_, r)| r.location.offset);
        fixes
    }
}

/// A file changed by the fixer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFix {
    /// File path relative to the analyzed root.
    pub file: PathBuf,
    /// Number of fixes applied to the file.
    pub fixes: usize,
}

/// Result of fixing a tree of files.
#[derive(Debug, Default, Serialize)]
pub struct FixReport {
    /// Files that were (or, in a dry run, would be) changed.
    pub files: Vec<FileFix>,
    /// Number of files examined.
    pub files_checked: usize,
}

impl FixReport {
    /// Total number of fixes applied.
    #[must_use]
    pub fn total_fixes(&self) -> usize {
        self.files.iter().map(|f| f.fixes).sum()
    }
}
