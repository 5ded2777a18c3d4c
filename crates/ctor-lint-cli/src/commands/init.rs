//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "ctor-lint.toml";

const DEFAULT_CONFIG: &str = r#"# ctor-lint configuration

# Lowest severity that makes `ctor-lint check` fail
# fail_on = "warning"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/vendor/**",
]

# Number of files analyzed in parallel (default: one per core)
# parallelism = 4

[fix]
# Upper bound on fix passes per file
max_passes = 100
# Indentation added in front of parameters moved to their own line
indent = "    "

[rules.ctor-param-per-line]
enabled = true
# severity = "error"  # Override default severity
min_params = 3
autofix = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: ctor-lint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<std::path::PathBuf> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}
