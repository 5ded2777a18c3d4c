//! Integration test: checking and fixing a project on disk via Analyzer.

use ctor_lint_core::{Analyzer, Config, Severity};
use ctor_lint_rules::configured_rules;
use std::path::Path;

const MODEL: &str = "pub struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }
}
";

const FIXED_MODEL: &str = "pub struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    pub fn new(r: u8,
        g: u8,
        b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }
}
";

const SHAPES: &str = "pub struct Rect;
pub struct Circle;

impl Rect {
    pub fn new(x: f32, y: f32, w: f32,
        h: f32) -> Self {
        Rect
    }
}

impl Circle {
    pub fn try_new(x: f32, y: f32, r: f32) -> Result<Circle, String> {
        Ok(Circle)
    }
}
";

const CLEAN: &str = "pub struct Point;

impl Point {
    pub fn new(
        x: i32,
        y: i32,
        z: i32,
    ) -> Self {
        Point
    }
}
";

fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("dirs should be created");
        std::fs::write(path, content).expect("fixture should be written");
    }
    dir
}

fn analyzer(root: &Path, config: Config) -> Analyzer {
    let mut builder = Analyzer::builder().root(root);
    for rule in configured_rules(&config) {
        builder = builder.rule_box(rule);
    }
    builder
        .config(config)
        .build()
        .expect("analyzer should build")
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).expect("file should be readable")
}

#[test]
fn check_reports_one_violation_per_constructor() {
    let dir = project(&[
        ("src/model.rs", MODEL),
        ("src/shapes.rs", SHAPES),
        ("src/point.rs", CLEAN),
    ]);

    let result = analyzer(dir.path(), Config::default())
        .analyze()
        .expect("analysis should succeed");

    assert_eq!(result.files_checked, 3);
    assert_eq!(result.violations.len(), 3);
    assert_eq!(result.fixable_count(), 3);
    assert!(result.has_warnings());
    assert!(!result.has_errors());

    let locations: Vec<(String, usize)> = result
        .violations
        .iter()
        .map(|v| (v.location.file.display().to_string(), v.location.line))
        .collect();
    assert_eq!(
        locations,
        vec![
            ("src/model.rs".to_string(), 8),
            ("src/shapes.rs".to_string(), 5),
            ("src/shapes.rs".to_string(), 12),
        ]
    );
}

#[test]
fn fix_rewrites_files_until_clean() {
    let dir = project(&[
        ("src/model.rs", MODEL),
        ("src/shapes.rs", SHAPES),
        ("src/point.rs", CLEAN),
    ]);
    let analyzer = analyzer(dir.path(), Config::default());

    let report = analyzer.fix(true).expect("fix should succeed");
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.total_fixes(), 3);

    assert_eq!(read(dir.path(), "src/model.rs"), FIXED_MODEL);
    assert_eq!(read(dir.path(), "src/point.rs"), CLEAN);

    let result = analyzer.analyze().expect("analysis should succeed");
    assert!(result.violations.is_empty(), "{:#?}", result.violations);
}

#[test]
fn fix_dry_run_leaves_files_alone() {
    let dir = project(&[("src/model.rs", MODEL)]);

    let report = analyzer(dir.path(), Config::default())
        .fix(false)
        .expect("fix should succeed");

    assert_eq!(report.total_fixes(), 1);
    assert_eq!(read(dir.path(), "src/model.rs"), MODEL);
}

#[test]
fn config_controls_rule() {
    let dir = project(&[("src/model.rs", MODEL), ("src/shapes.rs", SHAPES)]);

    let config = Config::parse(
        r#"
[fix]
indent = "  "

[rules.ctor-param-per-line]
severity = "error"
min_params = 4
"#,
    )
    .expect("config should parse");
    let result = analyzer(dir.path(), config.clone())
        .analyze()
        .expect("analysis should succeed");

    // only Rect::new has four parameters
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].severity, Severity::Error);

    analyzer(dir.path(), config).fix(true).expect("fix should succeed");
    assert!(read(dir.path(), "src/shapes.rs")
        .contains("pub fn new(x: f32,\n      y: f32,\n      w: f32,\n        h: f32) -> Self {"));
    assert_eq!(read(dir.path(), "src/model.rs"), MODEL);
}

#[test]
fn disabled_rule_reports_nothing() {
    let dir = project(&[("src/model.rs", MODEL)]);
    let config = Config::parse("[rules.ctor-param-per-line]\nenabled = false\n")
        .expect("config should parse");

    let result = analyzer(dir.path(), config)
        .analyze()
        .expect("analysis should succeed");
    assert!(result.violations.is_empty());
}
