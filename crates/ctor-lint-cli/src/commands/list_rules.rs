//! List rules command implementation.

use ctor_lint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<22} {:<9} Description", "Code", "Name", "Fixable");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<8} {:<22} {:<9} {}",
            rule.code(),
            rule.name(),
            if rule.fixable() { "yes" } else { "no" },
            rule.description()
        );
    }

    println!("\nUse --rules to run specific rules, e.g.:");
    println!("  ctor-lint check --rules ctor-param-per-line");
    println!("  ctor-lint fix --rules CL001");
}
