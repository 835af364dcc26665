//! CLI smoke entry point.
//!
//! Prints the core version and the project lifecycle with the roles allowed
//! to advance each step.

use rbsuite_core::{core_version, lifecycle_chain, rule_for};

fn main() {
    println!("rbsuite_core version={}", core_version());

    for status in lifecycle_chain() {
        let rule = rule_for(*status);
        let roles = rule
            .roles
            .iter()
            .map(|role| role.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let requirements = rule
            .requirements
            .iter()
            .map(|requirement| requirement.as_str())
            .collect::<Vec<_>>()
            .join(",");
        match rule.next.first() {
            Some(next) => println!("{status} -> {next} roles=[{roles}] requires=[{requirements}]"),
            None => println!("{status} (terminal)"),
        }
    }
}
