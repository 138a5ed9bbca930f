//! Terminal output of subnet usage.

use crate::processing::{PassOutput, SubnetUsage};
use colored::Colorize;
use itertools::Itertools;

/// Usage records sorted by vdom, then subnet name.
pub fn sorted_usage(output: &PassOutput) -> Vec<SubnetUsage> {
    output
        .usage
        .usage()
        .into_iter()
        .sorted_by(|a, b| {
            a.domain
                .cmp(&b.domain)
                .then_with(|| a.subnet_name.cmp(&b.subnet_name))
        })
        .collect()
}

/// One fixed-width table row, without colour.
pub fn format_row(usage: &SubnetUsage) -> String {
    format!(
        "{vdom:<12} {name:<28} {subnet:<18} {broadcast:<16} {count:>6}",
        vdom = usage.domain,
        name = usage.subnet_name,
        subnet = usage.subnet.to_string(),
        broadcast = usage.subnet.hi().to_string(),
        count = usage.count,
    )
}

/// Print the usage table to stdout.
pub fn print_table(output: &PassOutput) {
    let rows = sorted_usage(output);
    println!(
        "{}",
        format!(
            "{:<12} {:<28} {:<18} {:<16} {:>6}",
            "vdom", "subnet_name", "subnet", "broadcast", "users"
        )
        .as_str()
        .bold()
    );
    for usage in &rows {
        println!("{}", format_row(usage));
    }
    println!(
        "# {} subnet(s) in use of {} indexed, {} session(s), {} skipped, {} unmatched",
        rows.len().to_string().as_str().green(),
        output.indexed_subnets,
        output.sessions.len(),
        output.usage.skipped_sessions.to_string().as_str().yellow(),
        output.usage.unmatched_sessions,
    );
}
