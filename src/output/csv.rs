//! CSV output of subnet usage.

use super::terminal::sorted_usage;
use crate::processing::PassOutput;

pub const CSV_HEADER: &str = "vdom,subnet_name,subnet,users";

/// Quote a field when it holds a comma or a double quote.
pub fn escape_csv_field(input: &str) -> String {
    if input.contains(',') || input.contains('"') {
        format!("\"{}\"", input.replace('"', "\"\""))
    } else {
        input.to_string()
    }
}

/// Header plus one line per subnet, sorted by vdom and name.
pub fn usage_csv_rows(output: &PassOutput) -> Vec<String> {
    std::iter::once(CSV_HEADER.to_string())
        .chain(sorted_usage(output).iter().map(|u| {
            format!(
                "{},{},{},{}",
                escape_csv_field(&u.domain),
                escape_csv_field(&u.subnet_name),
                u.subnet,
                u.count
            )
        }))
        .collect()
}

/// Print subnet usage as CSV to stdout.
pub fn print_csv(output: &PassOutput) {
    log::debug!("#Start print_csv() rows={}", output.usage.len());
    for row in usage_csv_rows(output) {
        println!("{row}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fortigate::read_snapshot;
    use crate::processing::aggregate_pass;

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("lan"), "lan");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_usage_csv_rows_sorted() {
        let snapshot = read_snapshot("src/tests/test_data/snapshot_01.json").unwrap();
        let rows = usage_csv_rows(&aggregate_pass(&snapshot));
        assert_eq!(rows[0], CSV_HEADER);
        assert_eq!(
            rows[1..],
            [
                "guest,lan,10.0.0.0/24,1",
                "guest,wifi,172.16.0.0/16,1",
                "root,all,0.0.0.0/0,1",
                "root,corp,10.0.0.0/8,1",
                "root,lan,10.0.0.0/24,1",
                "root,voice,10.0.1.0/24,1",
                "root,voice-dup,10.0.1.0/24,1",
            ]
        );
    }
}
