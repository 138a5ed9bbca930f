//! Output of subnet usage.
//!
//! This module handles publishing and printing the result of a pass:
//! - [`prometheus`] - Prometheus gauges
//! - [`csv`] - CSV output
//! - [`terminal`] - Terminal table with colors

mod csv;
pub mod prometheus;
mod terminal;

pub use csv::{escape_csv_field, print_csv, usage_csv_rows, CSV_HEADER};
pub use terminal::{format_row, print_table, sorted_usage};
