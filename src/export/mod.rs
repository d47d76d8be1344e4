//! Suite export formats.

mod csv;

pub use self::csv::{CSV_HEADER, SuiteExport, cases_to_csv, export_file_name, export_suite, steps_cell};
