//! CSV rendering of a suite's test cases.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::{TestCase, TestStep, TestSuite};
use crate::error::{QaError, Result};
use crate::store::DomainStore;

/// Column order of an exported suite
pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Title",
    "Priority",
    "QA Status",
    "UAT Status",
    "BAT Status",
    "Description",
    "Steps",
];

const STEP_SEPARATOR: &str = "; ";

/// A rendered export ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteExport {
    pub file_name: String,
    pub contents: String,
}

/// Flatten steps into one cell: `1. first; 2. second`
pub fn steps_cell(steps: &[TestStep]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step.action))
        .collect::<Vec<_>>()
        .join(STEP_SEPARATOR)
}

/// Render cases as CSV: header row, every field quoted, `\n` terminated
pub fn cases_to_csv<'a>(cases: impl IntoIterator<Item = &'a TestCase>) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(export_error)?;
    for case in cases {
        writer
            .write_record([
                case.test_case_id.as_str(),
                case.title.as_str(),
                case.priority.as_str(),
                case.qa_status.as_str(),
                case.uat_status.as_str(),
                case.bat_status.as_str(),
                case.description.as_str(),
                steps_cell(&case.steps).as_str(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| QaError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| QaError::Export(e.to_string()))
}

/// `<suite name>_test_cases.csv`, with anything but ASCII letters and digits
/// replaced by `_`
pub fn export_file_name(suite: &TestSuite) -> String {
    let stem: String = suite
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_test_cases.csv", stem)
}

/// Export every case of a suite, in store order
pub fn export_suite(store: &DomainStore, suite_id: &str) -> Result<SuiteExport> {
    let suite = store
        .test_suite(suite_id)
        .ok_or_else(|| QaError::Export(format!("no test suite {}", suite_id)))?;
    let cases = store.cases_in_suite(suite_id);
    log::info!("Exporting {} case(s) of suite {}", cases.len(), suite.name);

    Ok(SuiteExport {
        file_name: export_file_name(suite),
        contents: cases_to_csv(cases)?,
    })
}

fn export_error(e: ::csv::Error) -> QaError {
    QaError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTestCase, NewTestSuite, Priority, TestStatus, TesterRole};
    use crate::storage::MemoryStore;
    use crate::store::TEST_CASES_KEY;

    fn quoted_case() -> NewTestCase {
        NewTestCase::new("TC-1", "A \"quoted\" test")
            .with_priority(Priority::High)
            .with_status(TesterRole::Qa, TestStatus::Pass)
            .with_description("d")
            .with_step("do x", "y")
    }

    #[test]
    fn test_quoted_row() {
        let case = TestCase::create(quoted_case());
        let csv = cases_to_csv([&case]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            r#""ID","Title","Priority","QA Status","UAT Status","BAT Status","Description","Steps""#
        );
        assert_eq!(
            lines[1],
            r#""TC-1","A ""quoted"" test","High","Pass","Untested","Untested","d","1. do x""#
        );
        assert!(csv.ends_with('\n'));
        assert!(!csv.contains('\r'));
    }

    #[test]
    fn test_steps_cell() {
        let steps = vec![TestStep::new("open app", "opened"), TestStep::new("log in", "home")];
        assert_eq!(steps_cell(&steps), "1. open app; 2. log in");
        assert_eq!(steps_cell(&[]), "");
    }

    #[test]
    fn test_export_file_name() {
        let suite = TestSuite::create(NewTestSuite::new("Checkout / Payments v2", ""));
        assert_eq!(export_file_name(&suite), "Checkout___Payments_v2_test_cases.csv");
    }

    #[test]
    fn test_export_suite_only_includes_its_cases() {
        let mut store = DomainStore::open(MemoryStore::new().with_entry(TEST_CASES_KEY, "[]"));
        let sid = store.create_test_suite(NewTestSuite::new("Cart", ""))[0].id.clone();
        store.create_test_case(quoted_case().in_suite(&sid));
        store.create_test_case(NewTestCase::new("TC-2", "elsewhere"));

        let export = export_suite(&store, &sid).unwrap();
        assert_eq!(export.file_name, "Cart_test_cases.csv");
        assert_eq!(export.contents.lines().count(), 2);
        assert!(!export.contents.contains("TC-2"));
    }

    #[test]
    fn test_export_unknown_suite() {
        let store = DomainStore::open(MemoryStore::new());
        assert!(matches!(export_suite(&store, "nope"), Err(QaError::Export(_))));
    }
}
