//! Status roll-ups for dashboards and suite listings.

use crate::domain::status::{TestStatus, TesterRole};
use crate::domain::test_case::TestCase;

/// Counts of each status for one tester role over a set of cases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub blocked: usize,
    pub untested: usize,
    pub skipped: usize,
}

impl StatusSummary {
    pub fn for_role<'a>(role: TesterRole, cases: impl IntoIterator<Item = &'a TestCase>) -> Self {
        let mut summary = Self::default();
        for case in cases {
            summary.total += 1;
            match case.status_for(role) {
                TestStatus::Pass => summary.passed += 1,
                TestStatus::Fail => summary.failed += 1,
                TestStatus::Blocked => summary.blocked += 1,
                TestStatus::Untested => summary.untested += 1,
                TestStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Percentage of passed cases, rounded to the nearest integer (0 when empty)
    pub fn pass_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.passed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::NewTestCase;

    fn case_with(qa: TestStatus, uat: TestStatus) -> TestCase {
        TestCase::create(
            NewTestCase::new("TC", "t")
                .with_status(TesterRole::Qa, qa)
                .with_status(TesterRole::Uat, uat),
        )
    }

    #[test]
    fn test_counts_per_role() {
        let cases = vec![
            case_with(TestStatus::Pass, TestStatus::Fail),
            case_with(TestStatus::Pass, TestStatus::Untested),
            case_with(TestStatus::Blocked, TestStatus::Skipped),
        ];

        let qa = StatusSummary::for_role(TesterRole::Qa, &cases);
        assert_eq!(qa.total, 3);
        assert_eq!(qa.passed, 2);
        assert_eq!(qa.blocked, 1);
        assert_eq!(qa.pass_rate(), 67);

        let uat = StatusSummary::for_role(TesterRole::Uat, &cases);
        assert_eq!(uat.failed, 1);
        assert_eq!(uat.untested, 1);
        assert_eq!(uat.skipped, 1);
        assert_eq!(uat.pass_rate(), 0);
    }

    #[test]
    fn test_empty_pass_rate() {
        let summary = StatusSummary::for_role(TesterRole::Bat, &[]);
        assert_eq!(summary, StatusSummary::default());
        assert_eq!(summary.pass_rate(), 0);
    }
}
