//! Read-only views over the store.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::{Priority, StatusSummary, TestCase, TestSuite, TesterRole, User};
use crate::error::QaError;
use crate::link::suite_id_from_locator;
use crate::store::DomainStore;

/// Resolution of a weak user reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRef<'a> {
    /// No reference set
    Unassigned,
    Known(&'a User),
    /// Reference to a user that no longer exists
    Unknown(&'a str),
}

impl UserRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            UserRef::Unassigned => "Unassigned",
            UserRef::Known(user) => &user.name,
            UserRef::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for UserRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns a case list can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSortKey {
    #[default]
    TestCaseId,
    Title,
    Priority,
    QaStatus,
    UatStatus,
    BatStatus,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for CaseSortKey {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "id" | "testcaseid" => Ok(CaseSortKey::TestCaseId),
            "title" => Ok(CaseSortKey::Title),
            "priority" => Ok(CaseSortKey::Priority),
            "qa" | "qastatus" => Ok(CaseSortKey::QaStatus),
            "uat" | "uatstatus" => Ok(CaseSortKey::UatStatus),
            "bat" | "batstatus" => Ok(CaseSortKey::BatStatus),
            "created" | "createdat" => Ok(CaseSortKey::CreatedAt),
            "updated" | "updatedat" => Ok(CaseSortKey::UpdatedAt),
            _ => Err(QaError::InvalidState(format!("unknown sort key: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

fn priority_rank(priority: Priority) -> u8 {
    match priority {
        Priority::High => 0,
        Priority::Medium => 1,
        Priority::Low => 2,
    }
}

fn compare_cases(a: &TestCase, b: &TestCase, key: CaseSortKey) -> Ordering {
    match key {
        CaseSortKey::TestCaseId => a.test_case_id.cmp(&b.test_case_id),
        CaseSortKey::Title => a.title.cmp(&b.title),
        CaseSortKey::Priority => priority_rank(a.priority).cmp(&priority_rank(b.priority)),
        CaseSortKey::QaStatus => a.qa_status.as_str().cmp(b.qa_status.as_str()),
        CaseSortKey::UatStatus => a.uat_status.as_str().cmp(b.uat_status.as_str()),
        CaseSortKey::BatStatus => a.bat_status.as_str().cmp(b.bat_status.as_str()),
        CaseSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        CaseSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

impl DomainStore {
    /// Cases attached to a suite, in store order
    pub fn cases_in_suite(&self, suite_id: &str) -> Vec<&TestCase> {
        self.test_cases()
            .iter()
            .filter(|c| c.test_suite_id.as_deref() == Some(suite_id))
            .collect()
    }

    pub fn suite_case_count(&self, suite_id: &str) -> usize {
        self.test_cases()
            .iter()
            .filter(|c| c.test_suite_id.as_deref() == Some(suite_id))
            .count()
    }

    /// Suites offered for execution
    pub fn visible_suites(&self) -> Vec<&TestSuite> {
        self.test_suites().iter().filter(|s| !s.is_hidden).collect()
    }

    /// Cases belonging to any of the selected suites
    pub fn active_cases(&self, suite_ids: &[String]) -> Vec<&TestCase> {
        self.test_cases()
            .iter()
            .filter(|c| {
                c.test_suite_id
                    .as_ref()
                    .is_some_and(|sid| suite_ids.iter().any(|s| s == sid))
            })
            .collect()
    }

    pub fn resolve_user<'a>(&'a self, user_id: Option<&'a str>) -> UserRef<'a> {
        match user_id {
            None => UserRef::Unassigned,
            Some(id) => self.user(id).map(UserRef::Known).unwrap_or(UserRef::Unknown(id)),
        }
    }

    pub fn suite_owner<'a>(&'a self, suite: &'a TestSuite) -> UserRef<'a> {
        self.resolve_user(suite.owner_id.as_deref())
    }

    pub fn case_executor<'a>(&'a self, case: &'a TestCase) -> UserRef<'a> {
        self.resolve_user(case.executor_id.as_deref())
    }

    /// Counts for `role` over the given cases, or all cases when `None`
    pub fn status_summary(&self, role: TesterRole, cases: Option<&[&TestCase]>) -> StatusSummary {
        match cases {
            Some(cases) => StatusSummary::for_role(role, cases.iter().copied()),
            None => StatusSummary::for_role(role, self.test_cases()),
        }
    }

    /// All cases sorted on one column. Ties keep store order.
    pub fn sorted_cases(&self, key: CaseSortKey, direction: SortDirection) -> Vec<&TestCase> {
        let mut cases: Vec<&TestCase> = self.test_cases().iter().collect();
        cases.sort_by(|a, b| {
            let ordering = compare_cases(a, b, key);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        cases
    }

    /// Suite addressed by a deep link, if it still exists
    pub fn resolve_deep_link(&self, locator: &str) -> Option<&TestSuite> {
        let suite_id = suite_id_from_locator(locator)?;
        let suite = self.test_suite(&suite_id);
        if suite.is_none() {
            log::debug!("Deep link names unknown suite {}", suite_id);
        }
        suite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTestCase, NewTestSuite, NewUser, TestStatus};
    use crate::storage::MemoryStore;
    use crate::store::TEST_CASES_KEY;

    fn create_test_store() -> DomainStore {
        DomainStore::open(MemoryStore::new().with_entry(TEST_CASES_KEY, "[]"))
    }

    #[test]
    fn test_cases_in_suite_and_count() {
        let mut store = create_test_store();
        let sid = store.create_test_suite(NewTestSuite::new("S", ""))[0].id.clone();
        store.create_test_case(NewTestCase::new("A", "a").in_suite(&sid));
        store.create_test_case(NewTestCase::new("B", "b"));
        store.create_test_case(NewTestCase::new("C", "c").in_suite(&sid));

        let ids: Vec<&str> = store
            .cases_in_suite(&sid)
            .iter()
            .map(|c| c.test_case_id.as_str())
            .collect();
        assert_eq!(ids, vec!["C", "A"]);
        assert_eq!(store.suite_case_count(&sid), 2);
        assert_eq!(store.suite_case_count("other"), 0);
    }

    #[test]
    fn test_visible_suites_and_active_cases() {
        let mut store = create_test_store();
        let shown = store.create_test_suite(NewTestSuite::new("shown", ""))[0].id.clone();
        let hidden = store.create_test_suite(NewTestSuite::new("hidden", ""))[0].id.clone();
        store.toggle_test_suite_visibility(&hidden);
        store.create_test_case(NewTestCase::new("A", "a").in_suite(&shown));
        store.create_test_case(NewTestCase::new("B", "b").in_suite(&hidden));
        store.create_test_case(NewTestCase::new("C", "c"));

        let visible: Vec<&str> = store.visible_suites().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(visible, vec!["shown"]);

        let active = store.active_cases(&[shown.clone()]);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].test_case_id, "A");
        assert_eq!(store.active_cases(&[shown, hidden]).len(), 2);
        assert!(store.active_cases(&[]).is_empty());
    }

    #[test]
    fn test_resolve_user_references() {
        let mut store = create_test_store();
        let uid = store.create_user(NewUser::new("Ada", "ada@example.com"))[0].id.clone();
        let owned = store.create_test_suite(NewTestSuite::new("owned", "").owned_by(&uid))[0].clone();
        let orphaned = store.create_test_suite(NewTestSuite::new("orphaned", "").owned_by("gone"))[0].clone();
        let unowned = store.create_test_suite(NewTestSuite::new("unowned", ""))[0].clone();

        assert_eq!(store.suite_owner(&owned).name(), "Ada");
        assert_eq!(store.suite_owner(&orphaned), UserRef::Unknown("gone"));
        assert_eq!(store.suite_owner(&orphaned).to_string(), "Unknown");
        assert_eq!(store.suite_owner(&unowned), UserRef::Unassigned);
    }

    #[test]
    fn test_status_summary() {
        let mut store = create_test_store();
        store.create_test_case(NewTestCase::new("A", "a").with_status(TesterRole::Qa, TestStatus::Pass));
        store.create_test_case(NewTestCase::new("B", "b").with_status(TesterRole::Qa, TestStatus::Fail));
        store.create_test_case(NewTestCase::new("C", "c").with_status(TesterRole::Uat, TestStatus::Pass));

        let qa = store.status_summary(TesterRole::Qa, None);
        assert_eq!(qa.total, 3);
        assert_eq!(qa.passed, 1);
        assert_eq!(qa.failed, 1);
        assert_eq!(qa.untested, 1);
        assert_eq!(qa.pass_rate(), 33);

        let first: Vec<&TestCase> = store.test_cases().iter().take(1).collect();
        let uat = store.status_summary(TesterRole::Uat, Some(&first));
        assert_eq!(uat.total, 1);
        assert_eq!(uat.passed, 1);
    }

    #[test]
    fn test_sorted_cases() {
        let mut store = create_test_store();
        store.create_test_case(NewTestCase::new("TC-2", "b").with_priority(Priority::Low));
        store.create_test_case(NewTestCase::new("TC-1", "c").with_priority(Priority::High));
        store.create_test_case(NewTestCase::new("TC-3", "a").with_priority(Priority::Medium));

        let ids = |cases: Vec<&TestCase>| cases.iter().map(|c| c.test_case_id.clone()).collect::<Vec<_>>();
        assert_eq!(
            ids(store.sorted_cases(CaseSortKey::TestCaseId, SortDirection::Ascending)),
            vec!["TC-1", "TC-2", "TC-3"]
        );
        assert_eq!(
            ids(store.sorted_cases(CaseSortKey::Title, SortDirection::Descending)),
            vec!["TC-1", "TC-2", "TC-3"]
        );
        assert_eq!(
            ids(store.sorted_cases(CaseSortKey::Priority, SortDirection::Ascending)),
            vec!["TC-1", "TC-3", "TC-2"]
        );
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("qa-status".parse::<CaseSortKey>().unwrap(), CaseSortKey::QaStatus);
        assert_eq!("testCaseId".parse::<CaseSortKey>().unwrap(), CaseSortKey::TestCaseId);
        assert!("nope".parse::<CaseSortKey>().is_err());
    }

    #[test]
    fn test_resolve_deep_link() {
        let mut store = create_test_store();
        let sid = store.create_test_suite(NewTestSuite::new("Checkout", ""))[0].id.clone();

        let locator = format!("https://qa.example.com/?suiteId={}", sid);
        assert_eq!(store.resolve_deep_link(&locator).map(|s| s.name.as_str()), Some("Checkout"));
        assert!(store.resolve_deep_link("https://qa.example.com/?suiteId=missing").is_none());
        assert!(store.resolve_deep_link("https://qa.example.com/").is_none());
    }
}
