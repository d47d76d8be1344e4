//! Domain types for qadesk
//!
//! This module contains all core domain types:
//! - TestCase / TestStep: a verifiable scenario and its ordered steps
//! - TestSuite: a named grouping of cases
//! - User: a team member that can own suites and execute cases
//! - Status enums: per-role verdicts, priorities, tester and user roles
//! - StatusSummary: per-role roll-ups for dashboards

pub mod status;
pub mod summary;
pub mod test_case;
pub mod test_suite;
pub mod user;

pub use status::{Priority, TestStatus, TesterRole, UserRole};
pub use summary::StatusSummary;
pub use test_case::{COPY_ID_SUFFIX, COPY_TITLE_SUFFIX, NewTestCase, TestCase, TestCasePatch, TestStep};
pub use test_suite::{NewTestSuite, TestSuite, TestSuitePatch};
pub use user::{NewUser, User, UserPatch};
