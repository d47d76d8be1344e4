//! Domain store for qadesk.
//!
//! Owns the canonical collections and keeps them in sync with a
//! `KeyValueStore`, one JSON array per collection:
//! - `qa_test_cases`: test cases, most recently created first
//! - `qa_test_suites`: test suites
//! - `qa_users`: users
//!
//! # Example
//!
//! ```ignore
//! use qadesk::domain::{NewTestCase, NewTestSuite};
//! use qadesk::storage::FileStore;
//! use qadesk::store::DomainStore;
//!
//! let mut store = DomainStore::open(FileStore::new("/tmp/qadesk")?);
//! let suite_id = store.create_test_suite(NewTestSuite::new("Checkout", ""))[0].id.clone();
//! store.create_test_case(NewTestCase::new("TC-1", "Pay by card").in_suite(&suite_id));
//!
//! // Deleting the suite unlinks its cases
//! store.delete_test_suite(&suite_id);
//! ```

mod domain_store;
pub mod migration;
mod queries;
pub mod seed;

pub use domain_store::{Collection, DomainStore, StoreEvent, TEST_CASES_KEY, TEST_SUITES_KEY, USERS_KEY};
pub use queries::{CaseSortKey, SortDirection, UserRef};
