//! DomainStore: the canonical test cases, test suites and users.
//!
//! Every mutation updates the in-memory collection, writes the affected
//! collection(s) back to the `KeyValueStore` and broadcasts a `StoreEvent`.
//! Writes are fire-and-forget: a failed write is logged and the in-memory
//! state stays authoritative.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::domain::{
    NewTestCase, NewTestSuite, NewUser, TestCase, TestCasePatch, TestStatus, TestSuite, TestSuitePatch, TesterRole,
    User, UserPatch,
};
use crate::execution::ExecutionCommit;
use crate::id::touch;
use crate::storage::KeyValueStore;
use crate::store::migration::upgrade_test_cases;
use crate::store::seed::seed_test_cases;

/// Storage key holding the JSON array of test cases
pub const TEST_CASES_KEY: &str = "qa_test_cases";
/// Storage key holding the JSON array of test suites
pub const TEST_SUITES_KEY: &str = "qa_test_suites";
/// Storage key holding the JSON array of users
pub const USERS_KEY: &str = "qa_users";

const EVENT_CAPACITY: usize = 256;

/// The three persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    TestCases,
    TestSuites,
    Users,
}

impl Collection {
    pub fn key(&self) -> &'static str {
        match self {
            Collection::TestCases => TEST_CASES_KEY,
            Collection::TestSuites => TEST_SUITES_KEY,
            Collection::Users => USERS_KEY,
        }
    }
}

/// Change notifications, published after the change is visible in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TestCaseCreated { id: String },
    TestCaseUpdated { id: String },
    TestCaseDeleted { id: String },
    TestCaseCopied { source_id: String, id: String },
    ExecutionRecorded { id: String, role: TesterRole, status: TestStatus },
    TestSuiteCreated { id: String },
    TestSuiteUpdated { id: String },
    /// `unlinked_cases` lists the cases whose suite reference was cleared
    TestSuiteDeleted { id: String, unlinked_cases: Vec<String> },
    UserCreated { id: String },
    UserUpdated { id: String },
    UserDeleted { id: String },
}

/// Result of reading one collection from the backend
enum Restored<T> {
    Loaded { items: Vec<T>, upgraded: usize },
    Missing,
    Corrupt,
    Unavailable,
}

pub struct DomainStore {
    backend: Box<dyn KeyValueStore>,

    test_cases: Vec<TestCase>,
    test_suites: Vec<TestSuite>,
    users: Vec<User>,

    events: broadcast::Sender<StoreEvent>,
}

impl DomainStore {
    /// Restore all collections from `backend`.
    ///
    /// Missing or unparseable test cases fall back to the seed; suites and
    /// users fall back to empty. Legacy single-status cases are upgraded.
    pub fn open(backend: impl KeyValueStore + 'static) -> Self {
        let backend: Box<dyn KeyValueStore> = Box::new(backend);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mut rewrite = Vec::new();

        let test_cases = match restore::<TestCase>(backend.as_ref(), TEST_CASES_KEY, upgrade_test_cases) {
            Restored::Loaded { items, upgraded } => {
                if upgraded > 0 {
                    log::info!("Upgraded {} legacy test case record(s)", upgraded);
                    rewrite.push(Collection::TestCases);
                }
                items
            }
            Restored::Missing | Restored::Corrupt => {
                rewrite.push(Collection::TestCases);
                seed_test_cases()
            }
            Restored::Unavailable => seed_test_cases(),
        };

        let test_suites = match restore::<TestSuite>(backend.as_ref(), TEST_SUITES_KEY, |_| 0) {
            Restored::Loaded { items, .. } => items,
            _ => Vec::new(),
        };

        let users = match restore::<User>(backend.as_ref(), USERS_KEY, |_| 0) {
            Restored::Loaded { items, .. } => items,
            _ => Vec::new(),
        };

        log::info!(
            "Opened store: {} test case(s), {} suite(s), {} user(s)",
            test_cases.len(),
            test_suites.len(),
            users.len()
        );

        let store = Self {
            backend,
            test_cases,
            test_suites,
            users,
            events,
        };
        for collection in rewrite {
            store.persist(collection);
        }
        store
    }

    /// Get a receiver for store events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn broadcast(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn persist(&self, collection: Collection) {
        let serialized = match collection {
            Collection::TestCases => serialize(&self.test_cases),
            Collection::TestSuites => serialize(&self.test_suites),
            Collection::Users => serialize(&self.users),
        };

        let result = serialized.and_then(|json| self.backend.set(collection.key(), &json));
        if let Err(e) = result {
            log::error!("Failed to persist {}: {}", collection.key(), e);
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Test cases, most recently created first
    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn test_suites(&self) -> &[TestSuite] {
        &self.test_suites
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn test_case(&self, id: &str) -> Option<&TestCase> {
        self.test_cases.iter().find(|c| c.id == id)
    }

    pub fn test_suite(&self, id: &str) -> Option<&TestSuite> {
        self.test_suites.iter().find(|s| s.id == id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    // ---------------------------------------------------------------------
    // Test cases
    // ---------------------------------------------------------------------

    pub fn create_test_case(&mut self, fields: NewTestCase) -> &[TestCase] {
        let case = TestCase::create(fields);
        let id = case.id.clone();
        log::debug!("Creating test case {} ({})", case.test_case_id, id);

        self.test_cases.insert(0, case);
        self.persist(Collection::TestCases);
        self.broadcast(StoreEvent::TestCaseCreated { id });
        &self.test_cases
    }

    pub fn update_test_case(&mut self, id: &str, patch: TestCasePatch) -> &[TestCase] {
        let Some(case) = self.test_cases.iter_mut().find(|c| c.id == id) else {
            log::debug!("update_test_case: no test case {}", id);
            return &self.test_cases;
        };

        patch.apply_to(case);
        case.updated_at = touch(case.updated_at);

        self.persist(Collection::TestCases);
        self.broadcast(StoreEvent::TestCaseUpdated { id: id.to_string() });
        &self.test_cases
    }

    pub fn delete_test_case(&mut self, id: &str) -> &[TestCase] {
        let before = self.test_cases.len();
        self.test_cases.retain(|c| c.id != id);
        if self.test_cases.len() == before {
            log::debug!("delete_test_case: no test case {}", id);
            return &self.test_cases;
        }

        self.persist(Collection::TestCases);
        self.broadcast(StoreEvent::TestCaseDeleted { id: id.to_string() });
        &self.test_cases
    }

    /// Duplicate a case and insert the copy at the front
    pub fn copy_test_case(&mut self, id: &str) -> &[TestCase] {
        let Some(copy) = self.test_case(id).map(TestCase::duplicate) else {
            log::debug!("copy_test_case: no test case {}", id);
            return &self.test_cases;
        };
        let copy_id = copy.id.clone();

        self.test_cases.insert(0, copy);
        self.persist(Collection::TestCases);
        self.broadcast(StoreEvent::TestCaseCopied {
            source_id: id.to_string(),
            id: copy_id,
        });
        &self.test_cases
    }

    /// Write the outcome of an execution run back to its case.
    ///
    /// Only the committed role's status changes. When the run named an
    /// executor, both the executor id and the resolved display name are set.
    pub fn record_execution(&mut self, commit: &ExecutionCommit) -> &[TestCase] {
        let executor_name = commit
            .executor_id
            .as_deref()
            .and_then(|uid| self.user(uid))
            .map(|u| u.name.clone());

        let Some(case) = self.test_cases.iter_mut().find(|c| c.id == commit.test_case_id) else {
            log::debug!("record_execution: no test case {}", commit.test_case_id);
            return &self.test_cases;
        };

        case.set_status(commit.role, commit.status);
        if let Some(executor_id) = &commit.executor_id {
            case.executor_id = Some(executor_id.clone());
            case.executor = executor_name;
        }
        case.updated_at = touch(case.updated_at);

        self.persist(Collection::TestCases);
        self.broadcast(StoreEvent::ExecutionRecorded {
            id: commit.test_case_id.clone(),
            role: commit.role,
            status: commit.status,
        });
        &self.test_cases
    }

    // ---------------------------------------------------------------------
    // Test suites
    // ---------------------------------------------------------------------

    pub fn create_test_suite(&mut self, fields: NewTestSuite) -> &[TestSuite] {
        let suite = TestSuite::create(fields);
        let id = suite.id.clone();
        log::debug!("Creating test suite {} ({})", suite.name, id);

        self.test_suites.insert(0, suite);
        self.persist(Collection::TestSuites);
        self.broadcast(StoreEvent::TestSuiteCreated { id });
        &self.test_suites
    }

    pub fn update_test_suite(&mut self, id: &str, patch: TestSuitePatch) -> &[TestSuite] {
        let Some(suite) = self.test_suites.iter_mut().find(|s| s.id == id) else {
            log::debug!("update_test_suite: no test suite {}", id);
            return &self.test_suites;
        };

        patch.apply_to(suite);
        suite.updated_at = touch(suite.updated_at);

        self.persist(Collection::TestSuites);
        self.broadcast(StoreEvent::TestSuiteUpdated { id: id.to_string() });
        &self.test_suites
    }

    /// Delete a suite and unlink its cases.
    ///
    /// Both collections are updated before either is persisted, and a single
    /// event is published once both changes are in place.
    pub fn delete_test_suite(&mut self, id: &str) -> &[TestSuite] {
        let before = self.test_suites.len();
        self.test_suites.retain(|s| s.id != id);
        if self.test_suites.len() == before {
            log::debug!("delete_test_suite: no test suite {}", id);
            return &self.test_suites;
        }

        let mut unlinked_cases = Vec::new();
        for case in self
            .test_cases
            .iter_mut()
            .filter(|c| c.test_suite_id.as_deref() == Some(id))
        {
            case.test_suite_id = None;
            case.updated_at = touch(case.updated_at);
            unlinked_cases.push(case.id.clone());
        }
        log::info!("Deleted test suite {}, unlinked {} case(s)", id, unlinked_cases.len());

        self.persist(Collection::TestSuites);
        if !unlinked_cases.is_empty() {
            self.persist(Collection::TestCases);
        }
        self.broadcast(StoreEvent::TestSuiteDeleted {
            id: id.to_string(),
            unlinked_cases,
        });
        &self.test_suites
    }

    pub fn toggle_test_suite_visibility(&mut self, id: &str) -> &[TestSuite] {
        let Some(suite) = self.test_suites.iter_mut().find(|s| s.id == id) else {
            log::debug!("toggle_test_suite_visibility: no test suite {}", id);
            return &self.test_suites;
        };

        suite.is_hidden = !suite.is_hidden;
        suite.updated_at = touch(suite.updated_at);

        self.persist(Collection::TestSuites);
        self.broadcast(StoreEvent::TestSuiteUpdated { id: id.to_string() });
        &self.test_suites
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    pub fn create_user(&mut self, fields: NewUser) -> &[User] {
        let user = User::create(fields);
        let id = user.id.clone();

        self.users.insert(0, user);
        self.persist(Collection::Users);
        self.broadcast(StoreEvent::UserCreated { id });
        &self.users
    }

    pub fn update_user(&mut self, id: &str, patch: UserPatch) -> &[User] {
        let Some(user) = self.users.iter_mut().find(|u| u.id == id) else {
            log::debug!("update_user: no user {}", id);
            return &self.users;
        };

        patch.apply_to(user);
        user.updated_at = touch(user.updated_at);

        self.persist(Collection::Users);
        self.broadcast(StoreEvent::UserUpdated { id: id.to_string() });
        &self.users
    }

    /// Remove a user. Suites and cases keep any reference to it.
    pub fn delete_user(&mut self, id: &str) -> &[User] {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        if self.users.len() == before {
            log::debug!("delete_user: no user {}", id);
            return &self.users;
        }

        self.persist(Collection::Users);
        self.broadcast(StoreEvent::UserDeleted { id: id.to_string() });
        &self.users
    }
}

fn serialize<T: Serialize>(items: &[T]) -> crate::error::Result<String> {
    Ok(serde_json::to_string(items)?)
}

fn restore<T: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    key: &str,
    upgrade: fn(&mut Value) -> usize,
) -> Restored<T> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::info!("No persisted data for {}, using defaults", key);
            return Restored::Missing;
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}, using defaults", key, e);
            return Restored::Unavailable;
        }
    };

    let mut value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Persisted {} is not valid JSON: {}, using defaults", key, e);
            return Restored::Corrupt;
        }
    };
    if !value.is_array() {
        log::warn!("Persisted {} is not an array, using defaults", key);
        return Restored::Corrupt;
    }

    let upgraded = upgrade(&mut value);
    match serde_json::from_value::<Vec<T>>(value) {
        Ok(items) => Restored::Loaded { items, upgraded },
        Err(e) => {
            log::warn!("Persisted {} has unexpected shape: {}, using defaults", key, e);
            Restored::Corrupt
        }
    }
}
