//! Test case and test step records
//!
//! A TestCase owns an ordered list of TestSteps and carries one status per
//! testing role. The suite and executor fields are weak references: they hold
//! an id that may or may not resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::status::{Priority, TestStatus, TesterRole};
use crate::id::{generate_id, now};

/// Marker appended to `testCaseId` when a case is copied
pub const COPY_ID_SUFFIX: &str = "-COPY";

/// Marker appended to `title` when a case is copied
pub const COPY_TITLE_SUFFIX: &str = " (Copy)";

/// One action/expected-result pair of a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    pub id: String,
    pub action: String,
    pub expected_result: String,
}

impl TestStep {
    /// Create a step with a freshly generated id
    pub fn new(action: impl Into<String>, expected_result: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            action: action.into(),
            expected_result: expected_result.into(),
        }
    }
}

/// A single verifiable scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    //=== Identity ===
    pub id: String,

    /// Human-facing label, e.g. "TC-CHECKOUT-CC-01"
    pub test_case_id: String,

    //=== Content ===
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub preconditions: String,
    #[serde(default)]
    pub test_data: String,
    #[serde(default)]
    pub steps: Vec<TestStep>,
    #[serde(default)]
    pub priority: Priority,

    //=== Per-role verdicts ===
    #[serde(default)]
    pub qa_status: TestStatus,
    #[serde(default)]
    pub uat_status: TestStatus,
    #[serde(default)]
    pub bat_status: TestStatus,

    #[serde(default)]
    pub related_requirements: String,

    //=== Weak references ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_suite_id: Option<String>,
    /// Display name of the last executor, captured at commit time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_id: Option<String>,

    //=== Timestamps ===
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestCase {
    /// Materialize a new case from creation fields
    pub fn create(fields: NewTestCase) -> Self {
        let created = now();
        Self {
            id: generate_id(),
            test_case_id: fields.test_case_id,
            title: fields.title,
            description: fields.description,
            preconditions: fields.preconditions,
            test_data: fields.test_data,
            steps: fields.steps,
            priority: fields.priority,
            qa_status: fields.qa_status,
            uat_status: fields.uat_status,
            bat_status: fields.bat_status,
            related_requirements: fields.related_requirements,
            test_suite_id: fields.test_suite_id,
            executor: fields.executor,
            executor_id: fields.executor_id,
            created_at: created,
            updated_at: created,
        }
    }

    /// Status recorded for the given tester role
    pub fn status_for(&self, role: TesterRole) -> TestStatus {
        match role {
            TesterRole::Qa => self.qa_status,
            TesterRole::Uat => self.uat_status,
            TesterRole::Bat => self.bat_status,
        }
    }

    /// Overwrite the status of the given tester role
    pub fn set_status(&mut self, role: TesterRole, status: TestStatus) {
        match role {
            TesterRole::Qa => self.qa_status = status,
            TesterRole::Uat => self.uat_status = status,
            TesterRole::Bat => self.bat_status = status,
        }
    }

    /// Duplicate with a new identity and copy markers on the labels.
    ///
    /// Steps keep their ids.
    pub fn duplicate(&self) -> Self {
        let created = now();
        Self {
            id: generate_id(),
            test_case_id: format!("{}{}", self.test_case_id, COPY_ID_SUFFIX),
            title: format!("{}{}", self.title, COPY_TITLE_SUFFIX),
            created_at: created,
            updated_at: created,
            ..self.clone()
        }
    }

    /// Index of the step with the given id
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }
}

/// Caller-supplied fields for creating a test case
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTestCase {
    pub test_case_id: String,
    pub title: String,
    pub description: String,
    pub preconditions: String,
    pub test_data: String,
    pub steps: Vec<TestStep>,
    pub priority: Priority,
    pub qa_status: TestStatus,
    pub uat_status: TestStatus,
    pub bat_status: TestStatus,
    pub related_requirements: String,
    pub test_suite_id: Option<String>,
    pub executor: Option<String>,
    pub executor_id: Option<String>,
}

impl NewTestCase {
    /// Start from a label and title; everything else defaults (all roles Untested)
    pub fn new(test_case_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            test_case_id: test_case_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_preconditions(mut self, preconditions: impl Into<String>) -> Self {
        self.preconditions = preconditions.into();
        self
    }

    pub fn with_test_data(mut self, test_data: impl Into<String>) -> Self {
        self.test_data = test_data.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_step(mut self, action: impl Into<String>, expected_result: impl Into<String>) -> Self {
        self.steps.push(TestStep::new(action, expected_result));
        self
    }

    pub fn with_steps(mut self, steps: Vec<TestStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn in_suite(mut self, suite_id: impl Into<String>) -> Self {
        self.test_suite_id = Some(suite_id.into());
        self
    }

    pub fn with_status(mut self, role: TesterRole, status: TestStatus) -> Self {
        match role {
            TesterRole::Qa => self.qa_status = status,
            TesterRole::Uat => self.uat_status = status,
            TesterRole::Bat => self.bat_status = status,
        }
        self
    }

    pub fn with_related_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.related_requirements = requirements.into();
        self
    }
}

/// Partial update for a test case. `None` leaves a field untouched.
///
/// Weak references use a nested option so they can be cleared:
/// `Some(None)` unlinks, `Some(Some(id))` relinks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCasePatch {
    pub test_case_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub preconditions: Option<String>,
    pub test_data: Option<String>,
    pub steps: Option<Vec<TestStep>>,
    pub priority: Option<Priority>,
    pub qa_status: Option<TestStatus>,
    pub uat_status: Option<TestStatus>,
    pub bat_status: Option<TestStatus>,
    pub related_requirements: Option<String>,
    pub test_suite_id: Option<Option<String>>,
    pub executor: Option<Option<String>>,
    pub executor_id: Option<Option<String>>,
}

impl TestCasePatch {
    /// Patch that sets one role's status
    pub fn status(role: TesterRole, status: TestStatus) -> Self {
        let mut patch = Self::default();
        match role {
            TesterRole::Qa => patch.qa_status = Some(status),
            TesterRole::Uat => patch.uat_status = Some(status),
            TesterRole::Bat => patch.bat_status = Some(status),
        }
        patch
    }

    /// Merge the set fields into `case`. Timestamps are the caller's concern.
    pub fn apply_to(self, case: &mut TestCase) {
        if let Some(v) = self.test_case_id {
            case.test_case_id = v;
        }
        if let Some(v) = self.title {
            case.title = v;
        }
        if let Some(v) = self.description {
            case.description = v;
        }
        if let Some(v) = self.preconditions {
            case.preconditions = v;
        }
        if let Some(v) = self.test_data {
            case.test_data = v;
        }
        if let Some(v) = self.steps {
            case.steps = v;
        }
        if let Some(v) = self.priority {
            case.priority = v;
        }
        if let Some(v) = self.qa_status {
            case.qa_status = v;
        }
        if let Some(v) = self.uat_status {
            case.uat_status = v;
        }
        if let Some(v) = self.bat_status {
            case.bat_status = v;
        }
        if let Some(v) = self.related_requirements {
            case.related_requirements = v;
        }
        if let Some(v) = self.test_suite_id {
            case.test_suite_id = v;
        }
        if let Some(v) = self.executor {
            case.executor = v;
        }
        if let Some(v) = self.executor_id {
            case.executor_id = v;
        }
    }
}
