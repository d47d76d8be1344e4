//! Test suite records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{generate_id, now};

/// A named grouping of test cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Weak reference to a User
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// External ticket, e.g. "QA-1234"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_number: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestSuite {
    pub fn create(fields: NewTestSuite) -> Self {
        let created = now();
        Self {
            id: generate_id(),
            name: fields.name,
            description: fields.description,
            owner_id: fields.owner_id,
            jira_number: fields.jira_number,
            is_hidden: fields.is_hidden,
            created_at: created,
            updated_at: created,
        }
    }
}

/// Caller-supplied fields for creating a suite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTestSuite {
    pub name: String,
    pub description: String,
    pub owner_id: Option<String>,
    pub jira_number: Option<String>,
    pub is_hidden: bool,
}

impl NewTestSuite {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, user_id: impl Into<String>) -> Self {
        self.owner_id = Some(user_id.into());
        self
    }

    pub fn with_jira(mut self, jira_number: impl Into<String>) -> Self {
        self.jira_number = Some(jira_number.into());
        self
    }
}

/// Partial update for a suite; nested options clear optional fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSuitePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<Option<String>>,
    pub jira_number: Option<Option<String>>,
    pub is_hidden: Option<bool>,
}

impl TestSuitePatch {
    pub fn apply_to(self, suite: &mut TestSuite) {
        if let Some(v) = self.name {
            suite.name = v;
        }
        if let Some(v) = self.description {
            suite.description = v;
        }
        if let Some(v) = self.owner_id {
            suite.owner_id = v;
        }
        if let Some(v) = self.jira_number {
            suite.jira_number = v;
        }
        if let Some(v) = self.is_hidden {
            suite.is_hidden = v;
        }
    }
}
