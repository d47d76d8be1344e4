//! Status, priority and role enums shared across the domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QaError;

/// Verdict of one testing role for a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TestStatus {
    #[default]
    Untested,
    Pass,
    Fail,
    Blocked,
    Skipped,
}

impl TestStatus {
    pub const ALL: [TestStatus; 5] = [
        TestStatus::Untested,
        TestStatus::Pass,
        TestStatus::Fail,
        TestStatus::Blocked,
        TestStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Untested => "Untested",
            TestStatus::Pass => "Pass",
            TestStatus::Fail => "Fail",
            TestStatus::Blocked => "Blocked",
            TestStatus::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QaError::InvalidState(format!("unknown test status: {}", s)))
    }
}

/// Priority of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(QaError::InvalidState(format!("unknown priority: {}", s))),
        }
    }
}

/// The role a test run is executed as. Each role owns one status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TesterRole {
    #[default]
    #[serde(rename = "QA tester")]
    Qa,
    #[serde(rename = "UAT tester")]
    Uat,
    #[serde(rename = "BAT tester")]
    Bat,
}

impl TesterRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TesterRole::Qa => "QA tester",
            TesterRole::Uat => "UAT tester",
            TesterRole::Bat => "BAT tester",
        }
    }
}

impl fmt::Display for TesterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TesterRole {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let key = normalized.strip_suffix(" tester").unwrap_or(&normalized);
        match key {
            "qa" => Ok(TesterRole::Qa),
            "uat" => Ok(TesterRole::Uat),
            "bat" => Ok(TesterRole::Bat),
            _ => Err(QaError::InvalidState(format!("unknown tester role: {}", s))),
        }
    }
}

/// Organizational role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "BSA")]
    Bsa,
    Developer,
    #[serde(rename = "QA")]
    Qa,
    #[serde(rename = "UAT")]
    Uat,
    #[serde(rename = "Business User")]
    BusinessUser,
    Other,
}

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::Bsa,
        UserRole::Developer,
        UserRole::Qa,
        UserRole::Uat,
        UserRole::BusinessUser,
        UserRole::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Bsa => "BSA",
            UserRole::Developer => "Developer",
            UserRole::Qa => "QA",
            UserRole::Uat => "UAT",
            UserRole::BusinessUser => "Business User",
            UserRole::Other => "Other",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', '_'], " ");
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| QaError::InvalidState(format!("unknown user role: {}", s)))
    }
}
