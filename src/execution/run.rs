//! Step-by-step execution of a single test case.
//!
//! An `ExecutionRun` walks the steps of one case for one tester role. It is
//! purely local state: nothing reaches the store until `commit()` hands back
//! an `ExecutionCommit` for `DomainStore::record_execution`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{TestCase, TestStatus, TesterRole};
use crate::error::{QaError, Result};

/// Outcome recorded for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepVerdict {
    Pass,
    Fail,
}

impl std::str::FromStr for StepVerdict {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pass" | "p" => Ok(StepVerdict::Pass),
            "fail" | "f" => Ok(StepVerdict::Fail),
            _ => Err(QaError::InvalidState(format!("unknown step verdict: {}", s))),
        }
    }
}

/// Terminal output of a run, applied through the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionCommit {
    pub test_case_id: String,
    pub role: TesterRole,
    pub status: TestStatus,
    pub executor_id: Option<String>,
}

/// Interactive run state for one test case
#[derive(Debug, Clone)]
pub struct ExecutionRun {
    test_case_id: String,
    role: TesterRole,
    executor_id: Option<String>,

    /// Step ids in execution order
    step_ids: Vec<String>,
    current_step_index: usize,
    /// `None` means the step has no verdict yet
    step_results: HashMap<String, Option<StepVerdict>>,
    overall_status: TestStatus,
}

impl ExecutionRun {
    /// Start a run at the first step, seeded with the case's stored status for `role`
    pub fn start(test_case: &TestCase, role: TesterRole) -> Self {
        let step_ids: Vec<String> = test_case.steps.iter().map(|s| s.id.clone()).collect();
        let step_results = step_ids.iter().map(|id| (id.clone(), None)).collect();

        let mut run = Self {
            test_case_id: test_case.id.clone(),
            role,
            executor_id: None,
            step_ids,
            current_step_index: 0,
            step_results,
            overall_status: test_case.status_for(role),
        };
        run.apply_suggestion();
        run
    }

    /// Attribute the run to a user
    pub fn with_executor(mut self, user_id: impl Into<String>) -> Self {
        self.executor_id = Some(user_id.into());
        self
    }

    pub fn test_case_id(&self) -> &str {
        &self.test_case_id
    }

    pub fn role(&self) -> TesterRole {
        self.role
    }

    pub fn step_count(&self) -> usize {
        self.step_ids.len()
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn current_step_id(&self) -> Option<&str> {
        self.step_ids.get(self.current_step_index).map(String::as_str)
    }

    pub fn overall_status(&self) -> TestStatus {
        self.overall_status
    }

    /// Verdict for a step; `None` if unset or the id is unknown
    pub fn step_result(&self, step_id: &str) -> Option<StepVerdict> {
        self.step_results.get(step_id).copied().flatten()
    }

    /// Verdicts in step order
    pub fn step_results(&self) -> Vec<(&str, Option<StepVerdict>)> {
        self.step_ids
            .iter()
            .map(|id| (id.as_str(), self.step_result(id)))
            .collect()
    }

    /// Number of steps with a verdict
    pub fn completed_steps(&self) -> usize {
        self.step_results.values().filter(|r| r.is_some()).count()
    }

    /// True once every step has a verdict. Vacuously true for a case without steps.
    pub fn all_steps_recorded(&self) -> bool {
        self.step_results.values().all(Option::is_some)
    }

    pub fn any_step_failed(&self) -> bool {
        self.step_results
            .values()
            .any(|r| *r == Some(StepVerdict::Fail))
    }

    /// Record a verdict for a step and auto-advance past it.
    ///
    /// The cursor moves forward by one unless the recorded step is the last
    /// step. The overall status only changes through auto-suggestion.
    pub fn record_step_result(&mut self, step_id: &str, verdict: StepVerdict) -> Result<()> {
        let index = self
            .step_ids
            .iter()
            .position(|id| id == step_id)
            .ok_or_else(|| QaError::UnknownStep(step_id.to_string()))?;

        self.step_results.insert(step_id.to_string(), Some(verdict));
        log::debug!(
            "Run {}: step {} ({}) -> {:?}",
            self.test_case_id,
            index + 1,
            step_id,
            verdict
        );

        let last = self.step_ids.len() - 1;
        if index < last {
            self.current_step_index = (self.current_step_index + 1).min(last);
        }

        self.apply_suggestion();
        Ok(())
    }

    /// Record a verdict for the step under the cursor
    pub fn record_current(&mut self, verdict: StepVerdict) -> Result<()> {
        let step_id = self
            .current_step_id()
            .map(str::to_string)
            .ok_or_else(|| QaError::InvalidState("test case has no steps".to_string()))?;
        self.record_step_result(&step_id, verdict)
    }

    /// Jump to an arbitrary step. Results are untouched.
    pub fn navigate(&mut self, index: usize) -> Result<()> {
        if index >= self.step_ids.len() {
            return Err(QaError::StepOutOfRange {
                index,
                count: self.step_ids.len(),
            });
        }
        self.current_step_index = index;
        Ok(())
    }

    /// Move back one step, stopping at the first
    pub fn previous(&mut self) {
        self.current_step_index = self.current_step_index.saturating_sub(1);
    }

    /// Move forward one step, stopping at the last
    pub fn next(&mut self) {
        if self.current_step_index + 1 < self.step_ids.len() {
            self.current_step_index += 1;
        }
    }

    /// Explicit override, allowed at any point of the run
    pub fn set_overall_status(&mut self, status: TestStatus) {
        self.overall_status = status;
        self.apply_suggestion();
    }

    /// Fill in Pass/Fail once all steps are recorded, but only while the
    /// overall status is still Untested.
    fn apply_suggestion(&mut self) {
        if self.overall_status != TestStatus::Untested || !self.all_steps_recorded() {
            return;
        }

        self.overall_status = if self.any_step_failed() {
            TestStatus::Fail
        } else {
            TestStatus::Pass
        };
        log::debug!(
            "Run {}: all steps recorded, suggesting {}",
            self.test_case_id,
            self.overall_status
        );
    }

    /// Finish the run. Incomplete runs may be committed.
    pub fn commit(self) -> ExecutionCommit {
        log::info!(
            "Committing run of {} as {}: {} ({}/{} steps recorded)",
            self.test_case_id,
            self.role,
            self.overall_status,
            self.completed_steps(),
            self.step_count()
        );
        ExecutionCommit {
            test_case_id: self.test_case_id,
            role: self.role,
            status: self.overall_status,
            executor_id: self.executor_id,
        }
    }
}
