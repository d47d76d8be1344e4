//! Tools the assistant may call, and the store actions they map to.
//!
//! Tool calls are parsed into `AssistantAction`s up front. A response is
//! applied only if every call in it parses.

use serde::Deserialize;
use serde_json::json;

use crate::assistant::types::{ToolCall, ToolDefinition};
use crate::domain::{NewTestCase, NewTestSuite, Priority, TestStep};
use crate::error::{QaError, Result};
use crate::store::DomainStore;

pub const CREATE_TEST_SUITE: &str = "createTestSuite";
pub const CREATE_TEST_CASE: &str = "createTestCase";

/// Tool definitions offered with every request
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            CREATE_TEST_SUITE,
            "Creates a new test suite to group related test cases.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "The name of the test suite." },
                    "description": { "type": "string", "description": "A brief description of the test suite." }
                },
                "required": ["name", "description"]
            }),
        ),
        ToolDefinition::new(
            CREATE_TEST_CASE,
            "Creates a new test case with detailed steps.",
            json!({
                "type": "object",
                "properties": {
                    "testCaseId": { "type": "string", "description": "A unique identifier for the test case (e.g., TC-001)." },
                    "title": { "type": "string", "description": "The title of the test case." },
                    "description": { "type": "string", "description": "A description of the test case." },
                    "preconditions": { "type": "string", "description": "Conditions that must be met before running the test." },
                    "testData": { "type": "string", "description": "Specific data required for the test." },
                    "priority": { "type": "string", "enum": ["High", "Medium", "Low"], "description": "The priority of the test case." },
                    "testSuiteId": { "type": "string", "description": "Optional ID of the test suite to associate this case with." },
                    "steps": {
                        "type": "array",
                        "description": "A list of steps to execute the test.",
                        "items": {
                            "type": "object",
                            "properties": {
                                "action": { "type": "string", "description": "The action to perform in this step." },
                                "expectedResult": { "type": "string", "description": "The expected outcome of this step." }
                            },
                            "required": ["action", "expectedResult"]
                        }
                    }
                },
                "required": ["testCaseId", "title", "description", "priority", "steps"]
            }),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestSuiteArgs {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepArgs {
    pub action: String,
    pub expected_result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestCaseArgs {
    pub test_case_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub preconditions: Option<String>,
    #[serde(default)]
    pub test_data: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub test_suite_id: Option<String>,
    pub steps: Vec<StepArgs>,
}

impl CreateTestCaseArgs {
    /// Creation fields: fresh step ids, every status Untested
    fn into_new_test_case(self) -> NewTestCase {
        let steps = self
            .steps
            .into_iter()
            .map(|s| TestStep::new(s.action, s.expected_result))
            .collect();

        let mut fields = NewTestCase::new(self.test_case_id, self.title)
            .with_description(self.description)
            .with_preconditions(self.preconditions.unwrap_or_default())
            .with_test_data(self.test_data.unwrap_or_default())
            .with_priority(self.priority)
            .with_steps(steps);
        if let Some(suite_id) = self.test_suite_id.filter(|id| !id.is_empty()) {
            fields = fields.in_suite(suite_id);
        }
        fields
    }
}

/// A validated store mutation requested by the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantAction {
    CreateTestSuite(CreateTestSuiteArgs),
    CreateTestCase(CreateTestCaseArgs),
}

impl AssistantAction {
    /// Parse one tool call. `Ok(None)` for tools this assistant does not offer.
    pub fn from_tool_call(call: &ToolCall) -> Result<Option<Self>> {
        let action = match call.name.as_str() {
            CREATE_TEST_SUITE => AssistantAction::CreateTestSuite(parse_args(call)?),
            CREATE_TEST_CASE => AssistantAction::CreateTestCase(parse_args(call)?),
            other => {
                log::warn!("Ignoring call to unknown tool {}", other);
                return Ok(None);
            }
        };
        Ok(Some(action))
    }

    /// Apply to the store, returning the confirmation shown to the user
    pub fn apply(self, store: &mut DomainStore) -> String {
        match self {
            AssistantAction::CreateTestSuite(args) => {
                let message = format!("I've created the test suite \"{}\" for you.", args.name);
                store.create_test_suite(NewTestSuite::new(args.name, args.description));
                message
            }
            AssistantAction::CreateTestCase(args) => {
                let message = format!(
                    "I've created the test case \"{}\" ({}) for you.",
                    args.title, args.test_case_id
                );
                store.create_test_case(args.into_new_test_case());
                message
            }
        }
    }
}

/// Parse every call, failing the whole batch on the first malformed one
pub fn parse_tool_calls(calls: &[ToolCall]) -> Result<Vec<AssistantAction>> {
    let mut actions = Vec::with_capacity(calls.len());
    for call in calls {
        if let Some(action) = AssistantAction::from_tool_call(call)? {
            actions.push(action);
        }
    }
    Ok(actions)
}

fn parse_args<T: serde::de::DeserializeOwned>(call: &ToolCall) -> Result<T> {
    serde_json::from_value(call.input.clone())
        .map_err(|e| QaError::MalformedToolCall(format!("{} ({}): {}", call.name, call.id, e)))
}
