//! Assistant integration tests
//!
//! Runs full conversations against a mock LLM client and a real store.

use qadesk::assistant::{
    AssistantSession, AssistantTurn, CompletionResponse, ERROR_REPLY, MockLlmClient, SuiteRef, ToolCall,
};
use qadesk::config::AssistantConfig;
use qadesk::domain::{NewTestSuite, TestStatus};
use qadesk::storage::MemoryStore;
use qadesk::store::{DomainStore, TEST_CASES_KEY};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn empty_store() -> DomainStore {
    DomainStore::open(MemoryStore::new().with_entry(TEST_CASES_KEY, "[]"))
}

#[tokio::test]
async fn test_create_case_in_existing_suite() {
    let mut store = empty_store();
    let sid = store.create_test_suite(NewTestSuite::new("Login", "Auth"))[0].id.clone();

    let client = MockLlmClient::new().with_response(CompletionResponse::tool_use(vec![ToolCall::new(
        "toolu_1",
        "createTestCase",
        json!({
            "testCaseId": "TC-LOGIN-01",
            "title": "Valid credentials",
            "description": "User logs in",
            "priority": "High",
            "testSuiteId": sid,
            "steps": [
                {"action": "open login", "expectedResult": "form shown"},
                {"action": "submit", "expectedResult": "dashboard"}
            ]
        }),
    )]));

    let mut session = AssistantSession::new(&AssistantConfig::default());
    let suites = SuiteRef::snapshot(&store);
    let turn = session
        .send(&client, "add a happy-path login case", &suites, &CancellationToken::new())
        .await
        .unwrap();

    let AssistantTurn::Actions(actions) = turn else {
        panic!("expected actions");
    };
    let confirmations = session.apply(actions, &mut store);
    assert_eq!(
        confirmations,
        vec!["I've created the test case \"Valid credentials\" (TC-LOGIN-01) for you.".to_string()]
    );

    let cases = store.cases_in_suite(&sid);
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].steps.len(), 2);
    assert_eq!(cases[0].qa_status, TestStatus::Untested);
    assert!(client.requests()[0].system.contains(&sid));
}

#[tokio::test]
async fn test_failure_leaves_store_untouched() {
    let store = empty_store();
    let client = MockLlmClient::new().with_response(CompletionResponse::tool_use(vec![
        ToolCall::new("a", "createTestSuite", json!({"name": "Good", "description": "fine"})),
        ToolCall::new("b", "createTestCase", json!({"title": "missing everything else"})),
    ]));

    let mut session = AssistantSession::new(&AssistantConfig::default());
    let suites = SuiteRef::snapshot(&store);
    let result = session.send(&client, "do both", &suites, &CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(store.test_suites().is_empty());
    assert_eq!(store.test_cases().len(), 0);
    assert_eq!(session.messages().last().unwrap().content, ERROR_REPLY);

    // The conversation continues after a failure
    let client = MockLlmClient::new().with_response(CompletionResponse::text("Let's try again."));
    session
        .send(&client, "retry", &suites, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(session.messages().len(), 5);
    assert_eq!(client.requests()[0].messages.len(), 4);
}
