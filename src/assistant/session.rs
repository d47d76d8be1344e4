//! Conversation state for the QA assistant.
//!
//! A request never holds the store: the caller snapshots the suites, awaits
//! `send`, and only then applies the returned actions with `apply`.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::assistant::client::LlmClient;
use crate::assistant::intents::{AssistantAction, parse_tool_calls, tool_definitions};
use crate::assistant::types::{CompletionRequest, Message};
use crate::config::AssistantConfig;
use crate::domain::TestSuite;
use crate::error::{QaError, Result};
use crate::store::DomainStore;

pub const GREETING: &str =
    "Hello! I'm your QA Assistant. I can help you create test suites and test cases. Just tell me what you'd like to build!";

pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

pub const EMPTY_REPLY: &str = "I'm not sure how to help with that.";

/// Suite as listed to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteRef {
    pub id: String,
    pub name: String,
}

impl From<&TestSuite> for SuiteRef {
    fn from(suite: &TestSuite) -> Self {
        Self {
            id: suite.id.clone(),
            name: suite.name.clone(),
        }
    }
}

impl SuiteRef {
    /// Owned copy of the store's suites, safe to carry across an await
    pub fn snapshot(store: &DomainStore) -> Vec<SuiteRef> {
        store.test_suites().iter().map(SuiteRef::from).collect()
    }
}

/// Build the system prompt for the current suites
pub fn system_prompt(suites: &[SuiteRef]) -> String {
    let listing = serde_json::to_string(suites).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a professional QA engineer assistant.\n\
         Your goal is to help users manage their test suites and test cases.\n\
         You can create test suites and test cases using the provided tools.\n\
         When a user describes a feature or a test scenario, suggest creating a test case or a suite.\n\
         Available Test Suites: {}.\n\
         If the user wants to add a test case to an existing suite, use the correct testSuiteId.\n\
         Always confirm with the user before performing actions, or perform them if they are explicitly requested.",
        listing
    )
}

/// What a successful request produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantTurn {
    /// Text reply, already appended to the conversation
    Reply(String),
    /// Validated actions waiting for `AssistantSession::apply`
    Actions(Vec<AssistantAction>),
}

#[derive(Debug, Clone)]
pub struct AssistantSession {
    messages: Vec<Message>,
    max_tokens: u32,
    timeout: Duration,
}

impl AssistantSession {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            max_tokens: config.max_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Conversation so far, starting with the greeting
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send a user message.
    ///
    /// On failure the apology is appended and the error returned; nothing is
    /// left to apply. Tool calls are only returned if all of them parse.
    pub async fn send(
        &mut self,
        client: &dyn LlmClient,
        text: &str,
        suites: &[SuiteRef],
        cancel: &CancellationToken,
    ) -> Result<AssistantTurn> {
        self.messages.push(Message::user(text));

        let request = self
            .messages
            .iter()
            .cloned()
            .fold(CompletionRequest::new(system_prompt(suites)), |req, msg| {
                req.with_message(msg)
            })
            .with_tools(tool_definitions())
            .with_max_tokens(self.max_tokens);

        log::debug!(
            "Assistant request to {} with {} suite(s) listed",
            client.model(),
            suites.len()
        );

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(QaError::Assistant("request cancelled".to_string())),
            result = tokio::time::timeout(self.timeout, client.complete(request)) => match result {
                Ok(response) => response,
                Err(_) => Err(QaError::Assistant(format!("request timed out after {:?}", self.timeout))),
            },
        };

        let turn = outcome.and_then(|response| {
            if response.tool_calls.is_empty() {
                return Ok(AssistantTurn::Reply(response.content));
            }
            let actions = parse_tool_calls(&response.tool_calls)?;
            if actions.is_empty() {
                Ok(AssistantTurn::Reply(response.content))
            } else {
                Ok(AssistantTurn::Actions(actions))
            }
        });

        match turn {
            Ok(AssistantTurn::Reply(content)) => {
                let reply = if content.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    content
                };
                self.messages.push(Message::assistant(reply.clone()));
                Ok(AssistantTurn::Reply(reply))
            }
            Ok(actions) => Ok(actions),
            Err(e) => {
                log::error!("Assistant request failed: {}", e);
                self.messages.push(Message::assistant(ERROR_REPLY));
                Err(e)
            }
        }
    }

    /// Apply validated actions in order, appending one confirmation each
    pub fn apply(&mut self, actions: Vec<AssistantAction>, store: &mut DomainStore) -> Vec<String> {
        let confirmations: Vec<String> = actions.into_iter().map(|action| action.apply(store)).collect();
        self.messages
            .extend(confirmations.iter().map(|c| Message::assistant(c.clone())));
        confirmations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::client::MockLlmClient;
    use crate::assistant::intents::CREATE_TEST_SUITE;
    use crate::assistant::types::{CompletionResponse, Role, ToolCall};
    use crate::domain::NewTestSuite;
    use crate::storage::MemoryStore;
    use crate::store::TEST_CASES_KEY;
    use serde_json::json;

    fn create_test_store() -> DomainStore {
        DomainStore::open(MemoryStore::new().with_entry(TEST_CASES_KEY, "[]"))
    }

    fn session() -> AssistantSession {
        AssistantSession::new(&AssistantConfig::default())
    }

    fn last_message(session: &AssistantSession) -> &str {
        &session.messages().last().unwrap().content
    }

    #[test]
    fn test_session_starts_with_greeting() {
        let session = session();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.messages()[0].content, GREETING);
    }

    #[test]
    fn test_system_prompt_lists_suites() {
        let prompt = system_prompt(&[SuiteRef {
            id: "s1".to_string(),
            name: "Checkout".to_string(),
        }]);
        assert!(prompt.contains(r#"[{"id":"s1","name":"Checkout"}]"#));
    }

    #[tokio::test]
    async fn test_text_reply_appended() {
        let client = MockLlmClient::new().with_response(CompletionResponse::text("Sure, what feature?"));
        let mut session = session();

        let turn = session
            .send(&client, "help", &[], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(turn, AssistantTurn::Reply("Sure, what feature?".to_string()));
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[1], Message::user("help"));
        assert_eq!(last_message(&session), "Sure, what feature?");

        let request = &client.requests()[0];
        assert_eq!(request.tools.len(), 2);
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_reply_fallback() {
        let client = MockLlmClient::new().with_response(CompletionResponse::text(""));
        let mut session = session();
        session
            .send(&client, "?", &[], &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(last_message(&session), EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_tool_calls_applied_after_request() {
        let mut store = create_test_store();
        store.create_test_suite(NewTestSuite::new("Existing", ""));
        let client = MockLlmClient::new().with_response(CompletionResponse::tool_use(vec![ToolCall::new(
            "t1",
            CREATE_TEST_SUITE,
            json!({"name": "Login", "description": "Auth flows"}),
        )]));
        let mut session = session();

        let suites = SuiteRef::snapshot(&store);
        let turn = session
            .send(&client, "make a login suite", &suites, &CancellationToken::new())
            .await
            .unwrap();
        let AssistantTurn::Actions(actions) = turn else {
            panic!("expected actions");
        };
        assert_eq!(store.test_suites().len(), 1);

        let confirmations = session.apply(actions, &mut store);
        assert_eq!(confirmations, vec!["I've created the test suite \"Login\" for you.".to_string()]);
        assert_eq!(store.test_suites().len(), 2);
        assert_eq!(store.test_suites()[0].name, "Login");
        assert_eq!(last_message(&session), confirmations[0]);

        assert!(client.requests()[0].system.contains("Existing"));
    }

    #[tokio::test]
    async fn test_malformed_call_fails_whole_response() {
        let client = MockLlmClient::new().with_response(CompletionResponse::tool_use(vec![
            ToolCall::new("t1", CREATE_TEST_SUITE, json!({"name": "ok", "description": "fine"})),
            ToolCall::new("t2", CREATE_TEST_SUITE, json!({"description": "no name"})),
        ]));
        let mut session = session();

        let result = session.send(&client, "two suites", &[], &CancellationToken::new()).await;
        assert!(matches!(result, Err(QaError::MalformedToolCall(_))));
        assert_eq!(last_message(&session), ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_client_error_appends_apology() {
        let client = MockLlmClient::new().with_error("connection reset");
        let mut session = session();

        let result = session.send(&client, "hi", &[], &CancellationToken::new()).await;
        assert!(result.is_err());
        assert_eq!(last_message(&session), ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_cancellation() {
        let client = MockLlmClient::new().hanging();
        let mut session = session();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = session.send(&client, "hi", &[], &cancel).await;
        assert!(matches!(result, Err(QaError::Assistant(msg)) if msg.contains("cancelled")));
        assert_eq!(last_message(&session), ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_timeout() {
        let client =
            MockLlmClient::new().with_delayed_response(Duration::from_secs(30), CompletionResponse::text("late"));
        let mut session = session().with_timeout(Duration::from_millis(20));

        let result = session.send(&client, "hi", &[], &CancellationToken::new()).await;
        assert!(matches!(result, Err(QaError::Assistant(msg)) if msg.contains("timed out")));
        assert_eq!(last_message(&session), ERROR_REPLY);
    }
}
