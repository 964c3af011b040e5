//! Drives a conversation against a reply provider.
//!
//! Failures never escape `send_message`; they are recorded as visible
//! assistant-authored messages so the user can always try again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::chat::{ChatMessage, ReplyProvider};
use crate::error::ChatError;

use super::state::Conversation;

/// Owns the conversation state and enforces the send lifecycle.
///
/// At most one request is in flight at a time: a send attempted while the
/// busy flag is set is a no-op, with no queueing and no cancellation of
/// the in-flight request.
pub struct ConversationController {
    provider: Arc<dyn ReplyProvider>,
    state: Mutex<Conversation>,
    busy: AtomicBool,
}

impl ConversationController {
    pub fn new(provider: Arc<dyn ReplyProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(Conversation::new()),
            busy: AtomicBool::new(false),
        }
    }

    /// Sends one user message.
    ///
    /// Empty input and calls made while a request is in flight are ignored.
    /// A completed send appends exactly two messages: the user's text
    /// immediately, the outcome (reply or error description) once settled.
    pub async fn send_message(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return;
        }

        let conversation_id = {
            let mut state = self.lock_state();
            state.push(ChatMessage::user(trimmed));
            state.conversation_id.clone()
        };

        let result = self.provider.send(trimmed, conversation_id.as_deref()).await;

        let mut state = self.lock_state();
        match result {
            Ok(reply) => {
                if let Some(id) = reply.conversation_id {
                    state.conversation_id = Some(id);
                }
                state.push(ChatMessage::assistant(reply.text));
            }
            Err(err) => {
                log::warn!("send failed: {err}");
                state.push(ChatMessage::assistant(describe_error(&err)));
            }
        }
        drop(state);
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Empties the conversation and resets the session identifier. No
    /// network call is made.
    pub fn clear(&self) {
        self.lock_state().clear();
    }

    /// Probes the endpoint with a synthetic send. Does not touch the
    /// conversation.
    pub async fn test_connection(&self) -> bool {
        self.provider.test_connection().await
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Snapshot of the current message list.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_state().messages.clone()
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.lock_state().conversation_id.clone()
    }

    /// Conversation state as pretty JSON, for diagnostics.
    pub fn debug_dump(&self) -> String {
        let state = self.lock_state();
        serde_json::to_string_pretty(&*state).unwrap_or_else(|err| format!("dump failed: {err}"))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Conversation> {
        // Never held across an await, so a poisoned lock still holds
        // consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Converts a failure into the text shown in place of an assistant reply.
fn describe_error(err: &ChatError) -> String {
    match err {
        ChatError::Timeout => "Request timed out. Please try again.".to_string(),
        ChatError::Network(detail) => format!("Connection error: {detail}"),
        ChatError::Http { status } => {
            format!("Server error (HTTP {status}). Please try again.")
        }
        ChatError::Remote(message) => message.clone(),
        ChatError::InvalidUrl(url) => format!("Invalid webhook URL: {url}"),
        ChatError::EmptyInput | ChatError::Busy => {
            "An unexpected error occurred. Please try again.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::chat::{ChatRole, NormalizedReply, ReplyShape};

    use super::*;

    struct FakeProvider {
        outcome: Result<NormalizedReply, ChatError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn replying(text: &str, conversation_id: Option<&str>) -> Self {
            Self {
                outcome: Ok(NormalizedReply {
                    text: text.to_string(),
                    conversation_id: conversation_id.map(str::to_owned),
                    shape: ReplyShape::KnownField,
                }),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: ChatError) -> Self {
            Self {
                outcome: Err(err),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReplyProvider for FakeProvider {
        async fn send(
            &self,
            _text: &str,
            _conversation_id: Option<&str>,
        ) -> Result<NormalizedReply, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.outcome {
                Ok(reply) => Ok(reply.clone()),
                Err(ChatError::Timeout) => Err(ChatError::Timeout),
                Err(ChatError::Http { status }) => Err(ChatError::Http { status: *status }),
                Err(ChatError::Network(msg)) => Err(ChatError::Network(msg.clone())),
                Err(ChatError::Remote(msg)) => Err(ChatError::Remote(msg.clone())),
                Err(other) => Err(ChatError::Network(other.to_string())),
            }
        }
    }

    fn controller(provider: FakeProvider) -> (ConversationController, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (
            ConversationController::new(provider.clone()),
            provider,
        )
    }

    #[tokio::test]
    async fn completed_send_appends_exactly_two_messages() {
        let (controller, _) = controller(FakeProvider::replying("hi", None));
        controller.send_message("hello").await;

        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[1].text, "hi");
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn failed_send_still_appends_two_messages() {
        let (controller, _) = controller(FakeProvider::failing(ChatError::Http { status: 500 }));
        controller.send_message("hello").await;

        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[1].text, "Server error (HTTP 500). Please try again.");
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn timeout_surfaces_as_timeout_text() {
        let (controller, _) = controller(FakeProvider::failing(ChatError::Timeout));
        controller.send_message("hello").await;

        let messages = controller.messages();
        assert_eq!(messages[1].text, "Request timed out. Please try again.");
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let (controller, provider) = controller(FakeProvider::replying("hi", None));
        controller.send_message("   ").await;

        assert!(controller.messages().is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn send_while_busy_is_a_no_op() {
        let (controller, provider) =
            controller(FakeProvider::replying("hi", None).slow(Duration::from_millis(50)));

        tokio::join!(
            controller.send_message("first"),
            controller.send_message("second"),
        );

        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "first");
        assert_eq!(provider.calls(), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn conversation_id_adopted_from_reply() {
        let (controller, _) = controller(FakeProvider::replying("hi", Some("session-9")));
        assert_eq!(controller.conversation_id(), None);

        controller.send_message("hello").await;
        assert_eq!(controller.conversation_id().as_deref(), Some("session-9"));
    }

    #[tokio::test]
    async fn clear_resets_messages_and_session() {
        let (controller, _) = controller(FakeProvider::replying("hi", Some("session-9")));
        controller.send_message("hello").await;
        assert!(!controller.messages().is_empty());

        controller.clear();
        assert!(controller.messages().is_empty());
        assert_eq!(controller.conversation_id(), None);
    }

    #[tokio::test]
    async fn remote_error_text_shown_verbatim() {
        let (controller, _) =
            controller(FakeProvider::failing(ChatError::Remote("nope".to_string())));
        controller.send_message("hello").await;
        assert_eq!(controller.messages()[1].text, "nope");
    }

    #[tokio::test]
    async fn debug_dump_is_valid_json() {
        let (controller, _) = controller(FakeProvider::replying("hi", None));
        controller.send_message("hello").await;

        let dump = controller.debug_dump();
        let value: serde_json::Value = serde_json::from_str(&dump).expect("valid json");
        assert_eq!(value["messages"].as_array().map(Vec::len), Some(2));
    }
}
