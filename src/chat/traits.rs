use async_trait::async_trait;

use crate::error::ChatError;

use super::normalize::NormalizedReply;

/// Synthetic message used to probe the endpoint.
pub const CONNECTION_TEST_PROMPT: &str = "Hello, this is a connection test.";

/// Transport seam between the conversation controller and the wire.
///
/// The webhook client is the production implementation; tests substitute
/// their own.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    /// Sends one user message and resolves to the normalized reply.
    ///
    /// `conversation_id` is the session identifier adopted from an earlier
    /// reply, if any.
    async fn send(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<NormalizedReply, ChatError>;

    /// Performs a single synthetic send and reports whether it succeeded.
    async fn test_connection(&self) -> bool {
        self.send(CONNECTION_TEST_PROMPT, None).await.is_ok()
    }
}
