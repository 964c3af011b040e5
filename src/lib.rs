//! SYLPHIE: a chat client for arbitrary webhook endpoints.
//!
//! Forwards user text to a single externally hosted webhook via HTTP POST
//! and reduces whatever comes back (JSON object, JSON string, or plain
//! text) into a display string using a fixed field-priority heuristic.
//! The remote endpoint's behavior is unspecified by design; every reply
//! shape is tolerated and failures surface as visible chat messages, never
//! as crashes.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sylphie::{ConversationController, WebhookClient, WebhookConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sylphie::ChatError> {
//!     let config = WebhookConfig::new("https://example.com/webhook/sylphie");
//!     let client = WebhookClient::new(config)?;
//!     let controller = ConversationController::new(Arc::new(client));
//!
//!     controller.send_message("Hello there").await;
//!     for message in controller.messages() {
//!         println!("{:?}: {}", message.role, message.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod webhook;

pub use chat::{
    normalize, ChatMessage, ChatRole, MessageId, NormalizedReply, ReplyProvider, ReplyShape,
};
pub use conversation::{Conversation, ConversationController};
pub use error::ChatError;
pub use webhook::{WebhookClient, WebhookConfig, DEFAULT_TIMEOUT_MS, DEFAULT_USER_ID};
